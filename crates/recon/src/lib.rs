//! `padron-recon`: roster reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables keyed by role, returns
//! classified outcomes plus the artifacts to write. No CLI or IO
//! dependencies.

pub mod aggregate;
pub mod classify;
pub mod compare;
pub mod config;
pub mod dedup;
pub mod email;
pub mod engine;
pub mod error;
pub mod extract;
pub mod filter;
pub mod ids;
pub mod load;
pub mod matcher;
pub mod model;
pub mod names;
pub mod people;
pub mod rut;
pub mod status;
pub mod summary;
pub mod sync;

pub use config::{JobConfig, JobMode};
pub use dedup::resolve_duplicate_keys;
pub use email::{normalize_email, resolve_duplicate_emails, EmailRegistry};
pub use engine::run;
pub use error::ReconError;
pub use ids::{extract_active_ids, IdsOptions};
pub use matcher::{diff_key_sets, KeyDiff};
pub use model::{Artifact, ArtifactKind, JobInput, JobResult, Outcome, ReportSheet, RosterRow, Table};
pub use rut::{combine_rut_dv, normalize_identity_key};
