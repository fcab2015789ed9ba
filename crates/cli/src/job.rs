//! `padron run` / `padron validate`: config-driven roster jobs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use padron_recon::{JobConfig, JobInput, JobMode, JobResult};
use serde::Serialize;
use tracing::{debug, info};

use crate::exit_codes::{
    io_exit_code, recon_exit_code, EXIT_JOB_INCONSISTENT, EXIT_JOB_INVALID_CONFIG, EXIT_JOB_OUTPUT,
};
use crate::CliError;

pub struct RunArgs {
    pub config: PathBuf,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub dry_run: bool,
    pub strict: bool,
}

fn job_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError::new(code, msg)
}

/// JSON document for a run: the engine result plus where things came
/// from and went to.
#[derive(Serialize)]
struct RunReport<'a> {
    #[serde(flatten)]
    result: &'a JobResult,
    inputs: BTreeMap<String, String>,
    files: Vec<String>,
}

/// Parsed job plus its resolved directories.
struct LoadedJob {
    config: JobConfig,
    data_dir: PathBuf,
    output_dir: PathBuf,
}

fn load_job(
    config_path: &Path,
    data_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<LoadedJob, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        CliError::args(format!("cannot read job file {}: {e}", config_path.display()))
            .with_hint("pass the path to a .job.toml file")
    })?;

    let config = JobConfig::from_toml(&config_str)
        .map_err(|e| job_err(recon_exit_code(&e), e.to_string()))?;

    // Directories in the job file are relative to the job file itself
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let data_dir = data_dir.unwrap_or_else(|| base_dir.join(&config.data_dir));
    let output_dir = output_dir.unwrap_or_else(|| base_dir.join(&config.output_dir));

    debug!(
        job = %config.name,
        data_dir = %data_dir.display(),
        output_dir = %output_dir.display(),
        "job file loaded"
    );
    Ok(LoadedJob { config, data_dir, output_dir })
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let job = load_job(&args.config, args.data_dir, args.output_dir)?;
    let config = &job.config;

    // Load each role the mode reads
    let mut input = JobInput::default();
    let mut inputs = BTreeMap::new();
    for role_name in config.roles_in_use() {
        let role = config
            .role(role_name)
            .map_err(|e| job_err(EXIT_JOB_INVALID_CONFIG, e.to_string()))?;
        let (path, table) = padron_io::read_role(&job.data_dir, role_name, role).map_err(|e| {
            job_err(io_exit_code(&e), format!("role '{role_name}': {e}"))
                .with_hint(format!("input files are searched in {}", job.data_dir.display()))
        })?;
        inputs.insert(role_name.to_string(), path.display().to_string());
        input.tables.insert(role_name.to_string(), table);
    }

    let result = padron_recon::run(config, &input)
        .map_err(|e| job_err(recon_exit_code(&e), e.to_string()))?;

    // Write artifacts under one shared stamp
    let mut files = Vec::new();
    if args.dry_run {
        info!(artifacts = result.outputs.len(), "dry run, nothing written");
    } else {
        let stamp = padron_io::timestamp();
        for artifact in &result.outputs {
            let path = padron_io::write_artifact(&job.output_dir, artifact, &stamp)
                .map_err(|e| job_err(io_exit_code(&e), e.to_string()))?;
            files.push(path.display().to_string());
        }
    }

    let report = RunReport { result: &result, inputs, files };
    let json_str = serde_json::to_string_pretty(&report)
        .map_err(|e| job_err(EXIT_JOB_OUTPUT, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &json_str)
            .map_err(|e| job_err(EXIT_JOB_OUTPUT, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        println!("{json_str}");
    }

    // Human summary to stderr
    print_summary(&result, &report.files, args.dry_run);

    let inconsistencies = result.summary.inconsistencies();
    if args.strict && inconsistencies > 0 {
        return Err(job_err(
            EXIT_JOB_INCONSISTENT,
            format!("{inconsistencies} inconsistencies found (--strict)"),
        ));
    }

    Ok(())
}

fn print_summary(result: &JobResult, files: &[String], dry_run: bool) {
    let s = &result.summary;
    let rows: Vec<String> = s.rows_read.iter().map(|(role, n)| format!("{role}={n}")).collect();
    eprintln!(
        "{} ({}): read {}",
        result.meta.job_name,
        result.meta.mode,
        rows.join(", ")
    );

    match result.meta.mode {
        JobMode::Compare | JobMode::Status => eprintln!(
            "{} matched, {} quantity mismatches, {} missing in target, {} missing in source, {} misclassified",
            s.matched, s.quantity_mismatches, s.missing_in_target, s.missing_in_source, s.misclassified,
        ),
        JobMode::Sync => eprintln!(
            "{} activations, {} deactivations, {} padded keys, {} suffixed emails",
            s.activations, s.deactivations, s.padded_keys, s.suffixed_emails,
        ),
        JobMode::Load => eprintln!(
            "{} activations, {} padded keys, {} suffixed emails, {} rows skipped",
            s.activations, s.padded_keys, s.suffixed_emails, s.skipped_rows,
        ),
        JobMode::Extract => eprintln!("{} active, {} inactive", s.activations, s.deactivations),
    }

    let invalid: usize = s.invalid_keys.values().sum();
    if invalid > 0 {
        eprintln!("{invalid} rows without a usable RUT were ignored");
    }

    if dry_run {
        for artifact in &result.artifacts {
            eprintln!("  would write {} ({}, {} records)", artifact.stem, artifact.kind, artifact.records);
        }
    } else {
        for file in files {
            eprintln!("  wrote {file}");
        }
    }
}

pub fn cmd_validate(config_path: PathBuf, check_files: bool, data_dir: Option<PathBuf>) -> Result<(), CliError> {
    let job = load_job(&config_path, data_dir, None)?;
    let config = &job.config;

    let roles = config.roles_in_use();
    eprintln!(
        "ok: {} ({}), roles: {}, tag: {}",
        config.name,
        config.mode,
        roles.join(", "),
        config.tag()
    );

    if check_files {
        for role_name in roles {
            let role = config
                .role(role_name)
                .map_err(|e| job_err(EXIT_JOB_INVALID_CONFIG, e.to_string()))?;
            let path = padron_io::resolve_input(&job.data_dir, &role.file)
                .map_err(|e| job_err(io_exit_code(&e), format!("role '{role_name}': {e}")))?;
            eprintln!("  {role_name}: {}", path.display());
        }
    }

    Ok(())
}
