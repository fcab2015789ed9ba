// padron CLI - roster reconciliation jobs for benefits platforms

mod exit_codes;
mod ids;
mod job;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "padron")]
#[command(about = "Reconcile insured-people rosters and build bulk-import files")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output (debug level)
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only warnings and errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a reconciliation job from a TOML job file
    #[command(after_help = "\
Examples:
  padron run sonda.job.toml
  padron run sonda.job.toml --json
  padron run sonda.job.toml --output resultado.json
  padron run sync.job.toml --data-dir ./entrada --output-dir ./salida
  padron run status.job.toml --dry-run --strict")]
    Run {
        /// Path to the .job.toml file
        config: PathBuf,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Override the job's data directory
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,

        /// Override the job's output directory
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Classify only; write no roster or report files
        #[arg(long)]
        dry_run: bool,

        /// Exit 1 when any inconsistency is found
        #[arg(long)]
        strict: bool,
    },

    /// Validate a job file without running it
    #[command(after_help = "\
Examples:
  padron validate sonda.job.toml
  padron validate sonda.job.toml --check-files")]
    Validate {
        /// Path to the .job.toml file
        config: PathBuf,

        /// Also locate each role's input file in the data directory
        #[arg(long)]
        check_files: bool,

        /// Override the job's data directory
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,
    },

    /// Print the normalized form of RUTs or emails
    #[command(after_help = "\
Examples:
  padron normalize 12.345.678-5 '00.123.456-k'
  padron normalize 20640480.0 --dv 0
  padron normalize --email ' Ana.Soto@Empresa.CL '")]
    Normalize {
        /// Values to normalize
        #[arg(required = true)]
        values: Vec<String>,

        /// Check digit held in a separate column
        #[arg(long, conflicts_with = "email")]
        dv: Option<String>,

        /// Treat values as email addresses
        #[arg(long)]
        email: bool,
    },

    /// Extract active membership ids from a platform export
    #[command(after_help = "\
Examples:
  padron ids miembros.xlsx
  padron ids miembros.csv --output ids.txt
  padron ids miembros.xlsx --status-column Estado --active-value Vigente")]
    Ids {
        /// Export file (xlsx, xls, ods or csv)
        file: PathBuf,

        /// Output file
        #[arg(long, short = 'o', default_value = ids::DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Membership status column
        #[arg(long, default_value = "Estado de la membresía")]
        status_column: String,

        /// Status value that marks an active membership
        #[arg(long, default_value = "Activo")]
        active_value: String,

        /// Membership id column
        #[arg(long, default_value = "MembershipId")]
        id_column: String,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  padron-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  padron-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

/// Log to stderr. `RUST_LOG` wins over the verbosity flags.
fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Run { config, json, output, data_dir, output_dir, dry_run, strict } => {
            job::cmd_run(job::RunArgs { config, json, output, data_dir, output_dir, dry_run, strict })
        }
        Commands::Validate { config, check_files, data_dir } => {
            job::cmd_validate(config, check_files, data_dir)
        }
        Commands::Normalize { values, dv, email } => cmd_normalize(values, dv, email),
        Commands::Ids { file, output, status_column, active_value, id_column } => {
            let options = padron_recon::IdsOptions { status_column, active_value, id_column };
            ids::cmd_ids(file, output, options)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// normalize
// ============================================================================

fn cmd_normalize(values: Vec<String>, dv: Option<String>, email: bool) -> Result<(), CliError> {
    let mut invalid = 0usize;

    for value in &values {
        if email {
            let normalized = padron_recon::normalize_email(value);
            if normalized.is_empty() {
                eprintln!("{value:?}: empty email");
                invalid += 1;
            } else {
                println!("{normalized}");
            }
            continue;
        }

        match padron_recon::rut::row_key(value, dv.as_deref()) {
            Some(key) => println!("{key}"),
            None => {
                eprintln!("{value:?}: no RUT digits");
                invalid += 1;
            }
        }
    }

    if invalid > 0 {
        return Err(CliError::new(EXIT_ERROR, format!("{invalid} of {} values could not be normalized", values.len())));
    }
    Ok(())
}
