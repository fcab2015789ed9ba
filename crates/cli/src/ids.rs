//! `padron ids`: active membership ids from a platform export.

use std::path::PathBuf;

use padron_io::SheetSelector;
use padron_recon::IdsOptions;

use crate::exit_codes::{io_exit_code, recon_exit_code};
use crate::CliError;

pub const DEFAULT_OUTPUT: &str = "membershipIds_activos.txt";

pub fn cmd_ids(file: PathBuf, output: PathBuf, options: IdsOptions) -> Result<(), CliError> {
    let table = padron_io::read_table(&file, &SheetSelector::First, 0)
        .map_err(|e| CliError::new(io_exit_code(&e), e.to_string()))?;

    let ids = padron_recon::extract_active_ids(&table, &options).map_err(|e| {
        CliError::new(recon_exit_code(&e), e.to_string()).with_hint(format!(
            "columns in {}: {}",
            file.display(),
            table.headers.join(", ")
        ))
    })?;

    if ids.is_empty() {
        eprintln!(
            "no rows with {} = {:?} in {}; nothing written",
            options.status_column,
            options.active_value,
            file.display()
        );
        return Ok(());
    }

    padron_io::quoted::write_id_list(&ids, &output)
        .map_err(|e| CliError::new(io_exit_code(&e), e.to_string()))?;
    eprintln!("{} of {} memberships active, wrote {}", ids.len(), table.len(), output.display());
    Ok(())
}
