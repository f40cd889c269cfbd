//! `passvault rename`: move an entry to a new path.

use crate::cli::output;
use crate::cli::{prompt_password, prompt_text, vault_layout, Cli};
use crate::errors::Result;
use crate::vault::Vault;

/// Execute the `rename` command.
pub fn execute(cli: &Cli, path: &str, new_path: Option<&str>) -> Result<()> {
    let layout = vault_layout(cli)?;
    let mut vault = Vault::open(layout)?;
    vault.registry().find(path)?;

    let master = prompt_password()?;
    let key = vault.unlock(master.as_bytes())?;

    let new_path = match new_path {
        Some(p) => p.to_string(),
        None => prompt_text("New path")?,
    };

    vault.rename(&key, path, &new_path)?;

    crate::audit::log_audit(
        vault.layout(),
        "rename",
        Some(&new_path),
        Some(&format!("from {path}")),
    );
    output::success(&format!("Renamed '{path}' to '{new_path}'"));

    Ok(())
}
