//! `passvault delete <path>`: drop an entry and its blob.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{prompt_password, vault_layout, Cli};
use crate::errors::{PassVaultError, Result};
use crate::vault::Vault;

pub fn execute(cli: &Cli, path: &str, force: bool) -> Result<()> {
    let layout = vault_layout(cli)?;
    let mut vault = Vault::open(layout)?;
    vault.registry().find(path)?;

    if !force && !confirm_removal(path)? {
        output::info("Kept it.");
        return Ok(());
    }

    let master = prompt_password()?;
    let key = vault.unlock(master.as_bytes())?;

    vault.delete(&key, path)?;

    crate::audit::log_audit(vault.layout(), "delete", Some(path), None);
    output::success(&format!("Deleted entry '{path}'"));

    Ok(())
}

fn confirm_removal(path: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(format!("Permanently remove '{path}' and its sealed password?"))
        .default(false)
        .interact()
        .map_err(|e| PassVaultError::CommandFailed(format!("prompt aborted: {e}")))
}
