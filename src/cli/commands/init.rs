//! `passvault init`: create a new vault and choose the master password.

use crate::cli::output;
use crate::cli::{prompt_new_password, vault_layout, Cli};
use crate::config::Settings;
use crate::errors::{PassVaultError, Result};
use crate::vault::Vault;

pub fn execute(cli: &Cli) -> Result<()> {
    let layout = vault_layout(cli)?;

    if layout.is_initialized() {
        output::tip("Use `passvault add <path>` to add entries to the existing vault.");
        return Err(PassVaultError::VaultAlreadyExists(layout.root().to_path_buf()));
    }

    // A settings.toml may be placed in the directory ahead of init.
    let settings = Settings::load(layout.root())?;
    let password = prompt_new_password()?;
    let vault = Vault::init(layout, password.as_bytes(), &settings.argon2_params())?;

    crate::audit::log_audit(vault.layout(), "init", None, Some("vault created"));

    output::success(&format!(
        "Vault created at {}",
        vault.layout().root().display()
    ));
    output::tip("Run `passvault add <path>` to add an entry.");
    output::tip("Run `passvault generate` to create a strong password.");

    Ok(())
}
