//! `passvault show`: decrypt and display an entry.

use console::style;

use crate::cli::output;
use crate::cli::{prompt_password, vault_layout, Cli};
use crate::errors::{PassVaultError, Result};
use crate::vault::Vault;

/// Execute the `show` command.
pub fn execute(cli: &Cli, path: &str, copy: bool) -> Result<()> {
    let layout = vault_layout(cli)?;
    let vault = Vault::open(layout)?;

    // Unknown paths fail before the password prompt.
    vault.registry().find(path)?;

    let password = prompt_password()?;
    let key = vault.unlock(password.as_bytes())?;
    let credential = vault.show(&key, path)?;

    crate::audit::log_audit(vault.layout(), "show", Some(path), copy.then_some("copied"));

    println!("{} {}", style("Path:").bold(), credential.path);
    println!("{} {}", style("Username:").bold(), credential.username);

    if copy {
        copy_to_clipboard(&credential.secret)?;
        output::success("Password copied to clipboard.");
    } else {
        println!("{} {}", style("Password:").bold(), credential.secret.as_str());
    }

    Ok(())
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| PassVaultError::ClipboardError(e.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|e| PassVaultError::ClipboardError(e.to_string()))
}
