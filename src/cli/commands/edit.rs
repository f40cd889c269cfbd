//! `passvault edit`: change an entry's username or password.
//!
//! Usage:
//!   passvault edit money/bank --username alice   # new username
//!   passvault edit money/bank --password         # new password, new entry key
//!   passvault edit money/bank                    # choose interactively

use dialoguer::Select;

use crate::cli::output;
use crate::cli::{prompt_password, prompt_text, read_secret, vault_layout, Cli};
use crate::errors::{PassVaultError, Result};
use crate::vault::Vault;

/// Which part of an entry is being changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Username,
    Password,
}

/// Execute the `edit` command.
pub fn execute(cli: &Cli, path: &str, username: Option<&str>, password: bool) -> Result<()> {
    let layout = vault_layout(cli)?;
    let mut vault = Vault::open(layout)?;
    vault.registry().find(path)?;

    let field = match (username, password) {
        (Some(_), _) => Field::Username,
        (None, true) => Field::Password,
        (None, false) => choose_field()?,
    };

    // Authenticate before asking for the new value.
    let master = prompt_password()?;
    let key = vault.unlock(master.as_bytes())?;

    match field {
        Field::Username => {
            let new_username = match username {
                Some(u) => u.to_string(),
                None => prompt_text("New username")?,
            };
            vault.edit_username(&key, path, &new_username)?;
            crate::audit::log_audit(vault.layout(), "edit", Some(path), Some("username"));
            output::success(&format!("Username for '{path}' updated"));
        }
        Field::Password => {
            let secret = read_secret("New password")?;
            vault.edit_secret(&key, path, &secret)?;
            crate::audit::log_audit(vault.layout(), "edit", Some(path), Some("password"));
            output::success(&format!("Password for '{path}' updated"));
        }
    }

    Ok(())
}

fn choose_field() -> Result<Field> {
    let choice = Select::new()
        .with_prompt("What do you want to edit?")
        .items(&["Username", "Password"])
        .default(0)
        .interact_opt()
        .map_err(|e| PassVaultError::CommandFailed(format!("select prompt: {e}")))?;

    match choice {
        Some(0) => Ok(Field::Username),
        Some(_) => Ok(Field::Password),
        None => Err(PassVaultError::UserCancelled),
    }
}
