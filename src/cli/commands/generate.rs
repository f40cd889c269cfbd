//! `passvault generate`: print a random password.

use crate::cli::{vault_layout, Cli};
use crate::config::Settings;
use crate::crypto::generate_password;
use crate::errors::Result;

/// Execute the `generate` command.  Works without a vault; the default
/// length comes from `settings.toml` when one exists.
pub fn execute(cli: &Cli, length: Option<usize>) -> Result<()> {
    let length = match length {
        Some(n) => n,
        None => {
            let layout = vault_layout(cli)?;
            Settings::load(layout.root())?.generated_password_length
        }
    };

    let password = zeroize::Zeroizing::new(generate_password(length)?);
    println!("{}", password.as_str());

    Ok(())
}
