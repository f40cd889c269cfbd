//! `passvault add`: store a new entry.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{prompt_text, read_secret, vault_layout, Cli};
use crate::config::Settings;
use crate::crypto::generate_password;
use crate::errors::Result;
use crate::vault::Vault;

/// Execute the `add` command.
///
/// Adding does not need the master password: the secret is sealed to the
/// master public key.
pub fn execute(cli: &Cli, path: &str, username: Option<&str>, generate: bool) -> Result<()> {
    let layout = vault_layout(cli)?;
    let mut vault = Vault::open(layout)?;

    // Fail on bad or taken paths before asking for anything.
    vault.registry().check_available(path, None)?;

    let username = match username {
        Some(u) => u.to_string(),
        None => prompt_text("Username")?,
    };

    let secret = if generate {
        let settings = Settings::load(vault.layout().root())?;
        Zeroizing::new(generate_password(settings.generated_password_length)?)
    } else {
        read_secret("Password")?
    };

    vault.add(path, &username, &secret)?;

    let detail = generate.then_some("generated password");
    crate::audit::log_audit(vault.layout(), "add", Some(path), detail);

    output::success(&format!(
        "Entry '{path}' added ({} total)",
        vault.list().len()
    ));
    if generate {
        output::tip(&format!("Run `passvault show {path} --copy` to copy the generated password."));
    }

    Ok(())
}
