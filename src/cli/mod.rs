//! Argument parsing, shared prompts, and one module per subcommand.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;

use zeroize::Zeroizing;

use crate::errors::{PassVaultError, Result};
use crate::vault::VaultLayout;

const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable consulted for the master password (CI/scripts).
pub const PASSWORD_ENV: &str = "PASSVAULT_PASSWORD";

/// PassVault CLI: local encrypted password manager.
#[derive(Parser)]
#[command(
    name = "passvault",
    about = "Local encrypted password manager",
    version
)]
pub struct Cli {
    /// With no subcommand, lists the vault.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Vault directory (default: ~/.passvault)
    #[arg(long, env = "PASSVAULT_DIR", global = true)]
    pub vault_dir: Option<PathBuf>,

    /// Print debug logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new vault and choose the master password
    Init,

    /// Add a new entry (e.g. `add money/bank`)
    Add {
        /// Entry path, `/`-separated
        path: String,
        /// Username (omit for interactive prompt)
        #[arg(short, long)]
        username: Option<String>,
        /// Generate a random password instead of prompting for one
        #[arg(short, long)]
        generate: bool,
    },

    /// Decrypt and display an entry
    Show {
        /// Entry path
        path: String,
        /// Copy the password to the clipboard instead of printing it
        #[arg(short, long)]
        copy: bool,
    },

    /// Change an entry's username or password
    Edit {
        /// Entry path
        path: String,
        /// New username
        #[arg(short, long, conflicts_with = "password")]
        username: Option<String>,
        /// Replace the password (rotates the entry key)
        #[arg(short, long)]
        password: bool,
    },

    /// Move an entry to a new path
    Rename {
        /// Current entry path
        path: String,
        /// New entry path (omit for interactive prompt)
        new_path: Option<String>,
    },

    /// Delete an entry
    Delete {
        /// Entry path
        path: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// List all entries
    List {
        /// Show a table instead of a tree
        #[arg(long)]
        table: bool,
    },

    /// Print a random password
    Generate {
        /// Password length (default from settings, normally 20)
        #[arg(short, long)]
        length: Option<usize>,
    },

    /// Show recent vault operations
    #[cfg(feature = "audit-log")]
    Audit {
        /// How many operations to show
        #[arg(long, default_value = "50")]
        last: usize,
    },

    /// Print a shell completion script
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Resolve the vault layout from `--vault-dir` / `PASSVAULT_DIR`, or the
/// default `~/.passvault`.
pub fn vault_layout(cli: &Cli) -> Result<VaultLayout> {
    VaultLayout::resolve(cli.vault_dir.as_deref())
}

/// A non-empty `PASSVAULT_PASSWORD`, for scripts and tests.
fn password_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

fn hidden_input(prompt: &str, confirm: Option<(&str, &str)>) -> Result<Zeroizing<String>> {
    let mut input = dialoguer::Password::new().with_prompt(prompt);
    if let Some((again, mismatch)) = confirm {
        input = input.with_confirmation(again, mismatch);
    }
    input
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| PassVaultError::CommandFailed(format!("prompt aborted: {e}")))
}

/// The master password of an existing vault.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    match password_from_env() {
        Some(pw) => Ok(pw),
        None => hidden_input("Master password", None),
    }
}

/// A master password for a new vault, at least eight characters long.
/// Interactive entry is asked twice and repeats until it is long enough.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return if pw.len() >= MIN_PASSWORD_LEN {
            Ok(pw)
        } else {
            Err(PassVaultError::CommandFailed(format!(
                "master password must be at least {MIN_PASSWORD_LEN} characters"
            )))
        };
    }

    loop {
        let pw = hidden_input(
            "New master password",
            Some(("Repeat master password", "The two entries differ")),
        )?;
        if pw.len() >= MIN_PASSWORD_LEN {
            return Ok(pw);
        }
        output::warning(&format!("Use at least {MIN_PASSWORD_LEN} characters."));
    }
}

/// Prompt for a line of plain text (usernames, paths).
pub fn prompt_text(label: &str) -> Result<String> {
    dialoguer::Input::<String>::new()
        .with_prompt(label)
        .interact_text()
        .map_err(|e| PassVaultError::CommandFailed(format!("input prompt: {e}")))
}

/// Read a secret value, either piped on stdin or from a hidden prompt.
///
/// Piped input has its trailing newline stripped.
pub fn read_secret(label: &str) -> Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            return Err(PassVaultError::CommandFailed(
                "no secret value on stdin".into(),
            ));
        }
        return Ok(Zeroizing::new(trimmed.to_string()));
    }

    hidden_input(label, Some(("Repeat", "The two entries differ")))
}
