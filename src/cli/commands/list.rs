//! `passvault list`: show every entry.  No password needed: the
//! registry holds only paths, usernames and public keys.

use crate::cli::output;
use crate::cli::{vault_layout, Cli};
use crate::errors::Result;
use crate::vault::Vault;

/// Execute the `list` command.
pub fn execute(cli: &Cli, table: bool) -> Result<()> {
    let layout = vault_layout(cli)?;
    let vault = Vault::open(layout)?;

    if table {
        output::info(&format!("{} entries", vault.list().len()));
        output::print_entries_table(vault.list());
    } else {
        output::print_entries_tree(vault.registry());
    }

    Ok(())
}
