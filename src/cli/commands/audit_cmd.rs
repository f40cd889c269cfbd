use crate::audit::AuditLog;
use crate::cli::output;
use crate::cli::{vault_layout, Cli};
use crate::errors::{PassVaultError, Result};

/// `passvault audit [--last N]`: print the most recent recorded operations.
pub fn execute(cli: &Cli, last: usize) -> Result<()> {
    let layout = vault_layout(cli)?;
    if !layout.is_initialized() {
        return Err(PassVaultError::NotInitialized(layout.root().to_path_buf()));
    }

    let events = AuditLog::open(layout.root())?.recent(last)?;
    if events.is_empty() {
        output::info("Nothing recorded yet.");
    } else {
        output::print_audit_table(&events);
    }
    Ok(())
}
