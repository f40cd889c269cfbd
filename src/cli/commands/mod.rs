//! One module per subcommand.  Each exposes an `execute` function that
//! returns `Result<()>`; `main` turns errors into a message and exit code.

#[cfg(feature = "audit-log")]
pub mod audit_cmd;
pub mod add;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod generate;
pub mod init;
pub mod list;
pub mod rename;
pub mod show;
