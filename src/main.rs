use clap::{CommandFactory, Parser};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use passvault::cli::{output, vault_layout, Cli, Commands};
use passvault::errors::Result;

fn main() {
    let cli = Cli::parse();

    // `PASSVAULT_LOG` overrides; otherwise warnings only, or debug with -v.
    let filter = EnvFilter::try_from_env("PASSVAULT_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("passvault=debug")
        } else {
            EnvFilter::new("passvault=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = run(&cli) {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    use passvault::cli::commands;

    let Some(command) = &cli.command else {
        // No subcommand: list the vault, or show help if there isn't one.
        if vault_layout(cli)?.is_initialized() {
            return commands::list::execute(cli, false);
        }
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Init => commands::init::execute(cli),
        Commands::Add {
            path,
            username,
            generate,
        } => commands::add::execute(cli, path, username.as_deref(), *generate),
        Commands::Show { path, copy } => commands::show::execute(cli, path, *copy),
        Commands::Edit {
            path,
            username,
            password,
        } => commands::edit::execute(cli, path, username.as_deref(), *password),
        Commands::Rename { path, new_path } => {
            commands::rename::execute(cli, path, new_path.as_deref())
        }
        Commands::Delete { path, force } => commands::delete::execute(cli, path, *force),
        Commands::List { table } => commands::list::execute(cli, *table),
        Commands::Generate { length } => commands::generate::execute(cli, *length),
        #[cfg(feature = "audit-log")]
        Commands::Audit { last } => commands::audit_cmd::execute(cli, *last),
        Commands::Completions { shell } => commands::completions::execute(*shell),
    }
}
