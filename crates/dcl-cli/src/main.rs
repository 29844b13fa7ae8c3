//! CLI entry point - the composition root.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use dcl_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers, logging};
use dcl_core::{EnvProvider, SystemEnv};
use dcl_mcp::Gateway;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            eprintln!("Error: {e:#}");
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let env: Arc<dyn EnvProvider> = Arc::new(SystemEnv);
    let config = CliConfig::from_cli(&cli, env.as_ref());

    // Only `version` runs without building the registry
    match cli.command.unwrap_or_default() {
        Commands::Version => println!("{}", Gateway::version()),
        Commands::Serve => handlers::serve::execute(&bootstrap(&config, env)).await?,
        Commands::Catalog => handlers::catalog::execute(&bootstrap(&config, env)),
        Commands::Tools { server } => {
            handlers::tools::execute(&bootstrap(&config, env), &server).await;
        }
        Commands::Call { server, tool, args } => {
            let ctx = bootstrap(&config, env);
            handlers::call::execute(&ctx, &server, &tool, args.as_deref()).await?;
        }
    }

    Ok(())
}
