//! perfpredict - Main Entry Point

use clap::Parser;
use perfpredict::cli::{cmd_fit, cmd_generate, cmd_list, Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "perfpredict=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List => cmd_list()?,
        Commands::Generate { config, output } => {
            cmd_generate(&config, output.as_deref())?;
        }
        Commands::Fit { config, train, predict, scale_mode, repetitions, output } => {
            cmd_fit(
                &config,
                &train,
                predict.as_deref(),
                scale_mode.into(),
                repetitions,
                output.as_deref(),
            )?;
        }
    }

    Ok(())
}
