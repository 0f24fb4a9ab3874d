use clap::Parser;
use council_node::{
    cli::{Cli, Commands},
    config::Config,
    error::RuntimeError,
    runtime::run_scenario,
    scenario::Scenario,
};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;

/// Stdout for operators, plus a `consensus`-target event file per scenario.
fn init_tracing(log_dir: &str, scenario: u8) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(log_dir, format!("consensus-scenario-{}.log", scenario));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let consensus_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            metadata.target() == "consensus"
        }));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,council_node=debug".into()),
        )
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            metadata.target() != "consensus"
        }));

    tracing_subscriber::registry()
        .with(consensus_layer)
        .with(stdout_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            for scenario in Scenario::catalog() {
                println!("{}", scenario);
            }
        }
        Commands::InitConfig { out } => {
            Config::default().save_to_file(&out)?;
            println!("Config written to {}", out.display());
        }
        Commands::Run { scenario, run_for } => {
            let mut config = Config::load_or_default(&cli.config)?;
            if let Some(secs) = run_for {
                config.run_for_secs = secs;
            }
            let plan = Scenario::by_id(scenario).ok_or(RuntimeError::UnknownScenario(scenario))?;

            let _guard = init_tracing(&config.log_dir, plan.id);
            info!("--- COUNCIL ELECTION ---");
            info!("Config: {}", cli.config.display());
            info!("Running for {}s", config.run_for_secs);

            run_scenario(&config, &plan, config.run_for()).await?;
            info!("🏁 Scenario {} finished", plan.id);
        }
    }

    Ok(())
}
