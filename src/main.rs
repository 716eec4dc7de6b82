use clap::Parser;
use dotenv::dotenv;

use spreadhedge::cli::{Cli, Commands, PipelineCliConfig};
use spreadhedge::commands::{run_backtest, run_metrics};
use spreadhedge::observability::init_tracing;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables (RUST_LOG) from the .env file
    dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.verbose)?;

    match cli.command {
        Commands::Backtest {
            data,
            pipeline,
            output_dir,
        } => {
            let config = PipelineCliConfig::from_args(&data, &pipeline, &output_dir)?;
            run_backtest(config)?;
        }
        Commands::Metrics {
            data,
            pipeline,
            output_dir,
        } => {
            let config = PipelineCliConfig::from_args(&data, &pipeline, &output_dir)?;
            run_metrics(config)?;
        }
    }

    Ok(())
}
