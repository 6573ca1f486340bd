//! Ghostcomm simulator CLI
//!
//! Compares how much ghost exchange latency the cooperative and background
//! strategies hide behind a fixed compute phase.

use clap::Parser;
use ghostcomm_scheduler::{CommStrategy, PinningMode};
use ghostcomm_simulator::{ExchangeConfig, Simulator, SimulatorConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ghostcomm-sim")]
#[command(about = "Simulate a solver loop overlapping ghost exchange with compute")]
#[command(version)]
struct Cli {
    /// Communication strategy (cooperative, background, or both)
    #[arg(short, long, default_value = "both")]
    strategy: String,

    /// Number of ghost clusters
    #[arg(long, default_value = "4")]
    clusters: u32,

    /// Number of time steps
    #[arg(long, default_value = "100")]
    steps: u64,

    /// Simulated time per step
    #[arg(long, default_value = "0.01")]
    dt: f64,

    /// Compute time per step (e.g., "2ms")
    #[arg(long, default_value = "2ms")]
    compute: humantime::Duration,

    /// How often the solver calls progression while computing
    #[arg(long, default_value = "100us")]
    progress_interval: humantime::Duration,

    /// Base exchange latency
    #[arg(long, default_value = "1ms")]
    latency: humantime::Duration,

    /// Extra uniform latency per cycle
    #[arg(long, default_value = "500us")]
    jitter: humantime::Duration,

    /// Progress calls needed per exchange
    #[arg(long, default_value = "2")]
    stages: u32,

    /// Random seed
    #[arg(long, default_value = "12345")]
    seed: u64,

    /// Do not pin the background worker
    #[arg(long)]
    no_pin: bool,
}

fn parse_strategies(s: &str) -> Result<Vec<CommStrategy>, Box<dyn std::error::Error>> {
    if s.eq_ignore_ascii_case("both") {
        return Ok(vec![CommStrategy::Cooperative, CommStrategy::Background]);
    }
    Ok(vec![s.parse()?])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let strategies = parse_strategies(&cli.strategy)?;

    let exchange = ExchangeConfig::default()
        .with_latency(*cli.latency)
        .with_jitter(*cli.jitter)
        .with_stages(cli.stages);
    let pinning = if cli.no_pin {
        PinningMode::Disabled
    } else {
        PinningMode::FreeCpus
    };

    for (i, strategy) in strategies.into_iter().enumerate() {
        let config = SimulatorConfig::new(cli.clusters, cli.steps)
            .with_dt(cli.dt)
            .with_compute_time(*cli.compute)
            .with_progress_interval(*cli.progress_interval)
            .with_exchange(exchange.clone())
            .with_strategy(strategy)
            .with_pinning(pinning)
            .with_seed(cli.seed);

        if i > 0 {
            println!();
        }
        let report = Simulator::new(config)?.run()?;
        report.print();
    }

    Ok(())
}
