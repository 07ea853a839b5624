use beer_game_sim::io::reporting;
use beer_game_sim::{Chain, ChainConfig, PolicyKind};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Run a beer distribution game and export what happened.
#[derive(Parser, Debug)]
#[command(name = "beer-game-sim", version, about)]
struct Cli {
    /// Number of time steps to simulate
    #[arg(long, default_value_t = 25)]
    steps: u64,

    /// Seed for demand, lead-time and random-policy sampling
    #[arg(long, default_value_t = 10)]
    seed: u64,

    /// Order placed every step by the externally driven agent
    #[arg(long, default_value_t = 0)]
    action: i64,

    /// JSON file with configuration overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the per-step CSV log
    #[arg(long, default_value = "simulation_results.csv")]
    output: PathBuf,

    /// Play the retailer by hand
    #[arg(long)]
    manual: bool,
}

fn load_config(cli: &Cli) -> Result<ChainConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            ChainConfig::from_overrides(&serde_json::from_str::<serde_json::Value>(&text)?)?
        }
        None => ChainConfig::default(),
    };
    if cli.manual {
        config.agent_types[0] = PolicyKind::Interactive;
    }
    Ok(config)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // 1. SETUP CONFIGURATION
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "could not load configuration");
            return ExitCode::FAILURE;
        }
    };

    // 2. INITIALIZE SIMULATION
    let mut sim = match Chain::with_config(config, cli.seed) {
        Ok(sim) => sim,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    // 3. RUN SIMULATION
    info!(steps = cli.steps, action = cli.action, "running simulation");
    for _ in 0..cli.steps {
        if let Err(e) = sim.step(Some(cli.action)) {
            error!(error = %e, time = sim.time, "simulation stopped");
            break;
        }
        if sim.time % 5 == 0 {
            let retailer = &sim.agents[0];
            info!(
                time = sim.time,
                inventory = retailer.inventory_level,
                backlog = retailer.customer_orders_to_be_filled,
                cost = retailer.current_costs,
                "retailer"
            );
        }
    }

    // 4. EXPORT RESULTS
    if let Err(e) = reporting::write_simulation_log(&cli.output, &sim.history) {
        error!(error = %e, "could not write CSV");
    }

    // 5. PRINT COST ANALYSIS
    println!("\n=== Cost Analysis ===");
    for (stage, cost) in sim.cost_breakdown() {
        println!("{}: ${:.2}", stage, cost);
    }
    println!("Total Supply Chain Cost: ${:.2}", sim.total_supply_chain_cost());
    println!(
        "Delivered to customers: {} (outstanding {})",
        sim.total_delivered, sim.outstanding_demand
    );

    ExitCode::SUCCESS
}
