//! netprop - command-line entry point
//!
//! Runs DIAMOnD, RWR or both on an edge-list network and a seed list.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use netprop::pipeline::Pipeline;
use netprop::propagation::OperatorKind;
use netprop::{Config, ErrorKind, PropagationError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "netprop")]
#[command(about = "Seed-based network propagation (DIAMOnD and random walk with restart)")]
struct Cli {
    /// YAML config file (default: ./netprop.yaml if present)
    #[arg(long, global = true, env = "NETPROP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand the seeds with DIAMOnD
    Diamond {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        diamond: DiamondArgs,
    },

    /// Rank nodes by random walk with restart
    Rwr {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        rwr: RwrArgs,
    },

    /// Run both engines and compare their modules
    Run {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        diamond: DiamondArgs,
        #[command(flatten)]
        rwr: RwrArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Edge-list file, one "<nodeA> <nodeB>" pair per line
    #[arg(short, long)]
    network: PathBuf,

    /// Seed list, one identifier per line or comma separated
    #[arg(short, long)]
    seeds: PathBuf,

    /// Output directory (overrides config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[derive(Args)]
struct DiamondArgs {
    /// p-value above which expansion stops
    #[arg(long)]
    significance_cutoff: Option<f64>,

    /// Maximum number of nodes DIAMOnD adds
    #[arg(long)]
    max_added: Option<usize>,

    /// Maximum number of DIAMOnD iterations
    #[arg(long)]
    diamond_max_iterations: Option<usize>,
}

#[derive(Args)]
struct RwrArgs {
    /// Restart probability α
    #[arg(long)]
    restart_probability: Option<f64>,

    /// L1 convergence tolerance
    #[arg(long)]
    tolerance: Option<f64>,

    /// Maximum number of RWR iterations
    #[arg(long)]
    rwr_max_iterations: Option<usize>,

    /// Number of non-seed nodes added to the RWR module
    #[arg(long)]
    top_k: Option<usize>,

    /// Transition operator: auto, sparse or dense
    #[arg(long)]
    operator: Option<OperatorKind>,
}

impl InputArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
    }
}

impl DiamondArgs {
    fn apply(&self, config: &mut Config) {
        let d = &mut config.diamond;
        if let Some(v) = self.significance_cutoff {
            d.significance_cutoff = v;
        }
        if let Some(v) = self.max_added {
            d.max_added = v;
        }
        if let Some(v) = self.diamond_max_iterations {
            d.max_iterations = v;
        }
    }
}

impl RwrArgs {
    fn apply(&self, config: &mut Config) {
        let r = &mut config.rwr;
        if let Some(v) = self.restart_probability {
            r.restart_probability = v;
        }
        if let Some(v) = self.tolerance {
            r.tolerance = v;
        }
        if let Some(v) = self.rwr_max_iterations {
            r.max_iterations = v;
        }
        if let Some(v) = self.top_k {
            r.top_k = v;
        }
        if let Some(v) = self.operator {
            r.operator = v;
        }
    }
}

fn main() -> ExitCode {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,netprop=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Exit status by error family: 2 input, 3 seed matching, 4 output.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<PropagationError>().map(PropagationError::kind) {
        Some(ErrorKind::Input) => 2,
        Some(ErrorKind::SeedMatching) => 3,
        Some(ErrorKind::Output) => 4,
        Some(ErrorKind::Computation) | None => 1,
    }
}

fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let mut config = Config::from_yaml_and_env(cli.config.as_deref())?;

    match cli.command {
        Commands::Diamond { input, diamond } => {
            input.apply(&mut config);
            diamond.apply(&mut config);
            let pipeline = Pipeline::new(config)?;
            let (run, files) = pipeline
                .diamond(&input.network, &input.seeds)
                .with_context(|| format!("DIAMOnD on {}", input.network.display()))?;
            tracing::info!(
                "Module: {} nodes ({} seeds + {} added). Stop criterion: {}",
                run.outcome.module_size(),
                run.outcome.seeds.len(),
                run.outcome.added.len(),
                run.outcome.stop_reason
            );
            tracing::info!("Gene list: {}", files.genes.display());
        }
        Commands::Rwr { input, rwr } => {
            input.apply(&mut config);
            rwr.apply(&mut config);
            let pipeline = Pipeline::new(config)?;
            let (run, files) = pipeline
                .rwr(&input.network, &input.seeds)
                .with_context(|| format!("RWR on {}", input.network.display()))?;
            tracing::info!(
                "Module: {} nodes ({} added). Stop criterion: {}",
                run.outcome.module_size(),
                run.outcome.added.len(),
                run.outcome.stop_reason
            );
            tracing::info!("Gene list: {}", files.genes.display());
        }
        Commands::Run {
            input,
            diamond,
            rwr,
        } => {
            input.apply(&mut config);
            diamond.apply(&mut config);
            rwr.apply(&mut config);
            let pipeline = Pipeline::new(config)?;
            let (run, files) = pipeline
                .run_all(&input.network, &input.seeds)
                .with_context(|| format!("propagation on {}", input.network.display()))?;
            tracing::info!(
                "DIAMOnD module: {} nodes, RWR module: {} nodes, shared: {} (Jaccard {:.3})",
                run.diamond.outcome.module_size(),
                run.rwr.outcome.module_size(),
                run.comparison.shared.len(),
                run.comparison.jaccard
            );
            if let Some(path) = files.comparison {
                tracing::info!("Comparison: {}", path.display());
            }
        }
    }

    Ok(())
}
