//! Voltlab - Entry Point
//!
//! Interactive operator console for the workbench: reads
//! natural-language commands, compiles them into tool-call plans, and
//! runs them on the (simulated) bench while logging one observation per
//! step.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::runtime::Runtime;

use voltlab::bench::{SimulatedArm, SimulatedPotentiostat, Workbench};
use voltlab::command::{interpret, ExecutionEngine, SampleDomain, ToolRegistry};
use voltlab::core::config::LabConfig;
use voltlab::core::error::Result;
use voltlab::llm::client::LlmClient;
use voltlab::trace::sink::JsonlSink;

/// Natural-language control for a robotic electrochemistry workbench
#[derive(Parser, Debug)]
#[command(name = "voltlab")]
#[command(about = "Compile operator commands into workbench actions")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the observation log directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Fixed seed for the simulated potentiostat (reproducible runs)
    #[arg(long)]
    seed: Option<u64>,

    /// Run a single command and exit instead of starting the console
    #[arg(long)]
    command: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voltlab=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => LabConfig::load(path)?,
        None => LabConfig::default(),
    };
    if let Some(dir) = args.log_dir {
        config.log_dir = dir;
    }
    if let Some(seed) = args.seed {
        config.instrument_seed = Some(seed);
    }
    config.validate()?;

    tracing::info!("voltlab starting");

    // The runtime only drives the inference calls; compilation and
    // execution stay strictly sequential.
    let rt = Runtime::new()?;

    let client = LlmClient::from_env(Duration::from_secs(config.llm_timeout_secs))?;
    let registry = ToolRegistry::new();
    let domain = SampleDomain::new(config.sample_min, config.sample_max);

    let bench = Workbench::new(
        Box::new(SimulatedArm::new(Duration::from_millis(config.move_delay_ms))),
        Box::new(SimulatedPotentiostat::new(config.instrument_seed)),
    );
    let sink = JsonlSink::create(&config.log_dir)?;
    let mut engine = ExecutionEngine::new(bench, Box::new(sink), &config);

    engine.startup()?;

    if let Some(text) = args.command {
        run_command(&rt, &client, &registry, domain, &mut engine, &text);
        return Ok(());
    }

    println!("voltlab console - type a command, 'quit' to exit.");
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" || input == "q" {
            break;
        }

        run_command(&rt, &client, &registry, domain, &mut engine, input);
    }

    tracing::info!("voltlab shutting down");
    Ok(())
}

/// Compile and run one command, reporting a single line to the operator.
///
/// Per-step failures are only visible in the trace; the command itself
/// reports completion once the whole plan has been attempted.
fn run_command(
    rt: &Runtime,
    client: &LlmClient,
    registry: &ToolRegistry,
    domain: SampleDomain,
    engine: &mut ExecutionEngine,
    text: &str,
) {
    match rt.block_on(interpret(client, registry, domain, text)) {
        Ok(plan) => match engine.run(&plan) {
            Ok(Some(value)) => println!("[OK] {:.3}", value),
            Ok(None) => println!("[OK]"),
            Err(err) => println!("[Error] {}", err),
        },
        Err(err) => println!("[Error] {}", err),
    }
}
