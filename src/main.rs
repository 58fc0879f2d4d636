use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pco_live::config::Config;
use pco_live::error::LiveErrorTrait;
use pco_live::models::NavigationState;
use pco_live::session::{Action, ActionOutcome, LiveSession, PlanTarget};

#[derive(Parser)]
#[command(
    name = "pco-live",
    version,
    about = "Drive Planning Center Services LIVE plans from the command line",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file (defaults to PCO_* environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Step(Step),

    /// Keep one session open and read commands from stdin, one per line
    ///
    /// Control taken earlier in the same run is remembered, so moving a plan
    /// this session already owns costs no toggle. One-shot commands start
    /// from a fresh session and always re-acquire control.
    Run,
}

/// A single command, either from the command line or a `run` input line
#[derive(Subcommand)]
enum Step {
    /// Load and list service types and upcoming plans
    Catalog,

    /// Go to the next item (takes control first)
    Next(TargetArgs),

    /// Go to the previous item (takes control first)
    Previous(TargetArgs),

    /// Take control of a plan
    TakeControl(TargetArgs),

    /// Release control of a plan
    ReleaseControl(TargetArgs),
}

/// Plan addressing: plan only = from catalog, both = explicit,
/// service type only = its next plan
#[derive(Args)]
struct TargetArgs {
    /// Service type id
    #[arg(short, long)]
    service_type: Option<String>,

    /// Plan id
    #[arg(short, long)]
    plan: Option<String>,
}

/// One line read in `run` mode
#[derive(Parser)]
#[command(name = "pco-live", no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    step: Step,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    let format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    setup_tracing(format, &config.logging.level, cli.verbose)?;

    config.validate().context("Invalid configuration")?;

    let session = LiveSession::from_config(&config)?;
    let mut stdout = std::io::stdout();

    match cli.command {
        Commands::Step(step) => {
            if let Err(e) = execute(&session, step, &mut stdout).await {
                report(&e);
                return Err(e);
            }
            Ok(())
        }
        Commands::Run => {
            let stdin = BufReader::new(tokio::io::stdin());
            run(&session, stdin, &mut stdout).await
        }
    }
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("pco_live=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("pco_live={level},warn"))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

/// Read commands line by line against one session until EOF or `quit`
///
/// A failing command is reported and the loop carries on.
async fn run<R, W>(session: &LiveSession, reader: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.first() {
            None => continue,
            Some(&("quit" | "exit")) => break,
            Some(_) => {}
        }

        let step = match Line::try_parse_from(words.iter().copied()) {
            Ok(line) => line.step,
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };

        if let Err(e) = execute(session, step, out).await {
            report(&e);
            writeln!(out, "error: {e:#}")?;
        }
    }

    tracing::info!("Input closed, leaving run mode");
    Ok(())
}

async fn execute<W: Write>(session: &LiveSession, step: Step, out: &mut W) -> Result<()> {
    let (action, args) = match step {
        Step::Catalog => return catalog(session, out).await,
        Step::Next(args) => (Action::Next, args),
        Step::Previous(args) => (Action::Previous, args),
        Step::TakeControl(args) => (Action::TakeControl, args),
        Step::ReleaseControl(args) => (Action::ReleaseControl, args),
    };

    let target = PlanTarget::from_parts(args.service_type.as_deref(), args.plan.as_deref())
        .context("Specify --plan, --service-type, or both")?;

    // Plans picked by id alone are resolved through the catalog
    if matches!(target, PlanTarget::Catalog { .. }) && !session.catalog().await.is_loaded() {
        session.load_catalog().await?;
    }

    tracing::info!(action = %action, target = ?target, "Starting action");

    let outcome = session.perform(action, &target).await?;
    print_outcome(out, action, &outcome)?;
    Ok(())
}

fn report(e: &anyhow::Error) {
    if let Some(e) = e.downcast_ref::<pco_live::error::Error>() {
        if e.is_recoverable() {
            eprintln!("{} (may succeed if retried)", e.category().description());
        }
    }
}

async fn catalog<W: Write>(session: &LiveSession, out: &mut W) -> Result<()> {
    let catalog = session.load_catalog().await?;

    writeln!(out, "Service types")?;
    writeln!(out, "=============")?;
    for entry in catalog.service_type_choices() {
        writeln!(out, "  {:>10}  {}", entry.id, entry.label)?;
    }

    writeln!(out)?;
    writeln!(out, "Plans")?;
    writeln!(out, "=====")?;
    for entry in catalog.plan_choices() {
        writeln!(out, "  {:>10}  {}", entry.id, entry.label)?;
    }

    if !catalog.degraded().is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            "Plans could not be loaded for service types: {}",
            catalog.degraded().join(", ")
        )?;
    }

    Ok(())
}

fn print_outcome<W: Write>(out: &mut W, action: Action, outcome: &ActionOutcome) -> Result<()> {
    writeln!(
        out,
        "{action}: service type {} plan {}",
        outcome.service_type_id, outcome.plan_id
    )?;
    if let Some(controller) = &outcome.controller {
        writeln!(out, "  controller: {controller}")?;
    }

    if matches!(action, Action::Next | Action::Previous) {
        let variables = outcome
            .navigation
            .as_ref()
            .map(NavigationState::variables)
            .unwrap_or_else(NavigationState::empty_variables);
        for (name, value) in variables {
            writeln!(out, "  {name}: {value}")?;
        }
    }

    Ok(())
}
