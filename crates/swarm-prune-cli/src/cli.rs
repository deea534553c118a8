//! Argument parsing and command dispatch.

use std::env;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use swarm_prune_engine::ImagePruneMode;
use swarm_prune_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use tracing::info;
use uuid::Uuid;

use crate::client::{
    AppContext, CliResult, CommandEvent, HttpConnector, TelemetryEmitter, timestamp_now_ms,
};
use crate::commands::CommandOutcome;
use crate::commands::df::handle_df;
use crate::commands::prune::{PrunePlan, handle_prune};
use crate::config::{API_VERSION_ENV, DEFAULT_HOST, DEFAULT_NODE_PORT, RunConfig};
use crate::executor::Operation;

/// Parses CLI arguments, executes the requested command, and handles
/// telemetry emission. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: &cli.global.log_level,
        format: cli.global.log_format,
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }

    let command_name = command_label(&cli.command);
    let trace_id = Uuid::new_v4().to_string();
    let telemetry = TelemetryEmitter::from_env(&trace_id);

    let result = dispatch(cli).await;

    let (exit_code, message, outcome, reclaimed_bytes) = match result {
        Ok(outcome) => {
            if let CommandOutcome::Completed {
                reclaimed_bytes,
                nodes,
                failed_operations,
            } = outcome
            {
                info!(
                    command = command_name,
                    reclaimed_bytes, nodes, failed_operations, "command completed"
                );
            }
            let label = match outcome {
                CommandOutcome::Completed { .. } => "success",
                CommandOutcome::Declined => "declined",
            };
            (0, None, label, outcome.reclaimed_bytes())
        }
        Err(err) => {
            let message = err.display_message();
            eprintln!("ERROR: {message}");
            (err.exit_code(), Some(message), "error", 0)
        }
    };

    if let Some(emitter) = &telemetry {
        emitter
            .emit(&CommandEvent {
                command: command_name,
                outcome,
                trace_id: &trace_id,
                exit_code,
                reclaimed_bytes,
                message: message.as_deref(),
                timestamp_ms: timestamp_now_ms(),
            })
            .await;
    }

    exit_code
}

async fn dispatch(cli: Cli) -> CliResult<CommandOutcome> {
    let api_version = env::var(API_VERSION_ENV).ok();
    let config = RunConfig::from_args(&cli.global, api_version.as_deref())?;
    let ctx = AppContext::<HttpConnector>::from_config(config);

    let mut input = BufReader::new(io::stdin());
    let mut out = io::stdout();

    match cli.command {
        Command::System(args) => {
            let plan = PrunePlan::system(args.all);
            handle_prune(&ctx, &plan, args.force, &mut input, &mut out).await
        }
        Command::Containers(args) => {
            let plan = PrunePlan::single(Operation::PruneContainers);
            handle_prune(&ctx, &plan, args.force, &mut input, &mut out).await
        }
        Command::Images(args) => {
            let plan =
                PrunePlan::single(Operation::PruneImages(ImagePruneMode::from_all_flag(args.all)));
            handle_prune(&ctx, &plan, args.force, &mut input, &mut out).await
        }
        Command::Volumes(args) => {
            let plan = PrunePlan::single(Operation::PruneVolumes);
            handle_prune(&ctx, &plan, args.force, &mut input, &mut out).await
        }
        Command::Networks(args) => {
            let plan = PrunePlan::single(Operation::PruneNetworks);
            handle_prune(&ctx, &plan, args.force, &mut input, &mut out).await
        }
        Command::Df(args) => handle_df(&ctx, args.verbose, &mut out).await,
    }
}

#[derive(Parser)]
#[command(
    name = "swarm-prune",
    version,
    about = "Prune unused Docker objects on every node of a swarm"
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) global: GlobalArgs,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Args, Debug)]
pub(crate) struct GlobalArgs {
    #[arg(
        short = 'H',
        long,
        global = true,
        env = "DOCKER_HOST",
        default_value = DEFAULT_HOST,
        help = "Swarm manager daemon address"
    )]
    pub(crate) host: String,
    #[arg(long, global = true, help = "Trust certs signed only by this CA")]
    pub(crate) tlscacert: Option<PathBuf>,
    #[arg(long, global = true, help = "Path to TLS certificate file")]
    pub(crate) tlscert: Option<PathBuf>,
    #[arg(long, global = true, help = "Path to TLS key file")]
    pub(crate) tlskey: Option<PathBuf>,
    #[arg(long, global = true, help = "Verify the daemon certificate")]
    pub(crate) tlsverify: bool,
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_NODE_PORT,
        help = "Daemon port on every swarm node"
    )]
    pub(crate) node_port: u16,
    #[arg(long, global = true, help = "Request timeout in seconds")]
    pub(crate) timeout: Option<u64>,
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_LOG_LEVEL,
        help = "Log level or filter directive (RUST_LOG wins)"
    )]
    pub(crate) log_level: String,
    #[arg(
        long,
        global = true,
        default_value = "pretty",
        help = "Log output format: pretty or json"
    )]
    pub(crate) log_format: LogFormat,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Remove stopped containers, dangling images, unused networks and volumes.
    System(SystemArgs),
    /// Remove stopped containers on every node.
    Containers(ForceArgs),
    /// Remove dangling (or, with --all, unused) images on every node.
    Images(ImagesArgs),
    /// Remove volumes not used by any container on every node.
    Volumes(ForceArgs),
    /// Remove unused networks on every node.
    Networks(ForceArgs),
    /// Show disk usage on every node.
    Df(DfArgs),
}

#[derive(Args, Debug)]
pub(crate) struct ForceArgs {
    #[arg(short = 'F', long, help = "Do not prompt for confirmation")]
    pub(crate) force: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SystemArgs {
    #[arg(short = 'F', long, help = "Do not prompt for confirmation")]
    pub(crate) force: bool,
    #[arg(
        short = 'A',
        long,
        help = "Remove all images without at least one container"
    )]
    pub(crate) all: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ImagesArgs {
    #[arg(short = 'F', long, help = "Do not prompt for confirmation")]
    pub(crate) force: bool,
    #[arg(
        short = 'A',
        long,
        help = "Remove all images without at least one container"
    )]
    pub(crate) all: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DfArgs {
    #[arg(short = 'V', long, help = "Show per-object usage tables")]
    pub(crate) verbose: bool,
}

pub(crate) const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::System(_) => "system",
        Command::Containers(_) => "containers",
        Command::Images(_) => "images",
        Command::Volumes(_) => "volumes",
        Command::Networks(_) => "networks",
        Command::Df(_) => "df",
    }
}
