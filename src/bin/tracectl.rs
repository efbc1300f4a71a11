use std::path::PathBuf;

use clap::{Parser, Subcommand};
use msg_tracer::config::validation::validate_config;
use msg_tracer::config::{load_config, ConfigError, MsgTracerConfig};
use msg_tracer::observability::logging::init_logging;
use msg_tracer::{BackendOffset, MessageRef, MsgTracer, SubState, Tracer, TracerGuard};

#[derive(Parser)]
#[command(name = "tracectl")]
#[command(about = "Operator tool for the broker message tracer", long_about = None)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Trace-collector address; overrides `tracer.remote_addr`.
    #[arg(short, long)]
    remote: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the config and print the effective settings
    CheckConfig,
    /// Walk synthetic messages through PUB, START and FIN
    Walk {
        #[arg(short, long, default_value = "tracectl_walk")]
        topic: String,
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,
    },
    /// Emit a single consume-state event
    EmitSub {
        #[arg(short, long)]
        topic: String,
        /// READ_QUEUE, START, REQ, FIN or TIMEOUT
        #[arg(short, long)]
        state: SubState,
        #[arg(short, long)]
        message_id: String,
        #[arg(long, default_value_t = 0)]
        trace_id: u64,
        #[arg(short = 'C', long, default_value = "tracectl")]
        client_id: String,
        #[arg(long, default_value_t = 0)]
        offset: i64,
        #[arg(long, default_value_t = 1)]
        attempts: u32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => MsgTracerConfig::default(),
    };
    if let Some(remote) = cli.remote {
        config.tracer.remote_addr = remote;
    }

    if let Commands::CheckConfig = cli.command {
        validate_config(&config).map_err(ConfigError::Validation)?;
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    init_logging(&config.observability)?;

    let guard = TracerGuard::start(Tracer::from_config(&config.tracer).into_shared());
    let tracer = guard.tracer();

    match cli.command {
        Commands::CheckConfig => {}
        Commands::Walk { topic, count } => {
            for i in 0..count {
                let id = format!("walk-{}-{}", std::process::id(), i);
                let offset = BackendOffset(i64::from(i));
                let trace_id = u64::from(i) + 1;
                let msg = MessageRef {
                    id: &id,
                    offset,
                    attempts: 1,
                };
                tracer.trace_pub(&topic, trace_id, &msg, offset, i64::from(i) + 1);
                tracer.trace_sub(&topic, SubState::Start, trace_id, &msg, "tracectl");
                tracer.trace_sub(&topic, SubState::Fin, trace_id, &msg, "tracectl");
            }
            tracing::info!(topic = %topic, count, remote = tracer.is_remote(), "Walk finished");
        }
        Commands::EmitSub {
            topic,
            state,
            message_id,
            trace_id,
            client_id,
            offset,
            attempts,
        } => {
            let msg = MessageRef {
                id: &message_id,
                offset: BackendOffset(offset),
                attempts,
            };
            tracer.trace_sub(&topic, state, trace_id, &msg, &client_id);
        }
    }

    guard.shutdown();
    Ok(())
}
