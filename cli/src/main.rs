// SmartMeeting CLI — terminal front end for the proximity session
//
// Runs a room or attendee session against a scripted radio. Attendee sessions
// replay RSSI readings as if they came from a nearby room.

mod config;
mod sim;
mod ui;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use smartmeeting_core::transport::ble::MANUFACTURER_ID;
use smartmeeting_core::{
    EventEmitter, PermissionStatus, ProximitySession, RadioTransport, Role, ScanReport,
    StaticPermissionGate,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;

use crate::sim::ScriptedRadio;
use crate::ui::{PromptAnswer, TerminalDelegate};

#[derive(Parser)]
#[command(name = "smartmeeting")]
#[command(about = "SmartMeeting — join the meeting in the room you walk into", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Broadcast the room beacon
    Room(RunArgs),
    /// Scan for a room and offer to join its meeting
    Attendee(RunArgs),
    /// Configure settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Scan readings (dBm) to replay, comma separated
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    rssi: Vec<i16>,
    /// Refuse the Bluetooth permission prompt
    #[arg(long)]
    deny_permission: bool,
    /// Pretend the device has no Bluetooth adapter
    #[arg(long)]
    no_adapter: bool,
    /// Answer the meeting prompt with OK
    #[arg(long)]
    join: bool,
    /// Print snapshots as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum ConfigAction {
    Set { key: String, value: String },
    Get { key: String },
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::Config::load()?;
    let _guard = init_logging(&config)?;

    match cli.command {
        Commands::Room(args) => cmd_run(Role::Room, args, config).await,
        Commands::Attendee(args) => cmd_run(Role::Attendee, args, config).await,
        Commands::Config { action } => cmd_config(action, config),
    }
}

fn init_logging(config: &config::Config) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).context("Failed to create log directory")?;
            let appender = tracing_appender::rolling::daily(dir, "smartmeeting.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

async fn cmd_run(role: Role, args: RunArgs, config: config::Config) -> Result<()> {
    let emitter = EventEmitter::new();
    let radio = Arc::new(ScriptedRadio::new(!args.no_adapter));
    let transport = Arc::new(RadioTransport::from_config(
        radio.clone(),
        emitter.clone(),
        &config.session.beacon,
    ));
    let permission = if args.deny_permission {
        PermissionStatus::Denied
    } else {
        PermissionStatus::Granted
    };
    let answer = if args.join || config.auto_join {
        PromptAnswer::Ok
    } else {
        PromptAnswer::Cancel
    };
    let delegate = Arc::new(TerminalDelegate::new(answer, args.json));

    let mut session = ProximitySession::new(
        config.session.clone(),
        transport.clone(),
        Arc::new(StaticPermissionGate(permission)),
        emitter,
    );
    session.set_delegate(Some(delegate.clone()));

    println!("{} {}", "Role:".bold(), role.to_string().bright_cyan());

    let interval = Duration::from_millis(config.scan_interval_ms);
    let outcome = drive_session(&mut session, &transport, role, &args.rssi, interval).await;

    session.teardown().await;
    let activity = radio.activity();
    tracing::debug!("Radio after teardown: {:?}", activity);

    outcome?;

    if delegate.answers().contains(&PromptAnswer::Ok) {
        println!("{} Joining meeting", "✓".green());
    }
    Ok(())
}

async fn drive_session(
    session: &mut ProximitySession,
    transport: &RadioTransport,
    role: Role,
    readings: &[i16],
    interval: Duration,
) -> Result<()> {
    session.init().await.context("Session could not start")?;
    session
        .select(role)
        .await
        .with_context(|| format!("Could not start {} role", role))?;

    match role {
        Role::Room => {
            transport.on_advertise_started();
            session.process_pending();
            if !readings.is_empty() {
                println!("{}", "Rooms do not scan; ignoring --rssi".dimmed());
            }
        }
        Role::Attendee => {
            let payload = transport.frame().to_bytes().to_vec();
            for rssi in readings {
                tokio::time::sleep(interval).await;
                transport.on_scan_result(ScanReport::new(MANUFACTURER_ID, payload.clone(), *rssi));
                session.process_pending();
            }
        }
    }

    Ok(())
}

fn cmd_config(action: ConfigAction, mut config: config::Config) -> Result<()> {
    match action {
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            config.save()?;
            println!("{} Set {} = {}", "✓".green(), key.bright_cyan(), value);
        }

        ConfigAction::Get { key } => {
            if let Some(value) = config.get(&key) {
                println!("{} = {}", key.bright_cyan(), value);
            } else {
                anyhow::bail!("Unknown config key: {}", key);
            }
        }

        ConfigAction::List => {
            println!("{}", "Configuration".bold());
            println!();

            for (key, value) in config.list() {
                println!("  {:<22} {}", key.bright_cyan(), value);
            }
        }
    }

    Ok(())
}
