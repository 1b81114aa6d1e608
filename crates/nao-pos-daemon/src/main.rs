//! NAO Pos Daemon - Main entry point
//!
//! Checks pos files, or runs the playback service that turns periodic action
//! requests into streams of joint commands.

mod config;
mod player;
mod publisher;

use anyhow::Result;
use clap::{Parser, Subcommand};
use nao_pos_core::{Joint, KeyFrame, PosScript};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::player::{JsonLinesSink, Player};

#[derive(Parser, Debug)]
#[command(name = "nao-pos")]
#[command(about = "Pos file checker and keyframe playback service for NAO")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a pos file and report its keyframes
    Check {
        /// Path to the pos file
        file: PathBuf,

        /// Print the keyframes as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the playback service
    Run {
        /// Path to configuration file
        #[arg(short, long, default_value = "nao-pos.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries command output, so logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Check { file, json } => check(file, json),
        Command::Run { config } => run(config).await,
    }
}

fn check(file: PathBuf, json: bool) -> Result<()> {
    let script = match PosScript::from_file(&file) {
        Ok(script) => script,
        Err(e) => {
            error!(path = %file.display(), error = %e, "Pos file rejected");
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(script.keyframes())?);
        return Ok(());
    }

    println!(
        "{}: {} keyframes, {} ms",
        file.display(),
        script.keyframes().len(),
        script.duration_ms()
    );
    for keyframe in script.keyframes() {
        println!("  {}", describe(keyframe));
    }
    Ok(())
}

fn describe(keyframe: &KeyFrame) -> String {
    let joints: Vec<String> = keyframe
        .positions
        .iter()
        .zip(keyframe.stiffnesses.stiffnesses.iter())
        .map(|((index, radians), stiffness)| {
            let name = Joint::from_index(index)
                .map(Joint::name)
                .unwrap_or("?");
            format!(
                "{}={:.1}°@{:.2}",
                name,
                nao_pos_core::rad_to_deg(radians),
                stiffness
            )
        })
        .collect();
    format!("{:>6} ms  {}", keyframe.absolute_time_ms, joints.join(" "))
}

async fn run(config_path: PathBuf) -> Result<()> {
    info!("nao-pos v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config(&config_path)?;
    if !config.publisher.enabled {
        warn!("Action publisher disabled, nothing to play");
        return Ok(());
    }

    let mut player = Player::new(&config.playback, JsonLinesSink::new(std::io::stdout()))?;
    let (tx, mut rx) = mpsc::channel(8);
    tokio::spawn(publisher::run(config.publisher.clone(), tx));

    tokio::select! {
        result = player.run(&mut rx) => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nao_pos_core::{JointPositions, JointStiffnesses};

    #[test]
    fn test_describe_keyframe() {
        let keyframe = KeyFrame {
            absolute_time_ms: 500,
            positions: JointPositions {
                indexes: vec![0, 10],
                positions: vec![std::f32::consts::FRAC_PI_2, 0.0],
            },
            stiffnesses: JointStiffnesses {
                indexes: vec![0, 10],
                stiffnesses: vec![1.0, 0.5],
            },
        };
        assert_eq!(
            describe(&keyframe),
            "   500 ms  HeadYaw=90.0°@1.00 LKneePitch=0.0°@0.50"
        );
    }

    #[tokio::test]
    async fn test_run_with_publisher_disabled_returns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nao-pos.toml");
        std::fs::write(&path, "[publisher]\nenabled = false\n").unwrap();

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), run(path)).await;
        assert!(matches!(result, Ok(Ok(()))));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["nao-pos", "check", "wave.pos", "--json"]).unwrap();
        assert!(matches!(args.command, Command::Check { json: true, .. }));

        let args = Args::try_parse_from(["nao-pos", "-l", "debug", "run"]).unwrap();
        assert_eq!(args.log_level, "debug");
        assert!(
            matches!(args.command, Command::Run { ref config } if config == &PathBuf::from("nao-pos.toml"))
        );
    }
}
