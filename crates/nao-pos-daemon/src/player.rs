//! Pos file player
//!
//! Receives action requests, loads the matching pos file, and streams joint
//! commands to a [`CommandSink`] at a fixed cadence until the keyframes have
//! been played out.

use anyhow::Result;
use nao_pos_core::{JointCommand, Playback, PosScript, NUM_JOINTS};
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::PlaybackConfig;
use crate::publisher::ActionRequest;

/// Destination for joint commands
pub trait CommandSink: Send {
    fn send(&mut self, command: &JointCommand) -> Result<()>;
}

/// Writes each command as one line of JSON
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send> CommandSink for JsonLinesSink<W> {
    fn send(&mut self, command: &JointCommand) -> Result<()> {
        serde_json::to_writer(&mut self.writer, command)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

pub struct Player<S> {
    pos_dir: PathBuf,
    tick: Duration,
    start_pose: [f32; NUM_JOINTS],
    sink: S,
}

impl<S: CommandSink> Player<S> {
    pub fn new(config: &PlaybackConfig, sink: S) -> Result<Self> {
        Ok(Self {
            pos_dir: config.pos_dir.clone(),
            tick: Duration::from_millis(config.tick_ms),
            start_pose: config.start_pose()?,
            sink,
        })
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Load and parse `<pos_dir>/<action>.pos` off the async runtime
    pub async fn load(&self, action: &str) -> Result<Playback> {
        let path = self.pos_dir.join(format!("{}.pos", action));
        let script = tokio::task::spawn_blocking(move || PosScript::from_file(&path)).await??;
        Ok(Playback::new(script.into_keyframes(), self.start_pose))
    }

    /// Stream commands for `playback`, returning how many were sent
    ///
    /// The final keyframe is always commanded exactly, even when the last
    /// tick lands past its time.
    pub async fn play(&mut self, playback: &Playback) -> Result<usize> {
        let duration_ms = playback.duration_ms();
        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let started = Instant::now();
        let mut sent = 0;

        loop {
            ticker.tick().await;

            let elapsed_ms = u32::try_from(started.elapsed().as_millis())
                .unwrap_or(u32::MAX)
                .min(duration_ms);
            let Some(command) = playback.sample(elapsed_ms) else {
                break;
            };

            debug!(elapsed_ms, joints = command.positions.len(), "Sending joint command");
            self.sink.send(&command)?;
            sent += 1;

            if elapsed_ms >= duration_ms {
                break;
            }
        }

        Ok(sent)
    }

    /// Serve action requests until the channel closes
    ///
    /// A request whose pos file cannot be loaded is rejected on its own; the
    /// player keeps serving later requests.
    pub async fn run(&mut self, rx: &mut mpsc::Receiver<ActionRequest>) -> Result<()> {
        info!(pos_dir = %self.pos_dir.display(), "Player ready");

        while let Some(request) = rx.recv().await {
            let playback = match self.load(&request.action).await {
                Ok(playback) => playback,
                Err(e) => {
                    warn!(action = %request.action, error = %e, "Rejected action request");
                    continue;
                }
            };

            info!(
                action = %request.action,
                keyframes = playback.keyframes().len(),
                duration_ms = playback.duration_ms(),
                "Playing pos file"
            );
            let sent = self.play(&playback).await?;
            info!(action = %request.action, commands = sent, "Playback finished");

            while let Ok(skipped) = rx.try_recv() {
                warn!(action = %skipped.action, "Dropped action request received during playback");
            }
        }

        info!("Action request channel closed, player stopping");
        Ok(())
    }
}
