//! Recorded stream files and the simulated build executor.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use plancast_core::{ActivePlan, BuildHandle, RegisterBuild, StreamMessage};

/// Reads one JSON stream message per line from `path` (`-` for stdin).
pub fn read_stream(path: &Path) -> Result<Vec<StreamMessage>> {
    let reader: Box<dyn Read> = if path == Path::new("-") {
        Box::new(io::stdin())
    } else {
        Box::new(
            File::open(path)
                .with_context(|| format!("Failed to open stream file {}", path.display()))?,
        )
    };
    parse_stream(BufReader::new(reader))
}

/// Parses JSON lines into messages, skipping blank lines.
pub fn parse_stream<R: BufRead>(reader: R) -> Result<Vec<StreamMessage>> {
    let mut messages = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read stream")?;
        if line.trim().is_empty() {
            continue;
        }
        let message = serde_json::from_str(&line)
            .with_context(|| format!("Invalid stream message on line {}", index + 1))?;
        messages.push(message);
    }
    Ok(messages)
}

/// Distinct build paths in the order they first appear.
pub fn build_paths(messages: &[StreamMessage]) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for message in messages {
        if let StreamMessage::BuildInfo { path, .. } = message {
            if !paths.contains(path) {
                paths.push(path.clone());
            }
        }
    }
    paths
}

/// Stand-in for the build executor and reply accumulator that normally sit
/// next to a plan. It reacts to each message before the message is emitted.
#[derive(Default)]
pub struct SimulatedExecutor {
    in_flight: HashMap<String, BuildHandle>,
}

impl SimulatedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the side effects `message` implies to `plan`.
    pub fn observe(&mut self, plan: &ActivePlan, message: &StreamMessage) -> Result<()> {
        match message {
            StreamMessage::Chunk { text } => plan.record_reply_chunk(text, 1),
            StreamMessage::RepliesFinished => plan.mark_replies_finished(),
            StreamMessage::BuildInfo {
                path,
                num_tokens,
                finished,
                error,
            } => {
                let handle = self.in_flight.entry(path.clone()).or_insert_with(|| {
                    plan.register_build(&RegisterBuild {
                        path: path.clone(),
                        assistant_message_id: plan.model_stream_id().unwrap_or_default(),
                    })
                });
                debug!("build {path}: {num_tokens} tokens");

                if let Some(error) = error {
                    plan.builds()
                        .mark_failed(handle, error.clone())
                        .with_context(|| format!("Failed to record build failure for {path}"))?;
                    self.in_flight.remove(path);
                } else if *finished {
                    let content = plan
                        .builds()
                        .record(handle)
                        .map(|record| record.buffer)
                        .unwrap_or_default();
                    plan.builds()
                        .mark_success(handle, content)
                        .with_context(|| format!("Failed to record build success for {path}"))?;
                    self.in_flight.remove(path);
                } else {
                    plan.builds()
                        .append_buffer(handle, &format!("[{num_tokens} tokens]"))
                        .with_context(|| format!("Failed to record build progress for {path}"))?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
