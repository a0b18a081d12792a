//! Input script replay.
//!
//! A script is a list of raw input transitions, one per line:
//!
//! ```text
//! # comment
//! begin Space
//! end Space
//! begin E processed
//! ```
//!
//! Each event is fed to an [`InputHub`] bound by a local [`GestureBinder`];
//! the relayed frames are drained by a [`RemoteDispatcher`] task on the same
//! single-threaded runtime.

use std::path::Path;
use std::sync::Arc;

use actlink_core::error::{ActlinkError, Result};
use actlink_core::types::{Actor, InputPhase, Role};
use actlink_core::ActlinkConfig;
use actlink_registry::ActionRegistry;
use actlink_relay::{
    GestureBinder, InputEvent, InputHub, RelayLink, RemoteDispatcher, StatsSnapshot,
};

/// Parse script text into events.
pub fn parse_script(text: &str) -> Result<Vec<InputEvent>> {
    let mut events = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        events.push(parse_line(line).map_err(|reason| ActlinkError::Script {
            line: index + 1,
            reason,
        })?);
    }
    Ok(events)
}

fn parse_line(line: &str) -> std::result::Result<InputEvent, String> {
    let mut parts = line.split_whitespace();
    let phase = match parts.next() {
        Some("begin") => InputPhase::Begin,
        Some("end") => InputPhase::End,
        Some("cancel") => InputPhase::Cancel,
        Some("change") => InputPhase::Change,
        Some(other) => return Err(format!("unknown phase \"{other}\"")),
        None => return Err("empty line".to_string()),
    };
    let gesture = parts
        .next()
        .ok_or_else(|| "missing gesture".to_string())?;
    let processed = match parts.next() {
        None => false,
        Some("processed") => true,
        Some(other) => return Err(format!("unexpected token \"{other}\"")),
    };
    if let Some(extra) = parts.next() {
        return Err(format!("unexpected token \"{extra}\""));
    }
    Ok(InputEvent::new(gesture, phase).processed(processed))
}

/// Summary of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    pub events: usize,
    pub frames: u64,
    pub stats: StatsSnapshot,
    pub send_failures: u64,
}

/// Replay `events` for `actor` through both roles.
pub async fn run(
    config: &ActlinkConfig,
    registry: Arc<ActionRegistry>,
    actor: Actor,
    events: &[InputEvent],
) -> Result<SimulationReport> {
    let (link, inbox) = RelayLink::new(&config.relay.link_name);
    let dispatcher = Arc::new(RemoteDispatcher::new(Role::Remote, Arc::clone(&registry))?);

    let remote = Arc::clone(&dispatcher);
    let dispatch_task = tokio::spawn(async move { remote.run(inbox).await });

    let hub = InputHub::new();
    let mut binder = GestureBinder::new(Role::Local, actor.clone(), registry)
        .with_channel(Arc::new(link.connect(actor)))
        .strict_pairing(config.relay.strict_pairing);
    binder.bind(&hub)?;

    for event in events {
        let delivered = hub.emit(event);
        tracing::debug!(
            gesture = %event.gesture,
            phase = %event.phase,
            processed = event.processed,
            delivered,
            "Input event replayed"
        );
    }
    let send_failures = binder.send_failures();

    // Closing every sender ends the dispatch loop.
    drop(binder);
    drop(link);

    let frames = dispatch_task
        .await
        .map_err(|e| ActlinkError::Relay(format!("dispatch task failed: {e}")))?;

    Ok(SimulationReport {
        events: events.len(),
        frames,
        stats: dispatcher.stats(),
        send_failures,
    })
}

/// Read and replay a script file.
pub async fn run_file(
    config: &ActlinkConfig,
    registry: Arc<ActionRegistry>,
    actor: Actor,
    path: &Path,
) -> Result<SimulationReport> {
    let text = std::fs::read_to_string(path)?;
    let events = parse_script(&text)?;
    tracing::info!(events = events.len(), "Replaying {}", path.display());
    run(config, registry, actor, &events).await
}
