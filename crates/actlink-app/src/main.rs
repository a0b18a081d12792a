//! actlink binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing
//! 3. Load phase: turn `[[actions]]` declarations into a registry
//! 4. Run the requested command against the frozen registry

mod cli;
mod declarations;
mod simulate;

use std::sync::Arc;

use clap::Parser;

use actlink_core::config::ActlinkConfig;
use actlink_core::types::{Actor, Role};
use actlink_registry::ActionRegistry;
use actlink_relay::{GestureBinder, InputHub, RelayLink, RemoteDispatcher};

use cli::{CliArgs, Command};
use declarations::Transcript;

/// Print the registry, one action per line.
fn list(registry: &ActionRegistry) {
    println!(
        "{:<20} {:<16} {:<12} {:<6} {}",
        "ACTION", "GESTURE", "METHOD", "TOUCH", "END"
    );
    for action in registry.all() {
        println!(
            "{:<20} {:<16} {:<12} {:<6} {}",
            action.name(),
            action.gesture(),
            action.input_method().to_string(),
            action.touch_affordance(),
            action.has_local_end() || action.has_remote_end(),
        );
    }
}

/// Bind the registry for the configured role and report the result.
fn check(config: &ActlinkConfig, registry: Arc<ActionRegistry>) -> actlink_core::Result<()> {
    match config.general.role {
        Role::Local => {
            let (link, _inbox) = RelayLink::new(&config.relay.link_name);
            let actor = Actor::new("check");
            let hub = InputHub::new();
            let mut binder = GestureBinder::new(Role::Local, actor.clone(), registry)
                .with_channel(Arc::new(link.connect(actor)))
                .strict_pairing(config.relay.strict_pairing);
            binder.bind(&hub)?;
            println!(
                "local role: {} exclusive claim(s), {} raw listener(s)",
                hub.claim_count(),
                hub.listener_count()
            );
        }
        Role::Remote => {
            let dispatcher = RemoteDispatcher::new(Role::Remote, Arc::clone(&registry))?;
            println!(
                "remote role: dispatcher ready for {} action(s), {} dispatched",
                registry.len(),
                dispatcher.stats().total()
            );
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing starts so its log level can apply.
    let config_path = args.resolve_config_path();
    let config = if args.config_is_explicit() {
        ActlinkConfig::load(&config_path)?
    } else {
        ActlinkConfig::load_or_default(&config_path)
    };

    let level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting actlink v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        path = %config_path.display(),
        role = %config.general.role,
        link = %config.relay.link_name,
        actions = config.actions.len(),
        "Configuration resolved"
    );

    // Load phase. The registry is frozen once it goes behind the Arc.
    let transcript = Arc::new(Transcript::new());
    let registry = Arc::new(declarations::load_registry(&config, &transcript)?);

    match args.command {
        Command::List => list(&registry),
        Command::Check => check(&config, registry)?,
        Command::Simulate { script, actor } => {
            let report =
                simulate::run_file(&config, registry, Actor::new(actor), &script).await?;
            for line in transcript.lines() {
                println!("{line}");
            }
            println!(
                "{} event(s), {} frame(s): {} started, {} ended, {} end(s) without handler, {} dropped",
                report.events,
                report.frames,
                report.stats.started,
                report.stats.ended,
                report.stats.ignored,
                report.stats.dropped,
            );
            if report.send_failures > 0 {
                return Err(format!("{} relay send failure(s)", report.send_failures).into());
            }
        }
    }

    Ok(())
}
