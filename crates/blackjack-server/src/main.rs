//! Blackjack dealer server entry point.
//!
//! Loads configuration, binds the session listener, starts the UDP offer
//! announcer, and accepts sessions until Ctrl-C.
//!
//! # Usage
//!
//! ```text
//! blackjack-server [OPTIONS]
//!
//! Options:
//!   --config <PATH>           TOML config file [default: platform config dir]
//!   --name <NAME>             Server name advertised in offers
//!   --bind <IP>               Listener bind address
//!   --port <PORT>             Listener port, 0 for ephemeral
//!   --discovery-port <PORT>   UDP port offers are sent to
//!   --idle-timeout <SECS>     Per-read idle timeout for sessions
//!   --no-announce             Do not broadcast offers
//! ```
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config() + CLI overrides
//!  └─ start services
//!       ├─ offer announcer   (UDP background thread)
//!       └─ acceptor          (Tokio task per session)
//! ```

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use blackjack_core::protocol::messages::OfferMessage;
use blackjack_server::application::play_session::SessionSettings;
use blackjack_server::infrastructure::network::acceptor::{
    bind_listener, local_addr, serve, ServerContext,
};
use blackjack_server::infrastructure::network::announcer::{start_announcer, AnnouncerConfig};
use blackjack_server::infrastructure::storage::config::{load_config, ServerConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Networked blackjack dealer.
///
/// Advertises itself over UDP and deals rounds to every client that
/// connects over TCP.
#[derive(Debug, Parser)]
#[command(name = "blackjack-server", version)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, env = "PYJACK_CONFIG")]
    config: Option<PathBuf>,

    /// Server name advertised in offers (at most 32 bytes).
    #[arg(long, env = "PYJACK_NAME")]
    name: Option<String>,

    /// IP address to bind the session listener to.
    #[arg(long, env = "PYJACK_BIND")]
    bind: Option<String>,

    /// Session listener port; 0 lets the OS pick one.
    #[arg(long, env = "PYJACK_PORT")]
    port: Option<u16>,

    /// UDP port that offers are broadcast to.
    #[arg(long, env = "PYJACK_DISCOVERY_PORT")]
    discovery_port: Option<u16>,

    /// Seconds a session waits for the peer before giving up.
    #[arg(long, env = "PYJACK_IDLE_TIMEOUT")]
    idle_timeout: Option<u64>,

    /// Disable the UDP offer announcer.
    #[arg(long)]
    no_announce: bool,
}

impl Cli {
    /// Layers command-line values over the loaded file config.
    fn apply(&self, cfg: &mut ServerConfig) {
        if let Some(name) = &self.name {
            cfg.server.name = name.clone();
        }
        if let Some(bind) = &self.bind {
            cfg.network.bind_address = bind.clone();
        }
        if let Some(port) = self.port {
            cfg.network.tcp_port = port;
        }
        if let Some(port) = self.discovery_port {
            cfg.network.discovery_port = port;
        }
        if let Some(secs) = self.idle_timeout {
            cfg.server.idle_timeout_secs = secs;
        }
        if self.no_announce {
            cfg.network.announce = false;
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply(&mut cfg);
    cfg.validate().context("invalid configuration")?;

    // Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cfg.server.log_level)),
        )
        .init();

    let bind_addr = cfg.bind_socket_addr()?;
    let listener = bind_listener(bind_addr)
        .await
        .with_context(|| format!("failed to bind session listener on {bind_addr}"))?;
    let listen_addr = local_addr(&listener)?;
    info!("server {:?} started, listening on {listen_addr}", cfg.server.name);

    let running = Arc::new(AtomicBool::new(true));

    // ── Offer announcer ───────────────────────────────────────────────────────
    let announcer = if cfg.network.announce {
        let offer = OfferMessage {
            tcp_port: listen_addr.port(),
            server_name: cfg.server.name.clone(),
        };
        let announcer_cfg = AnnouncerConfig {
            target: cfg.broadcast_target()?,
            interval: cfg.offer_interval(),
        };
        match start_announcer(&offer, announcer_cfg, Arc::clone(&running)) {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("failed to start offer announcer: {e}");
                None
            }
        }
    } else {
        info!("offer announcer disabled");
        None
    };

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => error!("failed to listen for Ctrl-C: {e}"),
        }
    });

    let ctx = Arc::new(ServerContext::new(
        cfg.server.name.clone(),
        SessionSettings {
            idle_timeout: cfg.idle_timeout(),
        },
    ));
    serve(listener, ctx, Arc::clone(&running)).await;

    if let Some(handle) = announcer {
        tokio::task::spawn_blocking(move || handle.join())
            .await
            .context("announcer join task failed")?
            .map_err(|_| anyhow::anyhow!("announcer thread panicked"))?;
    }

    info!("server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
