//! Blackjack player client entry point.
//!
//! Asks how many rounds to play, waits for a server's UDP Offer, connects,
//! plays the rounds, prints the win rate, and starts over.
//!
//! # Usage
//!
//! ```text
//! blackjack-client [OPTIONS]
//!
//! Options:
//!   --name <NAME>             Name sent in the Request
//!   --rounds <N>              Rounds per session (skips the prompt)
//!   --server-name <NAME>      Only join servers advertising this name
//!   --any-server              Join the first server that offers
//!   --discovery-port <PORT>   UDP port to listen for offers on
//!   --connect <ADDR>          Skip discovery and connect directly
//!   --auto <TOTAL>            Play automatically, hitting below TOTAL
//!   --timeout <SECS>          Seconds to wait for the server
//!   --once                    Play one session and exit
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use blackjack_client::application::play_rounds::{
    ClientSession, ClientSettings, DecisionMaker, GameSummary, ThresholdStrategy,
};
use blackjack_client::infrastructure::console::{ConsoleInput, ConsoleRenderer};
use blackjack_client::infrastructure::network::connector::connect;
use blackjack_client::infrastructure::network::offer_listener::{
    discover_server, ServerFilter,
};
use blackjack_core::protocol::messages::{DEFAULT_SERVER_NAME, DISCOVERY_PORT};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Networked blackjack player.
///
/// Finds a dealer on the LAN via UDP offers and plays rounds against it.
#[derive(Debug, Parser)]
#[command(name = "blackjack-client", version)]
struct Cli {
    /// Name sent to the server (at most 32 bytes are transmitted).
    #[arg(long, env = "PYJACK_CLIENT_NAME", default_value = "player")]
    name: String,

    /// Rounds per session; prompts when omitted.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..))]
    rounds: Option<u8>,

    /// Only join servers advertising this name.
    #[arg(long, env = "PYJACK_SERVER_NAME", default_value = DEFAULT_SERVER_NAME)]
    server_name: String,

    /// Join the first server that offers, ignoring `--server-name`.
    #[arg(long)]
    any_server: bool,

    /// UDP port to listen for offers on.
    #[arg(long, env = "PYJACK_DISCOVERY_PORT", default_value_t = DISCOVERY_PORT)]
    discovery_port: u16,

    /// Connect to this address instead of waiting for an offer.
    #[arg(long)]
    connect: Option<SocketAddr>,

    /// Play without prompting: hit while the total is below this value.
    #[arg(long, value_name = "TOTAL")]
    auto: Option<u8>,

    /// Seconds to wait for the server before giving up.
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Play a single session and exit.
    #[arg(long)]
    once: bool,
}

impl Cli {
    fn filter(&self) -> ServerFilter {
        if self.any_server {
            ServerFilter::Any
        } else {
            ServerFilter::Named(self.server_name.clone())
        }
    }

    fn settings(&self) -> ClientSettings {
        ClientSettings {
            client_name: self.name.clone(),
            server_timeout: Duration::from_secs(self.timeout),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Quiet by default so log lines do not interleave with the game.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    tokio::select! {
        result = run(&cli) => result,
        _ = tokio::signal::ctrl_c() => {
            println!("\nBye!");
            Ok(())
        }
    }
}

/// Where the next server comes from.
enum ServerSource {
    Direct(SocketAddr),
    /// Listen for offers on this UDP port.
    Discover(u16),
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut input = ConsoleInput::stdin();
    let source = match cli.connect {
        Some(addr) => ServerSource::Direct(addr),
        None => ServerSource::Discover(cli.discovery_port),
    };

    loop {
        let rounds = match cli.rounds {
            Some(n) => n,
            None => input.prompt_rounds().await?,
        };

        let server = match &source {
            ServerSource::Direct(addr) => *addr,
            ServerSource::Discover(port) => {
                println!("Client started, listening for offer requests...");
                // The offer socket is closed again before the session starts.
                let offer = discover_server(*port, &cli.filter())
                    .await
                    .context("cannot listen for offers")?;
                println!(
                    "Received offer from {} ({})",
                    offer.addr.ip(),
                    offer.server_name
                );
                offer.addr
            }
        };

        let outcome = match cli.auto {
            Some(hit_below) => {
                play_session(cli, server, rounds, &mut ThresholdStrategy::new(hit_below)).await
            }
            None => play_session(cli, server, rounds, &mut input).await,
        };

        match outcome {
            Ok(summary) => println!(
                "Finished playing {} rounds, win rate: {:.1}%",
                summary.rounds,
                summary.win_rate() * 100.0
            ),
            Err(e) => {
                warn!("session failed: {e:#}");
                println!("Session ended early: {e:#}");
            }
        }

        if cli.once {
            return Ok(());
        }
    }
}

async fn play_session(
    cli: &Cli,
    addr: SocketAddr,
    rounds: u8,
    decider: &mut dyn DecisionMaker,
) -> anyhow::Result<GameSummary> {
    let stream = connect(addr, Duration::from_secs(cli.timeout)).await?;
    let mut session = ClientSession::new(stream, cli.settings(), Arc::new(ConsoleRenderer));
    let summary = session.play(rounds, decider).await?;
    debug!(?summary, "session complete");
    Ok(summary)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_pyjack_on_discovery_port() {
        let cli = Cli::parse_from(["blackjack-client"]);

        assert_eq!(cli.filter(), ServerFilter::Named("pyjack".to_string()));
        assert_eq!(cli.discovery_port, 13122);
        assert_eq!(cli.settings().server_timeout, Duration::from_secs(60));
        assert!(cli.rounds.is_none());
        assert!(!cli.once);
    }

    #[test]
    fn test_any_server_disables_name_filter() {
        let cli = Cli::parse_from(["blackjack-client", "--any-server"]);

        assert_eq!(cli.filter(), ServerFilter::Any);
    }

    #[test]
    fn test_auto_play_flags() {
        // Arrange / Act
        let cli = Cli::parse_from([
            "blackjack-client",
            "--name",
            "bot",
            "--rounds",
            "5",
            "--auto",
            "17",
            "--connect",
            "127.0.0.1:4000",
            "--once",
        ]);

        // Assert
        assert_eq!(cli.settings().client_name, "bot");
        assert_eq!(cli.rounds, Some(5));
        assert_eq!(cli.auto, Some(17));
        assert_eq!(cli.connect, Some("127.0.0.1:4000".parse().unwrap()));
        assert!(cli.once);
    }

    #[test]
    fn test_zero_rounds_flag_is_rejected() {
        let result = Cli::try_parse_from(["blackjack-client", "--rounds", "0"]);

        assert!(result.is_err());
    }
}
