//! Parlor REPL - drive the engine from stdin, one command per line.
//!
//! Line format: `<room> <user> <text...>`. Replies are printed as JSON
//! arrays; watchdog pushes arrive asynchronously tagged with their
//! room. Intended for local poking and demos, not as a transport.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use parlor::config::ParlorConfig;
use parlor::engine::{CallerCtx, Engine};
use parlor::traits::{ChannelNotifier, DiscardLedger, StaticNames};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "parlor-repl", about = "Interactive driver for the parlor engine")]
struct Args {
    /// TOML configuration file; defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// User ids carrying the admin close capability (repeatable)
    #[arg(long = "admin")]
    admins: Vec<String>,

    /// Display names as `id=Name` pairs (repeatable)
    #[arg(long = "name")]
    names: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parlor=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ParlorConfig::from_file(path)?,
        None => ParlorConfig::default(),
    };

    let names = StaticNames::from_pairs(args.names.iter().filter_map(|pair| {
        pair.split_once('=')
            .map(|(id, name)| (id.to_string(), name.to_string()))
    }));

    let (notifier, mut pushes) = ChannelNotifier::new();
    let engine = Arc::new(Engine::new(
        config,
        Arc::new(names),
        Arc::new(DiscardLedger),
        Arc::new(notifier),
    )?);

    tokio::spawn(async move {
        while let Some((room, messages)) = pushes.recv().await {
            match serde_json::to_string(&messages) {
                Ok(json) => println!("[push {}] {}", room, json),
                Err(e) => tracing::warn!(error = %e, "push serialization failed"),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut parts = line.splitn(3, ' ');
        let (Some(room), Some(user), Some(text)) = (parts.next(), parts.next(), parts.next())
        else {
            eprintln!("usage: <room> <user> <text...>");
            continue;
        };

        let caller = if args.admins.iter().any(|a| a == user) {
            CallerCtx::admin(user)
        } else {
            CallerCtx::user(user)
        };
        let replies = engine.handle_command(room, &caller, text).await;
        println!("{}", serde_json::to_string(&replies)?);
    }

    let snapshot = engine.metrics().snapshot();
    eprintln!("{}", serde_json::to_string(&snapshot)?);
    Ok(())
}
