//! Standalone client binary.
//!
//! Usage:
//!   cargo run -p tanks_client -- [--addr 127.0.0.1:9000] [--name Player]
//!                                [--assets-dir assets] [--observer] [--offline]
//!
//! The client loads assets, connects to the relay, joins with the chosen
//! name, and then runs the frame loop: poll the socket, tick the logic,
//! draw. Input is sampled and sent on its own ~33ms timer, independent of
//! the frame rate. Without a windowing host this binary draws through the
//! headless backend.

use std::env;
use std::time::Duration;

use anyhow::Context;
use tanks_client::session::{GameSession, SessionState};
use tanks_shared::{assets::FsAssetSource, config::GameConfig, render::NullRenderer};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

fn parse_args() -> GameConfig {
    let mut cfg = GameConfig::default();
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--addr" if i + 1 < args.len() => {
                cfg.server_addr = args[i + 1].clone();
                i += 2;
            }
            "--name" if i + 1 < args.len() => {
                cfg.player_name = args[i + 1].clone();
                i += 2;
            }
            "--assets-dir" if i + 1 < args.len() => {
                cfg.assets_dir = args[i + 1].clone();
                i += 2;
            }
            "--observer" => {
                cfg.observer = true;
                i += 1;
            }
            "--offline" => {
                cfg.offline = true;
                i += 1;
            }
            _ => i += 1,
        }
    }
    cfg
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cfg = parse_args();
    info!(server = %cfg.server_addr, observer = cfg.observer, offline = cfg.offline, "Starting client");

    let source = FsAssetSource::new(&cfg.assets_dir);
    let send_interval = Duration::from_millis(cfg.send_interval_ms);

    let mut session = GameSession::load(cfg, &source).await.context("startup")?;

    if session.state() == SessionState::Connecting {
        session.connect().await.context("connect")?;
    }

    let mut renderer = NullRenderer::default();

    // ~60fps frame timer plus the independent input-send timer.
    let mut frame = tokio::time::interval(Duration::from_millis(16));
    frame.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut send = tokio::time::interval(send_interval);
    send.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_frame = Instant::now();

    loop {
        tokio::select! {
            now = frame.tick() => {
                let delta = now.duration_since(last_frame).as_secs_f32() * 1000.0;
                last_frame = now;

                session.poll_socket().await;
                session.logic_tick(delta);
                session.render(&mut renderer);
            }
            _ = send.tick() => {
                if let Err(e) = session.send_input().await {
                    // Post-handshake transport failures are logged only.
                    tracing::warn!(error = %e, "Input send failed");
                }
            }
        }
    }
}
