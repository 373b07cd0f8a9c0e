mod observer;

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use mockchat_channel::{Channel, ChannelError};
use mockchat_net::Network;
use mockchat_service::{Authenticator, Service, ServiceError, Session, config};

use crate::observer::LogObserver;

const ATTEMPTS: u32 = 5;

/// Retry a simulated call while it keeps failing with a transient error.
async fn retry<T, E, F, Fut>(what: &str, retryable: fn(&E) -> bool, mut call: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match call().await {
            Err(e) if attempt < ATTEMPTS && retryable(&e) => {
                warn!(attempt, "{what} failed, retrying: {e}");
                attempt += 1;
            }
            other => return other,
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Walk the server tree until `wanted` channels are collected.
async fn pick_channels(session: &Session, wanted: usize) -> anyhow::Result<Vec<Channel>> {
    let servers = retry("list servers", ServiceError::is_retryable, move || session.servers()).await?;

    let mut picked = Vec::with_capacity(wanted);
    for server in servers {
        if picked.len() >= wanted {
            break;
        }
        let channels =
            retry("list channels", ServiceError::is_retryable, move || server.channels()).await?;
        info!(
            server_id = server.id(),
            name = %server.name(),
            channels = channels.len(),
            "server listed"
        );
        picked.extend(channels.iter().take(wanted - picked.len()).cloned());
    }

    Ok(picked)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mockchat=debug".into()),
        )
        .init();

    // Config
    let username = std::env::var("MOCKCHAT_USERNAME").unwrap_or_else(|_| "alice".into());
    let fast = env_flag("MOCKCHAT_FAST");
    let wanted: usize = std::env::var("MOCKCHAT_CHANNELS")
        .unwrap_or_else(|_| "2".into())
        .parse()
        .context("MOCKCHAT_CHANNELS must be a number")?;

    let service = Service::new(Network::default());

    let overrides: HashMap<String, String> = [
        ("MOCKCHAT_NETWORK_FAILURES", config::FAILURES_ENABLED),
        ("MOCKCHAT_MIN_LATENCY_MS", config::MIN_LATENCY_MS),
        ("MOCKCHAT_MAX_LATENCY_MS", config::MAX_LATENCY_MS),
    ]
    .into_iter()
    .filter_map(|(var, key)| std::env::var(var).ok().map(|v| (key.to_string(), v)))
    .collect();

    let configurator = service.configurator();
    configurator.set_configuration(&overrides)?;
    info!(config = ?configurator.configuration(), "{} service ready", service.name());

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down");
            ctrl_c.cancel();
        }
    });

    // Authenticate
    let authenticator = if fast {
        Authenticator::Fast
    } else {
        Authenticator::Slow
    };
    info!(authenticator = authenticator.name(), %username, "authenticating");
    let form = [username.as_str()];
    let session = retry("authenticate", ServiceError::is_retryable, || {
        service.authenticate(authenticator, &form)
    })
    .await?;

    if let Ok(icon) = session.icon(&shutdown).await {
        info!(session_id = %session.id(), icon, "logged in");
    }

    // Join
    let mut handles = Vec::new();
    for channel in pick_channels(&session, wanted).await? {
        let observer = Arc::new(LogObserver::new(channel.id()));

        let stop = retry("join channel", ChannelError::is_retryable, || {
            channel.messenger().join(&shutdown, observer.clone())
        })
        .await;
        let stop = match stop {
            Ok(stop) => stop,
            Err(e) if e.is_cancelled() => break,
            Err(e) => return Err(e).context("failed to join channel"),
        };
        handles.push(stop);

        if let Some(typer) = channel.typer() {
            handles.push(typer.subscribe_typing(observer)?);
        }

        if let Ok(nick) = channel.nickname(&shutdown).await {
            info!(channel_id = channel.id(), name = %channel.name(), %nick, "joined");
        }

        if let Some(sender) = channel.sender() {
            let greeting = format!("hello from {username}");
            if let Err(e) = sender.send(&greeting, None).await {
                warn!(channel_id = channel.id(), "Failed to greet: {e}");
            }
        }
    }

    let mut out = tokio::io::stdout();
    if let Err(e) = session
        .commander()
        .run(&["random", "silly_name", "3"], &mut out)
        .await
    {
        warn!("Command failed: {e}");
    }

    shutdown.cancelled().await;

    for handle in &handles {
        handle.stop();
    }
    if let Err(e) = session.disconnect().await {
        warn!("Disconnect failed: {e}");
    }

    Ok(())
}
