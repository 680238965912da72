//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP)
//! - Translate signals to internal events
//! - Trigger appropriate actions (shutdown, reload)
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handlers are registered once at startup so no signal is lost
//!   between two waits
//! - SIGHUP triggers an origin allow-list reload, not shutdown

use std::io;

use crate::lifecycle::shutdown::Shutdown;

/// What a received signal asks the process to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    Shutdown,
    Reload,
}

/// Registered OS signal streams.
pub struct Signals {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    hangup: tokio::signal::unix::Signal,
}

impl Signals {
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the next signal.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> io::Result<SignalEvent> {
        tokio::select! {
            res = tokio::signal::ctrl_c() => res.map(|_| SignalEvent::Shutdown),
            _ = self.terminate.recv() => Ok(SignalEvent::Shutdown),
            _ = self.hangup.recv() => Ok(SignalEvent::Reload),
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> io::Result<SignalEvent> {
        tokio::signal::ctrl_c().await.map(|_| SignalEvent::Shutdown)
    }
}

/// Dispatch signals until one asks for shutdown, then trigger it.
pub async fn handle_signals<F>(mut signals: Signals, shutdown: Shutdown, mut on_reload: F)
where
    F: FnMut(),
{
    loop {
        match signals.recv().await {
            Ok(SignalEvent::Reload) => {
                tracing::info!("SIGHUP received, reloading origin allow-list");
                on_reload();
            }
            Ok(SignalEvent::Shutdown) => {
                tracing::info!("Shutdown signal received");
                break;
            }
            Err(e) => {
                tracing::error!(error = %e, "Signal handling failed, shutting down");
                break;
            }
        }
    }
    shutdown.trigger();
}
