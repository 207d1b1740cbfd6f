//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events. Applications that want them on
//! stderr call [`init`] once at startup; `RUST_LOG` overrides the level.

use crate::types::LogLevel;
use once_cell::sync::OnceCell;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INITIALIZED: OnceCell<bool> = OnceCell::new();

/// Install the global subscriber
///
/// Returns `true` if this call installed it. Later calls, or a subscriber
/// installed by someone else, leave the existing one in place.
pub fn init(level: LogLevel) -> bool {
    let mut installed = false;
    INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

        installed = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .is_ok();
        installed
    });
    installed
}

/// Has [`init`] installed the subscriber?
pub fn is_initialized() -> bool {
    INITIALIZED.get().copied().unwrap_or(false)
}
