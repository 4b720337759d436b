#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! Re-exports the `debug!` and `trace!` macros the tracker uses when the
//! `tracing` feature is enabled and provides no-op stand-ins otherwise, so
//! call sites never need `cfg` guards.
//! With `tracing-json`, [`init_json`] installs a JSON subscriber filtered by
//! `FTOUR_LOG`.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op trace macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }
}

/// Environment variable holding the `EnvFilter` directive for [`init_json`].
pub const LOG_ENV: &str = "FTOUR_LOG";

/// Install a global JSON subscriber on stderr filtered by `FTOUR_LOG`
/// (default `info`).
///
/// Returns `false` when a global subscriber is already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    #[test]
    fn macros_accept_structured_fields() {
        let timer = 7u64;
        crate::debug!(timer, target = "#a", "tracker event");
        crate::trace!(timer = timer, "tracker attached");
        assert_eq!(super::LOG_ENV, "FTOUR_LOG");
    }
}
