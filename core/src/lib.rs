//! # VOQuest Core
//!
//! Rust interfaces for querying Virtual Observatory (VO) data services.
//!
//! The crate splits into three layers:
//!
//! - [`registry`] searches a resource registry for data collections and
//!   services worth querying
//! - [`dal`] carries the generic data-access machinery plus clients for
//!   the individual protocols (cone search, image access, spectral
//!   access, line access, and synchronous TAP)
//! - [`votable`] parses the VOTable documents every VO service answers
//!   with
//!
//! ## Quick start
//!
//! ```no_run
//! use voquest_core::dal::protocols::ScsService;
//! use voquest_core::dal::DalConnection;
//!
//! # async fn run() -> voquest_core::Result<()> {
//! let connection = DalConnection::new()?;
//! let service = ScsService::new("http://example.org/scs?", connection);
//! let results = service.search(83.633, 22.014, 0.25).await?;
//! for source in results.iter() {
//!     println!("{:?} at {:?},{:?}", source.id(), source.ra(), source.dec());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dal;
pub mod error;
pub mod registry;
pub mod votable;

pub use config::VoConfig;
pub use error::{ConfigError, DalError, Error, Result};

/// Version of the voquest core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing with an env-driven filter, defaulting to `info`
pub fn init_tracing() {
    init_tracing_with_filter("info");
}

/// Initialize tracing at `debug` verbosity
pub fn init_tracing_with_debug() {
    init_tracing_with_filter("debug");
}

fn init_tracing_with_filter(default_directive: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
