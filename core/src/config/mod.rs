//! Client configuration

pub mod types;

pub use types::VoConfig;
