//! CLI-side configuration discovery

pub mod loader;
