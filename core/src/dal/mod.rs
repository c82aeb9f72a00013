//! Data access layer
//!
//! The generic machinery every protocol shares: an HTTP connection that
//! knows how to fetch and screen VOTable responses, an ordered parameter
//! set, the [`DalQuery`] seam, and column-aware result sets.

pub mod connection;
pub mod protocols;
pub mod query;
pub mod results;

pub use connection::{ensure_trailing_slash, DalConnection};
pub use query::{DalQuery, ParamSet};
pub use results::{mjd_to_datetime, DalResults, Record};
