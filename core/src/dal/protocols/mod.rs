//! Clients for the individual data access protocols
//!
//! Each protocol gets a service/query/results triple. Services are cheap
//! handles around a base URL, queries accumulate protocol parameters, and
//! results wrap the generic [`DalResults`](crate::dal::DalResults) with
//! typed row accessors.

pub mod scs;
pub mod sia;
pub mod sla;
pub mod ssa;
pub mod tap;

pub use scs::{ScsQuery, ScsRecord, ScsResults, ScsService};
pub use sia::{ImageFormat, Intersect, SiaQuery, SiaRecord, SiaResults, SiaService};
pub use sla::{SlaQuery, SlaRecord, SlaResults, SlaService};
pub use ssa::{SsaQuery, SsaRecord, SsaResults, SsaService};
pub use tap::{TapQuery, TapResults, TapService};
