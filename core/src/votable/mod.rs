//! VOTable parsing
//!
//! VO services answer queries with VOTable XML documents. This module reads
//! the TABLEDATA serialization into typed tables: FIELD metadata, decoded
//! cell values, and the INFO elements that carry query status.

pub mod field;
pub mod parse;
pub mod value;

pub use field::{DataType, Field};
pub use parse::{Info, Resource, TableData, VoTable};
pub use value::Value;
