//! Basic VO registry interactions
//!
//! A VO registry is a database of VO resources, data collections and
//! services, typically aware of resources from all over the world. A
//! search returns records describing matching resources; with a record in
//! hand an application can contact the resource directly, most often by
//! promoting it to one of the protocol clients in
//! [`dal::protocols`](crate::dal::protocols).
//!
//! This module speaks the VOTable-based search interface of the VAO
//! registry at STScI.

pub mod query;
pub mod resource;

pub use query::{RegistryQuery, RegistryService, ServiceType, Waveband, STSCI_REGISTRY_BASEURL};
pub use resource::{RegistryResults, SimpleResource, VoService};

use crate::dal::DalConnection;
use crate::error::Result;

/// One-shot search against the default registry.
///
/// Builds a fresh [`DalConnection`] for the single request; callers issuing
/// more than one query should hold a [`RegistryService`] instead so the
/// connection pool is reused.
pub async fn search(
    keywords: &[&str],
    service_type: Option<ServiceType>,
    waveband: Option<Waveband>,
    predicate: Option<&str>,
) -> Result<RegistryResults> {
    let connection = DalConnection::new()?;
    let registry = RegistryService::new(connection);
    let mut query = registry.create_query();
    query.add_keywords(keywords);
    if let Some(service_type) = service_type {
        query.set_service_type(service_type);
    }
    if let Some(waveband) = waveband {
        query.set_waveband(waveband);
    }
    if let Some(predicate) = predicate {
        query.add_predicate(predicate);
    }
    query.execute().await
}
