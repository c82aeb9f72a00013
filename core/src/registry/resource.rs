//! Registry result sets and resource records

use crate::dal::connection::DalConnection;
use crate::dal::protocols::{ScsService, SiaService, SlaService, SsaService, TapService};
use crate::dal::results::{DalResults, Record};
use crate::error::{DalError, Result};
use crate::votable::Value;

/// Columns the registry serializes as `#`-delimited string lists
const STRING_LIST_COLUMNS: [&str; 4] = ["waveband", "subject", "type", "contentLevel"];

/// An iterable set of resource records returned by a registry query
#[derive(Debug, Clone)]
pub struct RegistryResults {
    results: DalResults,
}

impl RegistryResults {
    pub(crate) fn new(results: DalResults) -> Self {
        Self { results }
    }

    /// Number of matched resources
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether nothing matched
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Resource record at the given index
    pub fn resource(&self, index: usize) -> Option<SimpleResource<'_>> {
        self.results
            .record(index)
            .map(|record| SimpleResource { record })
    }

    /// Iterate over all matched resources
    pub fn iter(&self) -> impl Iterator<Item = SimpleResource<'_>> {
        self.results.iter().map(|record| SimpleResource { record })
    }

    /// The underlying generic result set
    pub fn as_dal(&self) -> &DalResults {
        &self.results
    }
}

/// One registry record describing a data collection or service.
///
/// Every attribute of the record is reachable through [`get`](Self::get);
/// the named accessors cover the ones applications use to find and then
/// contact a service. Columns that the registry packs into a single string
/// (waveband, subject, type, content level) come back as string lists.
#[derive(Debug, Clone, Copy)]
pub struct SimpleResource<'a> {
    record: Record<'a>,
}

impl<'a> SimpleResource<'a> {
    /// Title of the resource
    pub fn title(&self) -> Option<&'a str> {
        self.record.get_str("title")
    }

    /// Short name, usually an acronym
    pub fn short_name(&self) -> Option<&'a str> {
        self.record.get_str("shortName")
    }

    /// The IVOA identifier of the resource
    pub fn ivoid(&self) -> Option<&'a str> {
        self.record.get_str("identifier")
    }

    /// Curation tags attached to the record
    pub fn tags(&self) -> Option<&'a str> {
        self.record.get_str("tags")
    }

    /// Name of the organisation publishing the resource
    pub fn publisher(&self) -> Option<&'a str> {
        self.record.get_str("publisher")
    }

    /// Prose description of the resource
    pub fn description(&self) -> Option<&'a str> {
        self.record.get_str("description")
    }

    /// Wavebands the resource has data in
    pub fn waveband(&self) -> Vec<String> {
        self.string_list("waveband")
    }

    /// Subject keywords describing the resource
    pub fn subject(&self) -> Vec<String> {
        self.string_list("subject")
    }

    /// Resource types, e.g. `Catalog` or `Archive`
    pub fn resource_type(&self) -> Vec<String> {
        self.string_list("type")
    }

    /// Intended audiences, e.g. `Research`
    pub fn content_level(&self) -> Vec<String> {
        self.string_list("contentLevel")
    }

    /// Capability class of the service interface, e.g. `ConeSearch`
    pub fn capability(&self) -> Option<&'a str> {
        self.record.get_str("capabilityClass")
    }

    /// IVOA standard identifier of the service interface
    pub fn standard_id(&self) -> Option<&'a str> {
        self.record.get_str("capabilityStandardID")
    }

    /// Base URL at which the service accepts queries
    pub fn access_url(&self) -> Option<&'a str> {
        self.record.get_str("accessURL")
    }

    /// Raw value of any record attribute
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.record.get(name)
    }

    /// The underlying generic record
    pub fn as_record(&self) -> Record<'a> {
        self.record
    }

    /// Promote the record to a queryable service client.
    ///
    /// The capability class decides the protocol, with the standard ID as
    /// a fallback for registries that leave the class column empty. Fails
    /// when the record lacks an access URL or does not describe a service
    /// speaking a supported protocol.
    pub fn to_service(&self, connection: &DalConnection) -> Result<VoService> {
        let access_url = self
            .access_url()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| DalError::format("resource record has no access URL"))?;

        let kind = self
            .capability()
            .and_then(kind_from_capability)
            .or_else(|| self.standard_id().and_then(kind_from_standard_id));

        match kind {
            Some(ServiceKind::Cone) => Ok(VoService::Cone(ScsService::new(
                access_url,
                connection.clone(),
            ))),
            Some(ServiceKind::Image) => Ok(VoService::Image(SiaService::new(
                access_url,
                connection.clone(),
            ))),
            Some(ServiceKind::Spectrum) => Ok(VoService::Spectrum(SsaService::new(
                access_url,
                connection.clone(),
            ))),
            Some(ServiceKind::Line) => Ok(VoService::Line(SlaService::new(
                access_url,
                connection.clone(),
            ))),
            Some(ServiceKind::Table) => Ok(VoService::Table(TapService::new(
                access_url,
                connection.clone(),
            ))),
            None => Err(DalError::protocol(format!(
                "resource {} is not a service speaking a supported protocol",
                self.ivoid().unwrap_or("<unidentified>")
            ))
            .into()),
        }
    }

    fn string_list(&self, name: &str) -> Vec<String> {
        debug_assert!(STRING_LIST_COLUMNS.contains(&name));
        match self.record.get(name) {
            Some(Value::Text(text)) => split_hash_list(text),
            _ => Vec::new(),
        }
    }
}

/// A protocol client built from a registry record
#[derive(Debug, Clone)]
pub enum VoService {
    Cone(ScsService),
    Image(SiaService),
    Spectrum(SsaService),
    Line(SlaService),
    Table(TapService),
}

impl VoService {
    /// The base URL of the underlying service
    pub fn base_url(&self) -> &str {
        match self {
            VoService::Cone(s) => s.base_url(),
            VoService::Image(s) => s.base_url(),
            VoService::Spectrum(s) => s.base_url(),
            VoService::Line(s) => s.base_url(),
            VoService::Table(s) => s.base_url(),
        }
    }

    /// Short protocol label, e.g. `scs`
    pub fn protocol(&self) -> &'static str {
        match self {
            VoService::Cone(_) => "scs",
            VoService::Image(_) => "sia",
            VoService::Spectrum(_) => "ssa",
            VoService::Line(_) => "sla",
            VoService::Table(_) => "tap",
        }
    }
}

enum ServiceKind {
    Cone,
    Image,
    Spectrum,
    Line,
    Table,
}

fn kind_from_capability(capability: &str) -> Option<ServiceKind> {
    match capability {
        "ConeSearch" => Some(ServiceKind::Cone),
        "SimpleImageAccess" => Some(ServiceKind::Image),
        "SimpleSpectralAccess" => Some(ServiceKind::Spectrum),
        "SimpleLineAccess" => Some(ServiceKind::Line),
        "TableAccess" => Some(ServiceKind::Table),
        _ => None,
    }
}

fn kind_from_standard_id(standard_id: &str) -> Option<ServiceKind> {
    let id = standard_id.to_ascii_lowercase();
    if id.contains("conesearch") {
        Some(ServiceKind::Cone)
    } else if id.contains("sia") {
        Some(ServiceKind::Image)
    } else if id.contains("ssa") {
        Some(ServiceKind::Spectrum)
    } else if id.contains("slap") {
        Some(ServiceKind::Line)
    } else if id.contains("tap") {
        Some(ServiceKind::Table)
    } else {
        None
    }
}

/// Decode a `#`-delimited string list, dropping one leading and one
/// trailing delimiter when present
fn split_hash_list(text: &str) -> Vec<String> {
    let inner = text.strip_prefix('#').unwrap_or(text);
    let inner = inner.strip_suffix('#').unwrap_or(inner);
    if inner.is_empty() {
        return Vec::new();
    }
    inner.split('#').map(str::to_string).collect()
}
