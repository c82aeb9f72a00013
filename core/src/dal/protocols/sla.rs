//! Simple Line Access (SLA) client
//!
//! SLA services list spectral line transitions whose wavelengths fall in a
//! requested range. Wavelengths are in meters throughout.

use crate::dal::connection::DalConnection;
use crate::dal::query::{DalQuery, ParamSet};
use crate::dal::results::{DalResults, Record};
use crate::error::{DalError, Result};
use async_trait::async_trait;
use url::Url;

const UTYPE_TITLE: &str = "ssldm:Line.title";
const UTYPE_WAVELENGTH: &str = "ssldm:Line.wavelength.value";
const UTYPE_SPECIES: &str = "ssldm:Line.species.name";

/// A line access service endpoint
#[derive(Debug, Clone)]
pub struct SlaService {
    base_url: String,
    connection: DalConnection,
}

impl SlaService {
    /// Wrap an SLA base URL
    pub fn new<S: Into<String>>(base_url: S, connection: DalConnection) -> Self {
        Self {
            base_url: base_url.into(),
            connection,
        }
    }

    /// The service base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a query preloaded with the mandatory protocol parameters
    pub fn create_query(&self) -> SlaQuery {
        let mut params = ParamSet::new();
        params.set("REQUEST", "queryData");
        SlaQuery {
            base_url: self.base_url.clone(),
            connection: self.connection.clone(),
            params,
        }
    }

    /// List transitions between two wavelengths, in meters
    pub async fn search(&self, min_wavelength: f64, max_wavelength: f64) -> Result<SlaResults> {
        let mut query = self.create_query();
        query.set_wavelength(min_wavelength, max_wavelength)?;
        query.execute().await
    }
}

/// A line access query under construction
#[derive(Debug, Clone)]
pub struct SlaQuery {
    base_url: String,
    connection: DalConnection,
    params: ParamSet,
}

impl SlaQuery {
    /// Set the wavelength range in meters; the lower bound comes first
    pub fn set_wavelength(&mut self, min: f64, max: f64) -> Result<&mut Self> {
        if !min.is_finite() || !max.is_finite() || min <= 0.0 {
            return Err(DalError::protocol(format!(
                "wavelengths must be positive and finite: {}/{}",
                min, max
            ))
            .into());
        }
        if min > max {
            return Err(DalError::protocol(format!(
                "wavelength range is inverted: {} > {}",
                min, max
            ))
            .into());
        }
        self.params.set("WAVELENGTH", format!("{}/{}", min, max));
        Ok(self)
    }

    /// Submit the query
    pub async fn execute(&self) -> Result<SlaResults> {
        Ok(SlaResults {
            results: self.execute_raw().await?,
        })
    }
}

#[async_trait]
impl DalQuery for SlaQuery {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn connection(&self) -> &DalConnection {
        &self.connection
    }

    fn query_url(&self) -> Result<Url> {
        self.params.query_url(&self.base_url)
    }
}

/// Results of a line access query
#[derive(Debug, Clone)]
pub struct SlaResults {
    results: DalResults,
}

impl SlaResults {
    /// Number of matched transitions
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether nothing matched
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Row view at the given index
    pub fn record(&self, index: usize) -> Option<SlaRecord<'_>> {
        self.results.record(index).map(|record| SlaRecord { record })
    }

    /// Iterate over all matched transitions
    pub fn iter(&self) -> impl Iterator<Item = SlaRecord<'_>> {
        self.results.iter().map(|record| SlaRecord { record })
    }

    /// The underlying generic result set
    pub fn as_dal(&self) -> &DalResults {
        &self.results
    }
}

/// One spectral line transition
#[derive(Debug, Clone, Copy)]
pub struct SlaRecord<'a> {
    record: Record<'a>,
}

impl<'a> SlaRecord<'a> {
    /// Short label for the transition, e.g. `H I Lyman alpha`
    pub fn title(&self) -> Option<&'a str> {
        self.by_utype_or_name(UTYPE_TITLE, "title")
            .and_then(|v| v.as_str())
    }

    /// Rest wavelength in meters
    pub fn wavelength(&self) -> Option<f64> {
        self.by_utype_or_name(UTYPE_WAVELENGTH, "wavelength")
            .and_then(|v| v.as_f64())
    }

    /// Name of the chemical species producing the line
    pub fn species_name(&self) -> Option<&'a str> {
        self.by_utype_or_name(UTYPE_SPECIES, "species")
            .and_then(|v| v.as_str())
    }

    /// The underlying generic record
    pub fn as_record(&self) -> Record<'a> {
        self.record
    }

    // Services predating the data model annotate by column name only
    fn by_utype_or_name(&self, utype: &str, name: &str) -> Option<&'a crate::votable::Value> {
        self.record.get_by_utype(utype).or_else(|| self.record.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> SlaQuery {
        let connection = DalConnection::new().unwrap();
        SlaService::new("http://example.org/sla", connection).create_query()
    }

    #[test]
    fn test_query_url_assembly() {
        let mut q = query();
        q.set_wavelength(1e-7, 3e-6).unwrap();
        assert_eq!(
            q.query_url().unwrap().as_str(),
            "http://example.org/sla?REQUEST=queryData&WAVELENGTH=0.0000001%2F0.000003"
        );
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let mut q = query();
        assert!(q.set_wavelength(3e-6, 1e-7).is_err());
    }

    #[test]
    fn test_nonpositive_wavelength_is_rejected() {
        let mut q = query();
        assert!(q.set_wavelength(0.0, 1e-6).is_err());
        assert!(q.set_wavelength(-1e-7, 1e-6).is_err());
    }
}
