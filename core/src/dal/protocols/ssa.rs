//! Simple Spectral Access (SSA) client
//!
//! SSA services describe spectra whose aperture overlaps a circular region
//! of the sky. Unlike the older cone search and image protocols, result
//! columns are identified by utype rather than UCD.

use crate::dal::connection::DalConnection;
use crate::dal::query::{DalQuery, ParamSet};
use crate::dal::results::{DalResults, Record};
use crate::error::{DalError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

const UTYPE_TITLE: &str = "ssa:DataID.Title";
const UTYPE_TARGET: &str = "ssa:Target.Name";
const UTYPE_ACREF: &str = "ssa:Access.Reference";
const UTYPE_FORMAT: &str = "ssa:Access.Format";
const UTYPE_RA: &str = "ssa:Char.SpatialAxis.Coverage.Location.Value";

/// A spectral access service endpoint
#[derive(Debug, Clone)]
pub struct SsaService {
    base_url: String,
    connection: DalConnection,
}

impl SsaService {
    /// Wrap an SSA base URL
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
    pub fn create_query(&self) -> SsaQuery {
        let mut params = ParamSet::new();
        params.set("REQUEST", "queryData");
        SsaQuery {
            base_url: self.base_url.clone(),
            connection: self.connection.clone(),
            params,
        }
    }

    /// Search a circular region of the given diameter around a position
    pub async fn search(&self, ra: f64, dec: f64, diameter: f64) -> Result<SsaResults> {
        let mut query = self.create_query();
        query.set_pos(ra, dec)?;
        query.set_size(diameter)?;
        query.execute().await
    }

    /// Download the dataset a result row points at
    pub async fn fetch_dataset(&self, record: &SsaRecord<'_>) -> Result<Bytes> {
        let acref = record
            .acref()
            .ok_or_else(|| DalError::format("record has no access reference"))?;
        let url: Url = Url::parse(acref)?;
        let response = self.connection.get_response(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(crate::error::Error::Dal(DalError::Service {
                status: status.as_u16(),
                message: format!("dataset retrieval failed: {}", acref),
            }));
        }
        Ok(response.bytes().await?)
    }
}

/// A spectral access query under construction
#[derive(Debug, Clone)]
pub struct SsaQuery {
    base_url: String,
    connection: DalConnection,
    params: ParamSet,
}

impl SsaQuery {
    /// Set the region center (ICRS degrees)
    pub fn set_pos(&mut self, ra: f64, dec: f64) -> Result<&mut Self> {
        if !ra.is_finite() || !dec.is_finite() {
            return Err(DalError::protocol("position must be finite").into());
        }
        if !(-90.0..=90.0).contains(&dec) {
            return Err(
                DalError::protocol(format!("declination out of range [-90,90]: {}", dec)).into(),
            );
        }
        self.params
            .set("POS", format!("{},{}", ra.rem_euclid(360.0), dec));
        Ok(self)
    }

    /// Set the region diameter in degrees
    pub fn set_size(&mut self, diameter: f64) -> Result<&mut Self> {
        if !diameter.is_finite() || diameter <= 0.0 || diameter > 360.0 {
            return Err(DalError::protocol(format!(
                "region diameter out of range (0,360]: {}",
                diameter
            ))
            .into());
        }
        self.params.set("SIZE", diameter);
        Ok(self)
    }

    /// Constrain the spectral band, e.g. `1e-7/3e-6` in meters or `J`
    pub fn set_band<S: Into<String>>(&mut self, band: S) -> &mut Self {
        self.params.set("BAND", band.into());
        self
    }

    /// Constrain the epoch of observation, e.g. `2010-01-01/2010-06-30`
    pub fn set_time<S: Into<String>>(&mut self, time: S) -> &mut Self {
        self.params.set("TIME", time.into());
        self
    }

    /// Restrict results to a given serialization, e.g. `application/fits`
    pub fn set_format<S: Into<String>>(&mut self, format: S) -> &mut Self {
        self.params.set("FORMAT", format.into());
        self
    }

    /// Submit the query
    pub async fn execute(&self) -> Result<SsaResults> {
        Ok(SsaResults {
            results: self.execute_raw().await?,
        })
    }
}

#[async_trait]
impl DalQuery for SsaQuery {
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

/// Results of a spectral access query
#[derive(Debug, Clone)]
pub struct SsaResults {
    results: DalResults,
}

impl SsaResults {
    /// Number of matched spectra
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether nothing matched
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Row view at the given index
    pub fn record(&self, index: usize) -> Option<SsaRecord<'_>> {
        self.results.record(index).map(|record| SsaRecord { record })
    }

    /// Iterate over all matched spectra
    pub fn iter(&self) -> impl Iterator<Item = SsaRecord<'_>> {
        self.results.iter().map(|record| SsaRecord { record })
    }

    /// The underlying generic result set
    pub fn as_dal(&self) -> &DalResults {
        &self.results
    }
}

/// Metadata for one matched spectrum
#[derive(Debug, Clone, Copy)]
pub struct SsaRecord<'a> {
    record: Record<'a>,
}

impl<'a> SsaRecord<'a> {
    /// Human-oriented title of the spectrum
    pub fn title(&self) -> Option<&'a str> {
        self.record
            .get_by_utype(UTYPE_TITLE)
            .and_then(|v| v.as_str())
    }

    /// Name of the observed target
    pub fn target_name(&self) -> Option<&'a str> {
        self.record
            .get_by_utype(UTYPE_TARGET)
            .and_then(|v| v.as_str())
    }

    /// Observed position as `ra dec`, when the service provides one
    pub fn pos(&self) -> Option<&'a str> {
        self.record.get_by_utype(UTYPE_RA).and_then(|v| v.as_str())
    }

    /// MIME type of the dataset
    pub fn format(&self) -> Option<&'a str> {
        self.record
            .get_by_utype(UTYPE_FORMAT)
            .and_then(|v| v.as_str())
    }

    /// URL from which the dataset can be downloaded
    pub fn acref(&self) -> Option<&'a str> {
        self.record
            .get_by_utype(UTYPE_ACREF)
            .and_then(|v| v.as_str())
    }

    /// The underlying generic record
    pub fn as_record(&self) -> Record<'a> {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> SsaQuery {
        let connection = DalConnection::new().unwrap();
        SsaService::new("http://example.org/ssa", connection).create_query()
    }

    #[test]
    fn test_request_param_is_preset() {
        let q = query();
        assert_eq!(
            q.query_url().unwrap().as_str(),
            "http://example.org/ssa?REQUEST=queryData"
        );
    }

    #[test]
    fn test_query_url_assembly() {
        let mut q = query();
        q.set_pos(22.438, -64.84).unwrap();
        q.set_size(0.2).unwrap();
        q.set_band("1e-7/3e-6");
        let url = q.query_url().unwrap();
        assert_eq!(
            url.as_str(),
            "http://example.org/ssa?REQUEST=queryData&POS=22.438%2C-64.84&SIZE=0.2&BAND=1e-7%2F3e-6"
        );
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        let mut q = query();
        assert!(q.set_pos(0.0, -100.0).is_err());
        assert!(q.set_size(0.0).is_err());
    }
}
