//! Simple Cone Search (SCS) client
//!
//! A cone search asks a catalog service for every source within a given
//! angular radius of a sky position. Positions are ICRS decimal degrees.

use crate::dal::connection::DalConnection;
use crate::dal::query::{DalQuery, ParamSet};
use crate::dal::results::{DalResults, Record};
use crate::error::{DalError, Result};
use async_trait::async_trait;
use url::Url;

/// UCDs the SCS standard requires on its identity columns
const UCD_ID: &str = "ID_MAIN";
const UCD_RA: &str = "POS_EQ_RA_MAIN";
const UCD_DEC: &str = "POS_EQ_DEC_MAIN";

/// A cone search service endpoint
#[derive(Debug, Clone)]
pub struct ScsService {
    base_url: String,
    connection: DalConnection,
}

impl ScsService {
    /// Wrap a cone search base URL
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

    /// Create an empty query against this service
    pub fn create_query(&self) -> ScsQuery {
        ScsQuery {
            base_url: self.base_url.clone(),
            connection: self.connection.clone(),
            params: ParamSet::new(),
        }
    }

    /// Search a cone of the given radius around a position, all in degrees
    pub async fn search(&self, ra: f64, dec: f64, radius: f64) -> Result<ScsResults> {
        let mut query = self.create_query();
        query.set_pos(ra, dec)?;
        query.set_radius(radius)?;
        query.execute().await
    }
}

/// A cone search query under construction
#[derive(Debug, Clone)]
pub struct ScsQuery {
    base_url: String,
    connection: DalConnection,
    params: ParamSet,
}

impl ScsQuery {
    /// Set the cone center (ICRS degrees).
    ///
    /// Right ascension is normalised into [0, 360); declination outside
    /// [-90, 90] is rejected.
    pub fn set_pos(&mut self, ra: f64, dec: f64) -> Result<&mut Self> {
        if !ra.is_finite() || !dec.is_finite() {
            return Err(DalError::protocol("position must be finite").into());
        }
        if !(-90.0..=90.0).contains(&dec) {
            return Err(
                DalError::protocol(format!("declination out of range [-90,90]: {}", dec)).into(),
            );
        }
        self.params.set("RA", ra.rem_euclid(360.0));
        self.params.set("DEC", dec);
        Ok(self)
    }

    /// Set the search radius in degrees
    pub fn set_radius(&mut self, radius: f64) -> Result<&mut Self> {
        if !radius.is_finite() || radius <= 0.0 || radius > 180.0 {
            return Err(
                DalError::protocol(format!("search radius out of range (0,180]: {}", radius))
                    .into(),
            );
        }
        self.params.set("SR", radius);
        Ok(self)
    }

    /// Set the verbosity level (0 to 3) controlling how many columns return
    pub fn set_verbosity(&mut self, verb: u8) -> Result<&mut Self> {
        if verb > 3 {
            return Err(DalError::protocol(format!("verbosity out of range 0-3: {}", verb)).into());
        }
        self.params.set("VERB", verb);
        Ok(self)
    }

    /// Submit the query
    pub async fn execute(&self) -> Result<ScsResults> {
        Ok(ScsResults {
            results: self.execute_raw().await?,
        })
    }
}

#[async_trait]
impl DalQuery for ScsQuery {
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

/// Results of a cone search
#[derive(Debug, Clone)]
pub struct ScsResults {
    results: DalResults,
}

impl ScsResults {
    /// Number of matched sources
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether nothing matched
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Row view at the given index
    pub fn record(&self, index: usize) -> Option<ScsRecord<'_>> {
        self.results.record(index).map(|record| ScsRecord { record })
    }

    /// Iterate over all matched sources
    pub fn iter(&self) -> impl Iterator<Item = ScsRecord<'_>> {
        self.results.iter().map(|record| ScsRecord { record })
    }

    /// The underlying generic result set
    pub fn as_dal(&self) -> &DalResults {
        &self.results
    }
}

/// One cone search match
#[derive(Debug, Clone, Copy)]
pub struct ScsRecord<'a> {
    record: Record<'a>,
}

impl<'a> ScsRecord<'a> {
    /// Main identifier of the source
    pub fn id(&self) -> Option<&'a str> {
        self.record.get_by_ucd(UCD_ID).and_then(|v| v.as_str())
    }

    /// Right ascension in degrees
    pub fn ra(&self) -> Option<f64> {
        self.record.get_by_ucd(UCD_RA).and_then(|v| v.as_f64())
    }

    /// Declination in degrees
    pub fn dec(&self) -> Option<f64> {
        self.record.get_by_ucd(UCD_DEC).and_then(|v| v.as_f64())
    }

    /// The underlying generic record
    pub fn as_record(&self) -> Record<'a> {
        self.record
    }
}
