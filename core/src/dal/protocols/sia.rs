//! Simple Image Access (SIA) client
//!
//! SIA services describe images overlapping a rectangular region of the
//! sky. Each row of the result carries image metadata plus an access
//! reference URL from which the actual dataset can be downloaded.

use crate::dal::connection::DalConnection;
use crate::dal::query::{DalQuery, ParamSet};
use crate::dal::results::{mjd_to_datetime, DalResults, Record};
use crate::error::{DalError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

const UCD_TITLE: &str = "VOX:Image_Title";
const UCD_RA: &str = "POS_EQ_RA_MAIN";
const UCD_DEC: &str = "POS_EQ_DEC_MAIN";
const UCD_INSTRUMENT: &str = "INST_ID";
const UCD_DATE_OBS: &str = "VOX:Image_MJDateObs";
const UCD_NAXES: &str = "VOX:Image_Naxes";
const UCD_NAXIS: &str = "VOX:Image_Naxis";
const UCD_FORMAT: &str = "VOX:Image_Format";
const UCD_ACREF: &str = "VOX:Image_AccessReference";
const UCD_FILESIZE: &str = "VOX:Image_FileSize";

/// Image format constraint for an SIA query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageFormat {
    /// Any format the service has
    All,
    /// Browser-renderable formats (JPEG, PNG, GIF)
    Graphic,
    /// Metadata-only response describing the query parameters
    Metadata,
    /// A specific MIME type such as `image/fits`
    Mime(String),
}

impl ImageFormat {
    /// Parse a format constraint from its query-parameter spelling
    pub fn from_name(value: &str) -> Result<Self> {
        match value.to_ascii_uppercase().as_str() {
            "ALL" => Ok(ImageFormat::All),
            "GRAPHIC" => Ok(ImageFormat::Graphic),
            "METADATA" => Ok(ImageFormat::Metadata),
            _ => {
                let mime: mime::Mime = value
                    .parse()
                    .map_err(|_| DalError::protocol(format!("not a MIME type: {}", value)))?;
                Ok(ImageFormat::Mime(mime.to_string()))
            }
        }
    }

    fn as_param(&self) -> String {
        match self {
            ImageFormat::All => "ALL".to_string(),
            ImageFormat::Graphic => "GRAPHIC".to_string(),
            ImageFormat::Metadata => "METADATA".to_string(),
            ImageFormat::Mime(m) => m.clone(),
        }
    }
}

/// How a matched image must relate to the query region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intersect {
    /// Image covers the whole region
    Covers,
    /// Image lies entirely inside the region
    Enclosed,
    /// Image contains the region center
    Center,
    /// Image overlaps the region at all (the service default)
    Overlaps,
}

impl Intersect {
    /// Parse an overlap mode from its query-parameter spelling
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "COVERS" => Ok(Intersect::Covers),
            "ENCLOSED" => Ok(Intersect::Enclosed),
            "CENTER" => Ok(Intersect::Center),
            "OVERLAPS" => Ok(Intersect::Overlaps),
            _ => Err(DalError::protocol(format!("unrecognized intersect mode: {}", name)).into()),
        }
    }

    fn as_param(&self) -> &'static str {
        match self {
            Intersect::Covers => "COVERS",
            Intersect::Enclosed => "ENCLOSED",
            Intersect::Center => "CENTER",
            Intersect::Overlaps => "OVERLAPS",
        }
    }
}

/// An image access service endpoint
#[derive(Debug, Clone)]
pub struct SiaService {
    base_url: String,
    connection: DalConnection,
}

impl SiaService {
    /// Wrap an SIA base URL
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
    pub fn create_query(&self) -> SiaQuery {
        SiaQuery {
            base_url: self.base_url.clone(),
            connection: self.connection.clone(),
            params: ParamSet::new(),
        }
    }

    /// Search a square region of the given size around a position, degrees
    pub async fn search(&self, ra: f64, dec: f64, size: f64) -> Result<SiaResults> {
        let mut query = self.create_query();
        query.set_pos(ra, dec)?;
        query.set_size(size, None)?;
        query.execute().await
    }

    /// Download the dataset a result row points at
    pub async fn fetch_dataset(&self, record: &SiaRecord<'_>) -> Result<Bytes> {
        let response = self.open_dataset(record).await?;
        Ok(response.bytes().await?)
    }

    /// Stream the dataset a result row points at into a writer, returning
    /// the number of bytes written.
    ///
    /// Unlike [`fetch_dataset`](Self::fetch_dataset) this never buffers the
    /// whole dataset in memory, which matters for survey-sized images.
    pub async fn download_dataset<W>(&self, record: &SiaRecord<'_>, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let response = self.open_dataset(record).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;
        Ok(written)
    }

    async fn open_dataset(&self, record: &SiaRecord<'_>) -> Result<reqwest::Response> {
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
        Ok(response)
    }
}

/// An image access query under construction
#[derive(Debug, Clone)]
pub struct SiaQuery {
    base_url: String,
    connection: DalConnection,
    params: ParamSet,
}

impl SiaQuery {
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

    /// Set the region extent in degrees; a second value makes it rectangular
    pub fn set_size(&mut self, width: f64, height: Option<f64>) -> Result<&mut Self> {
        check_extent(width)?;
        let value = match height {
            Some(h) => {
                check_extent(h)?;
                format!("{},{}", width, h)
            }
            None => format!("{}", width),
        };
        self.params.set("SIZE", value);
        Ok(self)
    }

    /// Restrict results to images of a given format
    pub fn set_format(&mut self, format: ImageFormat) -> &mut Self {
        self.params.set("FORMAT", format.as_param());
        self
    }

    /// Require a particular overlap between image and region
    pub fn set_intersect(&mut self, intersect: Intersect) -> &mut Self {
        self.params.set("INTERSECT", intersect.as_param());
        self
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
    pub async fn execute(&self) -> Result<SiaResults> {
        Ok(SiaResults {
            results: self.execute_raw().await?,
        })
    }
}

fn check_extent(value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 || value > 360.0 {
        return Err(
            DalError::protocol(format!("region extent out of range (0,360]: {}", value)).into(),
        );
    }
    Ok(())
}

#[async_trait]
impl DalQuery for SiaQuery {
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

/// Results of an image access query
#[derive(Debug, Clone)]
pub struct SiaResults {
    results: DalResults,
}

impl SiaResults {
    /// Number of matched images
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether nothing matched
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Row view at the given index
    pub fn record(&self, index: usize) -> Option<SiaRecord<'_>> {
        self.results.record(index).map(|record| SiaRecord { record })
    }

    /// Iterate over all matched images
    pub fn iter(&self) -> impl Iterator<Item = SiaRecord<'_>> {
        self.results.iter().map(|record| SiaRecord { record })
    }

    /// The underlying generic result set
    pub fn as_dal(&self) -> &DalResults {
        &self.results
    }
}

/// Metadata for one matched image
#[derive(Debug, Clone, Copy)]
pub struct SiaRecord<'a> {
    record: Record<'a>,
}

impl<'a> SiaRecord<'a> {
    /// Human-oriented title of the image
    pub fn title(&self) -> Option<&'a str> {
        self.record.get_by_ucd(UCD_TITLE).and_then(|v| v.as_str())
    }

    /// Right ascension of the image center in degrees
    pub fn ra(&self) -> Option<f64> {
        self.record.get_by_ucd(UCD_RA).and_then(|v| v.as_f64())
    }

    /// Declination of the image center in degrees
    pub fn dec(&self) -> Option<f64> {
        self.record.get_by_ucd(UCD_DEC).and_then(|v| v.as_f64())
    }

    /// Name of the instrument that took the image
    pub fn instrument(&self) -> Option<&'a str> {
        self.record
            .get_by_ucd(UCD_INSTRUMENT)
            .and_then(|v| v.as_str())
    }

    /// Epoch of observation, converted from the service's modified Julian date
    pub fn date_obs(&self) -> Option<DateTime<Utc>> {
        self.record
            .get_by_ucd(UCD_DATE_OBS)
            .and_then(|v| v.as_f64())
            .and_then(mjd_to_datetime)
    }

    /// Number of image axes
    pub fn naxes(&self) -> Option<i64> {
        self.record.get_by_ucd(UCD_NAXES).and_then(|v| v.as_i64())
    }

    /// Length of each image axis in pixels
    pub fn naxis(&self) -> Option<Vec<i64>> {
        let raw = self.record.get_by_ucd(UCD_NAXIS)?;
        let text = raw.as_str()?;
        let mut axes = Vec::new();
        for part in text.split([' ', ',']) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            axes.push(part.parse().ok()?);
        }
        if axes.is_empty() {
            None
        } else {
            Some(axes)
        }
    }

    /// MIME type of the dataset
    pub fn format(&self) -> Option<&'a str> {
        self.record.get_by_ucd(UCD_FORMAT).and_then(|v| v.as_str())
    }

    /// URL from which the dataset can be downloaded
    pub fn acref(&self) -> Option<&'a str> {
        self.record.get_by_ucd(UCD_ACREF).and_then(|v| v.as_str())
    }

    /// Approximate dataset size in bytes
    pub fn filesize(&self) -> Option<i64> {
        self.record
            .get_by_ucd(UCD_FILESIZE)
            .and_then(|v| v.as_i64())
    }

    /// The underlying generic record
    pub fn as_record(&self) -> Record<'a> {
        self.record
    }
}
