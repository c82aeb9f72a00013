//! Table Access Protocol (TAP) client, synchronous mode
//!
//! TAP services expose relational catalogs to ADQL queries. This client
//! speaks the synchronous endpoint only: the query is POSTed to
//! `{base}/sync` and the row set comes back in the response body.

use crate::dal::connection::DalConnection;
use crate::dal::query::{DalQuery, ParamSet};
use crate::dal::results::{DalResults, Record};
use crate::error::{DalError, Result};
use async_trait::async_trait;
use url::Url;

/// A TAP service endpoint
#[derive(Debug, Clone)]
pub struct TapService {
    base_url: String,
    connection: DalConnection,
}

impl TapService {
    /// Wrap a TAP base URL (the capability root, without `/sync`)
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

    /// Create a query carrying the given ADQL statement
    pub fn create_query<S: Into<String>>(&self, adql: S) -> Result<TapQuery> {
        let adql = adql.into();
        if adql.trim().is_empty() {
            return Err(DalError::protocol("ADQL query is empty").into());
        }
        Ok(TapQuery {
            base_url: self.base_url.clone(),
            connection: self.connection.clone(),
            adql,
            maxrec: None,
        })
    }

    /// Run an ADQL query synchronously and collect the row set
    pub async fn run_sync<S: Into<String>>(&self, adql: S) -> Result<TapResults> {
        self.create_query(adql)?.execute().await
    }
}

/// A synchronous TAP query
#[derive(Debug, Clone)]
pub struct TapQuery {
    base_url: String,
    connection: DalConnection,
    adql: String,
    maxrec: Option<u64>,
}

impl TapQuery {
    /// The ADQL statement this query will run
    pub fn adql(&self) -> &str {
        &self.adql
    }

    /// Cap the number of rows the service may return
    pub fn set_maxrec(&mut self, maxrec: u64) -> &mut Self {
        self.maxrec = Some(maxrec);
        self
    }

    /// The endpoint the query is submitted to
    pub fn sync_url(&self) -> Result<Url> {
        let base = self.base_url.trim_end_matches('/');
        let full = if base.ends_with("/sync") {
            base.to_string()
        } else {
            format!("{}/sync", base)
        };
        Ok(Url::parse(&full)?)
    }

    fn protocol_params(&self) -> ParamSet {
        let mut params = ParamSet::new();
        params.set("REQUEST", "doQuery");
        params.set("LANG", "ADQL");
        params.set("QUERY", self.adql.as_str());
        params.set("FORMAT", "votable");
        if let Some(maxrec) = self.maxrec {
            params.set("MAXREC", maxrec);
        }
        params
    }

    /// Submit the query
    pub async fn execute(&self) -> Result<TapResults> {
        let url = self.sync_url()?;
        let params = self.protocol_params();
        let votable = self
            .connection
            .post_votable(url.clone(), params.pairs())
            .await?;
        let results = DalResults::from_votable(votable, url)?;
        Ok(TapResults { results })
    }
}

#[async_trait]
impl DalQuery for TapQuery {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn connection(&self) -> &DalConnection {
        &self.connection
    }

    // The GET spelling of the same request, for services that allow it
    fn query_url(&self) -> Result<Url> {
        let url = self.sync_url()?;
        self.protocol_params().query_url(url.as_str())
    }
}

/// Results of a TAP query
#[derive(Debug, Clone)]
pub struct TapResults {
    results: DalResults,
}

impl TapResults {
    /// Number of returned rows
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the row set is empty
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Row view at the given index
    pub fn record(&self, index: usize) -> Option<Record<'_>> {
        self.results.record(index)
    }

    /// Iterate over all rows
    pub fn iter(&self) -> impl Iterator<Item = Record<'_>> {
        self.results.iter()
    }

    /// The underlying generic result set
    pub fn as_dal(&self) -> &DalResults {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn service() -> TapService {
        let connection = DalConnection::new().unwrap();
        TapService::new("http://example.org/tap", connection)
    }

    #[test]
    fn test_sync_url_appends_endpoint() {
        let q = service().create_query("SELECT TOP 5 * FROM ivoa.obscore").unwrap();
        assert_eq!(q.sync_url().unwrap().as_str(), "http://example.org/tap/sync");
    }

    #[test]
    fn test_sync_url_keeps_existing_endpoint() {
        let connection = DalConnection::new().unwrap();
        let svc = TapService::new("http://example.org/tap/sync", connection);
        let q = svc.create_query("SELECT 1").unwrap();
        assert_eq!(q.sync_url().unwrap().as_str(), "http://example.org/tap/sync");
    }

    #[test]
    fn test_empty_adql_is_rejected() {
        let err = service().create_query("   ").unwrap_err();
        assert!(matches!(err, Error::Dal(DalError::Protocol { .. })));
    }

    #[test]
    fn test_protocol_params() {
        let mut q = service().create_query("SELECT 1").unwrap();
        q.set_maxrec(100);
        let params = q.protocol_params();
        assert_eq!(params.get("REQUEST"), Some("doQuery"));
        assert_eq!(params.get("LANG"), Some("ADQL"));
        assert_eq!(params.get("QUERY"), Some("SELECT 1"));
        assert_eq!(params.get("FORMAT"), Some("votable"));
        assert_eq!(params.get("MAXREC"), Some("100"));
    }

    #[test]
    fn test_get_spelling() {
        let q = service().create_query("SELECT 1").unwrap();
        let url = q.query_url().unwrap();
        assert!(url.as_str().starts_with("http://example.org/tap/sync?"));
        assert!(url.as_str().contains("REQUEST=doQuery"));
        assert!(url.as_str().contains("QUERY=SELECT+1"));
    }
}
