//! Query parameter handling and the common query trait

use crate::dal::connection::DalConnection;
use crate::dal::results::DalResults;
use crate::error::Result;
use crate::votable::VoTable;
use async_trait::async_trait;
use url::form_urlencoded;
use url::Url;

/// An ordered set of query parameters.
///
/// Order is preserved so assembled URLs are deterministic; setting an
/// existing name replaces its value in place.
#[derive(Debug, Clone, Default)]
pub struct ParamSet {
    params: Vec<(String, String)>,
}

impl ParamSet {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value
    pub fn set<V: ToString>(&mut self, name: &str, value: V) {
        let value = value.to_string();
        match self.params.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.params.push((name.to_string(), value)),
        }
    }

    /// Remove a parameter if present
    pub fn unset(&mut self, name: &str) {
        self.params.retain(|(n, _)| n != name);
    }

    /// Get a parameter value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Names of all set parameters, in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(n, _)| n.as_str())
    }

    /// Whether no parameters are set
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Borrow the raw name/value pairs
    pub fn pairs(&self) -> &[(String, String)] {
        &self.params
    }

    /// URL-encode the parameters as a query string
    pub fn encoded(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.params {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }

    /// Attach the parameters to a service base URL.
    ///
    /// DAL base URLs may already carry a partial query string (some end in
    /// `?` or `&` by convention), so the separator is chosen accordingly.
    pub fn query_url(&self, base_url: &str) -> Result<Url> {
        let query = self.encoded();
        let full = if query.is_empty() {
            base_url.to_string()
        } else if base_url.ends_with('?') || base_url.ends_with('&') {
            format!("{}{}", base_url, query)
        } else if base_url.contains('?') {
            format!("{}&{}", base_url, query)
        } else {
            format!("{}?{}", base_url, query)
        };
        Ok(Url::parse(&full)?)
    }
}

/// Common interface for DAL queries.
///
/// Each protocol assembles its own URL; execution and VOTable handling are
/// shared through the provided methods.
#[async_trait]
pub trait DalQuery: Send + Sync {
    /// The service base URL this query is submitted to
    fn base_url(&self) -> &str;

    /// The connection used for execution
    fn connection(&self) -> &DalConnection;

    /// Assemble the complete query URL
    fn query_url(&self) -> Result<Url>;

    /// Submit the query and return the parsed VOTable
    async fn execute_votable(&self) -> Result<VoTable> {
        let url = self.query_url()?;
        self.connection().get_votable(url).await
    }

    /// Submit the query and wrap the response in a generic result set
    async fn execute_raw(&self) -> Result<DalResults> {
        let url = self.query_url()?;
        let votable = self.connection().get_votable(url.clone()).await?;
        DalResults::from_votable(votable, url)
    }
}
