//! HTTP plumbing shared by every DAL client

use crate::config::VoConfig;
use crate::error::{DalError, Error, Result};
use crate::votable::VoTable;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// How much of an error body is kept in error messages
const BODY_EXCERPT_LEN: usize = 200;

/// Shared HTTP connection for DAL services.
///
/// Wraps a `reqwest::Client` (itself a handle over a connection pool), so
/// cloning is cheap and clones share the pool.
#[derive(Debug, Clone)]
pub struct DalConnection {
    client: Client,
}

impl DalConnection {
    /// Create a connection with default timeout and user agent
    pub fn new() -> Result<Self> {
        Self::from_config(&VoConfig::default())
    }

    /// Create a connection from a resolved configuration
    pub fn from_config(config: &VoConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }

    /// Issue a GET request and return the raw response
    pub async fn get_response(&self, url: Url) -> Result<reqwest::Response> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Ok(response)
    }

    /// Issue a GET request and parse the response as a VOTable.
    ///
    /// Non-2xx statuses, QUERY_STATUS=ERROR answers, and unparseable bodies
    /// all surface as the matching [`DalError`] variant.
    pub async fn get_votable(&self, url: Url) -> Result<VoTable> {
        let response = self.get_response(url).await?;
        self.read_votable(response).await
    }

    /// Issue a form POST and parse the response as a VOTable
    pub async fn post_votable(&self, url: Url, form: &[(String, String)]) -> Result<VoTable> {
        debug!("POST {}", url);
        let response = self.client.post(url).form(form).send().await?;
        self.read_votable(response).await
    }

    async fn read_votable(&self, response: reqwest::Response) -> Result<VoTable> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await?;

        if !status.is_success() {
            return Err(DalError::Service {
                status: status.as_u16(),
                message: excerpt(&body),
            }
            .into());
        }

        if let Some(ct) = &content_type {
            if !looks_like_xml(ct) {
                warn!("service answered with content type '{}'", ct);
            }
        }

        let votable = VoTable::parse(body.as_bytes()).map_err(|err| {
            // A wrong content type explains the parse failure better
            match &content_type {
                Some(ct) if !looks_like_xml(ct) => Error::from(DalError::format(format!(
                    "service returned '{}' instead of a VOTable",
                    ct
                ))),
                _ => err,
            }
        })?;

        screen_status(&votable)?;
        Ok(votable)
    }
}

/// Append a trailing slash when the base URL lacks one.
///
/// Registry endpoints are joined with a method name, so the original client
/// normalised its base URL this way.
pub fn ensure_trailing_slash(base_url: &str) -> String {
    if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    }
}

/// Reject a parsed document whose QUERY_STATUS INFO reports an error.
///
/// The INFO content carries the service's message; some services leave it
/// empty, which still has to surface as a query failure.
fn screen_status(votable: &VoTable) -> Result<()> {
    if let Some(status) = votable.query_status() {
        if status.value.eq_ignore_ascii_case("ERROR") {
            let message = status
                .content
                .clone()
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| "service reported a query error".to_string());
            return Err(DalError::Query { message }.into());
        }
    }
    Ok(())
}

fn looks_like_xml(content_type: &str) -> bool {
    match content_type.parse::<mime::Mime>() {
        Ok(mime) => {
            mime.subtype() == mime::XML
                || mime.suffix() == Some(mime::XML)
                || mime.subtype().as_str().contains("votable")
        }
        Err(_) => false,
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= BODY_EXCERPT_LEN {
        trimmed.to_string()
    } else {
        let mut end = BODY_EXCERPT_LEN;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &trimmed[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_trailing_slash() {
        assert_eq!(
            ensure_trailing_slash("http://vao.stsci.edu/directory/NVORegInt.asmx"),
            "http://vao.stsci.edu/directory/NVORegInt.asmx/"
        );
        assert_eq!(
            ensure_trailing_slash("http://vao.stsci.edu/directory/NVORegInt.asmx/"),
            "http://vao.stsci.edu/directory/NVORegInt.asmx/"
        );
    }

    #[test]
    fn test_xml_content_types() {
        assert!(looks_like_xml("text/xml"));
        assert!(looks_like_xml("application/xml; charset=utf-8"));
        assert!(looks_like_xml("application/x-votable+xml"));
        assert!(!looks_like_xml("text/html"));
        assert!(!looks_like_xml("garbage"));
    }

    #[test]
    fn test_excerpt_keeps_short_bodies() {
        assert_eq!(excerpt("  boom  "), "boom");
        let long = "x".repeat(500);
        let cut = excerpt(&long);
        assert!(cut.len() <= BODY_EXCERPT_LEN + 3);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_unresolvable_host_surfaces_as_http_error() {
        // .invalid never resolves, so this fails before any I/O happens
        let connection = DalConnection::new().unwrap();
        let url = Url::parse("http://service.invalid/scs").unwrap();
        let result = tokio_test::block_on(connection.get_votable(url));
        assert!(matches!(result, Err(Error::Http(_))));
    }

    #[test]
    fn test_error_status_becomes_query_error() {
        let doc = r#"<VOTABLE><RESOURCE>
            <INFO name="QUERY_STATUS" value="ERROR">RA out of range</INFO>
        </RESOURCE></VOTABLE>"#;
        let votable = VoTable::parse_str(doc).unwrap();
        match screen_status(&votable).unwrap_err() {
            Error::Dal(DalError::Query { message }) => assert_eq!(message, "RA out of range"),
            other => panic!("expected a query error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_status_without_content_gets_a_stand_in_message() {
        let doc = r#"<VOTABLE><RESOURCE>
            <INFO name="QUERY_STATUS" value="ERROR"/>
        </RESOURCE></VOTABLE>"#;
        let votable = VoTable::parse_str(doc).unwrap();
        match screen_status(&votable).unwrap_err() {
            Error::Dal(DalError::Query { message }) => {
                assert_eq!(message, "service reported a query error")
            }
            other => panic!("expected a query error, got {:?}", other),
        }
    }

    #[test]
    fn test_ok_status_passes_screening() {
        let doc = r#"<VOTABLE><RESOURCE>
            <INFO name="QUERY_STATUS" value="OK"/>
        </RESOURCE></VOTABLE>"#;
        let votable = VoTable::parse_str(doc).unwrap();
        assert!(screen_status(&votable).is_ok());
    }
}
