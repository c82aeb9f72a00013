//! Registry search service and query builder

use crate::dal::connection::{ensure_trailing_slash, DalConnection};
use crate::dal::query::DalQuery;
use crate::error::{DalError, Result};
use crate::registry::resource::RegistryResults;
use async_trait::async_trait;
use url::form_urlencoded::byte_serialize;
use url::Url;

/// The public VAO registry at STScI
pub const STSCI_REGISTRY_BASEURL: &str = "http://vao.stsci.edu/directory/NVORegInt.asmx/";

/// Search service name understood by the registry endpoint
const SERVICE_NAME: &str = "VOTCapBandPredOpt";

/// Result-set style argument the endpoint requires
const RESULTSET_TYPE_ARG: &str = "VOTStyleOption=2";

/// Registry record fields that keyword searches match against
const KEYWORD_COLUMNS: [&str; 8] = [
    "Title",
    "ShortName",
    "Identifier",
    "[content/subject]",
    "[curation/publisher]",
    "[content/description]",
    "[@xsi_type]",
    "[capability/@xsi_type]",
];

/// The service capability a registry search can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    ConeSearch,
    SimpleImageAccess,
    SimpleSpectralAccess,
    SimpleLineAccess,
    TableAccess,
}

impl ServiceType {
    /// Parse a service type from a user-facing name or one of its synonyms.
    ///
    /// Only the leading character is case-folded, so `TableAccess` and
    /// `tableAccess` both work while `TAP` does not. Accepted names:
    /// `table`/`catalog`/`scs`/`conesearch` for cone search,
    /// `image`/`sia`/`simpleImageAccess` for image access,
    /// `spectra`/`spectrum`/`ssa`/`ssap`/`simpleSpectralAccess` for
    /// spectral access, `line`/`sla`/`slap`/`simpleLineAccess` for line
    /// access, and `tap`/`database`/`tableAccess` for table access.
    pub fn from_name(name: &str) -> Result<Self> {
        let name = lower_first(name);
        match name.as_str() {
            "table" | "catalog" | "scs" | "conesearch" => Ok(ServiceType::ConeSearch),
            "image" | "sia" | "simpleImageAccess" => Ok(ServiceType::SimpleImageAccess),
            "spectra" | "spectrum" | "ssa" | "ssap" | "simpleSpectralAccess" => {
                Ok(ServiceType::SimpleSpectralAccess)
            }
            "line" | "sla" | "slap" | "simpleLineAccess" => Ok(ServiceType::SimpleLineAccess),
            "tap" | "database" | "tableAccess" => Ok(ServiceType::TableAccess),
            _ => {
                Err(DalError::protocol(format!("unrecognized servicetype value: {}", name)).into())
            }
        }
    }

    /// The capability constraint the registry endpoint expects
    pub fn as_capability(&self) -> &'static str {
        match self {
            ServiceType::ConeSearch => "ConeSearch",
            ServiceType::SimpleImageAccess => "SimpleImageAccess",
            ServiceType::SimpleSpectralAccess => "SimpleSpectralAccess",
            ServiceType::SimpleLineAccess => "SimpleLineAccess",
            ServiceType::TableAccess => "TableAccess",
        }
    }
}

/// A waveband a registry search can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveband {
    Radio,
    Millimeter,
    Infrared,
    Optical,
    Uv,
    Euv,
    XRay,
    GammaRay,
}

impl Waveband {
    /// Parse a waveband from a user-facing name.
    ///
    /// The abbreviations `ir`/`IR`, `uv` and `euv` expand to their full
    /// names first; after that only the first letter is capitalised, so
    /// `radio` and `Radio` both work while `RADIO` and `xray` do not.
    pub fn from_name(name: &str) -> Result<Self> {
        let expanded = match name {
            "ir" | "IR" => "Infrared",
            "uv" => "UV",
            "euv" => "EUV",
            other => other,
        };
        match upper_first(expanded).as_str() {
            "Radio" => Ok(Waveband::Radio),
            "Millimeter" => Ok(Waveband::Millimeter),
            "Infrared" => Ok(Waveband::Infrared),
            "Optical" => Ok(Waveband::Optical),
            "UV" => Ok(Waveband::Uv),
            "EUV" => Ok(Waveband::Euv),
            "X-ray" => Ok(Waveband::XRay),
            "Gamma-ray" => Ok(Waveband::GammaRay),
            _ => Err(DalError::protocol(format!("unrecognized waveband: {}", name)).into()),
        }
    }

    /// The waveband name the registry endpoint expects
    pub fn as_str(&self) -> &'static str {
        match self {
            Waveband::Radio => "Radio",
            Waveband::Millimeter => "Millimeter",
            Waveband::Infrared => "Infrared",
            Waveband::Optical => "Optical",
            Waveband::Uv => "UV",
            Waveband::Euv => "EUV",
            Waveband::XRay => "X-ray",
            Waveband::GammaRay => "Gamma-ray",
        }
    }
}

// Only the leading character is folded; the rest of the name must match.
fn lower_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_ascii_lowercase(), chars.as_str()),
        None => String::new(),
    }
}

fn upper_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

/// A handle on a VOTable-based resource registry
#[derive(Debug, Clone)]
pub struct RegistryService {
    base_url: String,
    connection: DalConnection,
}

impl RegistryService {
    /// Connect to the public STScI registry
    pub fn new(connection: DalConnection) -> Self {
        Self::with_base_url(STSCI_REGISTRY_BASEURL, connection)
    }

    /// Connect to a registry at the given base URL
    pub fn with_base_url<S: Into<String>>(base_url: S, connection: DalConnection) -> Self {
        Self {
            base_url: ensure_trailing_slash(&base_url.into()),
            connection,
        }
    }

    /// The registry base URL, always with a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create an empty query that can be refined before submission
    pub fn create_query(&self) -> RegistryQuery {
        RegistryQuery {
            base_url: self.base_url.clone(),
            connection: self.connection.clone(),
            keywords: Vec::new(),
            predicates: Vec::new(),
            service_type: None,
            waveband: None,
            or_keywords: true,
        }
    }

    /// Search the registry for records matching any of the given keywords
    pub async fn search(&self, keywords: &[&str]) -> Result<RegistryResults> {
        let mut query = self.create_query();
        query.add_keywords(keywords);
        query.execute().await
    }

    /// Look up a single resource by its IVOA identifier.
    ///
    /// The matching record is the first one in the returned set.
    pub async fn resolve(&self, ivoid: &str) -> Result<RegistryResults> {
        let mut query = self.create_query();
        query.add_predicate(format!("Identifier='{}'", ivoid.replace('\'', "''")));
        let results = query.execute().await?;
        if results.is_empty() {
            return Err(DalError::Query {
                message: format!("no resource matches identifier {}", ivoid),
            }
            .into());
        }
        Ok(results)
    }
}

/// A registry query built up over successive calls and then executed.
///
/// Keyword constraints, the service type, the waveband and any raw SQL
/// predicates are AND-ed together; the keywords themselves are OR-ed
/// unless [`or_keywords`](RegistryQuery::or_keywords) says otherwise.
#[derive(Debug, Clone)]
pub struct RegistryQuery {
    base_url: String,
    connection: DalConnection,
    keywords: Vec<String>,
    predicates: Vec<String>,
    service_type: Option<ServiceType>,
    waveband: Option<Waveband>,
    or_keywords: bool,
}

impl RegistryQuery {
    /// The current keyword constraints
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Add a keyword phrase; multi-word phrases must match verbatim
    pub fn add_keyword<S: Into<String>>(&mut self, keyword: S) -> &mut Self {
        self.keywords.push(keyword.into());
        self
    }

    /// Add several keyword phrases at once
    pub fn add_keywords<S: AsRef<str>>(&mut self, keywords: &[S]) -> &mut Self {
        for kw in keywords {
            self.keywords.push(kw.as_ref().to_string());
        }
        self
    }

    /// Remove a previously added keyword
    pub fn remove_keyword(&mut self, keyword: &str) -> &mut Self {
        self.keywords.retain(|kw| kw != keyword);
        self
    }

    /// Drop all keyword constraints
    pub fn clear_keywords(&mut self) -> &mut Self {
        self.keywords.clear();
        self
    }

    /// Choose whether keywords are OR-ed (any may match, the default) or
    /// AND-ed (all must match)
    pub fn set_or_keywords(&mut self, ored: bool) -> &mut Self {
        self.or_keywords = ored;
        self
    }

    /// Whether keywords will be OR-ed together
    pub fn or_keywords(&self) -> bool {
        self.or_keywords
    }

    /// Restrict results to services of the given type
    pub fn set_service_type(&mut self, service_type: ServiceType) -> &mut Self {
        self.service_type = Some(service_type);
        self
    }

    /// The current service type restriction
    pub fn service_type(&self) -> Option<ServiceType> {
        self.service_type
    }

    /// Restrict results to resources with data in the given waveband
    pub fn set_waveband(&mut self, waveband: Waveband) -> &mut Self {
        self.waveband = Some(waveband);
        self
    }

    /// The current waveband restriction
    pub fn waveband(&self) -> Option<Waveband> {
        self.waveband
    }

    /// The current raw predicate constraints
    pub fn predicates(&self) -> &[String] {
        &self.predicates
    }

    /// Add a raw SQL predicate in the form the registry endpoint supports.
    ///
    /// Predicates are AND-ed with every other constraint on the query.
    pub fn add_predicate<S: Into<String>>(&mut self, pred: S) -> &mut Self {
        self.predicates.push(pred.into());
        self
    }

    /// Remove a previously added predicate
    pub fn remove_predicate(&mut self, pred: &str) -> &mut Self {
        self.predicates.retain(|p| p != pred);
        self
    }

    /// Drop all raw predicates
    pub fn clear_predicates(&mut self) -> &mut Self {
        self.predicates.clear();
        self
    }

    /// Submit the query
    pub async fn execute(&self) -> Result<RegistryResults> {
        let results = self.execute_raw().await?;
        Ok(RegistryResults::new(results))
    }

    /// Render the keyword constraints as a single SQL predicate
    pub fn keywords_to_predicate(&self) -> String {
        let conjunction = if self.or_keywords {
            ") OR ("
        } else {
            ") AND ("
        };
        let per_keyword: Vec<String> = self
            .keywords
            .iter()
            .map(|kw| {
                KEYWORD_COLUMNS
                    .iter()
                    .map(|col| format!("{} LIKE '%{}%'", col, kw))
                    .collect::<Vec<_>>()
                    .join(" OR ")
            })
            .collect();
        format!("({})", per_keyword.join(conjunction))
    }
}

#[async_trait]
impl DalQuery for RegistryQuery {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn connection(&self) -> &DalConnection {
        &self.connection
    }

    fn query_url(&self) -> Result<Url> {
        let mut url = format!("{}{}?{}", self.base_url, SERVICE_NAME, RESULTSET_TYPE_ARG);

        if let Some(band) = self.waveband {
            url.push_str("&waveband=");
            url.push_str(band.as_str());
        }

        url.push_str("&capability=");
        if let Some(service_type) = self.service_type {
            url.push_str(service_type.as_capability());
        }

        let mut preds = self.predicates.clone();
        if !self.keywords.is_empty() {
            preds.push(self.keywords_to_predicate());
        }
        url.push_str("&predicate=");
        if preds.is_empty() {
            url.push('1');
        } else {
            let joined = preds
                .iter()
                .map(|p| format!("({})", p))
                .collect::<Vec<_>>()
                .join(" AND ");
            url.extend(byte_serialize(joined.as_bytes()));
        }

        Ok(Url::parse(&url)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> RegistryService {
        RegistryService::new(DalConnection::new().unwrap())
    }

    fn predicate_param(query: &RegistryQuery) -> String {
        let url = query.query_url().unwrap();
        url.query_pairs()
            .find(|(name, _)| name == "predicate")
            .map(|(_, value)| value.into_owned())
            .unwrap()
    }

    #[test]
    fn test_default_query_url() {
        let q = service().create_query();
        assert_eq!(
            q.query_url().unwrap().as_str(),
            "http://vao.stsci.edu/directory/NVORegInt.asmx/VOTCapBandPredOpt\
             ?VOTStyleOption=2&capability=&predicate=1"
        );
    }

    #[test]
    fn test_service_type_constraint() {
        let mut q = service().create_query();
        q.set_service_type(ServiceType::SimpleImageAccess);
        assert!(q
            .query_url()
            .unwrap()
            .as_str()
            .contains("&capability=SimpleImageAccess&"));
    }

    #[test]
    fn test_waveband_constraint() {
        let mut q = service().create_query();
        q.set_waveband(Waveband::Infrared);
        assert!(q
            .query_url()
            .unwrap()
            .as_str()
            .contains("VOTStyleOption=2&waveband=Infrared&capability="));
    }

    #[test]
    fn test_single_keyword_predicate() {
        let mut q = service().create_query();
        q.add_keyword("quasar");
        let pred = q.keywords_to_predicate();
        assert!(pred.starts_with("(Title LIKE '%quasar%' OR ShortName LIKE '%quasar%'"));
        assert!(pred.ends_with("[capability/@xsi_type] LIKE '%quasar%')"));
        assert_eq!(predicate_param(&q), format!("({})", pred));
    }

    #[test]
    fn test_keywords_or_vs_and() {
        let mut q = service().create_query();
        q.add_keywords(&["quasar", "seyfert"]);
        assert!(q.keywords_to_predicate().contains(") OR ("));
        q.set_or_keywords(false);
        assert!(q.keywords_to_predicate().contains(") AND ("));
    }

    #[test]
    fn test_predicates_are_anded() {
        let mut q = service().create_query();
        q.add_predicate("Identifier='ivo://x/y'");
        q.add_keyword("survey");
        let pred = predicate_param(&q);
        assert!(pred.starts_with("(Identifier='ivo://x/y') AND ("));
    }

    #[test]
    fn test_keyword_editing() {
        let mut q = service().create_query();
        q.add_keyword("a").add_keyword("b");
        q.remove_keyword("a");
        assert_eq!(q.keywords(), &["b".to_string()]);
        q.clear_keywords();
        assert!(q.keywords().is_empty());
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let svc = RegistryService::with_base_url(
            "http://example.org/registry",
            DalConnection::new().unwrap(),
        );
        assert_eq!(svc.base_url(), "http://example.org/registry/");
    }

    #[test]
    fn test_service_type_from_name() {
        assert_eq!(
            ServiceType::from_name("catalog").unwrap(),
            ServiceType::ConeSearch
        );
        assert_eq!(
            ServiceType::from_name("table").unwrap(),
            ServiceType::ConeSearch
        );
        assert_eq!(
            ServiceType::from_name("sia").unwrap(),
            ServiceType::SimpleImageAccess
        );
        assert_eq!(
            ServiceType::from_name("ssap").unwrap(),
            ServiceType::SimpleSpectralAccess
        );
        assert_eq!(
            ServiceType::from_name("slap").unwrap(),
            ServiceType::SimpleLineAccess
        );
        assert_eq!(
            ServiceType::from_name("tap").unwrap(),
            ServiceType::TableAccess
        );
        assert!(ServiceType::from_name("bogus").is_err());
    }

    #[test]
    fn test_service_type_folds_only_the_leading_character() {
        assert_eq!(
            ServiceType::from_name("TableAccess").unwrap(),
            ServiceType::TableAccess
        );
        assert_eq!(
            ServiceType::from_name("SimpleImageAccess").unwrap(),
            ServiceType::SimpleImageAccess
        );
        let err = ServiceType::from_name("TAP").unwrap_err();
        assert!(err
            .to_string()
            .contains("unrecognized servicetype value: tAP"));
        assert!(ServiceType::from_name("SIA").is_err());
        assert!(ServiceType::from_name("CATALOG").is_err());
    }

    #[test]
    fn test_waveband_from_name() {
        assert_eq!(Waveband::from_name("radio").unwrap(), Waveband::Radio);
        assert_eq!(Waveband::from_name("ir").unwrap(), Waveband::Infrared);
        assert_eq!(Waveband::from_name("IR").unwrap(), Waveband::Infrared);
        assert_eq!(Waveband::from_name("uv").unwrap(), Waveband::Uv);
        assert_eq!(Waveband::from_name("euv").unwrap(), Waveband::Euv);
        assert_eq!(Waveband::from_name("x-ray").unwrap().as_str(), "X-ray");
        assert!(Waveband::from_name("sound").is_err());
    }

    #[test]
    fn test_waveband_folds_only_the_first_letter() {
        assert_eq!(Waveband::from_name("EUV").unwrap(), Waveband::Euv);
        assert_eq!(Waveband::from_name("Gamma-ray").unwrap(), Waveband::GammaRay);
        let err = Waveband::from_name("RADIO").unwrap_err();
        assert!(err.to_string().contains("unrecognized waveband: RADIO"));
        assert!(Waveband::from_name("xray").is_err());
        assert!(Waveband::from_name("X-Ray").is_err());
    }
}
