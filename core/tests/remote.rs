//! Live tests against public VO services.
//!
//! Everything here talks to real endpoints, so the tests are ignored by
//! default; run `cargo test -- --ignored` on a network that can reach
//! them. Failures may reflect service outages rather than bugs.

use voquest_core::dal::DalConnection;
use voquest_core::registry::{RegistryService, ServiceType, VoService};

fn registry() -> RegistryService {
    RegistryService::new(DalConnection::new().unwrap())
}

#[tokio::test]
#[ignore = "requires remote VO services"]
async fn keyword_search_finds_resources() {
    let results = registry().search(&["quasar"]).await.unwrap();
    assert!(!results.is_empty());
    let first = results.resource(0).unwrap();
    assert!(first.ivoid().is_some());
}

#[tokio::test]
#[ignore = "requires remote VO services"]
async fn one_shot_search_matches_service_search() {
    let results = voquest_core::registry::search(&["quasar"], None, None, None)
        .await
        .unwrap();
    assert!(!results.is_empty());
}

#[tokio::test]
#[ignore = "requires remote VO services"]
async fn capability_restriction_yields_cone_services() {
    let reg = registry();
    let mut query = reg.create_query();
    query
        .add_keyword("galaxy")
        .set_service_type(ServiceType::ConeSearch);
    let results = query.execute().await.unwrap();
    assert!(!results.is_empty());

    let connection = DalConnection::new().unwrap();
    let with_url = results
        .iter()
        .find(|r| r.access_url().is_some_and(|u| !u.trim().is_empty()))
        .unwrap();
    let service = with_url.to_service(&connection).unwrap();
    assert!(matches!(service, VoService::Cone(_)));
}

#[tokio::test]
#[ignore = "requires remote VO services"]
async fn resolve_round_trips_an_identifier() {
    let reg = registry();
    let results = reg.search(&["sdss"]).await.unwrap();
    let ivoid = results
        .iter()
        .find_map(|r| r.ivoid().map(str::to_string))
        .unwrap();

    let resolved = reg.resolve(&ivoid).await.unwrap();
    let record = resolved.resource(0).unwrap();
    assert_eq!(record.ivoid(), Some(ivoid.as_str()));
}

#[tokio::test]
#[ignore = "requires remote VO services"]
async fn cone_search_returns_positions() {
    use voquest_core::dal::protocols::ScsService;

    // HEASARC's copy of the Messier catalog, a small stable table
    let connection = DalConnection::new().unwrap();
    let service = ScsService::new(
        "https://heasarc.gsfc.nasa.gov/cgi-bin/vo/cone/coneGet.pl?table=messier&",
        connection,
    );
    let results = service.search(83.633, 22.014, 1.0).await.unwrap();
    assert!(!results.is_empty());
    let m1 = results.record(0).unwrap();
    assert!(m1.ra().is_some());
    assert!(m1.dec().is_some());
}
