//! Search pipeline tests against mocked NCBI E-utilities
//!
//! These tests verify ESearch/EFetch handling, retry behavior and the end-to-end filter
//! without making real API calls.

#[path = "common/mod.rs"]
mod common;

use common::{article, create_mock_client, efetch_xml, esearch_json};
use pharma_papers::{Annotator, PaperFinder, PubMedError, search_papers};
use tracing_test::traced_test;
use wiremock::matchers::{method, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDUSTRY: &str = "Research Division, Acme Biotech Inc, Boston, MA, USA. jdoe@acmebiotech.com";
const ACADEMIC: &str = "Department of Biology, Harvard University, Cambridge, MA, USA";
const SECOND_COMPANY: &str = "Beta Therapeutics, San Diego, CA";

async fn mount_esearch(server: &MockServer, ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path_regex(r"/esearch\.fcgi.*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(esearch_json(ids)))
        .mount(server)
        .await;
}

async fn mount_efetch(server: &MockServer, xml: String) {
    Mock::given(method("GET"))
        .and(path_regex(r"/efetch\.fcgi.*"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(xml)
                .insert_header("content-type", "text/xml"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
#[traced_test]
async fn test_end_to_end_keeps_search_order() {
    let server = MockServer::start().await;
    mount_esearch(&server, &["300", "100", "200", "400"]).await;

    // EFetch answers in a different order than requested
    let xml = efetch_xml(&[
        article("100", "Academic only", &[("Ann Lee", ACADEMIC)]),
        article("200", "Second company", &[("Bob Ray", SECOND_COMPANY), ("Cat Yu", ACADEMIC)]),
        article("300", "First company", &[("Jane Doe", INDUSTRY)]),
        article("400", "No affiliations", &[("Dan Fox", "")]),
    ]);
    mount_efetch(&server, xml).await;

    let client = create_mock_client(&server.uri());
    let papers = search_papers(&client, "kinase inhibitor", 10).await.unwrap();

    let ids: Vec<&str> = papers.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["300", "200"]);

    assert_eq!(papers[0].title, "First company");
    assert_eq!(papers[0].publication_date, "2024-Jan");
    assert_eq!(papers[0].companies, vec!["Acme Biotech Inc"]);
    assert_eq!(papers[0].non_academic_authors, vec!["Jane Doe"]);
    assert_eq!(
        papers[0].corresponding_email.as_deref(),
        Some("jdoe@acmebiotech.com")
    );

    assert_eq!(papers[1].companies, vec!["Beta Therapeutics"]);
    assert_eq!(papers[1].non_academic_authors, vec!["Bob Ray"]);
    assert_eq!(papers[1].corresponding_email, None);
}

#[tokio::test]
#[traced_test]
async fn test_fetch_papers_restores_request_order() {
    let server = MockServer::start().await;
    let xml = efetch_xml(&[
        article("1", "One", &[]),
        article("2", "Two", &[]),
        article("3", "Three", &[]),
    ]);
    mount_efetch(&server, xml).await;

    let client = create_mock_client(&server.uri());
    let papers = client.fetch_papers(&["3", "1", "5", "2"]).await.unwrap();

    let ids: Vec<&str> = papers.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "1", "2"]);
}

#[tokio::test]
#[traced_test]
async fn test_no_search_results_skips_efetch() {
    let server = MockServer::start().await;
    mount_esearch(&server, &[]).await;

    Mock::given(method("GET"))
        .and(path_regex(r"/efetch\.fcgi.*"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = create_mock_client(&server.uri());
    let papers = search_papers(&client, "no such topic", 10).await.unwrap();
    assert!(papers.is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_large_result_is_fetched_in_batches() {
    let server = MockServer::start().await;

    let ids: Vec<String> = (1..=250).map(|i| i.to_string()).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    mount_esearch(&server, &id_refs).await;

    Mock::given(method("GET"))
        .and(path_regex(r"/efetch\.fcgi.*"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<PubmedArticleSet></PubmedArticleSet>"),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = create_mock_client(&server.uri());
    let finder = PaperFinder::new(client, Annotator::default());
    let papers = finder.find("cancer", 250).await.unwrap();
    assert!(papers.is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_server_error_is_retried() {
    let server = MockServer::start().await;
    mount_esearch(&server, &["300"]).await;

    Mock::given(method("GET"))
        .and(path_regex(r"/efetch\.fcgi.*"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_efetch(&server, efetch_xml(&[article("300", "First company", &[("Jane Doe", INDUSTRY)])])).await;

    let client = create_mock_client(&server.uri());
    let papers = search_papers(&client, "kinase", 5).await.unwrap();

    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0].id, "300");
}

#[tokio::test]
#[traced_test]
async fn test_persistent_server_error_gives_up() {
    let server = MockServer::start().await;

    // One attempt plus two retries
    Mock::given(method("GET"))
        .and(path_regex(r"/esearch\.fcgi.*"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = create_mock_client(&server.uri());
    let result = client.search_articles("kinase", 5).await;

    assert!(matches!(result, Err(PubMedError::ApiError { status: 500, .. })));
}

#[tokio::test]
#[traced_test]
async fn test_too_many_requests_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/esearch\.fcgi.*"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_esearch(&server, &["300"]).await;

    let client = create_mock_client(&server.uri());
    let pmids = client.search_articles("kinase", 5).await.unwrap();

    assert_eq!(pmids, vec!["300"]);
}

#[tokio::test]
#[traced_test]
async fn test_persistent_rate_limit_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/esearch\.fcgi.*"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let client = create_mock_client(&server.uri());
    let result = client.search_articles("kinase", 5).await;

    assert!(matches!(result, Err(PubMedError::RateLimitExceeded)));
}

#[tokio::test]
#[traced_test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/esearch\.fcgi.*"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_mock_client(&server.uri());
    let result = client.search_articles("kinase", 5).await;

    assert!(matches!(result, Err(PubMedError::ApiError { status: 400, .. })));
}

#[tokio::test]
#[traced_test]
async fn test_esearch_error_field() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/esearch\.fcgi.*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "esearchresult": {"ERROR": "Invalid query syntax"}
        })))
        .mount(&server)
        .await;

    let client = create_mock_client(&server.uri());
    let result = client.search_articles("((unbalanced", 5).await;

    match result {
        Err(PubMedError::ApiError { message, .. }) => assert_eq!(message, "Invalid query syntax"),
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
#[traced_test]
async fn test_malformed_efetch_response() {
    let server = MockServer::start().await;
    mount_efetch(&server, "<PubmedArticleSet><PubmedArticle>".to_string()).await;

    let client = create_mock_client(&server.uri());
    let result = client.fetch_papers(&["12345678"]).await;

    assert!(matches!(result, Err(PubMedError::XmlError(_))));
}

#[tokio::test]
#[traced_test]
async fn test_identification_params_are_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/esearch\.fcgi.*"))
        .and(query_param("db", "pubmed"))
        .and(query_param("term", "car-t therapy"))
        .and(query_param("retmax", "7"))
        .and(query_param("tool", "pharma-papers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(esearch_json(&["1"])))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_mock_client(&server.uri());
    let ids = client.search_articles("car-t therapy", 7).await.unwrap();
    assert_eq!(ids, vec!["1"]);
}
