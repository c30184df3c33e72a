//! Shared helpers for the integration tests

#![allow(dead_code)]

use pharma_papers::{ClientConfig, PubMedClient, RetryConfig};
use std::time::Duration;

/// One `PubmedArticle` element; authors are `(name, affiliation)` pairs
pub fn article(pmid: &str, title: &str, authors: &[(&str, &str)]) -> String {
    let mut xml = format!(
        "<PubmedArticle><MedlineCitation Status=\"MEDLINE\" Owner=\"NLM\"><PMID Version=\"1\">{pmid}</PMID><Article PubModel=\"Print\">\
         <Journal><JournalIssue CitedMedium=\"Internet\"><PubDate><Year>2024</Year><Month>Jan</Month></PubDate></JournalIssue></Journal>\
         <ArticleTitle>{title}</ArticleTitle><AuthorList CompleteYN=\"Y\">"
    );

    for (name, affiliation) in authors {
        let (fore, last) = name.split_once(' ').unwrap_or(("", *name));
        xml.push_str(&format!(
            "<Author ValidYN=\"Y\"><LastName>{last}</LastName><ForeName>{fore}</ForeName>"
        ));
        if !affiliation.is_empty() {
            xml.push_str(&format!(
                "<AffiliationInfo><Affiliation>{affiliation}</Affiliation></AffiliationInfo>"
            ));
        }
        xml.push_str("</Author>");
    }

    xml.push_str("</AuthorList></Article></MedlineCitation></PubmedArticle>\n");
    xml
}

/// Wrap articles in an EFetch `PubmedArticleSet` document
pub fn efetch_xml(articles: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" ?>\n<!DOCTYPE PubmedArticleSet PUBLIC \"-//NLM//DTD PubMedArticle, 1st January 2024//EN\" \"https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd\">\n<PubmedArticleSet>\n{}</PubmedArticleSet>\n",
        articles.concat()
    )
}

/// ESearch JSON body listing `ids`
pub fn esearch_json(ids: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "header": {"type": "esearch", "version": "0.3"},
        "esearchresult": {
            "count": ids.len().to_string(),
            "retmax": ids.len().to_string(),
            "retstart": "0",
            "idlist": ids,
        }
    })
}

/// Client pointed at a mock server, with fast retries
pub fn create_mock_client(base_url: &str) -> PubMedClient {
    let config = ClientConfig::new()
        .with_base_url(base_url)
        .with_rate_limit(100.0)
        .with_retry_config(
            RetryConfig::new()
                .with_max_retries(2)
                .with_initial_delay(Duration::from_millis(10))
                .without_jitter(),
        );

    PubMedClient::with_config(config)
}

/// Requires both the integration-tests feature and the PUBMED_REAL_API_TESTS env var
pub fn should_run_real_api_tests() -> bool {
    #[cfg(not(feature = "integration-tests"))]
    {
        false
    }

    #[cfg(feature = "integration-tests")]
    {
        std::env::var("PUBMED_REAL_API_TESTS").is_ok()
    }
}

/// Client for the real NCBI API with conservative rate limits
pub fn create_test_client() -> PubMedClient {
    let mut config = ClientConfig::new()
        .with_email("test@example.com")
        .with_tool("pharma-papers-integration-tests")
        .with_rate_limit(2.0);

    if let Ok(api_key) = std::env::var("NCBI_API_KEY") {
        config = config.with_api_key(&api_key).with_rate_limit(8.0);
    }

    PubMedClient::with_config(config)
}
