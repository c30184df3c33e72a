//! Tests against the real NCBI E-utilities API
//!
//! **IMPORTANT**: These tests are only run when:
//! 1. The `integration-tests` feature is enabled
//! 2. The `PUBMED_REAL_API_TESTS` environment variable is set
//!
//! To run these tests:
//! ```bash
//! PUBMED_REAL_API_TESTS=1 cargo test --features integration-tests --test pubmed_api_tests
//! ```

#[path = "common/mod.rs"]
mod common;

#[cfg(feature = "integration-tests")]
mod integration_tests {
    use tracing::info;
    use tracing_test::traced_test;

    use pharma_papers::{Annotator, PaperFinder};

    use crate::common::{create_test_client, should_run_real_api_tests};

    /// COVID-19 vaccine paper with Pfizer and BioNTech authors
    const PFIZER_VACCINE_PMID: &str = "33301246";

    #[tokio::test]
    #[traced_test]
    async fn test_search_articles_real() {
        if !should_run_real_api_tests() {
            info!("Skipping real API test - enable with PUBMED_REAL_API_TESTS=1");
            return;
        }

        let client = create_test_client();
        let pmids = client
            .search_articles("monoclonal antibody phase 3", 5)
            .await
            .expect("search should succeed");

        assert!(!pmids.is_empty());
        assert!(pmids.len() <= 5);
        assert!(pmids.iter().all(|id| id.chars().all(|c| c.is_ascii_digit())));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_fetch_known_industry_paper() {
        if !should_run_real_api_tests() {
            info!("Skipping real API test - enable with PUBMED_REAL_API_TESTS=1");
            return;
        }

        let client = create_test_client();
        let papers = client
            .fetch_papers(&[PFIZER_VACCINE_PMID])
            .await
            .expect("fetch should succeed");

        assert_eq!(papers.len(), 1);
        let paper = &papers[0];
        assert_eq!(paper.id, PFIZER_VACCINE_PMID);
        assert!(!paper.authors.is_empty());

        let annotated = Annotator::default().annotate(paper);
        info!(?annotated, "Annotated known paper");
        assert!(annotated.is_some());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_finder_real() {
        if !should_run_real_api_tests() {
            info!("Skipping real API test - enable with PUBMED_REAL_API_TESTS=1");
            return;
        }

        let finder = PaperFinder::new(create_test_client(), Annotator::default());
        let papers = finder
            .find("pharmacokinetics first-in-human", 20)
            .await
            .expect("finder should succeed");

        for paper in &papers {
            assert!(!paper.companies.is_empty());
        }
        info!(matched = papers.len(), "Real search finished");
    }
}
