//! Query to annotated papers
//!
//! Runs ESearch for the query, fetches the hits in EFetch batches and keeps the papers
//! that have at least one industry-affiliated author. Output follows the ESearch order.

use indicatif::ProgressBar;
use tracing::{info, instrument};

use crate::annotate::Annotator;
use crate::error::Result;
use crate::models::AnnotatedPaper;
use crate::pubmed::{MAX_FETCH_BATCH, PubMedClient};

/// Searches PubMed and filters the results down to industry-affiliated papers
#[derive(Clone)]
pub struct PaperFinder {
    client: PubMedClient,
    annotator: Annotator,
    progress: ProgressBar,
}

impl PaperFinder {
    pub fn new(client: PubMedClient, annotator: Annotator) -> Self {
        Self {
            client,
            annotator,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report fetched papers on `progress`; its length is set once the search returns
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Find up to `max_results` search hits and return those with a company affiliation
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pharma_papers::{Annotator, PaperFinder, PubMedClient};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let finder = PaperFinder::new(PubMedClient::new(), Annotator::default());
    ///     let papers = finder.find("CAR-T cell therapy", 50).await?;
    ///     for paper in &papers {
    ///         println!("{}: {}", paper.id, paper.companies.join("; "));
    ///     }
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self), fields(query = %query, max_results = max_results))]
    pub async fn find(&self, query: &str, max_results: usize) -> Result<Vec<AnnotatedPaper>> {
        let pmids = self.client.search_articles(query, max_results).await?;
        if pmids.is_empty() {
            info!("Search returned no papers");
            return Ok(Vec::new());
        }

        self.progress.set_length(pmids.len() as u64);
        self.progress.set_message("Fetching papers");

        let mut fetched = 0;
        let mut annotated = Vec::new();
        for batch in pmids.chunks(MAX_FETCH_BATCH) {
            let batch_refs: Vec<&str> = batch.iter().map(String::as_str).collect();
            let records = self.client.fetch_papers(&batch_refs).await?;

            fetched += records.len();
            annotated.extend(self.annotator.annotate_all(&records));
            self.progress.inc(batch.len() as u64);
        }

        self.progress.finish_and_clear();
        info!(
            searched = pmids.len(),
            fetched,
            matched = annotated.len(),
            "Paper search finished"
        );

        Ok(annotated)
    }
}

/// Run a search with the built-in indicator lists
pub async fn search_papers(
    client: &PubMedClient,
    query: &str,
    max_results: usize,
) -> Result<Vec<AnnotatedPaper>> {
    PaperFinder::new(client.clone(), Annotator::default())
        .find(query, max_results)
        .await
}
