use std::collections::HashMap;

use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{PubMedError, Result};
use crate::models::PaperRecord;
use crate::pubmed::parser::parse_papers_from_xml;
use crate::pubmed::responses::ESearchResult;
use crate::rate_limit::RateLimiter;
use crate::retry::with_retry;

/// Largest `retmax` ESearch honors for a single query
pub const MAX_RETRIEVABLE: usize = 9999;

/// PMIDs sent per EFetch request
pub const MAX_FETCH_BATCH: usize = 200;

/// Client for the PubMed E-utilities used by the paper search
#[derive(Clone)]
pub struct PubMedClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
    config: ClientConfig,
}

impl PubMedClient {
    /// Create a client with default configuration
    ///
    /// Uses the NCBI rate limit for callers without an API key (3 requests/second).
    ///
    /// # Example
    ///
    /// ```
    /// use pharma_papers::PubMedClient;
    ///
    /// let client = PubMedClient::new();
    /// ```
    pub fn new() -> Self {
        Self::with_config(ClientConfig::new())
    }

    /// Create a client with custom configuration
    ///
    /// # Example
    ///
    /// ```
    /// use pharma_papers::{ClientConfig, PubMedClient};
    ///
    /// let config = ClientConfig::new()
    ///     .with_api_key("your_api_key_here")
    ///     .with_email("researcher@example.com");
    ///
    /// let client = PubMedClient::with_config(config);
    /// ```
    pub fn with_config(config: ClientConfig) -> Self {
        let rate_limiter = config.create_rate_limiter();
        let base_url = config.effective_base_url().to_string();

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.effective_user_agent())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            rate_limiter,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Search PubMed and return matching PMIDs in relevance order
    ///
    /// A blank query returns no ids without contacting NCBI.
    ///
    /// # Errors
    ///
    /// * `PubMedError::SearchLimitExceeded` - If `limit` exceeds [`MAX_RETRIEVABLE`]
    /// * `PubMedError::ApiError` - If NCBI rejects the query
    /// * `PubMedError::RequestError` - If the HTTP request fails
    /// * `PubMedError::JsonError` - If the response is not ESearch JSON
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pharma_papers::PubMedClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = PubMedClient::new();
    ///     let pmids = client.search_articles("kinase inhibitor", 10).await?;
    ///     println!("Found {} articles", pmids.len());
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self), fields(query = %query, limit = limit))]
    pub async fn search_articles(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        if query.trim().is_empty() {
            debug!("Empty query provided, returning empty results");
            return Ok(Vec::new());
        }

        if limit > MAX_RETRIEVABLE {
            return Err(PubMedError::SearchLimitExceeded {
                requested: limit,
                maximum: MAX_RETRIEVABLE,
            });
        }

        if limit == 0 {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/esearch.fcgi?db=pubmed&term={}&retmax={}&retmode=json",
            self.base_url,
            urlencoding::encode(query),
            limit
        );

        debug!("Making ESearch API request");
        let response = self.make_request(&url).await?;
        let search_result: ESearchResult = response.json().await?;

        if let Some(message) = search_result.esearchresult.error {
            warn!(error = %message, "ESearch rejected the query");
            return Err(PubMedError::ApiError {
                status: 200,
                message,
            });
        }

        let total_matches = search_result.esearchresult.total_count();
        let pmids = search_result.esearchresult.idlist;
        info!(
            results_found = pmids.len(),
            total_matches = ?total_matches,
            "Search completed successfully"
        );

        Ok(pmids)
    }

    /// Fetch paper records for the given PMIDs
    ///
    /// Ids are sent in batches of [`MAX_FETCH_BATCH`]. Records come back in the order of
    /// `pmids`; ids NCBI returns nothing for are left out.
    ///
    /// # Errors
    ///
    /// * `PubMedError::InvalidPmid` - If any id is not a positive integer; checked before
    ///   any request is made
    /// * `PubMedError::XmlError` - If a response is not EFetch XML
    #[instrument(skip(self, pmids), fields(count = pmids.len()))]
    pub async fn fetch_papers(&self, pmids: &[&str]) -> Result<Vec<PaperRecord>> {
        let pmids: Vec<&str> = pmids.iter().map(|pmid| pmid.trim()).collect();

        if let Some(invalid) = pmids.iter().find(|pmid| !is_valid_pmid(pmid)) {
            warn!(pmid = %invalid, "Invalid PMID format provided");
            return Err(PubMedError::InvalidPmid {
                pmid: invalid.to_string(),
            });
        }

        let mut papers = Vec::with_capacity(pmids.len());
        for batch in pmids.chunks(MAX_FETCH_BATCH) {
            papers.extend(self.fetch_batch(batch).await?);
        }

        Ok(papers)
    }

    async fn fetch_batch(&self, pmids: &[&str]) -> Result<Vec<PaperRecord>> {
        let url = format!(
            "{}/efetch.fcgi?db=pubmed&id={}&retmode=xml&rettype=abstract",
            self.base_url,
            pmids.join(",")
        );

        debug!(batch_size = pmids.len(), "Making EFetch API request");
        let response = self.make_request(&url).await?;
        let xml_text = response.text().await?;

        let mut by_id: HashMap<String, PaperRecord> = parse_papers_from_xml(&xml_text)?
            .into_iter()
            .map(|paper| (paper.id.clone(), paper))
            .collect();

        // EFetch does not promise to answer in request order
        let papers: Vec<PaperRecord> = pmids.iter().filter_map(|pmid| by_id.remove(*pmid)).collect();

        if papers.len() < pmids.len() {
            debug!(
                requested = pmids.len(),
                returned = papers.len(),
                "Some PMIDs returned no article"
            );
        }

        Ok(papers)
    }

    /// Search, then fetch the records of every hit
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pharma_papers::PubMedClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = PubMedClient::new();
    ///     let papers = client.search_and_fetch("monoclonal antibody", 5).await?;
    ///     for paper in papers {
    ///         println!("{}: {}", paper.id, paper.title);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn search_and_fetch(&self, query: &str, limit: usize) -> Result<Vec<PaperRecord>> {
        let pmids = self.search_articles(query, limit).await?;
        let pmid_refs: Vec<&str> = pmids.iter().map(String::as_str).collect();
        self.fetch_papers(&pmid_refs).await
    }

    /// Send a GET with the NCBI identification params, rate limited and retried
    async fn make_request(&self, url: &str) -> Result<Response> {
        let mut final_url = url.to_string();
        for (key, value) in self.config.build_api_params() {
            final_url.push('&');
            final_url.push_str(&key);
            final_url.push('=');
            final_url.push_str(&urlencoding::encode(&value));
        }

        let client = &self.client;
        let rate_limiter = &self.rate_limiter;
        let request_url = final_url.as_str();

        let response = with_retry(
            move || async move {
                rate_limiter.acquire().await;
                let response = client.get(request_url).send().await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    return Err(PubMedError::RateLimitExceeded);
                }
                if status.is_server_error() {
                    return Err(PubMedError::ApiError {
                        status: status.as_u16(),
                        message: status.canonical_reason().unwrap_or("Unknown error").to_string(),
                    });
                }

                Ok::<_, PubMedError>(response)
            },
            &self.config.retry_config,
            "NCBI API request",
        )
        .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "API request failed");
            return Err(PubMedError::ApiError {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown error").to_string(),
            });
        }

        Ok(response)
    }
}

impl Default for PubMedClient {
    fn default() -> Self {
        Self::new()
    }
}

fn is_valid_pmid(pmid: &str) -> bool {
    pmid.parse::<u32>().is_ok_and(|value| value > 0)
}
