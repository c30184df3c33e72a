//! # pharma-papers
//!
//! Find PubMed papers with at least one author affiliated with a pharmaceutical or
//! biotech company.
//!
//! ## Features
//!
//! - **Affiliation classification**: keyword heuristics separating industry from academic
//!   affiliations, with company name and email extraction
//! - **Paper annotation**: per-paper company lists, non-academic authors and a corresponding
//!   author email
//! - **PubMed access**: ESearch/EFetch with NCBI rate limiting and retry of transient errors
//! - **Export**: CSV files and a console listing
//!
//! ## Quick Start
//!
//! ```no_run
//! use pharma_papers::{Annotator, PaperFinder, PubMedClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let finder = PaperFinder::new(PubMedClient::new(), Annotator::default());
//!     let papers = finder.find("mRNA vaccine", 100).await?;
//!
//!     pharma_papers::export::save_to_csv(&papers, "results.csv")?;
//!     Ok(())
//! }
//! ```
//!
//! ### Classifying a single affiliation
//!
//! ```
//! use pharma_papers::classify;
//!
//! let result = classify("Dept of Oncology, University Hospital, in collaboration with Acme Pharmaceuticals Inc");
//! assert!(!result.is_industry);
//! ```

pub mod annotate;
pub mod classifier;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod pubmed;
pub mod rate_limit;
pub mod retry;

// Re-export main types for convenience
pub use annotate::{Annotator, annotate};
pub use classifier::{AffiliationClassifier, Classification, classify, extract_email};
pub use config::{ClientConfig, IndicatorConfig};
pub use error::{PubMedError, Result};
pub use models::{AnnotatedPaper, PaperAuthor, PaperRecord};
pub use pipeline::{PaperFinder, search_papers};
pub use pubmed::PubMedClient;
pub use rate_limit::RateLimiter;
pub use retry::{RetryConfig, RetryableError};
