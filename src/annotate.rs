//! Paper filtering and annotation
//!
//! A paper qualifies when at least one author affiliation entry classifies as industry.
//! Qualifying papers carry the distinct company names and a corresponding email.

use std::sync::OnceLock;

use tracing::debug;

use crate::classifier::{AffiliationClassifier, Classification};
use crate::models::{AnnotatedPaper, PaperRecord};

/// Applies an [`AffiliationClassifier`] to whole papers
#[derive(Debug, Clone, Default)]
pub struct Annotator {
    classifier: AffiliationClassifier,
}

impl Annotator {
    pub fn new(classifier: AffiliationClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &AffiliationClassifier {
        &self.classifier
    }

    /// Annotate one paper, or `None` when no author is industry-affiliated
    ///
    /// Each affiliation entry of each author is classified on its own. An author is listed
    /// as non-academic when any entry is industry, or is non-empty and not academic.
    pub fn annotate(&self, paper: &PaperRecord) -> Option<AnnotatedPaper> {
        let mut companies: Vec<String> = Vec::new();
        let mut non_academic_authors: Vec<String> = Vec::new();
        let mut corresponding_email: Option<String> = None;

        for author in &paper.authors {
            let mut non_academic = false;

            for affiliation in &author.affiliations {
                let Classification {
                    is_industry,
                    organization_name,
                    email,
                } = self.classifier.classify(affiliation);

                if corresponding_email.is_none() {
                    corresponding_email = email;
                }

                if is_industry {
                    non_academic = true;
                    if let Some(name) = organization_name {
                        if !companies.contains(&name) {
                            companies.push(name);
                        }
                    }
                } else if !affiliation.trim().is_empty()
                    && !self.classifier.is_academic(affiliation)
                {
                    non_academic = true;
                }
            }

            if non_academic
                && !author.name.is_empty()
                && !non_academic_authors.contains(&author.name)
            {
                non_academic_authors.push(author.name.clone());
            }
        }

        if companies.is_empty() {
            debug!(pmid = %paper.id, "No industry affiliations, skipping paper");
            return None;
        }

        Some(AnnotatedPaper {
            id: paper.id.clone(),
            title: paper.title.clone(),
            publication_date: paper.publication_date.clone(),
            non_academic_authors,
            companies,
            corresponding_email,
        })
    }

    /// Annotate a batch, keeping the input order of the papers that qualify
    pub fn annotate_all(&self, papers: &[PaperRecord]) -> Vec<AnnotatedPaper> {
        papers.iter().filter_map(|paper| self.annotate(paper)).collect()
    }
}

/// Annotate with the built-in indicator lists
pub fn annotate(paper: &PaperRecord) -> Option<AnnotatedPaper> {
    static DEFAULT_ANNOTATOR: OnceLock<Annotator> = OnceLock::new();
    DEFAULT_ANNOTATOR
        .get_or_init(Annotator::default)
        .annotate(paper)
}
