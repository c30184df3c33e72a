use serde::{Deserialize, Serialize};

use crate::error::{PubMedError, Result};

/// One author of a paper with the affiliation entries PubMed lists for them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperAuthor {
    /// Display name, e.g. "Jane Doe"
    pub name: String,
    /// Free-text affiliations, one per `<Affiliation>` element; empty when PubMed has none
    pub affiliations: Vec<String>,
}

impl PaperAuthor {
    /// Author with a single affiliation; a blank string means none
    pub fn new<N: Into<String>, A: Into<String>>(name: N, affiliation: A) -> Self {
        let affiliation = affiliation.into();
        let affiliations = if affiliation.trim().is_empty() {
            Vec::new()
        } else {
            vec![affiliation]
        };
        Self::with_affiliations(name, affiliations)
    }

    pub fn with_affiliations<N: Into<String>>(name: N, affiliations: Vec<String>) -> Self {
        Self {
            name: name.into(),
            affiliations,
        }
    }

    /// All affiliation entries as one string, separated by `"; "`
    pub fn affiliation(&self) -> String {
        self.affiliations.join("; ")
    }
}

/// A paper as returned by the search, before classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// PubMed ID
    pub id: String,
    pub title: String,
    pub publication_date: String,
    /// Authors in byline order
    pub authors: Vec<PaperAuthor>,
}

impl PaperRecord {
    /// Build a record, rejecting an empty id
    ///
    /// # Errors
    ///
    /// `PubMedError::InvalidArgument` when `id` is blank.
    pub fn new<I, T, D>(id: I, title: T, publication_date: D, authors: Vec<PaperAuthor>) -> Result<Self>
    where
        I: Into<String>,
        T: Into<String>,
        D: Into<String>,
    {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(PubMedError::InvalidArgument(
                "paper record requires a non-empty id".to_string(),
            ));
        }

        Ok(Self {
            id,
            title: title.into(),
            publication_date: publication_date.into(),
            authors,
        })
    }

    /// Affiliation text, one string per author, in author order
    pub fn author_affiliations(&self) -> impl Iterator<Item = String> + '_ {
        self.authors.iter().map(PaperAuthor::affiliation)
    }
}

/// A paper with at least one industry-affiliated author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedPaper {
    pub id: String,
    pub title: String,
    pub publication_date: String,
    /// Names of authors with an industry affiliation or one that is not academic
    pub non_academic_authors: Vec<String>,
    /// Distinct company names in first-seen order; never empty
    pub companies: Vec<String>,
    /// First email found in author order
    pub corresponding_email: Option<String>,
}
