//! Serde mirror of the parts of the PubMed EFetch schema we read

use serde::Deserialize;

use crate::error::{PubMedError, Result};
use crate::models::{PaperAuthor, PaperRecord};

#[derive(Debug, Deserialize)]
pub(super) struct PubmedArticleSet {
    #[serde(rename = "PubmedArticle", default)]
    pub articles: Vec<PubmedArticleXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PubmedArticleXml {
    #[serde(rename = "MedlineCitation")]
    pub medline_citation: MedlineCitation,
}

#[derive(Debug, Deserialize)]
pub(super) struct MedlineCitation {
    #[serde(rename = "PMID")]
    pub pmid: Option<PmidElement>,
    #[serde(rename = "Article")]
    pub article: Option<ArticleXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PmidElement {
    #[serde(rename = "$text")]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ArticleXml {
    #[serde(rename = "ArticleTitle")]
    pub title: Option<String>,
    #[serde(rename = "Journal")]
    pub journal: Option<JournalXml>,
    #[serde(rename = "AuthorList")]
    pub author_list: Option<AuthorListXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct JournalXml {
    #[serde(rename = "JournalIssue")]
    pub journal_issue: Option<JournalIssueXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct JournalIssueXml {
    #[serde(rename = "PubDate")]
    pub pub_date: Option<PubDateXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PubDateXml {
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Month")]
    pub month: Option<String>,
    #[serde(rename = "Day")]
    pub day: Option<String>,
    #[serde(rename = "MedlineDate")]
    pub medline_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthorListXml {
    #[serde(rename = "Author", default)]
    pub authors: Vec<AuthorXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthorXml {
    #[serde(rename = "LastName")]
    pub last_name: Option<String>,
    #[serde(rename = "ForeName")]
    pub fore_name: Option<String>,
    #[serde(rename = "Initials")]
    pub initials: Option<String>,
    #[serde(rename = "CollectiveName")]
    pub collective_name: Option<String>,
    #[serde(rename = "AffiliationInfo", default)]
    pub affiliation_info: Vec<AffiliationInfoXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AffiliationInfoXml {
    #[serde(rename = "Affiliation")]
    pub affiliation: Option<String>,
}

impl PubDateXml {
    /// `Year-Month-Day` from the parts present, or the free-form MedlineDate
    fn render(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.year, &self.month, &self.day]
            .into_iter()
            .filter_map(|part| part.as_deref().map(str::trim))
            .filter(|part| !part.is_empty())
            .collect();

        if !parts.is_empty() {
            return Some(parts.join("-"));
        }

        self.medline_date
            .as_deref()
            .map(str::trim)
            .filter(|date| !date.is_empty())
            .map(str::to_string)
    }
}

impl AuthorXml {
    fn display_name(&self) -> String {
        let clean = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        match (clean(&self.fore_name), clean(&self.last_name), clean(&self.initials)) {
            (Some(fore), Some(last), _) => format!("{} {}", fore, last),
            (None, Some(last), Some(initials)) => format!("{} {}", initials, last),
            (None, Some(last), None) => last,
            (Some(fore), None, _) => fore,
            (None, None, _) => String::new(),
        }
    }

    /// Non-empty `<Affiliation>` entries, each kept separate
    fn affiliations(&self) -> Vec<String> {
        self.affiliation_info
            .iter()
            .filter_map(|info| info.affiliation.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl PubmedArticleXml {
    pub fn pmid(&self) -> Option<&str> {
        self.medline_citation
            .pmid
            .as_ref()
            .map(|p| p.value.trim())
            .filter(|p| !p.is_empty())
    }

    pub fn into_record(self) -> Result<PaperRecord> {
        let pmid = self
            .pmid()
            .map(str::to_string)
            .ok_or_else(|| PubMedError::XmlError("PubmedArticle without PMID".to_string()))?;

        let article = self.medline_citation.article;

        let title = article
            .as_ref()
            .and_then(|a| a.title.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("No title")
            .to_string();

        let publication_date = article
            .as_ref()
            .and_then(|a| a.journal.as_ref())
            .and_then(|j| j.journal_issue.as_ref())
            .and_then(|i| i.pub_date.as_ref())
            .and_then(PubDateXml::render)
            .unwrap_or_else(|| "Unknown".to_string());

        let authors = article
            .and_then(|a| a.author_list)
            .map(|list| list.authors)
            .unwrap_or_default()
            .into_iter()
            .filter(|author| author.collective_name.is_none())
            .map(|author| {
                PaperAuthor::with_affiliations(author.display_name(), author.affiliations())
            })
            .collect();

        PaperRecord::new(pmid, title, publication_date, authors)
    }
}
