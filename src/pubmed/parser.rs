//! PubMed EFetch XML parsing
//!
//! Turns an EFetch `PubmedArticleSet` document into [`PaperRecord`]s carrying the fields
//! the affiliation filter needs: PMID, title, publication date, and per-author names and
//! affiliations.

use std::sync::OnceLock;

use quick_xml::de::from_str;
use regex::Regex;
use tracing::{debug, instrument, warn};

use super::xml_types::PubmedArticleSet;
use crate::error::{PubMedError, Result};
use crate::models::PaperRecord;

/// Strip inline formatting tags (`<i>`, `<sup>`, `<sub>`, ...) that appear inside titles
/// and break quick-xml's serde deserializer
pub(crate) fn strip_inline_html_tags(xml: &str) -> String {
    static INLINE_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = INLINE_TAG_REGEX.get_or_init(|| {
        Regex::new(r"</?(?:i|b|u|sup|sub|em|strong|italic|bold)>")
            .expect("Failed to compile inline tag regex")
    });

    let cleaned = re.replace_all(xml, "");
    if cleaned.len() != xml.len() {
        debug!(
            removed_bytes = xml.len() - cleaned.len(),
            "Stripped inline HTML tags"
        );
    }
    cleaned.into_owned()
}

/// Parse every `PubmedArticle` in an EFetch response
///
/// Articles without a PMID are skipped with a warning; a document that is not valid
/// EFetch XML is an error.
///
/// # Example
///
/// ```
/// use pharma_papers::pubmed::parse_papers_from_xml;
///
/// let xml = r#"<?xml version="1.0"?>
/// <PubmedArticleSet>
///   <PubmedArticle>
///     <MedlineCitation>
///       <PMID>12345678</PMID>
///       <Article>
///         <ArticleTitle>Example Article</ArticleTitle>
///       </Article>
///     </MedlineCitation>
///   </PubmedArticle>
/// </PubmedArticleSet>"#;
///
/// let papers = parse_papers_from_xml(xml)?;
/// assert_eq!(papers[0].id, "12345678");
/// assert_eq!(papers[0].publication_date, "Unknown");
/// # Ok::<(), pharma_papers::PubMedError>(())
/// ```
#[instrument(skip(xml), fields(xml_size = xml.len()))]
pub fn parse_papers_from_xml(xml: &str) -> Result<Vec<PaperRecord>> {
    let cleaned_xml = strip_inline_html_tags(xml);

    let article_set: PubmedArticleSet = from_str(&cleaned_xml)
        .map_err(|e| PubMedError::XmlError(format!("Failed to deserialize XML: {}", e)))?;

    let papers: Vec<PaperRecord> = article_set
        .articles
        .into_iter()
        .filter_map(|article| match article.into_record() {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Skipping unparseable article");
                None
            }
        })
        .collect();

    Ok(papers)
}
