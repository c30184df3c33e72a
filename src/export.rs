//! CSV and console output of annotated papers

use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument};

use crate::error::Result;
use crate::models::AnnotatedPaper;

/// Column headers of the CSV export, in order
pub const CSV_HEADERS: [&str; 6] = [
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Author(s)",
    "Company Affiliation(s)",
    "Corresponding Author Email",
];

const LIST_SEPARATOR: &str = "; ";
const MISSING_EMAIL: &str = "Not available";

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    pubmed_id: &'a str,
    title: &'a str,
    publication_date: &'a str,
    non_academic_authors: String,
    companies: String,
    corresponding_email: &'a str,
}

impl<'a> From<&'a AnnotatedPaper> for CsvRow<'a> {
    fn from(paper: &'a AnnotatedPaper) -> Self {
        Self {
            pubmed_id: &paper.id,
            title: &paper.title,
            publication_date: &paper.publication_date,
            non_academic_authors: paper.non_academic_authors.join(LIST_SEPARATOR),
            companies: paper.companies.join(LIST_SEPARATOR),
            corresponding_email: paper
                .corresponding_email
                .as_deref()
                .unwrap_or(MISSING_EMAIL),
        }
    }
}

/// Write papers as CSV to any writer; the header row is always written
pub fn write_csv<W: io::Write>(papers: &[AnnotatedPaper], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(CSV_HEADERS)?;
    for paper in papers {
        wtr.serialize(CsvRow::from(paper))?;
    }
    wtr.flush()?;

    Ok(())
}

/// Create or truncate `path` and write the papers to it as CSV
#[instrument(skip(papers, path), fields(path = %path.as_ref().display(), count = papers.len()))]
pub fn save_to_csv<P: AsRef<Path>>(papers: &[AnnotatedPaper], path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_csv(papers, file)?;

    info!("Saved results to CSV");
    Ok(())
}

/// Console layout of a result set
struct ConsoleListing<'a>(&'a [AnnotatedPaper]);

impl fmt::Display for ConsoleListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No papers found with the specified criteria");
        }

        for (i, paper) in self.0.iter().enumerate() {
            let authors = if paper.non_academic_authors.is_empty() {
                "None".to_string()
            } else {
                paper.non_academic_authors.join(LIST_SEPARATOR)
            };

            writeln!(f, "\nPaper {}:", i + 1)?;
            writeln!(f, "PubMed ID: {}", paper.id)?;
            writeln!(f, "Title: {}", paper.title)?;
            writeln!(f, "Publication Date: {}", paper.publication_date)?;
            writeln!(f, "Non-academic Authors: {}", authors)?;
            writeln!(f, "Company Affiliations: {}", paper.companies.join(LIST_SEPARATOR))?;
            writeln!(
                f,
                "Corresponding Author Email: {}",
                paper.corresponding_email.as_deref().unwrap_or(MISSING_EMAIL)
            )?;
        }
        writeln!(f, "\nTotal papers found: {}", self.0.len())
    }
}

/// Human-readable listing of the papers
pub fn render_console(papers: &[AnnotatedPaper]) -> String {
    ConsoleListing(papers).to_string()
}

pub fn print_to_console(papers: &[AnnotatedPaper]) {
    print!("{}", render_console(papers));
}
