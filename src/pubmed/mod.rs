//! PubMed E-utilities access
//!
//! ESearch turns a query into PMIDs; EFetch returns the article XML that is parsed into
//! [`PaperRecord`](crate::models::PaperRecord)s.

pub mod client;
pub mod parser;
mod responses;
mod xml_types;

pub use client::{MAX_FETCH_BATCH, MAX_RETRIEVABLE, PubMedClient};
pub use parser::parse_papers_from_xml;
