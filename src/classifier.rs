//! Affiliation classification
//!
//! Decides whether a free-text author affiliation names a commercial (pharma, biotech or
//! similar) organization, extracts the organization name, and picks out any email address.
//!
//! Academic indicators are tested first and short-circuit: an affiliation mentioning both
//! a university and a company is not industry. Affiliations matching neither list are not
//! industry either.
//!
//! ```
//! use pharma_papers::classifier::classify;
//!
//! let result = classify("Research Division, Acme Biotech Inc, Boston, MA, jdoe@acmebiotech.com");
//! assert!(result.is_industry);
//! assert_eq!(result.organization_name.as_deref(), Some("Acme Biotech Inc"));
//! assert_eq!(result.email.as_deref(), Some("jdoe@acmebiotech.com"));
//! ```

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::IndicatorConfig;
use crate::error::{PubMedError, Result};

/// Outcome of classifying one affiliation string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub is_industry: bool,
    /// Comma-separated segment holding the company indicator; only set for industry
    pub organization_name: Option<String>,
    /// First email address in the text, whatever the classification
    pub email: Option<String>,
}

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)+")
            .expect("Failed to compile email regex")
    })
}

/// First email address in `text`, if any
///
/// The domain must contain at least one dot; trailing punctuation is not part of the match.
pub fn extract_email(text: &str) -> Option<String> {
    email_regex().find(text).map(|m| m.as_str().to_string())
}

/// Lowercase and collapse whitespace runs to single spaces
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A compiled indicator entry, see [`IndicatorConfig`] for the syntax
#[derive(Debug, Clone)]
struct Indicator {
    pattern: Regex,
    not_after: Vec<String>,
    /// `+` entries: only counts after another word in the same segment
    needs_name: bool,
}

impl Indicator {
    fn parse(entry: &str) -> Result<Self> {
        let (exclusions, words): (Vec<&str>, Vec<&str>) = entry
            .split_whitespace()
            .partition(|word| word.starts_with('!'));

        let phrase = words.join(" ").to_lowercase();
        let (phrase, needs_name) = match phrase.strip_prefix('+') {
            Some(rest) => (rest.to_string(), true),
            None => (phrase, false),
        };
        let (phrase, is_stem) = match phrase.strip_suffix('*') {
            Some(stem) => (stem.to_string(), true),
            None => (phrase, false),
        };

        if phrase.is_empty() {
            return Err(PubMedError::InvalidArgument(format!(
                "indicator '{}' has no phrase",
                entry
            )));
        }

        let tail = if is_stem {
            r"\w*"
        } else if phrase.ends_with(|c: char| c.is_alphanumeric()) {
            r"\b"
        } else {
            ""
        };
        let pattern = Regex::new(&format!(r"\b{}{}", regex::escape(&phrase), tail)).map_err(
            |e| PubMedError::InvalidArgument(format!("indicator '{}': {}", entry, e)),
        )?;

        let not_after = exclusions
            .iter()
            .map(|word| word.trim_start_matches('!').to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();

        Ok(Self {
            pattern,
            not_after,
            needs_name,
        })
    }

    /// Whether the indicator occurs in one already-normalized segment
    fn matches(&self, normalized: &str) -> bool {
        self.pattern.find_iter(normalized).any(|m| {
            let before = &normalized[..m.start()];
            !Self::glued_to_previous(before)
                && !self.preceded_by_excluded_word(before)
                && (!self.needs_name || before.contains(char::is_alphanumeric))
        })
    }

    /// "s.a." inside "u.s.a." is not a match
    fn glued_to_previous(before: &str) -> bool {
        before
            .chars()
            .next_back()
            .is_some_and(|c| c == '.' || c.is_alphanumeric())
    }

    fn preceded_by_excluded_word(&self, before: &str) -> bool {
        if self.not_after.is_empty() {
            return false;
        }
        let previous = before
            .split(|c: char| !c.is_alphanumeric())
            .rfind(|word| !word.is_empty());
        previous.is_some_and(|word| self.not_after.iter().any(|ex| ex == word))
    }
}

fn compile(entries: &[String]) -> Result<Arc<[Indicator]>> {
    entries
        .iter()
        .map(|entry| Indicator::parse(entry))
        .collect::<Result<Vec<_>>>()
        .map(Arc::from)
}

/// Keyword classifier for author affiliations
///
/// Cloning is cheap; the compiled indicator lists are shared.
#[derive(Debug, Clone)]
pub struct AffiliationClassifier {
    academic: Arc<[Indicator]>,
    industry: Arc<[Indicator]>,
}

impl AffiliationClassifier {
    /// Compile a classifier from indicator lists
    ///
    /// # Errors
    ///
    /// `PubMedError::InvalidArgument` if an entry has no phrase.
    pub fn new(config: &IndicatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            academic: compile(&config.academic_indicators)?,
            industry: compile(&config.industry_indicators)?,
        })
    }

    /// Classify one affiliation string. Never fails; unknown text is not industry.
    pub fn classify(&self, affiliation: &str) -> Classification {
        let email = extract_email(affiliation);

        // Email domains such as "@pharma.com" must not count as company indicators
        let text = email_regex().replace_all(affiliation, " ");

        let organization_name = if Self::find_segment(&self.academic, &text).is_some() {
            None
        } else {
            Self::find_segment(&self.industry, &text)
        };

        match organization_name {
            Some(name) => {
                trace!(affiliation, organization = %name, "Classified as industry");
                Classification {
                    is_industry: true,
                    organization_name: Some(name.to_string()),
                    email,
                }
            }
            None => {
                trace!(affiliation, "Classified as not industry");
                Classification {
                    is_industry: false,
                    organization_name: None,
                    email,
                }
            }
        }
    }

    /// Whether the text contains any academic indicator; email addresses are ignored
    pub fn is_academic(&self, affiliation: &str) -> bool {
        let text = email_regex().replace_all(affiliation, " ");
        Self::find_segment(&self.academic, &text).is_some()
    }

    /// First comma-separated segment containing an indicator, trimmed, original casing
    fn find_segment<'a>(indicators: &[Indicator], text: &'a str) -> Option<&'a str> {
        text.split(',')
            .map(|segment| segment.trim().trim_end_matches(';').trim())
            .filter(|segment| !segment.is_empty())
            .find(|segment| {
                let normalized = normalize(segment);
                indicators.iter().any(|indicator| indicator.matches(&normalized))
            })
    }
}

impl Default for AffiliationClassifier {
    fn default() -> Self {
        Self::new(&IndicatorConfig::default()).expect("Built-in indicator lists must compile")
    }
}

/// Classify with the built-in indicator lists
pub fn classify(affiliation: &str) -> Classification {
    static DEFAULT_CLASSIFIER: OnceLock<AffiliationClassifier> = OnceLock::new();
    DEFAULT_CLASSIFIER
        .get_or_init(AffiliationClassifier::default)
        .classify(affiliation)
}
