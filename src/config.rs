//! Configuration for the NCBI client and the affiliation heuristics

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PubMedError, Result};
use crate::rate_limit::{NCBI_API_KEY_RATE, NCBI_DEFAULT_RATE, RateLimiter};
use crate::retry::RetryConfig;

pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
pub const DEFAULT_TOOL: &str = "pharma-papers";

/// Settings for [`PubMedClient`](crate::PubMedClient)
///
/// # Example
///
/// ```
/// use pharma_papers::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_api_key("your_api_key_here")
///     .with_email("researcher@example.com");
///
/// assert_eq!(config.effective_rate_limit(), 10.0);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: Option<String>,
    pub email: Option<String>,
    pub tool: Option<String>,
    /// Requests per second; derived from the API key when unset
    pub rate_limit: Option<f64>,
    pub timeout: Duration,
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub retry_config: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            email: None,
            tool: None,
            rate_limit: None,
            timeout: Duration::from_secs(30),
            base_url: None,
            user_agent: None,
            retry_config: RetryConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_tool<S: Into<String>>(mut self, tool: S) -> Self {
        self.tool = Some(tool.into());
        self
    }

    pub fn with_rate_limit(mut self, rate: f64) -> Self {
        self.rate_limit = Some(rate);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn effective_rate_limit(&self) -> f64 {
        self.rate_limit.unwrap_or(if self.api_key.is_some() {
            NCBI_API_KEY_RATE
        } else {
            NCBI_DEFAULT_RATE
        })
    }

    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn effective_tool(&self) -> &str {
        self.tool.as_deref().unwrap_or(DEFAULT_TOOL)
    }

    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("{}/{}", DEFAULT_TOOL, env!("CARGO_PKG_VERSION")))
    }

    /// Query parameters NCBI asks every E-utilities caller to send
    pub fn build_api_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(key) = &self.api_key {
            params.push(("api_key".to_string(), key.clone()));
        }
        if let Some(email) = &self.email {
            params.push(("email".to_string(), email.clone()));
        }
        params.push(("tool".to_string(), self.effective_tool().to_string()));

        params
    }

    pub fn create_rate_limiter(&self) -> RateLimiter {
        match self.rate_limit {
            Some(rate) => RateLimiter::new(rate),
            None => RateLimiter::ncbi(self.api_key.is_some()),
        }
    }
}

/// Keyword lists driving the affiliation classifier
///
/// Both lists are matched case-insensitively against each comma-separated segment of the
/// affiliation text, on word boundaries. Academic indicators are checked first and win
/// over industry indicators.
///
/// Entry syntax:
/// - `hospital` matches the whole word or phrase
/// - `universit*` matches any word starting with `universit`
/// - `laboratories !national !research` matches `laboratories` unless the preceding
///   word is `national` or `research`
/// - `+inc` matches only after another word in the same segment, so "Acme Inc" counts
///   but a bare "Denver, CO." does not
///
/// A match glued to a preceding letter or `.` never counts: `s.a.` does not match "U.S.A.".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    #[serde(default = "default_academic_indicators")]
    pub academic_indicators: Vec<String>,
    #[serde(default = "default_industry_indicators")]
    pub industry_indicators: Vec<String>,
}

const ACADEMIC_INDICATORS: &[&str] = &[
    "universit*",
    "universidad*",
    "college",
    "institute of technology",
    "school of",
    "medical school",
    "medical cent*",
    "hospital*",
    "clinic",
    "nih",
    "national institutes of health",
    "national laborator*",
    "national cancer institute",
    "academy of sciences",
    "cnrs",
    "inserm",
    "ministry of",
    "dept of",
    "dept.",
    "faculty of",
];

const INDUSTRY_INDICATORS: &[&str] = &[
    "+inc",
    "+ltd",
    "+llc",
    "+gmbh",
    "+corp",
    "corporation",
    "+co.",
    "+ag",
    "+s.a.",
    "+plc",
    "pharmaceutic*",
    "pharma",
    "biopharma*",
    "biotech*",
    "bioscience*",
    "therapeutics",
    "laboratories !national !research",
    "genentech",
    "novartis",
    "pfizer",
    "roche",
    "sanofi",
    "merck",
    "gilead",
    "astrazeneca",
    "bristol-myers squibb",
    "bristol myers squibb",
    "johnson & johnson",
    "eli lilly",
    "abbvie",
    "amgen",
    "biogen",
    "moderna",
    "bayer",
];

fn default_academic_indicators() -> Vec<String> {
    ACADEMIC_INDICATORS.iter().map(|s| s.to_string()).collect()
}

fn default_industry_indicators() -> Vec<String> {
    INDUSTRY_INDICATORS.iter().map(|s| s.to_string()).collect()
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            academic_indicators: default_academic_indicators(),
            industry_indicators: default_industry_indicators(),
        }
    }
}

impl IndicatorConfig {
    /// Parse a YAML document with `academic_indicators` and/or `industry_indicators`
    ///
    /// ```
    /// use pharma_papers::IndicatorConfig;
    ///
    /// let config = IndicatorConfig::from_yaml_str("industry_indicators: [pharma, inc]").unwrap();
    /// assert_eq!(config.industry_indicators, vec!["pharma", "inc"]);
    /// assert!(config.academic_indicators.contains(&"college".to_string()));
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: IndicatorConfig =
            serde_yaml::from_str(yaml).map_err(|e| PubMedError::ConfigError {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading indicator configuration");
        let content = fs::read_to_string(path).map_err(|e| PubMedError::ConfigError {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_yaml_str(&content)
    }

    /// Reject entries without a phrase, which would match every affiliation
    pub fn validate(&self) -> Result<()> {
        let blank = self
            .academic_indicators
            .iter()
            .chain(&self.industry_indicators)
            .any(|entry| {
                entry
                    .split_whitespace()
                    .filter(|word| !word.starts_with('!'))
                    .all(|word| word.trim_start_matches('+').trim_end_matches('*').is_empty())
            });

        if blank {
            return Err(PubMedError::InvalidArgument(
                "indicator strings must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
