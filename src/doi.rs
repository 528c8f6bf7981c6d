use regex::Regex;
use std::collections::BTreeSet;
use std::time::Duration;

/// Default per-request timeout for DOI resolution.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Endpoint DOIs are resolved against.
pub const DOI_RESOLVER_URL: &str = "https://doi.org";

lazy_static::lazy_static! {
    /// A DOI-shaped token anywhere in text, bare or inside a `doi.org` URL.
    static ref DOI_RE: Regex = Regex::new(r"(?i)10\.\d{4,9}/[-._;()/:A-Za-z0-9]+").unwrap();

    /// The whole string is one DOI.
    static ref VALID_DOI_RE: Regex = Regex::new(r"(?i)^10\.\d{4,9}/[-._;()/:A-Za-z0-9]+$").unwrap();
}

/// Outcome of asking the resolution service about a DOI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The registry knows the DOI.
    Resolves,
    /// The registry answered that the DOI does not exist.
    NotFound,
    /// The answer could not be obtained (network error, server error).
    Indeterminate,
}

/// Resolves DOIs against a registry.
pub trait DoiResolver {
    fn resolve(&self, doi: &str) -> Resolution;
}

/// Maps an HTTP status from the resolution service to a verdict.
///
/// Only 4xx answers mean the DOI does not exist. Server errors and other
/// redirects (303, 307, 308) are indeterminate rather than treated as missing,
/// so a flaky registry cannot fail a notebook.
pub fn resolution_for_status(status: u16) -> Resolution {
    match status {
        200 | 301 | 302 => Resolution::Resolves,
        400..=499 => Resolution::NotFound,
        _ => Resolution::Indeterminate,
    }
}

/// Resolves DOIs with a HEAD request to `https://doi.org/<doi>`.
///
/// Redirects are not followed: the redirect itself proves the DOI is registered.
pub struct HttpDoiResolver {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpDoiResolver {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        Self::with_base_url(DOI_RESOLVER_URL, timeout)
    }

    /// Builds a resolver against another endpoint (mirrors, test servers).
    pub fn with_base_url(base_url: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .user_agent("NotebookQA/1.0")
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl DoiResolver for HttpDoiResolver {
    fn resolve(&self, doi: &str) -> Resolution {
        let url = format!("{}/{}", self.base_url, doi);
        match self.client.head(&url).send() {
            Ok(response) => resolution_for_status(response.status().as_u16()),
            Err(e) => {
                log::debug!("resolving {} failed: {}", doi, e);
                Resolution::Indeterminate
            }
        }
    }
}

/// True if the whole string is a syntactically valid DOI.
pub fn is_valid_doi(doi: &str) -> bool {
    VALID_DOI_RE.is_match(doi)
}

/// Extracts every DOI-shaped token from `text`.
///
/// The suffix grammar admits `.`, `)` and friends, so tokens lose trailing
/// sentence punctuation and unbalanced closing parentheses, as in
/// `(see https://doi.org/10.1234/abc).`.
pub fn extract_dois(text: &str) -> BTreeSet<String> {
    DOI_RE
        .find_iter(text)
        .map(|m| trim_doi(m.as_str()))
        .filter(|doi| is_valid_doi(doi))
        .map(str::to_string)
        .collect()
}

fn trim_doi(token: &str) -> &str {
    let mut doi = token;
    loop {
        let trimmed = doi.trim_end_matches(['.', ',', ';', ':']);
        let trimmed = if trimmed.ends_with(')')
            && trimmed.matches(')').count() > trimmed.matches('(').count()
        {
            &trimmed[..trimmed.len() - 1]
        } else {
            trimmed
        };
        if trimmed == doi {
            return doi;
        }
        doi = trimmed;
    }
}
