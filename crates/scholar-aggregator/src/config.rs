//! Configuration for the literature search aggregator.

use std::time::Duration;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// arXiv Atom query endpoint.
    pub const ARXIV_API: &str = "https://export.arxiv.org/api/query";

    /// OpenAlex REST API base.
    pub const OPENALEX_API: &str = "https://api.openalex.org";

    /// Semantic Scholar Graph API endpoint.
    pub const GRAPH_API: &str = "https://api.semanticscholar.org/graph/v1";

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// arXiv asks clients to keep one request every three seconds.
    pub const ARXIV_MIN_INTERVAL: Duration = Duration::from_secs(3);

    /// OpenAlex polite pool allows 10 req/s.
    pub const OPENALEX_MIN_INTERVAL: Duration = Duration::from_millis(100);

    /// Semantic Scholar batch delay without API key (1 req/s).
    pub const CITATION_MIN_INTERVAL: Duration = Duration::from_secs(1);

    /// Semantic Scholar batch delay with API key (10 req/s).
    pub const CITATION_MIN_INTERVAL_WITH_KEY: Duration = Duration::from_millis(100);

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// Rows requested per OpenAlex page.
    pub const OPENALEX_PAGE_SIZE: usize = 50;

    /// Upper bound on OpenAlex pages fetched for one request.
    pub const OPENALEX_MAX_PAGES: usize = 20;

    /// Candidate author ids kept from the OpenAlex author sub-lookup.
    pub const OPENALEX_AUTHOR_CANDIDATES: usize = 10;

    /// Lower bound of the global candidate pool for non-relevance sorts.
    pub const MIN_CANDIDATE_POOL: usize = 50;

    /// Upper bound of the global candidate pool for non-relevance sorts.
    pub const MAX_CANDIDATE_POOL: usize = 300;

    /// Multiplier applied to `offset + limit` when sizing the candidate pool.
    pub const CANDIDATE_POOL_FACTOR: usize = 5;

    /// Weight of the citation boost in relevance mode.
    pub const RELEVANCE_CITATION_WEIGHT: f64 = 0.15;

    /// Maximum ids per Semantic Scholar batch request.
    pub const CITATION_BATCH_SIZE: usize = 500;

    /// Maximum results a caller may request per page.
    pub const MAX_RESULTS_PER_PAGE: usize = 100;

    /// Largest result offset a caller may request.
    pub const MAX_START: usize = 1000;

    /// User agent sent to every upstream.
    pub const USER_AGENT: &str = concat!("scholar-aggregator/", env!("CARGO_PKG_VERSION"));
}

/// Fields requested from the Semantic Scholar batch endpoint.
pub mod fields {
    /// Citation metrics plus the identifiers used to verify each batch entry.
    pub const CITATIONS: &[&str] = &["externalIds", "citationCount", "influentialCitationCount"];
}

/// Aggregator configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// arXiv Atom query endpoint.
    pub arxiv_api_url: String,

    /// OpenAlex API base URL (without trailing slash).
    pub openalex_api_url: String,

    /// Semantic Scholar Graph API base URL.
    pub graph_api_url: String,

    /// Semantic Scholar API key (optional).
    pub semantic_scholar_api_key: Option<String>,

    /// Contact address for the OpenAlex polite pool (optional).
    pub openalex_mailto: Option<String>,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Minimum spacing between arXiv requests.
    pub arxiv_min_interval: Duration,

    /// Minimum spacing between OpenAlex requests.
    pub openalex_min_interval: Duration,

    /// Minimum spacing between Semantic Scholar requests.
    pub citation_min_interval: Duration,

    /// Transport-level retries for transient failures (0 disables the retry middleware).
    pub max_retries: u32,

    /// Raw response cache TTL (zero disables caching).
    pub cache_ttl: Duration,

    /// Maximum cached responses.
    pub cache_max_size: u64,
}

impl Config {
    /// Create a new configuration.
    ///
    /// The Semantic Scholar interval is relaxed when an API key is present.
    #[must_use]
    pub fn new(semantic_scholar_api_key: Option<String>, openalex_mailto: Option<String>) -> Self {
        let has_key = semantic_scholar_api_key.is_some();
        Self {
            arxiv_api_url: api::ARXIV_API.to_string(),
            openalex_api_url: api::OPENALEX_API.to_string(),
            graph_api_url: api::GRAPH_API.to_string(),
            semantic_scholar_api_key,
            openalex_mailto,
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            arxiv_min_interval: api::ARXIV_MIN_INTERVAL,
            openalex_min_interval: api::OPENALEX_MIN_INTERVAL,
            citation_min_interval: if has_key {
                api::CITATION_MIN_INTERVAL_WITH_KEY
            } else {
                api::CITATION_MIN_INTERVAL
            },
            max_retries: 0,
            cache_ttl: Duration::ZERO,
            cache_max_size: 0,
        }
    }

    /// Create a test configuration pointing every upstream at one mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            arxiv_api_url: format!("{base_url}/arxiv/api/query"),
            openalex_api_url: format!("{base_url}/openalex"),
            graph_api_url: format!("{base_url}/graph/v1"),
            semantic_scholar_api_key: None,
            openalex_mailto: None,
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            arxiv_min_interval: Duration::ZERO, // No delay in tests
            openalex_min_interval: Duration::ZERO,
            citation_min_interval: Duration::ZERO,
            max_retries: 0,
            cache_ttl: Duration::ZERO,
            cache_max_size: 0,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if a numeric environment variable cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("SEMANTIC_SCHOLAR_API_KEY").ok();
        let mailto = std::env::var("OPENALEX_MAILTO").ok();
        let mut config = Self::new(api_key, mailto);

        if let Ok(url) = std::env::var("ARXIV_API_URL") {
            config.arxiv_api_url = url;
        }
        if let Ok(url) = std::env::var("OPENALEX_API_URL") {
            config.openalex_api_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(url) = std::env::var("SEMANTIC_SCHOLAR_API_URL") {
            config.graph_api_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(retries) = std::env::var("AGGREGATOR_MAX_RETRIES") {
            config.max_retries = retries.parse()?;
        }
        if let Ok(ttl) = std::env::var("AGGREGATOR_CACHE_TTL_SECS") {
            config.cache_ttl = Duration::from_secs(ttl.parse()?);
            config.cache_max_size = 1000;
        }

        Ok(config)
    }

    /// Apply credentials given on the command line over those from the environment.
    #[must_use]
    pub fn with_credentials(mut self, api_key: Option<String>, mailto: Option<String>) -> Self {
        if let Some(key) = api_key {
            self.semantic_scholar_api_key = Some(key);
            self.citation_min_interval = api::CITATION_MIN_INTERVAL_WITH_KEY;
        }
        if mailto.is_some() {
            self.openalex_mailto = mailto;
        }
        self
    }

    /// Check if a Semantic Scholar API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.semantic_scholar_api_key.is_some()
    }

    /// Check if the raw response cache is enabled.
    #[must_use]
    pub fn cache_enabled(&self) -> bool {
        !self.cache_ttl.is_zero() && self.cache_max_size > 0
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, None)
    }
}
