//! HTTP client for the site's internal JSON endpoints.
//!
//! The endpoint set is a fixed allow-list; nothing else on the site is ever
//! requested (apart from one warm-up page load to pick up cookies). All
//! session state (headers, cookie jar, retry tuning) lives in an explicit
//! [`SiteConfig`] so tests can point a client at a fake base URL.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT,
};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cli::types::ids::{CategoryId, GameId};
use crate::error::{GamedexError, Result};
use crate::site::types::{Category, GameUrlResponse, GamesPage, OptionsResponse};
use crate::site::urls;

pub const DEFAULT_BASE_URL: &str = "https://melbet-tn.com";
pub const DEFAULT_LANG: &str = "en";

/// The fixed endpoint allow-list.
const OPTIONS_PATH: &str = "/web-api/tpmodels/options/1";
const GAMES_PATH: &str = "/web-api/tpmodels/games/1";
const GAME_URL_PATH: &str = "/web-api/tpgamesopening/getgameurl";

const BROWSER_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Retry tuning for transient request failures.
///
/// Defaults (5 retries, 750ms base) follow the upstream client's observed
/// behavior; they are operational tuning, not a contract.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(750),
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff: `base * 2^attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Retry `op` per `policy`, backing off between attempts.
///
/// Non-retryable errors (4xx, parse failures) propagate immediately.
pub async fn with_retries<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                let delay = policy.delay(attempt);
                warn!(error = %e, attempt = attempt + 1, delay_ms = delay.as_millis() as u64,
                      "transient request failure, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Explicit per-run client configuration; no ambient global state.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub base_url: String,
    pub lang: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: DEFAULT_LANG.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

impl SiteConfig {
    /// Browser-like default headers the internal API expects.
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut h = HeaderMap::new();
        h.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));
        h.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        h.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&format!("{0},{0};q=0.9,en;q=0.8", self.lang))?,
        );
        h.insert(
            REFERER,
            HeaderValue::from_str(&urls::slots_page_url(&self.base_url, &self.lang))?,
        );
        h.insert(
            "X-Requested-With",
            HeaderValue::from_static("XMLHttpRequest"),
        );
        Ok(h)
    }
}

/// Server-side filters for one games-page request.
#[derive(Debug, Clone, Default)]
pub struct GamesFilter {
    pub category_id: Option<CategoryId>,
    pub brand_ids: Vec<u32>,
    pub title_search: Option<String>,
}

impl GamesFilter {
    pub fn for_category(category_id: Option<CategoryId>) -> Self {
        Self {
            category_id,
            ..Self::default()
        }
    }
}

/// Source of raw catalog pages. `SiteClient` is the real implementation;
/// tests drive the pagination loop with a fake.
#[async_trait::async_trait]
pub trait GamesSource: Send + Sync {
    async fn fetch_page(&self, filter: &GamesFilter, offset: u32, limit: u32)
        -> Result<Vec<Value>>;
}

/// Thin client over the site's internal endpoints.
pub struct SiteClient {
    client: Client,
    config: SiteConfig,
}

impl SiteClient {
    pub fn new(config: SiteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .default_headers(config.header_map()?)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Load the public slots page once so the cookie jar is populated.
    ///
    /// Best effort: the API usually answers without cookies too, so
    /// failures are logged and ignored.
    pub async fn warm(&self) {
        let url = urls::slots_page_url(&self.config.base_url, &self.config.lang);
        debug!(url = %url, "warm-up page load");
        match self.client.get(&url).send().await {
            Ok(res) => debug!(status = res.status().as_u16(), "warm-up done"),
            Err(e) => warn!(error = %e, "warm-up request failed, continuing"),
        }
    }

    async fn try_get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        debug!(url = %url, "GET");
        let res = self.client.get(url).query(query).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(GamedexError::Fetch {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: format!("unexpected status {status}"),
            });
        }
        Ok(res.json::<Value>().await?)
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        with_retries(&self.config.retry, || self.try_get_json(&url, query)).await
    }

    /// Fetch the category (subcategory) listing. Called once per run.
    pub async fn get_categories(&self) -> Result<Vec<Category>> {
        let query = [("optionsKeys", "brands,subcategories,banners".to_string())];
        let value = self.get_json(OPTIONS_PATH, &query).await?;
        let options: OptionsResponse = serde_json::from_value(value)?;
        Ok(options.categories())
    }

    /// Resolve a game's free-play demo URL via the game-url endpoint.
    pub async fn get_demo_link(&self, id: GameId) -> Result<String> {
        let query = [
            ("demo", "true".to_string()),
            ("id", id.to_string()),
            ("withGameInfo", "true".to_string()),
            ("sectionId", "1".to_string()),
            ("launchDomain", urls::launch_domain(&self.config.base_url)),
        ];
        let value = self.get_json(GAME_URL_PATH, &query).await?;
        let parsed: GameUrlResponse = serde_json::from_value(value)?;
        match parsed.link {
            Some(link) if !link.is_empty() => Ok(link),
            _ => Err(GamedexError::DemoLinkMissing { id }),
        }
    }
}

#[async_trait::async_trait]
impl GamesSource for SiteClient {
    /// Fetch one page of raw catalog items.
    async fn fetch_page(
        &self,
        filter: &GamesFilter,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Value>> {
        let brand_ids = filter
            .brand_ids
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let query = [
            ("brandIds", brand_ids),
            (
                "categoriesId",
                filter
                    .category_id
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
            ),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
            (
                "titleSearch",
                filter.title_search.clone().unwrap_or_default(),
            ),
            ("withoutCdn", "true".to_string()),
            ("filterType", "or".to_string()),
        ];
        let value = self.get_json(GAMES_PATH, &query).await?;
        let page: GamesPage = serde_json::from_value(value)?;
        Ok(page.games)
    }
}
