//! ArticleMeta RESTful transport

use exporter_core::{HttpSettings, SHARED_RUNTIME, http_client};
use reqwest::StatusCode;

use crate::article::Article;
use crate::client::parse_article;
use crate::error::SourceError;

pub const DEFAULT_DOMAIN: &str = "http://articlemeta.scielo.org";
const ARTICLE_ENDPOINT: &str = "/api/v1/article/";

/// Blocking facade over the async HTTP client, safe to share across workers
pub struct RestfulClient {
    base_url: String,
    client: reqwest::Client,
}

impl RestfulClient {
    pub fn new(domain: Option<&str>, http: &HttpSettings) -> Result<Self, SourceError> {
        let base_url = normalize_domain(domain.unwrap_or(DEFAULT_DOMAIN));
        let client = http_client(http).map_err(|e| SourceError::from_reqwest(&e))?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn article_url(&self) -> String {
        format!("{}{ARTICLE_ENDPOINT}", self.base_url)
    }

    /// GET one article; 404 or an empty payload is `Ok(None)`
    pub fn document(&self, collection: &str, pid: &str) -> Result<Option<Article>, SourceError> {
        let url = self.article_url();
        let body: Result<Option<String>, reqwest::Error> = SHARED_RUNTIME.handle().block_on(async {
            let resp = self
                .client
                .get(&url)
                .query(&[("collection", collection), ("code", pid), ("format", "json")])
                .send()
                .await?;
            if resp.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            resp.error_for_status()?.text().await.map(Some)
        });

        match body.map_err(|e| SourceError::from_reqwest(&e))? {
            Some(text) => parse_article(&text),
            None => Ok(None),
        }
    }
}

/// Accept bare hosts ("am.example.org") as well as full URLs
fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("http://{domain}")
    }
}
