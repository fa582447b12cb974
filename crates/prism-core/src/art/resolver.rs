//! Random-artwork metadata resolution.
//!
//! Two-stage lookup against public catalog endpoints:
//! 1. A randomized structured query returning exactly one painting with a
//!    title, an image reference and a human-readable article link.
//! 2. An optional summary lookup keyed by article slug + language, which
//!    usually yields a better-sized thumbnail. Its absence is non-fatal.
//!
//! Fields are normalized on the way out -- empty optionals dropped, years
//! reduced to a 4-digit prefix -- and a statically-known safe image URL
//! stands in when no valid image reference can be produced.

use async_trait::async_trait;
use serde::Deserialize;

use super::item::{normalize_optional, normalize_year, ArtItem};
use crate::config::Config;
use crate::error::ResolveError;

/// One random painting (instance/subclass of Q3305213) carrying an image,
/// with creator, inception and article when present. French article
/// preferred, English as fallback, same order for labels.
const RANDOM_ARTWORK_QUERY: &str = r#"
SELECT ?item ?itemLabel ?image ?creatorLabel ?inception ?article WHERE {
  ?item wdt:P31/wdt:P279* wd:Q3305213.
  ?item wdt:P18 ?image.
  OPTIONAL { ?item wdt:P170 ?creator. }
  OPTIONAL { ?item wdt:P571 ?inception. }
  OPTIONAL { ?article schema:about ?item ;
                     schema:isPartOf <https://fr.wikipedia.org/> . }
  OPTIONAL { ?articleEN schema:about ?item ;
                        schema:isPartOf <https://en.wikipedia.org/> . }
  BIND(COALESCE(?article, ?articleEN) AS ?article)
  SERVICE wikibase:label { bd:serviceParam wikibase:language "fr,en". }
}
ORDER BY RAND()
LIMIT 1
"#;

const FILE_PATH_BASE: &str = "https://commons.wikimedia.org/wiki/Special:FilePath";
/// Width hint appended when rebuilding a URL from a bare file title, to
/// avoid pulling the full-resolution original.
const FILE_PATH_WIDTH: u32 = 800;

/// The orchestrator's metadata seam. Production uses [`ArtResolver`];
/// tests script failures and canned records through stub implementations.
#[async_trait]
pub trait ArtSource: Send + Sync {
    /// Produce one candidate artwork record, genuinely varying across calls.
    async fn resolve_one(&self) -> Result<ArtItem, ResolveError>;
}

/// Catalog-backed metadata resolver.
pub struct ArtResolver {
    client: reqwest::Client,
    config: Config,
}

// ── Wire shapes ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    bindings: Vec<SparqlBinding>,
}

#[derive(Debug, Default, Deserialize)]
struct SparqlBinding {
    #[serde(rename = "itemLabel")]
    item_label: Option<BoundValue>,
    image: Option<BoundValue>,
    #[serde(rename = "creatorLabel")]
    creator_label: Option<BoundValue>,
    inception: Option<BoundValue>,
    article: Option<BoundValue>,
}

#[derive(Debug, Deserialize)]
struct BoundValue {
    value: Option<String>,
}

impl SparqlBinding {
    fn value_of(field: &Option<BoundValue>) -> Option<String> {
        field.as_ref().and_then(|v| v.value.clone())
    }
}

impl ArtResolver {
    /// Build a resolver with its own HTTP client (short client-side
    /// timeouts, explicit user agent).
    pub fn new(config: Config) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    /// Build over an existing client (shared with the download step).
    pub fn with_client(client: reqwest::Client, config: Config) -> Self {
        Self { client, config }
    }

    async fn query_catalog(&self) -> Result<SparqlBinding, ResolveError> {
        let response = self
            .client
            .get(&self.config.catalog_endpoint)
            .query(&[("format", "json"), ("query", RANDOM_ARTWORK_QUERY)])
            .header("Accept", "application/sparql-results+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::BadStatus(status));
        }

        let body = response.text().await?;
        let parsed: SparqlResponse = serde_json::from_str(&body)?;
        parsed
            .results
            .bindings
            .into_iter()
            .next()
            .ok_or(ResolveError::MissingField("result"))
    }

    /// Resolve the summary endpoint for `article` and pull its thumbnail
    /// URL. Any failure -- bad status, parse, network -- yields `None`.
    async fn summary_thumbnail(&self, article: &str) -> Option<String> {
        let lang = if article.contains("fr.wikipedia.org") {
            "fr"
        } else {
            "en"
        };
        let slug = article.rsplit('/').next().unwrap_or_default();
        let url = format!(
            "{}/api/rest_v1/page/summary/{}",
            self.config.wikipedia_base.replace("{lang}", lang),
            urlencoding::encode(slug)
        );

        let response = self.client.get(&url).send().await.ok()?;
        if response.status() != reqwest::StatusCode::OK {
            return None;
        }
        let summary: serde_json::Value = response.json().await.ok()?;
        summary["thumbnail"]["source"]
            .as_str()
            .map(|s| s.to_string())
    }
}

/// Pick the best usable image URL.
///
/// Preference order: summary thumbnail, then the direct catalog reference
/// (absolute URLs kept as-is; bare `File:` titles rebuilt as a file-path
/// URL with a width hint), then the configured safe fallback.
fn select_image_url(
    summary_thumb: Option<&str>,
    direct: Option<&str>,
    fallback: &str,
) -> String {
    if let Some(thumb) = summary_thumb.filter(|s| !s.is_empty()) {
        return thumb.to_string();
    }

    if let Some(direct) = direct.filter(|s| !s.is_empty()) {
        if direct.starts_with("http") {
            return direct.to_string();
        }
        let file_name = direct.trim_start_matches("File:");
        return format!(
            "{FILE_PATH_BASE}/{}?width={FILE_PATH_WIDTH}",
            urlencoding::encode(file_name)
        );
    }

    fallback.to_string()
}

#[async_trait]
impl ArtSource for ArtResolver {
    async fn resolve_one(&self) -> Result<ArtItem, ResolveError> {
        let binding = self.query_catalog().await?;

        let title = SparqlBinding::value_of(&binding.item_label)
            .filter(|t| !t.is_empty())
            .ok_or(ResolveError::MissingField("title"))?;
        let article_url = SparqlBinding::value_of(&binding.article)
            .filter(|a| !a.is_empty())
            .ok_or(ResolveError::MissingField("article"))?;

        let artist = normalize_optional(SparqlBinding::value_of(&binding.creator_label));
        let year = SparqlBinding::value_of(&binding.inception)
            .as_deref()
            .and_then(normalize_year);

        let thumb = self.summary_thumbnail(&article_url).await;
        let image_url = select_image_url(
            thumb.as_deref(),
            SparqlBinding::value_of(&binding.image).as_deref(),
            &self.config.fallback_image_url,
        );

        Ok(ArtItem {
            title,
            artist,
            year,
            article_url,
            image_url,
            local_image_path: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(server: &mockito::ServerGuard) -> Config {
        let mut config = Config::default();
        config.catalog_endpoint = format!("{}/sparql", server.url());
        config.wikipedia_base = server.url();
        config
    }

    fn sparql_body(
        title: Option<&str>,
        image: Option<&str>,
        creator: Option<&str>,
        inception: Option<&str>,
        article: Option<&str>,
    ) -> String {
        let mut binding = serde_json::Map::new();
        let mut put = |key: &str, value: Option<&str>| {
            if let Some(value) = value {
                binding.insert(key.into(), serde_json::json!({ "value": value }));
            }
        };
        put("itemLabel", title);
        put("image", image);
        put("creatorLabel", creator);
        put("inception", inception);
        put("article", article);

        serde_json::json!({ "results": { "bindings": [binding] } }).to_string()
    }

    #[tokio::test]
    async fn resolves_and_normalizes_one_artwork() {
        let mut server = mockito::Server::new_async().await;
        let article = format!("{}/wiki/La_Joconde", server.url());

        let _catalog = server
            .mock("GET", "/sparql")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(sparql_body(
                Some("La Joconde"),
                Some("https://upload.example.org/joconde-full.jpg"),
                Some("Léonard de Vinci"),
                Some("+1503-01-01T00:00:00Z"),
                Some(&article),
            ))
            .create_async()
            .await;
        let _summary = server
            .mock("GET", "/api/rest_v1/page/summary/La_Joconde")
            .with_status(200)
            .with_body(r#"{"thumbnail":{"source":"https://thumbs.example.org/joconde-320.jpg"}}"#)
            .create_async()
            .await;

        let resolver = ArtResolver::new(config_for(&server)).unwrap();
        let item = resolver.resolve_one().await.unwrap();

        assert_eq!(item.title, "La Joconde");
        assert_eq!(item.artist.as_deref(), Some("Léonard de Vinci"));
        assert_eq!(item.year.as_deref(), Some("1503"));
        assert_eq!(item.article_url, article);
        assert_eq!(item.image_url, "https://thumbs.example.org/joconde-320.jpg");
        assert_eq!(item.local_image_path, None);
    }

    #[tokio::test]
    async fn summary_failure_falls_back_to_direct_image() {
        let mut server = mockito::Server::new_async().await;
        let article = format!("{}/wiki/Guernica", server.url());

        let _catalog = server
            .mock("GET", "/sparql")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(sparql_body(
                Some("Guernica"),
                Some("https://upload.example.org/guernica.jpg"),
                None,
                None,
                Some(&article),
            ))
            .create_async()
            .await;
        let _summary = server
            .mock("GET", "/api/rest_v1/page/summary/Guernica")
            .with_status(404)
            .create_async()
            .await;

        let resolver = ArtResolver::new(config_for(&server)).unwrap();
        let item = resolver.resolve_one().await.unwrap();

        assert_eq!(item.image_url, "https://upload.example.org/guernica.jpg");
        assert_eq!(item.artist, None);
        assert_eq!(item.year, None);
    }

    #[tokio::test]
    async fn missing_title_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _catalog = server
            .mock("GET", "/sparql")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(sparql_body(
                None,
                Some("https://upload.example.org/x.jpg"),
                None,
                None,
                Some("https://en.wikipedia.org/wiki/X"),
            ))
            .create_async()
            .await;

        let resolver = ArtResolver::new(config_for(&server)).unwrap();
        assert!(matches!(
            resolver.resolve_one().await,
            Err(ResolveError::MissingField("title"))
        ));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _catalog = server
            .mock("GET", "/sparql")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let resolver = ArtResolver::new(config_for(&server)).unwrap();
        assert!(matches!(
            resolver.resolve_one().await,
            Err(ResolveError::BadStatus(_))
        ));
    }

    #[tokio::test]
    async fn empty_result_set_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _catalog = server
            .mock("GET", "/sparql")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"results":{"bindings":[]}}"#)
            .create_async()
            .await;

        let resolver = ArtResolver::new(config_for(&server)).unwrap();
        assert!(matches!(
            resolver.resolve_one().await,
            Err(ResolveError::MissingField("result"))
        ));
    }

    #[test]
    fn image_url_prefers_summary_thumbnail() {
        let url = select_image_url(
            Some("https://thumbs.example.org/t.jpg"),
            Some("https://upload.example.org/full.jpg"),
            "https://fallback.example.org/safe.jpg",
        );
        assert_eq!(url, "https://thumbs.example.org/t.jpg");
    }

    #[test]
    fn bare_file_title_becomes_a_file_path_url() {
        let url = select_image_url(
            None,
            Some("File:Mona Lisa.jpg"),
            "https://fallback.example.org/safe.jpg",
        );
        assert_eq!(
            url,
            "https://commons.wikimedia.org/wiki/Special:FilePath/Mona%20Lisa.jpg?width=800"
        );
    }

    #[test]
    fn no_image_at_all_uses_the_fallback() {
        let url = select_image_url(None, Some(""), "https://fallback.example.org/safe.jpg");
        assert_eq!(url, "https://fallback.example.org/safe.jpg");
    }
}
