use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::{header, Client, StatusCode};
use url::Url;

use crate::{configuration::ScraperSettings, domain::site::Site};

use super::job_scraper::ScrapeError;

/// Downloads one result page from a board.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, site: Site, url: Url) -> Result<String, ScrapeError>;
}

/// Fetches pages over HTTP with a fresh user agent per request and an
/// optional rotating proxy.
pub struct HttpFetcher {
    client: Client,
    proxies: Vec<String>,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(settings: &ScraperSettings) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .cookie_store(true)
            .build()
            .map_err(ScrapeError::Client)?;

        Ok(HttpFetcher {
            client,
            proxies: settings.proxies.clone(),
            timeout: settings.request_timeout(),
        })
    }

    /// The shared client, or a fresh one behind a random proxy when proxies
    /// are configured.
    fn client(&self) -> Result<Client, ScrapeError> {
        let Some(proxy) = self.proxies.choose(&mut rand::thread_rng()) else {
            return Ok(self.client.clone());
        };

        let http_proxy = reqwest::Proxy::http(proxy).map_err(ScrapeError::Client)?;
        let https_proxy = reqwest::Proxy::https(proxy).map_err(ScrapeError::Client)?;
        Client::builder()
            .proxy(http_proxy)
            .proxy(https_proxy)
            .timeout(self.timeout)
            .build()
            .map_err(ScrapeError::Client)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, site: Site, url: Url) -> Result<String, ScrapeError> {
        log::info!("Fetching {}", url);

        let response = self
            .client()?
            .get(url)
            .header(header::USER_AGENT, fake_user_agent::get_rua())
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|source| ScrapeError::Network { site, source })?;

        match response.status() {
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Err(ScrapeError::Blocked {
                site,
                reason: format!("HTTP {}", response.status().as_u16()),
            }),
            status if !status.is_success() => Err(ScrapeError::Status {
                site,
                status: status.as_u16(),
            }),
            _ => response
                .text()
                .await
                .map_err(|source| ScrapeError::Network { site, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use actix_web::{web, App, HttpResponse, HttpServer};
    use url::Url;

    use crate::{
        configuration::ScraperSettings,
        domain::site::Site,
        services::job_scraper::ScrapeError,
    };

    use super::{HttpFetcher, PageFetcher};

    fn settings(proxies: Vec<String>) -> ScraperSettings {
        ScraperSettings {
            request_timeout_secs: 5,
            min_delay_ms: 0,
            max_pages: 1,
            default_results_wanted: 20,
            proxies,
            breaker_failure_threshold: 5,
            breaker_cooldown_secs: 300,
        }
    }

    /// Serves canned board answers on a random local port.
    fn spawn_board() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let server = HttpServer::new(|| {
            App::new()
                .route("/ok", web::get().to(|| async { HttpResponse::Ok().body("<ul></ul>") }))
                .route("/forbidden", web::get().to(|| async { HttpResponse::Forbidden().finish() }))
                .route(
                    "/busy",
                    web::get().to(|| async { HttpResponse::TooManyRequests().finish() }),
                )
                .route(
                    "/broken",
                    web::get().to(|| async { HttpResponse::InternalServerError().finish() }),
                )
        })
        .workers(1)
        .listen(listener)
        .expect("Failed to listen")
        .run();
        let _ = tokio::spawn(server);
        format!("http://127.0.0.1:{}", port)
    }

    async fn fetch(base: &str, path: &str) -> Result<String, ScrapeError> {
        let fetcher = HttpFetcher::new(&settings(vec![])).unwrap();
        let url = Url::parse(&format!("{}{}", base, path)).unwrap();
        fetcher.fetch(Site::Indeed, url).await
    }

    #[test]
    fn proxied_client_is_built_from_settings() {
        let fetcher = HttpFetcher::new(&settings(vec!["http://127.0.0.1:3128".to_string()])).unwrap();
        assert!(fetcher.client().is_ok());
    }

    #[tokio::test]
    async fn successful_page_body_is_returned() {
        let base = spawn_board();
        assert_eq!(fetch(&base, "/ok").await.unwrap(), "<ul></ul>");
    }

    #[tokio::test]
    async fn forbidden_and_rate_limited_mean_blocked() {
        let base = spawn_board();

        match fetch(&base, "/forbidden").await {
            Err(ScrapeError::Blocked { site, reason }) => {
                assert_eq!(site, Site::Indeed);
                assert_eq!(reason, "HTTP 403");
            }
            other => panic!("expected Blocked, got {:?}", other),
        }
        assert!(matches!(
            fetch(&base, "/busy").await,
            Err(ScrapeError::Blocked { reason, .. }) if reason == "HTTP 429"
        ));
    }

    #[tokio::test]
    async fn other_error_statuses_are_reported() {
        let base = spawn_board();
        assert!(matches!(
            fetch(&base, "/broken").await,
            Err(ScrapeError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn unreachable_board_is_a_network_error() {
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();

        let e = fetch(&format!("http://127.0.0.1:{}", port), "/jobs?q=secret").await.unwrap_err();

        assert!(matches!(e, ScrapeError::Network { .. }));
        assert!(e.is_board_failure());
        let message = e.user_message();
        assert!(message.starts_with("Could not connect to Indeed"));
        assert!(!message.contains("127.0.0.1"));
        assert!(!message.contains("secret"));
    }
}
