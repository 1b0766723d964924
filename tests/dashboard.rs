use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use actix_web::{cookie::Cookie, test, web::Data, App};
use async_trait::async_trait;
use jobs_dash::{
    configuration::{CacheSettings, SessionSettings},
    domain::{
        job::{JobListing, JobType},
        site::Site,
    },
    routes::{dashboard_route, health_route},
    services::{JobScraper, ScrapeError, ScrapeRequest, SearchService, SessionStore, SESSION_COOKIE},
};

/// Stands in for the job boards: returns `per_site` listings for every
/// requested site, or a connection error while `offline` is set.
#[derive(Default)]
struct FakeScraper {
    per_site: usize,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl FakeScraper {
    fn with_listings(per_site: usize) -> Arc<Self> {
        Arc::new(FakeScraper {
            per_site,
            ..Default::default()
        })
    }
}

#[async_trait]
impl JobScraper for FakeScraper {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<Vec<JobListing>, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(ScrapeError::Status {
                site: request.site,
                status: 503,
            });
        }

        let today = chrono::Local::now().date_naive();
        Ok((0..self.per_site)
            .map(|i| JobListing {
                title: format!("{} #{}", request.search_term, i),
                company: format!("Company {}", i),
                location: "San Francisco, CA".to_string(),
                // Every third posting comes without a date.
                date_posted: (i % 3 != 0).then_some(today),
                description: Some("Write software.".to_string()),
                salary: (i == 1).then(|| "$150,000 - $200,000".to_string()),
                job_url: format!("https://{}.example/{}/{}", request.site.tag(), request.search_term, i),
                source: request.site,
                job_type: if i == 2 { JobType::Contract } else { JobType::FullTime },
                is_remote: i == 3,
            })
            .collect())
    }
}

macro_rules! init_app {
    ($scraper:expr) => {{
        let search_service = SearchService::new(
            $scraper.clone(),
            &CacheSettings {
                ttl_secs: 60,
                capacity: 16,
            },
            20,
        );
        let session_store = SessionStore::new(&SessionSettings {
            idle_ttl_secs: 60,
            capacity: 16,
        });
        test::init_service(
            App::new()
                .app_data(Data::new(search_service))
                .app_data(Data::new(session_store))
                .service(health_route::health_check)
                .service(dashboard_route::dashboard)
                .service(dashboard_route::search),
        )
        .await
    }};
}

fn search_form<'a>(term: &'a str, sites: &[&'a str], results_wanted: &'a str) -> Vec<(&'a str, &'a str)> {
    let mut form = vec![
        ("search_term", term),
        ("location", "San Francisco, CA"),
        ("country", "United States"),
        ("results_wanted", results_wanted),
        ("time_filter", "Any"),
    ];
    form.extend(sites.iter().map(|s| ("site", *s)));
    form
}

async fn body_of(resp: actix_web::dev::ServiceResponse) -> String {
    String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
}

fn session_cookie(resp: &actix_web::dev::ServiceResponse) -> Cookie<'static> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
        .expect("session cookie was not set")
}

#[actix_web::test]
async fn health_check_works() {
    let app = init_app!(FakeScraper::with_listings(0));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health_check").to_request()).await;

    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn first_visit_sets_cookie_and_prefills_form() {
    let app = init_app!(FakeScraper::with_listings(0));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert!(resp.status().is_success());
    let _ = session_cookie(&resp);
    let body = body_of(resp).await;
    assert!(body.contains(r#"value="Software Engineer""#));
    assert!(body.contains(r#"value="indeed" checked"#));
}

#[actix_web::test]
async fn empty_search_term_is_rejected_without_scraping() {
    let scraper = FakeScraper::with_listings(5);
    let app = init_app!(scraper);

    let req = test::TestRequest::post()
        .uri("/search")
        .set_form(search_form("   ", &["linkedin"], "10"))
        .to_request();
    let body = body_of(test::call_service(&app, req).await).await;

    assert!(body.contains("Please enter a search term"));
    assert!(!body.contains("jobs visible"));
    assert_eq!(scraper.calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn linkedin_search_is_capped_and_rerendered() {
    let app = init_app!(FakeScraper::with_listings(15));

    let req = test::TestRequest::post()
        .uri("/search")
        .set_form(search_form("Software Engineer", &["linkedin"], "10"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = session_cookie(&resp);
    let body = body_of(resp).await;

    assert!(body.contains("10 of 10 jobs visible"));
    assert_eq!(body.matches("<td>linkedin</td>").count(), 10);
    assert_eq!(body.matches("View Job").count(), 10);
    assert_eq!(body.matches(r#"<span class="badge">Remote</span>"#).count(), 1);

    // A plain reload shows the same stored results.
    let req = test::TestRequest::get().uri("/").cookie(cookie).to_request();
    let reloaded = body_of(test::call_service(&app, req).await).await;
    assert!(reloaded.contains("10 of 10 jobs visible"));
    assert_eq!(reloaded.matches("<td>linkedin</td>").count(), 10);
}

#[actix_web::test]
async fn missing_posting_date_renders_as_not_available() {
    let app = init_app!(FakeScraper::with_listings(2));

    let req = test::TestRequest::post()
        .uri("/search")
        .set_form(search_form("Software Engineer", &["indeed"], "10"))
        .to_request();
    let body = body_of(test::call_service(&app, req).await).await;

    assert!(body.contains("<td>Today</td>"));
    assert!(body.contains("<td>N/A</td>"));
    assert!(body.contains("Company 0"));
}

#[actix_web::test]
async fn connectivity_error_keeps_previous_results() {
    let scraper = FakeScraper::with_listings(3);
    let app = init_app!(scraper);

    let req = test::TestRequest::post()
        .uri("/search")
        .set_form(search_form("Software Engineer", &["indeed"], "10"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = session_cookie(&resp);

    scraper.offline.store(true, Ordering::SeqCst);
    let req = test::TestRequest::post()
        .uri("/search")
        .cookie(cookie.clone())
        .set_form(search_form("Data Engineer", &["indeed"], "10"))
        .to_request();
    let body = body_of(test::call_service(&app, req).await).await;

    assert!(body.contains("Error during search"));
    assert!(body.contains("HTTP 503"));
    assert!(!body.contains("answered with"));
    assert!(body.contains("3 of 3 jobs visible"));
    assert!(body.contains("Software Engineer #0"));

    let req = test::TestRequest::get().uri("/").cookie(cookie).to_request();
    let reloaded = body_of(test::call_service(&app, req).await).await;
    assert!(reloaded.contains("Software Engineer #0"));
    assert!(!reloaded.contains("Error during search"));
}

#[actix_web::test]
async fn empty_results_show_no_jobs_found() {
    let app = init_app!(FakeScraper::with_listings(0));

    let req = test::TestRequest::post()
        .uri("/search")
        .set_form(search_form("Underwater Basket Weaver", &["indeed", "glassdoor"], "10"))
        .to_request();
    let body = body_of(test::call_service(&app, req).await).await;

    assert!(body.contains("No jobs found"));
    assert!(body.contains("0 of 0 jobs visible"));
    assert!(!body.contains("<table>"));
}

#[actix_web::test]
async fn post_filters_do_not_scrape_again() {
    let scraper = FakeScraper::with_listings(4);
    let app = init_app!(scraper);

    let req = test::TestRequest::post()
        .uri("/search")
        .set_form(search_form("Software Engineer", &["indeed"], "10"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = session_cookie(&resp);
    let calls = scraper.calls.load(Ordering::SeqCst);

    let req = test::TestRequest::get()
        .uri("/?job_type=Contract")
        .cookie(cookie.clone())
        .to_request();
    let body = body_of(test::call_service(&app, req).await).await;
    assert!(body.contains("1 of 4 jobs visible"));
    assert!(body.contains("Software Engineer #2"));
    assert!(!body.contains(r#"<span class="badge">Remote</span>"#));

    let req = test::TestRequest::get()
        .uri("/?salary=150k%2B")
        .cookie(cookie)
        .to_request();
    let body = body_of(test::call_service(&app, req).await).await;
    assert!(body.contains("1 of 4 jobs visible"));
    assert!(body.contains("$150,000 - $200,000"));

    assert_eq!(scraper.calls.load(Ordering::SeqCst), calls);
}

#[actix_web::test]
async fn sessions_do_not_share_results() {
    let app = init_app!(FakeScraper::with_listings(2));

    let req = test::TestRequest::post()
        .uri("/search")
        .set_form(search_form("Software Engineer", &["indeed"], "10"))
        .to_request();
    test::call_service(&app, req).await;

    let body = body_of(test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await).await;
    assert!(!body.contains("jobs visible"));
}
