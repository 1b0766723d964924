use actix_web::{
    cookie::{Cookie, SameSite},
    get, post, web, HttpRequest, HttpResponse,
};
use askama::Template;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    domain::{
        country::{country_options, global_countries_display, Where},
        display::{
            format_posted_date, sort_for_display, truncate_description, ResultFilters, SalaryRange,
            DESCRIPTION_PREVIEW_CHARS, NOT_AVAILABLE,
        },
        job::{JobListing, JobType},
        search::{SearchForm, DEFAULT_SEARCH_TERM},
        site::Site,
        time_filter::TimeFilter,
    },
    services::{
        run_search, SearchOutcome, SearchResults, SearchService, SessionId, SessionState,
        SessionStore, SESSION_COOKIE,
    },
};

pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn new(value: &str, label: &str, selected: bool) -> Self {
        SelectOption {
            value: value.to_string(),
            label: label.to_string(),
            selected,
        }
    }
}

pub struct Notice {
    /// info, warning or error
    pub level: &'static str,
    pub message: String,
}

impl Notice {
    fn from_outcome(outcome: &SearchOutcome) -> Option<Notice> {
        match outcome {
            SearchOutcome::Results(_) => None,
            SearchOutcome::Empty => Some(Notice {
                level: "info",
                message: "No jobs found. Try different search terms or location.".to_string(),
            }),
            SearchOutcome::Rejected(e) => Some(Notice {
                level: "error",
                message: e.to_string(),
            }),
            SearchOutcome::Failed(e) => Some(Notice {
                level: "warning",
                message: format!("Error during search: {}", e.user_message()),
            }),
        }
    }
}

pub struct JobRow {
    pub title: String,
    pub job_type: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub posted: String,
    pub description: String,
    pub source: &'static str,
    pub job_url: String,
    pub remote: bool,
}

impl JobRow {
    fn new(listing: &JobListing, today: NaiveDate) -> Self {
        fn or_na(value: &str) -> String {
            match value.trim() {
                "" => NOT_AVAILABLE.to_string(),
                v => v.to_string(),
            }
        }

        JobRow {
            title: or_na(&listing.title),
            job_type: listing.job_type.label().to_string(),
            company: or_na(&listing.company),
            location: or_na(&listing.location),
            salary: or_na(listing.salary.as_deref().unwrap_or_default()),
            posted: format_posted_date(listing.date_posted, today),
            description: or_na(&truncate_description(
                listing.description.as_deref().unwrap_or_default(),
                DESCRIPTION_PREVIEW_CHARS,
            )),
            source: listing.source.tag(),
            job_url: listing.job_url.clone(),
            remote: listing.is_remote,
        }
    }
}

pub struct ResultsView {
    pub rows: Vec<JobRow>,
    pub total: usize,
    pub filtered: bool,
    pub query: String,
    pub location: String,
    pub posting_age: &'static str,
    pub search_seconds: String,
    pub countries: String,
    pub failed_requests: usize,
    pub location_options: Vec<SelectOption>,
}

impl ResultsView {
    fn new(results: &SearchResults, filters: &ResultFilters, today: NaiveDate) -> Self {
        let mut visible: Vec<&JobListing> = results.listings.iter().filter(|l| filters.matches(l)).collect();
        sort_for_display(&mut visible);

        let mut locations: Vec<&str> = results
            .listings
            .iter()
            .map(|l| l.location.as_str())
            .filter(|l| !l.is_empty())
            .collect();
        locations.sort_unstable();
        locations.dedup();

        let params = &results.params;
        ResultsView {
            rows: visible.into_iter().map(|l| JobRow::new(l, today)).collect(),
            total: results.listings.len(),
            filtered: filters.is_active(),
            query: params.search_term.clone(),
            location: params
                .location
                .clone()
                .unwrap_or_else(|| params.country.label().to_string()),
            posting_age: params.time_filter.label(),
            search_seconds: format!("{:.1}", results.elapsed.as_secs_f64()),
            countries: results.countries_searched.join(", "),
            failed_requests: results.failed_requests,
            location_options: locations
                .into_iter()
                .map(|l| SelectOption::new(l, l, filters.location.as_deref() == Some(l)))
                .collect(),
        }
    }
}

/// Post-filter values from the query string of `GET /`.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub title: Option<String>,
    pub exclude: Option<String>,
    pub salary: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
}

impl FilterQuery {
    fn filters(&self) -> ResultFilters {
        ResultFilters::new(
            self.title.as_deref(),
            self.exclude.as_deref(),
            self.salary.as_deref(),
            self.location.as_deref(),
            self.job_type.as_deref(),
        )
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    search_term: String,
    location: String,
    results_wanted: String,
    remote_only: bool,
    country_options: Vec<SelectOption>,
    site_options: Vec<SelectOption>,
    time_filter_options: Vec<SelectOption>,
    global_countries: String,
    notice: Option<Notice>,
    results: Option<ResultsView>,
    filter_title: String,
    filter_exclude: String,
    salary_options: Vec<SelectOption>,
    job_type_options: Vec<SelectOption>,
}

impl DashboardTemplate {
    fn new(
        state: &SessionState,
        form: Option<&SearchForm>,
        notice: Option<Notice>,
        query: &FilterQuery,
        default_results_wanted: u32,
    ) -> Self {
        let form = form.cloned().unwrap_or_else(|| match &state.last_params {
            Some(params) => params.to_form(),
            None => SearchForm {
                search_term: DEFAULT_SEARCH_TERM.to_string(),
                sites: vec![Site::Indeed.tag().to_string()],
                results_wanted: default_results_wanted.to_string(),
                ..Default::default()
            },
        });

        let filters = query.filters();
        let today = chrono::Local::now().date_naive();
        let country = match form.country.trim() {
            "" => Where::GLOBAL_LABEL,
            c => c,
        };
        let time_filter = TimeFilter::parse(&form.time_filter).unwrap_or_default();

        DashboardTemplate {
            country_options: country_options()
                .into_iter()
                .map(|c| SelectOption::new(c, c, c == country))
                .collect(),
            site_options: Site::ALL
                .into_iter()
                .map(|s| SelectOption::new(s.tag(), s.display_name(), form.sites.iter().any(|f| f.as_str() == s.tag())))
                .collect(),
            time_filter_options: TimeFilter::ALL
                .into_iter()
                .map(|t| SelectOption::new(t.label(), t.label(), t == time_filter))
                .collect(),
            global_countries: global_countries_display(),
            results: state
                .results
                .as_ref()
                .map(|r| ResultsView::new(r, &filters, today)),
            filter_title: query.title.clone().unwrap_or_default(),
            filter_exclude: query.exclude.clone().unwrap_or_default(),
            salary_options: SalaryRange::ALL
                .into_iter()
                .map(|r| SelectOption::new(r.key(), r.label(), filters.salary_range == Some(r)))
                .collect(),
            job_type_options: JobType::ALL
                .into_iter()
                .map(|t| SelectOption::new(t.label(), t.label(), filters.job_type == Some(t)))
                .collect(),
            search_term: form.search_term,
            location: form.location,
            results_wanted: form.results_wanted,
            remote_only: form.remote_only,
            notice,
        }
    }
}

/// Session id from the request cookie, or a fresh one to be set on the response.
fn session_id(req: &HttpRequest) -> (SessionId, bool) {
    match req
        .cookie(SESSION_COOKIE)
        .and_then(|c| c.value().parse::<SessionId>().ok())
    {
        Some(id) => (id, false),
        None => (SessionId::generate(), true),
    }
}

fn render(template: DashboardTemplate, session: SessionId, is_new: bool) -> HttpResponse {
    let body = match template.render() {
        Ok(body) => body,
        Err(e) => {
            log::error!("Failed to render dashboard: {:?}", e);
            return HttpResponse::InternalServerError().body("Failed to render dashboard");
        }
    };

    let mut response = HttpResponse::Ok();
    response.content_type("text/html; charset=utf-8");
    if is_new {
        response.cookie(
            Cookie::build(SESSION_COOKIE, session.to_string())
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .finish(),
        );
    }
    response.body(body)
}

#[get("/")]
pub async fn dashboard(
    req: HttpRequest,
    sessions: web::Data<SessionStore>,
    search_service: web::Data<SearchService>,
    query: web::Query<FilterQuery>,
) -> HttpResponse {
    let (session, is_new) = session_id(&req);
    let state = sessions.get(&session);

    let template = DashboardTemplate::new(
        &state,
        None,
        None,
        &query,
        search_service.default_results_wanted(),
    );
    render(template, session, is_new)
}

#[post("/search")]
pub async fn search(
    req: HttpRequest,
    sessions: web::Data<SessionStore>,
    search_service: web::Data<SearchService>,
    body: web::Form<Vec<(String, String)>>,
) -> HttpResponse {
    let (session, is_new) = session_id(&req);
    let form = SearchForm::from_pairs(body.into_inner());

    let (state, outcome) = run_search(sessions.get(&session), &form, &search_service).await;
    if let SearchOutcome::Results(n) = outcome {
        log::info!("Session {} found {} jobs", session, n);
    }
    sessions.put(session, state.clone());

    // Rejected or failed input is echoed back as typed.
    let echoed = match &outcome {
        SearchOutcome::Rejected(_) | SearchOutcome::Failed(_) => Some(&form),
        _ => None,
    };
    let template = DashboardTemplate::new(
        &state,
        echoed,
        Notice::from_outcome(&outcome),
        &FilterQuery::default(),
        search_service.default_results_wanted(),
    );
    render(template, session, is_new)
}
