pub mod board_scraper;
pub mod boards;
pub mod circuit_breaker;
pub mod job_scraper;
pub mod page_fetcher;
pub mod rate_limiter;
pub mod search_service;
pub mod session_store;

pub use board_scraper::*;
pub use circuit_breaker::*;
pub use job_scraper::*;
pub use page_fetcher::*;
pub use rate_limiter::*;
pub use search_service::*;
pub use session_store::*;
