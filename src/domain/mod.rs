pub mod country;
pub mod display;
pub mod job;
pub mod remote;
pub mod search;
pub mod site;
pub mod time_filter;
