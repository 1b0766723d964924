pub mod dashboard_route;
pub mod health_route;
