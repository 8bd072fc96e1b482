pub mod analytics_http;

pub use analytics_http::HttpAnalyticsClient;
