pub mod crawler;
pub mod engine;
pub mod web;

pub use crawler::Fetcher;
pub use engine::ContinuationEngine;
pub use web::WebFetcher;
