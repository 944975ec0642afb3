pub mod api;
pub mod constants;
pub mod fetch;

pub use api::{router, AppState};
pub use fetch::HttpChainFetcher;
