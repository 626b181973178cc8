//service/mod.rs
pub mod quote_service;
pub mod request_context;

pub use quote_service::{Quote, QuoteService, Submission};
pub use request_context::RequestContext;
