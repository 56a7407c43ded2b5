//! Resource implementations

pub mod haproxy;

pub use haproxy::{BackendResource, FrontendResource, HaproxyResource, ServerResource};
