pub mod client;
pub mod common;
pub mod error;
pub mod haproxy;

pub use client::{Client, RetryConfig};
pub use common::OpnsenseApiResource;
pub use error::ApiError;
pub use haproxy::HaproxyApi;
