//! Data source implementations

pub mod haproxy;

pub use haproxy::{BackendDataSource, FrontendDataSource, HaproxyDataSource, ServerDataSource};
