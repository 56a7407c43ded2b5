//! Shared setup for the mock-server integration tests

#![allow(dead_code)]

use opnsense::{OpnsenseProvider, OpnsenseProviderData};
use std::collections::BTreeSet;
use tfplug::context::Context;
use tfplug::provider::{ConfigureProviderRequest, Provider};
use tfplug::types::{AttributePath, DynamicValue};

/// `Basic` credentials for api_key "key" and api_secret "secret"
pub const AUTH_HEADER: &str = "Basic a2V5OnNlY3JldA==";

pub async fn configure_provider(url: &str, list_encoding: &str) -> OpnsenseProviderData {
    let mut config = DynamicValue::object();
    config.set_string(&AttributePath::new("uri"), url).unwrap();
    config
        .set_string(&AttributePath::new("api_key"), "key")
        .unwrap();
    config
        .set_string(&AttributePath::new("api_secret"), "secret")
        .unwrap();
    config
        .set_bool(&AttributePath::new("allow_insecure"), false)
        .unwrap();
    config
        .set_bool(&AttributePath::new("strict_decoding"), false)
        .unwrap();
    config
        .set_string(&AttributePath::new("list_encoding"), list_encoding)
        .unwrap();

    let response = OpnsenseProvider::new()
        .configure(
            Context::new(),
            ConfigureProviderRequest {
                terraform_version: "1.9.0".to_string(),
                config,
            },
        )
        .await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    response.provider_data.unwrap()
}

pub fn strings(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}
