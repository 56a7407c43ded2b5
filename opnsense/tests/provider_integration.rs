mod common;

use common::{configure_provider, strings, AUTH_HEADER};
use mockito::Server;
use opnsense::OpnsenseProvider;
use serde_json::json;
use tfplug::context::Context;
use tfplug::data_source::{ConfigureDataSourceRequest, DataSource, ReadDataSourceRequest};
use tfplug::provider::Provider;
use tfplug::types::{AttributePath, DynamicValue};

async fn data_source(
    url: &str,
    type_name: &str,
) -> Box<dyn tfplug::DataSourceWithConfigure<opnsense::OpnsenseProviderData>> {
    let data = configure_provider(url, "comma").await;
    let factories = OpnsenseProvider::new().data_sources();
    let mut source = factories.get(type_name).unwrap()();
    let response = source
        .configure(
            Context::new(),
            ConfigureDataSourceRequest {
                provider_data: Some(data),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    source
}

fn lookup(id: &str) -> DynamicValue {
    let mut config = DynamicValue::object();
    config.set_string(&AttributePath::new("id"), id).unwrap();
    config
}

#[tokio::test(flavor = "multi_thread")]
async fn frontend_data_source_reads_by_id() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/haproxy/settings/getFrontend/f-1")
        .match_header("authorization", AUTH_HEADER)
        .with_body(
            json!({
                "frontend": {
                    "name": "https_in",
                    "enabled": "1",
                    "bind": "0.0.0.0:443,[::]:443",
                    "mode": {
                        "http": {"value": "HTTP / HTTPS (SSL offloading)", "selected": 0},
                        "ssl": {"value": "SSL / HTTPS (TCP mode)", "selected": 1},
                        "tcp": {"value": "TCP", "selected": 0}
                    },
                    "advertised_protocols": {
                        "h2": {"value": "HTTP/2", "selected": 1},
                        "http11": {"value": "HTTP/1.1", "selected": 1},
                        "http10": {"value": "HTTP/1.0", "selected": 0}
                    },
                    "ssl_hstsMaxAge": "15768000",
                    "tuning_maxConnections": ""
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let source = data_source(&server.url(), "opnsense_haproxy_frontend").await;
    let response = source
        .read(
            Context::new(),
            ReadDataSourceRequest {
                type_name: "opnsense_haproxy_frontend".to_string(),
                config: lookup("f-1"),
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    mock.assert_async().await;

    let state = response.state;
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "f-1");
    assert_eq!(state.get_string(&AttributePath::new("mode")).unwrap(), "ssl");
    assert_eq!(
        state
            .get_string_set(&AttributePath::new("bind"))
            .unwrap(),
        strings(&["0.0.0.0:443", "[::]:443"])
    );
    assert_eq!(
        state
            .get_string_set(&AttributePath::new("advertised_protocols"))
            .unwrap(),
        strings(&["h2", "http11"])
    );
    assert_eq!(
        state
            .get_i64(&AttributePath::new("tuning_max_connections"))
            .unwrap(),
        -1
    );
    assert!(state.get_bool(&AttributePath::new("enabled")).unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn data_source_fails_for_missing_object() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/haproxy/settings/getBackend/nope")
        .with_status(404)
        .create_async()
        .await;

    let source = data_source(&server.url(), "opnsense_haproxy_backend").await;
    let response = source
        .read(
            Context::new(),
            ReadDataSourceRequest {
                type_name: "opnsense_haproxy_backend".to_string(),
                config: lookup("nope"),
            },
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert!(response.diagnostics[0].is_error());
    assert!(response.diagnostics[0].detail.contains("not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn auth_failure_is_reported() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/haproxy/settings/getServer/s-1")
        .with_status(401)
        .create_async()
        .await;

    let source = data_source(&server.url(), "opnsense_haproxy_server").await;
    let response = source
        .read(
            Context::new(),
            ReadDataSourceRequest {
                type_name: "opnsense_haproxy_server".to_string(),
                config: lookup("s-1"),
            },
        )
        .await;

    assert!(response.diagnostics[0].detail.contains("Authentication failed"));
}

#[tokio::test]
async fn data_source_validate_rejects_defaulted_attributes() {
    let factories = OpnsenseProvider::new().data_sources();
    let source = factories.get("opnsense_haproxy_server").unwrap()();

    let mut config = lookup("s-1");
    config
        .set_string(&AttributePath::new("address"), "10.0.0.1")
        .unwrap();

    let response = source
        .validate(
            Context::new(),
            tfplug::data_source::ValidateDataSourceConfigRequest {
                type_name: "opnsense_haproxy_server".to_string(),
                config,
            },
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Invalid configuration");
}
