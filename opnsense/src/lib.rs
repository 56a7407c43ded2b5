//! Terraform provider for the OPNsense HAProxy plugin

pub mod api;
pub mod data_sources;
pub mod haproxy;
pub mod provider_data;
pub mod resources;

pub use provider_data::OpnsenseProviderData;

use async_trait::async_trait;
use std::collections::HashMap;
use tfplug::context::Context;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderSchemaResponse, ResourceFactory,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::StringOneOf;

use crate::data_sources::HaproxyDataSource;
use crate::haproxy::{Backend, DecodeMode, Frontend, HaproxyKind, ListEncoding, Server};
use crate::resources::HaproxyResource;

/// Prefix of every resource and data source type name
pub const TYPE_PREFIX: &str = "opnsense";

const ENV_URI: &str = "OPNSENSE_URI";
const ENV_API_KEY: &str = "OPNSENSE_API_KEY";
const ENV_API_SECRET: &str = "OPNSENSE_API_SECRET";
const ENV_ALLOW_INSECURE: &str = "OPNSENSE_ALLOW_UNVERIFIED_TLS";
const ENV_LIST_ENCODING: &str = "OPNSENSE_LIST_ENCODING";
const ENV_STRICT_DECODING: &str = "OPNSENSE_STRICT_DECODING";

#[derive(Default)]
pub struct OpnsenseProvider;

impl OpnsenseProvider {
    pub fn new() -> Self {
        Self
    }
}

/// A provider argument, falling back to its environment variable when unset.
fn setting(config: &DynamicValue, name: &str, env: &str) -> Option<String> {
    config
        .attribute(name)
        .and_then(Dynamic::as_str)
        .map(str::to_string)
        .or_else(|| std::env::var(env).ok())
        .filter(|v| !v.is_empty())
}

fn flag(config: &DynamicValue, name: &str, env: &str) -> Result<bool, Diagnostic> {
    if let Some(value) = config.attribute(name).and_then(Dynamic::as_bool) {
        return Ok(value);
    }
    match std::env::var(env) {
        Err(_) => Ok(false),
        Ok(raw) => match raw.to_ascii_lowercase().as_str() {
            "" | "0" | "false" => Ok(false),
            "1" | "true" => Ok(true),
            _ => Err(Diagnostic::error(
                format!("Invalid {} value", env),
                format!("Expected true or false, got {:?}", raw),
            )
            .with_attribute(AttributePath::new(name))),
        },
    }
}

fn required(name: &str, env: &str) -> Diagnostic {
    Diagnostic::error(
        format!(
            "{} is required (set in provider config or {} env var)",
            name, env
        ),
        "",
    )
    .with_attribute(AttributePath::new(name))
}

fn resource_entry<K: HaproxyKind>() -> (String, ResourceFactory<OpnsenseProviderData>) {
    (
        format!("{}_{}", TYPE_PREFIX, K::TYPE_SUFFIX),
        Box::new(|| Box::new(HaproxyResource::<K>::new())),
    )
}

fn data_source_entry<K: HaproxyKind>() -> (String, DataSourceFactory<OpnsenseProviderData>) {
    (
        format!("{}_{}", TYPE_PREFIX, K::TYPE_SUFFIX),
        Box::new(|| Box::new(HaproxyDataSource::<K>::new())),
    )
}

#[async_trait]
impl Provider for OpnsenseProvider {
    type ProviderData = OpnsenseProviderData;

    fn type_name(&self) -> &str {
        TYPE_PREFIX
    }

    async fn schema(&self, _ctx: Context) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Manages HAProxy frontends, backends and servers on OPNsense")
            .attribute(
                AttributeBuilder::new("uri", AttributeType::String)
                    .description("Base URL of the OPNsense web interface, e.g. https://192.168.1.1. May also be set with OPNSENSE_URI.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("api_key", AttributeType::String)
                    .description("API key. May also be set with OPNSENSE_API_KEY.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("api_secret", AttributeType::String)
                    .description("API secret. May also be set with OPNSENSE_API_SECRET.")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("allow_insecure", AttributeType::Bool)
                    .description("Skip TLS certificate verification. May also be set with OPNSENSE_ALLOW_UNVERIFIED_TLS.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("list_encoding", AttributeType::String)
                    .description("How multi-valued fields are sent: `comma` (default) or `sequence`. May also be set with OPNSENSE_LIST_ENCODING.")
                    .optional()
                    .validator(StringOneOf::create(&["comma", "sequence"]))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("strict_decoding", AttributeType::Bool)
                    .description("Fail reads on malformed numbers or flags instead of warning. May also be set with OPNSENSE_STRICT_DECODING.")
                    .optional()
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse<OpnsenseProviderData> {
        let config = &request.config;
        let mut diagnostics = vec![];

        let uri = setting(config, "uri", ENV_URI);
        let api_key = setting(config, "api_key", ENV_API_KEY);
        let api_secret = setting(config, "api_secret", ENV_API_SECRET);

        let allow_insecure = flag(config, "allow_insecure", ENV_ALLOW_INSECURE)
            .unwrap_or_else(|diag| {
                diagnostics.push(diag);
                false
            });
        let strict = flag(config, "strict_decoding", ENV_STRICT_DECODING).unwrap_or_else(|diag| {
            diagnostics.push(diag);
            false
        });

        let list_encoding = match setting(config, "list_encoding", ENV_LIST_ENCODING) {
            None => ListEncoding::default(),
            Some(raw) => raw.parse::<ListEncoding>().unwrap_or_else(|e| {
                diagnostics.push(
                    Diagnostic::error("Invalid list_encoding", e)
                        .with_attribute(AttributePath::new("list_encoding")),
                );
                ListEncoding::default()
            }),
        };

        if uri.is_none() {
            diagnostics.push(required("uri", ENV_URI));
        }
        if api_key.is_none() {
            diagnostics.push(required("api_key", ENV_API_KEY));
        }
        if api_secret.is_none() {
            diagnostics.push(required("api_secret", ENV_API_SECRET));
        }

        let (Some(uri), Some(api_key), Some(api_secret)) = (uri, api_key, api_secret) else {
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        };
        if diagnostics.iter().any(Diagnostic::is_error) {
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        }

        let client = match api::Client::new(&uri, &api_key, &api_secret, allow_insecure) {
            Ok(client) => client,
            Err(e) => {
                diagnostics.push(
                    Diagnostic::error(format!("Failed to create API client: {}", e), "")
                        .with_attribute(AttributePath::new("uri")),
                );
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                };
            }
        };

        tracing::debug!(
            "Configured OPNsense client for {} (list encoding {}, insecure {})",
            uri,
            list_encoding,
            allow_insecure
        );

        let decode_mode = if strict {
            DecodeMode::Strict
        } else {
            DecodeMode::Lenient
        };

        ConfigureProviderResponse {
            diagnostics,
            provider_data: Some(
                OpnsenseProviderData::new(client)
                    .with_list_encoding(list_encoding)
                    .with_decode_mode(decode_mode),
            ),
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory<OpnsenseProviderData>> {
        HashMap::from([
            resource_entry::<Frontend>(),
            resource_entry::<Backend>(),
            resource_entry::<Server>(),
        ])
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory<OpnsenseProviderData>> {
        HashMap::from([
            data_source_entry::<Frontend>(),
            data_source_entry::<Backend>(),
            data_source_entry::<Server>(),
        ])
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tfplug::{DataSource, Resource};

    const ALL_ENV: [&str; 6] = [
        ENV_URI,
        ENV_API_KEY,
        ENV_API_SECRET,
        ENV_ALLOW_INSECURE,
        ENV_LIST_ENCODING,
        ENV_STRICT_DECODING,
    ];

    fn clear_env() {
        for var in ALL_ENV {
            std::env::remove_var(var);
        }
    }

    async fn configure(config: DynamicValue) -> ConfigureProviderResponse<OpnsenseProviderData> {
        OpnsenseProvider::new()
            .configure(
                Context::new(),
                ConfigureProviderRequest {
                    terraform_version: "1.9.0".to_string(),
                    config,
                },
            )
            .await
    }

    #[tokio::test]
    #[serial]
    async fn provider_configures_successfully_with_env_vars() {
        clear_env();
        std::env::set_var(ENV_URI, "https://192.168.1.1");
        std::env::set_var(ENV_API_KEY, "key");
        std::env::set_var(ENV_API_SECRET, "secret");
        std::env::set_var(ENV_ALLOW_INSECURE, "true");
        std::env::set_var(ENV_LIST_ENCODING, "sequence");

        let response = configure(DynamicValue::object()).await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);

        let data = response.provider_data.unwrap();
        assert_eq!(data.list_encoding, ListEncoding::Sequence);
        assert_eq!(data.decode_mode, DecodeMode::Lenient);

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_config_overrides_env() {
        clear_env();
        std::env::set_var(ENV_URI, "not a url");
        std::env::set_var(ENV_STRICT_DECODING, "0");

        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new("uri"), "https://fw.example:8443/")
            .unwrap();
        config
            .set_string(&AttributePath::new("api_key"), "key")
            .unwrap();
        config
            .set_string(&AttributePath::new("api_secret"), "secret")
            .unwrap();
        config
            .set_bool(&AttributePath::new("strict_decoding"), true)
            .unwrap();

        let response = configure(config).await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let data = response.provider_data.unwrap();
        assert_eq!(data.decode_mode, DecodeMode::Strict);
        assert_eq!(data.list_encoding, ListEncoding::CommaJoined);

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_reports_every_missing_credential() {
        clear_env();

        let response = configure(DynamicValue::object()).await;
        assert!(response.provider_data.is_none());

        let summaries: Vec<&str> = response
            .diagnostics
            .iter()
            .map(|d| d.summary.as_str())
            .collect();
        assert_eq!(summaries.len(), 3);
        assert!(summaries[0].contains("uri is required"));
        assert!(summaries[1].contains("api_key is required"));
        assert!(summaries[2].contains("api_secret is required"));
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_rejects_bad_uri_and_encoding() {
        clear_env();
        std::env::set_var(ENV_API_KEY, "key");
        std::env::set_var(ENV_API_SECRET, "secret");

        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new("uri"), "ftp://fw.example")
            .unwrap();
        let response = configure(config).await;
        assert!(response.provider_data.is_none());
        assert!(response.diagnostics[0]
            .summary
            .contains("Failed to create API client"));

        std::env::set_var(ENV_URI, "https://fw.example");
        std::env::set_var(ENV_LIST_ENCODING, "semicolon");
        let response = configure(DynamicValue::object()).await;
        assert!(response.provider_data.is_none());
        assert_eq!(response.diagnostics[0].summary, "Invalid list_encoding");

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_rejects_unparseable_insecure_flag() {
        clear_env();
        std::env::set_var(ENV_URI, "https://fw.example");
        std::env::set_var(ENV_API_KEY, "key");
        std::env::set_var(ENV_API_SECRET, "secret");
        std::env::set_var(ENV_ALLOW_INSECURE, "maybe");

        let response = configure(DynamicValue::object()).await;
        assert!(response.provider_data.is_none());
        assert_eq!(
            response.diagnostics[0].attribute,
            Some(AttributePath::new("allow_insecure"))
        );

        clear_env();
    }

    #[test]
    fn provider_registers_every_kind() {
        let provider = OpnsenseProvider::new();

        let mut resources: Vec<String> = provider.resources().into_keys().collect();
        resources.sort();
        assert_eq!(
            resources,
            [
                "opnsense_haproxy_backend",
                "opnsense_haproxy_frontend",
                "opnsense_haproxy_server"
            ]
        );

        for (name, factory) in provider.data_sources() {
            assert_eq!(factory().type_name(), name);
        }
        for (name, factory) in provider.resources() {
            assert_eq!(factory().type_name(), name);
        }
    }

    #[test]
    fn provider_schema_marks_secret_sensitive() {
        let schema = tokio_test::block_on(OpnsenseProvider::new().schema(Context::new())).schema;
        assert!(schema.attribute("api_secret").unwrap().sensitive);
        assert!(!schema.attribute("api_key").unwrap().sensitive);
        assert_eq!(schema.block.attributes.len(), 6);
    }
}
