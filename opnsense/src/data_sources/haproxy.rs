//! Read-only lookups of HAProxy objects by id

use async_trait::async_trait;
use std::marker::PhantomData;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
};
use tfplug::types::{AttributePath, Diagnostic};

use crate::haproxy::{decode, Backend, Frontend, HaproxyKind, Server};
use crate::provider_data::OpnsenseProviderData;
use crate::resources::haproxy::warning_diagnostics;

pub type FrontendDataSource = HaproxyDataSource<Frontend>;
pub type BackendDataSource = HaproxyDataSource<Backend>;
pub type ServerDataSource = HaproxyDataSource<Server>;

pub struct HaproxyDataSource<K: HaproxyKind> {
    type_name: String,
    provider_data: Option<OpnsenseProviderData>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: HaproxyKind> HaproxyDataSource<K> {
    pub fn new() -> Self {
        Self {
            type_name: format!("{}_{}", crate::TYPE_PREFIX, K::TYPE_SUFFIX),
            provider_data: None,
            _kind: PhantomData,
        }
    }
}

impl<K: HaproxyKind> Default for HaproxyDataSource<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: HaproxyKind> DataSource for HaproxyDataSource<K> {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    async fn schema(&self, _ctx: Context) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: K::schema().read_only_view(
                &["id"],
                &format!("Reads an existing {} by its UUID.", K::DISPLAY_NAME),
            ),
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut diagnostics = vec![];

        let Some(data) = &self.provider_data else {
            diagnostics.push(Diagnostic::error(
                "Provider not configured",
                "Provider data was not properly configured",
            ));
            return ReadDataSourceResponse {
                state: request.config,
                diagnostics,
            };
        };

        let id = match request.config.get_string(&AttributePath::new("id")) {
            Ok(id) if !id.is_empty() => id,
            _ => {
                diagnostics.push(
                    Diagnostic::error("Missing id", "An id is required to look up the object")
                        .with_attribute(AttributePath::new("id")),
                );
                return ReadDataSourceResponse {
                    state: request.config,
                    diagnostics,
                };
            }
        };

        let remote = match data.client.haproxy().get::<K::Remote>(&id).await {
            Ok(remote) => remote,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Client Error",
                    format!("Unable to read {}, got error: {}", K::DISPLAY_NAME, e),
                ));
                return ReadDataSourceResponse {
                    state: request.config,
                    diagnostics,
                };
            }
        };

        let decoded = match decode::<K>(&remote, data.decode_mode) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::error!("Undecodable {} {}: {}", K::DISPLAY_NAME, id, e);
                diagnostics.push(Diagnostic::error(
                    "Client Error",
                    format!("Unable to read {}, got error: {}", K::DISPLAY_NAME, e),
                ));
                return ReadDataSourceResponse {
                    state: request.config,
                    diagnostics,
                };
            }
        };
        diagnostics.extend(warning_diagnostics(K::DISPLAY_NAME, &decoded.warnings));

        match K::write_model(&decoded.value, &id) {
            Ok(state) => ReadDataSourceResponse { state, diagnostics },
            Err(e) => {
                diagnostics.push(Diagnostic::error("Failed to build state", e.to_string()));
                ReadDataSourceResponse {
                    state: request.config,
                    diagnostics,
                }
            }
        }
    }
}

#[async_trait]
impl<K: HaproxyKind> DataSourceWithConfigure<OpnsenseProviderData> for HaproxyDataSource<K> {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest<OpnsenseProviderData>,
    ) -> ConfigureDataSourceResponse {
        self.provider_data = request.provider_data;
        ConfigureDataSourceResponse {
            diagnostics: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfplug::types::DynamicValue;

    #[tokio::test]
    async fn schema_requires_only_id() {
        let schema = BackendDataSource::new().schema(Context::new()).await.schema;

        let id = schema.attribute("id").unwrap();
        assert!(id.required);
        for attr in schema.block.attributes.iter().filter(|a| a.name != "id") {
            assert!(attr.computed && !attr.optional && !attr.required, "{}", attr.name);
            assert!(attr.default.is_none(), "{}", attr.name);
        }
    }

    #[tokio::test]
    async fn read_requires_id() {
        let mut source = ServerDataSource::new();
        source
            .configure(
                Context::new(),
                ConfigureDataSourceRequest {
                    provider_data: Some(OpnsenseProviderData::new(
                        crate::api::Client::new("https://fw.example", "k", "s", false).unwrap(),
                    )),
                },
            )
            .await;

        let response = source
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "opnsense_haproxy_server".to_string(),
                    config: DynamicValue::object(),
                },
            )
            .await;

        assert_eq!(response.diagnostics[0].summary, "Missing id");
    }
}
