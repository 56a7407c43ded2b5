//! HAProxy frontend, backend and server resources
//!
//! One generic resource drives all three kinds. The kind supplies the
//! schema and the conversions; the resource turns Terraform lifecycle calls
//! into add/get/set/del requests followed by a service reconfigure.

use async_trait::async_trait;
use std::marker::PhantomData;
use tfplug::context::Context;
use tfplug::import::import_state_passthrough_id;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaResponse, ResourceWithConfigure,
    UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

use crate::api::ApiError;
use crate::haproxy::state::StateReader;
use crate::haproxy::{decode, Backend, CodecWarning, Frontend, HaproxyKind, Server};
use crate::provider_data::OpnsenseProviderData;

pub type FrontendResource = HaproxyResource<Frontend>;
pub type BackendResource = HaproxyResource<Backend>;
pub type ServerResource = HaproxyResource<Server>;

pub struct HaproxyResource<K: HaproxyKind> {
    type_name: String,
    provider_data: Option<OpnsenseProviderData>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: HaproxyKind> HaproxyResource<K> {
    pub fn new() -> Self {
        Self {
            type_name: format!("{}_{}", crate::TYPE_PREFIX, K::TYPE_SUFFIX),
            provider_data: None,
            _kind: PhantomData,
        }
    }

    fn provider_data(&self) -> Result<&OpnsenseProviderData, Diagnostic> {
        self.provider_data.as_ref().ok_or_else(|| {
            Diagnostic::error(
                "Provider not configured",
                "Provider data was not properly configured",
            )
        })
    }

    fn client_error(&self, action: &str, err: &ApiError) -> Diagnostic {
        Diagnostic::error(
            "Client Error",
            format!("Unable to {} {}, got error: {}", action, K::DISPLAY_NAME, err),
        )
    }

    /// Applies saved changes. A failure here leaves the object saved but not
    /// active, which the caller reports without discarding state.
    async fn reconfigure(&self, data: &OpnsenseProviderData) -> Option<Diagnostic> {
        match data.client.haproxy().reconfigure().await {
            Ok(()) => None,
            Err(e) => Some(Diagnostic::error(
                "HAProxy reconfigure failed",
                format!(
                    "The {} was saved but the service could not apply it: {}",
                    K::DISPLAY_NAME,
                    e
                ),
            )),
        }
    }
}

impl<K: HaproxyKind> Default for HaproxyResource<K> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn warning_diagnostics(kind: &str, warnings: &[CodecWarning]) -> Vec<Diagnostic> {
    warnings
        .iter()
        .map(|w| {
            Diagnostic::warning(
                format!("Unexpected value in {}", kind),
                w.to_string(),
            )
        })
        .collect()
}

/// Fallback state for an object that exists remotely but whose model could
/// not be written back. Carries at least the id so the object stays tracked.
fn state_with_id(mut state: DynamicValue, id: &str) -> DynamicValue {
    if let Err(e) = state.set_string(&AttributePath::new("id"), id) {
        tracing::error!("Unable to record id {} in state: {}", id, e);
    }
    state
}

#[async_trait]
impl<K: HaproxyKind> Resource for HaproxyResource<K> {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    async fn schema(&self, _ctx: Context) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: K::schema(),
            diagnostics: vec![],
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = vec![];

        let data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics: vec![diag],
                }
            }
        };

        let model = match K::read_model(&request.planned_state) {
            Ok(model) => model,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Invalid planned state",
                    format!("Unable to parse {}, got error: {}", K::DISPLAY_NAME, e),
                ));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        if ctx.is_cancelled() {
            diagnostics.push(Diagnostic::error(
                "Operation cancelled",
                format!("Create of {} was cancelled", K::DISPLAY_NAME),
            ));
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        }

        let remote = K::to_remote(&model, data.list_encoding);
        let id = match data.client.haproxy().add(&remote).await {
            Ok(id) => id,
            Err(e) => {
                diagnostics.push(self.client_error("create", &e));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };
        tracing::debug!("Created {} {}", self.type_name, id);

        diagnostics.extend(self.reconfigure(data).await);

        let new_state = match K::write_model(&model, &id) {
            Ok(state) => state,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to build state",
                    format!("{} {} was created but its state could not be written: {}", K::DISPLAY_NAME, id, e),
                ));
                state_with_id(request.planned_state, &id)
            }
        };

        CreateResourceResponse {
            new_state,
            diagnostics,
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![diag],
                }
            }
        };

        let id = match StateReader::new(&request.current_state).id() {
            Some(id) => id,
            None => {
                diagnostics.push(
                    Diagnostic::error("Missing id", "Cannot read a resource without an id")
                        .with_attribute(AttributePath::new("id")),
                );
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                };
            }
        };

        let remote = match data.client.haproxy().get::<K::Remote>(&id).await {
            Ok(remote) => remote,
            Err(e) if e.is_not_found() => {
                tracing::warn!(
                    "{} {} not present in remote, removing from state",
                    K::DISPLAY_NAME,
                    id
                );
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                };
            }
            Err(e) => {
                diagnostics.push(self.client_error("read", &e));
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                };
            }
        };

        let decoded = match decode::<K>(&remote, data.decode_mode) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::error!("Undecodable {} {}: {}", K::DISPLAY_NAME, id, e);
                diagnostics.push(self.client_error("read", &ApiError::ParseError(e.to_string())));
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                };
            }
        };
        diagnostics.extend(warning_diagnostics(K::DISPLAY_NAME, &decoded.warnings));

        match K::write_model(&decoded.value, &id) {
            Ok(state) => ReadResourceResponse {
                new_state: Some(state),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to build state",
                    e.to_string(),
                ));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                }
            }
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut diagnostics = vec![];

        let data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics: vec![diag],
                }
            }
        };

        let id = StateReader::new(&request.prior_state)
            .id()
            .or_else(|| StateReader::new(&request.planned_state).id());
        let id = match id {
            Some(id) => id,
            None => {
                diagnostics.push(
                    Diagnostic::error("Missing id", "Cannot update a resource without an id")
                        .with_attribute(AttributePath::new("id")),
                );
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let model = match K::read_model(&request.planned_state) {
            Ok(model) => model,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Invalid planned state",
                    format!("Unable to parse {}, got error: {}", K::DISPLAY_NAME, e),
                ));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        if ctx.is_cancelled() {
            diagnostics.push(Diagnostic::error(
                "Operation cancelled",
                format!("Update of {} {} was cancelled", K::DISPLAY_NAME, id),
            ));
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics,
            };
        }

        let remote = K::to_remote(&model, data.list_encoding);
        if let Err(e) = data.client.haproxy().set(&id, &remote).await {
            diagnostics.push(self.client_error("update", &e));
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics,
            };
        }
        tracing::debug!("Updated {} {}", self.type_name, id);

        diagnostics.extend(self.reconfigure(data).await);

        let new_state = match K::write_model(&model, &id) {
            Ok(state) => state,
            Err(e) => {
                diagnostics.push(Diagnostic::error("Failed to build state", e.to_string()));
                state_with_id(request.planned_state, &id)
            }
        };

        UpdateResourceResponse {
            new_state,
            diagnostics,
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                return DeleteResourceResponse {
                    diagnostics: vec![diag],
                }
            }
        };

        let Some(id) = StateReader::new(&request.prior_state).id() else {
            diagnostics.push(
                Diagnostic::error("Missing id", "Cannot delete a resource without an id")
                    .with_attribute(AttributePath::new("id")),
            );
            return DeleteResourceResponse { diagnostics };
        };

        match data.client.haproxy().delete::<K::Remote>(&id).await {
            Ok(()) => tracing::debug!("Deleted {} {}", self.type_name, id),
            Err(e) if e.is_not_found() => {
                tracing::warn!("{} {} already deleted", K::DISPLAY_NAME, id);
                return DeleteResourceResponse { diagnostics };
            }
            Err(e) => {
                diagnostics.push(self.client_error("delete", &e));
                return DeleteResourceResponse { diagnostics };
            }
        }

        diagnostics.extend(self.reconfigure(data).await);
        DeleteResourceResponse { diagnostics }
    }

    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };
        import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}

#[async_trait]
impl<K: HaproxyKind> ResourceWithConfigure<OpnsenseProviderData> for HaproxyResource<K> {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest<OpnsenseProviderData>,
    ) -> ConfigureResourceResponse {
        self.provider_data = request.provider_data;
        ConfigureResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfplug::resource::ValidateResourceConfigRequest;

    #[test]
    fn type_names_carry_provider_prefix() {
        assert_eq!(FrontendResource::new().type_name(), "opnsense_haproxy_frontend");
        assert_eq!(BackendResource::new().type_name(), "opnsense_haproxy_backend");
        assert_eq!(ServerResource::new().type_name(), "opnsense_haproxy_server");
    }

    #[tokio::test]
    async fn create_without_provider_data_fails() {
        let resource = BackendResource::new();
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "opnsense_haproxy_backend".to_string(),
                    planned_state: DynamicValue::object(),
                    config: DynamicValue::object(),
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
    }

    #[tokio::test]
    async fn validate_rejects_bad_option_and_missing_name() {
        let resource = ServerResource::new();
        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new("mode"), "sometimes")
            .unwrap();

        let response = resource
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: "opnsense_haproxy_server".to_string(),
                    config,
                },
            )
            .await;

        let attributes: Vec<String> = response
            .diagnostics
            .iter()
            .filter_map(|d| d.attribute.as_ref().map(ToString::to_string))
            .collect();
        assert!(attributes.iter().any(|a| a == "mode"), "{:?}", attributes);
        assert!(attributes.iter().any(|a| a == "name"), "{:?}", attributes);
    }

    #[test]
    fn fallback_state_records_created_id() {
        let mut planned = DynamicValue::object();
        planned
            .set_value(&AttributePath::new("id"), tfplug::Dynamic::Unknown)
            .unwrap();
        planned
            .set_string(&AttributePath::new("name"), "pool_web")
            .unwrap();

        let state = state_with_id(planned, "4f1a");
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "4f1a");
        assert_eq!(state.get_string(&AttributePath::new("name")).unwrap(), "pool_web");

        let state = state_with_id(DynamicValue::null(), "4f1a");
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "4f1a");
    }

    #[tokio::test]
    async fn import_passes_id_through() {
        let resource = FrontendResource::new();
        let response = resource
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: "opnsense_haproxy_frontend".to_string(),
                    id: "7b0c".to_string(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let state = &response.imported_resources[0].state;
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "7b0c");
    }
}
