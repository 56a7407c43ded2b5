//! Provider trait
//!
//! A provider configures itself once, then hands its typed provider data
//! to every resource and data source it builds.

use crate::context::Context;
use crate::data_source::DataSourceWithConfigure;
use crate::resource::ResourceWithConfigure;
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::collections::HashMap;

pub type ResourceFactory<D> = Box<dyn Fn() -> Box<dyn ResourceWithConfigure<D>> + Send + Sync>;

pub type DataSourceFactory<D> =
    Box<dyn Fn() -> Box<dyn DataSourceWithConfigure<D>> + Send + Sync>;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Shared state passed to resources and data sources after configure
    type ProviderData: Clone + Send + Sync + 'static;

    /// Prefix of every resource and data source type name
    fn type_name(&self) -> &str;

    async fn schema(&self, ctx: Context) -> ProviderSchemaResponse;

    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse<Self::ProviderData>;

    fn resources(&self) -> HashMap<String, ResourceFactory<Self::ProviderData>>;

    fn data_sources(&self) -> HashMap<String, DataSourceFactory<Self::ProviderData>>;
}

pub struct ProviderSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ConfigureProviderRequest {
    pub terraform_version: String,
    pub config: DynamicValue,
}

pub struct ConfigureProviderResponse<D> {
    pub diagnostics: Vec<Diagnostic>,
    pub provider_data: Option<D>,
}
