//! Default value providers for attributes
//!
//! Defaults are evaluated during planning for optional+computed attributes
//! whose configuration value is null.
//!
//! ```no_run
//! use tfplug::schema::{AttributeBuilder, AttributeType};
//! use tfplug::defaults::StaticDefault;
//!
//! let mode = AttributeBuilder::new("mode", AttributeType::String)
//!     .optional()
//!     .computed()
//!     .default(StaticDefault::string("http"))
//!     .build();
//! ```

use crate::schema::{AttributeDefault, DefaultRequest, DefaultResponse};
use crate::types::Dynamic;
use std::collections::BTreeSet;
use std::sync::Arc;

/// StaticDefault provides a fixed default value
pub struct StaticDefault {
    value: Dynamic,
}

impl StaticDefault {
    pub fn create(value: Dynamic) -> Arc<dyn AttributeDefault> {
        Arc::new(Self { value })
    }

    pub fn string(value: &str) -> Arc<dyn AttributeDefault> {
        Self::create(Dynamic::String(value.to_string()))
    }

    pub fn number(value: f64) -> Arc<dyn AttributeDefault> {
        Self::create(Dynamic::Number(value))
    }

    pub fn int64(value: i64) -> Arc<dyn AttributeDefault> {
        Self::create(Dynamic::Number(value as f64))
    }

    pub fn bool(value: bool) -> Arc<dyn AttributeDefault> {
        Self::create(Dynamic::Bool(value))
    }

    pub fn string_set(values: &BTreeSet<String>) -> Arc<dyn AttributeDefault> {
        Self::create(Dynamic::string_list(values.iter().cloned()))
    }

    pub fn empty_set() -> Arc<dyn AttributeDefault> {
        Self::create(Dynamic::List(Vec::new()))
    }
}

impl AttributeDefault for StaticDefault {
    fn description(&self) -> String {
        format!("static default value: {:?}", self.value)
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        DefaultResponse {
            value: self.value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributePath;

    fn value_of(default: Arc<dyn AttributeDefault>) -> Dynamic {
        default
            .default_value(DefaultRequest {
                path: AttributePath::new("attr"),
            })
            .value
    }

    #[test]
    fn int64_default_is_a_whole_number() {
        assert_eq!(value_of(StaticDefault::int64(-1)), Dynamic::Number(-1.0));
    }

    #[test]
    fn string_set_default_lists_members_in_order() {
        let preset: BTreeSet<String> = ["http11", "h2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            value_of(StaticDefault::string_set(&preset)),
            Dynamic::string_list(["h2", "http11"])
        );
    }

    #[test]
    fn empty_set_default() {
        assert_eq!(value_of(StaticDefault::empty_set()), Dynamic::List(vec![]));
    }
}
