//! Common types for the OPNsense API

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An object managed through an OPNsense MVC controller.
///
/// Endpoints follow `/<module>/<controller>/<verb><Endpoint>[/<uuid>]` and
/// bodies wrap the object under a single key, e.g. `{"backend": {...}}`.
pub trait OpnsenseApiResource: Serialize + DeserializeOwned + Send + Sync {
    /// e.g. "haproxy/settings"
    const CONTROLLER: &'static str;
    /// e.g. "Backend"
    const ENDPOINT: &'static str;
    /// e.g. "backend"
    const WRAPPER: &'static str;

    fn add_path() -> String {
        format!("/{}/add{}", Self::CONTROLLER, Self::ENDPOINT)
    }

    fn get_path(id: &str) -> String {
        format!(
            "/{}/get{}/{}",
            Self::CONTROLLER,
            Self::ENDPOINT,
            urlencoding::encode(id)
        )
    }

    fn set_path(id: &str) -> String {
        format!(
            "/{}/set{}/{}",
            Self::CONTROLLER,
            Self::ENDPOINT,
            urlencoding::encode(id)
        )
    }

    fn del_path(id: &str) -> String {
        format!(
            "/{}/del{}/{}",
            Self::CONTROLLER,
            Self::ENDPOINT,
            urlencoding::encode(id)
        )
    }
}

/// Response from add/set/del calls
#[derive(Debug, Deserialize)]
pub struct MutationResponse {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub validations: BTreeMap<String, serde_json::Value>,
}

impl MutationResponse {
    /// Field-level messages, with list-valued messages joined.
    pub fn validation_messages(&self) -> BTreeMap<String, String> {
        self.validations
            .iter()
            .map(|(field, message)| {
                let text = match message {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Array(items) => items
                        .iter()
                        .map(|i| i.as_str().map(str::to_string).unwrap_or_else(|| i.to_string()))
                        .collect::<Vec<_>>()
                        .join(", "),
                    other => other.to_string(),
                };
                (field.clone(), text)
            })
            .collect()
    }
}

/// Response from service actions such as reconfigure
#[derive(Debug, Deserialize)]
pub struct ServiceResponse {
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Widget {}

    impl OpnsenseApiResource for Widget {
        const CONTROLLER: &'static str = "haproxy/settings";
        const ENDPOINT: &'static str = "Widget";
        const WRAPPER: &'static str = "widget";
    }

    #[test]
    fn resource_paths_encode_ids() {
        assert_eq!(Widget::add_path(), "/haproxy/settings/addWidget");
        assert_eq!(
            Widget::get_path("a b/c"),
            "/haproxy/settings/getWidget/a%20b%2Fc"
        );
        assert_eq!(Widget::set_path("u1"), "/haproxy/settings/setWidget/u1");
        assert_eq!(Widget::del_path("u1"), "/haproxy/settings/delWidget/u1");
    }

    #[test]
    fn validation_messages_join_lists() {
        let response: MutationResponse = serde_json::from_str(
            r#"{"result":"failed","validations":{"server.port":["Invalid","Too big"],"server.name":"Required"}}"#,
        )
        .unwrap();

        let messages = response.validation_messages();
        assert_eq!(messages["server.port"], "Invalid, Too big");
        assert_eq!(messages["server.name"], "Required");
        assert!(response.uuid.is_none());
    }
}
