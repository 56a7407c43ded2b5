//! HAProxy plugin endpoints

use std::collections::BTreeMap;

use super::common::{MutationResponse, OpnsenseApiResource, ServiceResponse};
use super::error::ApiError;
use super::Client;

const RECONFIGURE_PATH: &str = "/haproxy/service/reconfigure";

/// HAProxy API for frontend, backend and server objects
pub struct HaproxyApi<'a> {
    client: &'a Client,
}

impl<'a> HaproxyApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// POST /haproxy/settings/add{Endpoint}, returning the new object's uuid
    pub async fn add<T: OpnsenseApiResource>(&self, object: &T) -> Result<String, ApiError> {
        let body = BTreeMap::from([(T::WRAPPER, object)]);
        let response: MutationResponse = self.client.post(&T::add_path(), &body).await?;

        match response.result.as_str() {
            "saved" => match response.uuid {
                Some(uuid) if !uuid.is_empty() => {
                    tracing::debug!("Created {} {}", T::WRAPPER, uuid);
                    Ok(uuid)
                }
                _ => Err(ApiError::UnexpectedResult {
                    operation: format!("add{}", T::ENDPOINT),
                    result: "saved without uuid".to_string(),
                }),
            },
            _ => Err(mutation_error::<T>("add", response)),
        }
    }

    /// GET /haproxy/settings/get{Endpoint}/{uuid}
    pub async fn get<T: OpnsenseApiResource>(&self, id: &str) -> Result<T, ApiError> {
        let body: serde_json::Value = match self.client.get(&T::get_path(id)).await {
            Ok(body) => body,
            Err(e) if e.is_not_found() => return Err(not_found::<T>(id)),
            Err(e) => return Err(e),
        };

        let object = match body.get(T::WRAPPER) {
            None | Some(serde_json::Value::Null) => return Err(not_found::<T>(id)),
            Some(serde_json::Value::Array(items)) if items.is_empty() => {
                return Err(not_found::<T>(id))
            }
            Some(serde_json::Value::Object(fields)) if fields.is_empty() => {
                return Err(not_found::<T>(id))
            }
            Some(object) => object,
        };

        T::deserialize(object).map_err(|e| {
            ApiError::ParseError(format!("Failed to parse {} {}: {}", T::WRAPPER, id, e))
        })
    }

    /// POST /haproxy/settings/set{Endpoint}/{uuid}
    pub async fn set<T: OpnsenseApiResource>(&self, id: &str, object: &T) -> Result<(), ApiError> {
        let body = BTreeMap::from([(T::WRAPPER, object)]);
        let response: MutationResponse = match self.client.post(&T::set_path(id), &body).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => return Err(not_found::<T>(id)),
            Err(e) => return Err(e),
        };

        match response.result.as_str() {
            "saved" => Ok(()),
            _ => Err(mutation_error::<T>("set", response)),
        }
    }

    /// POST /haproxy/settings/del{Endpoint}/{uuid}
    pub async fn delete<T: OpnsenseApiResource>(&self, id: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({});
        let response: MutationResponse = match self.client.post(&T::del_path(id), &body).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => return Err(not_found::<T>(id)),
            Err(e) => return Err(e),
        };

        match response.result.as_str() {
            "deleted" => Ok(()),
            "not found" => Err(not_found::<T>(id)),
            _ => Err(mutation_error::<T>("del", response)),
        }
    }

    /// POST /haproxy/service/reconfigure, applying saved changes
    pub async fn reconfigure(&self) -> Result<(), ApiError> {
        let response: ServiceResponse = self
            .client
            .post(RECONFIGURE_PATH, &serde_json::json!({}))
            .await?;

        if response.status.eq_ignore_ascii_case("ok") {
            Ok(())
        } else {
            Err(ApiError::UnexpectedResult {
                operation: "reconfigure".to_string(),
                result: response.status,
            })
        }
    }
}

fn not_found<T: OpnsenseApiResource>(id: &str) -> ApiError {
    ApiError::NotFound {
        kind: T::WRAPPER.to_string(),
        id: id.to_string(),
    }
}

fn mutation_error<T: OpnsenseApiResource>(verb: &str, response: MutationResponse) -> ApiError {
    let messages = response.validation_messages();
    if !messages.is_empty() {
        return ApiError::Validation {
            kind: T::WRAPPER.to_string(),
            messages,
        };
    }
    ApiError::UnexpectedResult {
        operation: format!("{}{}", verb, T::ENDPOINT),
        result: response.result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Widget {
        name: String,
        enabled: String,
    }

    impl OpnsenseApiResource for Widget {
        const CONTROLLER: &'static str = "haproxy/settings";
        const ENDPOINT: &'static str = "Widget";
        const WRAPPER: &'static str = "widget";
    }

    fn widget() -> Widget {
        Widget {
            name: "w".to_string(),
            enabled: "1".to_string(),
        }
    }

    async fn client(server: &Server) -> Client {
        Client::new(&server.url(), "key", "secret", false).unwrap()
    }

    #[tokio::test]
    async fn add_wraps_body_and_returns_uuid() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/haproxy/settings/addWidget")
            .match_body(Matcher::Json(json!({"widget": {"name": "w", "enabled": "1"}})))
            .with_body(r#"{"result":"saved","uuid":"9f3c"}"#)
            .create_async()
            .await;

        let client = client(&server).await;
        let id = client.haproxy().add(&widget()).await.unwrap();

        assert_eq!(id, "9f3c");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn add_surfaces_validation_messages() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/haproxy/settings/addWidget")
            .with_body(r#"{"result":"failed","validations":{"widget.name":"Name already in use"}}"#)
            .create_async()
            .await;

        let client = client(&server).await;
        match client.haproxy().add(&widget()).await {
            Err(ApiError::Validation { kind, messages }) => {
                assert_eq!(kind, "widget");
                assert_eq!(messages["widget.name"], "Name already in use");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn get_unwraps_object() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/haproxy/settings/getWidget/9f3c")
            .with_body(r#"{"widget":{"name":"w","enabled":"1"}}"#)
            .create_async()
            .await;

        let client = client(&server).await;
        let fetched: Widget = client.haproxy().get("9f3c").await.unwrap();
        assert_eq!(fetched, widget());
    }

    #[tokio::test]
    async fn get_treats_empty_wrapper_as_not_found() {
        let mut server = Server::new_async().await;
        let _empty = server
            .mock("GET", "/api/haproxy/settings/getWidget/gone")
            .with_body(r#"{"widget":[]}"#)
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/api/haproxy/settings/getWidget/absent")
            .with_body(r#"[]"#)
            .create_async()
            .await;
        let _http = server
            .mock("GET", "/api/haproxy/settings/getWidget/404")
            .with_status(404)
            .create_async()
            .await;

        let client = client(&server).await;
        for id in ["gone", "absent", "404"] {
            let result = client.haproxy().get::<Widget>(id).await;
            assert!(
                matches!(result, Err(ApiError::NotFound { id: ref got, .. }) if got == id),
                "{}: {:?}",
                id,
                result
            );
        }
    }

    #[tokio::test]
    async fn set_posts_to_uuid_path() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/haproxy/settings/setWidget/9f3c")
            .match_body(Matcher::PartialJson(json!({"widget": {"name": "w"}})))
            .with_body(r#"{"result":"saved"}"#)
            .create_async()
            .await;

        let client = client(&server).await;
        client.haproxy().set("9f3c", &widget()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn delete_maps_not_found_result() {
        let mut server = Server::new_async().await;
        let _deleted = server
            .mock("POST", "/api/haproxy/settings/delWidget/a")
            .with_body(r#"{"result":"deleted"}"#)
            .create_async()
            .await;
        let _missing = server
            .mock("POST", "/api/haproxy/settings/delWidget/b")
            .with_body(r#"{"result":"not found"}"#)
            .create_async()
            .await;

        let client = client(&server).await;
        client.haproxy().delete::<Widget>("a").await.unwrap();
        assert!(client
            .haproxy()
            .delete::<Widget>("b")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn reconfigure_checks_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/haproxy/service/reconfigure")
            .with_body(r#"{"status":"ok"}"#)
            .create_async()
            .await;

        let client = client(&server).await;
        client.haproxy().reconfigure().await.unwrap();
        mock.assert_async().await;
    }
}
