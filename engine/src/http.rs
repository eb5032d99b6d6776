//! REST-backed object store.
//!
//! - `GET  {base}/api/objects/{id}?type={code}` reads an object and its ACL
//! - `PUT  {base}/api/objects/{id}?type={code}` applies an ACL update
//!
//! Every request carries the session token in `X-MSTR-AuthToken`. The
//! project is passed in `X-MSTR-ProjectID`.

use std::time::Duration;

use acl_common::ObjectType;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, error};
use url::Url;

use crate::config::EngineConfig;
use crate::error::StoreError;
use crate::store::{AclUpdateBody, ObjectInfo, ObjectStore};

const AUTH_TOKEN_HEADER: &str = "X-MSTR-AuthToken";
const PROJECT_ID_HEADER: &str = "X-MSTR-ProjectID";

/// Error body returned by the REST API, either flat or wrapped in `errors`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerError {
    code: Option<String>,
    message: Option<String>,
    ticket_id: Option<String>,
    #[serde(default)]
    errors: Vec<ServerError>,
}

/// Object store speaking the REST API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    http: Client,
    base_url: Url,
    auth_token: String,
    default_project_id: Option<String>,
}

impl HttpObjectStore {
    pub fn new(config: &EngineConfig) -> Result<Self, StoreError> {
        let base_url = Url::parse(&config.store_url)
            .map_err(|e| StoreError::Config(format!("store URL {:?}: {e}", config.store_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Config(format!(
                "store URL {base_url} cannot carry a path"
            )));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            auth_token: config.auth_token.clone(),
            default_project_id: config.default_project_id.clone(),
        })
    }

    fn object_url(&self, object_type: ObjectType, id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "objects", id]);
        }
        url.query_pairs_mut()
            .append_pair("type", &object_type.code().to_string());
        url
    }

    /// Project header value.
    ///
    /// Projects are addressed by their own id on updates and without a
    /// project on reads; everything else uses the explicit project, then the
    /// configured default.
    fn project_header(
        &self,
        object_type: ObjectType,
        id: &str,
        project_id: Option<&str>,
        updating: bool,
    ) -> Option<String> {
        if object_type == ObjectType::Project {
            return updating.then(|| id.to_string());
        }
        project_id
            .map(str::to_string)
            .or_else(|| self.default_project_id.clone())
    }

    fn with_headers(&self, request: RequestBuilder, project: Option<String>) -> RequestBuilder {
        let request = request.header(AUTH_TOKEN_HEADER, &self.auth_token);
        match project {
            Some(project) => request.header(PROJECT_ID_HEADER, project),
            None => request,
        }
    }

    async fn into_object(response: Response, action: &str) -> Result<ObjectInfo, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Failed to {}: {} - {}", action, status, body);
            return Err(parse_error_body(status.as_u16(), &body));
        }

        response
            .json::<ObjectInfo>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

/// Decode an error response into a [`StoreError::Status`].
fn parse_error_body(status: u16, body: &str) -> StoreError {
    let mut parsed: ServerError = serde_json::from_str(body).unwrap_or_default();
    if !parsed.errors.is_empty() {
        parsed = parsed.errors.swap_remove(0);
    }

    StoreError::Status {
        status,
        code: parsed.code,
        message: parsed.message.unwrap_or_else(|| format!("HTTP {status}")),
        ticket_id: parsed.ticket_id,
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn get_object_info(
        &self,
        object_type: ObjectType,
        id: &str,
        project_id: Option<&str>,
    ) -> Result<ObjectInfo, StoreError> {
        let url = self.object_url(object_type, id);
        let project = self.project_header(object_type, id, project_id, false);
        debug!(%url, project = ?project, "Fetching object");

        let response = self
            .with_headers(self.http.get(url), project)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to fetch object {}: {}", id, e);
                StoreError::from(e)
            })?;

        Self::into_object(response, "fetch object").await
    }

    async fn update_object_acl(
        &self,
        object_type: ObjectType,
        id: &str,
        project_id: Option<&str>,
        body: &AclUpdateBody,
    ) -> Result<ObjectInfo, StoreError> {
        let url = self.object_url(object_type, id);
        let project = self.project_header(object_type, id, project_id, true);
        debug!(%url, project = ?project, patches = body.acl.len(), "Updating object ACL");

        let response = self
            .with_headers(self.http.put(url).json(body), project)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to update object {}: {}", id, e);
                StoreError::from(e)
            })?;

        Self::into_object(response, "update object ACL").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(base: &str, default_project: Option<&str>) -> HttpObjectStore {
        let mut config = EngineConfig::default_for_test();
        config.store_url = base.to_string();
        config.default_project_id = default_project.map(str::to_string);
        HttpObjectStore::new(&config).unwrap()
    }

    #[test]
    fn test_object_url() {
        let store = store("https://bi.example.com/Library", None);
        let url = store.object_url(ObjectType::Folder, "F1");
        assert_eq!(
            url.as_str(),
            "https://bi.example.com/Library/api/objects/F1?type=8"
        );
    }

    #[test]
    fn test_object_url_with_trailing_slash() {
        let store = store("https://bi.example.com/Library/", None);
        let url = store.object_url(ObjectType::ReportDefinition, "R1");
        assert_eq!(
            url.as_str(),
            "https://bi.example.com/Library/api/objects/R1?type=3"
        );
    }

    #[test]
    fn test_object_url_escapes_id() {
        let store = store("https://bi.example.com/Library", None);
        let url = store.object_url(ObjectType::Filter, "a/b");
        assert_eq!(
            url.as_str(),
            "https://bi.example.com/Library/api/objects/a%2Fb?type=1"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        let mut config = EngineConfig::default_for_test();
        config.store_url = "mailto:admin@example.com".to_string();
        assert!(matches!(
            HttpObjectStore::new(&config),
            Err(StoreError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_unparseable_url() {
        let mut config = EngineConfig::default_for_test();
        config.store_url = "bi.example.com/Library".to_string();
        let err = HttpObjectStore::new(&config).unwrap_err();
        assert!(matches!(err, StoreError::Config(ref m) if m.contains("bi.example.com")));
    }

    #[test]
    fn test_project_header_for_project_objects() {
        let store = store("https://bi.example.com/Library", Some("DEFAULT"));
        assert_eq!(
            store.project_header(ObjectType::Project, "P9", Some("P1"), true),
            Some("P9".to_string())
        );
        assert_eq!(
            store.project_header(ObjectType::Project, "P9", Some("P1"), false),
            None
        );
    }

    #[test]
    fn test_project_header_prefers_explicit_project() {
        let store = store("https://bi.example.com/Library", Some("DEFAULT"));
        assert_eq!(
            store.project_header(ObjectType::Folder, "F1", Some("P1"), true),
            Some("P1".to_string())
        );
        assert_eq!(
            store.project_header(ObjectType::Folder, "F1", None, false),
            Some("DEFAULT".to_string())
        );
    }

    #[test]
    fn test_project_header_absent_for_configuration_objects() {
        let store = store("https://bi.example.com/Library", None);
        assert_eq!(
            store.project_header(ObjectType::ScheduleTrigger, "S1", None, true),
            None
        );
    }

    #[test]
    fn test_parse_flat_error_body() {
        let err = parse_error_body(
            404,
            r#"{"code":"ERR004","message":"Object not found","ticketId":"t-1"}"#,
        );
        assert_eq!(
            err,
            StoreError::Status {
                status: 404,
                code: Some("ERR004".to_string()),
                message: "Object not found".to_string(),
                ticket_id: Some("t-1".to_string()),
            }
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn test_parse_wrapped_error_body() {
        let err = parse_error_body(
            400,
            r#"{"errors":[{"code":"ERR001","message":"Bad ACL entry"}]}"#,
        );
        assert_eq!(err.status(), Some(400));
        assert!(matches!(
            err,
            StoreError::Status { code: Some(ref c), ref message, .. }
                if c == "ERR001" && message == "Bad ACL entry"
        ));
    }

    #[test]
    fn test_parse_non_json_error_body() {
        let err = parse_error_body(502, "<html>Bad Gateway</html>");
        assert_eq!(
            err,
            StoreError::Status {
                status: 502,
                code: None,
                message: "HTTP 502".to_string(),
                ticket_id: None,
            }
        );
    }
}
