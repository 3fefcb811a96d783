//! 基于 reqwest 的 ScholChat 后端客户端实现
//!
//! 所有方法在失败时记录日志，并返回归一化后的 [`DashboardError`]；不做任何重试。

mod classes;
mod motifs;

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::ClassLifecycleClient;
use crate::config::BackendConfig;
use crate::errors::{DashboardError, Result};
use crate::models::{
    classes::{
        entities::{ActivationHistoryRecord, ClassEntity, ClassState, PublicationRight},
        requests::NewClassPayload,
    },
    motifs::entities::RejectionMotif,
    users::entities::Session,
};

/// 错误消息中保留的响应体最大长度
const MAX_ERROR_BODY_LEN: usize = 200;

#[derive(Clone)]
pub struct HttpClassLifecycleClient {
    http: Client,
    base_url: String,
}

impl HttpClassLifecycleClient {
    /// 创建新的后端客户端
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        // 0 表示沿用 reqwest 默认行为（不设超时）
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }
        let http = builder.build().map_err(|e| {
            DashboardError::configuration(format!("Failed to create HTTP client: {e}"))
        })?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(DashboardError::configuration("Backend base URL is empty"));
        }

        debug!("ScholChat backend client targeting {}", base_url);
        Ok(Self { http, base_url })
    }

    fn request(&self, method: Method, path: &str, session: &Session) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if session.token.is_empty() {
            builder
        } else {
            builder.bearer_auth(&session.token)
        }
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response> {
        let response = builder.send().await.map_err(|e| {
            warn!("{} failed before receiving a response: {}", what, e);
            DashboardError::network(format!("{what} failed: {e}"))
        })?;

        let status = response.status();
        if status.is_success() {
            debug!("{} succeeded with status {}", what, status);
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = error_from_status(status, &body, what);
        warn!("{} rejected by backend: {}", what, err);
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder, what: &str) -> Result<T> {
        let response = self.send(builder, what).await?;
        response.json::<T>().await.map_err(|e| {
            warn!("{} returned an unreadable body: {}", what, e);
            DashboardError::serialization(format!("{what}: invalid response body: {e}"))
        })
    }

    async fn send_empty(&self, builder: RequestBuilder, what: &str) -> Result<()> {
        self.send(builder, what).await.map(|_| ())
    }
}

/// 校验路径片段，避免 id 中的分隔符改变请求路径
fn path_segment<'a>(id: &'a str, what: &str) -> Result<&'a str> {
    let id = id.trim();
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '?', '#', '%']) {
        return Err(DashboardError::validation(format!("Invalid {what} id: '{id}'")));
    }
    Ok(id)
}

/// 将 HTTP 错误状态归一化为 [`DashboardError`]，优先使用后端提供的消息
pub(crate) fn error_from_status(status: StatusCode, body: &str, what: &str) -> DashboardError {
    let message = extract_backend_message(body)
        .unwrap_or_else(|| format!("{what} failed with status {}", status.as_u16()));

    match status {
        StatusCode::NOT_FOUND => DashboardError::not_found(message),
        StatusCode::UNAUTHORIZED => DashboardError::authentication(message),
        StatusCode::FORBIDDEN => DashboardError::authorization(message),
        _ => DashboardError::backend(format!("status {}: {message}", status.as_u16())),
    }
}

fn extract_backend_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        return ["message", "error", "detail"]
            .iter()
            .find_map(|key| value.get(key).and_then(|v| v.as_str()))
            .filter(|msg| !msg.trim().is_empty())
            .map(str::to_string);
    }
    Some(body.chars().take(MAX_ERROR_BODY_LEN).collect())
}

#[async_trait::async_trait]
impl ClassLifecycleClient for HttpClassLifecycleClient {
    // 班级模块
    async fn create_class(
        &self,
        session: &Session,
        draft: &NewClassPayload,
    ) -> Result<ClassEntity> {
        self.create_class_impl(session, draft).await
    }

    async fn update_class(
        &self,
        session: &Session,
        class_id: &str,
        class: &ClassEntity,
    ) -> Result<ClassEntity> {
        self.update_class_impl(session, class_id, class).await
    }

    async fn get_class(&self, session: &Session, class_id: &str) -> Result<ClassEntity> {
        self.get_class_impl(session, class_id).await
    }

    async fn list_classes(&self, session: &Session) -> Result<Vec<ClassEntity>> {
        self.list_classes_impl(session).await
    }

    async fn list_classes_by_status(
        &self,
        session: &Session,
        etat: ClassState,
    ) -> Result<Vec<ClassEntity>> {
        self.list_classes_by_status_impl(session, etat).await
    }

    async fn delete_class(&self, session: &Session, class_id: &str) -> Result<()> {
        self.delete_class_impl(session, class_id).await
    }

    async fn approve_class(&self, session: &Session, class_id: &str) -> Result<()> {
        self.approve_class_impl(session, class_id).await
    }

    async fn reject_class(
        &self,
        session: &Session,
        class_id: &str,
        motifs: &[String],
    ) -> Result<()> {
        self.reject_class_impl(session, class_id, motifs).await
    }

    async fn deactivate_class(
        &self,
        session: &Session,
        class_id: &str,
        raison: &str,
        commentaire: Option<&str>,
    ) -> Result<()> {
        self.deactivate_class_impl(session, class_id, raison, commentaire)
            .await
    }

    async fn remove_moderator(&self, session: &Session, class_id: &str) -> Result<()> {
        self.remove_moderator_impl(session, class_id).await
    }

    async fn update_publication_rights(
        &self,
        session: &Session,
        class_id: &str,
        droit: PublicationRight,
    ) -> Result<()> {
        self.update_publication_rights_impl(session, class_id, droit)
            .await
    }

    async fn activation_history(
        &self,
        session: &Session,
        class_id: &str,
    ) -> Result<Vec<ActivationHistoryRecord>> {
        self.activation_history_impl(session, class_id).await
    }

    async fn redeem_access_token(&self, session: &Session, token: &str) -> Result<()> {
        self.redeem_access_token_impl(session, token).await
    }

    // 驳回理由模块
    async fn list_motifs(&self, session: &Session) -> Result<Vec<RejectionMotif>> {
        self.list_motifs_impl(session).await
    }

    async fn create_motif(
        &self,
        session: &Session,
        motif: &RejectionMotif,
    ) -> Result<RejectionMotif> {
        self.create_motif_impl(session, motif).await
    }

    async fn update_motif(
        &self,
        session: &Session,
        motif_id: &str,
        motif: &RejectionMotif,
    ) -> Result<RejectionMotif> {
        self.update_motif_impl(session, motif_id, motif).await
    }

    async fn delete_motif(&self, session: &Session, motif_id: &str) -> Result<()> {
        self.delete_motif_impl(session, motif_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_status_prefers_backend_message() {
        let err = error_from_status(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Classe déjà approuvée"}"#,
            "approve class 1",
        );
        assert_eq!(err.code(), "E002");
        assert!(err.message().contains("Classe déjà approuvée"));
        assert!(err.message().contains("400"));
    }

    #[test]
    fn test_error_from_status_fallbacks() {
        let err = error_from_status(StatusCode::NOT_FOUND, "", "get class 9");
        assert_eq!(err, DashboardError::not_found("get class 9 failed with status 404"));

        let err = error_from_status(StatusCode::UNAUTHORIZED, "{}", "list classes");
        assert_eq!(err.code(), "E004");

        let err = error_from_status(StatusCode::FORBIDDEN, "nope", "delete class 1");
        assert_eq!(err, DashboardError::authorization("nope"));
    }

    #[test]
    fn test_path_segment() {
        assert_eq!(path_segment(" 12 ", "class").unwrap(), "12");
        assert!(path_segment("", "class").is_err());
        assert!(path_segment("1/approve", "class").is_err());
        assert!(path_segment("1?x=2", "class").is_err());
        assert!(path_segment("..", "class").is_err());
        assert!(path_segment(" . ", "class").is_err());
        assert_eq!(path_segment("v1.2", "class").unwrap(), "v1.2");
    }

    #[test]
    fn test_client_rejects_empty_base_url() {
        let config = BackendConfig {
            base_url: "/".to_string(),
            request_timeout_secs: 30,
        };
        assert!(HttpClassLifecycleClient::new(&config).is_err());
    }
}
