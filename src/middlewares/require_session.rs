/*!
 * 会话中间件
 *
 * 在请求边界构造一次 [`Session`]，放入请求扩展，后续处理程序与 `RequireRole`
 * 都从扩展中读取，不再依赖任何全局状态。
 *
 * ## 请求头
 *
 * - `Authorization: Bearer <token>`：转发给 ScholChat 后端的令牌（必需）
 * - `X-User-Role`：角色字符串，按 [`UserRole::normalize`] 归一化（必需）
 * - `X-User-Id`：用户 id（必需）
 * - `X-User-Name`：显示名称（可选）
 *
 * 任一必需项缺失或角色无法识别时返回 401。
 *
 * ## 信任边界
 *
 * 角色与用户 id 由调用方（面板前端）自行声明，本服务不校验令牌签名。
 * `RequireRole` 与状态转换表只用于在发出请求前拒绝明显非法的操作；
 * 真正的授权仍由 ScholChat 后端根据转发的 Bearer 令牌决定，
 * 伪造的角色头最多换来后端的 401/403。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * web::scope("/api/v1/classes")
 *     .wrap(RequireSession)
 *     .route("", web::get().to(list_classes))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{StatusCode, header::HeaderMap},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{debug, info};

use super::create_error_response;
use crate::models::{
    ErrorCode,
    users::entities::{Session, UserRole},
};

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";
pub const USER_ROLE_HEADER: &str = "X-User-Role";
pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_NAME_HEADER: &str = "X-User-Name";

#[derive(Clone)]
pub struct RequireSession;

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

// 辅助函数：从请求头构造会话
fn session_from_headers(headers: &HeaderMap) -> Result<Session, String> {
    let token = header_value(headers, AUTHORIZATION_HEADER)
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| "Missing or invalid Authorization header".to_string())?;

    let raw_role = header_value(headers, USER_ROLE_HEADER)
        .ok_or_else(|| format!("Missing {USER_ROLE_HEADER} header"))?;
    let role =
        UserRole::normalize(raw_role).ok_or_else(|| format!("Unknown user role: {raw_role}"))?;

    let user_id = header_value(headers, USER_ID_HEADER)
        .ok_or_else(|| format!("Missing {USER_ID_HEADER} header"))?;

    let session = Session::new(token, role, user_id);
    Ok(match header_value(headers, USER_NAME_HEADER) {
        Some(name) => session.with_user_name(name),
        None => session,
    })
}

impl<S, B> Transform<S, ServiceRequest> for RequireSession
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireSessionMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireSessionMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireSessionMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireSessionMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match session_from_headers(req.headers()) {
                Ok(session) => {
                    debug!(
                        "Session established for user {} ({})",
                        session.user_id, session.role
                    );
                    req.extensions_mut().insert(session);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!("Session rejected for request to {}: {}", req.path(), err);
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取会话
impl RequireSession {
    /// 从请求扩展中提取会话
    /// 此函数应该在应用了RequireSession中间件的路由处理程序中使用
    pub fn extract_session(req: &HttpRequest) -> Option<Session> {
        req.extensions().get::<Session>().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        map
    }

    #[test]
    fn test_session_from_headers() {
        let session = session_from_headers(&headers(&[
            ("authorization", "Bearer abc.def"),
            ("x-user-role", "ROLE_PROFESSEUR"),
            ("x-user-id", "42"),
            ("x-user-name", "Mme Ngo"),
        ]))
        .unwrap();
        assert_eq!(
            session,
            Session::new("abc.def", UserRole::Professor, "42").with_user_name("Mme Ngo")
        );
    }

    #[test]
    fn test_session_requires_token_role_and_id() {
        let missing_token = headers(&[("x-user-role", "admin"), ("x-user-id", "1")]);
        assert!(session_from_headers(&missing_token).is_err());

        let unknown_role = headers(&[
            ("authorization", "Bearer t"),
            ("x-user-role", "superuser"),
            ("x-user-id", "1"),
        ]);
        let err = session_from_headers(&unknown_role).unwrap_err();
        assert!(err.contains("superuser"));

        let missing_id = headers(&[("authorization", "Bearer t"), ("x-user-role", "parent")]);
        assert!(session_from_headers(&missing_id).is_err());

        let basic_auth = headers(&[
            ("authorization", "Basic dXNlcjpwYXNz"),
            ("x-user-role", "admin"),
            ("x-user-id", "1"),
        ]);
        assert!(session_from_headers(&basic_auth).is_err());
    }
}
