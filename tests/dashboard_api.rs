//! 面板 HTTP 接口的集成测试
//!
//! 使用内存后端替代 ScholChat 服务，验证会话、角色与状态机在路由层的表现。

use std::sync::Arc;

use actix_web::{App, http::StatusCode, test, web};
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

use scholchat_dashboard::cache::MotifCatalogCache;
use scholchat_dashboard::client::{ClassLifecycleClient, MemoryClassLifecycleClient};
use scholchat_dashboard::config::CacheConfig;
use scholchat_dashboard::modals::InFlightRequests;
use scholchat_dashboard::models::AppStartTime;
use scholchat_dashboard::models::classes::entities::{
    ClassEntity, ClassState, EntityRef, PublicationRight,
};
use scholchat_dashboard::routes::{
    configure_classes_routes, configure_motifs_routes, configure_system_routes,
};

fn class(id: &str, nom: &str, etat: ClassState) -> ClassEntity {
    ClassEntity {
        id: id.to_string(),
        nom: nom.to_string(),
        niveau: "Seconde".to_string(),
        date_creation: Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap(),
        code_activation: Some(format!("CODE-{id}")),
        etat,
        etablissement: Some(EntityRef::from_id("lycee-1")),
        moderator: None,
        droit_publication: PublicationRight::Tous,
        eleves: vec![],
        parents: vec![],
    }
}

fn backend() -> Arc<MemoryClassLifecycleClient> {
    Arc::new(MemoryClassLifecycleClient::with_classes(vec![
        class("1", "Mathématiques 2nde A", ClassState::EnAttenteApprobation),
        class("2", "Physique 1ère C", ClassState::Actif),
        class("3", "Histoire Tle D", ClassState::Inactif),
    ]))
}

macro_rules! dashboard_app {
    ($backend:expr) => {{
        let client: Arc<dyn ClassLifecycleClient> = $backend.clone();
        test::init_service(
            App::new()
                .app_data(web::Data::new(client))
                .app_data(web::Data::new(InFlightRequests::new()))
                .app_data(web::Data::new(MotifCatalogCache::new(&CacheConfig::default())))
                .app_data(web::Data::new(AppStartTime {
                    start_datetime: Utc::now(),
                }))
                .configure(configure_classes_routes)
                .configure(configure_motifs_routes)
                .configure(configure_system_routes),
        )
        .await
    }};
}

fn as_role(req: test::TestRequest, role: &str) -> test::TestRequest {
    req.insert_header(("Authorization", "Bearer test-token"))
        .insert_header(("X-User-Role", role))
        .insert_header(("X-User-Id", "u-42"))
}

#[actix_web::test]
async fn missing_session_is_unauthorized() {
    let backend = backend();
    let app = dashboard_app!(backend);

    let req = test::TestRequest::get().uri("/api/v1/classes").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(backend.calls().is_empty());
}

#[actix_web::test]
async fn health_does_not_need_a_session() {
    let backend = backend();
    let app = dashboard_app!(backend);

    let req = test::TestRequest::get()
        .uri("/api/v1/system/health")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], "ok");
}

#[actix_web::test]
async fn parent_cannot_approve() {
    let backend = backend();
    let app = dashboard_app!(backend);

    let req = as_role(test::TestRequest::post(), "parent")
        .uri("/api/v1/classes/1/approve")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(backend.calls().is_empty());
}

#[actix_web::test]
async fn admin_approves_pending_class() {
    let backend = backend();
    let app = dashboard_app!(backend);

    let req = as_role(test::TestRequest::post(), "ROLE_ADMIN")
        .uri("/api/v1/classes/1/approve")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["id"], "1");
    assert_eq!(body["data"]["etat"], "ACTIF");
    assert!(
        backend
            .calls()
            .contains(&"PATCH /classes/1/approve".to_string())
    );
}

#[actix_web::test]
async fn approving_an_active_class_is_a_conflict() {
    let backend = backend();
    let app = dashboard_app!(backend);

    let req = as_role(test::TestRequest::post(), "admin")
        .uri("/api/v1/classes/2/approve")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert!(!backend.calls().iter().any(|c| c.contains("approve")));
}

#[actix_web::test]
async fn deactivate_requires_a_reason() {
    let backend = backend();
    let app = dashboard_app!(backend);

    let req = as_role(test::TestRequest::post(), "professeur")
        .uri("/api/v1/classes/2/deactivate")
        .set_json(json!({"reason": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(!backend.calls().iter().any(|c| c.contains("deactivate")));

    let req = as_role(test::TestRequest::post(), "professeur")
        .uri("/api/v1/classes/2/deactivate")
        .set_json(json!({"reason": "Fin d'année", "comment": "Classe fermée"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["etat"], "INACTIF");
}

#[actix_web::test]
async fn reject_without_motif_is_refused() {
    let backend = backend();
    let app = dashboard_app!(backend);

    let req = as_role(test::TestRequest::post(), "admin")
        .uri("/api/v1/classes/1/reject")
        .set_json(json!({"motifs": []}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        backend.snapshot()[0].etat,
        ClassState::EnAttenteApprobation
    );
}

#[actix_web::test]
async fn list_searches_and_reports_available_actions() {
    let backend = backend();
    let app = dashboard_app!(backend);

    let req = as_role(test::TestRequest::get(), "admin")
        .uri("/api/v1/classes?search=math&size=10")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["nom"], "Mathématiques 2nde A");
    let actions = items[0]["available_actions"].as_array().unwrap();
    assert!(actions.contains(&json!("approve")));
    assert!(actions.contains(&json!("reject")));
    assert_eq!(body["data"]["pagination"]["total"], 1);
}

#[actix_web::test]
async fn list_rejects_unknown_page_size() {
    let backend = backend();
    let app = dashboard_app!(backend);

    let req = as_role(test::TestRequest::get(), "admin")
        .uri("/api/v1/classes?size=7")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn pending_queue_is_admin_only() {
    let backend = backend();
    let app = dashboard_app!(backend);

    let req = as_role(test::TestRequest::get(), "professor")
        .uri("/api/v1/classes/pending")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = as_role(test::TestRequest::get(), "admin")
        .uri("/api/v1/classes/pending")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "1");
}

#[actix_web::test]
async fn delete_returns_empty_success() {
    let backend = backend();
    let app = dashboard_app!(backend);

    let req = as_role(test::TestRequest::delete(), "admin")
        .uri("/api/v1/classes/3")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(backend.snapshot().iter().all(|c| c.id != "3"));
}

#[actix_web::test]
async fn unknown_class_is_not_found() {
    let backend = backend();
    let app = dashboard_app!(backend);

    let req = as_role(test::TestRequest::get(), "admin")
        .uri("/api/v1/classes/99")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
