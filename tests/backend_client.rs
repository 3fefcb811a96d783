//! reqwest 客户端对 ScholChat 后端 REST 约定的集成测试
//!
//! 在进程内启动一个 actix 假后端，记录收到的每个请求并返回预置响应。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};

use scholchat_dashboard::client::{ClassLifecycleClient, HttpClassLifecycleClient};
use scholchat_dashboard::config::BackendConfig;
use scholchat_dashboard::models::classes::entities::{ClassState, PublicationRight};
use scholchat_dashboard::models::users::entities::{Session, UserRole};

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    query: HashMap<String, String>,
    authorization: Option<String>,
    body: Option<Value>,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

fn class_json(id: Value, etat: &str) -> Value {
    json!({
        "id": id,
        "nom": "Terminale C",
        "niveau": "Terminale",
        "dateCreation": "2024-01-15T10:00:00",
        "codeActivation": "TC-2024",
        "etat": etat,
        "etablissement": {"id": 3, "nom": "Lycée de Bonabéri"},
        "moderator": 12,
        "droitPublication": "MODERATEUR_SEULEMENT",
        "eleves": [{"id": 100}, {"id": 101}],
        "parents": null
    })
}

async fn fake_backend(req: HttpRequest, body: web::Bytes, log: web::Data<Log>) -> HttpResponse {
    let query = web::Query::<HashMap<String, String>>::from_query(req.query_string())
        .map(|q| q.into_inner())
        .unwrap_or_default();
    let path = req.path().to_string();
    let method = req.method().to_string();
    log.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query,
        authorization: req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).ok(),
    });

    match (method.as_str(), path.as_str()) {
        ("GET", "/scholchat/classes") => {
            HttpResponse::Ok().json(json!([class_json(json!(1), "ACTIF"), class_json(json!("2"), "INACTIF")]))
        }
        ("GET", "/scholchat/classes/by-status") => {
            HttpResponse::Ok().json(json!([class_json(json!(5), "EN_ATTENTE_APPROBATION")]))
        }
        ("GET", "/scholchat/classes/1") => HttpResponse::Ok().json(class_json(json!(1), "ACTIF")),
        ("GET", "/scholchat/classes/404") => {
            HttpResponse::NotFound().json(json!({"message": "Classe introuvable"}))
        }
        ("GET", "/scholchat/classes/garbled") => HttpResponse::Ok().body("<html>oops</html>"),
        ("PATCH", "/scholchat/classes/9/approve") => HttpResponse::BadRequest()
            .json(json!({"error": "La classe n'est pas en attente d'approbation"})),
        ("GET", "/scholchat/classes/1/activation-history") => HttpResponse::Ok().json(json!([
            {
                "id": 1,
                "classeId": 1,
                "utilisateurId": 7,
                "dateActivation": "2024-02-01T08:00:00",
                "dateDesactivation": "2024-06-30",
                "motif": "FIN_ANNEE",
                "commentaire": null
            }
        ])),
        ("GET", "/scholchat/motifs-rejet") => HttpResponse::Ok().json(json!([
            {"id": 1, "code": "DOUBLON", "descriptif": "Classe en double"}
        ])),
        ("POST", "/scholchat/classes") | ("PUT", "/scholchat/classes/1") => {
            HttpResponse::Ok().json(class_json(json!(1), "EN_ATTENTE_APPROBATION"))
        }
        _ => HttpResponse::Ok().finish(),
    }
}

async fn start_backend() -> (HttpClassLifecycleClient, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let data = web::Data::new(log.clone());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .default_service(web::to(fake_backend))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    let client = HttpClassLifecycleClient::new(&BackendConfig {
        base_url: format!("http://{addr}/scholchat/"),
        request_timeout_secs: 5,
    })
    .unwrap();
    (client, log)
}

fn session() -> Session {
    Session::new("jwt-token", UserRole::Administrator, "admin-1")
}

#[actix_web::test]
async fn approve_sends_patch_with_bearer_token() {
    let (client, log) = start_backend().await;
    client.approve_class(&session(), "1").await.unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].method, "PATCH");
    assert_eq!(log[0].path, "/scholchat/classes/1/approve");
    assert_eq!(log[0].authorization.as_deref(), Some("Bearer jwt-token"));
}

#[actix_web::test]
async fn reject_joins_motif_codes() {
    let (client, log) = start_backend().await;
    let motifs = vec!["DOUBLON".to_string(), "INCOMPLET".to_string()];
    client.reject_class(&session(), "3", &motifs).await.unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log[0].path, "/scholchat/classes/3/reject");
    assert_eq!(
        log[0].query.get("motif").map(String::as_str),
        Some("DOUBLON,INCOMPLET")
    );
}

#[actix_web::test]
async fn reject_without_motif_never_reaches_backend() {
    let (client, log) = start_backend().await;
    let err = client.reject_class(&session(), "3", &[]).await.unwrap_err();
    assert_eq!(err.code(), "E006");
    assert!(log.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn dot_segments_never_reach_backend() {
    let (client, log) = start_backend().await;
    for id in ["..", ".", "../motifs-rejet"] {
        let err = client.delete_class(&session(), id).await.unwrap_err();
        assert_eq!(err.code(), "E006");
    }
    assert!(log.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn deactivate_sends_reason_and_comment() {
    let (client, log) = start_backend().await;
    client
        .deactivate_class(&session(), "1", " Fin d'année ", Some("Classe fermée"))
        .await
        .unwrap();
    client
        .deactivate_class(&session(), "2", "Fusion", None)
        .await
        .unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log[0].method, "PATCH");
    assert_eq!(log[0].path, "/scholchat/classes/1/deactivate");
    assert_eq!(
        log[0].body,
        Some(json!({"raison": "Fin d'année", "commentaire": "Classe fermée"}))
    );
    assert_eq!(log[1].body, Some(json!({"raison": "Fusion"})));
}

#[actix_web::test]
async fn get_class_accepts_backend_shapes() {
    let (client, _) = start_backend().await;
    let class = client.get_class(&session(), "1").await.unwrap();

    assert_eq!(class.id, "1");
    assert_eq!(class.etat, ClassState::Actif);
    assert_eq!(class.etablissement_id(), Some("3"));
    assert_eq!(class.etablissement_nom(), Some("Lycée de Bonabéri"));
    assert_eq!(class.moderator_id(), Some("12"));
    assert_eq!(class.droit_publication, PublicationRight::ModerateurSeulement);
    assert_eq!(class.eleves.len(), 2);
    assert!(class.parents.is_empty());
}

#[actix_web::test]
async fn list_endpoints() {
    let (client, log) = start_backend().await;
    let all = client.list_classes(&session()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].id, "2");

    let pending = client
        .list_classes_by_status(&session(), ClassState::EnAttenteApprobation)
        .await
        .unwrap();
    assert_eq!(pending[0].etat, ClassState::EnAttenteApprobation);

    let log = log.lock().unwrap();
    assert_eq!(log[1].path, "/scholchat/classes/by-status");
    assert_eq!(
        log[1].query.get("etat").map(String::as_str),
        Some("EN_ATTENTE_APPROBATION")
    );
}

#[actix_web::test]
async fn http_errors_are_normalized() {
    let (client, _) = start_backend().await;

    let err = client.get_class(&session(), "404").await.unwrap_err();
    assert_eq!(err.code(), "E003");
    assert_eq!(err.message(), "Classe introuvable");

    let err = client.approve_class(&session(), "9").await.unwrap_err();
    assert_eq!(err.code(), "E002");
    assert!(err.message().contains("400"));
    assert!(err.message().contains("pas en attente"));

    let err = client.get_class(&session(), "garbled").await.unwrap_err();
    assert_eq!(err.code(), "E009");
}

#[actix_web::test]
async fn unreachable_backend_is_a_network_error() {
    let client = HttpClassLifecycleClient::new(&BackendConfig {
        base_url: "http://127.0.0.1:9/scholchat".to_string(),
        request_timeout_secs: 2,
    })
    .unwrap();
    let err = client.list_classes(&session()).await.unwrap_err();
    assert_eq!(err.code(), "E001");
}

#[actix_web::test]
async fn moderator_publication_history_and_access() {
    let (client, log) = start_backend().await;

    client.assign_moderator(&session(), "1", "77").await.unwrap();
    client.remove_moderator(&session(), "1").await.unwrap();
    client
        .update_publication_rights(&session(), "1", PublicationRight::ParentsEtModerateur)
        .await
        .unwrap();
    let history = client.activation_history(&session(), "1").await.unwrap();
    client
        .redeem_access_token(&session(), " TC-2024 ")
        .await
        .unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].classe_id.as_deref(), Some("1"));
    assert_eq!(history[0].utilisateur_id.as_deref(), Some("7"));
    assert!(history[0].date_desactivation.is_some());
    // 透传给面板前端时保留后端字段名
    let passed_through = serde_json::to_value(&history[0]).unwrap();
    assert_eq!(passed_through["classeId"], json!("1"));

    let log = log.lock().unwrap();
    let calls: Vec<(String, String)> = log
        .iter()
        .map(|r| (r.method.clone(), r.path.clone()))
        .collect();
    let expected = [
        ("GET", "/scholchat/classes/1"),
        ("PUT", "/scholchat/classes/1"),
        ("DELETE", "/scholchat/classes/1/moderator"),
        ("PATCH", "/scholchat/classes/1/publication-rights"),
        ("GET", "/scholchat/classes/1/activation-history"),
        ("POST", "/scholchat/classes/access-requests"),
    ];
    assert_eq!(
        calls,
        expected
            .iter()
            .map(|(m, p)| (m.to_string(), p.to_string()))
            .collect::<Vec<_>>()
    );
    // 指派版主时 PUT 完整实体，版主被替换
    assert_eq!(log[1].body.as_ref().unwrap()["moderator"]["id"], json!("77"));
    assert_eq!(
        log[3].query.get("droitPublication").map(String::as_str),
        Some("PARENTS_ET_MODERATEUR")
    );
    assert_eq!(log[5].body, Some(json!({"token": "TC-2024"})));
}

#[actix_web::test]
async fn motif_catalog_passthrough() {
    let (client, log) = start_backend().await;
    let motifs = client.list_motifs(&session()).await.unwrap();
    assert_eq!(motifs[0].id.as_deref(), Some("1"));
    assert_eq!(motifs[0].code, "DOUBLON");

    client.delete_motif(&session(), "1").await.unwrap();
    assert_eq!(log.lock().unwrap()[1].path, "/scholchat/motifs-rejet/1");
    assert_eq!(log.lock().unwrap()[1].method, "DELETE");
}
