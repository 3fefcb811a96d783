//! 班级接口调用

use reqwest::Method;
use serde::Serialize;
use tracing::info;

use super::{HttpClassLifecycleClient, path_segment};
use crate::errors::{DashboardError, Result};
use crate::models::{
    classes::{
        entities::{ActivationHistoryRecord, ClassEntity, ClassState, PublicationRight},
        requests::NewClassPayload,
    },
    users::entities::Session,
};

/// PATCH /classes/{id}/deactivate 的请求体
#[derive(Debug, Serialize)]
struct DeactivationPayload<'a> {
    raison: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    commentaire: Option<&'a str>,
}

/// POST /classes/access-requests 的请求体
#[derive(Debug, Serialize)]
struct AccessTokenPayload<'a> {
    token: &'a str,
}

impl HttpClassLifecycleClient {
    /// 创建班级
    pub async fn create_class_impl(
        &self,
        session: &Session,
        draft: &NewClassPayload,
    ) -> Result<ClassEntity> {
        let builder = self.request(Method::POST, "/classes", session).json(draft);
        let class: ClassEntity = self.send_json(builder, "create class").await?;
        info!("Class {} ({}) submitted for approval", class.id, class.nom);
        Ok(class)
    }

    /// 完整实体更新
    pub async fn update_class_impl(
        &self,
        session: &Session,
        class_id: &str,
        class: &ClassEntity,
    ) -> Result<ClassEntity> {
        let id = path_segment(class_id, "class")?;
        let builder = self
            .request(Method::PUT, &format!("/classes/{id}"), session)
            .json(class);
        self.send_json(builder, &format!("update class {id}")).await
    }

    /// 获取单个班级
    pub async fn get_class_impl(&self, session: &Session, class_id: &str) -> Result<ClassEntity> {
        let id = path_segment(class_id, "class")?;
        let builder = self.request(Method::GET, &format!("/classes/{id}"), session);
        self.send_json(builder, &format!("get class {id}")).await
    }

    /// 列出全部班级
    pub async fn list_classes_impl(&self, session: &Session) -> Result<Vec<ClassEntity>> {
        let builder = self.request(Method::GET, "/classes", session);
        self.send_json(builder, "list classes").await
    }

    /// 按状态列出班级
    pub async fn list_classes_by_status_impl(
        &self,
        session: &Session,
        etat: ClassState,
    ) -> Result<Vec<ClassEntity>> {
        let builder = self
            .request(Method::GET, "/classes/by-status", session)
            .query(&[("etat", etat.as_str())]);
        self.send_json(builder, &format!("list {etat} classes")).await
    }

    /// 永久删除班级
    pub async fn delete_class_impl(&self, session: &Session, class_id: &str) -> Result<()> {
        let id = path_segment(class_id, "class")?;
        let builder = self.request(Method::DELETE, &format!("/classes/{id}"), session);
        self.send_empty(builder, &format!("delete class {id}"))
            .await?;
        info!("Class {} deleted by user {}", id, session.user_id);
        Ok(())
    }

    /// 审批通过
    pub async fn approve_class_impl(&self, session: &Session, class_id: &str) -> Result<()> {
        let id = path_segment(class_id, "class")?;
        let builder = self.request(Method::PATCH, &format!("/classes/{id}/approve"), session);
        self.send_empty(builder, &format!("approve class {id}"))
            .await?;
        info!("Class {} approved by user {}", id, session.user_id);
        Ok(())
    }

    /// 驳回
    pub async fn reject_class_impl(
        &self,
        session: &Session,
        class_id: &str,
        motifs: &[String],
    ) -> Result<()> {
        let id = path_segment(class_id, "class")?;
        let motif = motifs
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        if motif.is_empty() {
            return Err(DashboardError::validation(
                "At least one rejection motif is required",
            ));
        }
        let builder = self
            .request(Method::PATCH, &format!("/classes/{id}/reject"), session)
            .query(&[("motif", motif.as_str())]);
        self.send_empty(builder, &format!("reject class {id}"))
            .await?;
        info!(
            "Class {} rejected by user {} (motif: {})",
            id, session.user_id, motif
        );
        Ok(())
    }

    /// 停用
    pub async fn deactivate_class_impl(
        &self,
        session: &Session,
        class_id: &str,
        raison: &str,
        commentaire: Option<&str>,
    ) -> Result<()> {
        let id = path_segment(class_id, "class")?;
        let raison = raison.trim();
        if raison.is_empty() {
            return Err(DashboardError::validation("A deactivation reason is required"));
        }
        let payload = DeactivationPayload {
            raison,
            commentaire: commentaire.map(str::trim).filter(|c| !c.is_empty()),
        };
        let builder = self
            .request(Method::PATCH, &format!("/classes/{id}/deactivate"), session)
            .json(&payload);
        self.send_empty(builder, &format!("deactivate class {id}"))
            .await?;
        info!("Class {} deactivated by user {}", id, session.user_id);
        Ok(())
    }

    /// 移除版主
    pub async fn remove_moderator_impl(&self, session: &Session, class_id: &str) -> Result<()> {
        let id = path_segment(class_id, "class")?;
        let builder = self.request(Method::DELETE, &format!("/classes/{id}/moderator"), session);
        self.send_empty(builder, &format!("remove moderator of class {id}"))
            .await
    }

    /// 修改发布权限
    pub async fn update_publication_rights_impl(
        &self,
        session: &Session,
        class_id: &str,
        droit: PublicationRight,
    ) -> Result<()> {
        let id = path_segment(class_id, "class")?;
        let builder = self
            .request(
                Method::PATCH,
                &format!("/classes/{id}/publication-rights"),
                session,
            )
            .query(&[("droitPublication", droit.as_str())]);
        self.send_empty(builder, &format!("update publication rights of class {id}"))
            .await
    }

    /// 激活历史
    pub async fn activation_history_impl(
        &self,
        session: &Session,
        class_id: &str,
    ) -> Result<Vec<ActivationHistoryRecord>> {
        let id = path_segment(class_id, "class")?;
        let builder = self.request(
            Method::GET,
            &format!("/classes/{id}/activation-history"),
            session,
        );
        self.send_json(builder, &format!("get activation history of class {id}"))
            .await
    }

    /// 兑换访问令牌
    pub async fn redeem_access_token_impl(&self, session: &Session, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DashboardError::validation("An access token is required"));
        }
        let builder = self
            .request(Method::POST, "/classes/access-requests", session)
            .json(&AccessTokenPayload { token });
        self.send_empty(builder, "redeem access token").await?;
        info!("Access token redeemed by user {}", session.user_id);
        Ok(())
    }
}
