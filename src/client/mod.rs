//! ScholChat 后端客户端
//!
//! [`ClassLifecycleClient`] 是面向后端 REST 接口的类型化客户端，本身不持有任何状态：
//! 每次调用都是一次独立的请求/响应，会话令牌由调用方显式传入。

use std::sync::Arc;

use crate::config::BackendConfig;
use crate::errors::Result;
use crate::models::{
    classes::{
        entities::{ActivationHistoryRecord, ClassEntity, ClassState, EntityRef, PublicationRight},
        requests::NewClassPayload,
    },
    motifs::entities::RejectionMotif,
    users::entities::Session,
};

pub mod http_client;
pub mod memory;

pub use http_client::HttpClassLifecycleClient;
pub use memory::MemoryClassLifecycleClient;

#[async_trait::async_trait]
pub trait ClassLifecycleClient: Send + Sync {
    /// 班级管理方法
    // 创建班级（草稿）
    async fn create_class(&self, session: &Session, draft: &NewClassPayload)
    -> Result<ClassEntity>;
    // 完整实体更新
    async fn update_class(
        &self,
        session: &Session,
        class_id: &str,
        class: &ClassEntity,
    ) -> Result<ClassEntity>;
    // 获取单个班级
    async fn get_class(&self, session: &Session, class_id: &str) -> Result<ClassEntity>;
    // 列出全部班级
    async fn list_classes(&self, session: &Session) -> Result<Vec<ClassEntity>>;
    // 按状态列出班级
    async fn list_classes_by_status(
        &self,
        session: &Session,
        etat: ClassState,
    ) -> Result<Vec<ClassEntity>>;
    // 永久删除班级
    async fn delete_class(&self, session: &Session, class_id: &str) -> Result<()>;

    /// 状态转换方法
    // 审批通过
    async fn approve_class(&self, session: &Session, class_id: &str) -> Result<()>;
    // 驳回（多个理由代码以逗号拼接）
    async fn reject_class(&self, session: &Session, class_id: &str, motifs: &[String])
    -> Result<()>;
    // 停用
    async fn deactivate_class(
        &self,
        session: &Session,
        class_id: &str,
        raison: &str,
        commentaire: Option<&str>,
    ) -> Result<()>;
    // 移除版主
    async fn remove_moderator(&self, session: &Session, class_id: &str) -> Result<()>;
    // 修改发布权限
    async fn update_publication_rights(
        &self,
        session: &Session,
        class_id: &str,
        droit: PublicationRight,
    ) -> Result<()>;
    // 激活历史
    async fn activation_history(
        &self,
        session: &Session,
        class_id: &str,
    ) -> Result<Vec<ActivationHistoryRecord>>;
    // 兑换访问令牌
    async fn redeem_access_token(&self, session: &Session, token: &str) -> Result<()>;

    /// 驳回理由目录方法
    async fn list_motifs(&self, session: &Session) -> Result<Vec<RejectionMotif>>;
    async fn create_motif(&self, session: &Session, motif: &RejectionMotif)
    -> Result<RejectionMotif>;
    async fn update_motif(
        &self,
        session: &Session,
        motif_id: &str,
        motif: &RejectionMotif,
    ) -> Result<RejectionMotif>;
    async fn delete_motif(&self, session: &Session, motif_id: &str) -> Result<()>;

    /// 指派版主
    ///
    /// 后端没有单独的指派接口，版主随完整实体一起 PUT；
    /// 新版主直接替换旧版主。
    async fn assign_moderator(
        &self,
        session: &Session,
        class_id: &str,
        moderator_id: &str,
    ) -> Result<()> {
        let mut class = self.get_class(session, class_id).await?;
        class.moderator = Some(EntityRef::from_id(moderator_id));
        self.update_class(session, class_id, &class).await?;
        Ok(())
    }
}

pub fn create_client(config: &BackendConfig) -> Result<Arc<dyn ClassLifecycleClient>> {
    let client = HttpClassLifecycleClient::new(config)?;
    Ok(Arc::new(client))
}
