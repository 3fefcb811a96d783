//! 班级操作对话框
//!
//! 对话框只能为合法的 (班级, 操作, 角色) 组合打开。提交前先校验必填项，
//! 校验失败不会发出任何请求；提交期间以 (实体 id, 操作) 占用进行中标记。
//! 成功后关闭并触发列表刷新，失败时把错误留在对话框上，保持打开以便重试。

pub mod inflight;

use std::sync::Arc;

use tracing::{info, warn};

use crate::client::ClassLifecycleClient;
use crate::errors::{DashboardError, Result};
use crate::lifecycle::{ClassAction, authorize};
use crate::models::classes::{
    entities::{ClassEntity, PublicationRight},
    requests::{
        AccessRequest, AssignModeratorRequest, DeactivateClassRequest, PublicationRightsRequest,
        RejectClassRequest, UpdateClassRequest,
    },
};
use crate::models::users::entities::Session;
use crate::presenter::ClassListPresenter;

pub use inflight::{ACCESS_REQUEST_KEY, InFlightGuard, InFlightRequests};

/// 对话框收集的输入
#[derive(Debug, Clone)]
pub enum ActionForm {
    Approve,
    Reject { motifs: Vec<String> },
    Deactivate { reason: String, comment: Option<String> },
    Delete,
    Edit(UpdateClassRequest),
    AssignModerator { moderator_id: String },
    RemoveModerator,
    UpdatePublicationRights { droit: PublicationRight },
    RedeemAccess { token: String },
}

impl ActionForm {
    pub fn action(&self) -> ClassAction {
        match self {
            ActionForm::Approve => ClassAction::Approve,
            ActionForm::Reject { .. } => ClassAction::Reject,
            ActionForm::Deactivate { .. } => ClassAction::Deactivate,
            ActionForm::Delete => ClassAction::Delete,
            ActionForm::Edit(_) => ClassAction::Edit,
            ActionForm::AssignModerator { .. } => ClassAction::AssignModerator,
            ActionForm::RemoveModerator => ClassAction::RemoveModerator,
            ActionForm::UpdatePublicationRights { .. } => ClassAction::UpdatePublicationRights,
            ActionForm::RedeemAccess { .. } => ClassAction::RedeemAccess,
        }
    }

    /// 必填项校验
    pub fn validate(&self) -> Result<()> {
        match self {
            ActionForm::Reject { motifs } => {
                if motifs.iter().all(|m| m.trim().is_empty()) {
                    return Err(DashboardError::validation(
                        "Select at least one rejection motif",
                    ));
                }
            }
            ActionForm::Deactivate { reason, .. } => {
                if reason.trim().is_empty() {
                    return Err(DashboardError::validation("A deactivation reason is required"));
                }
            }
            ActionForm::AssignModerator { moderator_id } => {
                if moderator_id.trim().is_empty() {
                    return Err(DashboardError::validation("A moderator must be selected"));
                }
            }
            ActionForm::RedeemAccess { token } => {
                if token.trim().is_empty() {
                    return Err(DashboardError::validation("An access token is required"));
                }
            }
            ActionForm::Edit(update) => update.validate()?,
            ActionForm::Approve
            | ActionForm::Delete
            | ActionForm::RemoveModerator
            | ActionForm::UpdatePublicationRights { .. } => {}
        }
        Ok(())
    }
}

impl From<RejectClassRequest> for ActionForm {
    fn from(req: RejectClassRequest) -> Self {
        ActionForm::Reject {
            motifs: req.motifs,
        }
    }
}

impl From<DeactivateClassRequest> for ActionForm {
    fn from(req: DeactivateClassRequest) -> Self {
        ActionForm::Deactivate {
            reason: req.reason,
            comment: req.comment,
        }
    }
}

impl From<UpdateClassRequest> for ActionForm {
    fn from(req: UpdateClassRequest) -> Self {
        ActionForm::Edit(req)
    }
}

impl From<AssignModeratorRequest> for ActionForm {
    fn from(req: AssignModeratorRequest) -> Self {
        ActionForm::AssignModerator {
            moderator_id: req.moderator_id,
        }
    }
}

impl From<PublicationRightsRequest> for ActionForm {
    fn from(req: PublicationRightsRequest) -> Self {
        ActionForm::UpdatePublicationRights {
            droit: req.droit_publication,
        }
    }
}

impl From<AccessRequest> for ActionForm {
    fn from(req: AccessRequest) -> Self {
        ActionForm::RedeemAccess { token: req.token }
    }
}

#[derive(Debug)]
pub struct ClassActionModal {
    target_id: String,
    form: ActionForm,
    error: Option<String>,
    open: bool,
}

impl ClassActionModal {
    /// 为某个班级打开对话框；角色或状态不满足时返回错误
    pub fn open(form: ActionForm, class: &ClassEntity, session: &Session) -> Result<Self> {
        let action = form.action();
        if action == ClassAction::RedeemAccess {
            return Err(DashboardError::validation(
                "Access tokens are redeemed without a target class",
            ));
        }
        authorize(action, class, session.role)?;
        Ok(Self {
            target_id: class.id.clone(),
            form,
            error: None,
            open: true,
        })
    }

    /// 访问令牌兑换对话框，不针对具体班级
    pub fn access_request(token: impl Into<String>, session: &Session) -> Result<Self> {
        if !ClassAction::RedeemAccess.is_permitted_for(session.role) {
            return Err(DashboardError::authorization(format!(
                "Role {} may not redeem access tokens",
                session.role
            )));
        }
        Ok(Self {
            target_id: ACCESS_REQUEST_KEY.to_string(),
            form: ActionForm::RedeemAccess {
                token: token.into(),
            },
            error: None,
            open: true,
        })
    }

    pub fn action(&self) -> ClassAction {
        self.form.action()
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// 修改输入；变体不能改变
    pub fn set_form(&mut self, form: ActionForm) -> Result<()> {
        if form.action() != self.form.action() {
            return Err(DashboardError::validation(format!(
                "This dialog collects input for {}, not {}",
                self.form.action(),
                form.action()
            )));
        }
        self.form = form;
        Ok(())
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// 提交并在成功后刷新展示器
    pub async fn submit(
        &mut self,
        presenter: &mut ClassListPresenter,
        inflight: &InFlightRequests,
    ) -> Result<()> {
        let client = Arc::clone(presenter.client());
        let session = presenter.session().clone();
        self.submit_with(&*client, &session, inflight).await?;
        presenter.reload().await
    }

    /// 提交但不刷新，供无状态的 HTTP 处理器使用
    pub async fn submit_with(
        &mut self,
        client: &dyn ClassLifecycleClient,
        session: &Session,
        inflight: &InFlightRequests,
    ) -> Result<()> {
        if !self.open {
            return Err(DashboardError::validation("Dialog is already closed"));
        }
        if let Err(err) = self.form.validate() {
            self.error = Some(err.message().to_string());
            return Err(err);
        }

        let action = self.form.action();
        let guard = inflight.try_acquire(&self.target_id, action)?;
        let result = self.dispatch(client, session).await;
        drop(guard);

        match result {
            Ok(()) => {
                info!(
                    "User {} completed {} on {}",
                    session.user_id, action, self.target_id
                );
                self.error = None;
                self.open = false;
                Ok(())
            }
            Err(err) => {
                warn!(
                    "User {} failed to {} {}: {}",
                    session.user_id, action, self.target_id, err
                );
                self.error = Some(err.message().to_string());
                Err(err)
            }
        }
    }

    async fn dispatch(&self, client: &dyn ClassLifecycleClient, session: &Session) -> Result<()> {
        let id = self.target_id.as_str();
        match &self.form {
            ActionForm::Approve => client.approve_class(session, id).await,
            ActionForm::Reject { motifs } => {
                let motifs: Vec<String> = motifs
                    .iter()
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .collect();
                client.reject_class(session, id, &motifs).await
            }
            ActionForm::Deactivate { reason, comment } => {
                client
                    .deactivate_class(session, id, reason.trim(), comment.as_deref())
                    .await
            }
            ActionForm::Delete => client.delete_class(session, id).await,
            ActionForm::Edit(update) => {
                let mut class = client.get_class(session, id).await?;
                update.apply_to(&mut class)?;
                client.update_class(session, id, &class).await.map(|_| ())
            }
            ActionForm::AssignModerator { moderator_id } => {
                client
                    .assign_moderator(session, id, moderator_id.trim())
                    .await
            }
            ActionForm::RemoveModerator => client.remove_moderator(session, id).await,
            ActionForm::UpdatePublicationRights { droit } => {
                client.update_publication_rights(session, id, *droit).await
            }
            ActionForm::RedeemAccess { token } => {
                client.redeem_access_token(session, token.trim()).await
            }
        }
    }
}
