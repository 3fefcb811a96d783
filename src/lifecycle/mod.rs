//! 班级生命周期状态机（客户端镜像）
//!
//! 后端是状态转换的唯一权威；这里只镜像其转换表，
//! 以便在发出任何网络请求之前拒绝明显非法的操作。
//!
//! ```text
//! EN_ATTENTE_APPROBATION --approve--> ACTIF
//! EN_ATTENTE_APPROBATION --reject---> INACTIF
//! ACTIF -----------------deactivate--> INACTIF
//! ```
//!
//! INACTIF -> ACTIF 的重新激活仅存在于后端的激活历史中，不作为客户端操作提供。

use serde::{Deserialize, Serialize};

use crate::errors::{DashboardError, Result};
use crate::models::classes::entities::{ClassEntity, ClassState};
use crate::models::users::entities::UserRole;

/// 可对班级触发的操作
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ClassAction {
    Approve,
    Reject,
    Deactivate,
    Delete,
    Edit,
    AssignModerator,
    RemoveModerator,
    UpdatePublicationRights,
    RedeemAccess,
}

impl ClassAction {
    /// 针对单个班级的操作（按钮顺序）
    pub const CLASS_ACTIONS: [ClassAction; 8] = [
        ClassAction::Approve,
        ClassAction::Reject,
        ClassAction::Deactivate,
        ClassAction::Edit,
        ClassAction::AssignModerator,
        ClassAction::RemoveModerator,
        ClassAction::UpdatePublicationRights,
        ClassAction::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassAction::Approve => "approve",
            ClassAction::Reject => "reject",
            ClassAction::Deactivate => "deactivate",
            ClassAction::Delete => "delete",
            ClassAction::Edit => "edit",
            ClassAction::AssignModerator => "assign_moderator",
            ClassAction::RemoveModerator => "remove_moderator",
            ClassAction::UpdatePublicationRights => "update_publication_rights",
            ClassAction::RedeemAccess => "redeem_access",
        }
    }

    /// 转换表：该操作在给定状态下是否合法
    pub fn is_allowed_from(&self, state: ClassState) -> bool {
        match self {
            ClassAction::Approve | ClassAction::Reject => {
                state == ClassState::EnAttenteApprobation
            }
            ClassAction::Deactivate => state == ClassState::Actif,
            ClassAction::Delete
            | ClassAction::Edit
            | ClassAction::AssignModerator
            | ClassAction::RemoveModerator
            | ClassAction::UpdatePublicationRights
            | ClassAction::RedeemAccess => true,
        }
    }

    /// 角色策略：哪些角色可以触发该操作
    pub fn permitted_roles(&self) -> &'static [&'static UserRole] {
        match self {
            ClassAction::Approve
            | ClassAction::Reject
            | ClassAction::AssignModerator
            | ClassAction::RemoveModerator => UserRole::admin_roles(),
            ClassAction::Deactivate
            | ClassAction::Delete
            | ClassAction::Edit
            | ClassAction::UpdatePublicationRights => UserRole::staff_roles(),
            ClassAction::RedeemAccess => UserRole::all_roles(),
        }
    }

    pub fn is_permitted_for(&self, role: UserRole) -> bool {
        self.permitted_roles().iter().any(|r| **r == role)
    }
}

impl std::fmt::Display for ClassAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 检查操作对该班级是否合法（状态 + 附加前置条件）
pub fn check_transition(action: ClassAction, class: &ClassEntity) -> Result<()> {
    if !action.is_allowed_from(class.etat) {
        return Err(DashboardError::illegal_transition(format!(
            "Cannot {action} class {} in state {}",
            class.id, class.etat
        )));
    }
    if action == ClassAction::RemoveModerator && class.moderator.is_none() {
        return Err(DashboardError::illegal_transition(format!(
            "Class {} has no moderator to remove",
            class.id
        )));
    }
    Ok(())
}

/// 检查角色与状态，二者都满足才允许
pub fn authorize(action: ClassAction, class: &ClassEntity, role: UserRole) -> Result<()> {
    if !action.is_permitted_for(role) {
        return Err(DashboardError::authorization(format!(
            "Role {role} may not {action} classes"
        )));
    }
    check_transition(action, class)
}

/// 当前角色对该班级可见的操作按钮
pub fn available_actions(class: &ClassEntity, role: UserRole) -> Vec<ClassAction> {
    ClassAction::CLASS_ACTIONS
        .into_iter()
        .filter(|action| authorize(*action, class, role).is_ok())
        .collect()
}
