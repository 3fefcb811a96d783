use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::entities::{ClassEntity, ClassState, EntityRef, PublicationRight, parse_timestamp};
use crate::errors::{DashboardError, Result};
use crate::models::common::PaginationQuery;

// 班级列表查询参数（来自HTTP请求）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    pub etat: Option<String>,
    pub etablissement: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

// 创建班级请求
//
// 新班级总是以草稿形式提交，状态固定为 EN_ATTENTE_APPROBATION，
// 之后的状态变化全部以后端为准。
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClassRequest {
    pub nom: String,
    pub niveau: String,
    pub etablissement_id: Option<String>,
    pub code_activation: Option<String>,
    pub droit_publication: Option<PublicationRight>,
}

impl CreateClassRequest {
    pub fn validate(&self) -> Result<()> {
        if self.nom.trim().is_empty() {
            return Err(DashboardError::validation("Class name (nom) is required"));
        }
        if self.niveau.trim().is_empty() {
            return Err(DashboardError::validation("Class level (niveau) is required"));
        }
        Ok(())
    }

    /// 构造发往后端的草稿
    pub fn into_draft(self, now: DateTime<Utc>) -> NewClassPayload {
        NewClassPayload {
            nom: self.nom.trim().to_string(),
            niveau: self.niveau.trim().to_string(),
            date_creation: now,
            code_activation: self.code_activation.filter(|c| !c.trim().is_empty()),
            etat: ClassState::EnAttenteApprobation,
            etablissement: self.etablissement_id.map(EntityRef::from_id),
            droit_publication: self.droit_publication.unwrap_or_default(),
        }
    }
}

/// POST /classes 的请求体
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClassPayload {
    pub nom: String,
    pub niveau: String,
    pub date_creation: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_activation: Option<String>,
    pub etat: ClassState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etablissement: Option<EntityRef>,
    pub droit_publication: PublicationRight,
}

// 更新班级请求（仅包含需要修改的字段，最终以完整实体 PUT 到后端）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClassRequest {
    pub nom: Option<String>,
    pub niveau: Option<String>,
    pub code_activation: Option<String>,
    pub etablissement_id: Option<String>,
    pub droit_publication: Option<PublicationRight>,
}

impl UpdateClassRequest {
    pub fn validate(&self) -> Result<()> {
        if self.nom.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(DashboardError::validation("Class name (nom) must not be empty"));
        }
        if self.niveau.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(DashboardError::validation(
                "Class level (niveau) must not be empty",
            ));
        }
        if self.is_empty() {
            return Err(DashboardError::validation("Nothing to update"));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.nom.is_none()
            && self.niveau.is_none()
            && self.code_activation.is_none()
            && self.etablissement_id.is_none()
            && self.droit_publication.is_none()
    }

    /// 将修改合并到完整实体上（id、dateCreation、etat 不可修改）
    ///
    /// 激活码一旦设置即固定：提交不同的激活码返回校验错误，相同的激活码被忽略；
    /// 合并后实体没有任何变化时同样返回校验错误，不会发出空的 PUT。
    pub fn apply_to(&self, class: &mut ClassEntity) -> Result<()> {
        let before = class.clone();
        if let Some(nom) = &self.nom {
            class.nom = nom.trim().to_string();
        }
        if let Some(niveau) = &self.niveau {
            class.niveau = niveau.trim().to_string();
        }
        if let Some(code) = self.code_activation.as_deref().map(str::trim) {
            match class.code_activation.as_deref() {
                Some(existing) if existing != code => {
                    *class = before;
                    return Err(DashboardError::validation(
                        "Activation code is fixed once set and cannot be changed",
                    ));
                }
                Some(_) => {}
                None if code.is_empty() => {}
                None => class.code_activation = Some(code.to_string()),
            }
        }
        if let Some(etablissement_id) = &self.etablissement_id {
            class.etablissement = Some(EntityRef::from_id(etablissement_id.clone()));
        }
        if let Some(droit) = self.droit_publication {
            class.droit_publication = droit;
        }
        if *class == before {
            return Err(DashboardError::validation("Nothing to update"));
        }
        Ok(())
    }
}

// 驳回请求：至少选择一个驳回理由代码
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectClassRequest {
    #[serde(default)]
    pub motifs: Vec<String>,
}

// 停用请求：理由必填，备注可选
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeactivateClassRequest {
    #[serde(default)]
    pub reason: String,
    pub comment: Option<String>,
}

// 指派版主请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignModeratorRequest {
    #[serde(default)]
    pub moderator_id: String,
}

// 修改发布权限请求
#[derive(Debug, Clone, Deserialize)]
pub struct PublicationRightsRequest {
    pub droit_publication: PublicationRight,
}

// 访问令牌兑换请求（家长/学生通过激活码加入班级）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessRequest {
    #[serde(default)]
    pub token: String,
}

/// 日期区间的哪一端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    From,
    To,
}

/// 解析日期区间参数，接受 RFC 3339 或 `YYYY-MM-DD`
///
/// 纯日期作为下界取当天 00:00:00，作为上界取当天最后一纳秒，两端都包含。
pub fn parse_date_bound(
    raw: Option<&str>,
    field: &str,
    bound: DateBound,
) -> Result<Option<DateTime<Utc>>> {
    let Some(value) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let invalid = || DashboardError::validation(format!("Invalid date for '{field}': {value}"));

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let naive = match bound {
            DateBound::From => date.and_hms_opt(0, 0, 0),
            DateBound::To => date.and_hms_nano_opt(23, 59, 59, 999_999_999),
        };
        return naive.map(|n| Some(n.and_utc())).ok_or_else(invalid);
    }
    parse_timestamp(value).map(Some).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_class() -> ClassEntity {
        ClassEntity {
            id: "1".to_string(),
            nom: "Math".to_string(),
            niveau: "3e".to_string(),
            date_creation: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            code_activation: Some("CODE".to_string()),
            etat: ClassState::Actif,
            etablissement: None,
            moderator: None,
            droit_publication: PublicationRight::Tous,
            eleves: vec![],
            parents: vec![],
        }
    }

    #[test]
    fn test_create_request_validation() {
        let req = CreateClassRequest {
            nom: "  ".to_string(),
            niveau: "3e".to_string(),
            etablissement_id: None,
            code_activation: None,
            droit_publication: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_draft_is_pending() {
        let req = CreateClassRequest {
            nom: " Math ".to_string(),
            niveau: "3e".to_string(),
            etablissement_id: Some("e1".to_string()),
            code_activation: Some(String::new()),
            droit_publication: None,
        };
        let now = Utc::now();
        let draft = req.into_draft(now);
        assert_eq!(draft.etat, ClassState::EnAttenteApprobation);
        assert_eq!(draft.nom, "Math");
        assert!(draft.code_activation.is_none());
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["etat"], "EN_ATTENTE_APPROBATION");
        assert_eq!(value["etablissement"]["id"], "e1");
    }

    #[test]
    fn test_update_keeps_activation_code_and_state() {
        let mut class = sample_class();
        let update = UpdateClassRequest {
            nom: Some("Algèbre".to_string()),
            code_activation: Some("OTHER".to_string()),
            ..Default::default()
        };
        update.validate().unwrap();
        let err = update.apply_to(&mut class).unwrap_err();
        assert_eq!(err.code(), "E006");
        assert_eq!(class, sample_class());

        let update = UpdateClassRequest {
            nom: Some("Algèbre".to_string()),
            code_activation: Some("CODE".to_string()),
            ..Default::default()
        };
        update.apply_to(&mut class).unwrap();
        assert_eq!(class.nom, "Algèbre");
        assert_eq!(class.code_activation.as_deref(), Some("CODE"));
        assert_eq!(class.etat, ClassState::Actif);
    }

    #[test]
    fn test_update_without_effect_rejected() {
        let mut class = sample_class();
        let same_code = UpdateClassRequest {
            code_activation: Some("CODE".to_string()),
            ..Default::default()
        };
        same_code.validate().unwrap();
        assert_eq!(same_code.apply_to(&mut class).unwrap_err().code(), "E006");

        let same_name = UpdateClassRequest {
            nom: Some(" Math ".to_string()),
            ..Default::default()
        };
        assert!(same_name.apply_to(&mut class).is_err());

        class.code_activation = None;
        let first_code = UpdateClassRequest {
            code_activation: Some("NEW-1".to_string()),
            ..Default::default()
        };
        first_code.apply_to(&mut class).unwrap();
        assert_eq!(class.code_activation.as_deref(), Some("NEW-1"));
    }

    #[test]
    fn test_empty_update_rejected() {
        assert!(UpdateClassRequest::default().validate().is_err());
    }

    #[test]
    fn test_parse_date_bound() {
        assert!(parse_date_bound(None, "from", DateBound::From).unwrap().is_none());
        assert!(parse_date_bound(Some(""), "from", DateBound::From).unwrap().is_none());
        assert!(parse_date_bound(Some("yesterday"), "from", DateBound::From).is_err());

        let from = parse_date_bound(Some("2024-03-01"), "from", DateBound::From).unwrap();
        assert_eq!(from, Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));

        let to = parse_date_bound(Some("2024-03-01"), "to", DateBound::To)
            .unwrap()
            .unwrap();
        assert!(to > Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap());
        assert!(to < Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap());

        // 带时间的上界按原值使用
        let to = parse_date_bound(Some("2024-03-01T12:00:00Z"), "to", DateBound::To).unwrap();
        assert_eq!(to, Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()));
    }
}
