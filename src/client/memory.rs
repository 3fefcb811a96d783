//! 内存版后端
//!
//! 按后端的状态规则维护班级与驳回理由，并记录每一次调用（形如 `PATCH /classes/1/approve`），
//! 供测试与离线演示使用。

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::ClassLifecycleClient;
use crate::errors::{DashboardError, Result};
use crate::models::{
    classes::{
        entities::{ActivationHistoryRecord, ClassEntity, ClassState, PublicationRight},
        requests::NewClassPayload,
    },
    motifs::entities::RejectionMotif,
    users::entities::Session,
};

#[derive(Default)]
struct MemoryState {
    classes: Vec<ClassEntity>,
    motifs: Vec<RejectionMotif>,
    history: HashMap<String, Vec<ActivationHistoryRecord>>,
    calls: Vec<String>,
    fail_next: Option<DashboardError>,
    next_id: u64,
}

#[derive(Default)]
pub struct MemoryClassLifecycleClient {
    state: Mutex<MemoryState>,
}

impl MemoryClassLifecycleClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classes(classes: Vec<ClassEntity>) -> Self {
        let next_id = classes
            .iter()
            .filter_map(|c| c.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            state: Mutex::new(MemoryState {
                classes,
                next_id,
                ..Default::default()
            }),
        }
    }

    pub fn with_motifs(self, motifs: Vec<RejectionMotif>) -> Self {
        self.lock().motifs = motifs;
        self
    }

    /// 已记录的调用，按发生顺序
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// 当前后端持有的班级快照
    pub fn snapshot(&self) -> Vec<ClassEntity> {
        self.lock().classes.clone()
    }

    /// 让下一次调用以给定错误失败（调用仍会被记录）
    pub fn fail_next(&self, err: DashboardError) {
        self.lock().fail_next = Some(err);
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // 记录调用并消费预设的失败
    fn record(&self, call: String) -> Result<MutexGuard<'_, MemoryState>> {
        let mut state = self.lock();
        state.calls.push(call);
        match state.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(state),
        }
    }
}

fn find_mut<'a>(classes: &'a mut [ClassEntity], id: &str) -> Result<&'a mut ClassEntity> {
    classes
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| DashboardError::not_found(format!("Classe {id} introuvable")))
}

fn require_state(class: &ClassEntity, expected: ClassState) -> Result<()> {
    if class.etat == expected {
        Ok(())
    } else {
        Err(DashboardError::backend(format!(
            "status 400: Classe {} en état {}, {} attendu",
            class.id, class.etat, expected
        )))
    }
}

#[async_trait::async_trait]
impl ClassLifecycleClient for MemoryClassLifecycleClient {
    async fn create_class(&self, _: &Session, draft: &NewClassPayload) -> Result<ClassEntity> {
        let mut state = self.record("POST /classes".to_string())?;
        state.next_id += 1;
        let class = ClassEntity {
            id: state.next_id.to_string(),
            nom: draft.nom.clone(),
            niveau: draft.niveau.clone(),
            date_creation: draft.date_creation,
            code_activation: draft.code_activation.clone(),
            etat: ClassState::EnAttenteApprobation,
            etablissement: draft.etablissement.clone(),
            moderator: None,
            droit_publication: draft.droit_publication,
            eleves: vec![],
            parents: vec![],
        };
        state.classes.push(class.clone());
        Ok(class)
    }

    async fn update_class(
        &self,
        _: &Session,
        class_id: &str,
        class: &ClassEntity,
    ) -> Result<ClassEntity> {
        let mut state = self.record(format!("PUT /classes/{class_id}"))?;
        let stored = find_mut(&mut state.classes, class_id)?;
        // 状态、创建时间与已设定的激活码由后端持有
        let etat = stored.etat;
        let date_creation = stored.date_creation;
        let code_activation = stored
            .code_activation
            .clone()
            .or_else(|| class.code_activation.clone());
        *stored = ClassEntity {
            id: class_id.to_string(),
            etat,
            date_creation,
            code_activation,
            ..class.clone()
        };
        Ok(stored.clone())
    }

    async fn get_class(&self, _: &Session, class_id: &str) -> Result<ClassEntity> {
        let mut state = self.record(format!("GET /classes/{class_id}"))?;
        find_mut(&mut state.classes, class_id).map(|c| c.clone())
    }

    async fn list_classes(&self, _: &Session) -> Result<Vec<ClassEntity>> {
        let state = self.record("GET /classes".to_string())?;
        Ok(state.classes.clone())
    }

    async fn list_classes_by_status(
        &self,
        _: &Session,
        etat: ClassState,
    ) -> Result<Vec<ClassEntity>> {
        let state = self.record(format!("GET /classes/by-status?etat={etat}"))?;
        Ok(state
            .classes
            .iter()
            .filter(|c| c.etat == etat)
            .cloned()
            .collect())
    }

    async fn delete_class(&self, _: &Session, class_id: &str) -> Result<()> {
        let mut state = self.record(format!("DELETE /classes/{class_id}"))?;
        let before = state.classes.len();
        state.classes.retain(|c| c.id != class_id);
        if state.classes.len() == before {
            return Err(DashboardError::not_found(format!(
                "Classe {class_id} introuvable"
            )));
        }
        state.history.remove(class_id);
        Ok(())
    }

    async fn approve_class(&self, session: &Session, class_id: &str) -> Result<()> {
        let mut state = self.record(format!("PATCH /classes/{class_id}/approve"))?;
        let class = find_mut(&mut state.classes, class_id)?;
        require_state(class, ClassState::EnAttenteApprobation)?;
        class.etat = ClassState::Actif;
        state
            .history
            .entry(class_id.to_string())
            .or_default()
            .push(ActivationHistoryRecord {
                classe_id: Some(class_id.to_string()),
                utilisateur_id: Some(session.user_id.clone()),
                date_activation: Some(Utc::now()),
                ..Default::default()
            });
        Ok(())
    }

    async fn reject_class(&self, _: &Session, class_id: &str, motifs: &[String]) -> Result<()> {
        let motif = motifs.join(",");
        let mut state = self.record(format!("PATCH /classes/{class_id}/reject?motif={motif}"))?;
        if motif.is_empty() {
            return Err(DashboardError::backend("status 400: motif requis"));
        }
        let class = find_mut(&mut state.classes, class_id)?;
        require_state(class, ClassState::EnAttenteApprobation)?;
        class.etat = ClassState::Inactif;
        Ok(())
    }

    async fn deactivate_class(
        &self,
        session: &Session,
        class_id: &str,
        raison: &str,
        commentaire: Option<&str>,
    ) -> Result<()> {
        let mut state = self.record(format!("PATCH /classes/{class_id}/deactivate"))?;
        let class = find_mut(&mut state.classes, class_id)?;
        require_state(class, ClassState::Actif)?;
        class.etat = ClassState::Inactif;
        state
            .history
            .entry(class_id.to_string())
            .or_default()
            .push(ActivationHistoryRecord {
                classe_id: Some(class_id.to_string()),
                utilisateur_id: Some(session.user_id.clone()),
                date_desactivation: Some(Utc::now()),
                motif: Some(raison.to_string()),
                commentaire: commentaire.map(str::to_string),
                ..Default::default()
            });
        Ok(())
    }

    async fn remove_moderator(&self, _: &Session, class_id: &str) -> Result<()> {
        let mut state = self.record(format!("DELETE /classes/{class_id}/moderator"))?;
        find_mut(&mut state.classes, class_id)?.moderator = None;
        Ok(())
    }

    async fn update_publication_rights(
        &self,
        _: &Session,
        class_id: &str,
        droit: PublicationRight,
    ) -> Result<()> {
        let mut state = self.record(format!(
            "PATCH /classes/{class_id}/publication-rights?droitPublication={droit}"
        ))?;
        find_mut(&mut state.classes, class_id)?.droit_publication = droit;
        Ok(())
    }

    async fn activation_history(
        &self,
        _: &Session,
        class_id: &str,
    ) -> Result<Vec<ActivationHistoryRecord>> {
        let mut state = self.record(format!("GET /classes/{class_id}/activation-history"))?;
        find_mut(&mut state.classes, class_id)?;
        Ok(state.history.get(class_id).cloned().unwrap_or_default())
    }

    async fn redeem_access_token(&self, _: &Session, token: &str) -> Result<()> {
        let state = self.record("POST /classes/access-requests".to_string())?;
        let known = state
            .classes
            .iter()
            .any(|c| c.code_activation.as_deref() == Some(token));
        if known {
            Ok(())
        } else {
            Err(DashboardError::backend("status 400: Jeton d'accès invalide"))
        }
    }

    async fn list_motifs(&self, _: &Session) -> Result<Vec<RejectionMotif>> {
        let state = self.record("GET /motifs-rejet".to_string())?;
        Ok(state.motifs.clone())
    }

    async fn create_motif(&self, _: &Session, motif: &RejectionMotif) -> Result<RejectionMotif> {
        let mut state = self.record("POST /motifs-rejet".to_string())?;
        state.next_id += 1;
        let created = RejectionMotif {
            id: Some(state.next_id.to_string()),
            ..motif.clone()
        };
        state.motifs.push(created.clone());
        Ok(created)
    }

    async fn update_motif(
        &self,
        _: &Session,
        motif_id: &str,
        motif: &RejectionMotif,
    ) -> Result<RejectionMotif> {
        let mut state = self.record(format!("PUT /motifs-rejet/{motif_id}"))?;
        let stored = state
            .motifs
            .iter_mut()
            .find(|m| m.id.as_deref() == Some(motif_id))
            .ok_or_else(|| DashboardError::not_found(format!("Motif {motif_id} introuvable")))?;
        *stored = RejectionMotif {
            id: Some(motif_id.to_string()),
            ..motif.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_motif(&self, _: &Session, motif_id: &str) -> Result<()> {
        let mut state = self.record(format!("DELETE /motifs-rejet/{motif_id}"))?;
        let before = state.motifs.len();
        state.motifs.retain(|m| m.id.as_deref() != Some(motif_id));
        if state.motifs.len() == before {
            return Err(DashboardError::not_found(format!(
                "Motif {motif_id} introuvable"
            )));
        }
        Ok(())
    }
}
