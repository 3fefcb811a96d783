use serde::Deserialize;

use super::entities::RejectionMotif;
use crate::errors::{DashboardError, Result};

// 创建/更新驳回理由请求
#[derive(Debug, Clone, Deserialize)]
pub struct MotifRequest {
    pub code: String,
    pub descriptif: String,
}

impl MotifRequest {
    pub fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(DashboardError::validation("Motif code is required"));
        }
        if self.descriptif.trim().is_empty() {
            return Err(DashboardError::validation("Motif description is required"));
        }
        Ok(())
    }

    pub fn into_motif(self, id: Option<String>) -> RejectionMotif {
        RejectionMotif {
            id,
            code: self.code.trim().to_uppercase(),
            descriptif: self.descriptif.trim().to_string(),
        }
    }
}
