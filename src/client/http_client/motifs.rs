//! 驳回理由目录接口调用

use reqwest::Method;

use super::{HttpClassLifecycleClient, path_segment};
use crate::errors::Result;
use crate::models::{motifs::entities::RejectionMotif, users::entities::Session};

const MOTIFS_PATH: &str = "/motifs-rejet";

impl HttpClassLifecycleClient {
    pub async fn list_motifs_impl(&self, session: &Session) -> Result<Vec<RejectionMotif>> {
        let builder = self.request(Method::GET, MOTIFS_PATH, session);
        self.send_json(builder, "list rejection motifs").await
    }

    pub async fn create_motif_impl(
        &self,
        session: &Session,
        motif: &RejectionMotif,
    ) -> Result<RejectionMotif> {
        let builder = self.request(Method::POST, MOTIFS_PATH, session).json(motif);
        self.send_json(builder, &format!("create rejection motif {}", motif.code))
            .await
    }

    pub async fn update_motif_impl(
        &self,
        session: &Session,
        motif_id: &str,
        motif: &RejectionMotif,
    ) -> Result<RejectionMotif> {
        let id = path_segment(motif_id, "motif")?;
        let builder = self
            .request(Method::PUT, &format!("{MOTIFS_PATH}/{id}"), session)
            .json(motif);
        self.send_json(builder, &format!("update rejection motif {id}"))
            .await
    }

    pub async fn delete_motif_impl(&self, session: &Session, motif_id: &str) -> Result<()> {
        let id = path_segment(motif_id, "motif")?;
        let builder = self.request(Method::DELETE, &format!("{MOTIFS_PATH}/{id}"), session);
        self.send_empty(builder, &format!("delete rejection motif {id}"))
            .await
    }
}
