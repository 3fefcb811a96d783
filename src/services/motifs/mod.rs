pub mod list;
pub mod manage;

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::cache::MotifCatalogCache;
use crate::client::ClassLifecycleClient;
use crate::errors::Result;
use crate::models::motifs::requests::MotifRequest;

pub struct MotifService {
    client: Option<Arc<dyn ClassLifecycleClient>>,
}

impl MotifService {
    pub fn new_lazy() -> Self {
        Self { client: None }
    }

    pub(crate) fn get_client(&self, request: &HttpRequest) -> Result<Arc<dyn ClassLifecycleClient>> {
        match &self.client {
            Some(client) => Ok(client.clone()),
            None => super::app_data::<Arc<dyn ClassLifecycleClient>>(request, "Backend client"),
        }
    }

    pub(crate) fn get_cache(&self, request: &HttpRequest) -> Result<MotifCatalogCache> {
        super::app_data::<MotifCatalogCache>(request, "Motif catalog cache")
    }

    // 驳回理由目录（带缓存）
    pub async fn list_motifs(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_motifs(self, request).await
    }

    pub async fn create_motif(
        &self,
        request: &HttpRequest,
        motif: MotifRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_motif(self, request, motif).await
    }

    pub async fn update_motif(
        &self,
        request: &HttpRequest,
        motif_id: String,
        motif: MotifRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_motif(self, request, motif_id, motif).await
    }

    pub async fn delete_motif(
        &self,
        request: &HttpRequest,
        motif_id: String,
    ) -> ActixResult<HttpResponse> {
        manage::delete_motif(self, request, motif_id).await
    }
}
