//! 驳回理由目录缓存
//!
//! 目录很少变化，读取走 moka 的带 TTL 缓存；任何写操作之后整体失效。

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use crate::client::ClassLifecycleClient;
use crate::config::CacheConfig;
use crate::errors::Result;
use crate::models::motifs::entities::RejectionMotif;
use crate::models::users::entities::Session;

const CATALOG_KEY: &str = "motifs-rejet";

#[derive(Clone)]
pub struct MotifCatalogCache {
    inner: Cache<String, Arc<Vec<RejectionMotif>>>,
}

impl MotifCatalogCache {
    pub fn new(config: &CacheConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.motif_ttl_secs))
            .build();

        debug!(
            "Motif catalog cache initialized (ttl: {}s, max capacity: {})",
            config.motif_ttl_secs, config.max_capacity
        );
        Self { inner }
    }

    pub async fn invalidate(&self) {
        debug!("Motif catalog cache invalidated");
        self.inner.invalidate(CATALOG_KEY).await;
    }

    /// 命中缓存时直接返回，否则从后端拉取；并发的未命中只会触发一次请求
    pub async fn get_or_fetch(
        &self,
        client: &dyn ClassLifecycleClient,
        session: &Session,
    ) -> Result<Arc<Vec<RejectionMotif>>> {
        self.inner
            .try_get_with(CATALOG_KEY.to_string(), async {
                debug!("Motif catalog cache miss, fetching from backend");
                client.list_motifs(session).await.map(Arc::new)
            })
            .await
            .map_err(|e| (*e).clone())
    }
}
