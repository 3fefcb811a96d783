use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::MotifCatalogCache;
use crate::client::{ClassLifecycleClient, create_client};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::modals::InFlightRequests;

pub struct StartupContext {
    pub client: Arc<dyn ClassLifecycleClient>,
    pub inflight: InFlightRequests,
    pub motif_cache: MotifCatalogCache,
}

/// 准备服务器启动的上下文
/// 包括后端客户端、进行中请求表和驳回理由缓存
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let config = AppConfig::get();

    let client = create_client(&config.backend)?;
    warn!("ScholChat backend client targeting {}", config.backend.base_url);

    let inflight = InFlightRequests::new();
    debug!("In-flight request map initialized");

    let motif_cache = MotifCatalogCache::new(&config.cache);
    warn!("Motif catalog cache initialized");

    Ok(StartupContext {
        client,
        inflight,
        motif_cache,
    })
}
