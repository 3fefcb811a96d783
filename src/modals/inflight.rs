//! 进行中请求表
//!
//! 以 (实体 id, 操作) 为键记录正在提交的请求。同一键的重复提交会被立即拒绝，
//! 不会发出第二个网络请求。守卫在 drop 时释放，提交失败或 panic 都不会留下残留标记。

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use crate::errors::{DashboardError, Result};
use crate::lifecycle::ClassAction;

/// 访问令牌兑换不针对具体班级，使用固定的哨兵键
pub const ACCESS_REQUEST_KEY: &str = "access-request";

type InFlightKey = (String, ClassAction);

#[derive(Clone, Default)]
pub struct InFlightRequests {
    inner: Arc<DashMap<InFlightKey, Instant>>,
}

impl InFlightRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// 尝试占用 (target, action)，已被占用时返回 `DuplicateRequest`
    pub fn try_acquire(&self, target: &str, action: ClassAction) -> Result<InFlightGuard> {
        let key = (target.to_string(), action);
        match self.inner.entry(key.clone()) {
            Entry::Occupied(entry) => {
                let elapsed = entry.get().elapsed();
                debug!(
                    "Rejecting duplicate {} on {} (in flight for {:?})",
                    action, target, elapsed
                );
                Err(DashboardError::duplicate_request(format!(
                    "A {action} request for {target} is already in progress"
                )))
            }
            Entry::Vacant(entry) => {
                entry.insert(Instant::now());
                Ok(InFlightGuard {
                    map: Arc::clone(&self.inner),
                    key,
                })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// 进行中标记的守卫，drop 时自动清除
pub struct InFlightGuard {
    map: Arc<DashMap<InFlightKey, Instant>>,
    key: InFlightKey,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.map.remove(&self.key);
    }
}
