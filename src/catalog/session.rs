// src/catalog/session.rs

use super::{loader, tree::TagTree};
use crate::{client::RobustClient, error::AppResult};
use tokio::sync::OnceCell;

/// 一次交互会话的上下文。分类树在第一次使用时获取，之后复用到进程结束。
///
/// 不持有客户端：会话中途更换凭据后，已获取的分类树仍然有效。
#[derive(Default)]
pub struct Session {
    catalog: OnceCell<TagTree>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn catalog(&self, client: &RobustClient) -> AppResult<&TagTree> {
        self.catalog
            .get_or_try_init(|| loader::fetch_catalog(client))
            .await
    }

    pub fn is_catalog_loaded(&self) -> bool {
        self.catalog.initialized()
    }
}
