// src/resolver/fetcher.rs

use crate::{client::RobustClient, models::ConfigUrl};
use futures::{StreamExt, stream};
use log::{debug, warn};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};

/// 成功获取的配置文档
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub config_url: ConfigUrl,
    pub body: Value,
}

/// 并发获取所有配置链接，返回顺序为完成顺序。
///
/// 单个链接失败只记录日志，不影响同批次的其他请求。取消标志置位后不再发起新的请求。
pub async fn fetch_all(
    client: &RobustClient,
    config_urls: Vec<ConfigUrl>,
    max_workers: usize,
    cancellation_token: &AtomicBool,
) -> Vec<FetchedDocument> {
    let max_workers = max_workers.max(1);
    debug!("fetching {} config urls (workers = {})", config_urls.len(), max_workers);

    stream::iter(config_urls)
        .map(|config_url| async move {
            if cancellation_token.load(Ordering::Relaxed) {
                return None;
            }
            match client.fetch_json(&config_url.url).await {
                Ok(body) => Some(FetchedDocument { config_url, body }),
                Err(e) => {
                    warn!("获取配置信息失败: {} ({})", config_url.url, e);
                    None
                }
            }
        })
        .buffer_unordered(max_workers)
        .filter_map(|doc| async move { doc })
        .collect()
        .await
}
