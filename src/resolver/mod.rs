// src/resolver/mod.rs

pub mod classifier;
pub mod extractor;
pub mod fetcher;
pub mod generator;

use crate::{
    client::RobustClient,
    error::{AppResult, NothingToDo},
    models::ResourceEntry,
};
use extractor::formats_or_default;
use generator::ConfigUrlGenerator;
use log::{debug, info};
use std::{
    collections::HashMap,
    sync::{Arc, atomic::AtomicBool},
};

/// 把输入链接解析为待下载的资源列表
pub struct ResourceResolver {
    client: Arc<RobustClient>,
    cancellation_token: Arc<AtomicBool>,
}

impl ResourceResolver {
    pub fn new(client: Arc<RobustClient>, cancellation_token: Arc<AtomicBool>) -> Self {
        Self {
            client,
            cancellation_token,
        }
    }

    pub async fn resolve(
        &self,
        urls: &[String],
        formats: &[String],
        use_backup: bool,
    ) -> AppResult<Vec<ResourceEntry>> {
        let config = self.client.config();
        let platform = config.platform.as_ref();

        if urls.iter().all(|u| u.trim().is_empty()) {
            return Err(NothingToDo::NoInputUrls.into());
        }
        if !urls.iter().any(|u| classifier::validate(u, platform).is_some()) {
            return Err(NothingToDo::NoValidUrls.into());
        }

        let formats = formats_or_default(formats, platform);
        let config_urls =
            ConfigUrlGenerator::new(platform, self.client.chooser()).generate(urls, &formats, use_backup);
        if config_urls.is_empty() {
            return Err(NothingToDo::NoConfigUrls.into());
        }
        info!("生成 {} 个配置链接", config_urls.len());

        let documents = fetcher::fetch_all(
            &self.client,
            config_urls,
            config.max_workers,
            &self.cancellation_token,
        )
        .await;

        let mut resources: HashMap<String, ResourceEntry> = HashMap::new();
        for doc in &documents {
            for candidate in extractor::extract(&doc.body, &formats, self.client.chooser()) {
                let entry = ResourceEntry {
                    name: candidate.name,
                    download_url: candidate.download_url,
                    original_url: candidate.original_url,
                    config_url: doc.config_url.url.clone(),
                    source_url: doc.config_url.source_url.clone(),
                };
                if let Some(old) = resources.insert(entry.download_url.clone(), entry) {
                    debug!("资源 '{}' 被后续结果覆盖 (来自 {})", old.download_url, old.config_url);
                }
            }
        }

        if resources.is_empty() {
            return Err(NothingToDo::NoResources.into());
        }

        let mut entries: Vec<ResourceEntry> = resources.into_values().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.download_url.cmp(&b.download_url)));
        info!("共解析出 {} 个资源", entries.len());
        Ok(entries)
    }
}
