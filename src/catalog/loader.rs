// src/catalog/loader.rs

use super::tree::{Book, TagTree};
use crate::{
    client::RobustClient,
    constants::api::{paths, template_keys},
    error::*,
    models::api::{BookRecord, TagNodeData, VersionData},
};
use anyhow::anyhow;
use futures::{StreamExt, stream};
use log::{debug, info, warn};
use std::collections::HashMap;

fn template_url(client: &RobustClient, key: &str) -> AppResult<String> {
    client
        .config()
        .platform
        .path_config(paths::TCH_MATERIAL)
        .and_then(|p| p.template(key))
        .and_then(|t| t.first())
        .map(str::to_string)
        .ok_or_else(|| AppError::Other(anyhow!("缺少教材目录的 '{}' 链接配置", key)))
}

/// 获取教材分类与全部教材列表，构建分类树。
///
/// 分类或版本信息获取失败时返回错误；单个教材列表分片失败只记录警告。
pub async fn fetch_catalog(client: &RobustClient) -> AppResult<TagTree> {
    let tag_url = template_url(client, template_keys::TAG)?;
    let version_url = template_url(client, template_keys::VERSION)?;

    debug!("fetch data = {}", tag_url);
    let tag_data: TagNodeData = serde_json::from_value(client.fetch_json(&tag_url).await?)?;
    debug!("fetch data = {}", version_url);
    let version: VersionData = serde_json::from_value(client.fetch_json(&version_url).await?)?;

    let part_urls = version.part_urls();
    let max_workers = client.config().max_workers.max(1);
    let parts: Vec<Vec<BookRecord>> = stream::iter(part_urls)
        .map(|url| async move {
            let result = async {
                let body = client.fetch_json(&url).await?;
                Ok::<_, AppError>(serde_json::from_value::<Vec<BookRecord>>(body)?)
            }
            .await;
            match result {
                Ok(books) => Some(books),
                Err(e) => {
                    warn!("获取教材列表 '{}' 失败: {}", url, e);
                    None
                }
            }
        })
        .buffered(max_workers)
        .filter_map(|part| async move { part })
        .collect()
        .await;

    let records: Vec<&BookRecord> = parts.iter().flatten().collect();
    debug!("parts_data = {}", records.len());

    let mut tag_names: HashMap<String, String> = HashMap::new();
    for record in &records {
        for tag in &record.tag_list {
            tag_names
                .entry(tag.tag_id.clone())
                .or_insert_with(|| tag.tag_name.clone());
        }
    }

    let mut tree = TagTree::from_tag_data(&tag_data);
    let mut attached = 0;
    for record in &records {
        for tag_path in &record.tag_paths {
            let book = Book {
                id: record.id.clone(),
                title: record.title.clone(),
            };
            if tree.attach_book(tag_path, book, &tag_names) {
                attached += 1;
            }
        }
    }
    info!(
        "教材目录加载完成: {} 个节点, {} 本教材",
        tree.len(),
        attached
    );
    Ok(tree)
}
