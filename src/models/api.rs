// src/models/api.rs

use serde::Deserialize;
use serde_json::Value;

// --- 资源详情 ---

#[derive(Deserialize, Debug, Clone)]
pub struct GlobalTitle {
    #[serde(rename = "zh-CN")]
    pub zh_cn: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TiItem {
    #[serde(default)]
    pub ti_format: String,
    #[serde(default)]
    pub ti_storages: Option<Vec<String>>,
    pub ti_size: Option<u64>,
}

impl TiItem {
    pub fn has_format(&self, suffix: &str) -> bool {
        self.ti_format.trim().eq_ignore_ascii_case(suffix)
    }

    /// 非空的存储地址列表
    pub fn storages(&self) -> &[String] {
        self.ti_storages.as_deref().unwrap_or_default()
    }
}

/// 配置接口返回的单个资源条目（教材详情、课程资源、关联音频等共用）
#[derive(Deserialize, Debug, Clone)]
pub struct ResourceItem {
    pub title: Option<String>,
    pub global_title: Option<GlobalTitle>,
    #[serde(default)]
    pub ti_items: Option<Vec<TiItem>>,
}

impl ResourceItem {
    pub fn display_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or_else(|| self.global_title.as_ref().and_then(|t| t.zh_cn.as_deref()))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn ti_items(&self) -> &[TiItem] {
        self.ti_items.as_deref().unwrap_or_default()
    }
}

// --- 教材分类目录 ---

#[derive(Deserialize, Debug, Clone)]
pub struct TagNodeData {
    pub tag_id: Option<String>,
    pub tag_path: Option<String>,
    pub tag_name: Option<String>,
    #[serde(default)]
    pub hierarchies: Option<Vec<Hierarchy>>,
}

impl TagNodeData {
    /// 只使用第一个层级 (平台数据中始终只有一个)
    pub fn hierarchy(&self) -> Option<&Hierarchy> {
        self.hierarchies.as_deref().and_then(|h| h.first())
    }

    pub fn children(&self) -> &[TagNodeData] {
        self.hierarchy()
            .and_then(|h| h.children.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Hierarchy {
    pub hierarchy_name: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<TagNodeData>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Tag {
    pub tag_id: String,
    pub tag_name: String,
}

/// 教材列表分片中的一本书
#[derive(Deserialize, Debug, Clone)]
pub struct BookRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tag_list: Vec<Tag>,
    #[serde(default)]
    pub tag_paths: Vec<String>,
}

/// data_version.json: `urls` 可能是数组，也可能是逗号分隔的字符串
#[derive(Deserialize, Debug, Clone)]
pub struct VersionData {
    #[serde(default)]
    pub urls: Value,
}

impl VersionData {
    pub fn part_urls(&self) -> Vec<String> {
        match &self.urls {
            Value::String(s) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Value::Array(list) => list
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}
