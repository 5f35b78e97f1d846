// src/resolver/extractor.rs

use crate::{
    chooser::{self, Chooser},
    config::platform::PlatformConfig,
    constants,
    models::api::ResourceItem,
};
use itertools::Itertools;
use log::{debug, warn};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use url::Url;

static PRIVATE_HOST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ndr-(doc-)?private").unwrap());
static PDF_FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^/]+\.pdf$").unwrap());

/// 从配置信息中提取出的候选资源
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCandidate {
    /// 含扩展名的文件名
    pub name: String,
    /// 改写后的下载地址
    pub download_url: String,
    pub original_url: String,
}

/// 规范化格式列表：小写、去空白、别名映射，丢弃不支持的格式，保持调用方顺序并去重。
pub fn normalize_formats(formats: &[String], platform: &PlatformConfig) -> Vec<String> {
    formats
        .iter()
        .map(|f| platform.canonical_format(f))
        .filter(|f| {
            let ok = platform.is_accepted_format(f);
            if !ok && !f.is_empty() {
                warn!("不支持的格式: {}", f);
            }
            ok
        })
        .unique()
        .collect()
}

/// 同 [`normalize_formats`]，但没有可用格式时回退为 `["pdf"]`
pub fn formats_or_default(formats: &[String], platform: &PlatformConfig) -> Vec<String> {
    let formats = normalize_formats(formats, platform);
    if formats.is_empty() {
        debug!("no usable format, fall back to {}", constants::DEFAULT_FORMAT);
        vec![constants::DEFAULT_FORMAT.to_string()]
    } else {
        formats
    }
}

/// 把存储地址改写为可直接下载的地址。两条规则各自独立生效：
///
/// - 路径末尾的 `*.pdf` 文件名换成固定的 `pdf.pdf`；
/// - 主机名中的 `ndr-private` / `ndr-doc-private` 换成 `ndr`。
///
/// 两条都不适用时原样返回。改写结果再次改写不会变化。
pub fn rewrite_storage_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };
    let mut changed = false;

    if let Some(host) = url.host_str()
        && PRIVATE_HOST_RE.is_match(host)
    {
        let public_host = PRIVATE_HOST_RE.replace_all(host, "ndr").into_owned();
        if url.set_host(Some(&public_host)).is_ok() {
            changed = true;
        }
    }
    if PDF_FILENAME_RE.is_match(url.path()) {
        let path = PDF_FILENAME_RE.replace(url.path(), "pdf.pdf").into_owned();
        url.set_path(&path);
        changed = true;
    }

    if !changed {
        return raw.to_string();
    }
    let new_url = url.to_string();
    debug!("Raw URL = {}, New URL = {}", raw, new_url);
    new_url
}

/// 找出需要扫描的资源条目
fn scan_items(document: &Value) -> Vec<ResourceItem> {
    let items = match document {
        Value::Object(map) => match map
            .get("relations")
            .and_then(|r| r.get("national_course_resource"))
        {
            Some(list @ Value::Array(_)) => list.clone(),
            _ => Value::Array(vec![document.clone()]),
        },
        Value::Array(_) => document.clone(),
        _ => return Vec::new(),
    };

    let Value::Array(list) = items else {
        return Vec::new();
    };
    list.into_iter()
        .filter_map(|v| match serde_json::from_value::<ResourceItem>(v) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!("skip malformed item: {}", e);
                None
            }
        })
        .collect()
}

/// 从单个配置文档中提取资源。每个条目按格式优先级只取第一个匹配的格式。
pub fn extract(document: &Value, formats: &[String], chooser: &dyn Chooser) -> Vec<ResourceCandidate> {
    debug!("extract suffix = {:?}", formats);
    scan_items(document)
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            formats.iter().find_map(|suffix| {
                let storages: Vec<&String> = item
                    .ti_items()
                    .iter()
                    .filter(|ti| ti.has_format(suffix))
                    .map(|ti| {
                        ti.storages()
                            .iter()
                            .filter(|s| !s.trim().is_empty())
                            .collect::<Vec<_>>()
                    })
                    .find(|s| !s.is_empty())?;
                let raw = chooser::choose(chooser, &storages)?.trim();
                let title = item
                    .display_title()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{}-{:02}", suffix.to_uppercase(), i));
                Some(ResourceCandidate {
                    name: format!("{}.{}", title, suffix),
                    download_url: rewrite_storage_url(raw),
                    original_url: raw.to_string(),
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chooser::FixedChooser;
    use serde_json::json;

    fn formats(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_formats() {
        let platform = PlatformConfig::builtin();
        assert_eq!(
            normalize_formats(&formats(&[" PDF ", "jpeg", "exe", "pdf", "MPEG"]), &platform),
            vec!["pdf", "jpg", "mp3"]
        );
        assert!(normalize_formats(&formats(&["m3u8"]), &platform).is_empty());
    }

    #[test]
    fn test_formats_or_default() {
        let platform = PlatformConfig::builtin();
        assert_eq!(formats_or_default(&formats(&["exe"]), &platform), vec!["pdf"]);
        assert_eq!(formats_or_default(&[], &platform), vec!["pdf"]);
        assert_eq!(formats_or_default(&formats(&["OGA", "pdf"]), &platform), vec!["ogg", "pdf"]);
    }

    #[test]
    fn test_rewrite_private_host_and_pdf_name() {
        let raw = "https://r1-ndr-private.ykt.cbern.com.cn/edu_product/esp/assets/ABC.pkg/数学.pdf";
        let rewritten = rewrite_storage_url(raw);
        assert_eq!(
            rewritten,
            "https://r1-ndr.ykt.cbern.com.cn/edu_product/esp/assets/ABC.pkg/pdf.pdf"
        );
        assert_eq!(rewrite_storage_url(&rewritten), rewritten);

        let doc_private = "https://r2-ndr-doc-private.ykt.cbern.com.cn/x/y/book.pdf";
        assert_eq!(
            rewrite_storage_url(doc_private),
            "https://r2-ndr.ykt.cbern.com.cn/x/y/pdf.pdf"
        );
    }

    #[test]
    fn test_pdf_name_rewritten_on_public_host() {
        let raw = "https://r1-ndr.ykt.cbern.com.cn/edu_product/esp/assets/X.pkg/book.pdf";
        assert_eq!(
            rewrite_storage_url(raw),
            "https://r1-ndr.ykt.cbern.com.cn/edu_product/esp/assets/X.pkg/pdf.pdf"
        );
    }

    #[test]
    fn test_private_host_rewritten_without_pdf() {
        assert_eq!(
            rewrite_storage_url("https://r3-ndr-private.ykt.cbern.com.cn/a/audio.mp3"),
            "https://r3-ndr.ykt.cbern.com.cn/a/audio.mp3"
        );
    }

    #[test]
    fn test_other_urls_untouched() {
        let raw = "https://r1-ndr.ykt.cbern.com.cn/x/y/track.mp3";
        assert_eq!(rewrite_storage_url(raw), raw);
        // `.pdf` 不在末尾时不改写
        let with_dir = "https://cdn/book.pdf/cover.jpg";
        assert_eq!(rewrite_storage_url(with_dir), with_dir);
        assert_eq!(rewrite_storage_url("not a url"), "not a url");
    }

    #[test]
    fn test_extract_single_document() {
        let doc = json!({
            "title": "语文 一年级上册",
            "ti_items": [
                {"ti_format": "jpg", "ti_storages": ["https://cdn/a.jpg"]},
                {"ti_format": " PDF ", "ti_storages": ["https://cdn/m1/book.pdf", "https://cdn/m2/book.pdf"]}
            ]
        });
        let out = extract(&doc, &formats(&["pdf"]), &FixedChooser(1));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "语文 一年级上册.pdf");
        assert_eq!(out[0].download_url, "https://cdn/m2/pdf.pdf");
        assert_eq!(out[0].original_url, "https://cdn/m2/book.pdf");
    }

    #[test]
    fn test_first_format_wins_per_item() {
        let doc = json!({
            "title": "T",
            "ti_items": [
                {"ti_format": "jpg", "ti_storages": ["https://cdn/a.jpg"]},
                {"ti_format": "pdf", "ti_storages": ["https://cdn/a.pdf"]}
            ]
        });
        let out = extract(&doc, &formats(&["jpg", "pdf"]), &FixedChooser(0));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "T.jpg");

        let out = extract(&doc, &formats(&["pdf", "jpg"]), &FixedChooser(0));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "T.pdf");
    }

    #[test]
    fn test_empty_storages_skip_to_next_format() {
        let doc = json!({
            "title": "T",
            "ti_items": [
                {"ti_format": "pdf", "ti_storages": []},
                {"ti_format": "jpg", "ti_storages": ["https://cdn/a.jpg"]}
            ]
        });
        let out = extract(&doc, &formats(&["pdf", "jpg"]), &FixedChooser(0));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "T.jpg");
    }

    #[test]
    fn test_relations_list_and_title_fallback() {
        let doc = json!({
            "title": "课程",
            "relations": {
                "national_course_resource": [
                    {"global_title": {"zh-CN": "课件"}, "ti_items": [{"ti_format": "pdf", "ti_storages": ["https://cdn/0.pdf"]}]},
                    {"ti_items": [{"ti_format": "pdf", "ti_storages": ["https://cdn/1.pdf"]}]},
                    {"title": "视频", "ti_items": [{"ti_format": "m3u8", "ti_storages": ["https://cdn/v.m3u8"]}]}
                ]
            }
        });
        let out = extract(&doc, &formats(&["pdf"]), &FixedChooser(0));
        let names: Vec<&str> = out.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["课件.pdf", "PDF-01.pdf"]);
    }

    #[test]
    fn test_array_document_is_scanned_directly() {
        let doc = json!([
            {"title": "第一课", "ti_items": [{"ti_format": "mp3", "ti_storages": ["https://cdn/1.mp3"]}]},
            {"title": "第二课", "ti_items": [{"ti_format": "mp3", "ti_storages": ["https://r1-ndr-private.ykt.cbern.com.cn/2.mp3"]}]}
        ]);
        let out = extract(&doc, &formats(&["mp3"]), &FixedChooser(0));
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].download_url, "https://r1-ndr.ykt.cbern.com.cn/2.mp3");
        assert_eq!(out[1].original_url, "https://r1-ndr-private.ykt.cbern.com.cn/2.mp3");
    }

    #[test]
    fn test_unexpected_documents_yield_nothing() {
        assert!(extract(&json!("text"), &formats(&["pdf"]), &FixedChooser(0)).is_empty());
        assert!(extract(&json!({"title": "x"}), &formats(&["pdf"]), &FixedChooser(0)).is_empty());
        assert!(extract(&json!([1, 2]), &formats(&["pdf"]), &FixedChooser(0)).is_empty());
    }
}
