// src/resolver/classifier.rs

use crate::{config::platform::PlatformConfig, models::ParsedInputUrl};
use log::debug;
use std::collections::HashMap;
use url::Url;

/// 校验输入链接是否为平台上可解析的单个资源页面。
///
/// 不合法的输入不会报错，只返回 `None`，由调用方从批次中过滤掉。
pub fn validate(raw_url: &str, platform: &PlatformConfig) -> Option<ParsedInputUrl> {
    let raw = raw_url.trim();
    if !raw.starts_with("http://") && !raw.starts_with("https://") {
        debug!("Not a http(s) URL: {}", raw);
        return None;
    }

    let url = Url::parse(raw).ok()?;
    let host = url.host_str()?;
    if url.port().is_some() || !platform.is_allowed_host(host) {
        debug!("Not valid host = {}", host);
        return None;
    }

    let path = url.path();
    if platform.path_config(path).is_none() || platform.is_index_path(path) {
        debug!("Not valid path = {}", path);
        return None;
    }

    let mut query = HashMap::new();
    for (key, value) in url.query_pairs() {
        query.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }

    Some(ParsedInputUrl {
        raw: raw.to_string(),
        host: platform.canonical_host(host).to_string(),
        path: path.to_string(),
        query,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform() -> PlatformConfig {
        PlatformConfig::builtin()
    }

    #[test]
    fn test_accepts_detail_url() {
        let parsed = validate(
            "https://basic.smartedu.cn/tchMaterial/detail?contentType=assets_document&contentId=ABC",
            &platform(),
        )
        .expect("detail url should be valid");
        assert_eq!(parsed.path, "/tchMaterial/detail");
        assert_eq!(parsed.query.get("contentId").map(String::as_str), Some("ABC"));
        assert_eq!(
            parsed.query.get("contentType").map(String::as_str),
            Some("assets_document")
        );
    }

    #[test]
    fn test_rejects_unknown_hosts() {
        for url in [
            "https://example.com/tchMaterial/detail?contentId=ABC",
            "https://smartedu.cn.evil.com/tchMaterial/detail?contentId=ABC",
            "https://basic.smartedu.cn:8443/tchMaterial/detail?contentId=ABC",
        ] {
            assert!(validate(url, &platform()).is_none(), "{url}");
        }
    }

    #[test]
    fn test_rejects_index_paths_on_valid_host() {
        assert!(validate("https://basic.smartedu.cn/tchMaterial", &platform()).is_none());
        assert!(validate("https://basic.smartedu.cn/syncClassroom", &platform()).is_none());
    }

    #[test]
    fn test_rejects_unknown_path_and_scheme() {
        assert!(validate("https://basic.smartedu.cn/unknown/detail?contentId=1", &platform()).is_none());
        assert!(validate("ftp://basic.smartedu.cn/tchMaterial/detail", &platform()).is_none());
        assert!(validate("basic.smartedu.cn/tchMaterial/detail", &platform()).is_none());
        assert!(validate("", &platform()).is_none());
    }

    #[test]
    fn test_alias_host_maps_to_canonical() {
        let parsed = validate(
            "https://web-bd.ykt.eduyun.cn/syncClassroom/prepare/detail?resourceId=R1",
            &platform(),
        )
        .unwrap();
        assert_eq!(parsed.host, "basic.smartedu.cn");
    }

    #[test]
    fn test_first_query_value_wins() {
        let parsed = validate(
            "https://basic.smartedu.cn/tchMaterial/detail?contentId=first&contentId=second",
            &platform(),
        )
        .unwrap();
        assert_eq!(parsed.query.get("contentId").map(String::as_str), Some("first"));
    }
}
