// src/catalog/mod.rs

pub mod loader;
pub mod session;
pub mod tree;

pub use session::Session;
pub use tree::{Book, NodeId, NodeOptions, TagTree};

use crate::{
    config::platform::PlatformConfig,
    constants::api::{params, paths, template_keys},
    resolver::generator::render_template,
};
use std::collections::HashMap;

/// 把选中的教材 ID 转换为教材详情页链接，之后按普通链接处理。
pub fn book_detail_urls(platform: &PlatformConfig, book_ids: &[String]) -> Vec<String> {
    let Some(template) = platform
        .path_config(paths::TCH_MATERIAL)
        .and_then(|p| p.template(template_keys::DETAIL))
        .and_then(|t| t.first())
    else {
        return Vec::new();
    };
    book_ids
        .iter()
        .map(|id| {
            let values = HashMap::from([(params::CONTENT_ID.to_string(), Some(id.clone()))]);
            render_template(template, &values)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_detail_urls_are_valid_inputs() {
        let platform = PlatformConfig::builtin();
        let urls = book_detail_urls(&platform, &["b1".to_string()]);
        assert_eq!(
            urls,
            vec!["https://basic.smartedu.cn/tchMaterial/detail?contentType=assets_document&contentId=b1"]
        );
        assert!(crate::resolver::classifier::validate(&urls[0], &platform).is_some());
    }
}
