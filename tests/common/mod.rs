// tests/common/mod.rs

#![allow(dead_code)]

use smartedu_dl::{
    chooser::FixedChooser,
    client::RobustClient,
    config::{AppConfig, platform::PlatformConfig},
};
use std::sync::Arc;

pub const TEXTBOOK_URL: &str =
    "https://basic.smartedu.cn/tchMaterial/detail?contentType=assets_document&contentId=ABC";

/// 所有接口都指向模拟服务器、随机选择固定为第一个的客户端
pub fn mock_client(base_url: &str) -> Arc<RobustClient> {
    let config = AppConfig {
        platform: Arc::new(PlatformConfig::builtin().redirected_to(base_url)),
        ..AppConfig::default()
    };
    Arc::new(RobustClient::new(Arc::new(config), Arc::new(FixedChooser(0))).expect("client"))
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
