// src/constants.rs

use std::time::Duration;

pub const UI_WIDTH: usize = 88;
pub const URL_TRUNCATE_LENGTH: usize = 60;
pub const PATH_TRUNCATE_LENGTH: usize = 50;
pub const MAX_FILENAME_BYTES: usize = 200;
pub const CONFIG_DIR_NAME: &str = concat!(".", clap::crate_name!());
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = concat!(clap::crate_name!(), ".log");
pub const LOG_FALLBACK_FILE_NAME: &str = "fallback.log";
pub const DEFAULT_SAVE_DIR: &str = "downloads";
pub const DEFAULT_FORMAT: &str = "pdf";
pub const DEFAULT_MAX_WORKERS: usize = 5;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DOWNLOAD_CHUNK_SIZE: usize = 16 * 1024;

/// 请求头中携带登录信息的字段名
pub const AUTH_HEADER: &str = "X-ND-AUTH";
/// 只有包含该标记的凭据才会被发送
pub const AUTH_MARKER: &str = "mac id=";
pub const AUTH_ENV_VAR: &str = "X_ND_AUTH";

pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
];

pub const HELP_AUTH_GUIDE: &str = r#"
1. 登录平台: 使用 Chrome / Edge / Firefox 浏览器登录 https://basic.smartedu.cn
2. 打开开发者工具 (F12)，切换到“网络” (Network) 标签页。
3. 刷新页面，任选一个发往 *.ykt.cbern.com.cn 的请求。
4. 在请求头中找到 X-ND-AUTH 字段，形如:
   MAC id="...",nonce="...",mac="..."
5. 复制整段内容，通过 --auth 参数或环境变量 X_ND_AUTH 提供。"#;

pub mod api {
    pub mod template_keys {
        pub const DEFAULT: &str = "default";
        pub const BACKUP: &str = "backup";
        pub const AUDIO: &str = "audio";
        pub const THEMATIC_COURSE: &str = "thematic_course";
        pub const TAG: &str = "tag";
        pub const VERSION: &str = "version";
        pub const DETAIL: &str = "detail";
    }
    pub mod params {
        pub const CONTENT_TYPE: &str = "contentType";
        pub const SERVER: &str = "server";
        pub const CONTENT_ID: &str = "contentId";
    }
    pub mod resource_types {
        pub const ASSETS_DOCUMENT: &str = "assets_document";
        pub const ASSETS_AUDIO: &str = "assets_audio";
        pub const ASSETS_VIDEO: &str = "assets_video";
        pub const THEMATIC_COURSE: &str = "thematic_course";
    }
    pub mod paths {
        pub const TCH_MATERIAL: &str = "/tchMaterial";
        pub const SYNC_CLASSROOM: &str = "/syncClassroom";
    }
}
