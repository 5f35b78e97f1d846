// src/config/auth.rs

use crate::constants;
use log::{debug, warn};

/// 凭据必须包含 `mac id=` 标记（不区分大小写）才会作为 X-ND-AUTH 发送
pub fn is_valid_auth(auth: &str) -> bool {
    auth.to_lowercase().contains(constants::AUTH_MARKER)
}

/// 按 命令行参数 > 环境变量 > 配置文件 的顺序选取凭据。
///
/// 返回 `(凭据, 来源描述)`；不符合格式的凭据会被忽略并记录警告。
pub fn resolve_auth(cli_auth: Option<&str>, file_auth: Option<&str>) -> (Option<String>, String) {
    let env_auth = std::env::var(constants::AUTH_ENV_VAR).ok();
    let candidates = [
        (cli_auth.map(str::to_string), "命令行参数".to_string()),
        (env_auth, format!("环境变量 ({})", constants::AUTH_ENV_VAR)),
        (file_auth.map(str::to_string), "本地配置文件".to_string()),
    ];

    for (value, source) in candidates {
        let Some(value) = value.map(|v| v.trim().to_string()) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        if is_valid_auth(&value) {
            debug!("使用来自{}的 X-ND-AUTH", source);
            return (Some(value), source);
        }
        warn!("来自{}的 X-ND-AUTH 格式不正确 (缺少 'MAC id=')，已忽略", source);
    }
    debug!("未配置 X-ND-AUTH");
    (None, "未找到".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_is_case_insensitive() {
        assert!(is_valid_auth(r#"MAC id="abc",nonce="0",mac="0""#));
        assert!(is_valid_auth(r#"mac id="abc""#));
        assert!(!is_valid_auth("Bearer abc"));
    }

    #[test]
    fn test_cli_value_takes_priority() {
        let (auth, source) = resolve_auth(Some(r#"MAC id="cli""#), Some(r#"MAC id="file""#));
        assert_eq!(auth.as_deref(), Some(r#"MAC id="cli""#));
        assert_eq!(source, "命令行参数");
    }

    #[test]
    fn test_malformed_cli_value_falls_through() {
        let (auth, _) = resolve_auth(Some("token-without-marker"), Some(r#"MAC id="file""#));
        // 环境变量在测试环境中通常不存在，结果来自配置文件或环境变量之一
        assert!(auth.is_some_and(|a| is_valid_auth(&a)));
    }
}
