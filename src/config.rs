// src/config.rs

pub mod auth;
pub mod platform;

use self::platform::PlatformConfig;
use crate::{cli::Cli, constants, error::*};
use anyhow::{Context, anyhow};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::Arc, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkConfig {
    pub server_prefixes: Option<Vec<String>>,
    pub connect_timeout_secs: Option<u64>,
    pub fetch_timeout_secs: Option<u64>,
    pub download_timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub max_workers: Option<usize>,
}

/// 用户主目录下可选的配置文件 `~/.smartedu-dl/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExternalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agents: Option<Vec<String>>,
}

pub(crate) fn get_config_path() -> AppResult<PathBuf> {
    let path = dirs::home_dir()
        .ok_or_else(|| AppError::Other(anyhow!("无法获取用户主目录")))?
        .join(constants::CONFIG_DIR_NAME)
        .join(constants::CONFIG_FILE_NAME);
    Ok(path)
}

/// 读取配置文件；文件不存在时返回默认值，存在但无法解析时报错。
pub(crate) fn load_external_config() -> AppResult<ExternalConfig> {
    let config_path = get_config_path()?;
    if !config_path.is_file() {
        debug!("配置文件 {:?} 不存在，使用内置默认配置。", config_path);
        return Ok(ExternalConfig::default());
    }
    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("读取配置文件 '{}' 失败", config_path.display()))?;
    let config: ExternalConfig = serde_json::from_str(&content)
        .with_context(|| format!("解析配置文件 '{}' 失败", config_path.display()))?;
    info!("已加载配置文件: {}", config_path.display());
    Ok(config)
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub max_workers: usize,
    pub user_agents: Vec<String>,
    pub connect_timeout: Duration,
    pub fetch_timeout: Duration,
    pub download_timeout: Duration,
    pub max_retries: u32,
    /// 已通过格式校验的 X-ND-AUTH 凭据
    pub auth: Option<String>,
    pub platform: Arc<PlatformConfig>,
}

impl AppConfig {
    pub fn new(args: &Cli) -> AppResult<Self> {
        let external = load_external_config()?;
        Ok(Self::from_parts(args, external))
    }

    pub(crate) fn from_parts(args: &Cli, external: ExternalConfig) -> Self {
        let network = external.network;
        let mut platform = PlatformConfig::builtin();
        if let Some(prefixes) = network.server_prefixes.filter(|p| !p.is_empty()) {
            platform.server_prefixes = prefixes;
        }

        let (auth, source) = auth::resolve_auth(args.auth.as_deref(), external.auth.as_deref());
        if auth.is_some() {
            info!("从 {} 加载 X-ND-AUTH", source);
        }

        Self {
            max_workers: args
                .workers
                .or(network.max_workers)
                .unwrap_or(constants::DEFAULT_MAX_WORKERS)
                .max(1),
            user_agents: external
                .user_agents
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| constants::USER_AGENTS.iter().map(|s| s.to_string()).collect()),
            connect_timeout: network
                .connect_timeout_secs
                .map_or(constants::CONNECT_TIMEOUT, Duration::from_secs),
            fetch_timeout: network
                .fetch_timeout_secs
                .map_or(constants::FETCH_TIMEOUT, Duration::from_secs),
            download_timeout: network
                .download_timeout_secs
                .map_or(constants::DOWNLOAD_TIMEOUT, Duration::from_secs),
            max_retries: network.max_retries.unwrap_or(constants::DEFAULT_MAX_RETRIES),
            auth,
            platform: Arc::new(platform),
        }
    }
}

#[cfg(feature = "testing")]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_workers: 5,
            user_agents: vec!["test-agent/1.0".to_string()],
            connect_timeout: Duration::from_secs(2),
            fetch_timeout: constants::FETCH_TIMEOUT,
            download_timeout: constants::DOWNLOAD_TIMEOUT,
            max_retries: 0,
            auth: None,
            platform: Arc::new(PlatformConfig::builtin()),
        }
    }
}
