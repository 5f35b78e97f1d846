// src/models/mod.rs

pub mod api;

use crate::error::AppError;
use crate::ui::symbols;
use colored::{ColoredString, Colorize};
use std::{collections::HashMap, path::PathBuf};

/// 从输入链接中解析出的路径与查询参数，只在生成配置链接时使用一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInputUrl {
    pub raw: String,
    pub host: String,
    pub path: String,
    pub query: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKind {
    Primary,
    Backup,
    Audio,
}

/// 一个已渲染的元数据接口链接，以及产生它的输入链接
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigUrl {
    pub url: String,
    pub kind: ConfigKind,
    pub source_url: String,
}

/// 单个待下载资源。以 `download_url` 为键去重。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    /// 含扩展名的文件名
    pub name: String,
    pub download_url: String,
    /// 改写前的原始存储地址
    pub original_url: String,
    pub config_url: String,
    pub source_url: String,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DownloadStatus {
    Success,
    SizeFailed,
    HttpError,
    NetworkError,
    ConnectionError,
    TimeoutError,
    IoError,
    UnexpectedError,
}

impl DownloadStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadStatus::Success)
    }

    pub fn get_display_info(
        &self,
    ) -> (
        &'static ColoredString,
        fn(ColoredString) -> ColoredString,
        &'static str,
    ) {
        match self {
            DownloadStatus::Success => (&symbols::OK, |s| s.green(), "下载成功"),
            DownloadStatus::SizeFailed => (&symbols::ERROR, |s| s.red(), "校验失败 (大小不匹配)"),
            DownloadStatus::HttpError => (&symbols::ERROR, |s| s.red(), "服务器返回错误"),
            DownloadStatus::NetworkError => (&symbols::ERROR, |s| s.red(), "网络请求失败"),
            DownloadStatus::ConnectionError => (&symbols::ERROR, |s| s.red(), "无法建立连接"),
            DownloadStatus::TimeoutError => (&symbols::WARN, |s| s.yellow(), "网络连接超时"),
            DownloadStatus::IoError => (&symbols::ERROR, |s| s.red(), "本地文件读写错误"),
            DownloadStatus::UnexpectedError => {
                (&symbols::ERROR, |s| s.red(), "发生未预期的程序错误")
            }
        }
    }
}

impl From<&AppError> for DownloadStatus {
    fn from(error: &AppError) -> Self {
        match error {
            AppError::Network(err)
            | AppError::NetworkMiddleware(reqwest_middleware::Error::Reqwest(err)) => {
                if err.is_timeout() {
                    DownloadStatus::TimeoutError
                } else if err.is_connect() {
                    DownloadStatus::ConnectionError
                } else if err.is_status() {
                    DownloadStatus::HttpError
                } else {
                    DownloadStatus::NetworkError
                }
            }
            AppError::NetworkMiddleware(_) => DownloadStatus::NetworkError,
            AppError::HttpStatus(_) => DownloadStatus::HttpError,
            AppError::Timeout(_) => DownloadStatus::TimeoutError,
            AppError::Io(_) => DownloadStatus::IoError,
            AppError::Validation(_) => DownloadStatus::SizeFailed,
            _ => DownloadStatus::UnexpectedError,
        }
    }
}

/// 单个文件的下载结果
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub url: String,
    pub status: DownloadStatus,
    /// 未收到响应时为 `None`
    pub http_status: Option<u16>,
    pub file_path: PathBuf,
    pub byte_size: u64,
    pub original_url: String,
    pub source_url: String,
    pub message: Option<String>,
}

impl DownloadResult {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// 报告中显示的状态码，没有响应时为 -1
    pub fn status_code(&self) -> i32 {
        self.http_status.map_or(-1, i32::from)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}
