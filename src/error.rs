// src/error.rs

use thiserror::Error;

/// 没有可执行任务时的具体原因。与部分失败不同，它表示整个流程在下载前就结束了。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NothingToDo {
    NoInputUrls,
    NoValidUrls,
    NoConfigUrls,
    NoResources,
}

impl std::fmt::Display for NothingToDo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            NothingToDo::NoInputUrls => "没有提供任何链接",
            NothingToDo::NoValidUrls => "没有有效的资源链接",
            NothingToDo::NoConfigUrls => "未能生成任何配置链接",
            NothingToDo::NoResources => "没有找到可下载的资源文件",
        };
        f.write_str(msg)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("网络请求失败: {0}")]
    Network(#[from] reqwest::Error),
    #[error("网络中间件错误: {0}")]
    NetworkMiddleware(#[from] reqwest_middleware::Error),
    #[error("服务器返回错误状态码: {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("请求超时 ({0:?})")]
    Timeout(std::time::Duration),
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),
    #[error("无法解析来自 '{url}' 的API响应: {source}")]
    ApiParseFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("URL 解析错误: {0}")]
    Url(#[from] url::ParseError),
    #[error("文件校验失败: {0}")]
    Validation(String),
    #[error("{0}")]
    NothingToDo(NothingToDo),
    #[error("用户中断")]
    UserInterrupt,
    #[error("{0}")] // 只打印内部信息，不加任何前缀
    UserInputError(String),
    #[error("未知错误: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<NothingToDo> for AppError {
    fn from(reason: NothingToDo) -> Self {
        AppError::NothingToDo(reason)
    }
}

pub type AppResult<T> = Result<T, AppError>;
