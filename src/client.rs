// src/client.rs

use crate::{
    chooser::{self, Chooser},
    config::AppConfig,
    constants,
    error::*,
};
use log::debug;
use reqwest::{
    IntoUrl, Response,
    header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT},
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde_json::Value;
use std::{sync::Arc, time::Duration};

#[derive(Clone)]
pub struct RobustClient {
    pub client: ClientWithMiddleware,
    config: Arc<AppConfig>,
    chooser: Arc<dyn Chooser>,
}

impl RobustClient {
    pub fn new(config: Arc<AppConfig>, chooser: Arc<dyn Chooser>) -> AppResult<Self> {
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(
            reqwest::Client::builder()
                .connect_timeout(config.connect_timeout)
                .pool_max_idle_per_host(config.max_workers * 2)
                .build()?,
        )
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

        Ok(Self {
            client,
            config,
            chooser,
        })
    }

    /// 使用新的凭据构建客户端，其余配置保持不变
    pub fn with_auth(&self, auth: Option<String>) -> AppResult<Self> {
        let mut config = (*self.config).clone();
        config.auth = auth;
        Self::new(Arc::new(config), self.chooser.clone())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn chooser(&self) -> &dyn Chooser {
        self.chooser.as_ref()
    }

    /// 每次请求随机选择一个 User-Agent，并在配置了凭据时附带 X-ND-AUTH。
    pub fn request_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(ua) = chooser::choose(self.chooser(), &self.config.user_agents)
            && let Ok(value) = HeaderValue::from_str(ua)
        {
            headers.insert(USER_AGENT, value);
        }
        if let Some(auth) = &self.config.auth
            && let Ok(value) = HeaderValue::from_str(auth)
        {
            headers.insert(HeaderName::from_static("x-nd-auth"), value);
        }
        headers
    }

    fn request<T: IntoUrl>(&self, url: T) -> RequestBuilder {
        self.client.get(url).headers(self.request_headers())
    }

    /// 发送 GET 请求并返回原始响应，状态码由调用方检查。
    ///
    /// `timeout` 只限制等待响应头的时间；流式读取响应体时由调用方对每个分块单独限时。
    pub async fn get_with_timeout<T: IntoUrl>(&self, url: T, timeout: Duration) -> AppResult<Response> {
        match tokio::time::timeout(timeout, self.request(url).send()).await {
            Ok(res) => Ok(res?),
            Err(_) => Err(AppError::Timeout(timeout)),
        }
    }

    /// 获取并解析 JSON 配置信息 (整个请求不超过 `fetch_timeout`)。非 2xx 状态码视为错误。
    pub async fn fetch_json(&self, url: &str) -> AppResult<Value> {
        let res = self
            .request(url)
            .timeout(self.config.fetch_timeout)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(AppError::HttpStatus(res.status()));
        }
        debug!("URL = {}, status = {}", url, res.status());
        res.json::<Value>()
            .await
            .map_err(|source| AppError::ApiParseFailed {
                url: url.to_string(),
                source,
            })
    }
}
