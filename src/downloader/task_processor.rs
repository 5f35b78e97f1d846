// src/downloader/task_processor.rs

use crate::{client::RobustClient, constants, error::*, models::*, utils};
use futures::StreamExt;
use indicatif::HumanBytes;
use log::{debug, error, info};
use reqwest::Response;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{
    fs::{self, File, OpenOptions},
    io::{AsyncWriteExt, BufWriter},
};

/// `TaskProcessor` 封装了下载单个资源文件的所有逻辑。
pub struct TaskProcessor {
    client: Arc<RobustClient>,
}

impl TaskProcessor {
    pub fn new(client: Arc<RobustClient>) -> Self {
        Self { client }
    }

    /// 下载单个资源。任何失败都转换为失败的 `DownloadResult`，不会向上传播。
    pub async fn process(&self, entry: &ResourceEntry, output_dir: &Path) -> DownloadResult {
        let file_name = utils::sanitize_filename(&entry.name);
        let mut result = DownloadResult {
            url: entry.download_url.clone(),
            status: DownloadStatus::UnexpectedError,
            http_status: None,
            file_path: output_dir.join(&file_name),
            byte_size: 0,
            original_url: entry.original_url.clone(),
            source_url: entry.source_url.clone(),
            message: None,
        };

        match self.download(entry, output_dir, &file_name, &mut result).await {
            Ok(()) => {
                info!(
                    "下载完成: {:?} ({})",
                    result.file_path,
                    HumanBytes(result.byte_size)
                );
                result.status = DownloadStatus::Success;
            }
            Err(e) => {
                error!("下载 '{}' 失败: {}", entry.download_url, e);
                result.status = DownloadStatus::from(&e);
                result.message = Some(e.to_string());
            }
        }
        result
    }

    async fn download(
        &self,
        entry: &ResourceEntry,
        output_dir: &Path,
        file_name: &str,
        result: &mut DownloadResult,
    ) -> AppResult<()> {
        let timeout = self.client.config().download_timeout;
        let res = self.client.get_with_timeout(&entry.download_url, timeout).await?;
        let status = res.status();
        result.http_status = Some(status.as_u16());
        debug!("URL = {}, status = {}", entry.download_url, status);
        if !status.is_success() {
            return Err(AppError::HttpStatus(status));
        }
        let expected = res.content_length();

        let (path, file) = create_unique_file(output_dir, file_name).await?;
        result.file_path = path.clone();

        let outcome = async {
            let written = write_body(res, file, timeout).await?;
            result.byte_size = written;
            let on_disk = fs::metadata(&path).await?.len();
            check_size(expected, written, on_disk)
        }
        .await;

        if outcome.is_err()
            && let Err(e) = fs::remove_file(&path).await
        {
            debug!("清理不完整文件 {:?} 失败: {}", path, e);
        }
        outcome
    }
}

/// 声明的长度 (如果有)、写入的字节数、磁盘上的大小三者必须一致。
fn check_size(expected: Option<u64>, written: u64, on_disk: u64) -> AppResult<()> {
    if expected.is_some_and(|n| n != written) || on_disk != written {
        return Err(AppError::Validation(format!(
            "预期: {}, 写入: {}, 磁盘: {}",
            expected.map_or("未知".to_string(), |n| n.to_string()),
            written,
            on_disk
        )));
    }
    Ok(())
}

/// 以 create_new 方式占用文件名，避免并发任务写入同一个文件。
async fn create_unique_file(dir: &Path, file_name: &str) -> AppResult<(PathBuf, File)> {
    loop {
        let path = utils::unique_file_path(dir, file_name);
        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// 逐块写入响应体，每个分块的等待时间不超过 `timeout`。返回写入的字节数。
async fn write_body(res: Response, file: File, timeout: std::time::Duration) -> AppResult<u64> {
    let mut writer = BufWriter::with_capacity(constants::DOWNLOAD_CHUNK_SIZE, file);
    let mut stream = res.bytes_stream();
    let mut written: u64 = 0;
    loop {
        let next = tokio::time::timeout(timeout, stream.next())
            .await
            .map_err(|_| AppError::Timeout(timeout))?;
        let Some(chunk) = next else { break };
        let chunk = chunk?;
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    writer.flush().await?;
    writer.into_inner().sync_all().await?;
    Ok(written)
}
