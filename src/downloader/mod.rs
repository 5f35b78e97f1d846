// src/downloader/mod.rs

mod task_processor;
mod task_runner;

pub use task_processor::TaskProcessor;
pub use task_runner::download_all;

use crate::models::{DownloadResult, DownloadSummary};

/// 统计下载结果
pub fn summarize(results: &[DownloadResult]) -> DownloadSummary {
    let success = results.iter().filter(|r| r.is_success()).count();
    DownloadSummary {
        total: results.len(),
        success,
        failed: results.len() - success,
    }
}
