// src/downloader/task_runner.rs

use super::task_processor::TaskProcessor;
use crate::{client::RobustClient, error::*, models::*, ui};
use futures::{StreamExt, stream};
use indicatif::ProgressBar;
use log::{info, warn};
use std::{
    cmp::min,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

/// 并发下载所有资源，结果按完成顺序返回。
///
/// 取消标志置位后不再开始新的下载，正在进行的下载会自然结束。
pub async fn download_all(
    client: Arc<RobustClient>,
    entries: &[ResourceEntry],
    output_dir: &Path,
    cancellation_token: Arc<AtomicBool>,
) -> AppResult<Vec<DownloadResult>> {
    let max_workers = min(client.config().max_workers, entries.len());
    if max_workers == 0 {
        return Ok(Vec::new());
    }
    tokio::fs::create_dir_all(output_dir).await?;

    println!();
    ui::info(&format!(
        "开始下载 {} 个文件 (并发数: {})...",
        entries.len(),
        max_workers
    ));
    let pbar = ui::new_tasks_progress_bar(entries.len() as u64, "下载");
    let processor = TaskProcessor::new(client);

    let results: Vec<DownloadResult> = stream::iter(entries)
        .map(|entry| {
            let processor = &processor;
            let cancellation_token = &cancellation_token;
            async move {
                if cancellation_token.load(Ordering::Relaxed) {
                    return None;
                }
                Some(processor.process(entry, output_dir).await)
            }
        })
        .buffer_unordered(max_workers)
        .filter_map(|result| {
            let pbar = pbar.clone();
            async move {
                let result = result?;
                report_single_result(&pbar, &result);
                pbar.inc(1);
                Some(result)
            }
        })
        .collect()
        .await;

    pbar.finish_and_clear();
    if cancellation_token.load(Ordering::Relaxed) {
        warn!("用户中断，已完成 {} / {} 个下载", results.len(), entries.len());
        ui::warn(&format!(
            "任务已中断，{} 个文件未开始下载。",
            entries.len() - results.len()
        ));
    }
    info!("下载阶段结束，共 {} 个结果", results.len());
    Ok(results)
}

fn report_single_result(pbar: &ProgressBar, result: &DownloadResult) {
    let (symbol, color_fn, default_msg) = result.status.get_display_info();
    let name = result
        .file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| result.url.clone());
    let msg = match &result.message {
        Some(err_msg) => format!(
            "{} {} {}",
            symbol,
            name,
            color_fn(format!("失败: {} (详情: {})", default_msg, err_msg).into())
        ),
        None => format!("{} {}", symbol, name),
    };
    pbar.println(msg);
}
