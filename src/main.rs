// src/main.rs

use clap::{CommandFactory, FromArgMatches};
use smartedu_dl::{cli::Cli, error::AppError, logger, run_from_cli, ui, ui::symbols};
use std::{
    env,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

#[tokio::main]
async fn main() {
    #[cfg(windows)]
    {
        colored::control::set_virtual_terminal(true).ok();
    }

    let cancellation_token = Arc::new(AtomicBool::new(false));
    let token = cancellation_token.clone();
    tokio::spawn(async move {
        // 第一次: 停止提交新任务；第二次: 立即退出
        while tokio::signal::ctrl_c().await.is_ok() {
            if token.swap(true, Ordering::Relaxed) {
                println!("\n{} 用户强制中断程序。", *symbols::WARN);
                tokio::time::sleep(Duration::from_millis(100)).await;
                std::process::exit(130);
            }
            println!(
                "\n{} 正在停止，等待进行中的任务结束... 再次按 {} 立即退出。",
                *symbols::WARN,
                *symbols::CTRL_C
            );
        }
    });

    let bin_name = env::var("CARGO_BIN_NAME").unwrap_or_else(|_| clap::crate_name!().to_string());
    let after_help = format!(
        "示例:\n  # 启动交互模式 (推荐)\n  {bin} -i\n\n  # 下载多个链接中的 PDF 与音频\n  {bin} -u \"https://basic.smartedu.cn/tchMaterial/detail?contentType=assets_document&contentId=...\" -t pdf,mp3\n\n  # 从文件读取链接并尝试备用接口\n  {bin} -f links.txt --backup -o ./books\n\n  # 获取 X-ND-AUTH 帮助\n  {bin} --auth-help",
        bin = bin_name
    );
    let cmd = Cli::command().after_help(after_help);
    let args = match Cli::from_arg_matches(&cmd.get_matches()) {
        Ok(args) => Arc::new(args),
        Err(e) => e.exit(),
    };

    logger::init(args.log_level);

    match run_from_cli(args, cancellation_token).await {
        Ok(()) => {}
        Err(AppError::NothingToDo(reason)) => {
            println!("\n{} {}，没有需要下载的文件。", *symbols::INFO, reason);
        }
        Err(AppError::UserInterrupt) => {
            println!("\n{} 用户中断。", *symbols::WARN);
            std::process::exit(130);
        }
        Err(e) => {
            log::error!("程序执行出错: {}", e);
            eprintln!();
            ui::error(&format!("程序执行出错: {}", e));
            std::process::exit(1);
        }
    }
}
