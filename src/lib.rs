// src/lib.rs

pub mod catalog;
pub mod chooser;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod downloader;
pub mod error;
pub mod logger;
pub mod models;
pub mod resolver;
pub mod ui;
pub mod utils;

use crate::{
    catalog::{NodeOptions, Session, TagTree},
    chooser::RandomChooser,
    cli::Cli,
    client::RobustClient,
    config::AppConfig,
    error::{AppError, AppResult},
    models::DownloadSummary,
    resolver::ResourceResolver,
    ui::symbols,
};
use anyhow::anyhow;
use colored::*;
use log::{debug, error, info};
use std::{
    io,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

/// 一次运行共享的上下文
#[derive(Clone)]
pub struct RunContext {
    pub client: Arc<RobustClient>,
    pub args: Arc<Cli>,
    pub cancellation_token: Arc<AtomicBool>,
}

impl RunContext {
    fn is_cancelled(&self) -> bool {
        self.cancellation_token.load(Ordering::Relaxed)
    }
}

/// 库的公共入口点，由 `main.rs` 调用
pub async fn run_from_cli(args: Arc<Cli>, cancellation_token: Arc<AtomicBool>) -> AppResult<()> {
    debug!("CLI 参数: {:?}", args);
    if args.auth_help {
        ui::box_message(
            "获取 X-ND-AUTH 指南",
            constants::HELP_AUTH_GUIDE
                .lines()
                .collect::<Vec<_>>()
                .as_slice(),
            |s| s.cyan(),
        );
        println!(
            "\n{} 安全提醒: 请妥善保管你的登录信息，不要分享给他人。",
            *symbols::INFO
        );
        return Ok(());
    }

    let config = Arc::new(AppConfig::new(&args)?);
    debug!("加载的应用配置: {:?}", config);
    if config.auth.is_some() {
        ui::info("已加载 X-ND-AUTH 登录信息。");
    }

    let client = Arc::new(RobustClient::new(config, Arc::new(RandomChooser))?);
    let context = RunContext {
        client,
        args: args.clone(),
        cancellation_token,
    };

    if args.urls.is_some() || args.file.is_some() {
        let urls = utils::collect_input_urls(args.urls.as_deref(), args.file.as_deref())?;
        let summary = run_pipeline(&context, &urls).await?;
        if !args.interactive && summary.failed > 0 {
            return Err(AppError::Other(anyhow!(
                "{} 个文件下载失败。",
                summary.failed
            )));
        }
    }

    if args.interactive {
        handle_interactive_mode(context).await?;
    }
    Ok(())
}

/// 解析并下载一批链接，打印报告并返回统计。
pub async fn run_pipeline(context: &RunContext, urls: &[String]) -> AppResult<DownloadSummary> {
    let start = Instant::now();
    let platform = &context.client.config().platform;
    let formats = utils::parse_formats(&context.args.formats, platform);

    ui::print_header(&format!(
        "解析 {} 个链接 (格式: {}) (按 {} 可中断)",
        urls.len(),
        formats.join(", "),
        *symbols::CTRL_C
    ));
    let resolver = ResourceResolver::new(context.client.clone(), context.cancellation_token.clone());
    let entries = resolver.resolve(urls, &formats, context.args.backup).await?;
    if context.is_cancelled() {
        return Err(AppError::UserInterrupt);
    }
    for entry in &entries {
        debug!("resource: {} <- {}", entry.name, entry.download_url);
    }
    ui::info(&format!("共找到 {} 个资源文件。", entries.len()));

    let results = downloader::download_all(
        context.client.clone(),
        &entries,
        &context.args.output,
        context.cancellation_token.clone(),
    )
    .await?;
    let summary = downloader::summarize(&results);
    info!(
        "下载报告: Total={}, Success={}, Failed={}",
        summary.total, summary.success, summary.failed
    );
    ui::print_report(&results, &summary, start.elapsed());
    print_output_dir(&context.args.output);

    if context.is_cancelled() {
        return Err(AppError::UserInterrupt);
    }
    Ok(summary)
}

fn print_output_dir(output: &Path) {
    let dir = dunce::canonicalize(output).unwrap_or_else(|_| output.to_path_buf());
    println!("{} 文件保存目录: {}", *symbols::INFO, dir.display());
}

/// 把流程错误转换为交互模式中的提示，不中断会话
fn report_task_error(e: &AppError) {
    match e {
        AppError::NothingToDo(reason) => ui::warn(&format!("{}，没有需要下载的文件。", reason)),
        AppError::UserInterrupt => ui::warn("任务已中断。"),
        _ => ui::error(&format!("处理任务时发生错误: {}", e)),
    }
}

/// 读取用户输入；输入流关闭视为退出，其他错误视为中断。
fn read_choice(result: io::Result<String>) -> AppResult<Option<String>> {
    match result {
        Ok(input) if input.trim().is_empty() => Ok(None),
        Ok(input) => Ok(Some(input.trim().to_string())),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(_) => Err(AppError::UserInterrupt),
    }
}

async fn handle_interactive_mode(mut context: RunContext) -> AppResult<()> {
    ui::print_header("交互模式");
    println!(
        "在此模式下，你可以按分类浏览教材，或直接粘贴资源链接。按 {} 可随时退出。",
        *symbols::CTRL_C
    );

    let session = Session::new();
    let menu = vec![
        "按分类浏览教材".to_string(),
        "输入资源链接".to_string(),
        "设置 X-ND-AUTH 登录信息".to_string(),
    ];

    loop {
        context.cancellation_token.store(false, Ordering::Relaxed);
        let choice = read_choice(ui::selection_menu(
            &menu,
            "请选择操作",
            "输入数字选择，直接按回车退出",
            None,
        ))?;
        let Some(choice) = choice else { break };

        let result = match choice.as_str() {
            "1" => match browse_catalog(&context, &session).await {
                Ok(book_ids) if book_ids.is_empty() => Ok(()),
                Ok(book_ids) => {
                    let urls =
                        catalog::book_detail_urls(&context.client.config().platform, &book_ids);
                    run_pipeline(&context, &urls).await.map(drop)
                }
                Err(e) => Err(e),
            },
            "2" => match read_choice(ui::prompt("请输入资源链接 (多个链接以逗号分隔)", None))? {
                Some(input) => match utils::collect_input_urls(Some(&input), None) {
                    Ok(urls) => run_pipeline(&context, &urls).await.map(drop),
                    Err(e) => Err(e),
                },
                None => Ok(()),
            },
            "3" => update_auth(&mut context),
            other => Err(AppError::UserInputError(format!("无效的选择 '{}'。", other))),
        };

        if let Err(e) = result {
            error!("交互模式任务失败: {}", e);
            report_task_error(&e);
        }
    }

    println!("\n{} 退出交互模式。", *symbols::INFO);
    Ok(())
}

fn update_auth(context: &mut RunContext) -> AppResult<()> {
    let input = ui::prompt_hidden("请粘贴 X-ND-AUTH (输入内容不会显示，直接回车清除)")
        .map_err(|_| AppError::UserInterrupt)?;
    let input = input.trim();
    let auth = if input.is_empty() {
        None
    } else if config::auth::is_valid_auth(input) {
        Some(input.to_string())
    } else {
        return Err(AppError::UserInputError(
            "X-ND-AUTH 格式不正确，应包含 'MAC id='。".to_string(),
        ));
    };

    let cleared = auth.is_none();
    context.client = Arc::new(context.client.with_auth(auth)?);
    info!("X-ND-AUTH 已更新 (cleared = {})", cleared);
    if cleared {
        ui::info("已清除 X-ND-AUTH。");
    } else {
        println!("{} X-ND-AUTH 已更新。", *symbols::OK);
    }
    Ok(())
}

/// 逐级浏览教材分类，返回选中的教材 ID。直接回车放弃选择。
async fn browse_catalog(context: &RunContext, session: &Session) -> AppResult<Vec<String>> {
    if !session.is_catalog_loaded() {
        ui::info("正在获取教材目录...");
    }
    let tree = session.catalog(&context.client).await?;
    let mut path = vec![TagTree::ROOT];

    while let Some(&current) = path.last() {
        let options = tree.options(current);
        if options.is_empty() {
            ui::warn("该分类下没有可下载的教材。");
            path.pop();
            continue;
        }

        let title = path
            .iter()
            .filter_map(|&id| tree.node(id))
            .map(|n| catalog::tree::normalize_display_name(&n.tag_name))
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join(" > ");
        let title = tree
            .node(current)
            .and_then(|n| n.hierarchy_name.as_deref())
            .map_or(title.clone(), |h| format!("{} [{}]", title, h));

        let instructions = match options {
            NodeOptions::Tags(_) => "输入数字进入分类，输入 0 返回上一级，直接回车退出",
            NodeOptions::Books(_) => "支持格式: 1, 3, 2-4, all；输入 0 返回上一级，直接回车退出",
        };
        let Some(input) = read_choice(ui::selection_menu(
            &options.labels(),
            &title,
            instructions,
            None,
        ))?
        else {
            return Ok(Vec::new());
        };

        if input == "0" {
            path.pop();
            continue;
        }

        match options {
            NodeOptions::Tags(items) => match input.parse::<usize>() {
                Ok(idx) if idx > 0 && idx <= items.len() => path.push(items[idx - 1].0),
                _ => ui::warn(&format!("无效的选择 '{}'。", input)),
            },
            NodeOptions::Books(items) => {
                let indices = utils::parse_selection_indices(&input, items.len());
                if indices.is_empty() {
                    ui::warn(&format!("无效的选择 '{}'。", input));
                    continue;
                }
                let selected: Vec<String> = indices.iter().map(|&i| items[i].0.clone()).collect();
                for &i in &indices {
                    println!("  {} {}", *symbols::OK, items[i].1);
                }
                return Ok(selected);
            }
        }
    }
    Ok(Vec::new())
}
