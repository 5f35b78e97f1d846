// src/ui.rs

use crate::{
    constants,
    models::{DownloadResult, DownloadSummary},
    utils,
};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    io::{self, Write},
    time::Duration,
};

pub mod symbols {
    use colored::{ColoredString, Colorize};
    use std::sync::LazyLock;

    pub static OK: LazyLock<ColoredString> = LazyLock::new(|| "[OK]".green());
    pub static ERROR: LazyLock<ColoredString> = LazyLock::new(|| "[X]".red());
    pub static INFO: LazyLock<ColoredString> = LazyLock::new(|| "[i]".cyan());
    pub static WARN: LazyLock<ColoredString> = LazyLock::new(|| "[!]".yellow());
    pub static CTRL_C: LazyLock<ColoredString> = LazyLock::new(|| "Ctrl+C".yellow());
}

pub fn info(message: &str) {
    println!("{} {}", *symbols::INFO, message);
}

pub fn warn(message: &str) {
    println!("{} {}", *symbols::WARN, message.yellow());
}

pub fn error(message: &str) {
    eprintln!("{} {}", *symbols::ERROR, message.red());
}

pub fn print_header(title: &str) {
    println!("\n{}", "═".repeat(constants::UI_WIDTH));
    println!(" {}", title.cyan().bold());
    println!("{}", "═".repeat(constants::UI_WIDTH));
}

pub fn print_sub_header(title: &str) {
    println!("\n--- {} ---", title.bold());
}

pub fn box_message(title: &str, content: &[&str], color_func: fn(ColoredString) -> ColoredString) {
    println!("\n┌{}┐", "─".repeat(constants::UI_WIDTH - 2));
    println!("  {}", color_func(title.bold()));
    println!("├{}┤", "─".repeat(constants::UI_WIDTH - 2));
    for line in content {
        println!("  {}", line);
    }
    println!("└{}┘", "─".repeat(constants::UI_WIDTH - 2));
}

pub fn prompt(message: &str, default: Option<&str>) -> io::Result<String> {
    let default_str = default.map_or("".to_string(), |d| format!(" (默认: {})", d));
    print!("\n>>> {}{}: ", message, default_str);
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        // 输入流已关闭
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
    }
    let input = input.trim().to_string();
    if input.is_empty() {
        Ok(default.unwrap_or("").to_string())
    } else {
        Ok(input)
    }
}

pub fn prompt_hidden(message: &str) -> io::Result<String> {
    print!("\n>>> {}: ", message);
    io::stdout().flush()?;
    rpassword::read_password()
}

pub fn selection_menu(
    options: &[String],
    title: &str,
    instructions: &str,
    default_choice: Option<&str>,
) -> io::Result<String> {
    println!("\n┌{}┐", "─".repeat(constants::UI_WIDTH - 2));
    println!("  {}", title.cyan().bold());
    println!("├{}┤", "─".repeat(constants::UI_WIDTH - 2));

    let pad = options.len().to_string().len();
    for (i, option) in options.iter().enumerate() {
        println!(
            "  [{}] {}",
            format!("{:<pad$}", i + 1, pad = pad).yellow(),
            option
        );
    }

    println!("├{}┤", "─".repeat(constants::UI_WIDTH - 2));
    println!("  {} (按 {} 可取消)", instructions, *symbols::CTRL_C);
    println!("└{}┘", "─".repeat(constants::UI_WIDTH - 2));

    prompt("请输入你的选择", default_choice)
}

/// 按文件数量显示进度
pub fn new_tasks_progress_bar(total: u64, prefix: &str) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "{prefix:7.bold.cyan} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}/{len:3} ({percent:>3}%) [ETA: {eta}]",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");
    let pbar = ProgressBar::new(total);
    pbar.set_style(style);
    pbar.set_prefix(prefix.to_string());
    pbar.enable_steady_tick(Duration::from_millis(100));
    pbar
}

/// 下载结束后的详细报告与总结
pub fn print_report(results: &[DownloadResult], summary: &DownloadSummary, elapsed: Duration) {
    if !results.is_empty() {
        print_sub_header("下载详情报告");
        println!(
            "  {:<width$}  {:<16}  {}",
            "URL",
            "状态",
            "保存路径",
            width = constants::URL_TRUNCATE_LENGTH
        );
        for result in results {
            let (symbol, color_fn, msg) = result.status.get_display_info();
            let status = format!("{} {} ({})", symbol, msg, result.status_code());
            println!(
                "  {:<width$}  {}  {}",
                utils::truncate_text(
                    &utils::display_url(&result.source_url),
                    constants::URL_TRUNCATE_LENGTH
                ),
                color_fn(status.into()),
                utils::truncate_text(
                    &result.file_path.display().to_string(),
                    constants::PATH_TRUNCATE_LENGTH
                ),
                width = constants::URL_TRUNCATE_LENGTH
            );
        }
    }

    print_sub_header("任务总结");
    if summary.total > 0 && summary.failed == 0 {
        println!(
            "{} 所有 {} 个文件均已下载成功 (耗时 {:.1} 秒)。",
            *symbols::OK,
            summary.total,
            elapsed.as_secs_f64()
        );
    } else {
        println!(
            "总计: {} | {} | {} | 耗时: {:.1} 秒",
            summary.total,
            format!("成功: {}", summary.success).green(),
            format!("失败: {}", summary.failed).red(),
            elapsed.as_secs_f64()
        );
    }
}
