// src/cli.rs

use crate::constants;
use clap::{Parser, ValueEnum, command, crate_version};
use std::path::PathBuf;

/// 定义日志输出级别
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    version = crate_version!(),
    about,
    long_about = None,
    arg_required_else_help = true,
    disable_help_flag = true,
    disable_version_flag = true,
)]
#[command(group(
    clap::ArgGroup::new("mode")
        .required(true)
        .multiple(true)
        .args(&["interactive", "urls", "file", "auth_help"]),
))]
pub struct Cli {
    // --- 运行模式 (Mode) ---
    /// 启动交互式会话：按分类浏览教材或逐一输入链接
    #[arg(short, long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub interactive: bool,
    /// 资源链接列表，以逗号分隔
    #[arg(short, long, value_name = "URLS", help_heading = "Mode")]
    pub urls: Option<String>,
    /// 从文本文件读取链接 (每行可包含多个以逗号分隔的链接)
    #[arg(short, long, value_name = "FILE", help_heading = "Mode")]
    pub file: Option<PathBuf>,
    /// 显示如何获取 X-ND-AUTH 的指南并退出
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub auth_help: bool,

    // --- 下载选项 (Options) ---
    /// 下载的文件格式，以逗号分隔 (例如 'pdf,mp3')
    #[arg(short = 't', long, default_value_t = constants::DEFAULT_FORMAT.to_string(), value_name = "FORMATS", help_heading = "Options")]
    pub formats: String,
    /// 用户登录信息 X-ND-AUTH 字段；当下载失败或非最新版教材时配置
    #[arg(short, long, help_heading = "Options")]
    pub auth: Option<String>,
    /// 同时尝试备用 (旧版) 接口
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub backup: bool,
    /// 设置最大并发数
    #[arg(short, long, value_parser = clap::value_parser!(usize), help_heading = "Options")]
    pub workers: Option<usize>,
    /// 设置文件保存目录
    #[arg(short, long, value_name = "DIR", default_value_os_t = PathBuf::from(constants::DEFAULT_SAVE_DIR), help_heading = "Options")]
    pub output: PathBuf,

    // --- 通用选项 (General) ---
    /// 显示此帮助信息并退出
    #[arg(short = 'h', long, action = clap::ArgAction::Help, global = true, help_heading = "General")]
    _help: Option<bool>,
    /// 显示版本信息并退出
    #[arg(short = 'V', long, action = clap::ArgAction::Version, global = true, help_heading = "General")]
    _version: Option<bool>,
    /// (隐藏参数) 设置日志文件的输出级别，用于调试
    #[arg(long, value_enum, default_value_t = LogLevel::Off, global = true, hide = true)]
    pub log_level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_and_file_can_be_combined() {
        let cli = Cli::try_parse_from([
            "smartedu-dl",
            "-u",
            "https://basic.smartedu.cn/a",
            "-f",
            "links.txt",
            "--backup",
            "-t",
            "pdf,mp3",
        ])
        .unwrap();
        assert!(cli.backup);
        assert_eq!(cli.formats, "pdf,mp3");
        assert_eq!(cli.file, Some(PathBuf::from("links.txt")));
        assert_eq!(cli.output, PathBuf::from("downloads"));
    }

    #[test]
    fn test_mode_is_required() {
        assert!(Cli::try_parse_from(["smartedu-dl", "-t", "pdf"]).is_err());
    }
}
