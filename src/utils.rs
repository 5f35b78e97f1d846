// src/utils.rs

use crate::{
    config::platform::PlatformConfig, constants, error::*, resolver::extractor::formats_or_default,
};
use anyhow::Context;
use log::debug;
use regex::Regex;
use std::{
    collections::BTreeSet,
    ffi::OsStr,
    path::{Path, PathBuf},
    sync::LazyLock,
};

static ILLEGAL_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|]"#).unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub fn sanitize_filename(name: &str) -> String {
    let original_name = name.trim();
    if original_name.is_empty() {
        return "unknown".to_string();
    }

    let stem = Path::new(original_name)
        .file_stem()
        .unwrap_or_else(|| OsStr::new(original_name))
        .to_string_lossy()
        .to_uppercase();
    let windows_reserved = [
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
        "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];

    let mut name = if windows_reserved.contains(&stem.as_ref()) {
        format!("_{}", original_name)
    } else {
        original_name.to_string()
    };

    name = ILLEGAL_CHARS_RE.replace_all(&name, " ").into_owned();
    name = WHITESPACE_RE.replace_all(&name, " ").trim().to_string();
    name = name.trim_matches(|c: char| c == '.' || c.is_whitespace()).to_string();
    if name.is_empty() {
        return "unnamed".to_string();
    }

    if name.len() > constants::MAX_FILENAME_BYTES {
        let path = Path::new(&name);
        name = match (path.file_stem(), path.extension()) {
            (Some(stem_part), Some(ext)) => {
                let ext_str = format!(".{}", ext.to_string_lossy());
                let max_stem_bytes = constants::MAX_FILENAME_BYTES.saturating_sub(ext_str.len());
                let stem_part = stem_part.to_string_lossy();
                format!("{}{}", safe_truncate_utf8(&stem_part, max_stem_bytes), ext_str)
            }
            _ => safe_truncate_utf8(&name, constants::MAX_FILENAME_BYTES).to_string(),
        };
    }
    name
}

fn safe_truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut i = max_bytes;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    &s[..i]
}

/// 按显示宽度截断 (非 ASCII 字符计为 2)
pub fn truncate_text(text: &str, max_width: usize) -> String {
    let total: usize = text.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum();
    if total <= max_width {
        return text.to_string();
    }
    let mut width = 0;
    let mut end_pos = 0;
    for (i, c) in text.char_indices() {
        width += if c.is_ascii() { 1 } else { 2 };
        if width > max_width.saturating_sub(3) {
            end_pos = i;
            break;
        }
    }
    format!("{}...", &text[..end_pos])
}

/// 解码链接中的百分号编码，便于在终端中阅读
pub fn display_url(url: &str) -> String {
    percent_encoding::percent_decode_str(url)
        .decode_utf8_lossy()
        .into_owned()
}

/// 解析 "1,3,5"、"2-4"、"all" 形式的选择，返回从 0 开始的有序索引
pub fn parse_selection_indices(selection_str: &str, total_items: usize) -> Vec<usize> {
    if selection_str.trim().eq_ignore_ascii_case("all") {
        return (0..total_items).collect();
    }
    let mut indices = BTreeSet::new();
    for part in selection_str.split(',').map(|s| s.trim()) {
        if part.is_empty() {
            continue;
        }
        if let Some((start, end)) = part.split_once('-') {
            if let (Ok(start), Ok(end)) = (start.trim().parse::<usize>(), end.trim().parse::<usize>()) {
                if start == 0 || end == 0 {
                    continue;
                }
                let (min, max) = (start.min(end), start.max(end));
                indices.extend((min..=max).filter(|&i| i <= total_items).map(|i| i - 1));
            }
        } else if let Ok(num) = part.parse::<usize>()
            && num > 0
            && num <= total_items
        {
            indices.insert(num - 1);
        }
    }
    indices.into_iter().collect()
}

/// 生成不与已有文件冲突的路径：`name.ext` → `name(1).ext` → `name(2).ext` ...
pub fn unique_file_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1;
    loop {
        let candidate = dir.join(format!("{}({}){}", stem, counter, ext));
        if !candidate.exists() {
            debug!("new file = {:?}, counter = {}", candidate, counter);
            return candidate;
        }
        counter += 1;
    }
}

/// 汇总 `--urls` 与 `--file` 中的链接：按逗号拆分、去空白、丢弃空项。
pub fn collect_input_urls(urls: Option<&str>, file: Option<&Path>) -> AppResult<Vec<String>> {
    let mut lines: Vec<String> = Vec::new();
    if let Some(urls) = urls {
        lines.push(urls.to_string());
    }
    if let Some(file) = file {
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("读取链接文件 '{}' 失败", file.display()))?;
        lines.extend(content.lines().map(str::to_string));
    }

    Ok(lines
        .iter()
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect())
}

/// 解析 `--formats` 参数；没有可用格式时回退为 `["pdf"]`
pub fn parse_formats(arg: &str, platform: &PlatformConfig) -> Vec<String> {
    let tokens: Vec<String> = arg.split(',').map(str::to_string).collect();
    formats_or_default(&tokens, platform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_selection_indices() {
        assert_eq!(parse_selection_indices("1,3,5", 5), vec![0, 2, 4]);
        assert_eq!(parse_selection_indices("2-4", 5), vec![1, 2, 3]);
        assert_eq!(parse_selection_indices("All", 3), vec![0, 1, 2]);
        // 乱序和重复
        assert_eq!(parse_selection_indices("5, 1-2, 1", 5), vec![0, 1, 4]);
        assert_eq!(parse_selection_indices("1,10,foo,-2", 5), vec![0]);
        assert_eq!(parse_selection_indices("", 5), Vec::<usize>::new());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a\\b/c:d*e?f\"g<h>i|j"), "a b c d e f g h i j");
        assert_eq!(sanitize_filename(" . my file. "), "my file");
        assert_eq!(sanitize_filename("CON.pdf"), "_CON.pdf");
        assert_eq!(sanitize_filename(""), "unknown");
        assert_eq!(sanitize_filename("<>|"), "unnamed");

        let very_long_name = format!("{}.pdf", "义务教育教科书".repeat(20));
        let truncated = sanitize_filename(&very_long_name);
        assert!(truncated.len() <= constants::MAX_FILENAME_BYTES);
        assert!(truncated.ends_with(".pdf"));
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdefghijkl", 8), "abcde...");
        assert_eq!(truncate_text("一二三四五六", 8), "一二...");
    }

    #[test]
    fn test_display_url_decodes_percent_encoding() {
        assert_eq!(
            display_url("https://cdn/%E6%95%B0%E5%AD%A6.pdf"),
            "https://cdn/数学.pdf"
        );
        assert_eq!(display_url("https://cdn/a.pdf"), "https://cdn/a.pdf");
    }

    #[test]
    fn test_unique_file_path_appends_counter() {
        let dir = tempfile::tempdir().unwrap();
        let first = unique_file_path(dir.path(), "report.pdf");
        assert_eq!(first, dir.path().join("report.pdf"));
        fs::write(&first, b"1").unwrap();

        let second = unique_file_path(dir.path(), "report.pdf");
        assert_eq!(second, dir.path().join("report(1).pdf"));
        fs::write(&second, b"2").unwrap();

        let third = unique_file_path(dir.path(), "report.pdf");
        assert_eq!(third, dir.path().join("report(2).pdf"));
    }

    #[test]
    fn test_collect_input_urls() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("links.txt");
        fs::write(&file, "https://a/1, https://a/2\n\n  https://a/3 ,\n").unwrap();

        let urls = collect_input_urls(Some(" https://a/0 ,,"), Some(&file)).unwrap();
        assert_eq!(urls, vec!["https://a/0", "https://a/1", "https://a/2", "https://a/3"]);

        assert!(collect_input_urls(None, None).unwrap().is_empty());
        assert!(collect_input_urls(None, Some(&dir.path().join("missing.txt"))).is_err());
    }

    #[test]
    fn test_parse_formats() {
        let platform = PlatformConfig::builtin();
        assert_eq!(parse_formats("PDF, mpeg", &platform), vec!["pdf", "mp3"]);
        assert_eq!(parse_formats("", &platform), vec!["pdf"]);
        assert_eq!(parse_formats("exe,,", &platform), vec!["pdf"]);
    }
}
