// src/resolver/generator.rs

use super::classifier;
use crate::{
    chooser::{self, Chooser},
    config::platform::PlatformConfig,
    constants::api::{params, resource_types, template_keys},
    models::{ConfigKind, ConfigUrl, ParsedInputUrl},
};
use itertools::Itertools;
use log::{debug, warn};
use regex::{Captures, Regex};
use std::{collections::HashMap, sync::LazyLock};

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// 用参数替换模板中的 `{name}` 占位符。值为 `None` 的参数替换为空串，未知占位符保持原样。
///
/// 只扫描一遍模板，代入的值中即使含有 `{...}` 也不会被再次替换。
pub fn render_template(template: &str, values: &HashMap<String, Option<String>>) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone().unwrap_or_default(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// 根据输入链接生成需要请求的配置信息链接
pub struct ConfigUrlGenerator<'a> {
    platform: &'a PlatformConfig,
    chooser: &'a dyn Chooser,
}

impl<'a> ConfigUrlGenerator<'a> {
    pub fn new(platform: &'a PlatformConfig, chooser: &'a dyn Chooser) -> Self {
        Self { platform, chooser }
    }

    pub fn generate(&self, urls: &[String], formats: &[String], use_backup: bool) -> Vec<ConfigUrl> {
        let want_audio = formats.iter().any(|f| self.platform.is_audio_format(f));

        let config_urls: Vec<ConfigUrl> = urls
            .iter()
            .map(|u| u.trim())
            .unique()
            .filter_map(|u| classifier::validate(u, self.platform))
            .flat_map(|parsed| self.generate_for(&parsed, want_audio, use_backup))
            .collect();

        debug!("config urls = {}", config_urls.len());
        config_urls
    }

    fn generate_for(&self, parsed: &ParsedInputUrl, want_audio: bool, use_backup: bool) -> Vec<ConfigUrl> {
        let Some(path_config) = self.platform.path_config(&parsed.path) else {
            return Vec::new();
        };

        let mut values: HashMap<String, Option<String>> = path_config
            .params
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(params::CONTENT_TYPE))
            .map(|key| (key.to_string(), parsed.query.get(key).cloned()))
            .collect();
        let server = chooser::choose(self.chooser, &self.platform.server_prefixes).cloned();
        values.insert(params::SERVER.to_string(), server);

        let is_thematic = values
            .get(params::CONTENT_TYPE)
            .and_then(|v| v.as_deref())
            == Some(resource_types::THEMATIC_COURSE);
        let primary = if is_thematic {
            path_config
                .template(template_keys::THEMATIC_COURSE)
                .or_else(|| {
                    warn!("路径 '{}' 没有专题课程模板，改用默认模板", parsed.path);
                    path_config.template(template_keys::DEFAULT)
                })
        } else {
            path_config.template(template_keys::DEFAULT)
        };

        let Some(primary) = primary.and_then(|t| t.first()) else {
            warn!("路径 '{}' 没有可用的配置模板", parsed.path);
            return Vec::new();
        };

        let make = |template: &str, kind: ConfigKind| ConfigUrl {
            url: render_template(template, &values),
            kind,
            source_url: parsed.raw.clone(),
        };

        let mut out = vec![make(primary, ConfigKind::Primary)];

        if use_backup && let Some(backups) = path_config.template(template_keys::BACKUP) {
            let backup_urls: Vec<ConfigUrl> =
                backups.iter().map(|t| make(t, ConfigKind::Backup)).collect();
            debug!("backup links = {:?}", backup_urls.iter().map(|c| &c.url).collect::<Vec<_>>());
            out.extend(backup_urls);
        }

        if want_audio && let Some(audio) = path_config.template(template_keys::AUDIO) {
            for template in audio.iter() {
                let audio_url = make(template, ConfigKind::Audio);
                debug!("Add audio: {}", audio_url.url);
                out.push(audio_url);
            }
        }

        out
    }
}
