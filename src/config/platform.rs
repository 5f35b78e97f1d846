// src/config/platform.rs

use crate::constants::api::{paths, resource_types, template_keys};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 配置项中的模板既可以是单个字符串，也可以是字符串列表（如多个备用接口）。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TemplateSet {
    One(String),
    Many(Vec<String>),
}

impl TemplateSet {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            TemplateSet::One(t) => std::slice::from_ref(t),
            TemplateSet::Many(list) => list,
        };
        slice.iter().map(String::as_str)
    }

    pub fn first(&self) -> Option<&str> {
        self.iter().next()
    }
}

#[cfg(feature = "testing")]
impl TemplateSet {
    fn replace_host(&mut self, from: &str, to: &str) {
        match self {
            TemplateSet::One(t) => *t = t.replace(from, to),
            TemplateSet::Many(list) => list.iter_mut().for_each(|t| *t = t.replace(from, to)),
        }
    }
}

impl From<&str> for TemplateSet {
    fn from(template: &str) -> Self {
        TemplateSet::One(template.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceTypeDescriptor {
    pub code: String,
    pub display_name: String,
    pub formats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformPathConfig {
    pub label: String,
    #[serde(default)]
    pub params: Vec<String>,
    pub templates: HashMap<String, TemplateSet>,
}

impl PlatformPathConfig {
    pub fn template(&self, key: &str) -> Option<&TemplateSet> {
        self.templates.get(key)
    }
}

/// 平台相关的静态数据：合法域名、URL 路径与接口模板、资源类型与格式。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformConfig {
    /// 别名域名 -> 规范域名
    pub domain_remap: HashMap<String, String>,
    /// 分类首页路径，合法但不对应单个资源
    pub index_paths: Vec<String>,
    pub paths: HashMap<String, PlatformPathConfig>,
    pub resource_types: Vec<ResourceTypeDescriptor>,
    /// 格式别名 -> 规范后缀
    pub format_remap: HashMap<String, String>,
    pub accepted_formats: Vec<String>,
    pub server_prefixes: Vec<String>,
}

impl PlatformConfig {
    pub fn is_allowed_host(&self, host: &str) -> bool {
        self.domain_remap.contains_key(host) || self.domain_remap.values().any(|h| h == host)
    }

    pub fn canonical_host<'a>(&'a self, host: &'a str) -> &'a str {
        self.domain_remap.get(host).map_or(host, String::as_str)
    }

    pub fn is_index_path(&self, path: &str) -> bool {
        self.index_paths.iter().any(|p| p == path)
    }

    pub fn path_config(&self, path: &str) -> Option<&PlatformPathConfig> {
        self.paths.get(path)
    }

    pub fn resource_type(&self, code: &str) -> Option<&ResourceTypeDescriptor> {
        self.resource_types.iter().find(|t| t.code == code)
    }

    /// 小写、去空白并应用别名表，不做合法性过滤
    pub fn canonical_format(&self, format: &str) -> String {
        let lowered = format.trim().to_lowercase();
        self.format_remap.get(&lowered).cloned().unwrap_or(lowered)
    }

    pub fn is_accepted_format(&self, format: &str) -> bool {
        self.accepted_formats.iter().any(|f| f == format)
    }

    pub fn is_audio_format(&self, format: &str) -> bool {
        let format = self.canonical_format(format);
        self.resource_type(resource_types::ASSETS_AUDIO)
            .is_some_and(|t| t.formats.contains(&format))
    }

    /// 把接口模板中的平台主机替换为 `base_url`，页面链接 (basic.smartedu.cn) 保持不变。
    #[cfg(feature = "testing")]
    pub fn redirected_to(mut self, base_url: &str) -> Self {
        for path in self.paths.values_mut() {
            for set in path.templates.values_mut() {
                set.replace_host("https://{server}.ykt.cbern.com.cn", base_url);
                set.replace_host("https://s-file-1.ykt.cbern.com.cn", base_url);
            }
        }
        self
    }

    /// 平台当前使用的完整配置表
    pub fn builtin() -> Self {
        let domain_remap = HashMap::from([
            ("web-bd.ykt.eduyun.cn".into(), "basic.smartedu.cn".into()),
            ("xue-test.ykt.eduyun.cn".into(), "basic.smartedu.cn".into()),
            ("jpk-test.ykt.eduyun.cn".into(), "jpk.basic.smartedu.cn".into()),
        ]);

        let special_edu = "https://{server}.ykt.cbern.com.cn/zxx/ndrs/special_edu/resources/details/{contentId}.json";

        let path_table: Vec<(&str, &str, Vec<&str>, Vec<(&str, TemplateSet)>)> = vec![
            (
                paths::TCH_MATERIAL,
                "教材",
                vec![],
                vec![
                    (template_keys::VERSION, "https://s-file-1.ykt.cbern.com.cn/zxx/ndrs/resources/tch_material/version/data_version.json".into()),
                    (template_keys::TAG, "https://s-file-1.ykt.cbern.com.cn/zxx/ndrs/tags/tch_material_tag.json".into()),
                    (template_keys::DETAIL, "https://basic.smartedu.cn/tchMaterial/detail?contentType=assets_document&contentId={contentId}".into()),
                ],
            ),
            (
                paths::SYNC_CLASSROOM,
                "课程教学",
                vec![],
                vec![
                    (template_keys::VERSION, "https://s-file-1.ykt.cbern.com.cn/zxx/ndrs/national_lesson/teachingmaterials/version/data_version.json".into()),
                    (template_keys::TAG, "https://s-file-1.ykt.cbern.com.cn/zxx/ndrs/tags/national_lesson_tag.json".into()),
                    (template_keys::DETAIL, "https://basic.smartedu.cn/syncClassroom/classActivity?activityId={activityId}".into()),
                ],
            ),
            (
                "/tchMaterial/detail",
                "教材",
                vec!["contentId"],
                vec![
                    (template_keys::DEFAULT, "https://{server}.ykt.cbern.com.cn/zxx/ndrv2/resources/tch_material/details/{contentId}.json".into()),
                    (template_keys::BACKUP, TemplateSet::Many(vec![
                        "https://{server}.ykt.cbern.com.cn/zxx/ndrs/resources/tch_material/details/{contentId}.json".into(),
                    ])),
                    (template_keys::AUDIO, "https://{server}.ykt.cbern.com.cn/zxx/ndrs/resources/{contentId}/relation_audios.json".into()),
                ],
            ),
            (
                "/syncClassroom/experimentLesson",
                "课程教学>教师备课授课>实验教学",
                vec!["courseId"],
                vec![(template_keys::DEFAULT, "https://{server}.ykt.cbern.com.cn/zxx/ndrs/experiment/resources/details/{courseId}.json".into())],
            ),
            (
                "/syncClassroom/prepare/detail",
                "课程教学>教师授课备课",
                vec!["resourceId"],
                vec![(template_keys::DEFAULT, "https://{server}.ykt.cbern.com.cn/zxx/ndrv2/prepare_sub_type/resources/details/{resourceId}.json".into())],
            ),
            (
                "/syncClassroom/classActivity",
                "课程教学>学生自主学习",
                vec!["activityId"],
                vec![(template_keys::DEFAULT, "https://{server}.ykt.cbern.com.cn/zxx/ndrv2/national_lesson/resources/details/{activityId}.json".into())],
            ),
            (
                "/syncClassroom/examinationpapers",
                "课程教学>教师备课授课>习题资源",
                vec!["resourceId"],
                vec![(template_keys::DEFAULT, "https://{server}.ykt.cbern.com.cn/zxx/ndrs/examinationpapers/resources/details/{resourceId}.json".into())],
            ),
            (
                "/syncClassroom/basicWork/detail",
                "课程教学>教师备课授课>基础性作业",
                vec!["contentId"],
                vec![(template_keys::DEFAULT, special_edu.into())],
            ),
            (
                "/schoolService/detail",
                "课后服务",
                vec!["contentId"],
                vec![
                    (template_keys::DEFAULT, special_edu.into()),
                    (template_keys::THEMATIC_COURSE, "https://{server}.ykt.cbern.com.cn/zxx/ndrs/special_edu/thematic_course/{contentId}/resources/list.json".into()),
                ],
            ),
            ("/sedu/detail", "德育", vec!["contentId"], vec![(template_keys::DEFAULT, special_edu.into())]),
            ("/specialEdu/detail", "特殊教育", vec!["contentId"], vec![(template_keys::DEFAULT, special_edu.into())]),
            ("/family/detail", "家庭教育", vec!["contentId"], vec![(template_keys::DEFAULT, special_edu.into())]),
            ("/eduReform/detail", "教改经验", vec!["contentId"], vec![(template_keys::DEFAULT, special_edu.into())]),
            (
                "/wisdom/detail",
                "劳动教育>劳动智慧",
                vec!["contentId"],
                vec![(template_keys::DEFAULT, "https://{server}.ykt.cbern.com.cn/ldjy/ndrs/special_edu/resources/details/{contentId}.json".into())],
            ),
            (
                "/yearQualityCourse",
                "基础教育精品课：微课展示",
                vec!["courseId"],
                vec![(template_keys::DEFAULT, "https://{server}.ykt.cbern.com.cn/competitive/elite_lesson/resources/{courseId}.json".into())],
            ),
        ];

        let paths = path_table
            .into_iter()
            .map(|(path, label, params, templates)| {
                (
                    path.to_string(),
                    PlatformPathConfig {
                        label: label.to_string(),
                        params: params.iter().map(|p| p.to_string()).collect(),
                        templates: templates
                            .into_iter()
                            .map(|(k, v)| (k.to_string(), v))
                            .collect(),
                    },
                )
            })
            .collect();

        let resource_types = vec![
            ResourceTypeDescriptor {
                code: resource_types::ASSETS_DOCUMENT.into(),
                display_name: "文档".into(),
                formats: vec!["pdf".into(), "jpg".into(), "superboard".into()],
            },
            ResourceTypeDescriptor {
                code: resource_types::ASSETS_AUDIO.into(),
                display_name: "音频".into(),
                formats: vec!["mp3".into(), "ogg".into()],
            },
            ResourceTypeDescriptor {
                code: resource_types::ASSETS_VIDEO.into(),
                display_name: "视频".into(),
                formats: vec!["m3u8".into()],
            },
        ];

        Self {
            domain_remap,
            index_paths: vec![paths::TCH_MATERIAL.into(), paths::SYNC_CLASSROOM.into()],
            paths,
            resource_types,
            format_remap: HashMap::from([
                ("jpeg".into(), "jpg".into()),
                ("mpeg".into(), "mp3".into()),
                ("oga".into(), "ogg".into()),
            ]),
            // 视频分片下载不在支持范围内，m3u8 不作为可下载格式
            accepted_formats: ["pdf", "jpg", "superboard", "mp3", "ogg"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            server_prefixes: vec!["s-file-1".into(), "s-file-2".into(), "s-file-3".into()],
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self::builtin()
    }
}
