//! 发布请求构建 - 业务能力层
//!
//! 从一条视频记录构建一个发布请求，纯转换，无副作用，永不失败
//! （空描述得到默认标签，不是错误）。

use regex::Regex;

use crate::models::{PublishRequest, VideoRecord};

/// 描述中话题标签的匹配模式
const TAG_PATTERN: &str = r"#(\w+)";

/// 单个请求最多携带的标签数（平台限制）
const MAX_TAGS: usize = 5;

/// 发布请求构建器
///
/// 职责：
/// - 从描述中提取话题标签
/// - 拼接发布标题
/// - 不访问存储，不访问网络
pub struct RequestBuilder {
    tag_regex: Regex,
    default_tags: Vec<String>,
}

impl RequestBuilder {
    /// 创建构建器，`default_tags` 在描述中没有任何 `#标签` 时使用
    pub fn new(default_tags: Vec<String>) -> Self {
        Self {
            tag_regex: Regex::new(TAG_PATTERN).expect("标签正则应当合法"),
            default_tags,
        }
    }

    /// 从视频记录构建发布请求
    ///
    /// 标题是"展示名称 + 空行 + 描述"的拼接：描述跟在标题后一起进入
    /// 平台的标题字段，可以显著提高搜索命中率。这是刻意的产品决策。
    pub fn build(&self, record: &VideoRecord) -> PublishRequest {
        PublishRequest {
            title: format!("{}\n\n{}", record.display_title, record.description),
            description: record.description.clone(),
            tags: self.extract_tags(&record.description),
            media_path: record.source_path.clone(),
            scheduled_time: None,
        }
    }

    /// 从描述中提取话题标签
    ///
    /// 按首次出现顺序收集 `#标签`，去重，最多保留 5 个；
    /// 一个都没有时返回默认标签集。
    pub fn extract_tags(&self, description: &str) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for capture in self.tag_regex.captures_iter(description) {
            let tag = &capture[1];
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
            if tags.len() == MAX_TAGS {
                break;
            }
        }
        if tags.is_empty() {
            return self.default_tags.clone();
        }
        tags
    }
}
