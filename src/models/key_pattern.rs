//! 键提取规则
//!
//! 一个规则 = 正则 + 捕获组序号。URL 里的模型 ID 和文件名开头的
//! `[ID]` 都是同一个匹配器的实例。

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AppError, Result};

/// 链接中 `/models/` 之后的第一段数字
pub const MODEL_URL_PATTERN: &str = r"/models/(\d+)";
/// 文件名开头方括号内的数字
pub const BRACKET_PREFIX_PATTERN: &str = r"^\[(\d+)\]";

static MODEL_URL: LazyLock<KeyPattern> = LazyLock::new(|| {
    KeyPattern::new(MODEL_URL_PATTERN, 1).expect("MODEL_URL_PATTERN is a valid regex")
});

static BRACKET_PREFIX: LazyLock<KeyPattern> = LazyLock::new(|| {
    KeyPattern::new(BRACKET_PREFIX_PATTERN, 1).expect("BRACKET_PREFIX_PATTERN is a valid regex")
});

/// 键格式描述
#[derive(Debug, Clone)]
pub struct KeyPattern {
    regex: Regex,
    group: usize,
}

impl KeyPattern {
    /// 根据正则和捕获组序号创建规则
    pub fn new(pattern: &str, group: usize) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| AppError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        if group > regex.captures_len() - 1 {
            return Err(AppError::Config(format!(
                "捕获组 {} 不存在于规则 {}",
                group, pattern
            )));
        }
        Ok(Self { regex, group })
    }

    /// 模型链接规则
    pub fn model_url() -> &'static KeyPattern {
        &MODEL_URL
    }

    /// 文件名前缀规则
    pub fn bracket_prefix() -> &'static KeyPattern {
        &BRACKET_PREFIX
    }

    /// 取第一处匹配的捕获内容
    pub fn extract<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(self.group))
            .map(|m| m.as_str())
    }
}

/// 从模型链接中提取模型 ID
pub fn extract_model_id(url: &str) -> Option<&str> {
    KeyPattern::model_url().extract(url)
}

/// 从文件名中提取 ID，文件名必须以 `[数字]` 开头
pub fn extract_id(filename: &str) -> Option<&str> {
    KeyPattern::bracket_prefix().extract(filename)
}
