pub mod key_pattern;

pub use key_pattern::{extract_id, extract_model_id, KeyPattern};

use std::fmt::Display;

/// 一个待处理单元
///
/// 键相同即为同一单元，与来源无关
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub key: String,
    /// 原始链接或文件路径
    pub source_reference: String,
}

impl WorkItem {
    pub fn new(key: impl Into<String>, source_reference: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source_reference: source_reference.into(),
        }
    }
}

/// 来源枚举出的候选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// 成功提取到键
    Keyed(WorkItem),
    /// 提取不到键，保留原始引用以便统计
    Unkeyed(String),
}

impl Candidate {
    /// 用给定规则从引用中提取键
    pub fn from_reference(reference: impl Into<String>, pattern: &KeyPattern) -> Self {
        let reference = reference.into();
        match pattern.extract(&reference).map(str::to_string) {
            Some(key) => Candidate::Keyed(WorkItem {
                key,
                source_reference: reference,
            }),
            None => Candidate::Unkeyed(reference),
        }
    }

    pub fn source_reference(&self) -> &str {
        match self {
            Candidate::Keyed(item) => &item.source_reference,
            Candidate::Unkeyed(reference) => reference,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Candidate::Keyed(item) => Some(&item.key),
            Candidate::Unkeyed(_) => None,
        }
    }
}

/// 账本中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub key: String,
    pub detail: String,
}

impl LedgerEntry {
    /// 从链接下载成功后登记的条目
    pub fn processed_from_link(key: impl Into<String>, link: &str) -> Self {
        Self {
            key: key.into(),
            detail: format!("[PROCESSED_FROM_LINK]:{}", link),
        }
    }

    /// 解析一行，第一列必须全是数字
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let mut fields = line.splitn(2, '\t');
        let key = fields.next()?;
        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self {
            key: key.to_string(),
            detail: fields.next().unwrap_or_default().to_string(),
        })
    }
}

impl Display for LedgerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.key, self.detail)
    }
}

/// 一次运行的统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// 实际交给下载程序的数量
    pub total: usize,
    pub success: usize,
    pub fault: usize,
    /// 提取不到 ID 而跳过
    pub skipped_no_key: usize,
    /// 账本中已存在而跳过
    pub skipped_processed: usize,
}

impl RunStats {
    /// 来源给出的候选项总数
    pub fn candidates(&self) -> usize {
        self.total + self.skipped_no_key + self.skipped_processed
    }
}
