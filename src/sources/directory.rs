//! 目录扫描：递归遍历下载目录，从文件名提取模型 ID

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{AppError, Result};
use crate::models::{Candidate, KeyPattern, WorkItem};
use crate::sources::CandidateSource;

pub struct DirectorySource {
    root: PathBuf,
    exclude: HashSet<String>,
    pattern: KeyPattern,
}

impl DirectorySource {
    /// 使用文件名前缀规则
    pub fn new(root: impl Into<PathBuf>, exclude: impl IntoIterator<Item = String>) -> Self {
        Self {
            root: root.into(),
            exclude: exclude.into_iter().collect(),
            pattern: KeyPattern::bracket_prefix().clone(),
        }
    }

    /// 路径中任一目录名（盘符、根除外）命中排除列表
    pub fn is_excluded(&self, path: &Path) -> bool {
        path.components().any(|component| match component {
            Component::Normal(name) => name
                .to_str()
                .is_some_and(|name| self.exclude.contains(name)),
            _ => false,
        })
    }

    fn candidate_for(&self, path: &Path) -> Candidate {
        let reference = path.display().to_string();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        match self.pattern.extract(&file_name) {
            Some(key) => Candidate::Keyed(WorkItem::new(key, reference)),
            None => Candidate::Unkeyed(reference),
        }
    }
}

impl CandidateSource for DirectorySource {
    fn candidates(&self) -> Result<Box<dyn Iterator<Item = Candidate> + '_>> {
        if !self.root.is_dir() {
            return Err(AppError::InputNotFound {
                path: self.root.clone(),
            });
        }

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            // 根目录本身不排除；命中排除的子目录整棵跳过
            .filter_entry(move |entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                if self.is_excluded(entry.path()) {
                    info!("--- 排除文件夹: {} (跳过其内容)", entry.path().display());
                    return false;
                }
                true
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("⚠️ 无法读取目录项: {}", e);
                    None
                }
            })
            // 指向文件的符号链接也算文件
            .filter(|entry| entry.path().is_file())
            .map(move |entry| self.candidate_for(entry.path()));

        Ok(Box::new(walker))
    }

    fn describe(&self) -> String {
        format!("目录 {}", self.root.display())
    }
}
