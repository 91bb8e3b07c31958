//! 链接列表文件：每行一个链接，空行和 `#` 开头的行忽略

use std::fs;
use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::models::{Candidate, KeyPattern};
use crate::sources::CandidateSource;

pub struct BatchFileSource {
    path: PathBuf,
    pattern: KeyPattern,
}

impl BatchFileSource {
    /// 使用模型链接规则
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_pattern(path, KeyPattern::model_url().clone())
    }

    pub fn with_pattern(path: impl Into<PathBuf>, pattern: KeyPattern) -> Self {
        Self {
            path: path.into(),
            pattern,
        }
    }
}

impl CandidateSource for BatchFileSource {
    fn candidates(&self) -> Result<Box<dyn Iterator<Item = Candidate> + '_>> {
        let bytes = fs::read(&self.path).map_err(|e| AppError::input(&self.path, e))?;
        let content = String::from_utf8_lossy(&bytes).into_owned();

        let lines: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();

        Ok(Box::new(
            lines
                .into_iter()
                .map(move |line| Candidate::from_reference(line, &self.pattern)),
        ))
    }

    fn describe(&self) -> String {
        format!("链接列表 {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Needdownload.txt");
        fs::write(
            &path,
            "# artist batch\n\n  http://x/models/42  \r\nhttp://x/about\n   \n#http://x/models/7\nhttp://x/models/99\n",
        )
        .unwrap();

        let source = BatchFileSource::new(&path);
        let items: Vec<Candidate> = source.candidates().unwrap().collect();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].key(), Some("42"));
        assert_eq!(items[0].source_reference(), "http://x/models/42");
        assert_eq!(items[1], Candidate::Unkeyed("http://x/about".to_string()));
        assert_eq!(items[2].key(), Some("99"));
    }

    #[test]
    fn missing_file_fails_before_enumeration() {
        let dir = tempfile::tempdir().unwrap();
        let source = BatchFileSource::new(dir.path().join("missing.txt"));
        assert!(matches!(
            source.candidates().err(),
            Some(AppError::InputNotFound { .. })
        ));
    }
}
