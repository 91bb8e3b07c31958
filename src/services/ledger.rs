//! 账本 - 业务能力层
//!
//! 记录"哪些模型已经处理过"。文件格式为每行 `ID \t 详情`，只追加不修改。

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::models::LedgerEntry;

/// 已处理键的账本
///
/// 启动时整份读入内存；之后每登记一个键，内存集合和文件各追加一次，
/// 两者在同一次运行内不再互相同步。
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    keys: HashSet<String>,
}

impl Ledger {
    /// 空账本，不读文件
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keys: HashSet::new(),
        }
    }

    /// 读取账本文件
    ///
    /// 文件不存在时返回空账本；格式不对的行直接跳过
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut ledger = Self::empty(&path);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("⚠️ 账本文件 {} 不存在，从空集合开始", path.display());
                return Ok(ledger);
            }
            Err(e) => return Err(AppError::input(&path, e)),
        };

        let content = String::from_utf8_lossy(&bytes);
        let mut malformed = 0usize;
        for line in content.lines() {
            match LedgerEntry::parse(line) {
                Some(entry) => {
                    ledger.keys.insert(entry.key);
                }
                None => malformed += 1,
            }
        }

        info!(
            "✓ 从 {} 读取到 {} 个已处理的 ID",
            path.display(),
            ledger.keys.len()
        );
        if malformed > 0 {
            debug!("跳过 {} 行无效记录", malformed);
        }

        Ok(ledger)
    }

    /// 删除账本文件，用于重新扫描
    ///
    /// 返回文件原先是否存在
    pub fn reset(path: &Path) -> Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => {
                info!("🗑️ 已清空上次的账本: {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::ledger_write(path, e)),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// 只加入内存集合
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    /// 登记一个键
    ///
    /// 先加入内存集合，再追加到文件。写文件失败时返回错误，
    /// 但该键在本次运行内仍视为已处理。
    pub fn record(&mut self, key: &str, detail: &str) -> Result<()> {
        self.insert(key);
        let entry = LedgerEntry {
            key: key.to_string(),
            detail: detail.to_string(),
        };
        append_entry(&self.path, &entry)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// 追加一行，每次单独打开并关闭文件
fn append_entry(path: &Path, entry: &LedgerEntry) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::ledger_write(path, e))?;

    file.write_all(format!("{}\n", entry).as_bytes())
        .map_err(|e| AppError::ledger_write(path, e))?;

    Ok(())
}
