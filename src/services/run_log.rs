//! 运行日志 - 业务能力层
//!
//! 每次运行开始时覆盖旧日志，每次下载尝试写入一个块。
//! 每个块写完立即落盘，进程中途被中断时日志仍然完整。

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::infrastructure::WorkerOutput;
use crate::models::RunStats;

/// 一次下载尝试的记录
#[derive(Debug)]
pub struct AttemptRecord<'a> {
    pub reference: &'a str,
    pub key: &'a str,
    /// 下载程序未能启动时为 None
    pub output: Option<&'a WorkerOutput>,
    pub success: bool,
    /// 启动失败的原因
    pub error: Option<String>,
}

/// 运行日志
pub struct RunLog {
    path: PathBuf,
    file: File,
}

impl RunLog {
    /// 创建（截断）日志文件并写入表头
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut file = File::create(&path).map_err(|e| AppError::run_log(&path, e))?;

        let header = format!(
            "{}\n模型下载日志 - {}\n{}\n\n",
            "=".repeat(60),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(60)
        );
        file.write_all(header.as_bytes())
            .map_err(|e| AppError::run_log(&path, e))?;

        Ok(Self { path, file })
    }

    /// 写入一次尝试
    pub fn write_attempt(&mut self, record: &AttemptRecord<'_>) -> Result<()> {
        let block = render_attempt(record);
        self.write_str(&block)
    }

    /// 写入结尾统计
    pub fn write_summary(&mut self, stats: &RunStats) -> Result<()> {
        let footer = format!(
            "{}\n完成时间: {}\n本次处理: {}\n成功: {}\n失败: {}\n无ID跳过: {}\n已处理跳过: {}\n{}\n",
            "=".repeat(60),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            stats.total,
            stats.success,
            stats.fault,
            stats.skipped_no_key,
            stats.skipped_processed,
            "=".repeat(60)
        );
        self.write_str(&footer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_str(&mut self, text: &str) -> Result<()> {
        self.file
            .write_all(text.as_bytes())
            .and_then(|_| self.file.flush())
            .map_err(|e| AppError::run_log(&self.path, e))
    }
}

/// 生成一个日志块
pub fn render_attempt(record: &AttemptRecord<'_>) -> String {
    let mut block = String::new();
    block.push_str("---------------------NEW LINK-------------------\n");
    block.push_str(record.reference);
    block.push('\n');
    block.push_str(&format!("MODEL ID: {}\n", record.key));

    block.push_str("------STDOUT-------\n");
    match record.output {
        Some(output) => {
            block.push_str(&output.stdout_text());
            block.push('\n');
        }
        None => block.push_str("NO OUTPUT!\n"),
    }

    block.push_str("------STDERR-------\n");
    let stderr = record.output.map(WorkerOutput::stderr_text).unwrap_or_default();
    if let Some(error) = &record.error {
        block.push_str(error);
        block.push('\n');
    } else if !stderr.is_empty() {
        block.push_str(&stderr);
        block.push('\n');
    } else if record.success {
        block.push_str("No error!\n");
    } else {
        let code = record
            .output
            .and_then(|o| o.exit_code)
            .map(|c| c.to_string())
            .unwrap_or_else(|| "无".to_string());
        block.push_str(&format!("退出码: {}\n", code));
    }

    block.push_str("---------------------END LINK-------------------\n\n\n");
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(stdout: &str, stderr: &str, code: i32) -> WorkerOutput {
        WorkerOutput {
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
            exit_code: Some(code),
        }
    }

    #[test]
    fn successful_block_says_no_error() {
        let out = output("saved model", "", 0);
        let block = render_attempt(&AttemptRecord {
            reference: "http://x/models/99",
            key: "99",
            output: Some(&out),
            success: true,
            error: None,
        });
        assert!(block.starts_with("---------------------NEW LINK"));
        assert!(block.contains("http://x/models/99\nMODEL ID: 99\n"));
        assert!(block.contains("------STDOUT-------\nsaved model\n"));
        assert!(block.contains("------STDERR-------\nNo error!\n"));
        assert!(block.ends_with("---------------------END LINK-------------------\n\n\n"));
    }

    #[test]
    fn failed_block_keeps_stderr_or_spawn_error() {
        let out = output("", "Error: 404", 1);
        let block = render_attempt(&AttemptRecord {
            reference: "l",
            key: "1",
            output: Some(&out),
            success: false,
            error: None,
        });
        assert!(block.contains("------STDERR-------\nError: 404\n"));

        let block = render_attempt(&AttemptRecord {
            reference: "l",
            key: "1",
            output: None,
            success: false,
            error: Some("无法启动下载程序 node".to_string()),
        });
        assert!(block.contains("NO OUTPUT!\n"));
        assert!(block.contains("无法启动下载程序 node\n"));
    }

    #[test]
    fn create_truncates_previous_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Needdownload.log");
        std::fs::write(&path, "old run\n").unwrap();

        let mut log = RunLog::create(&path).unwrap();
        log.write_summary(&RunStats {
            total: 2,
            success: 1,
            fault: 1,
            ..Default::default()
        })
        .unwrap();
        drop(log);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("old run"));
        assert!(content.contains("模型下载日志"));
        assert!(content.contains("本次处理: 2"));
        assert!(content.contains("失败: 1"));
    }
}
