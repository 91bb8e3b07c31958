//! 外部下载程序 - 基础设施层
//!
//! 每个候选项启动一次下载程序，等待其完全结束后才返回

use std::future::Future;
use std::process::Stdio;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;

use crate::error::{AppError, Result};

/// 一次下载的完整输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// 被信号终止时为 None
    pub exit_code: Option<i32>,
}

impl WorkerOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// 判断一次下载是否成功
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SuccessPolicy {
    /// stderr 为空即成功，不看退出码
    #[default]
    StderrEmpty,
    /// 退出码为 0 即成功
    ExitStatus,
}

impl SuccessPolicy {
    pub fn judge(self, output: &WorkerOutput) -> bool {
        match self {
            SuccessPolicy::StderrEmpty => output.stderr.is_empty(),
            SuccessPolicy::ExitStatus => output.exit_code == Some(0),
        }
    }
}

impl FromStr for SuccessPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "stderr-empty" | "stderr" => Ok(SuccessPolicy::StderrEmpty),
            "exit-status" | "exit" => Ok(SuccessPolicy::ExitStatus),
            other => Err(AppError::Config(format!("未知的成功判定方式: {}", other))),
        }
    }
}

/// 下载能力
///
/// 参数为候选项的原始引用（链接），返回进程的全部输出
pub trait Worker {
    fn run(&self, reference: &str) -> impl Future<Output = Result<WorkerOutput>> + Send;
}

/// 以子进程方式运行的下载程序: `<program> <args...> <reference>`
#[derive(Debug, Clone)]
pub struct CommandWorker {
    program: String,
    args: Vec<String>,
}

impl CommandWorker {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// 用于日志显示的完整命令行
    pub fn command_line(&self, reference: &str) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 2);
        parts.push(self.program.as_str());
        parts.extend(self.args.iter().map(String::as_str));
        parts.push(reference);
        parts.join(" ")
    }
}

impl Worker for CommandWorker {
    async fn run(&self, reference: &str) -> Result<WorkerOutput> {
        debug!("执行: {}", self.command_line(reference));

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(reference)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| AppError::WorkerSpawn {
                program: self.program.clone(),
                source,
            })?;

        Ok(WorkerOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.status.code(),
        })
    }
}
