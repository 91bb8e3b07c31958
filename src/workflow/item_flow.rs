//! 单个模型的下载流程 - 流程层
//!
//! 流程顺序：
//! 1. 调用下载程序并等待结束
//! 2. 按成功判定方式判断结果
//! 3. 写运行日志
//! 4. 成功则登记到账本

use tracing::{debug, error, info};

use crate::infrastructure::{SuccessPolicy, Worker, WorkerOutput};
use crate::models::{LedgerEntry, WorkItem};
use crate::services::{AttemptRecord, Ledger, RunLog};
use crate::utils::logging::truncate_text;
use crate::workflow::item_ctx::ItemCtx;

/// 单个模型的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    Success,
    /// 下载失败，下次运行会重试
    Failed,
}

/// 单个模型的下载流程
///
/// 不持有账本和日志，只在调用时借用
pub struct ItemFlow<W: Worker> {
    worker: W,
    policy: SuccessPolicy,
}

impl<W: Worker> ItemFlow<W> {
    pub fn new(worker: W, policy: SuccessPolicy) -> Self {
        Self { worker, policy }
    }

    pub async fn run(
        &self,
        item: &WorkItem,
        ctx: &ItemCtx,
        ledger: &mut Ledger,
        run_log: &mut RunLog,
    ) -> ProcessResult {
        info!("{}-正在下载: {}", ctx.index, item.source_reference);

        let (output, spawn_error) = match self.worker.run(&item.source_reference).await {
            Ok(output) => (Some(output), None),
            Err(e) => {
                error!("{} ❌ {}", ctx, e);
                (None, Some(e.to_string()))
            }
        };
        if let Some(output) = &output {
            debug!("{} stdout: {}", ctx, truncate_text(output.stdout_text().trim(), 200));
        }
        let success = output
            .as_ref()
            .is_some_and(|output| self.policy.judge(output));

        self.write_log(item, ctx, output.as_ref(), success, spawn_error, run_log);

        if !success {
            error!("-----下载失败!! 请查看日志----- {}", item.source_reference);
            return ProcessResult::Failed;
        }

        info!("OK! {}", item.source_reference);
        let entry = LedgerEntry::processed_from_link(&item.key, &item.source_reference);
        match ledger.record(&entry.key, &entry.detail) {
            Ok(()) => info!("    [已登记] ID {} 已写入 {}", item.key, ledger.path().display()),
            Err(e) => error!("    [错误] ID {} 无法登记: {}", item.key, e),
        }

        ProcessResult::Success
    }

    fn write_log(
        &self,
        item: &WorkItem,
        ctx: &ItemCtx,
        output: Option<&WorkerOutput>,
        success: bool,
        spawn_error: Option<String>,
        run_log: &mut RunLog,
    ) {
        let record = AttemptRecord {
            reference: &item.source_reference,
            key: &item.key,
            output,
            success,
            error: spawn_error,
        };
        if let Err(e) = run_log.write_attempt(&record) {
            error!("{} 运行日志写入失败: {}", ctx, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    struct FixedWorker {
        stderr: &'static str,
        exit_code: i32,
    }

    impl Worker for FixedWorker {
        async fn run(&self, _reference: &str) -> Result<WorkerOutput> {
            Ok(WorkerOutput {
                stdout: b"downloaded".to_vec(),
                stderr: self.stderr.as_bytes().to_vec(),
                exit_code: Some(self.exit_code),
            })
        }
    }

    fn setup() -> (tempfile::TempDir, Ledger, RunLog) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::empty(dir.path().join("ids.txt"));
        let run_log = RunLog::create(dir.path().join("run.log")).unwrap();
        (dir, ledger, run_log)
    }

    #[test]
    fn success_is_recorded_with_link_detail() {
        let (dir, mut ledger, mut run_log) = setup();
        let flow = ItemFlow::new(
            FixedWorker {
                stderr: "",
                exit_code: 0,
            },
            SuccessPolicy::StderrEmpty,
        );
        let item = WorkItem::new("99", "http://x/models/99");

        let result = tokio_test::block_on(flow.run(
            &item,
            &ItemCtx::new(1, "99"),
            &mut ledger,
            &mut run_log,
        ));

        assert_eq!(result, ProcessResult::Success);
        assert!(ledger.contains("99"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("ids.txt")).unwrap(),
            "99\t[PROCESSED_FROM_LINK]:http://x/models/99\n"
        );
    }

    #[test]
    fn stderr_output_fails_even_with_zero_exit() {
        let (dir, mut ledger, mut run_log) = setup();
        let flow = ItemFlow::new(
            FixedWorker {
                stderr: "TypeError: fetch failed",
                exit_code: 0,
            },
            SuccessPolicy::StderrEmpty,
        );
        let item = WorkItem::new("7", "http://x/models/7");

        let result = tokio_test::block_on(flow.run(
            &item,
            &ItemCtx::new(1, "7"),
            &mut ledger,
            &mut run_log,
        ));

        assert_eq!(result, ProcessResult::Failed);
        assert!(!ledger.contains("7"));
        assert!(!dir.path().join("ids.txt").exists());
        let log = std::fs::read_to_string(dir.path().join("run.log")).unwrap();
        assert!(log.contains("TypeError: fetch failed"));
    }
}
