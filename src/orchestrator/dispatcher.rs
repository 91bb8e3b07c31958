//! 调度器 - 编排层
//!
//! 按来源顺序逐个处理候选项：
//! 无 ID 跳过 → 账本已有跳过 → 调用下载流程
//!
//! 严格串行，一个下载结束后才考虑下一个候选项

use tracing::{error, info};

use crate::infrastructure::Worker;
use crate::models::{Candidate, RunStats};
use crate::services::{Ledger, RunLog};
use crate::workflow::{ItemCtx, ItemFlow, ProcessResult};

/// 调度一组候选项
///
/// 单个候选项的任何失败都只计数，不会中断整次运行
pub async fn dispatch<I, W>(
    candidates: I,
    flow: &ItemFlow<W>,
    ledger: &mut Ledger,
    run_log: &mut RunLog,
) -> RunStats
where
    I: IntoIterator<Item = Candidate>,
    W: Worker,
{
    let mut stats = RunStats::default();

    for candidate in candidates {
        let item = match candidate {
            Candidate::Keyed(item) => item,
            Candidate::Unkeyed(reference) => {
                info!("跳过链接 (未找到模型 ID): {}", reference);
                stats.skipped_no_key += 1;
                continue;
            }
        };

        if ledger.contains(&item.key) {
            info!(
                "--- 跳过 --- ID {} 已存在于 {}",
                item.key,
                ledger.path().display()
            );
            stats.skipped_processed += 1;
            continue;
        }

        stats.total += 1;
        let ctx = ItemCtx::new(stats.total, item.key.as_str());

        match flow.run(&item, &ctx, ledger, run_log).await {
            ProcessResult::Success => stats.success += 1,
            ProcessResult::Failed => stats.fault += 1,
        }
    }

    if let Err(e) = run_log.write_summary(&stats) {
        error!("运行日志写入失败: {}", e);
    }

    stats
}
