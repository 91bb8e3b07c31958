//! 目录扫描登记 - 编排层
//!
//! 只枚举和登记，不调用下载程序

use tracing::{error, info};

use crate::error::Result;
use crate::models::Candidate;
use crate::services::Ledger;
use crate::sources::CandidateSource;

/// 扫描统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub files_checked: usize,
    pub ids_recorded: usize,
    /// 追加模式下账本中已有而跳过
    pub ids_known: usize,
}

/// 把来源中每个带 ID 的文件登记到账本
///
/// `skip_known` 为 true 时跳过账本中已有的 ID（追加模式）；
/// 否则每个匹配的文件都写一行，与路径一一对应
pub fn scan_into_ledger<S>(source: &S, ledger: &mut Ledger, skip_known: bool) -> Result<ScanStats>
where
    S: CandidateSource + ?Sized,
{
    info!("--- 开始扫描: {} ---", source.describe());
    let mut stats = ScanStats::default();

    for candidate in source.candidates()? {
        stats.files_checked += 1;

        let Candidate::Keyed(item) = candidate else {
            continue;
        };

        if skip_known && ledger.contains(&item.key) {
            stats.ids_known += 1;
            continue;
        }

        match ledger.record(&item.key, &item.source_reference) {
            Ok(()) => {
                info!("    [已保存] ID: {}, 路径: {}", item.key, item.source_reference);
                stats.ids_recorded += 1;
            }
            Err(e) => error!("    [错误] 无法保存 {}: {}", item.source_reference, e),
        }
    }

    Ok(stats)
}
