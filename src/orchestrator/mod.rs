//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 应用入口
//! - 持有配置，按子命令组装来源、账本、运行日志和下载流程
//! - 输出全局统计信息
//!
//! ### `dispatcher` - 调度器
//! - 遍历候选项，按账本过滤后交给 `workflow::ItemFlow`
//!
//! ### `scanner` - 目录扫描登记
//! - 遍历下载目录，把文件名中的 ID 写入账本
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (子命令)
//!     ↓
//! dispatcher / scanner (处理 Iterator<Candidate>)
//!     ↓
//! workflow::ItemFlow (处理单个 WorkItem)
//!     ↓
//! services (账本 / 运行日志 / 模型 API)
//!     ↓
//! infrastructure (下载程序子进程)
//! ```

pub mod batch_processor;
pub mod dispatcher;
pub mod scanner;

pub use batch_processor::{App, ExtractStats};
pub use dispatcher::dispatch;
pub use scanner::{scan_into_ledger, ScanStats};
