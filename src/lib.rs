//! # Model Batch
//!
//! 批量下载 3D 模型并用账本记录已处理 ID 的命令行工具
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有外部下载程序，只暴露"下载一个链接"的能力
//! - `CommandWorker` - 以子进程方式运行下载程序，收集 stdout / stderr / 退出码
//!
//! ### ② 业务能力层（Services）
//! - `Ledger` - 账本读取与追加登记
//! - `RunLog` - 每次运行的日志
//! - `ModelApi` - 模型信息查询
//!
//! ### ③ 来源（Sources）
//! - `BatchFileSource` / `HtmlLinkSource` / `DirectorySource` - 枚举候选项，不查账本
//!
//! ### ④ 流程层（Workflow）
//! - `ItemFlow` - 单个模型的流程（下载 → 判定 → 日志 → 登记）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `dispatcher` - 串行调度候选项
//! - `scanner` - 目录扫描登记
//! - `App` - 子命令入口

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod sources;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, Result};
pub use infrastructure::{CommandWorker, SuccessPolicy, Worker, WorkerOutput};
pub use models::{Candidate, KeyPattern, LedgerEntry, RunStats, WorkItem};
pub use orchestrator::{App, ExtractStats, ScanStats};
pub use services::{Ledger, RunLog};
pub use sources::CandidateSource;
pub use workflow::{ItemFlow, ProcessResult};
