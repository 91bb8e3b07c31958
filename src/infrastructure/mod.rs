//! 基础设施层
//!
//! 持有外部进程这类稀缺资源，只暴露"执行一次下载"的能力

pub mod worker;

pub use worker::{CommandWorker, SuccessPolicy, Worker, WorkerOutput};
