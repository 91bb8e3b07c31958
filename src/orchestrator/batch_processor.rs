//! 应用入口 - 编排层
//!
//! ## 核心功能
//!
//! 1. **批量下载**：读取链接列表，按账本过滤后逐个调用下载程序
//! 2. **链接导出**：从保存的 HTML 页面导出去重后的模型链接列表
//! 3. **目录扫描**：遍历下载目录，把已有文件的 ID 写入账本
//! 4. **模型查询**：从平台 API 获取单个模型的信息

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::{CommandWorker, Worker};
use crate::models::{Candidate, RunStats};
use crate::orchestrator::dispatcher::dispatch;
use crate::orchestrator::scanner::{scan_into_ledger, ScanStats};
use crate::services::{Ledger, ModelApi, ModelInfo, RunLog};
use crate::sources::{BatchFileSource, CandidateSource, DirectorySource, HtmlLinkSource};
use crate::workflow::ItemFlow;

/// 链接导出统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    /// 导出的链接数
    pub links: usize,
    /// 其中提取不到模型 ID 的
    pub without_id: usize,
    /// 导出后立即下载时的统计
    pub run: Option<RunStats>,
}

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// 下载配置中的链接列表
    pub async fn run_batch(&self) -> Result<RunStats> {
        let path = self.config.batch_file.clone();
        self.run_batch_file(&path).await
    }

    /// 下载指定的链接列表
    pub async fn run_batch_file(&self, path: &Path) -> Result<RunStats> {
        let worker = CommandWorker::new(
            self.config.worker_program.clone(),
            self.config.worker_args.clone(),
        );
        let flow = ItemFlow::new(worker, self.config.success_policy);
        self.run_with(&BatchFileSource::new(path), &flow).await
    }

    /// 用任意来源和下载流程执行一次调度
    pub async fn run_with<S, W>(&self, source: &S, flow: &ItemFlow<W>) -> Result<RunStats>
    where
        S: CandidateSource + ?Sized,
        W: Worker,
    {
        log_startup(&self.config, &source.describe());

        let candidates = source
            .candidates()
            .with_context(|| format!("无法读取{}", source.describe()))?;

        let mut ledger = Ledger::load(&self.config.ledger_file)?;
        let mut run_log = RunLog::create(&self.config.run_log_file)?;

        let stats = dispatch(candidates, flow, &mut ledger, &mut run_log).await;

        print_final_stats(&stats, run_log.path());
        Ok(stats)
    }

    /// 从 HTML 页面导出链接列表，`then_dispatch` 为 true 时接着下载
    pub async fn extract(&self, then_dispatch: bool) -> Result<ExtractStats> {
        let source = HtmlLinkSource::new(
            &self.config.html_file,
            Some(self.config.link_base_url.as_str()),
        )?;
        let candidates: Vec<Candidate> = source
            .candidates()
            .with_context(|| format!("无法读取{}", source.describe()))?
            .collect();

        let mut stats = ExtractStats::default();
        let mut content = String::new();
        for candidate in &candidates {
            let link = candidate.source_reference();
            println!("{}", link);
            content.push_str(link);
            content.push('\n');
            stats.links += 1;
            if candidate.key().is_none() {
                stats.without_id += 1;
            }
        }

        let out = &self.config.link_output_file;
        fs::write(out, content).map_err(|e| AppError::output_write(out, e))?;

        println!("Total model number:{}", stats.links);
        if stats.without_id > 0 {
            warn!("⚠️ 其中 {} 个链接不含模型 ID", stats.without_id);
        }
        info!("✓ 链接列表已写入: {}", out.display());

        if then_dispatch {
            stats.run = Some(self.run_batch_file(out).await?);
        }

        Ok(stats)
    }

    /// 扫描下载目录并写入账本
    ///
    /// 默认先清空账本再完整重建；`append` 为 true 时保留原有记录，只补充新 ID
    pub fn scan(&self, append: bool) -> Result<ScanStats> {
        let source = DirectorySource::new(
            &self.config.scan_root,
            self.config.exclude_folders.iter().cloned(),
        );

        // 根目录不存在时直接失败，账本保持原样
        if !self.config.scan_root.is_dir() {
            return Err(AppError::InputNotFound {
                path: self.config.scan_root.clone(),
            })
            .with_context(|| format!("无法扫描目录: {}", self.config.scan_root.display()));
        }

        let mut ledger = if append {
            Ledger::load(&self.config.ledger_file)?
        } else {
            Ledger::reset(&self.config.ledger_file)?;
            Ledger::empty(&self.config.ledger_file)
        };

        let stats = scan_into_ledger(&source, &mut ledger, append)
            .with_context(|| format!("无法扫描目录: {}", self.config.scan_root.display()))?;

        print_scan_stats(&stats, &self.config);
        Ok(stats)
    }

    /// 查询单个模型信息并打印，`out` 给出时同时保存到文件
    pub async fn inspect(&self, model_id: &str, out: Option<&Path>) -> Result<ModelInfo> {
        let api = ModelApi::new(&self.config)?;
        info!("\n--- 查询模型信息: {} ---", model_id);

        let model = api.fetch(model_id).await?;
        if model.data().is_none() {
            warn!("⚠️ 响应中没有顶层 data 键");
        }

        let pretty = model.pretty();
        println!("{}", pretty);

        if let Some(path) = out {
            fs::write(path, &pretty).map_err(|e| AppError::output_write(path, e))?;
            info!("✓ 已保存至: {}", path.display());
        }

        Ok(model)
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config, source: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 开始批量下载");
    info!("📄 来源: {}", source);
    info!("📒 账本: {}", config.ledger_file.display());
    info!("⚙️ 下载程序: {} {}", config.worker_program, config.worker_args.join(" "));
    info!("{}", "=".repeat(60));
}

fn print_final_stats(stats: &RunStats, log_path: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 完成!");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("候选项总数: {}", stats.candidates());
    info!("本次处理的链接: {}", stats.total);
    info!("✅ 成功: {}", stats.success);
    info!("❌ 失败: {}", stats.fault);
    info!(
        "⏭️ 跳过: 已处理 {}, 无ID {}",
        stats.skipped_processed, stats.skipped_no_key
    );
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_path.display());
}

fn print_scan_stats(stats: &ScanStats, config: &Config) {
    info!("\n--- 扫描完成 ---");
    info!("检查的文件总数: {}", stats.files_checked);
    info!("提取并保存的 ID: {}", stats.ids_recorded);
    if stats.ids_known > 0 {
        info!("账本中已有的 ID: {}", stats.ids_known);
    }
    info!("\n所有结果已保存至: {}", config.ledger_file.display());
}
