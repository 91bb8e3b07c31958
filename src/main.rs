use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use model_batch::utils::logging;
use model_batch::{App, Config, SuccessPolicy};

#[derive(Parser)]
#[command(name = "model_batch", about = "批量下载模型并记录已处理 ID")]
struct Cli {
    /// TOML 配置文件
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// 显示详细日志
    #[arg(short, long, global = true)]
    verbose: bool,
    /// 账本文件
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 下载链接列表中尚未处理的模型
    Run {
        /// 链接列表文件
        #[arg(long)]
        batch: Option<PathBuf>,
        /// 运行日志文件
        #[arg(long)]
        log: Option<PathBuf>,
        /// 成功判定方式
        #[arg(long, value_enum)]
        success_policy: Option<SuccessPolicy>,
    },
    /// 从保存的 HTML 页面导出模型链接
    Extract {
        /// HTML 文件
        #[arg(long)]
        html: Option<PathBuf>,
        /// 导出的链接列表
        #[arg(long)]
        out: Option<PathBuf>,
        /// 相对链接的站点地址
        #[arg(long)]
        base: Option<String>,
        /// 导出后立即下载
        #[arg(long)]
        dispatch: bool,
    },
    /// 扫描下载目录，把文件名中的 ID 写入账本
    Scan {
        /// 扫描根目录
        #[arg(long)]
        root: Option<PathBuf>,
        /// 要排除的文件夹名，可重复
        #[arg(long = "exclude")]
        exclude: Vec<String>,
        /// 保留原账本，只补充新 ID
        #[arg(long)]
        append: bool,
    },
    /// 查询单个模型的信息
    Inspect {
        /// 模型 ID
        id: String,
        /// 保存 JSON 的文件
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::load(cli.config.as_deref())?;
    config.verbose_logging |= cli.verbose;
    if let Some(ledger) = cli.ledger {
        config.ledger_file = ledger;
    }

    // 初始化日志
    logging::init(config.verbose_logging);

    match cli.command {
        Command::Run {
            batch,
            log,
            success_policy,
        } => {
            if let Some(batch) = batch {
                config.batch_file = batch;
            }
            if let Some(log) = log {
                config.run_log_file = log;
            }
            if let Some(policy) = success_policy {
                config.success_policy = policy;
            }
            App::new(config).run_batch().await?;
        }
        Command::Extract {
            html,
            out,
            base,
            dispatch,
        } => {
            if let Some(html) = html {
                config.html_file = html;
            }
            if let Some(out) = out {
                config.link_output_file = out;
            }
            if let Some(base) = base {
                config.link_base_url = base;
            }
            App::new(config).extract(dispatch).await?;
        }
        Command::Scan {
            root,
            exclude,
            append,
        } => {
            if let Some(root) = root {
                config.scan_root = root;
            }
            if !exclude.is_empty() {
                config.exclude_folders = exclude;
            }
            App::new(config).scan(append)?;
        }
        Command::Inspect { id, out } => {
            App::new(config).inspect(&id, out.as_deref()).await?;
        }
    }

    Ok(())
}
