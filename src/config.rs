use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::infrastructure::SuccessPolicy;

/// 程序配置
///
/// 优先级: 命令行参数 > 环境变量 > TOML 配置文件 > 默认值
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// 已处理模型的账本文件 (ID \t 详情)
    pub ledger_file: PathBuf,
    /// 待下载链接列表，每行一个
    pub batch_file: PathBuf,
    /// 本次运行的日志文件
    pub run_log_file: PathBuf,
    /// 保存下来的 HTML 页面
    pub html_file: PathBuf,
    /// 从 HTML 导出的链接列表
    pub link_output_file: PathBuf,
    /// 相对链接拼接用的站点根地址
    pub link_base_url: String,
    // --- 下载程序 ---
    pub worker_program: String,
    pub worker_args: Vec<String>,
    pub success_policy: SuccessPolicy,
    // --- 目录扫描 ---
    pub scan_root: PathBuf,
    pub exclude_folders: Vec<String>,
    // --- 模型 API ---
    pub api_base_url: String,
    pub api_version: String,
    pub request_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger_file: PathBuf::from("extracted_ids.txt"),
            batch_file: PathBuf::from("Needdownload.txt"),
            run_log_file: PathBuf::from("Needdownload.log"),
            html_file: PathBuf::from("Artistneeddown.txt"),
            link_output_file: PathBuf::from("Needdownload-artistbulk.txt"),
            link_base_url: "https://hub.vroid.com/".to_string(),
            worker_program: "node".to_string(),
            worker_args: vec!["src/index.js".to_string()],
            success_policy: SuccessPolicy::StderrEmpty,
            scan_root: PathBuf::from("VRM"),
            exclude_folders: vec![
                "My project".to_string(),
                "ignored_cache".to_string(),
                "temp_files".to_string(),
            ],
            api_base_url: "https://hub.vroid.com/api/character_models/".to_string(),
            api_version: "11".to_string(),
            request_timeout_secs: 30,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置：可选的 TOML 文件，再叠加环境变量
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let base = match config_file {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_env())
    }

    /// 从 TOML 文件读取配置，缺省字段取默认值
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::input(path, e))?;
        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("无法解析配置文件 {}: {}", path.display(), e)))
    }

    /// 用进程环境变量覆盖
    pub fn with_env(self) -> Self {
        self.with_vars(|name| std::env::var(name).ok())
    }

    /// 用任意变量来源覆盖，无法解析的值保留原设置
    pub fn with_vars(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            ledger_file: lookup("LEDGER_FILE").map(PathBuf::from).unwrap_or(self.ledger_file),
            batch_file: lookup("BATCH_FILE").map(PathBuf::from).unwrap_or(self.batch_file),
            run_log_file: lookup("RUN_LOG_FILE").map(PathBuf::from).unwrap_or(self.run_log_file),
            html_file: lookup("HTML_FILE").map(PathBuf::from).unwrap_or(self.html_file),
            link_output_file: lookup("LINK_OUTPUT_FILE")
                .map(PathBuf::from)
                .unwrap_or(self.link_output_file),
            link_base_url: lookup("LINK_BASE_URL").unwrap_or(self.link_base_url),
            worker_program: lookup("WORKER_PROGRAM").unwrap_or(self.worker_program),
            worker_args: lookup("WORKER_ARGS")
                .map(|v| v.split_whitespace().map(str::to_string).collect())
                .unwrap_or(self.worker_args),
            success_policy: parsed(&lookup, "SUCCESS_POLICY").unwrap_or(self.success_policy),
            scan_root: lookup("SCAN_ROOT").map(PathBuf::from).unwrap_or(self.scan_root),
            exclude_folders: lookup("EXCLUDE_FOLDERS")
                .map(|v| split_list(&v))
                .unwrap_or(self.exclude_folders),
            api_base_url: lookup("API_BASE_URL").unwrap_or(self.api_base_url),
            api_version: lookup("API_VERSION").unwrap_or(self.api_version),
            request_timeout_secs: parsed(&lookup, "REQUEST_TIMEOUT_SECS")
                .unwrap_or(self.request_timeout_secs),
            verbose_logging: parsed(&lookup, "VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    lookup(name).and_then(|v| v.trim().parse().ok())
}

/// 逗号分隔的文件夹名，名字里可以有空格
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
