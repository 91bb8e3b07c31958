use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 必需的输入文件或目录不存在
    #[error("输入不存在: {}", .path.display())]
    InputNotFound { path: PathBuf },

    /// 读取输入失败
    #[error("读取失败 ({}): {source}", .path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 写入账本失败
    #[error("账本写入失败 ({}): {source}", .path.display())]
    LedgerWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 写入输出文件失败
    #[error("写入文件失败 ({}): {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 运行日志写入失败
    #[error("运行日志写入失败 ({}): {source}", .path.display())]
    RunLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 无法启动外部下载程序
    #[error("无法启动下载程序 {program}: {source}")]
    WorkerSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// API 请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    Api {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 键格式无效
    #[error("无效的键格式 {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建输入读取错误，文件不存在时归为 `InputNotFound`
    pub fn input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            AppError::InputNotFound { path }
        } else {
            AppError::InputRead { path, source }
        }
    }

    /// 创建账本写入错误
    pub fn ledger_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::LedgerWrite {
            path: path.into(),
            source,
        }
    }

    /// 创建输出文件写入错误
    pub fn output_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::OutputWrite {
            path: path.into(),
            source,
        }
    }

    /// 创建运行日志错误
    pub fn run_log(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::RunLog {
            path: path.into(),
            source,
        }
    }

    /// 创建API请求失败错误
    pub fn api(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api {
            endpoint: endpoint.into(),
            source,
        }
    }
}

/// 应用程序结果类型
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_maps_to_input_not_found() {
        let err = AppError::input(
            "Needdownload.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, AppError::InputNotFound { .. }));
        assert!(err.to_string().contains("Needdownload.txt"));
    }

    #[test]
    fn other_io_errors_stay_read_errors() {
        let err = AppError::input(
            "x.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, AppError::InputRead { .. }));
    }
}
