//! 下载处理上下文
//!
//! 封装"本次运行的第几个下载、哪个模型"这一信息

use std::fmt::Display;

#[derive(Debug, Clone)]
pub struct ItemCtx {
    /// 本次运行中的下载序号（从1开始，仅用于日志）
    pub index: usize,
    pub key: String,
}

impl ItemCtx {
    pub fn new(index: usize, key: impl Into<String>) -> Self {
        Self {
            index,
            key: key.into(),
        }
    }
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[#{} 模型 {}]", self.index, self.key)
    }
}
