//! 候选项来源
//!
//! 每种来源只负责枚举候选项，不查询账本；是否已处理由流程层判断。

pub mod batch_file;
pub mod directory;
pub mod html_links;

pub use batch_file::BatchFileSource;
pub use directory::DirectorySource;
pub use html_links::{absolutize, extract_hrefs, HtmlLinkSource};

use crate::error::Result;
use crate::models::Candidate;

/// 按来源顺序惰性产出候选项
///
/// 必需的输入不存在时在枚举开始前就返回错误
pub trait CandidateSource {
    fn candidates(&self) -> Result<Box<dyn Iterator<Item = Candidate> + '_>>;

    /// 用于日志显示
    fn describe(&self) -> String;
}
