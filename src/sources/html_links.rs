//! 从保存下来的 HTML 页面中提取模型链接

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use scraper::{Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Candidate, KeyPattern};
use crate::sources::CandidateSource;

/// 提取所有 `<a href>`，按原始 href 字符串去重，保留首次出现的顺序
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let mut seen = HashSet::new();
    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| !href.is_empty())
        .filter(|href| seen.insert(href.to_string()))
        .map(str::to_string)
        .collect()
}

/// 把相对链接拼成绝对地址；绝对地址按解析结果规范化输出，无法解析时去掉换行后原样返回
pub fn absolutize(base: &Url, href: &str) -> String {
    Url::parse(href)
        .or_else(|_| base.join(href))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| single_line(href))
}

/// 去掉 href 中的制表符和换行，一个链接只占一行
fn single_line(href: &str) -> String {
    href.chars().filter(|c| !matches!(*c, '\t' | '\n' | '\r')).collect()
}

pub struct HtmlLinkSource {
    path: PathBuf,
    base: Option<Url>,
    pattern: KeyPattern,
}

impl HtmlLinkSource {
    /// `base` 为 None 时保留原始 href
    pub fn new(path: impl Into<PathBuf>, base: Option<&str>) -> Result<Self> {
        let base = base
            .map(|b| {
                Url::parse(b).map_err(|e| AppError::Config(format!("无效的站点地址 {}: {}", b, e)))
            })
            .transpose()?;
        Ok(Self {
            path: path.into(),
            base,
            pattern: KeyPattern::model_url().clone(),
        })
    }

    /// 已去重、已补全的链接
    pub fn links(&self, html: &str) -> Vec<String> {
        extract_hrefs(html)
            .into_iter()
            .map(|href| match &self.base {
                Some(base) => absolutize(base, &href),
                None => single_line(&href),
            })
            .collect()
    }
}

impl CandidateSource for HtmlLinkSource {
    fn candidates(&self) -> Result<Box<dyn Iterator<Item = Candidate> + '_>> {
        let bytes = fs::read(&self.path).map_err(|e| AppError::input(&self.path, e))?;
        let html = String::from_utf8_lossy(&bytes);
        let links = self.links(&html);

        Ok(Box::new(
            links
                .into_iter()
                .map(move |link| Candidate::from_reference(link, &self.pattern)),
        ))
    }

    fn describe(&self) -> String {
        format!("HTML 页面 {}", self.path.display())
    }
}
