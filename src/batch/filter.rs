//! # 扩展名过滤器
//!
//! 按固定的受支持扩展名集合对文件进行分类。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 与 `batch/runner.rs` 使用

use std::collections::HashSet;

/// 可转换为 Markdown 的文件扩展名（小写，不含点）
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "docx", "pdf", "pptx", "xlsx", "xls", "html", "htm", "msg", "jpg", "jpeg", "png", "json",
    "xml", "csv", "zip",
];

/// 扩展名过滤器
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    extensions: HashSet<String>,
}

impl ExtensionFilter {
    /// 由扩展名列表创建过滤器（接受带或不带前导点的写法）
    pub fn new(extensions: &[&str]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// 扩展名是否受支持（不区分大小写）
    pub fn is_supported(&self, extension: &str) -> bool {
        self.extensions
            .contains(&extension.trim_start_matches('.').to_ascii_lowercase())
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(SUPPORTED_EXTENSIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        let filter = ExtensionFilter::default();
        assert!(filter.is_supported("pdf"));
        assert!(filter.is_supported("PDF"));
        assert!(filter.is_supported(".Docx"));
        assert!(filter.is_supported("htm"));
        assert!(!filter.is_supported("txt"));
        assert!(!filter.is_supported("md"));
        assert!(!filter.is_supported(""));
    }

    #[test]
    fn test_custom_set() {
        let filter = ExtensionFilter::new(&[".csv"]);
        assert!(filter.is_supported("csv"));
        assert!(!filter.is_supported("pdf"));
    }
}
