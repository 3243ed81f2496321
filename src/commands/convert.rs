//! # convert 命令实现
//!
//! 将目录树中的文档批量转换为同目录下的 Markdown 文件。
//!
//! ## 功能
//! - 校验输入目录（无效时提示并直接返回）
//! - 单次遍历收集文件，统计受支持文件数
//! - 顺序转换，进度条显示
//!
//! ## 依赖关系
//! - 使用 `batch/` 收集与执行
//! - 使用 `converters/` 完成格式转换
//! - 使用 `utils/output.rs`

use crate::batch::filter::{ExtensionFilter, SUPPORTED_EXTENSIONS};
use crate::batch::{BatchResult, BatchRunner, FileCollector};
use crate::converters::{FileConverter, MarkdownConverter};
use crate::error::Result;
use crate::utils::output;

use std::path::Path;

/// 执行 convert 命令
pub fn execute(input_dir: &Path) -> Result<()> {
    let converter = MarkdownConverter::new();
    convert_directory(input_dir, &converter)?;
    Ok(())
}

/// 转换整个目录；输入不是目录时返回 `None`，不做任何遍历与写入
pub fn convert_directory(
    input_dir: &Path,
    converter: &dyn FileConverter,
) -> Result<Option<BatchResult>> {
    if !input_dir.is_dir() {
        output::print_error("The input is not a valid folder path, exiting");
        return Ok(None);
    }

    output::print_info(&format!("Converting folder: {}", input_dir.display()));

    let filter = ExtensionFilter::new(SUPPORTED_EXTENSIONS);
    let files = FileCollector::new(input_dir.to_path_buf()).collect();
    let supported = files
        .iter()
        .filter(|f| filter.is_supported(&f.extension))
        .count();

    output::print_info(&format!(
        "Found {} file(s), {} with a supported type",
        files.len(),
        supported
    ));

    let result = BatchRunner::new(&filter, converter).run(&files);

    output::print_done("Conversion complete!");

    Ok(Some(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_rejects_non_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("report.csv");
        fs::write(&file, b"a,b\n1,2\n").unwrap();

        let converter = MarkdownConverter::new();
        assert!(convert_directory(&file, &converter).unwrap().is_none());
        assert!(convert_directory(&dir.path().join("missing"), &converter)
            .unwrap()
            .is_none());
        assert!(convert_directory(Path::new(""), &converter).unwrap().is_none());
        assert!(!dir.path().join("report.md").exists());
    }

    #[test]
    fn test_converts_tree_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("people.CSV"), b"name,age\nAda,36\n").unwrap();
        fs::write(dir.path().join("nested/page.htm"), b"<h2>Title</h2><p>Body</p>").unwrap();
        fs::write(dir.path().join("nested/empty.html"), b"<html><body> </body></html>").unwrap();
        fs::write(dir.path().join("nested/bad.json"), b"{oops").unwrap();
        fs::write(dir.path().join("notes.txt"), b"plain").unwrap();

        let result = convert_directory(dir.path(), &MarkdownConverter::new())
            .unwrap()
            .unwrap();

        assert_eq!(result.processed, 5);
        assert_eq!(result.converted, 2);
        assert_eq!(result.empty, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.unsupported, 1);

        let people = fs::read_to_string(dir.path().join("people.md")).unwrap();
        assert!(people.contains("Ada"));
        assert_eq!(
            fs::read_to_string(dir.path().join("nested/page.md")).unwrap(),
            "## Title\n\nBody"
        );
        assert!(!dir.path().join("nested/empty.md").exists());
        assert!(!dir.path().join("nested/bad.md").exists());
    }
}
