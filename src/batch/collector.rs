//! # 文件收集器
//!
//! 遍历输入目录，收集待处理文件列表及其扩展名。
//!
//! ## 功能
//! - 递归目录搜索（不跟随符号链接）
//! - 同一目录内按文件名排序，保证遍历顺序稳定
//! - 扩展名统一转为小写
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `walkdir` 遍历目录

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 遍历得到的单个文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// 文件路径
    pub path: PathBuf,
    /// 小写扩展名（不含点，无扩展名时为空）
    pub extension: String,
}

impl FileEntry {
    pub fn new(path: PathBuf) -> Self {
        let extension = extension_of(&path);
        Self { path, extension }
    }
}

/// 提取小写扩展名
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// 文件收集器
pub struct FileCollector {
    /// 输入目录
    root: PathBuf,
}

impl FileCollector {
    /// 创建新的文件收集器
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// 递归收集目录下的所有文件；目录不可读时返回空列表
    pub fn collect(&self) -> Vec<FileEntry> {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| FileEntry::new(e.into_path()))
            .collect()
    }
}
