//! # 批量执行器
//!
//! 顺序执行批量转换任务。
//!
//! ## 功能
//! - 逐个文件转换，单个文件的错误（包括 panic）不会中断整批
//! - 空文本视为软失败，只给出警告
//! - 进度条在每个文件的所有退出路径上都前进一格
//! - 批处理期间屏蔽默认 panic 输出，panic 信息并入失败消息
//! - 结果统计
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `converters::FileConverter` 完成实际转换
//! - 使用 `utils/progress.rs` 创建进度条

use crate::batch::collector::FileEntry;
use crate::batch::filter::ExtensionFilter;
use crate::converters::FileConverter;
use crate::error::{MdBatchError, Result};
use crate::utils::{output, progress};

use indicatif::ProgressBar;
use std::cell::Cell;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Once;

/// 单个文件处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResult {
    /// 转换成功并已写出
    Converted { source: PathBuf, output: PathBuf },
    /// 未提取到文字内容
    Empty(PathBuf),
    /// 转换失败
    Failed(PathBuf, String), // (文件路径, 错误信息)
    /// 不支持的文件类型
    Unsupported(PathBuf),
}

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    /// 成功数量
    pub converted: usize,
    /// 空内容数量
    pub empty: usize,
    /// 失败数量
    pub failed: usize,
    /// 不支持数量
    pub unsupported: usize,
    /// 进度计数器最终值
    pub processed: u64,
    /// 失败详情
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchResult {
    /// 合并处理结果
    pub fn merge(&mut self, result: ProcessResult) {
        match result {
            ProcessResult::Converted { .. } => self.converted += 1,
            ProcessResult::Empty(_) => self.empty += 1,
            ProcessResult::Unsupported(_) => self.unsupported += 1,
            ProcessResult::Failed(path, err) => {
                self.failed += 1;
                self.failures.push((path, err));
            }
        }
    }
}

/// 离开作用域时推进进度条
struct TickGuard<'a>(&'a ProgressBar);

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.0.inc(1);
    }
}

thread_local! {
    static SILENCE_PANICS: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// 在当前线程上屏蔽默认 panic 输出，离开作用域时恢复
struct QuietPanics;

impl QuietPanics {
    fn install() -> Self {
        QUIET_HOOK.call_once(|| {
            let default_hook = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                if !SILENCE_PANICS.with(Cell::get) {
                    default_hook(info);
                }
            }));
        });
        SILENCE_PANICS.with(|silence| silence.set(true));
        QuietPanics
    }
}

impl Drop for QuietPanics {
    fn drop(&mut self) {
        SILENCE_PANICS.with(|silence| silence.set(false));
    }
}

fn unsupported_message(path: &Path) -> String {
    format!("Unsupported file type: {}", path.display())
}

fn empty_message(path: &Path) -> String {
    format!("No text content could be extracted from {}", path.display())
}

fn failure_message(path: &Path, reason: &str) -> String {
    format!("Conversion failed {}: {}", path.display(), reason)
}

/// 批量执行器
pub struct BatchRunner<'a> {
    filter: &'a ExtensionFilter,
    converter: &'a dyn FileConverter,
}

impl<'a> BatchRunner<'a> {
    /// 创建新的批量执行器
    pub fn new(filter: &'a ExtensionFilter, converter: &'a dyn FileConverter) -> Self {
        Self { filter, converter }
    }

    /// 顺序处理文件列表
    pub fn run(&self, files: &[FileEntry]) -> BatchResult {
        let pb = progress::create_progress_bar(files.len() as u64, "Converting");
        let _quiet = QuietPanics::install();

        let mut batch_result = BatchResult::default();
        for entry in files {
            let result = self.process(entry, &pb);
            batch_result.merge(result);
        }

        batch_result.processed = pb.position();
        pb.finish_with_message("Done");

        batch_result
    }

    /// 处理单个文件
    fn process(&self, entry: &FileEntry, pb: &ProgressBar) -> ProcessResult {
        let _tick = TickGuard(pb);
        let path = &entry.path;

        if !self.filter.is_supported(&entry.extension) {
            pb.suspend(|| output::print_skip(&unsupported_message(path)));
            return ProcessResult::Unsupported(path.clone());
        }

        pb.suspend(|| output::print_info(&format!("Converting: {}", path.display())));

        match self.convert_file(path) {
            Ok(Some(output_path)) => {
                pb.suspend(|| {
                    output::print_conversion(
                        &path.display().to_string(),
                        &output_path.display().to_string(),
                    );
                });
                ProcessResult::Converted {
                    source: path.clone(),
                    output: output_path,
                }
            }
            Ok(None) => {
                pb.suspend(|| output::print_warning(&empty_message(path)));
                ProcessResult::Empty(path.clone())
            }
            Err(e) => {
                let message = failure_message(path, &e.to_string());
                pb.suspend(|| output::print_error(&message));
                ProcessResult::Failed(path.clone(), message)
            }
        }
    }

    /// 转换并写出 Markdown；未提取到文字时返回 `None`
    fn convert_file(&self, path: &Path) -> Result<Option<PathBuf>> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.converter.convert(path)))
            .map_err(|payload| MdBatchError::Panicked(panic_message(payload.as_ref())))??;

        if result.text_content.trim().is_empty() {
            return Ok(None);
        }

        let output_path = path.with_extension("md");
        fs::write(&output_path, result.text_content.as_bytes()).map_err(|e| {
            MdBatchError::FileWriteError {
                path: output_path.display().to_string(),
                source: e,
            }
        })?;

        Ok(Some(output_path))
    }
}

/// 提取 panic 携带的消息
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
