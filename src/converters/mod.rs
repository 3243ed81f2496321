//! # 文档转换模块
//!
//! 将各类文档转换为 Markdown 文本。
//!
//! ## 结构
//! - `FileConverter`: 批处理使用的按路径转换接口
//! - `FormatConverter`: 单一格式族的转换器，输入为文件字节
//! - `MarkdownConverter`: 按扩展名分派到已注册的格式转换器
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 与 `commands/convert.rs` 使用
//! - 子模块: csv, docx, html, image, json, markdown, ooxml, outlook, pdf, pptx,
//!   spreadsheet, xml, zip

pub mod csv;
pub mod docx;
pub mod html;
pub mod image;
pub mod json;
pub mod markdown;
pub mod ooxml;
pub mod outlook;
pub mod pdf;
pub mod pptx;
pub mod spreadsheet;
pub mod xml;
pub mod zip;

use crate::batch::collector::extension_of;
use crate::error::{MdBatchError, Result};

use std::fs;
use std::path::Path;

/// 单个文件的转换结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentConverterResult {
    /// 提取出的 Markdown 文本
    pub text_content: String,
}

impl DocumentConverterResult {
    pub fn new(text_content: impl Into<String>) -> Self {
        Self {
            text_content: text_content.into(),
        }
    }
}

/// 按路径转换文件
pub trait FileConverter {
    fn convert(&self, path: &Path) -> Result<DocumentConverterResult>;
}

/// 单一格式族的转换器
pub trait FormatConverter {
    /// 转换器名称（用于诊断）
    fn name(&self) -> &'static str;

    /// 处理的扩展名（小写，不含点）
    fn extensions(&self) -> &'static [&'static str];

    /// 转换文件内容，`engine` 用于归档内嵌文件的递归转换
    fn convert(&self, data: &[u8], engine: &MarkdownConverter) -> Result<DocumentConverterResult>;
}

/// 按扩展名分派的 Markdown 转换器
pub struct MarkdownConverter {
    converters: Vec<Box<dyn FormatConverter>>,
}

impl MarkdownConverter {
    /// 创建空转换器
    pub fn empty() -> Self {
        Self {
            converters: Vec::new(),
        }
    }

    /// 创建包含全部内置格式的转换器
    pub fn new() -> Self {
        let mut engine = Self::empty();
        engine.register(Box::new(docx::DocxConverter));
        engine.register(Box::new(pptx::PptxConverter));
        engine.register(Box::new(spreadsheet::SpreadsheetConverter));
        engine.register(Box::new(pdf::PdfConverter));
        engine.register(Box::new(html::HtmlConverter));
        engine.register(Box::new(outlook::OutlookMsgConverter));
        engine.register(Box::new(image::ImageConverter));
        engine.register(Box::new(json::JsonConverter));
        engine.register(Box::new(xml::XmlConverter));
        engine.register(Box::new(csv::CsvConverter));
        engine.register(Box::new(zip::ZipConverter));
        engine
    }

    /// 注册格式转换器，后注册者优先
    pub fn register(&mut self, converter: Box<dyn FormatConverter>) {
        self.converters.insert(0, converter);
    }

    /// 查找处理给定扩展名的转换器
    pub fn find(&self, extension: &str) -> Option<&dyn FormatConverter> {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        self.converters
            .iter()
            .find(|c| c.extensions().contains(&extension.as_str()))
            .map(|c| c.as_ref())
    }

    /// 按扩展名转换内存中的文件内容
    pub fn convert_bytes(&self, data: &[u8], extension: &str) -> Result<DocumentConverterResult> {
        let converter = self
            .find(extension)
            .ok_or_else(|| MdBatchError::UnsupportedFormat(format!(".{}", extension)))?;
        converter.convert(data, self)
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl FileConverter for MarkdownConverter {
    fn convert(&self, path: &Path) -> Result<DocumentConverterResult> {
        let data = fs::read(path).map_err(|e| MdBatchError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        self.convert_bytes(&data, &extension_of(path))
    }
}
