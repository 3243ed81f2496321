//! # PDF 转换器
//!
//! 使用 `pdf-extract` 提取纯文本，并压缩多余空行。
//! 提取期间用 `gag` 屏蔽解析库打印到 stdout/stderr 的诊断信息。

use super::markdown::collapse_blank_lines;
use super::{DocumentConverterResult, FormatConverter, MarkdownConverter};
use crate::error::{MdBatchError, Result};

use gag::Gag;

pub struct PdfConverter;

impl FormatConverter for PdfConverter {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["pdf"]
    }

    fn convert(&self, data: &[u8], _: &MarkdownConverter) -> Result<DocumentConverterResult> {
        let text = extract_text_quiet(data).map_err(|e| MdBatchError::parse("pdf", e))?;
        Ok(DocumentConverterResult::new(collapse_blank_lines(&text)))
    }
}

fn extract_text_quiet(data: &[u8]) -> std::result::Result<String, pdf_extract::OutputError> {
    let _gag_out = Gag::stdout().ok();
    let _gag_err = Gag::stderr().ok();
    pdf_extract::extract_text_from_mem(data)
}
