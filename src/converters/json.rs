//! # JSON 转换器
//!
//! 校验 JSON 并以格式化后的代码块输出。

use super::{DocumentConverterResult, FormatConverter, MarkdownConverter};
use crate::error::Result;

use serde_json::Value;

pub struct JsonConverter;

impl FormatConverter for JsonConverter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn convert(&self, data: &[u8], _: &MarkdownConverter) -> Result<DocumentConverterResult> {
        let value: Value = serde_json::from_slice(data)?;
        let pretty = serde_json::to_string_pretty(&value)?;
        Ok(DocumentConverterResult::new(format!("```json\n{}\n```", pretty)))
    }
}
