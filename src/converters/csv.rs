//! # CSV 转换器
//!
//! 首行作为表头，输出 Markdown 表格；行长不一致时补齐。

use super::markdown;
use super::{DocumentConverterResult, FormatConverter, MarkdownConverter};
use crate::error::Result;

use csv::ReaderBuilder;

pub struct CsvConverter;

impl FormatConverter for CsvConverter {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["csv"]
    }

    fn convert(&self, data: &[u8], _: &MarkdownConverter) -> Result<DocumentConverterResult> {
        let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        Ok(DocumentConverterResult::new(markdown::table(&rows)))
    }
}
