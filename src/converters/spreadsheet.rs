//! # 电子表格转换器
//!
//! 使用 `calamine` 读取 .xlsx / .xls，每个工作表输出一个 Markdown 表格。
//!
//! ## 依赖关系
//! - 使用 `converters/markdown.rs` 渲染表格

use super::markdown;
use super::{DocumentConverterResult, FormatConverter, MarkdownConverter};
use crate::error::Result;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;

pub struct SpreadsheetConverter;

impl FormatConverter for SpreadsheetConverter {
    fn name(&self) -> &'static str {
        "spreadsheet"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["xlsx", "xls"]
    }

    fn convert(&self, data: &[u8], _: &MarkdownConverter) -> Result<DocumentConverterResult> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(data.to_vec()))?;
        let mut sections = Vec::new();

        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name)?;
            let table = range_to_table(&range);
            if table.is_empty() {
                continue;
            }
            sections.push(format!("## {}\n{}", name, table));
        }

        Ok(DocumentConverterResult::new(sections.join("\n\n")))
    }
}

/// 将单元格区域渲染为表格，首行作为表头
fn range_to_table(range: &Range<Data>) -> String {
    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    if rows.iter().all(|row| row.iter().all(String::is_empty)) {
        return String::new();
    }
    markdown::table(&rows)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_to_table() {
        let mut range: Range<Data> = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("item".to_string()));
        range.set_value((0, 1), Data::String("price".to_string()));
        range.set_value((1, 0), Data::String("tea".to_string()));
        range.set_value((1, 1), Data::Float(2.5));
        range.set_value((2, 0), Data::String("cake".to_string()));

        let table = range_to_table(&range);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("item"));
        assert!(lines[2].contains("2.5"));
        assert!(lines[3].contains("cake"));
    }

    #[test]
    fn test_empty_range() {
        let range: Range<Data> = Range::new((0, 0), (1, 1));
        assert!(range_to_table(&range).is_empty());
    }

    #[test]
    fn test_rejects_garbage() {
        let result = SpreadsheetConverter.convert(b"definitely not a workbook", &MarkdownConverter::empty());
        assert!(result.is_err());
    }
}
