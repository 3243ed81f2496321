//! # DOCX 转换器
//!
//! 解析 `word/document.xml`，输出段落、标题、列表与表格。
//!
//! ## 功能
//! - `Heading1..6` / `Title` 段落样式 -> `#` 标题
//! - 带编号属性的段落 -> `- ` 列表项
//! - 粗体文本 -> `**text**`
//! - 顶层表格 -> Markdown 表格（嵌套表格按文本并入外层单元格）
//!
//! ## 依赖关系
//! - 使用 `converters/ooxml.rs` 读取包内部件
//! - 使用 `quick-xml` 流式解析

use super::markdown;
use super::ooxml::{attribute, Package};
use super::{DocumentConverterResult, FormatConverter, MarkdownConverter};
use crate::error::{MdBatchError, Result};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

pub struct DocxConverter;

impl FormatConverter for DocxConverter {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["docx"]
    }

    fn convert(&self, data: &[u8], _: &MarkdownConverter) -> Result<DocumentConverterResult> {
        let mut package = Package::open(data)?;
        let xml = package
            .read_part("word/document.xml")?
            .ok_or_else(|| MdBatchError::parse("docx", "missing word/document.xml"))?;
        Ok(DocumentConverterResult::new(document_to_markdown(&xml)?))
    }
}

/// 将 `document.xml` 转换为 Markdown
pub fn document_to_markdown(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = DocxWriter::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => writer.start(&e)?,
            Event::Empty(e) => writer.empty(&e)?,
            Event::End(e) => writer.end(e.name().as_ref()),
            Event::Text(t) if writer.in_text => writer.run.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(writer.finish())
}

#[derive(Default)]
struct DocxWriter {
    blocks: Vec<String>,
    last_was_list: bool,

    para: String,
    heading: Option<usize>,
    list_item: bool,

    in_run: bool,
    in_run_props: bool,
    in_text: bool,
    run: String,
    run_bold: bool,

    table_depth: usize,
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: Vec<String>,
}

impl DocxWriter {
    fn start(&mut self, e: &BytesStart<'_>) -> Result<()> {
        match e.name().as_ref() {
            b"w:p" => {
                self.para.clear();
                self.heading = None;
                self.list_item = false;
            }
            b"w:r" => {
                self.in_run = true;
                self.run.clear();
                self.run_bold = false;
            }
            b"w:rPr" => self.in_run_props = true,
            b"w:t" => self.in_text = true,
            b"w:tbl" => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.rows.clear();
                }
            }
            b"w:tr" if self.table_depth == 1 => self.row.clear(),
            b"w:tc" if self.table_depth == 1 => self.cell.clear(),
            _ => self.property(e)?,
        }
        Ok(())
    }

    fn empty(&mut self, e: &BytesStart<'_>) -> Result<()> {
        match e.name().as_ref() {
            b"w:tab" if self.in_run => self.run.push('\t'),
            b"w:br" | b"w:cr" if self.in_run => self.run.push('\n'),
            _ => self.property(e)?,
        }
        Ok(())
    }

    /// 段落与文本运行的属性元素
    fn property(&mut self, e: &BytesStart<'_>) -> Result<()> {
        match e.name().as_ref() {
            b"w:pStyle" => {
                self.heading = attribute(e, b"val")?.as_deref().and_then(heading_level);
            }
            b"w:numPr" => self.list_item = true,
            b"w:b" if self.in_run_props => {
                self.run_bold = !matches!(
                    attribute(e, b"val")?.as_deref(),
                    Some("0") | Some("false") | Some("off")
                );
            }
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"w:t" => self.in_text = false,
            b"w:rPr" => self.in_run_props = false,
            b"w:r" => {
                self.in_run = false;
                self.flush_run();
            }
            b"w:p" => self.flush_paragraph(),
            b"w:tc" if self.table_depth == 1 => {
                let cell = std::mem::take(&mut self.cell);
                self.row.push(cell.join(" "));
            }
            b"w:tr" if self.table_depth == 1 => {
                let row = std::mem::take(&mut self.row);
                self.rows.push(row);
            }
            b"w:tbl" => {
                if self.table_depth == 1 {
                    let rows = std::mem::take(&mut self.rows);
                    self.push_block(markdown::table(&rows), false);
                }
                self.table_depth = self.table_depth.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn flush_run(&mut self) {
        let run = std::mem::take(&mut self.run);
        let trimmed = run.trim();
        if self.run_bold && !trimmed.is_empty() {
            if run.starts_with(char::is_whitespace) {
                self.para.push(' ');
            }
            self.para.push_str("**");
            self.para.push_str(trimmed);
            self.para.push_str("**");
            if run.ends_with(char::is_whitespace) {
                self.para.push(' ');
            }
        } else {
            self.para.push_str(&run);
        }
    }

    fn flush_paragraph(&mut self) {
        let para = std::mem::take(&mut self.para);
        let text = para.trim();
        if text.is_empty() {
            return;
        }

        if self.table_depth > 0 {
            self.cell.push(text.to_string());
            return;
        }

        match (self.heading, self.list_item) {
            (Some(level), _) => {
                let heading = format!("{} {}", "#".repeat(level), text.replace('\n', " "));
                self.push_block(heading, false);
            }
            (None, true) => self.push_block(format!("- {}", text), true),
            (None, false) => self.push_block(text.to_string(), false),
        }
    }

    fn push_block(&mut self, block: String, is_list: bool) {
        if block.is_empty() {
            return;
        }
        match self.blocks.last_mut() {
            Some(last) if is_list && self.last_was_list => {
                last.push('\n');
                last.push_str(&block);
            }
            _ => self.blocks.push(block),
        }
        self.last_was_list = is_list;
    }

    fn finish(self) -> String {
        self.blocks.join("\n\n")
    }
}

/// 由段落样式名推断标题级别
fn heading_level(style: &str) -> Option<usize> {
    let style = style.to_ascii_lowercase().replace(' ', "");
    if style == "title" {
        return Some(1);
    }
    let level: usize = style.strip_prefix("heading")?.parse().ok()?;
    (1..=6).contains(&level).then_some(level)
}

#[cfg(test)]
mod tests {
    use super::super::ooxml::test_support::build_zip;
    use super::*;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Quarterly Report</w:t></w:r></w:p>
    <w:p>
      <w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>
      <w:r><w:t xml:space="preserve">Revenue grew </w:t></w:r>
      <w:r><w:rPr><w:b/></w:rPr><w:t>12%</w:t></w:r>
      <w:r><w:t xml:space="preserve"> this &amp; last quarter.</w:t></w:r>
    </w:p>
    <w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>First</w:t></w:r></w:p>
    <w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>Second</w:t></w:r></w:p>
    <w:p/>
    <w:tbl>
      <w:tr>
        <w:tc><w:p><w:r><w:t>Region</w:t></w:r></w:p></w:tc>
        <w:tc><w:p><w:r><w:t>Sales</w:t></w:r></w:p></w:tc>
      </w:tr>
      <w:tr>
        <w:tc><w:p><w:r><w:t>North</w:t></w:r></w:p></w:tc>
        <w:tc><w:p><w:r><w:rPr><w:b w:val="0"/></w:rPr><w:t>42</w:t></w:r></w:p></w:tc>
      </w:tr>
    </w:tbl>
    <w:p><w:r><w:t>The end</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn test_document_to_markdown() {
        let md = document_to_markdown(DOCUMENT).unwrap();
        let blocks: Vec<&str> = md.split("\n\n").collect();

        assert_eq!(blocks[0], "# Quarterly Report");
        assert_eq!(blocks[1], "Revenue grew **12%** this & last quarter.");
        assert_eq!(blocks[2], "- First\n- Second");
        assert!(blocks[3].starts_with("| Region"));
        assert!(blocks[3].contains("North"));
        assert!(blocks[3].contains("42"));
        assert!(!blocks[3].contains("**"));
        assert_eq!(blocks[4], "The end");
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("Heading2"), Some(2));
        assert_eq!(heading_level("heading 3"), Some(3));
        assert_eq!(heading_level("Title"), Some(1));
        assert_eq!(heading_level("Heading9"), None);
        assert_eq!(heading_level("Normal"), None);
    }

    #[test]
    fn test_convert_package() {
        let data = build_zip(&[("word/document.xml", DOCUMENT)]);
        let result = DocxConverter
            .convert(&data, &MarkdownConverter::empty())
            .unwrap();
        assert!(result.text_content.starts_with("# Quarterly Report"));

        let no_body = build_zip(&[("word/styles.xml", "<w:styles/>")]);
        assert!(DocxConverter
            .convert(&no_body, &MarkdownConverter::empty())
            .is_err());
    }
}
