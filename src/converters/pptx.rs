//! # PPTX 转换器
//!
//! 按幻灯片编号顺序输出每页的标题、文本框、表格与备注。
//!
//! ## 依赖关系
//! - 使用 `converters/ooxml.rs` 读取部件与关系
//! - 使用 `quick-xml` 流式解析

use super::markdown;
use super::ooxml::{attribute, parse_relationships, resolve_target, Package};
use super::{DocumentConverterResult, FormatConverter, MarkdownConverter};
use crate::error::Result;

use quick_xml::events::Event;
use quick_xml::Reader;

pub struct PptxConverter;

impl FormatConverter for PptxConverter {
    fn name(&self) -> &'static str {
        "pptx"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["pptx"]
    }

    fn convert(&self, data: &[u8], _: &MarkdownConverter) -> Result<DocumentConverterResult> {
        let mut package = Package::open(data)?;
        let mut output = String::new();

        for (number, part) in slide_parts(&package.part_names()) {
            let Some(xml) = package.read_part(&part)? else {
                continue;
            };

            output.push_str(&format!("\n\n<!-- Slide number: {} -->\n", number));
            output.push_str(&slide_to_markdown(&xml)?);

            if let Some(notes_part) = notes_part_for(&mut package, number)? {
                if let Some(notes_xml) = package.read_part(&notes_part)? {
                    let notes = notes_to_text(&notes_xml)?;
                    if !notes.is_empty() {
                        output.push_str("\n\n### Notes:\n");
                        output.push_str(&notes);
                    }
                }
            }
        }

        Ok(DocumentConverterResult::new(output.trim().to_string()))
    }
}

/// 找出所有幻灯片部件，按编号排序
fn slide_parts(names: &[String]) -> Vec<(usize, String)> {
    let mut slides: Vec<(usize, String)> = names
        .iter()
        .filter_map(|name| {
            let number = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse()
                .ok()?;
            Some((number, name.clone()))
        })
        .collect();
    slides.sort();
    slides
}

/// 通过幻灯片关系找到对应的备注页
fn notes_part_for(package: &mut Package<'_>, number: usize) -> Result<Option<String>> {
    let rels_name = format!("ppt/slides/_rels/slide{}.xml.rels", number);
    let Some(rels_xml) = package.read_part(&rels_name)? else {
        return Ok(None);
    };

    Ok(parse_relationships(&rels_xml)?
        .into_iter()
        .find(|rel| rel.rel_type.ends_with("/notesSlide"))
        .map(|rel| resolve_target("ppt/slides", &rel.target)))
}

/// 幻灯片中的一个形状
#[derive(Default)]
struct Shape {
    is_title: bool,
    paragraphs: Vec<String>,
}

/// 将单页幻灯片 XML 转换为 Markdown
fn slide_to_markdown(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut blocks: Vec<String> = Vec::new();

    let mut shape: Option<Shape> = None;
    let mut para = String::new();
    let mut in_text = false;

    let mut in_table = false;
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"p:sp" => shape = Some(Shape::default()),
                b"a:tbl" => {
                    in_table = true;
                    rows.clear();
                }
                b"a:tr" if in_table => row.clear(),
                b"a:tc" if in_table => cell.clear(),
                b"a:p" => para.clear(),
                b"a:t" => in_text = true,
                b"p:ph" => mark_title(&mut shape, &e)?,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"p:ph" => mark_title(&mut shape, &e)?,
                b"a:br" => para.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => para.push_str(&t.unescape()?),
            Event::End(e) => match e.name().as_ref() {
                b"a:t" => in_text = false,
                b"a:p" => {
                    let text = para.trim().to_string();
                    if text.is_empty() {
                        continue;
                    }
                    if in_table {
                        cell.push(text);
                    } else if let Some(shape) = shape.as_mut() {
                        shape.paragraphs.push(text);
                    }
                }
                b"a:tc" if in_table => row.push(std::mem::take(&mut cell).join(" ")),
                b"a:tr" if in_table => rows.push(std::mem::take(&mut row)),
                b"a:tbl" => {
                    in_table = false;
                    let table = markdown::table(&rows);
                    if !table.is_empty() {
                        blocks.push(table);
                    }
                }
                b"p:sp" => {
                    if let Some(shape) = shape.take() {
                        if shape.paragraphs.is_empty() {
                            continue;
                        }
                        if shape.is_title {
                            blocks.push(format!("# {}", shape.paragraphs.join(" ")));
                        } else {
                            blocks.push(shape.paragraphs.join("\n"));
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(blocks.join("\n\n"))
}

fn mark_title(shape: &mut Option<Shape>, e: &quick_xml::events::BytesStart<'_>) -> Result<()> {
    if let Some(shape) = shape.as_mut() {
        shape.is_title = matches!(
            attribute(e, b"type")?.as_deref(),
            Some("title") | Some("ctrTitle")
        );
    }
    Ok(())
}

/// 备注页正文（跳过幻灯片编号等占位符）
fn notes_to_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut para = String::new();
    let mut in_text = false;
    let mut skip_shape = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"p:sp" => skip_shape = false,
                b"a:p" => para.clear(),
                b"a:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) if e.name().as_ref() == b"p:ph" => {
                skip_shape = !matches!(attribute(&e, b"type")?.as_deref(), Some("body"));
            }
            Event::Text(t) if in_text && !skip_shape => para.push_str(&t.unescape()?),
            Event::End(e) => match e.name().as_ref() {
                b"a:t" => in_text = false,
                b"a:p" => {
                    let text = para.trim();
                    if !text.is_empty() {
                        paragraphs.push(text.to_string());
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::super::ooxml::test_support::build_zip;
    use super::*;

    const SLIDE_1: &str = r#"<p:sld xmlns:p="p" xmlns:a="a"><p:cSld><p:spTree>
  <p:sp>
    <p:nvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
    <p:txBody><a:p><a:r><a:t>Roadmap</a:t></a:r></a:p></p:txBody>
  </p:sp>
  <p:sp>
    <p:nvSpPr><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr>
    <p:txBody>
      <a:p><a:r><a:t>Ship v1</a:t></a:r></a:p>
      <a:p><a:r><a:t>Hire &lt;2&gt; engineers</a:t></a:r></a:p>
    </p:txBody>
  </p:sp>
</p:spTree></p:cSld></p:sld>"#;

    const SLIDE_2: &str = r#"<p:sld xmlns:p="p" xmlns:a="a"><p:cSld><p:spTree>
  <p:graphicFrame><a:graphic><a:graphicData><a:tbl>
    <a:tr><a:tc><a:txBody><a:p><a:r><a:t>Q</a:t></a:r></a:p></a:txBody></a:tc><a:tc><a:txBody><a:p><a:r><a:t>Goal</a:t></a:r></a:p></a:txBody></a:tc></a:tr>
    <a:tr><a:tc><a:txBody><a:p><a:r><a:t>Q1</a:t></a:r></a:p></a:txBody></a:tc><a:tc><a:txBody><a:p><a:r><a:t>Beta</a:t></a:r></a:p></a:txBody></a:tc></a:tr>
  </a:tbl></a:graphicData></a:graphic></p:graphicFrame>
</p:spTree></p:cSld></p:sld>"#;

    const SLIDE_2_RELS: &str = r#"<Relationships><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide" Target="../notesSlides/notesSlide7.xml"/></Relationships>"#;

    const NOTES: &str = r#"<p:notes xmlns:p="p" xmlns:a="a"><p:cSld><p:spTree>
  <p:sp><p:nvSpPr><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:txBody><a:p><a:r><a:t>Mention the budget</a:t></a:r></a:p></p:txBody></p:sp>
  <p:sp><p:nvSpPr><p:nvPr><p:ph type="sldNum" idx="5"/></p:nvPr></p:nvSpPr><p:txBody><a:p><a:r><a:t>2</a:t></a:r></a:p></p:txBody></p:sp>
</p:spTree></p:cSld></p:notes>"#;

    #[test]
    fn test_slide_parts_numeric_order() {
        let names = vec![
            "ppt/slides/slide10.xml".to_string(),
            "ppt/slides/slide2.xml".to_string(),
            "ppt/slides/_rels/slide2.xml.rels".to_string(),
            "ppt/slideLayouts/slideLayout1.xml".to_string(),
        ];
        let parts = slide_parts(&names);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].0, 2);
        assert_eq!(parts[1].0, 10);
    }

    #[test]
    fn test_convert_presentation() {
        let data = build_zip(&[
            ("ppt/slides/slide2.xml", SLIDE_2),
            ("ppt/slides/slide1.xml", SLIDE_1),
            ("ppt/slides/_rels/slide2.xml.rels", SLIDE_2_RELS),
            ("ppt/notesSlides/notesSlide7.xml", NOTES),
        ]);
        let md = PptxConverter
            .convert(&data, &MarkdownConverter::empty())
            .unwrap()
            .text_content;

        assert!(md.starts_with("<!-- Slide number: 1 -->\n# Roadmap\n\nShip v1\nHire <2> engineers"));
        let slide_2 = md.find("<!-- Slide number: 2 -->").unwrap();
        assert!(slide_2 > md.find("Roadmap").unwrap());
        assert!(md.contains("| Q "));
        assert!(md.contains("Beta"));
        assert!(md.ends_with("### Notes:\nMention the budget"));
        assert!(!md.contains("\n2\n"));
    }
}
