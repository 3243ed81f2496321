//! # XML 转换器
//!
//! RSS 2.0 / Atom 订阅源渲染为条目列表，其余 XML 校验后原样放入代码块。
//!
//! ## 依赖关系
//! - 使用 `quick-xml` 流式解析
//! - 使用 `converters/html.rs` 渲染条目中的 HTML 摘要

use super::html::html_to_markdown;
use super::{DocumentConverterResult, FormatConverter, MarkdownConverter};
use crate::error::{MdBatchError, Result};

use quick_xml::events::Event;
use quick_xml::Reader;

pub struct XmlConverter;

impl FormatConverter for XmlConverter {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["xml"]
    }

    fn convert(&self, data: &[u8], _: &MarkdownConverter) -> Result<DocumentConverterResult> {
        let text = std::str::from_utf8(data).map_err(|e| MdBatchError::parse("xml", e))?;
        let text = text.trim_start_matches('\u{feff}');

        let markdown = match Feed::parse(text)? {
            Some(feed) => feed.to_markdown(),
            None => format!("```xml\n{}\n```", text.trim()),
        };
        Ok(DocumentConverterResult::new(markdown))
    }
}

/// 订阅源中的一个条目
#[derive(Debug, Default)]
struct FeedItem {
    title: String,
    published: String,
    summary: String,
}

/// 解析后的订阅源
#[derive(Debug, Default)]
struct Feed {
    title: String,
    description: String,
    items: Vec<FeedItem>,
}

impl Feed {
    /// 解析整个文档；根元素不是 `rss` / `feed` 时返回 `None`，格式错误时报错
    fn parse(xml: &str) -> Result<Option<Feed>> {
        let mut reader = Reader::from_str(xml);
        let mut feed = Feed::default();
        let mut is_feed: Option<bool> = None;
        let mut path: Vec<String> = Vec::new();
        let mut item: Option<FeedItem> = None;
        let mut depth: usize = 0;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    if is_feed.is_none() {
                        is_feed = Some(name == "rss" || name == "feed");
                    }
                    if matches!(name.as_str(), "item" | "entry") {
                        item = Some(FeedItem::default());
                    }
                    path.push(name);
                    depth += 1;
                }
                Event::Empty(e) => {
                    if is_feed.is_none() {
                        let name = e.local_name();
                        is_feed = Some(name.as_ref() == b"rss" || name.as_ref() == b"feed");
                    }
                }
                Event::End(_) => {
                    if let Some(name) = path.pop() {
                        if matches!(name.as_str(), "item" | "entry") {
                            if let Some(done) = item.take() {
                                feed.items.push(done);
                            }
                        }
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Text(t) if is_feed == Some(true) => {
                    let text = t.unescape()?;
                    feed.assign(&path, item.as_mut(), &text);
                }
                Event::CData(t) if is_feed == Some(true) => {
                    let text = String::from_utf8_lossy(&t.into_inner()).to_string();
                    feed.assign(&path, item.as_mut(), &text);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if depth != 0 || is_feed.is_none() {
            return Err(MdBatchError::parse("xml", "unexpected end of document"));
        }

        Ok(if is_feed == Some(true) { Some(feed) } else { None })
    }

    fn assign(&mut self, path: &[String], item: Option<&mut FeedItem>, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let Some(field) = path.last().map(String::as_str) else {
            return;
        };

        match item {
            Some(item) => match field {
                "title" => item.title.push_str(text),
                "pubDate" | "published" | "updated" if item.published.is_empty() => {
                    item.published.push_str(text)
                }
                "description" | "summary" | "content" => item.summary.push_str(text),
                _ => {}
            },
            None => {
                let parent = path.len().checked_sub(2).map(|i| path[i].as_str());
                if !matches!(parent, Some("channel") | Some("feed")) {
                    return;
                }
                match field {
                    "title" => self.title.push_str(text),
                    "description" | "subtitle" => self.description.push_str(text),
                    _ => {}
                }
            }
        }
    }

    fn to_markdown(&self) -> String {
        let mut md = String::new();
        if !self.title.is_empty() {
            md.push_str(&format!("# {}\n\n", self.title));
        }
        if !self.description.is_empty() {
            md.push_str(&format!("{}\n\n", self.description));
        }
        for item in &self.items {
            if !item.title.is_empty() {
                md.push_str(&format!("## {}\n", item.title));
            }
            if !item.published.is_empty() {
                md.push_str(&format!("Published on: {}\n", item.published));
            }
            if !item.summary.is_empty() {
                md.push_str(&html_to_markdown(&item.summary));
                md.push('\n');
            }
            md.push('\n');
        }
        md.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(xml: &str) -> Result<String> {
        XmlConverter
            .convert(xml.as_bytes(), &MarkdownConverter::empty())
            .map(|r| r.text_content)
    }

    #[test]
    fn test_rss_feed() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <title>Release notes</title>
  <description>What changed</description>
  <item>
    <title>v1.1</title>
    <pubDate>Mon, 05 Oct 2026 10:00:00 GMT</pubDate>
    <description><![CDATA[<p>Faster <b>imports</b></p>]]></description>
  </item>
  <item><title>v1.0</title></item>
</channel></rss>"#;
        let md = convert(rss).unwrap();
        assert_eq!(
            md,
            "# Release notes\n\nWhat changed\n\n## v1.1\nPublished on: Mon, 05 Oct 2026 10:00:00 GMT\nFaster **imports**\n\n## v1.0"
        );
    }

    #[test]
    fn test_atom_feed() {
        let atom = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Blog</title>
  <entry><title>Hello</title><updated>2026-01-01T00:00:00Z</updated><summary>First post</summary></entry>
</feed>"#;
        let md = convert(atom).unwrap();
        assert!(md.starts_with("# Blog\n\n## Hello\nPublished on: 2026-01-01T00:00:00Z"));
        assert!(md.ends_with("First post"));
    }

    #[test]
    fn test_plain_xml_is_fenced() {
        let md = convert("<config><key>value</key></config>\n").unwrap();
        assert_eq!(md, "```xml\n<config><key>value</key></config>\n```");
    }

    #[test]
    fn test_malformed_xml() {
        assert!(convert("<config><key>value</config>").is_err());
        assert!(convert("<config>").is_err());
        assert!(convert("").is_err());
    }
}
