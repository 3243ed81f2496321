//! # HTML 转换器
//!
//! 基于 `scraper`（html5ever）解析 DOM，渲染为 Markdown。
//!
//! ## 功能
//! - 标题、段落、引用、分隔线
//! - 粗体、斜体、行内代码、链接、图片
//! - 有序/无序列表（支持嵌套）
//! - 表格与预格式化代码块
//! - 丢弃 `script` / `style` / `head` 等非正文内容
//! - 按 BOM / `<meta charset>` 识别编码
//!
//! ## 依赖关系
//! - 使用 `converters/markdown.rs` 渲染表格与规整空白
//! - 使用 `encoding_rs` 解码非 UTF-8 页面

use super::markdown::{self, collapse_blank_lines, normalize_inline};
use super::{DocumentConverterResult, FormatConverter, MarkdownConverter};
use crate::error::Result;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use regex::bytes::Regex;
use scraper::{ElementRef, Html, Node};
use std::sync::LazyLock;

/// 超过该嵌套深度的元素只保留纯文本
const MAX_RENDER_DEPTH: usize = 128;

/// 编码声明只在文档开头查找
const CHARSET_SNIFF_BYTES: usize = 1024;

static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#).expect("valid regex")
});

pub struct HtmlConverter;

impl FormatConverter for HtmlConverter {
    fn name(&self) -> &'static str {
        "html"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["html", "htm"]
    }

    fn convert(&self, data: &[u8], _: &MarkdownConverter) -> Result<DocumentConverterResult> {
        let html = decode_html(data);
        Ok(DocumentConverterResult::new(html_to_markdown(&html)))
    }
}

/// 按 BOM、`<meta charset>` 的顺序确定编码并解码；都没有时按 UTF-8，失败再按 Windows-1252
pub fn decode_html(data: &[u8]) -> String {
    let encoding = Encoding::for_bom(data)
        .map(|(encoding, _)| encoding)
        .or_else(|| declared_charset(data))
        .unwrap_or_else(|| {
            if std::str::from_utf8(data).is_ok() {
                UTF_8
            } else {
                WINDOWS_1252
            }
        });
    let (text, _, _) = encoding.decode(data);
    text.into_owned()
}

fn declared_charset(data: &[u8]) -> Option<&'static Encoding> {
    let head = &data[..data.len().min(CHARSET_SNIFF_BYTES)];
    let label = META_CHARSET.captures(head)?.get(1)?;
    // 声明为 UTF-16 的页面按 UTF-8 处理
    Encoding::for_label(label.as_bytes()).map(Encoding::output_encoding)
}

/// 将 HTML 文档转换为 Markdown
pub fn html_to_markdown(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let body = root
        .children()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "body")
        .unwrap_or(root);

    let mut renderer = HtmlRenderer::default();
    renderer.render_children(body);
    collapse_blank_lines(&renderer.out)
}

#[derive(Default)]
struct HtmlRenderer {
    out: String,
    /// 列表栈：`None` 为无序列表，`Some(n)` 为有序列表的下一个序号
    lists: Vec<Option<usize>>,
    depth: usize,
}

impl HtmlRenderer {
    fn render_children(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.push_text(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.render_nested(child);
                    }
                }
                _ => {}
            }
        }
    }

    fn render_nested(&mut self, element: ElementRef<'_>) {
        if self.depth >= MAX_RENDER_DEPTH {
            let text: String = element.text().collect();
            self.push_text(&text);
            return;
        }
        self.depth += 1;
        self.render_element(element);
        self.depth -= 1;
    }

    fn render_element(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        match name {
            "script" | "style" | "noscript" | "head" | "template" | "title" | "meta" | "link" => {}
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse::<usize>().unwrap_or(1);
                let text = self.capture_inline(element);
                if !text.is_empty() {
                    self.block(&format!("{} {}", "#".repeat(level), text));
                }
            }
            "p" | "div" | "section" | "article" | "header" | "footer" | "main" | "nav"
            | "aside" | "figure" | "figcaption" | "address" | "dl" | "dt" | "dd" => {
                self.block_break();
                self.render_children(element);
                self.block_break();
            }
            "blockquote" => {
                let inner = collapse_blank_lines(&self.capture(element));
                let quoted: Vec<String> = inner
                    .lines()
                    .map(|line| format!("> {}", line).trim_end().to_string())
                    .collect();
                self.block(&quoted.join("\n"));
            }
            "br" => self.out.push('\n'),
            "hr" => self.block("---"),
            "strong" | "b" => self.wrap_inline(element, "**"),
            "em" | "i" => self.wrap_inline(element, "*"),
            "code" | "kbd" | "samp" => self.wrap_inline(element, "`"),
            "pre" => {
                let code: String = element.text().collect();
                self.block(&format!("```\n{}\n```", code.trim_end()));
            }
            "a" => {
                let text = self.capture_inline(element);
                match element.value().attr("href") {
                    Some(href) if !href.is_empty() && !href.starts_with("javascript:") => {
                        self.push_raw(&format!("[{}]({})", text, href));
                    }
                    _ => self.push_raw(&text),
                }
            }
            "img" => {
                let alt = element.value().attr("alt").unwrap_or("");
                match element.value().attr("src") {
                    Some(src) if !src.starts_with("data:") => {
                        self.push_raw(&format!("![{}]({})", alt, src));
                    }
                    _ => self.push_raw(alt),
                }
            }
            "ul" | "ol" => {
                self.block_break();
                self.lists.push((name == "ol").then_some(1));
                self.render_children(element);
                self.lists.pop();
                self.block_break();
            }
            "li" => self.list_item(element),
            "table" => {
                let mut rows = Vec::new();
                self.collect_rows(element, &mut rows);
                self.block(&markdown::table(&rows));
            }
            _ => self.render_children(element),
        }
    }

    fn list_item(&mut self, element: ElementRef<'_>) {
        let depth = self.lists.len().max(1);
        let marker = match self.lists.last_mut() {
            Some(Some(next)) => {
                let marker = format!("{}.", next);
                *next += 1;
                marker
            }
            _ => "-".to_string(),
        };

        let content = self.capture(element);
        let mut lines = content
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty());

        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        let first = lines.next().map(str::trim).unwrap_or("");
        self.out
            .push_str(&format!("{}{} {}", "  ".repeat(depth - 1), marker, first));
        for line in lines {
            self.out.push('\n');
            self.out.push_str(line);
        }
        self.out.push('\n');
    }

    fn collect_rows(&mut self, element: ElementRef<'_>, rows: &mut Vec<Vec<String>>) {
        for child in element.children().filter_map(ElementRef::wrap) {
            match child.value().name() {
                "tr" => {
                    let cells = child
                        .children()
                        .filter_map(ElementRef::wrap)
                        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                        .map(|cell| self.capture_inline(cell))
                        .collect();
                    rows.push(cells);
                }
                "thead" | "tbody" | "tfoot" => self.collect_rows(child, rows),
                _ => {}
            }
        }
    }

    fn wrap_inline(&mut self, element: ElementRef<'_>, marker: &str) {
        let text = self.capture_inline(element);
        if !text.is_empty() {
            self.push_raw(&format!("{marker}{text}{marker}"));
        }
    }

    /// 将子节点渲染到独立缓冲区
    fn capture(&mut self, element: ElementRef<'_>) -> String {
        let saved = std::mem::take(&mut self.out);
        self.render_children(element);
        std::mem::replace(&mut self.out, saved)
    }

    fn capture_inline(&mut self, element: ElementRef<'_>) -> String {
        normalize_inline(&self.capture(element)).trim().to_string()
    }

    fn push_text(&mut self, raw: &str) {
        let text = normalize_inline(raw);
        let text = if self.out.is_empty() || self.out.ends_with(char::is_whitespace) {
            text.trim_start()
        } else {
            text.as_str()
        };
        self.out.push_str(text);
    }

    fn push_raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn block(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.block_break();
        self.out.push_str(text);
        self.block_break();
    }

    fn block_break(&mut self) {
        if self.out.is_empty() {
            return;
        }
        while !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Ignored</title><style>p { color: red }</style></head>
<body>
  <h1>Hello   World</h1>
  <p>Some <strong>bold</strong> and <em>soft</em> text with a <a href="https://example.com">link</a>.</p>
  <ul><li>one</li><li>two<ul><li>nested</li></ul></li></ul>
  <ol><li>first</li><li>second</li></ol>
  <table><tr><th>k</th><th>v</th></tr><tr><td>a</td><td>1</td></tr></table>
  <pre><code>let x = 1;
let y = 2;</code></pre>
  <blockquote><p>quoted</p></blockquote>
  <script>alert("nope")</script>
</body></html>"#;

    #[test]
    fn test_html_to_markdown() {
        let md = html_to_markdown(PAGE);

        assert!(md.starts_with("# Hello World\n\n"));
        assert!(md.contains(
            "Some **bold** and *soft* text with a [link](https://example.com)."
        ));
        assert!(md.contains("- one\n- two\n  - nested"));
        assert!(md.contains("1. first\n2. second"));
        assert!(md.contains("| k | v |"));
        assert!(md.contains("| a | 1 |"));
        assert!(md.contains("```\nlet x = 1;\nlet y = 2;\n```"));
        assert!(md.contains("> quoted"));
        assert!(!md.contains("Ignored"));
        assert!(!md.contains("alert"));
        assert!(!md.contains("color"));
    }

    #[test]
    fn test_whitespace_only_page() {
        assert!(html_to_markdown("<html><body>  \n <div> </div></body></html>").is_empty());
    }

    #[test]
    fn test_deeply_nested_markup() {
        let html = format!("{}deep text{}", "<div>".repeat(20_000), "</div>".repeat(20_000));
        assert_eq!(html_to_markdown(&html), "deep text");
    }

    #[test]
    fn test_decode_declared_and_fallback_charsets() {
        let (gbk, _, _) = encoding_rs::GBK.encode("中文标题");
        let mut page = br#"<meta http-equiv="Content-Type" content="text/html; charset=GBK">"#.to_vec();
        page.extend_from_slice(b"<h1>");
        page.extend_from_slice(&gbk);
        page.extend_from_slice(b"</h1>");
        let md = HtmlConverter
            .convert(&page, &MarkdownConverter::empty())
            .unwrap()
            .text_content;
        assert_eq!(md, "# 中文标题");

        assert_eq!(decode_html(b"<p>caf\xe9</p>"), "<p>caf\u{e9}</p>");
        assert_eq!(decode_html("<p>café</p>".as_bytes()), "<p>café</p>");
        assert_eq!(decode_html(b"\xef\xbb\xbf<p>x</p>"), "<p>x</p>");
        assert_eq!(
            decode_html(b"<meta charset='utf-16'><p>x</p>"),
            "<meta charset='utf-16'><p>x</p>"
        );
    }

    #[test]
    fn test_fragment_and_images() {
        let md = html_to_markdown(r#"<img src="a.png" alt="chart"><img src="data:image/png;base64,AAAA" alt="inline">"#);
        assert_eq!(md, "![chart](a.png)inline");
    }
}
