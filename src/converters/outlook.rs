//! # Outlook MSG 转换器
//!
//! .msg 是 OLE 复合文档，邮件属性存放在 `__substg1.0_<tag><type>` 流中。
//! 类型 `001F` 为 UTF-16LE 字符串，`001E` 为 8 位字符串。
//!
//! ## 依赖关系
//! - 使用 `cfb` 读取复合文档
//! - 使用 `encoding_rs` 解码字符串属性

use super::{DocumentConverterResult, FormatConverter, MarkdownConverter};
use crate::error::{MdBatchError, Result};

use cfb::CompoundFile;
use encoding_rs::{UTF_16LE, WINDOWS_1252};
use std::io::{Cursor, Read, Seek};

/// PR_SENDER_EMAIL_ADDRESS
const TAG_SENDER: &str = "0C1F";
/// PR_DISPLAY_TO
const TAG_TO: &str = "0E04";
/// PR_SUBJECT
const TAG_SUBJECT: &str = "0037";
/// PR_BODY
const TAG_BODY: &str = "1000";

pub struct OutlookMsgConverter;

impl FormatConverter for OutlookMsgConverter {
    fn name(&self) -> &'static str {
        "msg"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["msg"]
    }

    fn convert(&self, data: &[u8], _: &MarkdownConverter) -> Result<DocumentConverterResult> {
        let mut msg = CompoundFile::open(Cursor::new(data))
            .map_err(|e| MdBatchError::parse("msg", e))?;

        let mut md = String::from("# Email Message\n\n");
        for (label, tag) in [("From", TAG_SENDER), ("To", TAG_TO), ("Subject", TAG_SUBJECT)] {
            if let Some(value) = read_property(&mut msg, tag)? {
                md.push_str(&format!("**{}:** {}\n", label, value.trim()));
            }
        }

        md.push_str("\n## Content\n\n");
        if let Some(body) = read_property(&mut msg, TAG_BODY)? {
            md.push_str(body.trim());
        }

        Ok(DocumentConverterResult::new(md.trim_end().to_string()))
    }
}

/// 读取字符串属性，优先 Unicode 版本
fn read_property<F: Read + Seek>(msg: &mut CompoundFile<F>, tag: &str) -> Result<Option<String>> {
    let unicode = format!("/__substg1.0_{}001F", tag);
    if msg.is_stream(&unicode) {
        let bytes = read_stream(msg, &unicode)?;
        let (text, _) = UTF_16LE.decode_without_bom_handling(&bytes);
        return Ok(Some(text.trim_end_matches('\0').to_string()));
    }

    let ansi = format!("/__substg1.0_{}001E", tag);
    if msg.is_stream(&ansi) {
        let bytes = read_stream(msg, &ansi)?;
        let (text, _) = WINDOWS_1252.decode_without_bom_handling(&bytes);
        return Ok(Some(text.trim_end_matches('\0').to_string()));
    }

    Ok(None)
}

fn read_stream<F: Read + Seek>(msg: &mut CompoundFile<F>, path: &str) -> Result<Vec<u8>> {
    let mut stream = msg.open_stream(path)?;
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn utf16(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    fn build_msg(streams: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut comp = CompoundFile::create(Cursor::new(Vec::new())).unwrap();
        for (path, data) in streams {
            let mut stream = comp.create_stream(path).unwrap();
            stream.write_all(data).unwrap();
            stream.flush().unwrap();
        }
        comp.flush().unwrap();
        comp.into_inner().into_inner()
    }

    #[test]
    fn test_convert_message() {
        let data = build_msg(&[
            ("/__substg1.0_0C1F001F", utf16("alice@example.com")),
            ("/__substg1.0_0E04001F", utf16("Bob")),
            ("/__substg1.0_0037001E", b"Lunch plans".to_vec()),
            ("/__substg1.0_1000001F", utf16("See you at noon.\r\n")),
        ]);

        let md = OutlookMsgConverter
            .convert(&data, &MarkdownConverter::empty())
            .unwrap()
            .text_content;

        assert_eq!(
            md,
            "# Email Message\n\n**From:** alice@example.com\n**To:** Bob\n**Subject:** Lunch plans\n\n## Content\n\nSee you at noon."
        );
    }

    #[test]
    fn test_missing_properties() {
        let data = build_msg(&[("/__substg1.0_1000001F", utf16("Body only"))]);
        let md = OutlookMsgConverter
            .convert(&data, &MarkdownConverter::empty())
            .unwrap()
            .text_content;
        assert!(!md.contains("**From:**"));
        assert!(md.ends_with("Body only"));
    }

    #[test]
    fn test_rejects_non_ole() {
        assert!(OutlookMsgConverter
            .convert(b"plain text", &MarkdownConverter::empty())
            .is_err());
    }
}
