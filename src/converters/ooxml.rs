//! # OOXML 包读取
//!
//! Office Open XML 文件本质是 ZIP 包，这里提供部件读取与关系解析。
//!
//! ## 依赖关系
//! - 被 `converters/docx.rs`, `converters/pptx.rs` 使用
//! - 使用 `zip` 与 `quick-xml`

use crate::error::{MdBatchError, Result};

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::result::ZipError;
use zip::ZipArchive;

/// 内存中的 OOXML 包
pub struct Package<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> Package<'a> {
    /// 打开 OOXML 包
    pub fn open(data: &'a [u8]) -> Result<Self> {
        Ok(Self {
            archive: ZipArchive::new(Cursor::new(data))?,
        })
    }

    /// 读取部件内容，不存在时返回 `None`
    pub fn read_part(&mut self, name: &str) -> Result<Option<String>> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Ok(Some(content))
    }

    /// 包内所有部件名
    pub fn part_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }
}

/// 关系文件中的一条关系
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub rel_type: String,
    pub target: String,
}

/// 解析 `.rels` 关系部件
pub fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    let mut rels = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                rels.push(Relationship {
                    rel_type: attribute(&e, b"Type")?.unwrap_or_default(),
                    target: attribute(&e, b"Target")?.unwrap_or_default(),
                });
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(rels)
}

/// 按本地名读取元素属性（忽略命名空间前缀）
///
/// OOXML 部件固定为 UTF-8，这里直接解码后再反转义实体。
pub fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == name {
            let raw = std::str::from_utf8(&attr.value)
                .map_err(|err| MdBatchError::parse("xml", err))?;
            let value = unescape(raw).map_err(|err| MdBatchError::parse("xml", err))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// 将关系目标解析为包内绝对部件名（相对于 `base_dir`）
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut parts: Vec<&str> = base_dir.split('/').filter(|p| !p.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            ".." => {
                parts.pop();
            }
            "." | "" => {}
            other => parts.push(other),
        }
    }
    parts.join("/")
}
