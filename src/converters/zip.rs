//! # ZIP 转换器
//!
//! 逐个转换归档中受支持的文件（可递归处理内嵌归档），
//! 不受支持或转换失败的条目直接跳过。
//!
//! 内嵌层数、单条目大小与解压总量均有上限，超出的条目跳过。
//!
//! ## 依赖关系
//! - 使用 `zip` 读取归档
//! - 通过 `MarkdownConverter` 分派内嵌文件

use super::{DocumentConverterResult, FormatConverter, MarkdownConverter};
use crate::batch::collector::extension_of;
use crate::error::Result;

use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

/// 内嵌归档的最大展开层数（顶层为 0）
const MAX_NESTING_DEPTH: usize = 8;

/// 单个条目解压后的最大字节数
const MAX_ENTRY_BYTES: u64 = 256 * 1024 * 1024;

/// 整个归档（含内嵌归档）解压的最大总字节数
const MAX_TOTAL_BYTES: u64 = 1024 * 1024 * 1024;

pub struct ZipConverter;

impl FormatConverter for ZipConverter {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["zip"]
    }

    fn convert(&self, data: &[u8], engine: &MarkdownConverter) -> Result<DocumentConverterResult> {
        let mut budget = MAX_TOTAL_BYTES;
        let text = self.convert_archive(data, engine, 0, &mut budget)?;
        Ok(DocumentConverterResult::new(text))
    }
}

impl ZipConverter {
    fn convert_archive(
        &self,
        data: &[u8],
        engine: &MarkdownConverter,
        depth: usize,
        budget: &mut u64,
    ) -> Result<String> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut sections = Vec::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }

            let name = entry.name().to_string();
            let extension = extension_of(Path::new(&name));
            let nested = extension == "zip";
            if nested && depth + 1 >= MAX_NESTING_DEPTH {
                continue;
            }
            if !nested && engine.find(&extension).is_none() {
                continue;
            }

            let limit = MAX_ENTRY_BYTES.min(*budget);
            let Some(content) = read_capped(&mut entry, limit)? else {
                continue;
            };
            *budget -= content.len() as u64;

            let converted = if nested {
                self.convert_archive(&content, engine, depth + 1, budget)
            } else {
                engine.convert_bytes(&content, &extension).map(|r| r.text_content)
            };

            if let Ok(text) = converted {
                let text = text.trim();
                if !text.is_empty() {
                    sections.push(format!("## File: {}\n\n{}", name, text));
                }
            }
        }

        if sections.is_empty() {
            return Ok(String::new());
        }

        Ok(format!(
            "Content from the zip file:\n\n{}",
            sections.join("\n\n")
        ))
    }
}

/// 最多读取 `limit` 字节；超出时返回 `None`
fn read_capped<R: Read>(reader: R, limit: u64) -> Result<Option<Vec<u8>>> {
    let mut content = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut content)?;
    if content.len() as u64 > limit {
        return Ok(None);
    }
    Ok(Some(content))
}
