//! # 图片转换器
//!
//! 输出图片元数据（尺寸与格式），不做 OCR。
//!
//! ## 依赖关系
//! - 使用 `image` 嗅探格式并读取尺寸（不解码像素）

use super::{DocumentConverterResult, FormatConverter, MarkdownConverter};
use crate::error::{MdBatchError, Result};

use image::ImageReader;
use std::io::Cursor;

pub struct ImageConverter;

impl FormatConverter for ImageConverter {
    fn name(&self) -> &'static str {
        "image"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["jpg", "jpeg", "png"]
    }

    fn convert(&self, data: &[u8], _: &MarkdownConverter) -> Result<DocumentConverterResult> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| MdBatchError::parse("image", "unrecognized image format"))?;
        let (width, height) = reader.into_dimensions()?;

        let format_name = format
            .extensions_str()
            .first()
            .map(|ext| ext.to_uppercase())
            .unwrap_or_else(|| format!("{:?}", format).to_uppercase());

        Ok(DocumentConverterResult::new(format!(
            "ImageSize: {}x{}\nFormat: {}\n",
            width, height, format_name
        )))
    }
}
