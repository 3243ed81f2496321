//! # Markdown 输出辅助
//!
//! 表格渲染与空白规整，供各格式转换器共用。
//!
//! ## 依赖关系
//! - 使用 `tabled` 渲染 Markdown 表格
//! - 使用 `regex` 规整空行

use regex::Regex;
use std::sync::LazyLock;
use tabled::builder::Builder;
use tabled::settings::Style;

static EXCESS_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n(\s*\n)+").expect("valid regex"));

/// 渲染 Markdown 表格，第一行作为表头；行长不一致时补齐空单元格
pub fn table(rows: &[Vec<String>]) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let mut builder = Builder::default();
    for row in rows {
        let mut cells: Vec<String> = row.iter().map(|c| escape_cell(c)).collect();
        cells.resize(width, String::new());
        builder.push_record(cells);
    }

    let mut table = builder.build();
    table.with(Style::markdown());
    table.to_string()
}

/// 转义单元格中的竖线并压平换行
fn escape_cell(cell: &str) -> String {
    cell.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

/// 将三个及以上连续换行压缩为一个空行，并去掉首尾空白
pub fn collapse_blank_lines(text: &str) -> String {
    let trimmed_lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    EXCESS_BLANK_LINES
        .replace_all(&trimmed_lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}

/// 将连续空白压缩为单个空格
pub fn normalize_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(ch);
            last_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_layout() {
        let rows = vec![
            vec!["name".to_string(), "qty".to_string()],
            vec!["apple".to_string(), "3".to_string()],
            vec!["pear".to_string()],
        ];
        let out = table(&rows);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("| name"));
        assert!(lines[1].starts_with("|-"));
        assert!(lines[2].contains("apple"));
        assert_eq!(lines[3].matches('|').count(), 3);
    }

    #[test]
    fn test_table_escapes_cells() {
        let rows = vec![vec!["a|b".to_string(), "line1\nline2".to_string()]];
        let out = table(&rows);
        assert!(out.contains("a\\|b"));
        assert!(out.contains("line1 line2"));
        assert!(table(&[]).is_empty());
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("\n\na  \n\n\n\nb\n \n\nc\n"), "a\n\nb\n\nc");
        assert_eq!(collapse_blank_lines("x\n\ny"), "x\n\ny");
    }

    #[test]
    fn test_normalize_inline() {
        assert_eq!(normalize_inline("  a \n\t b "), " a b ");
    }
}
