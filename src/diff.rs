//! 逐行位置对比。
//!
//! 第 i 行只与第 i 行比较，缺失的一侧视为空串；
//! 插入一行会让后续所有行都标记为已变化。

use serde::{Deserialize, Serialize};

/// 对比结果中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRow {
    /// 从 1 开始的行号
    pub line_number: usize,
    pub original_line: String,
    pub transformed_line: String,
    pub changed: bool,
}

/// 按位置逐行对比两段文本
pub fn diff(original: &str, transformed: &str) -> Vec<DiffRow> {
    let original_lines: Vec<&str> = original.split('\n').collect();
    let transformed_lines: Vec<&str> = transformed.split('\n').collect();
    let max_lines = original_lines.len().max(transformed_lines.len());

    (0..max_lines)
        .map(|i| {
            let original_line = original_lines.get(i).copied().unwrap_or("");
            let transformed_line = transformed_lines.get(i).copied().unwrap_or("");

            DiffRow {
                line_number: i + 1,
                original_line: original_line.to_string(),
                transformed_line: transformed_line.to_string(),
                changed: original_line != transformed_line,
            }
        })
        .collect()
}

/// 变化的行数
pub fn changed_count(rows: &[DiffRow]) -> usize {
    rows.iter().filter(|r| r.changed).count()
}

/// 渲染为纯文本并排视图，变化的行以 `~` 标记
pub fn render_side_by_side(rows: &[DiffRow], column_width: usize) -> String {
    let number_width = rows.len().to_string().len();
    let mut output = String::new();

    for row in rows {
        let marker = if row.changed { '~' } else { ' ' };
        output.push_str(&format!(
            "{:>nw$} {} {:<cw$} | {}\n",
            row.line_number,
            marker,
            truncate(&row.original_line, column_width),
            row.transformed_line,
            nw = number_width,
            cw = column_width,
        ));
    }

    output
}

fn truncate(line: &str, width: usize) -> String {
    if line.chars().count() <= width {
        line.to_string()
    } else if width == 0 {
        String::new()
    } else {
        let kept: String = line.chars().take(width - 1).collect();
        format!("{}…", kept)
    }
}
