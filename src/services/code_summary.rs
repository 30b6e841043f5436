//! 法条统计 - 业务能力层
//!
//! 统计列表结果中每个 codeSection 出现的次数，并按列打印

use anyhow::Result;
use regex::Regex;

use crate::models::CaseSummary;

/// 打印时的列数
const COLUMNS: usize = 8;
/// 每格宽度
const CELL_WIDTH: usize = 20;

/// 规范化后的法条及其出现次数，按次数降序；次数相同保持首次出现的顺序
pub fn summarize_code_sections(cases: &[CaseSummary]) -> Result<Vec<(String, usize)>> {
    let re = Regex::new(r"\b\d{2}\.\d-\d{1,3}\b")?;

    let mut summary: Vec<(String, usize)> = Vec::new();
    for case in cases {
        let section = re
            .find(&case.code_section)
            .map(|m| m.as_str())
            .unwrap_or(&case.code_section);
        match summary.iter_mut().find(|(s, _)| s == section) {
            Some((_, count)) => *count += 1,
            None => summary.push((section.to_string(), 1)),
        }
    }

    summary.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(summary)
}

/// 按列优先的顺序排成多行
pub fn format_summary(summary: &[(String, usize)]) -> Vec<String> {
    let rows = summary.len().div_ceil(COLUMNS);
    (0..rows)
        .map(|i| {
            let mut row = String::new();
            for j in 0..COLUMNS {
                if let Some((section, count)) = summary.get(i + j * rows) {
                    let cell = format!("{}: {}", section, count);
                    row.push_str(&format!("{:<width$}", cell, width = CELL_WIDTH));
                }
            }
            row
        })
        .collect()
}

/// 统计并打印到控制台
pub fn print_code_summary(cases: &[CaseSummary]) -> Result<Vec<(String, usize)>> {
    let summary = summarize_code_sections(cases)?;
    println!("Code Section Summary:");
    for row in format_summary(&summary) {
        println!("{}", row);
    }
    Ok(summary)
}
