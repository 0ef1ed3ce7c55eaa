//! 표 출력 (table / csv / json).

use anyhow::{Context, Result};
use kis_core::params::parse_assignment;
use kis_core::Table;
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use tracing::info;

/// 표 셀 최대 표시 폭 (문자 수).
const MAX_CELL_WIDTH: usize = 30;

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(anyhow::anyhow!(
                "Invalid format: {}. Use: table, csv, json",
                s
            )),
        }
    }
}

/// `FROM=TO` 목록을 컬럼명 변경 쌍으로 변환.
pub fn parse_renames(items: &[String]) -> Result<Vec<(String, String)>> {
    items
        .iter()
        .map(|item| parse_assignment(item).with_context(|| format!("Invalid --rename: {}", item)))
        .collect()
}

/// 표를 지정 형식의 문자열로 변환.
pub fn render(table: &Table, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Table => format_table(table),
        OutputFormat::Csv => format_csv(table),
        OutputFormat::Json => format_json(table)?,
    })
}

/// 파일 또는 stdout에 출력.
pub fn write_output(content: &str, output_path: Option<&str>) -> Result<()> {
    if let Some(path) = output_path {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path))?;
        file.write_all(content.as_bytes())
            .context("Failed to write to file")?;
        info!("Output written to: {}", path);
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// 테이블 형식 출력.
fn format_table(table: &Table) -> String {
    if table.columns().is_empty() {
        return "(no data)".to_string();
    }

    let widths: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            table
                .rows()
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_CELL_WIDTH)
        })
        .collect();

    let mut output = String::new();

    // 헤더
    output.push_str(&format_line(table.columns().iter(), &widths));
    output.push('\n');
    output.push_str(&"-".repeat(widths.iter().sum::<usize>() + widths.len().saturating_sub(1)));
    output.push('\n');

    // 데이터
    for row in table.rows() {
        output.push_str(&format_line(row.iter(), &widths));
        output.push('\n');
    }

    output.push_str(&format!("Total: {} rows", table.len()));
    output
}

fn format_line<'a>(cells: impl Iterator<Item = &'a String>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &w)| pad(&truncate(cell, w), w))
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end()
        .to_string()
}

/// CSV 형식 출력.
fn format_csv(table: &Table) -> String {
    let mut output = String::new();

    let header: Vec<String> = table.columns().iter().map(|c| escape_csv(c)).collect();
    output.push_str(&header.join(","));
    output.push('\n');

    for row in table.rows() {
        let cells: Vec<String> = row.iter().map(|c| escape_csv(c)).collect();
        output.push_str(&cells.join(","));
        output.push('\n');
    }

    output
}

/// JSON 형식 출력 (행 객체 배열).
fn format_json(table: &Table) -> Result<String> {
    let records: Vec<Value> = table.records().into_iter().map(Value::Object).collect();
    serde_json::to_string_pretty(&records).context("Failed to serialize to JSON")
}

/// 문자열 자르기 (UTF-8 안전).
fn truncate(s: &str, max_len: usize) -> String {
    // 문자 수로 계산 (바이트가 아님)
    let char_count = s.chars().count();

    if char_count <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// 문자 수 기준 오른쪽 패딩.
fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    format!("{}{}", s, " ".repeat(width.saturating_sub(len)))
}

/// CSV 이스케이프 (콤마나 따옴표 포함 시 따옴표로 감싸기).
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
