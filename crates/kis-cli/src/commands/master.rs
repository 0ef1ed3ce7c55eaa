//! ELW/코넥스 마스터 파일 변환.

use super::output::{render, write_output, OutputFormat};
use anyhow::{anyhow, Context, Result};
use kis_core::master::layout_by_name;
use kis_core::{parse_master_file, Table};
use tracing::info;

/// 마스터 파일 변환 설정.
#[derive(Debug)]
pub struct MasterConfig {
    /// `elw` 또는 `konex`
    pub kind: String,
    pub file: String,
    pub format: OutputFormat,
    /// 최대 출력 행 수 (0 = 무제한)
    pub limit: usize,
    pub renames: Vec<(String, String)>,
    pub output: Option<String>,
}

/// 마스터 파일을 읽어 표로 변환.
pub fn load_master(kind: &str, file: &str) -> Result<Table> {
    let layout = layout_by_name(kind)
        .ok_or_else(|| anyhow!("Unknown master file type: {}. Supported: elw, konex", kind))?;

    parse_master_file(file, layout)
        .with_context(|| format!("Failed to parse master file: {}", file))
}

/// 마스터 파일 변환 후 출력. 파일의 전체 행 수를 반환합니다.
pub fn run_master(config: MasterConfig) -> Result<usize> {
    let mut table = load_master(&config.kind, &config.file)?;
    let total = table.len();
    info!("{} 마스터 {}건 로드: {}", config.kind, total, config.file);

    if config.limit > 0 {
        table.truncate(config.limit);
    }
    table.rename_columns(&config.renames);

    let content = render(&table, config.format)?;
    write_output(&content, config.output.as_deref())?;

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kis_core::master::SHORT_CODE_COLUMN;
    use kis_core::KONEX_LAYOUT;

    #[test]
    fn test_load_and_limit() {
        let line = format!(
            "{:<9}{:<12}{}{}",
            "A278990",
            "KR7278990003",
            "코넥스종목",
            "0".repeat(KONEX_LAYOUT.tail_width())
        );
        let text = vec![line; 3].join("\n");
        let path = std::env::temp_dir().join(format!("kis_cli_konex_{}.mst", std::process::id()));
        std::fs::write(&path, text).unwrap();

        let table = load_master("konex", path.to_str().unwrap()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0, SHORT_CODE_COLUMN), Some("A278990"));

        let output = std::env::temp_dir().join(format!("kis_cli_konex_{}.csv", std::process::id()));
        let total = run_master(MasterConfig {
            kind: "konex".to_string(),
            file: path.to_str().unwrap().to_string(),
            format: OutputFormat::Csv,
            limit: 1,
            renames: vec![(SHORT_CODE_COLUMN.to_string(), "code".to_string())],
            output: Some(output.to_str().unwrap().to_string()),
        })
        .unwrap();
        assert_eq!(total, 3);

        let csv = std::fs::read_to_string(&output).unwrap();
        assert!(csv.starts_with("code,"));
        assert_eq!(csv.lines().count(), 2);

        std::fs::remove_file(&path).ok();
        std::fs::remove_file(&output).ok();
    }

    #[test]
    fn test_unknown_kind() {
        assert!(load_master("kospi", "/tmp/none.mst").is_err());
    }
}
