//! 엔드포인트/실시간 카탈로그 목록.

use super::output::{render, OutputFormat};
use anyhow::{anyhow, Result};
use kis_core::Table;
use kis_exchange::{catalog, realtime, Category, Method};

/// REST 엔드포인트 목록 표.
pub fn endpoint_table(category: Option<Category>) -> Table {
    let mut table = Table::with_columns([
        "endpoint", "tr_id", "method", "paged", "required", "description",
    ]);

    let specs: Vec<_> = match category {
        Some(category) => catalog::by_category(category).collect(),
        None => catalog::all().collect(),
    };

    for spec in specs {
        table.push_row(vec![
            format!("{}/{}", spec.category, spec.name),
            spec.tr_id.to_string(),
            match spec.method {
                Method::Get => "GET".to_string(),
                Method::Post => "POST".to_string(),
            },
            if spec.is_paged() { "Y" } else { "N" }.to_string(),
            spec.required.join(","),
            spec.description.to_string(),
        ]);
    }
    table
}

/// 실시간 구독 목록 표.
pub fn realtime_table() -> Table {
    let mut table = Table::with_columns(["name", "tr_id", "paper_tr_id", "encrypted", "columns", "description"]);
    for spec in realtime::REALTIME_SPECS {
        table.push_row(vec![
            spec.name.to_string(),
            spec.tr_id.to_string(),
            spec.paper_tr_id.unwrap_or("-").to_string(),
            if spec.encrypted { "Y" } else { "N" }.to_string(),
            spec.columns.len().to_string(),
            spec.description.to_string(),
        ]);
    }
    table
}

/// 목록 출력.
pub fn list_endpoints(category: Option<&str>, realtime: bool, format: OutputFormat) -> Result<usize> {
    let table = if realtime {
        realtime_table()
    } else {
        let category = category
            .map(|c| {
                Category::parse(c).ok_or_else(|| {
                    let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
                    anyhow!("Unknown category: {}. Supported: {}", c, names.join(", "))
                })
            })
            .transpose()?;
        endpoint_table(category)
    };

    println!("{}", render(&table, format)?);
    Ok(table.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_table_filters_category() {
        let all = endpoint_table(None);
        let elw = endpoint_table(Some(Category::Elw));

        assert!(elw.len() < all.len());
        assert!(elw
            .column("endpoint")
            .unwrap()
            .iter()
            .all(|name| name.starts_with("elw/")));
    }

    #[test]
    fn test_qualified_names_resolve() {
        let table = endpoint_table(None);
        for name in table.column("endpoint").unwrap() {
            assert!(catalog::find(name).is_some(), "{} not found", name);
        }
    }

    #[test]
    fn test_realtime_table() {
        let table = realtime_table();
        assert_eq!(table.len(), realtime::REALTIME_SPECS.len());
        assert_eq!(table.get(0, "tr_id"), Some("H0STCNT0"));
    }
}
