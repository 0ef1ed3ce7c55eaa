//! 마스터 파일 파서 통합 테스트.

use kis_core::master::{decode_master, layout_by_name, NAME_COLUMN, SHORT_CODE_COLUMN};
use kis_core::{parse_master, parse_master_file, ELW_LAYOUT, KONEX_LAYOUT};
use proptest::prelude::*;

/// 레이아웃 폭에 맞춘 합성 줄.
fn synthetic_line(layout: &kis_core::MasterLayout, code: &str, name: &str) -> String {
    let tail: String = layout
        .tail
        .iter()
        .enumerate()
        .map(|(i, (_, w))| {
            let digit = char::from(b'0' + (i % 10) as u8);
            std::iter::repeat(digit).take(*w).collect::<String>()
        })
        .collect();
    format!("{:<9}{:<12}{}{}", code, format!("KR{}", code), name, tail)
}

#[test]
fn test_elw_synthetic_file() {
    let text = [
        synthetic_line(&ELW_LAYOUT, "57J001", "한국J001삼성전자콜"),
        synthetic_line(&ELW_LAYOUT, "57J002", "한국J002SK하이닉스풋"),
    ]
    .join("\n");

    let table = parse_master(&text, &ELW_LAYOUT);
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(0, SHORT_CODE_COLUMN), Some("57J001"));
    assert_eq!(table.get(1, NAME_COLUMN), Some("한국J002SK하이닉스풋"));
    assert_eq!(table.get(0, "underlying_code_1"), Some("000000000"));
    assert_eq!(table.get(0, "issuer_code"), Some("55555"));
}

#[test]
fn test_konex_file_roundtrip_through_cp949() {
    let text = synthetic_line(&KONEX_LAYOUT, "A278990", "코넥스테스트");
    let (bytes, _, _) = encoding_rs::EUC_KR.encode(&text);

    let path = std::env::temp_dir().join(format!("konex_{}.mst", std::process::id()));
    std::fs::write(&path, &bytes).unwrap();

    let table = parse_master_file(&path, &KONEX_LAYOUT).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(table.len(), 1);
    assert_eq!(table.get(0, NAME_COLUMN), Some("코넥스테스트"));
    assert_eq!(decode_master(&bytes), text);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = parse_master_file("/nonexistent/elw_code.mst", &ELW_LAYOUT).unwrap_err();
    assert!(matches!(err, kis_core::CoreError::Io(_)));
}

proptest! {
    #[test]
    fn prop_row_count_equals_line_count(lines in proptest::collection::vec("[ -~가-힣]{0,200}", 0..40)) {
        let layout = layout_by_name("konex").unwrap();
        let text = lines.join("\n");
        let table = parse_master(&text, layout);
        prop_assert_eq!(table.len(), text.lines().count());
        for row in table.rows() {
            prop_assert_eq!(row.len(), layout.columns().len());
        }
    }
}
