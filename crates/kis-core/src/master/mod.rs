//! 종목 마스터 파일(`*.mst`) 파서.
//!
//! KIS가 배포하는 마스터 파일은 CP949로 인코딩된 고정폭 텍스트입니다.
//! 한 줄은 두 부분으로 구성됩니다.
//!
//! ```text
//! [단축코드 9][표준코드 12][종목명 ...가변...][고정폭 꼬리 영역 tail_width()]
//! ```
//!
//! 꼬리 영역은 줄 끝에서부터 잘라내고 나머지가 머리 영역이 됩니다.
//! 위치 계산은 바이트가 아닌 문자 단위입니다 (디코딩 이후).

mod elw;
mod konex;

pub use elw::ELW_LAYOUT;
pub use konex::KONEX_LAYOUT;

use crate::error::{CoreError, CoreResult};
use crate::table::Table;
use std::path::Path;
use tracing::{debug, warn};

/// 머리 영역 컬럼명.
pub const SHORT_CODE_COLUMN: &str = "short_code";
pub const STANDARD_CODE_COLUMN: &str = "standard_code";
pub const NAME_COLUMN: &str = "name";

/// 마스터 파일 레이아웃.
#[derive(Debug, Clone, Copy)]
pub struct MasterLayout {
    /// 레이아웃 이름 (예: "elw")
    pub name: &'static str,
    /// 단축코드 폭
    pub short_code_width: usize,
    /// 표준코드 폭
    pub standard_code_width: usize,
    /// 꼬리 영역 (컬럼명, 폭)
    pub tail: &'static [(&'static str, usize)],
}

impl MasterLayout {
    /// 꼬리 영역 전체 폭.
    pub fn tail_width(&self) -> usize {
        self.tail.iter().map(|(_, w)| w).sum()
    }

    /// 머리 코드 영역과 꼬리 영역을 모두 담는 최소 줄 길이 (문자 수).
    pub fn min_line_len(&self) -> usize {
        self.short_code_width + self.standard_code_width + self.tail_width()
    }

    /// 결과 표의 컬럼 목록.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec![SHORT_CODE_COLUMN, STANDARD_CODE_COLUMN, NAME_COLUMN];
        columns.extend(self.tail.iter().map(|(name, _)| *name));
        columns
    }

    /// 한 줄을 셀 목록으로 분해합니다.
    ///
    /// 길이가 모자란 줄도 항상 `columns().len()` 개의 셀을 반환합니다.
    /// 꼬리 영역을 담을 수 없는 줄은 앞에서부터 머리 영역으로 읽고
    /// 꼬리 셀은 비워 둡니다.
    pub fn split_line(&self, line: &str) -> Vec<String> {
        let chars: Vec<char> = line.trim_end_matches(['\r', '\n']).chars().collect();
        let tail_width = self.tail_width();
        let min_len = self.min_line_len();
        let split_at = if chars.len() < min_len {
            chars.len()
        } else {
            chars.len() - tail_width
        };
        let (head, tail) = chars.split_at(split_at);

        let mut cells = Vec::with_capacity(3 + self.tail.len());

        let code_end = self.short_code_width.min(head.len());
        let std_end = (self.short_code_width + self.standard_code_width).min(head.len());
        cells.push(collect(&head[..code_end]).trim_end().to_string());
        cells.push(collect(&head[code_end..std_end]).trim_end().to_string());
        cells.push(collect(&head[std_end..]).trim().to_string());

        let mut offset = 0;
        for (_, width) in self.tail {
            let start = offset.min(tail.len());
            let end = (offset + width).min(tail.len());
            cells.push(collect(&tail[start..end]).trim().to_string());
            offset += width;
        }

        cells
    }
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

/// 디코딩된 마스터 텍스트를 표로 변환합니다.
///
/// 입력 줄 수와 결과 행 수는 항상 같습니다.
pub fn parse_master(text: &str, layout: &MasterLayout) -> Table {
    let mut table = Table::with_columns(layout.columns());
    let min_len = layout.min_line_len();

    for (line_no, line) in text.lines().enumerate() {
        if line.chars().count() < min_len {
            warn!(
                layout = layout.name,
                line = line_no + 1,
                "마스터 파일 줄 길이가 레이아웃보다 짧습니다"
            );
        }
        table.push_row(layout.split_line(line));
    }

    debug!(layout = layout.name, rows = table.len(), "마스터 파일 파싱 완료");
    table
}

/// CP949 바이트를 문자열로 디코딩합니다.
///
/// 잘못된 바이트는 대체 문자로 바뀌며 경고를 남깁니다.
pub fn decode_master(bytes: &[u8]) -> String {
    let (text, _, had_errors) = encoding_rs::EUC_KR.decode(bytes);
    if had_errors {
        warn!("마스터 파일에 CP949로 해석할 수 없는 바이트가 있습니다");
    }
    text.into_owned()
}

/// 마스터 파일을 읽어 표로 변환합니다.
pub fn parse_master_file(path: impl AsRef<Path>, layout: &MasterLayout) -> CoreResult<Table> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        CoreError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    Ok(parse_master(&decode_master(&bytes), layout))
}

/// 이름으로 내장 레이아웃 조회.
pub fn layout_by_name(name: &str) -> Option<&'static MasterLayout> {
    match name.to_lowercase().as_str() {
        "elw" => Some(&ELW_LAYOUT),
        "konex" => Some(&KONEX_LAYOUT),
        _ => None,
    }
}
