//! 응답 출력(`output`, `output1`, ...)을 담는 표 형식 데이터.
//!
//! KIS API는 모든 값을 문자열로 내려주므로 셀은 `String`으로 보관합니다.
//! 타입이 필요한 경우 [`Table::deserialize_rows`]로 구조체로 변환합니다.

use crate::error::{CoreError, CoreResult};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

/// 스칼라 배열을 표로 변환할 때 사용하는 컬럼명.
pub const VALUE_COLUMN: &str = "value";

/// 컬럼 순서를 보존하는 문자열 표.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// 빈 표 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 컬럼만 지정된 빈 표 생성.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// JSON 값에서 표 생성.
    ///
    /// - 객체: 한 행
    /// - 객체 배열: 원소마다 한 행 (컬럼은 처음 등장한 순서)
    /// - 스칼라 배열: `value` 컬럼 하나
    /// - null / 빈 문자열: 빈 표
    pub fn from_json(value: &Value) -> Self {
        let mut table = Table::new();
        match value {
            Value::Object(map) => table.push_record(map),
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::Object(map) => table.push_record(map),
                        Value::Null => {}
                        scalar => {
                            let mut map = Map::new();
                            map.insert(VALUE_COLUMN.to_string(), scalar.clone());
                            table.push_record(&map);
                        }
                    }
                }
            }
            Value::Null => {}
            Value::String(s) if s.is_empty() => {}
            scalar => {
                let mut map = Map::new();
                map.insert(VALUE_COLUMN.to_string(), scalar.clone());
                table.push_record(&map);
            }
        }
        table
    }

    /// 평탄한 필드 목록을 컬럼 수 단위로 잘라 행으로 만듭니다.
    ///
    /// 마지막 행이 모자라면 빈 문자열로 채웁니다.
    pub fn from_delimited<S: AsRef<str>>(columns: &[S], fields: &[&str]) -> Self {
        let mut table = Table::with_columns(columns.iter().map(|c| c.as_ref().to_string()));
        let width = table.columns.len();
        if width == 0 {
            return table;
        }

        for chunk in fields.chunks(width) {
            let mut row: Vec<String> = chunk.iter().map(|f| f.to_string()).collect();
            row.resize(width, String::new());
            table.rows.push(row);
        }
        table
    }

    /// JSON 객체 하나를 행으로 추가합니다. 새 컬럼은 뒤에 붙습니다.
    pub fn push_record(&mut self, record: &Map<String, Value>) {
        for key in record.keys() {
            if !self.columns.iter().any(|c| c == key) {
                self.columns.push(key.clone());
                for row in &mut self.rows {
                    row.push(String::new());
                }
            }
        }

        let row = self
            .columns
            .iter()
            .map(|col| record.get(col).map(cell_to_string).unwrap_or_default())
            .collect();
        self.rows.push(row);
    }

    /// 행 추가. 컬럼 수와 다르면 잘라내거나 빈 값으로 채웁니다.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    /// 다른 표를 아래에 이어 붙입니다 (컬럼 합집합).
    pub fn append(&mut self, other: Table) {
        if other.columns.is_empty() {
            return;
        }
        if self.columns.is_empty() {
            *self = other;
            return;
        }

        for col in &other.columns {
            if !self.columns.contains(col) {
                self.columns.push(col.clone());
                for row in &mut self.rows {
                    row.push(String::new());
                }
            }
        }

        let positions: Vec<usize> = self
            .columns
            .iter()
            .map(|col| {
                other
                    .columns
                    .iter()
                    .position(|c| c == col)
                    .unwrap_or(usize::MAX)
            })
            .collect();

        for other_row in other.rows {
            let row = positions
                .iter()
                .map(|&idx| other_row.get(idx).cloned().unwrap_or_default())
                .collect();
            self.rows.push(row);
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// 행 수.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 컬럼 인덱스 조회.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// 특정 컬럼의 값 목록.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// 셀 값 조회.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// 컬럼명 변경. 존재하지 않는 컬럼은 무시합니다.
    ///
    /// 이미 있는 다른 컬럼과 이름이 겹치는 변경은 건너뜁니다.
    pub fn rename_columns<S: AsRef<str>>(&mut self, mapping: &[(S, S)]) {
        for (from, to) in mapping {
            let (from, to) = (from.as_ref(), to.as_ref());
            let Some(idx) = self.column_index(from) else {
                continue;
            };
            if self.column_index(to).is_some_and(|existing| existing != idx) {
                warn!(from, to, "이미 존재하는 컬럼명으로 변경할 수 없습니다");
                continue;
            }
            self.columns[idx] = to.to_string();
        }
    }

    /// 지정한 컬럼만 남긴 새 표. 없는 컬럼은 건너뜁니다.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Table {
        let indices: Vec<usize> = names
            .iter()
            .filter_map(|n| self.column_index(n.as_ref()))
            .collect();

        Table {
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// 앞에서부터 `n`개 행만 남깁니다.
    pub fn truncate(&mut self, n: usize) {
        self.rows.truncate(n);
    }

    /// 각 행을 JSON 객체로 변환.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(c, v)| (c.clone(), Value::String(v.clone())))
                    .collect()
            })
            .collect()
    }

    /// 각 행을 `T`로 역직렬화.
    pub fn deserialize_rows<T: DeserializeOwned>(&self) -> CoreResult<Vec<T>> {
        self.records()
            .into_iter()
            .map(|record| {
                serde_json::from_value(Value::Object(record))
                    .map_err(|e| CoreError::Parse(format!("행 변환 실패: {}", e)))
            })
            .collect()
    }
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
