//! 데이터로 정의된 REST 엔드포인트와 공통 호출 루프.
//!
//! 엔드포인트마다 함수를 두는 대신 [`EndpointSpec`]에 경로, TR ID, 필수 파라미터,
//! 출력 필드, 연속 조회 커서를 적어 두고 [`call_endpoint`] 하나로 호출합니다.

use super::client::{ApiRequest, Fetch, Method};
use super::config::KisEnvironment;
use crate::error::{KisError, KisResult};
use kis_core::{RequestParams, Table};
use std::fmt;
use tracing::{debug, info, warn};

/// 기본 연속 조회 한도 (첫 페이지 이후 추가 요청 수).
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// 엔드포인트 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    DomesticStock,
    OverseasStock,
    DomesticFutureOption,
    DomesticBond,
    Elw,
    EtfEtn,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::DomesticStock,
        Category::OverseasStock,
        Category::DomesticFutureOption,
        Category::DomesticBond,
        Category::Elw,
        Category::EtfEtn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::DomesticStock => "domestic_stock",
            Category::OverseasStock => "overseas_stock",
            Category::DomesticFutureOption => "domestic_futureoption",
            Category::DomesticBond => "domestic_bond",
            Category::Elw => "elw",
            Category::EtfEtn => "etfetn",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_lowercase().replace('-', "_");
        Category::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 모의투자 TR ID 규칙.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperTrId {
    /// 실전과 동일 (시세 조회)
    Same,
    /// 첫 글자 T/J/C를 V로 치환 (주문/계좌 조회)
    Prefixed,
    /// 별도 TR ID
    Explicit(&'static str),
    /// 모의투자 미지원
    Unsupported,
}

/// 연속 조회 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paging {
    None,
    /// 응답 `tr_cont`가 M/F이면 본문의 커서 필드를 요청 파라미터로 옮겨 재호출.
    /// `(요청 파라미터, 응답 본문 필드)`
    Continuation {
        cursors: &'static [(&'static str, &'static str)],
    },
}

/// 국내 계좌 조회 커서.
pub const CURSOR_100: &[(&str, &str)] = &[
    ("CTX_AREA_FK100", "ctx_area_fk100"),
    ("CTX_AREA_NK100", "ctx_area_nk100"),
];

/// 해외 계좌 조회 커서.
pub const CURSOR_200: &[(&str, &str)] = &[
    ("CTX_AREA_FK200", "ctx_area_fk200"),
    ("CTX_AREA_NK200", "ctx_area_nk200"),
];

/// 휴장일 등 일반 커서.
pub const CURSOR_PLAIN: &[(&str, &str)] = &[
    ("CTX_AREA_FK", "ctx_area_fk"),
    ("CTX_AREA_NK", "ctx_area_nk"),
];

/// 엔드포인트 정의.
#[derive(Debug, Clone, Copy)]
pub struct EndpointSpec {
    /// 카탈로그 이름 (예: "inquire-price")
    pub name: &'static str,
    pub category: Category,
    pub description: &'static str,
    pub method: Method,
    pub path: &'static str,
    /// 실전 TR ID
    pub tr_id: &'static str,
    pub paper: PaperTrId,
    /// 비어 있으면 안 되는 파라미터
    pub required: &'static [&'static str],
    /// 호출자가 주지 않았을 때 채우는 값
    pub defaults: &'static [(&'static str, &'static str)],
    /// 표로 변환할 응답 필드
    pub outputs: &'static [&'static str],
    pub paging: Paging,
    /// 해시 키 헤더 필요 여부
    pub hashkey: bool,
}

impl EndpointSpec {
    /// 환경에 맞는 TR ID.
    pub fn resolve_tr_id(&self, env: KisEnvironment) -> KisResult<String> {
        resolve_tr_id(self.tr_id, env, self.paper).ok_or_else(|| {
            KisError::NotSupported(format!("{}: 모의투자에서 지원하지 않는 API입니다", self.name))
        })
    }

    /// 계좌 파라미터(CANO)가 필요한 엔드포인트인지.
    pub fn needs_account(&self) -> bool {
        self.required.contains(&"CANO")
    }

    pub fn is_paged(&self) -> bool {
        matches!(self.paging, Paging::Continuation { .. })
    }
}

/// TR ID 변환. 모의투자 미지원이면 `None`.
pub fn resolve_tr_id(real: &str, env: KisEnvironment, rule: PaperTrId) -> Option<String> {
    if env == KisEnvironment::Real {
        return Some(real.to_string());
    }
    match rule {
        PaperTrId::Same => Some(real.to_string()),
        PaperTrId::Explicit(id) => Some(id.to_string()),
        PaperTrId::Unsupported => None,
        PaperTrId::Prefixed => match real.chars().next() {
            Some('T' | 'J' | 'C') => Some(format!("V{}", &real[1..])),
            _ => Some(real.to_string()),
        },
    }
}

/// 호출 옵션.
#[derive(Debug, Clone)]
pub struct CallOptions {
    /// 첫 페이지 이후 추가로 요청할 최대 페이지 수
    pub max_depth: usize,
    /// 첫 요청의 `tr_cont` 헤더
    pub tr_cont: String,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            tr_cont: String::new(),
        }
    }
}

impl CallOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// 엔드포인트 호출 결과. 출력 필드 이름 순서대로 표를 담습니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointOutput {
    pub tables: Vec<(String, Table)>,
}

impl EndpointOutput {
    /// 선언된 출력마다 빈 표.
    pub fn empty(outputs: &[&str]) -> Self {
        Self {
            tables: outputs
                .iter()
                .map(|name| (name.to_string(), Table::new()))
                .collect(),
        }
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// 첫 번째 출력 표.
    pub fn first(&self) -> Option<&Table> {
        self.tables.first().map(|(_, t)| t)
    }

    /// 모든 표가 비어 있는지.
    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(|(_, t)| t.is_empty())
    }

    pub fn into_table(self, name: &str) -> Table {
        self.tables
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
            .unwrap_or_default()
    }

    fn append(&mut self, name: &str, table: Table) {
        if let Some((_, existing)) = self.tables.iter_mut().find(|(n, _)| n == name) {
            existing.append(table);
        }
    }
}

/// 엔드포인트 호출.
///
/// 1. 필수 파라미터 검증 (네트워크 호출 전)
/// 2. 기본값 병합, TR ID 결정
/// 3. 응답 `tr_cont`가 M/F이면 커서를 갱신해 `page_delay` 후 다음 페이지 요청
///
/// 브로커가 실패를 반환하면 `msg_cd`/`msg1`을 로그로 남기고 빈 표를 반환합니다.
/// 전송 실패는 에러로 전파됩니다.
pub async fn call_endpoint<F>(
    fetch: &F,
    spec: &EndpointSpec,
    params: RequestParams,
    options: &CallOptions,
) -> KisResult<EndpointOutput>
where
    F: Fetch + ?Sized,
{
    params.check_required(spec.required)?;

    let mut params = params;
    for (key, value) in spec.defaults {
        params.set_default(key, *value);
    }

    let tr_id = spec.resolve_tr_id(fetch.environment())?;
    let mut output = EndpointOutput::empty(spec.outputs);
    let mut tr_cont = options.tr_cont.clone();
    let mut depth = 0usize;

    loop {
        let request = ApiRequest {
            method: spec.method,
            path: spec.path.to_string(),
            tr_id: tr_id.clone(),
            tr_cont: tr_cont.clone(),
            params: params.clone(),
            hashkey: spec.hashkey,
        };

        let response = fetch.fetch(&request).await?;
        if !response.is_ok() {
            response.log_error(spec.name);
            return Ok(EndpointOutput::empty(spec.outputs));
        }

        for name in spec.outputs {
            output.append(name, response.output(name));
        }

        let cursors = match spec.paging {
            Paging::Continuation { cursors } if matches!(response.tr_cont(), "M" | "F") => cursors,
            _ => break,
        };

        if depth >= options.max_depth {
            warn!(
                "{}: 연속 조회 한도 도달 (max_depth={}), 누적 결과 반환",
                spec.name, options.max_depth
            );
            break;
        }
        depth += 1;

        for (param, field) in cursors {
            let value = response.body_str(field).unwrap_or_default();
            params.set(param, value);
        }
        tr_cont = "N".to_string();

        debug!("{}: 다음 페이지 요청 (depth={})", spec.name, depth);
        tokio::time::sleep(fetch.page_delay()).await;
    }

    info!(
        "{} 조회 완료: {}",
        spec.name,
        output
            .tables
            .iter()
            .map(|(n, t)| format!("{}={}", n, t.len()))
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(output)
}
