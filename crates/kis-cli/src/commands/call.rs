//! REST 엔드포인트 호출.

use super::output::{render, write_output, OutputFormat};
use anyhow::{anyhow, Result};
use kis_core::params::parse_assignment;
use kis_core::RequestParams;
use kis_exchange::{
    call_endpoint, catalog, CallOptions, EndpointOutput, EndpointSpec, KisConfig, KisHttpClient,
    KisOAuth,
};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// 호출 설정.
#[derive(Debug)]
pub struct CallConfig {
    /// `category/name` 또는 `name`
    pub endpoint: String,
    /// `KEY=VALUE` 목록
    pub params: Vec<String>,
    pub max_depth: usize,
    /// 첫 요청의 tr_cont
    pub tr_cont: Option<String>,
    pub format: OutputFormat,
    pub renames: Vec<(String, String)>,
    pub output: Option<String>,
}

/// 명령행 파라미터로 요청 파라미터를 만듭니다.
///
/// 계좌가 필요한 엔드포인트인데 CANO/ACNT_PRDT_CD가 없으면 설정의 계좌로 채웁니다.
pub fn build_params(
    spec: &EndpointSpec,
    assignments: &[String],
    config: &KisConfig,
) -> Result<RequestParams> {
    let mut params = RequestParams::new();
    for item in assignments {
        let (key, value) = parse_assignment(item)?;
        params.set(key, value);
    }

    if spec.needs_account() {
        for (key, value) in config.account_params().iter() {
            if !params.contains(key) {
                debug!("계좌 파라미터 보완: {}", key);
                params.set(key, value);
            }
        }
    }

    Ok(params)
}

/// 출력 표들을 하나의 문자열로 변환.
///
/// JSON은 `{ "output1": [...], ... }` 객체, 나머지는 표마다 제목을 붙여 이어 붙입니다.
pub fn render_output(
    output: &EndpointOutput,
    renames: &[(String, String)],
    format: OutputFormat,
) -> Result<String> {
    let tables: Vec<(&str, kis_core::Table)> = output
        .tables
        .iter()
        .map(|(name, table)| {
            let mut table = table.clone();
            table.rename_columns(renames);
            (name.as_str(), table)
        })
        .collect();

    if format == OutputFormat::Json {
        let object: Map<String, Value> = tables
            .iter()
            .map(|(name, table)| {
                let rows = table.records().into_iter().map(Value::Object).collect();
                (name.to_string(), Value::Array(rows))
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&Value::Object(object))?);
    }

    let mut sections = Vec::with_capacity(tables.len());
    for (name, table) in &tables {
        let body = render(table, format)?;
        if tables.len() == 1 {
            sections.push(body);
        } else {
            sections.push(format!("[{}]\n{}", name, body));
        }
    }
    Ok(sections.join("\n\n"))
}

/// 엔드포인트 호출 후 결과 출력. 전체 행 수를 반환합니다.
pub async fn run_call(config: KisConfig, call: CallConfig) -> Result<usize> {
    let spec = catalog::find(&call.endpoint).ok_or_else(|| {
        anyhow!(
            "Unknown endpoint: {}. Run `kis endpoints` to list available endpoints",
            call.endpoint
        )
    })?;

    let params = build_params(spec, &call.params, &config)?;
    let client = KisHttpClient::new(KisOAuth::new(config)?)?;

    let options = CallOptions {
        max_depth: call.max_depth,
        tr_cont: call.tr_cont.unwrap_or_default(),
    };

    info!("{}/{} 호출 ({})", spec.category, spec.name, spec.description);
    let output = call_endpoint(&client, spec, params, &options).await?;

    let total = output.tables.iter().map(|(_, t)| t.len()).sum();
    let content = render_output(&output, &call.renames, call.format)?;
    write_output(&content, call.output.as_deref())?;

    Ok(total)
}
