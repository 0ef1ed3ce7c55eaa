//! KIS REST 호출 경계.
//!
//! 모든 엔드포인트는 [`Fetch`] 하나를 통해 호출됩니다.
//! 실제 구현은 [`KisHttpClient`](reqwest + [`KisOAuth`])이며,
//! 테스트에서는 네트워크 없이 동작하는 구현으로 교체할 수 있습니다.

use super::auth::{is_token_rejected, KisOAuth};
use super::config::KisEnvironment;
use crate::error::{KisError, KisResult};
use async_trait::async_trait;
use kis_core::{RequestParams, Table};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// HTTP 메서드.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// 한 번의 REST 호출.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// `/uapi/...` 경로
    pub path: String,
    pub tr_id: String,
    /// 연속 조회 헤더 ("" 또는 "N")
    pub tr_cont: String,
    pub params: RequestParams,
    /// 해시 키 헤더 필요 여부 (POST 전용)
    pub hashkey: bool,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>, tr_id: impl Into<String>, params: RequestParams) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            tr_id: tr_id.into(),
            tr_cont: String::new(),
            params,
            hashkey: false,
        }
    }

    pub fn post(path: impl Into<String>, tr_id: impl Into<String>, params: RequestParams) -> Self {
        Self {
            method: Method::Post,
            ..Self::get(path, tr_id, params)
        }
    }

    pub fn with_tr_cont(mut self, tr_cont: impl Into<String>) -> Self {
        self.tr_cont = tr_cont.into();
        self
    }

    pub fn with_hashkey(mut self, enabled: bool) -> Self {
        self.hashkey = enabled;
        self
    }
}

/// REST 응답.
///
/// HTTP 상태가 실패여도 에러가 아닌 응답으로 돌려주며,
/// 호출자가 `msg_cd`/`msg1`을 확인해 로그를 남깁니다.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// 소문자 헤더 이름 → 값
    pub headers: HashMap<String, String>,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, headers: HashMap<String, String>, body: Value) -> Self {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP 2xx 이면서 `rt_cd == "0"`.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status) && self.rt_cd() == Some("0")
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// 응답 연속 조회 플래그 ("M"/"F" = 다음 페이지 있음).
    pub fn tr_cont(&self) -> &str {
        self.header("tr_cont").unwrap_or("").trim()
    }

    pub fn rt_cd(&self) -> Option<&str> {
        self.body_str("rt_cd")
    }

    pub fn error_code(&self) -> &str {
        self.body_str("msg_cd").unwrap_or("")
    }

    pub fn error_message(&self) -> &str {
        self.body_str("msg1").unwrap_or("")
    }

    /// 본문 최상위 문자열 필드.
    pub fn body_str(&self, field: &str) -> Option<&str> {
        self.body
            .get(field)
            .or_else(|| self.body.get(field.to_lowercase()))
            .and_then(Value::as_str)
    }

    /// `output`, `output1` 같은 출력 필드를 표로 변환. 없으면 빈 표.
    pub fn output(&self, name: &str) -> Table {
        self.body
            .get(name)
            .map(Table::from_json)
            .unwrap_or_default()
    }

    /// 실패 응답 로그.
    pub fn log_error(&self, context: &str) {
        error!(
            "KIS API 실패 [{}] status={} msg_cd={} msg1={}",
            context,
            self.status,
            self.error_code(),
            self.error_message()
        );
    }
}

/// 저수준 REST 호출 경계.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// 요청을 보내고 응답을 반환합니다. 전송 실패만 에러입니다.
    async fn fetch(&self, request: &ApiRequest) -> KisResult<ApiResponse>;

    /// 대상 환경 (TR ID 변환에 사용).
    fn environment(&self) -> KisEnvironment;

    /// 연속 조회 페이지 사이의 대기 시간.
    fn page_delay(&self) -> Duration {
        self.environment().page_delay()
    }
}

/// reqwest 기반 KIS REST 클라이언트.
///
/// `KisOAuth`를 `Arc`로 공유하여 같은 `app_key`의 토큰을 재사용합니다.
pub struct KisHttpClient {
    oauth: Arc<KisOAuth>,
    client: Client,
}

impl KisHttpClient {
    pub fn new(oauth: KisOAuth) -> KisResult<Self> {
        Self::with_shared_oauth(Arc::new(oauth))
    }

    /// 공유된 OAuth로 클라이언트 생성.
    pub fn with_shared_oauth(oauth: Arc<KisOAuth>) -> KisResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(oauth.config().timeout_secs))
            .build()
            .map_err(|e| KisError::NetworkError(format!("HTTP client 생성 실패: {}", e)))?;

        Ok(Self { oauth, client })
    }

    pub fn oauth(&self) -> &Arc<KisOAuth> {
        &self.oauth
    }
}

#[async_trait]
impl Fetch for KisHttpClient {
    async fn fetch(&self, request: &ApiRequest) -> KisResult<ApiResponse> {
        let url = format!("{}{}", self.oauth.config().rest_base_url(), request.path);

        let response = match request.method {
            Method::Get => {
                let headers = self
                    .oauth
                    .build_headers(&request.tr_id, &request.tr_cont, None)
                    .await?;
                let query: Vec<(&str, &str)> = request.params.iter().collect();
                debug!("GET {} tr_id={} params={:?}", request.path, request.tr_id, query);
                self.client.get(&url).headers(headers).query(&query).send().await?
            }
            Method::Post => {
                let body = request.params.to_json();
                let hashkey = if request.hashkey {
                    Some(self.oauth.generate_hashkey(&body).await?)
                } else {
                    None
                };
                let headers = self
                    .oauth
                    .build_headers(&request.tr_id, &request.tr_cont, hashkey.as_deref())
                    .await?;
                debug!("POST {} tr_id={} body={}", request.path, request.tr_id, body);
                self.client.post(&url).headers(headers).json(&body).send().await?
            }
        };

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let text = response.text().await?;

        debug!("KIS response [{}] {}: {}", request.tr_id, status, text);

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        let response = ApiResponse::new(status, headers, body);
        if is_token_rejected(response.status, response.error_code()) {
            self.oauth.invalidate_token().await;
        }
        Ok(response)
    }

    fn environment(&self) -> KisEnvironment {
        self.oauth.config().environment
    }

    fn page_delay(&self) -> Duration {
        self.oauth.config().page_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, tr_cont: &str, body: Value) -> ApiResponse {
        let mut headers = HashMap::new();
        headers.insert("TR_CONT".to_string(), tr_cont.to_string());
        ApiResponse::new(status, headers, body)
    }

    #[test]
    fn test_response_ok() {
        let resp = response(200, "M", json!({"rt_cd": "0", "msg_cd": "MCA00000", "msg1": "정상처리"}));
        assert!(resp.is_ok());
        assert_eq!(resp.tr_cont(), "M");
        assert_eq!(resp.header("tr_cont"), Some("M"));
    }

    #[test]
    fn test_response_error_fields() {
        let resp = response(200, "", json!({"rt_cd": "1", "msg_cd": "EGW00201", "msg1": "초당 거래건수를 초과하였습니다."}));
        assert!(!resp.is_ok());
        assert_eq!(resp.error_code(), "EGW00201");
        assert_eq!(resp.error_message(), "초당 거래건수를 초과하였습니다.");
    }

    #[test]
    fn test_http_failure_is_not_ok() {
        let resp = response(500, "", json!({"rt_cd": "0"}));
        assert!(!resp.is_ok());
    }

    #[test]
    fn test_output_tables() {
        let resp = response(
            200,
            "",
            json!({
                "rt_cd": "0",
                "output1": [{"pdno": "005930"}, {"pdno": "000660"}],
                "output2": {"dnca_tot_amt": "1000"}
            }),
        );
        assert_eq!(resp.output("output1").len(), 2);
        assert_eq!(resp.output("output2").get(0, "dnca_tot_amt"), Some("1000"));
        assert!(resp.output("output3").is_empty());
    }

    #[test]
    fn test_request_builders() {
        let req = ApiRequest::post("/uapi/x", "TTTC0802U", RequestParams::new())
            .with_hashkey(true)
            .with_tr_cont("N");
        assert_eq!(req.method, Method::Post);
        assert!(req.hashkey);
        assert_eq!(req.tr_cont, "N");
    }
}
