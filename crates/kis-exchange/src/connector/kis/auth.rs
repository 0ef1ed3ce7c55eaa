//! KIS OAuth 2.0 인증 모듈.
//!
//! 처리 기능:
//! - 접근 토큰 발급 및 갱신 (POST /oauth2/tokenP)
//! - 토큰 폐기 (POST /oauth2/revokeP)
//! - 해시 키 생성 (POST /uapi/hashkey)
//! - WebSocket 접속 키 (POST /oauth2/Approval)
//! - 토큰 파일 캐시 (프로세스 간 재사용)

use super::config::{KisConfig, KisEnvironment};
use crate::error::{KisError, KisResult};
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// 토큰 갱신 임계값 (남은 시간이 이 값보다 적으면 갱신).
const TOKEN_REFRESH_THRESHOLD_HOURS: i64 = 1;

/// 토큰 캐시에 기록하는 앱키 앞부분 길이.
const APP_KEY_PREFIX_LEN: usize = 8;

/// 토큰이 만료되었거나 유효하지 않을 때 KIS가 돌려주는 `msg_cd`.
const TOKEN_REJECTED_CODES: &[&str] = &["EGW00121", "EGW00123"];

/// 응답이 접근 토큰 거부를 뜻하는지 확인.
pub fn is_token_rejected(status: u16, msg_cd: &str) -> bool {
    status == 401 || TOKEN_REJECTED_CODES.contains(&msg_cd)
}

/// KIS OAuth 토큰 응답.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
    /// 토큰 만료 시간 (초)
    pub expires_in: i64,
    /// 접근 토큰 만료 시각 (KIS 형식: "YYYY-MM-DD HH:MM:SS", KST)
    #[serde(default)]
    pub access_token_token_expired: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
struct HashkeyResponse {
    hash: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ApprovalResponse {
    approval_key: String,
}

/// KIS API 오류 응답.
#[derive(Debug, Clone, Deserialize)]
struct KisErrorResponse {
    msg_cd: String,
    msg1: String,
}

/// KIS OAuth 오류 응답 (토큰 발급 실패 시).
#[derive(Debug, Clone, Deserialize)]
struct KisOAuthErrorResponse {
    /// 에러 코드 (예: "EGW00103")
    error_code: String,
    error_description: String,
}

/// 만료 추적이 포함된 토큰 상태.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenState {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    /// 발급에 사용한 앱키 앞부분
    #[serde(default)]
    pub app_key_prefix: String,
    /// 발급 환경 (실전/모의)
    #[serde(default)]
    pub environment: Option<KisEnvironment>,
}

impl TokenState {
    pub fn new(access_token: String, token_type: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token,
            token_type,
            expires_at,
            app_key_prefix: String::new(),
            environment: None,
        }
    }

    /// 발급 주체(앱키/환경) 기록.
    pub fn issued_for(mut self, config: &KisConfig) -> Self {
        self.app_key_prefix = key_prefix(&config.app_key);
        self.environment = Some(config.environment);
        self
    }

    /// 같은 앱키와 환경에서 발급된 토큰인지 확인.
    pub fn matches(&self, config: &KisConfig) -> bool {
        self.environment == Some(config.environment)
            && self.app_key_prefix == key_prefix(&config.app_key)
    }

    /// 토큰이 만료되었거나 곧 만료되는지 확인.
    pub fn is_expired_or_expiring(&self) -> bool {
        let threshold = Utc::now() + Duration::hours(TOKEN_REFRESH_THRESHOLD_HOURS);
        self.expires_at <= threshold
    }

    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now()
    }

    /// 인증 헤더 값 반환.
    pub fn auth_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// 파일에서 토큰 로드. 파일이 없거나 깨졌으면 `None`.
    pub fn load(path: &Path) -> Option<Self> {
        let text = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str::<TokenState>(&text) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("토큰 캐시 파일 파싱 실패 ({}): {}", path.display(), e);
                None
            }
        }
    }

    /// 파일에 토큰 저장.
    pub fn save(&self, path: &Path) -> KisResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// KIS OAuth 인증 관리자.
///
/// 토큰 발급은 1분에 1회로 제한되므로 `Arc`로 공유해서 사용합니다.
pub struct KisOAuth {
    config: KisConfig,
    client: Client,
    token: Arc<RwLock<Option<TokenState>>>,
    websocket_key: Arc<RwLock<Option<String>>>,
}

impl KisOAuth {
    /// 새로운 OAuth 관리자 생성.
    ///
    /// 토큰 캐시 경로가 설정되어 있고 유효한 토큰이 저장되어 있으면 불러옵니다.
    pub fn new(config: KisConfig) -> KisResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KisError::NetworkError(format!("HTTP client 생성 실패: {}", e)))?;

        let cached = config
            .token_cache_path
            .as_deref()
            .and_then(TokenState::load)
            .filter(|t| {
                if !t.matches(&config) {
                    warn!(
                        "토큰 캐시가 다른 앱키/환경에서 발급되었습니다 (AppKey: {}..., 환경: {:?}), 무시합니다",
                        t.app_key_prefix, t.environment
                    );
                    return false;
                }
                !t.is_expired_or_expiring()
            });
        if let Some(ref token) = cached {
            info!("Loaded cached KIS token (expires at: {})", token.expires_at);
        }

        Ok(Self {
            config,
            client,
            token: Arc::new(RwLock::new(cached)),
            websocket_key: Arc::new(RwLock::new(None)),
        })
    }

    /// 현재 캐시된 토큰 반환 (API 호출 없이).
    pub async fn get_cached_token(&self) -> Option<TokenState> {
        self.token.read().await.clone()
    }

    /// 유효한 접근 토큰 반환, 필요시 갱신.
    pub async fn get_token(&self) -> KisResult<TokenState> {
        {
            let token_guard = self.token.read().await;
            match *token_guard {
                Some(ref token) if !token.is_expired_or_expiring() => {
                    debug!("Using cached KIS token (expires at: {})", token.expires_at);
                    return Ok(token.clone());
                }
                Some(ref token) => warn!(
                    "KIS token expired or expiring soon (expires at: {}), refreshing...",
                    token.expires_at
                ),
                None => info!("No cached KIS token found, requesting new token..."),
            }
        }

        self.refresh_token().await
    }

    /// 접근 토큰 강제 갱신.
    pub async fn refresh_token(&self) -> KisResult<TokenState> {
        self.validate_credentials()?;

        info!(
            "Requesting new KIS access token... (AppKey: {}...)",
            self.app_key_prefix()
        );

        let url = format!("{}/oauth2/tokenP", self.config.rest_base_url());

        #[derive(Serialize)]
        struct TokenRequest<'a> {
            grant_type: &'a str,
            appkey: &'a str,
            appsecret: &'a str,
        }

        let request_body = TokenRequest {
            grant_type: "client_credentials",
            appkey: &self.config.app_key,
            appsecret: self.config.app_secret(),
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json; charset=utf-8")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Token request failed: {} - {}", status, body);
            return Err(self.token_error(&body));
        }

        let token_resp: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| KisError::ParseError(format!("Failed to parse token response: {}", e)))?;

        let expires_at = parse_kis_datetime(&token_resp.access_token_token_expired)
            .unwrap_or_else(|| Utc::now() + Duration::seconds(token_resp.expires_in));

        let token_state = TokenState::new(token_resp.access_token, token_resp.token_type, expires_at)
            .issued_for(&self.config);

        *self.token.write().await = Some(token_state.clone());

        if let Some(path) = self.config.token_cache_path.as_deref() {
            if let Err(e) = token_state.save(path) {
                warn!("토큰 캐시 저장 실패 ({}): {}", path.display(), e);
            }
        }

        info!("KIS access token obtained, expires at: {}", token_state.expires_at);

        Ok(token_state)
    }

    /// 현재 접근 토큰 폐기.
    pub async fn revoke_token(&self) -> KisResult<()> {
        let token = match self.token.read().await.as_ref() {
            Some(t) => t.access_token.clone(),
            None => return Ok(()),
        };

        info!("Revoking KIS access token...");

        let url = format!("{}/oauth2/revokeP", self.config.rest_base_url());
        let request_body = serde_json::json!({
            "appkey": self.config.app_key,
            "appsecret": self.config.app_secret(),
            "token": token,
        });

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json; charset=utf-8")
            .json(&request_body)
            .send()
            .await?;

        if response.status().is_success() {
            info!("KIS access token revoked successfully");
        } else {
            warn!("Token revocation may have failed, clearing local state anyway");
        }

        *self.token.write().await = None;
        self.remove_cache_file()
    }

    /// 서버가 거부한 토큰을 메모리와 캐시 파일에서 제거.
    ///
    /// 다음 호출은 새 토큰을 발급받습니다.
    pub async fn invalidate_token(&self) {
        if self.token.write().await.take().is_some() {
            warn!("KIS access token rejected by server, discarding cached token");
        }
        if let Err(e) = self.remove_cache_file() {
            warn!("토큰 캐시 파일 삭제 실패: {}", e);
        }
    }

    fn remove_cache_file(&self) -> KisResult<()> {
        if let Some(path) = self.config.token_cache_path.as_deref() {
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    /// POST 요청 본문에 대한 해시 키 생성.
    ///
    /// 주문 같은 일부 POST 엔드포인트에 필요합니다. 토큰 없이 appkey/appsecret만 사용합니다.
    pub async fn generate_hashkey(&self, body: &serde_json::Value) -> KisResult<String> {
        let url = format!("{}/uapi/hashkey", self.config.rest_base_url());

        debug!("Generating hashkey for body: {}", body);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json; charset=utf-8")
            .header("appkey", &self.config.app_key)
            .header("appsecret", self.config.app_secret())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let response_body = response.text().await?;

        if !status.is_success() {
            error!("Hashkey generation failed: {} - {}", status, response_body);
            return Err(KisError::ApiError {
                code: status.as_u16().to_string(),
                message: response_body,
            });
        }

        let hashkey_resp: HashkeyResponse = serde_json::from_str(&response_body)
            .map_err(|e| KisError::ParseError(format!("Failed to parse hashkey response: {}", e)))?;

        Ok(hashkey_resp.hash)
    }

    /// WebSocket 접속 키 획득.
    pub async fn get_websocket_key(&self) -> KisResult<String> {
        if let Some(key) = self.websocket_key.read().await.clone() {
            return Ok(key);
        }

        info!("Requesting WebSocket approval key...");

        let url = format!("{}/oauth2/Approval", self.config.rest_base_url());
        let request_body = serde_json::json!({
            "grant_type": "client_credentials",
            "appkey": self.config.app_key,
            "secretkey": self.config.app_secret(),
        });

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json; charset=utf-8")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("WebSocket approval failed: {} - {}", status, body);
            return Err(KisError::ApiError {
                code: status.as_u16().to_string(),
                message: body,
            });
        }

        let approval_resp: ApprovalResponse = serde_json::from_str(&body)
            .map_err(|e| KisError::ParseError(format!("Failed to parse approval response: {}", e)))?;

        *self.websocket_key.write().await = Some(approval_resp.approval_key.clone());
        info!("WebSocket approval key obtained");

        Ok(approval_resp.approval_key)
    }

    /// WebSocket 키 초기화 (재연결 시 호출).
    pub async fn clear_websocket_key(&self) {
        *self.websocket_key.write().await = None;
    }

    /// 인증된 요청을 위한 공통 헤더 생성.
    ///
    /// `tr_cont`는 연속 조회 여부 ("" = 첫 페이지, "N" = 다음 페이지)입니다.
    pub async fn build_headers(
        &self,
        tr_id: &str,
        tr_cont: &str,
        hashkey: Option<&str>,
    ) -> KisResult<HeaderMap> {
        let token = self.get_token().await?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        headers.insert("authorization", header_value("authorization", &token.auth_header())?);
        headers.insert("appkey", header_value("appkey", &self.config.app_key)?);
        headers.insert("appsecret", header_value("appsecret", self.config.app_secret())?);
        headers.insert("tr_id", header_value("tr_id", tr_id)?);
        headers.insert("tr_cont", header_value("tr_cont", tr_cont)?);
        headers.insert("user-agent", header_value("user-agent", &self.config.user_agent)?);

        if let Some(hash) = hashkey {
            headers.insert("hashkey", header_value("hashkey", hash)?);
        }

        // P = 개인, B = 법인
        let custtype = if self.config.personalized { "P" } else { "B" };
        headers.insert("custtype", HeaderValue::from_static(custtype));

        Ok(headers)
    }

    pub fn config(&self) -> &KisConfig {
        &self.config
    }

    fn app_key_prefix(&self) -> String {
        key_prefix(&self.config.app_key)
    }

    /// AppKey/AppSecret 길이 검증.
    fn validate_credentials(&self) -> KisResult<()> {
        if self.config.app_key.len() < 20 {
            error!(
                "유효하지 않은 AppKey: '{}' (길이: {})",
                self.app_key_prefix(),
                self.config.app_key.len()
            );
            return Err(KisError::Unauthorized(
                "AppKey가 올바르게 설정되지 않았습니다. 한국투자증권에서 발급받은 AppKey를 설정하세요."
                    .to_string(),
            ));
        }

        if self.config.app_secret().len() < 20 {
            error!("유효하지 않은 AppSecret (길이: {})", self.config.app_secret().len());
            return Err(KisError::Unauthorized(
                "AppSecret이 올바르게 설정되지 않았습니다.".to_string(),
            ));
        }
        Ok(())
    }

    /// 토큰 발급 실패 응답을 에러로 변환.
    fn token_error(&self, body: &str) -> KisError {
        if let Ok(oauth_error) = serde_json::from_str::<KisOAuthErrorResponse>(body) {
            let error_msg = match oauth_error.error_code.as_str() {
                "EGW00103" => format!(
                    "유효하지 않은 AppKey입니다. AppKey: {}...",
                    self.app_key_prefix()
                ),
                "EGW00102" => "AppKey가 만료되었습니다. 한국투자증권에서 새 AppKey를 발급받으세요.".to_string(),
                "EGW00101" => "AppSecret이 일치하지 않습니다.".to_string(),
                _ => format!("{} ({})", oauth_error.error_description, oauth_error.error_code),
            };
            error!("KIS OAuth 에러: {}", error_msg);
            return KisError::Unauthorized(error_msg);
        }

        if let Ok(error_resp) = serde_json::from_str::<KisErrorResponse>(body) {
            return KisError::ApiError {
                code: error_resp.msg_cd,
                message: error_resp.msg1,
            };
        }

        KisError::Unauthorized(format!("Token request failed: {}", body))
    }
}

fn key_prefix(app_key: &str) -> String {
    app_key.chars().take(APP_KEY_PREFIX_LEN).collect()
}

fn header_value(name: &str, value: &str) -> KisResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| KisError::ParseError(format!("{} 헤더에 유효하지 않은 문자 포함", name)))
}

/// KIS 날짜시간 형식 파싱 ("YYYY-MM-DD HH:MM:SS", KST).
fn parse_kis_datetime(s: &str) -> Option<DateTime<Utc>> {
    use chrono::{NaiveDateTime, TimeZone};
    use chrono_tz::Asia::Seoul;

    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok()?;
    let kst = Seoul.from_local_datetime(&naive).single()?;
    Some(kst.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn token(expires_in: Duration) -> TokenState {
        TokenState::new("abc123".into(), "Bearer".into(), Utc::now() + expires_in)
    }

    #[test]
    fn test_token_state_expiry() {
        let token = token(Duration::hours(24));
        assert!(token.is_valid());
        assert!(!token.is_expired_or_expiring());
        assert_eq!(token.auth_header(), "Bearer abc123");
    }

    #[test]
    fn test_token_state_expiring() {
        let token = token(Duration::minutes(30));
        assert!(token.is_valid());
        assert!(token.is_expired_or_expiring());
    }

    #[test]
    fn test_parse_kis_datetime() {
        let dt = parse_kis_datetime("2026-01-28 15:30:00").unwrap();
        // KST 15:30 = UTC 06:30
        assert_eq!(dt.hour(), 6);
        assert_eq!(dt.minute(), 30);
        assert!(parse_kis_datetime("garbage").is_none());
    }

    #[test]
    fn test_token_file_roundtrip() {
        let path = std::env::temp_dir()
            .join(format!("kis_token_{}", std::process::id()))
            .join("token.json");
        let original = token(Duration::hours(12));
        original.save(&path).unwrap();

        let loaded = TokenState::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.access_token, original.access_token);
        assert_eq!(loaded.expires_at, original.expires_at);
    }

    #[test]
    fn test_token_issuer_matching() {
        let real = KisConfig::new(
            "PSrealkeyabcdefghijklmnop",
            "secret",
            "12345678",
            crate::KisAccountType::RealGeneral,
        );
        let paper = KisConfig::new(
            "PSrealkeyabcdefghijklmnop",
            "secret",
            "12345678",
            crate::KisAccountType::Paper,
        );
        let other = KisConfig::new(
            "PSotherkeyabcdefghijklmn",
            "secret",
            "12345678",
            crate::KisAccountType::RealGeneral,
        );

        let issued = token(Duration::hours(12)).issued_for(&real);
        assert_eq!(issued.app_key_prefix, "PSrealke");
        assert!(issued.matches(&real));
        assert!(!issued.matches(&paper));
        assert!(!issued.matches(&other));

        // 발급 주체가 기록되지 않은 예전 캐시 파일
        assert!(!token(Duration::hours(12)).matches(&real));
    }

    #[test]
    fn test_token_rejected_codes() {
        assert!(is_token_rejected(500, "EGW00123"));
        assert!(is_token_rejected(200, "EGW00121"));
        assert!(is_token_rejected(401, ""));
        assert!(!is_token_rejected(500, "EGW00201"));
    }

    #[test]
    fn test_token_file_missing() {
        assert!(TokenState::load(Path::new("/nonexistent/kis/token.json")).is_none());
    }
}
