//! KIS 클라이언트 에러 타입.

use kis_core::CoreError;
use thiserror::Error;

/// KIS API 호출 관련 에러.
#[derive(Debug, Error)]
pub enum KisError {
    /// 필수 파라미터 누락 (네트워크 호출 전 검증)
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// 잘못된 입력
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 설정 에러
    #[error("Config error: {0}")]
    Config(String),

    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 인증/권한 에러
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 브로커가 반환한 API 에러 (msg_cd, msg1)
    #[error("API error {code}: {message}")]
    ApiError { code: String, message: String },

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 실시간 메시지 복호화 에러
    #[error("Decrypt error: {0}")]
    Decrypt(String),

    /// WebSocket 에러
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 모의투자에서 지원하지 않는 엔드포인트
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// 파일 입출력
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// KIS 작업을 위한 Result 타입.
pub type KisResult<T> = Result<T, KisError>;

impl KisError {
    /// 요청 전 검증 실패인지 확인.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            KisError::MissingParameter(_) | KisError::InvalidInput(_)
        )
    }

    /// 인증 에러인지 확인.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, KisError::Unauthorized(_))
    }
}

impl From<CoreError> for KisError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MissingParameter(name) => KisError::MissingParameter(name),
            CoreError::InvalidParameter(msg) => KisError::InvalidInput(msg),
            CoreError::Io(e) => KisError::Io(e),
            CoreError::Parse(msg) => KisError::ParseError(msg),
        }
    }
}

impl From<reqwest::Error> for KisError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            KisError::Timeout(err.to_string())
        } else {
            KisError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for KisError {
    fn from(err: serde_json::Error) -> Self {
        KisError::ParseError(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for KisError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        KisError::WebSocket(err.to_string())
    }
}
