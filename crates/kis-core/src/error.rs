//! 핵심 에러 타입.
//!
//! 네트워크와 무관한 검증/파싱 단계의 에러를 정의합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 필수 파라미터 누락 (빈 문자열 포함)
    #[error("필수 파라미터 누락: {0}")]
    MissingParameter(String),

    /// 잘못된 파라미터 형식
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 파일 입출력 에러
    #[error("입출력 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 파싱/역직렬화 에러
    #[error("파싱 에러: {0}")]
    Parse(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// 요청 전 검증 단계에서 발생한 에러인지 확인합니다.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::MissingParameter(_) | CoreError::InvalidParameter(_)
        )
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Parse(err.to_string())
    }
}
