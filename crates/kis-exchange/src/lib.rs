//! 한국투자증권 Open API 연결.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - OAuth 토큰/해시 키/WebSocket 접속키 관리
//! - [`Fetch`](connector::kis::Fetch): 저수준 REST 호출 경계
//! - 데이터로 정의된 엔드포인트 카탈로그와 연속 조회 루프
//! - 실시간 WebSocket 구독, 체결통보 복호화

pub mod connector;
pub mod error;

pub use connector::kis::*;
pub use error::{KisError, KisResult};
