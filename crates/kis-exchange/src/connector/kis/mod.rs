//! 한국투자증권 (KIS) 연동 모듈.
//!
//! # 기능
//!
//! - OAuth 2.0 인증 및 자동 토큰 갱신, 토큰 파일 캐시
//! - 엔드포인트 카탈로그 (국내주식, 해외주식, 선물옵션, 채권, ELW, ETF/ETN)
//! - 연속 조회 (`tr_cont` M/F + CTX_AREA 커서)
//! - WebSocket 실시간 시세/체결통보
//! - 모의투자 지원
//!
//! # API 문서
//!
//! 공식 API 문서: <https://apiportal.koreainvestment.com/>
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use kis_exchange::{catalog, call_endpoint, CallOptions, KisConfig, KisHttpClient, KisOAuth};
//! use kis_core::RequestParams;
//!
//! let config = KisConfig::from_env().expect("KIS_* 환경 변수");
//! let client = KisHttpClient::new(KisOAuth::new(config)?)?;
//!
//! let spec = catalog::find("domestic_stock/inquire-price").unwrap();
//! let params = RequestParams::new().with("FID_INPUT_ISCD", "005930");
//! let output = call_endpoint(&client, spec, params, &CallOptions::default()).await?;
//! ```

pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod crypto;
pub mod endpoint;
pub mod models;
pub mod realtime;
pub mod websocket;

pub use auth::{KisOAuth, TokenState};
pub use client::{ApiRequest, ApiResponse, Fetch, KisHttpClient, Method};
pub use config::{KisAccountType, KisConfig, KisEnvironment, KisFileConfig};
pub use crypto::decrypt_payload;
pub use endpoint::{
    call_endpoint, resolve_tr_id, CallOptions, Category, EndpointOutput, EndpointSpec, Paging,
    PaperTrId, DEFAULT_MAX_DEPTH,
};
pub use models::{
    KisKrQuotes, KrAccountSummary, KrBalance, KrHolding, KrOhlcv, KrStockPrice, UsStockPrice,
};
pub use realtime::{parse_frame, subscription_message, Frame, RealtimeSpec, MAX_SUBSCRIPTIONS};
pub use websocket::{
    FrameHandler, KisWebSocket, KisWebSocketHandle, RealtimeMessage, Subscription,
};
