//! # KIS Core
//!
//! 한국투자증권 Open API 클라이언트의 네트워크 비의존 구성요소입니다.
//!
//! - [`table::Table`]: 응답 출력을 담는 문자열 표
//! - [`params::RequestParams`]: 대문자 키 파라미터 맵과 필수값 검증
//! - [`master`]: ELW/코넥스 고정폭 마스터 파일 파서
//! - [`logging`]: tracing 구독자 초기화
//! - [`error`]: 검증/파싱 에러

pub mod error;
pub mod logging;
pub mod master;
pub mod params;
pub mod table;

pub use error::{CoreError, CoreResult};
pub use master::{parse_master, parse_master_file, MasterLayout, ELW_LAYOUT, KONEX_LAYOUT};
pub use params::RequestParams;
pub use table::Table;
