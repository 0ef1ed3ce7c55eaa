//! KIS Open API CLI 도구 모음.
//!
//! - 엔드포인트 목록 조회와 호출
//! - 실시간 시세 구독
//! - ELW/코넥스 마스터 파일 변환
//! - 접근 토큰 발급/폐기

pub mod commands;
