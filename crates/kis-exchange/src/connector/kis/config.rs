//! 한국투자증권 (KIS) API 설정.
//!
//! KIS API는 app_key와 app_secret을 사용한 OAuth 2.0 인증이 필요합니다.
//! 설정 출처:
//! - 환경 변수 (`KIS_PAPER_*`, `KIS_REAL_GENERAL_*`, `KIS_REAL_ISA_*`)
//! - `kis_devlp.yaml` 형식의 설정 파일 (`config` 크레이트, `KIS__*` 오버라이드)

use kis_core::RequestParams;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{KisError, KisResult};

/// 실전투자 페이지 간 대기 시간.
pub const REAL_PAGE_DELAY: Duration = Duration::from_millis(50);
/// 모의투자 페이지 간 대기 시간 (모의 서버는 초당 호출 제한이 더 낮음).
pub const PAPER_PAGE_DELAY: Duration = Duration::from_millis(500);

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// KIS API 환경 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KisEnvironment {
    /// 실전투자
    Real,
    /// 모의투자
    #[default]
    Paper,
}

impl KisEnvironment {
    /// 이 환경의 REST API 기본 URL 반환.
    pub fn rest_base_url(&self) -> &'static str {
        match self {
            KisEnvironment::Real => "https://openapi.koreainvestment.com:9443",
            KisEnvironment::Paper => "https://openapivts.koreainvestment.com:29443",
        }
    }

    /// 이 환경의 WebSocket URL 반환.
    pub fn websocket_url(&self) -> &'static str {
        match self {
            KisEnvironment::Real => "ws://ops.koreainvestment.com:21000",
            KisEnvironment::Paper => "ws://ops.koreainvestment.com:31000",
        }
    }

    /// 연속 조회 페이지 사이의 기본 대기 시간.
    pub fn page_delay(&self) -> Duration {
        match self {
            KisEnvironment::Real => REAL_PAGE_DELAY,
            KisEnvironment::Paper => PAPER_PAGE_DELAY,
        }
    }

    pub fn is_paper(&self) -> bool {
        matches!(self, KisEnvironment::Paper)
    }
}

/// KIS 계좌 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KisAccountType {
    /// 모의투자
    #[default]
    Paper,
    /// 실전투자 일반
    RealGeneral,
    /// 실전투자 ISA
    RealIsa,
}

impl KisAccountType {
    /// 이 계좌 유형의 환경 반환.
    pub fn environment(&self) -> KisEnvironment {
        match self {
            KisAccountType::Paper => KisEnvironment::Paper,
            KisAccountType::RealGeneral | KisAccountType::RealIsa => KisEnvironment::Real,
        }
    }

    /// 이 계좌 유형의 표시 이름 반환.
    pub fn display_name(&self) -> &'static str {
        match self {
            KisAccountType::Paper => "모의투자",
            KisAccountType::RealGeneral => "실전투자(일반)",
            KisAccountType::RealIsa => "실전투자(ISA)",
        }
    }

    /// 문자열에서 파싱.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "paper" | "mock" | "vps" | "demo" => Some(KisAccountType::Paper),
            "real_general" | "general" | "real" | "prod" => Some(KisAccountType::RealGeneral),
            "real_isa" | "isa" => Some(KisAccountType::RealIsa),
            _ => None,
        }
    }
}

/// KIS API 설정.
#[derive(Debug, Clone)]
pub struct KisConfig {
    /// 앱키
    pub app_key: String,
    /// 앱시크릿
    pub app_secret: SecretString,
    /// 계좌번호 - 형식: "XXXXXXXX-XX" 또는 "XXXXXXXX"
    pub account_no: String,
    /// 계좌상품코드 - 주식의 경우 일반적으로 "01"
    pub account_product_code: String,
    /// 계좌 유형 (모의투자/실전일반/실전ISA)
    pub account_type: KisAccountType,
    /// 환경 (실전/모의) - account_type에서 파생
    pub environment: KisEnvironment,
    /// HTS ID (체결통보 실시간 구독에 필요)
    pub hts_id: Option<String>,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 개인 고객 여부 (custtype 헤더)
    pub personalized: bool,
    /// REST 기본 URL 재정의 (프록시/테스트 서버)
    pub rest_url: Option<String>,
    /// WebSocket URL 재정의
    pub websocket_url: Option<String>,
    /// 연속 조회 페이지 간 대기 시간
    pub page_delay: Duration,
    /// User-Agent 헤더
    pub user_agent: String,
    /// 접근 토큰 파일 캐시 경로
    pub token_cache_path: Option<PathBuf>,
}

impl KisConfig {
    /// 새로운 KIS 설정 생성.
    pub fn new(
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
        account_no: impl Into<String>,
        account_type: KisAccountType,
    ) -> Self {
        let environment = account_type.environment();
        Self {
            app_key: app_key.into(),
            app_secret: SecretString::new(app_secret.into().into_boxed_str()),
            account_no: account_no.into(),
            account_product_code: "01".to_string(),
            account_type,
            environment,
            hts_id: None,
            timeout_secs: 30,
            personalized: true,
            rest_url: None,
            websocket_url: None,
            page_delay: environment.page_delay(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token_cache_path: None,
        }
    }

    /// 계좌 유형 설정 및 환경 자동 업데이트.
    pub fn with_account_type(mut self, account_type: KisAccountType) -> Self {
        self.account_type = account_type;
        self.with_environment(account_type.environment())
    }

    /// 환경 직접 설정. 페이지 대기 시간도 환경 기본값으로 맞춥니다.
    pub fn with_environment(mut self, env: KisEnvironment) -> Self {
        self.environment = env;
        self.page_delay = env.page_delay();
        self
    }

    /// 계좌상품코드 설정.
    pub fn with_product_code(mut self, code: impl Into<String>) -> Self {
        self.account_product_code = code.into();
        self
    }

    /// HTS ID 설정.
    pub fn with_hts_id(mut self, hts_id: impl Into<String>) -> Self {
        self.hts_id = Some(hts_id.into());
        self
    }

    pub fn with_personalized(mut self, enabled: bool) -> Self {
        self.personalized = enabled;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// REST 기본 URL 재정의.
    pub fn with_rest_url(mut self, url: impl Into<String>) -> Self {
        self.rest_url = Some(url.into());
        self
    }

    /// WebSocket URL 재정의.
    pub fn with_websocket_url(mut self, url: impl Into<String>) -> Self {
        self.websocket_url = Some(url.into());
        self
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// 접근 토큰을 파일에 캐시 (프로세스 간 재사용).
    pub fn with_token_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_cache_path = Some(path.into());
        self
    }

    /// 환경 변수에서 특정 계좌 유형의 설정 생성.
    ///
    /// # 환경 변수
    /// - Paper: KIS_PAPER_APP_KEY, KIS_PAPER_APP_SECRET, KIS_PAPER_ACCOUNT_NUMBER, KIS_PAPER_ACCOUNT_CODE
    /// - RealGeneral: KIS_REAL_GENERAL_APP_KEY, KIS_REAL_GENERAL_APP_SECRET 등
    /// - RealIsa: KIS_REAL_ISA_APP_KEY, KIS_REAL_ISA_APP_SECRET 등
    /// - 공통: KIS_HTS_ID, KIS_TOKEN_CACHE
    pub fn from_env_for_account(account_type: KisAccountType) -> Option<Self> {
        let prefix = match account_type {
            KisAccountType::Paper => "KIS_PAPER",
            KisAccountType::RealGeneral => "KIS_REAL_GENERAL",
            KisAccountType::RealIsa => "KIS_REAL_ISA",
        };

        let app_key = std::env::var(format!("{}_APP_KEY", prefix)).ok()?;
        let app_secret = std::env::var(format!("{}_APP_SECRET", prefix)).ok()?;
        let account_no = std::env::var(format!("{}_ACCOUNT_NUMBER", prefix)).ok()?;
        let product_code = std::env::var(format!("{}_ACCOUNT_CODE", prefix))
            .unwrap_or_else(|_| "01".to_string());

        let mut config = Self::new(app_key, app_secret, account_no, account_type)
            .with_product_code(product_code);
        if let Ok(hts_id) = std::env::var("KIS_HTS_ID") {
            config = config.with_hts_id(hts_id);
        }
        if let Ok(path) = std::env::var("KIS_TOKEN_CACHE") {
            config = config.with_token_cache(path);
        }
        Some(config)
    }

    /// KIS_DEFAULT_ACCOUNT 환경 변수를 사용하여 설정 생성.
    ///
    /// - KIS_DEFAULT_ACCOUNT: "paper" | "real_general" | "real_isa" (기본값: paper)
    pub fn from_env() -> Option<Self> {
        let default_account = std::env::var("KIS_DEFAULT_ACCOUNT")
            .ok()
            .and_then(|s| KisAccountType::parse(&s))
            .unwrap_or(KisAccountType::Paper);

        Self::from_env_for_account(default_account)
    }

    /// 설정 파일(YAML/TOML)에서 로드.
    ///
    /// 키 이름은 `kis_devlp.yaml`을 따릅니다 (`my_app`, `my_sec`, `paper_app`, ...).
    /// `KIS__MY_APP` 같은 환경 변수가 파일 값을 덮어씁니다.
    pub fn from_file(path: impl AsRef<Path>, account_type: KisAccountType) -> KisResult<Self> {
        let file: KisFileConfig = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()))
            // 계좌번호/상품코드의 앞자리 0을 지키기 위해 문자열 그대로 읽습니다.
            .add_source(::config::Environment::with_prefix("KIS").separator("__"))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| KisError::Config(format!("{}: {}", path.as_ref().display(), e)))?;

        file.into_config(account_type)
    }

    /// REST API 기본 URL 반환.
    pub fn rest_base_url(&self) -> &str {
        self.rest_url
            .as_deref()
            .unwrap_or_else(|| self.environment.rest_base_url())
    }

    /// WebSocket URL 반환.
    pub fn websocket_url(&self) -> &str {
        self.websocket_url
            .as_deref()
            .unwrap_or_else(|| self.environment.websocket_url())
    }

    /// 앱시크릿 원문 (헤더/토큰 요청에만 사용).
    pub fn app_secret(&self) -> &str {
        self.app_secret.expose_secret()
    }

    /// 하이픈 없는 계좌번호 반환.
    pub fn account_no_plain(&self) -> String {
        self.account_no.replace('-', "")
    }

    /// 계좌번호 앞 8자리 반환 (CANO).
    pub fn cano(&self) -> String {
        self.account_no_plain().chars().take(8).collect()
    }

    /// 계좌상품코드 반환 (ACNT_PRDT_CD).
    pub fn acnt_prdt_cd(&self) -> &str {
        &self.account_product_code
    }

    /// 계좌 파라미터 (CANO, ACNT_PRDT_CD).
    pub fn account_params(&self) -> RequestParams {
        RequestParams::new()
            .with("CANO", self.cano())
            .with("ACNT_PRDT_CD", self.acnt_prdt_cd())
    }
}

/// `kis_devlp.yaml` 파일 구조.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KisFileConfig {
    /// 실전 앱키
    pub my_app: String,
    /// 실전 앱시크릿
    pub my_sec: String,
    /// 모의 앱키
    pub paper_app: String,
    /// 모의 앱시크릿
    pub paper_sec: String,
    /// HTS ID
    pub my_htsid: Option<String>,
    /// 실전 주식 계좌 (8자리)
    pub my_acct_stock: String,
    /// 모의 주식 계좌 (8자리)
    pub my_paper_stock: String,
    /// 계좌상품코드
    pub my_prod: Option<String>,
    /// User-Agent
    pub my_agent: Option<String>,
    /// REST URL 재정의
    pub rest_url: Option<String>,
    /// WebSocket URL 재정의
    pub websocket_url: Option<String>,
    /// 토큰 캐시 파일
    pub token_cache: Option<PathBuf>,
}

impl KisFileConfig {
    /// 계좌 유형에 맞는 키/계좌를 골라 [`KisConfig`]로 변환.
    pub fn into_config(self, account_type: KisAccountType) -> KisResult<KisConfig> {
        let (app, sec, account) = match account_type.environment() {
            KisEnvironment::Real => (self.my_app, self.my_sec, self.my_acct_stock),
            KisEnvironment::Paper => (self.paper_app, self.paper_sec, self.my_paper_stock),
        };

        if app.trim().is_empty() || sec.trim().is_empty() {
            return Err(KisError::Config(format!(
                "{} 앱키/앱시크릿이 설정 파일에 없습니다",
                account_type.display_name()
            )));
        }

        let mut config = KisConfig::new(app, sec, account, account_type);
        if let Some(prod) = self.my_prod {
            config = config.with_product_code(prod);
        }
        if let Some(hts_id) = self.my_htsid {
            config = config.with_hts_id(hts_id);
        }
        if let Some(agent) = self.my_agent {
            config = config.with_user_agent(agent);
        }
        if let Some(url) = self.rest_url {
            config = config.with_rest_url(url);
        }
        if let Some(url) = self.websocket_url {
            config = config.with_websocket_url(url);
        }
        if let Some(path) = self.token_cache {
            config = config.with_token_cache(path);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = KisConfig::new("test_key", "test_secret", "12345678-01", KisAccountType::Paper);

        assert_eq!(config.app_key, "test_key");
        assert_eq!(config.app_secret(), "test_secret");
        assert_eq!(config.environment, KisEnvironment::Paper);
        assert_eq!(config.account_product_code, "01");
        assert_eq!(config.page_delay, PAPER_PAGE_DELAY);
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let config = KisConfig::new("key", "very-secret-value", "12345678", KisAccountType::Paper);
        assert!(!format!("{:?}", config).contains("very-secret-value"));
    }

    #[test]
    fn test_account_types() {
        assert_eq!(KisAccountType::Paper.environment(), KisEnvironment::Paper);
        assert_eq!(KisAccountType::RealGeneral.environment(), KisEnvironment::Real);
        assert_eq!(KisAccountType::RealIsa.environment(), KisEnvironment::Real);
        assert_eq!(KisAccountType::RealIsa.display_name(), "실전투자(ISA)");
    }

    #[test]
    fn test_account_type_parsing() {
        assert_eq!(KisAccountType::parse("paper"), Some(KisAccountType::Paper));
        assert_eq!(KisAccountType::parse("vps"), Some(KisAccountType::Paper));
        assert_eq!(KisAccountType::parse("prod"), Some(KisAccountType::RealGeneral));
        assert_eq!(KisAccountType::parse("ISA"), Some(KisAccountType::RealIsa));
        assert_eq!(KisAccountType::parse("invalid"), None);
    }

    #[test]
    fn test_environment_urls_and_delay() {
        assert_eq!(
            KisEnvironment::Real.rest_base_url(),
            "https://openapi.koreainvestment.com:9443"
        );
        assert_eq!(
            KisEnvironment::Paper.websocket_url(),
            "ws://ops.koreainvestment.com:31000"
        );
        assert_eq!(KisEnvironment::Real.page_delay(), Duration::from_millis(50));
    }

    #[test]
    fn test_url_override() {
        let config = KisConfig::new("k", "s", "12345678", KisAccountType::RealGeneral)
            .with_rest_url("http://127.0.0.1:1234");
        assert_eq!(config.rest_base_url(), "http://127.0.0.1:1234");
        assert_eq!(config.websocket_url(), "ws://ops.koreainvestment.com:21000");
    }

    #[test]
    fn test_account_params() {
        let config = KisConfig::new("key", "secret", "12345678-01", KisAccountType::RealGeneral);

        assert_eq!(config.account_no_plain(), "1234567801");
        assert_eq!(config.cano(), "12345678");

        let params = config.account_params();
        assert_eq!(params.get("CANO"), Some("12345678"));
        assert_eq!(params.get("ACNT_PRDT_CD"), Some("01"));
    }

    #[test]
    fn test_file_config_selects_environment() {
        let file = KisFileConfig {
            my_app: "real-app".into(),
            my_sec: "real-sec".into(),
            paper_app: "paper-app".into(),
            paper_sec: "paper-sec".into(),
            my_acct_stock: "11111111".into(),
            my_paper_stock: "22222222".into(),
            my_prod: Some("22".into()),
            ..Default::default()
        };

        let paper = file.clone().into_config(KisAccountType::Paper).unwrap();
        assert_eq!(paper.app_key, "paper-app");
        assert_eq!(paper.cano(), "22222222");
        assert_eq!(paper.acnt_prdt_cd(), "22");

        let real = file.into_config(KisAccountType::RealGeneral).unwrap();
        assert_eq!(real.app_secret(), "real-sec");
        assert_eq!(real.environment, KisEnvironment::Real);
    }

    #[test]
    fn test_file_config_missing_keys() {
        let err = KisFileConfig::default()
            .into_config(KisAccountType::Paper)
            .unwrap_err();
        assert!(matches!(err, KisError::Config(_)));
    }

    #[test]
    fn test_from_file_yaml() {
        let path = std::env::temp_dir().join(format!("kis_devlp_{}.yaml", std::process::id()));
        std::fs::write(
            &path,
            "my_app: \"real-app\"\nmy_sec: \"real-sec\"\nmy_acct_stock: \"12345678\"\nmy_prod: \"01\"\n",
        )
        .unwrap();

        let config = KisConfig::from_file(&path, KisAccountType::RealGeneral).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.app_key, "real-app");
        assert_eq!(config.cano(), "12345678");
    }

    #[test]
    fn test_env_override_keeps_leading_zeros() {
        let path = std::env::temp_dir().join(format!("kis_paper_{}.yaml", std::process::id()));
        std::fs::write(
            &path,
            "paper_app: \"paper-app\"\npaper_sec: \"paper-sec\"\nmy_paper_stock: \"99999999\"\nmy_prod: \"01\"\n",
        )
        .unwrap();
        std::env::set_var("KIS__MY_PAPER_STOCK", "01234567");
        std::env::set_var("KIS__MY_PROD", "01");

        let config = KisConfig::from_file(&path, KisAccountType::Paper);
        std::env::remove_var("KIS__MY_PAPER_STOCK");
        std::env::remove_var("KIS__MY_PROD");
        std::fs::remove_file(&path).ok();
        let config = config.unwrap();

        assert_eq!(config.cano(), "01234567");
        assert_eq!(config.acnt_prdt_cd(), "01");
    }
}
