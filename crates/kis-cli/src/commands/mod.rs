//! CLI 명령어 구현 모듈.

pub mod call;
pub mod endpoints;
pub mod master;
pub mod output;
pub mod stream;
pub mod token;

use anyhow::{anyhow, Result};
use kis_exchange::{KisAccountType, KisConfig};
use tracing::info;

/// 설정 파일 또는 환경 변수에서 KIS 설정을 읽습니다.
///
/// `--config`가 주어지면 파일을, 아니면 `.env`와 환경 변수를 사용합니다.
pub fn load_config(path: Option<&str>, paper: bool) -> Result<KisConfig> {
    let account_type = if paper {
        KisAccountType::Paper
    } else {
        KisAccountType::RealGeneral
    };

    let config = match path {
        Some(path) => {
            info!("설정 파일 로드: {}", path);
            KisConfig::from_file(path, account_type)?
        }
        None => {
            // .env 파일은 없어도 됨
            dotenvy::dotenv().ok();
            let config = if paper {
                KisConfig::from_env_for_account(account_type)
            } else {
                KisConfig::from_env()
            };
            let prefix = if paper { "KIS_PAPER" } else { "KIS_REAL_GENERAL" };
            config.ok_or_else(|| {
                anyhow!(
                    "KIS credentials not found. Use --config or set {}_APP_KEY / {}_APP_SECRET / {}_ACCOUNT_NUMBER",
                    prefix,
                    prefix,
                    prefix
                )
            })?
        }
    };

    info!(
        "KIS 계정: {} ({:?})",
        config.account_type.display_name(),
        config.environment
    );
    Ok(config)
}
