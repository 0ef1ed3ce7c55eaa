//! 접근 토큰 발급/폐기.

use anyhow::Result;
use kis_exchange::{KisConfig, KisOAuth};
use tracing::info;

/// 토큰 앞부분만 표시.
fn mask(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    format!("{}...", prefix)
}

/// 토큰을 발급(또는 캐시에서 재사용)하거나 폐기합니다.
pub async fn run_token(config: KisConfig, revoke: bool, approval: bool) -> Result<()> {
    let oauth = KisOAuth::new(config)?;

    if revoke {
        if oauth.get_cached_token().await.is_none() {
            println!("폐기할 토큰이 없습니다");
            return Ok(());
        }
        oauth.revoke_token().await?;
        println!("토큰 폐기 완료");
        return Ok(());
    }

    let token = oauth.get_token().await?;
    info!("토큰 만료 시각: {}", token.expires_at);
    println!("access_token: {}", mask(&token.access_token));
    println!("expires_at:   {}", token.expires_at);

    if approval {
        let key = oauth.get_websocket_key().await?;
        println!("approval_key: {}", mask(&key));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask("eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzUxMiJ9"), "eyJ0eXAi...");
        assert_eq!(mask("abc"), "abc...");
    }
}
