//! 실시간 시세 구독 출력.

use super::output::{render, OutputFormat};
use anyhow::{anyhow, Result};
use kis_exchange::{realtime, KisConfig, KisOAuth, KisWebSocket, RealtimeMessage};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 구독 설정.
#[derive(Debug)]
pub struct StreamConfig {
    /// 실시간 카탈로그 이름 (예: domestic-trade)
    pub name: String,
    pub tr_keys: Vec<String>,
    pub format: OutputFormat,
    pub renames: Vec<(String, String)>,
    /// 수신할 데이터 메시지 수 (0 = Ctrl-C까지)
    pub limit: usize,
}

/// 구독 후 데이터 메시지를 출력합니다. 출력한 메시지 수를 반환합니다.
pub async fn run_stream(config: KisConfig, stream: StreamConfig) -> Result<usize> {
    let spec = realtime::find(&stream.name).ok_or_else(|| {
        let names: Vec<&str> = realtime::REALTIME_SPECS.iter().map(|s| s.name).collect();
        anyhow!(
            "Unknown realtime feed: {}. Supported: {}",
            stream.name,
            names.join(", ")
        )
    })?;

    let mut ws = KisWebSocket::new(Arc::new(KisOAuth::new(config)?));
    for tr_key in &stream.tr_keys {
        ws.subscribe(spec, tr_key)?;
    }

    let mut rx = ws
        .take_receiver()
        .ok_or_else(|| anyhow!("WebSocket receiver already taken"))?;
    let handle = ws.handle();
    let runner = tokio::spawn(async move { ws.run().await });

    let mut received = 0usize;
    loop {
        tokio::select! {
            message = rx.recv() => {
                match message {
                    Some(RealtimeMessage::Data { mut table, .. }) => {
                        table.rename_columns(&stream.renames);
                        println!("{}", render(&table, stream.format)?);
                        received += 1;
                        if stream.limit > 0 && received >= stream.limit {
                            break;
                        }
                    }
                    Some(RealtimeMessage::System { tr_id, tr_key, ok, msg_cd, msg1 }) => {
                        if ok {
                            info!("[{}] {} ({})", tr_id, msg1, tr_key);
                        } else {
                            warn!("[{}] 구독 실패 {}: {} ({})", tr_id, msg_cd, msg1, tr_key);
                        }
                    }
                    Some(RealtimeMessage::ConnectionStatus(connected)) => {
                        info!("WebSocket 연결 상태: {}", if connected { "연결됨" } else { "끊김" });
                    }
                    Some(RealtimeMessage::Error(e)) => error!("실시간 에러: {}", e),
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C 수신, 구독 종료");
                break;
            }
        }
    }

    // 세션이 이미 끝났으면 명령 채널이 닫혀 있음
    handle.shutdown().await.ok();
    match runner.await {
        Ok(result) => result?,
        Err(e) => return Err(anyhow!("WebSocket task failed: {}", e)),
    }

    Ok(received)
}
