//! KIS 실시간 WebSocket 클라이언트.
//!
//! [`realtime`](super::realtime) 카탈로그의 어떤 구독이든 등록할 수 있으며,
//! 수신한 레코드는 컬럼 목록으로 잘라 [`RealtimeMessage::Data`]로 전달합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! let oauth = Arc::new(KisOAuth::new(config)?);
//! let mut ws = KisWebSocket::new(oauth);
//! ws.subscribe(realtime::find("domestic-trade").unwrap(), "005930")?;
//!
//! let mut rx = ws.take_receiver().unwrap();
//! tokio::spawn(async move { ws.run().await });
//! while let Some(msg) = rx.recv().await {
//!     println!("{:?}", msg);
//! }
//! ```

use super::auth::KisOAuth;
use super::config::KisEnvironment;
use super::crypto::decrypt_payload;
use super::realtime::{find_by_tr_id, parse_frame, Frame, RealtimeSpec, MAX_SUBSCRIPTIONS};
use crate::error::{KisError, KisResult};
use futures::{SinkExt, StreamExt};
use kis_core::Table;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tokio::time::interval;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// 재연결 최대 시도 횟수.
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// 재연결 대기 시간 (초).
const RECONNECT_DELAY_SECS: u64 = 5;

/// Ping 간격 (초).
const PING_INTERVAL_SECS: u64 = 30;

/// 실시간 메시지.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeMessage {
    /// 데이터 레코드
    Data {
        tr_id: String,
        /// 구독 정의 이름
        name: &'static str,
        table: Table,
    },
    /// 구독/해지 응답
    System {
        tr_id: String,
        tr_key: String,
        ok: bool,
        msg_cd: String,
        msg1: String,
    },
    /// 연결 상태 변경
    ConnectionStatus(bool),
    /// 에러
    Error(String),
}

/// 구독 하나 (정의 + tr_key).
#[derive(Debug, Clone)]
pub struct Subscription {
    pub spec: &'static RealtimeSpec,
    pub tr_key: String,
}

impl Subscription {
    pub fn new(spec: &'static RealtimeSpec, tr_key: impl Into<String>) -> Self {
        Self {
            spec,
            tr_key: tr_key.into(),
        }
    }

    fn same(&self, other: &Subscription) -> bool {
        self.spec.name == other.spec.name && self.tr_key == other.tr_key
    }

    fn message(&self, approval_key: &str, env: KisEnvironment, subscribe: bool) -> String {
        self.spec
            .subscription(approval_key, &self.tr_key, env, subscribe)
            .0
    }
}

/// 실행 중인 세션에 보내는 명령.
#[derive(Debug)]
enum Command {
    Subscribe(Subscription),
    Unsubscribe(Subscription),
    Shutdown,
}

/// 실행 중인 [`KisWebSocket`]을 제어하는 핸들.
#[derive(Debug, Clone)]
pub struct KisWebSocketHandle {
    tx: mpsc::Sender<Command>,
}

impl KisWebSocketHandle {
    pub async fn subscribe(&self, spec: &'static RealtimeSpec, tr_key: &str) -> KisResult<()> {
        self.send(Command::Subscribe(Subscription::new(spec, tr_key)))
            .await
    }

    pub async fn unsubscribe(&self, spec: &'static RealtimeSpec, tr_key: &str) -> KisResult<()> {
        self.send(Command::Unsubscribe(Subscription::new(spec, tr_key)))
            .await
    }

    /// 세션 종료 요청.
    pub async fn shutdown(&self) -> KisResult<()> {
        self.send(Command::Shutdown).await
    }

    async fn send(&self, command: Command) -> KisResult<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| KisError::WebSocket("세션이 종료되었습니다".to_string()))
    }
}

/// 처리 결과: 서버로 돌려보낼 텍스트와 소비자에게 전달할 메시지.
#[derive(Debug, Default)]
pub struct Handled {
    pub reply: Option<String>,
    pub message: Option<RealtimeMessage>,
}

/// 텍스트 프레임 처리기. 암호화 구독의 key/iv를 TR ID별로 보관합니다.
#[derive(Debug, Default)]
pub struct FrameHandler {
    keys: HashMap<String, (String, String)>,
}

impl FrameHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_key(&self, tr_id: &str) -> bool {
        self.keys.contains_key(tr_id)
    }

    pub fn handle(&mut self, text: &str) -> Handled {
        match parse_frame(text) {
            Ok(Frame::PingPong) => {
                debug!("PINGPONG 수신, 그대로 응답");
                Handled {
                    reply: Some(text.to_string()),
                    message: None,
                }
            }
            Ok(Frame::System {
                tr_id,
                tr_key,
                rt_cd,
                msg_cd,
                msg1,
                key,
                iv,
            }) => {
                if let (Some(key), Some(iv)) = (key, iv) {
                    debug!("[{}] 복호화 키 수신", tr_id);
                    self.keys.insert(tr_id.clone(), (key, iv));
                }
                let ok = rt_cd == "0";
                if ok {
                    info!("[{}] {} ({})", tr_id, msg1, tr_key);
                } else {
                    warn!("[{}] 구독 실패 {}: {} ({})", tr_id, msg_cd, msg1, tr_key);
                }
                Handled {
                    reply: None,
                    message: Some(RealtimeMessage::System {
                        tr_id,
                        tr_key,
                        ok,
                        msg_cd,
                        msg1,
                    }),
                }
            }
            Ok(Frame::Data {
                encrypted,
                tr_id,
                count,
                payload,
            }) => self.handle_data(encrypted, tr_id, count, payload),
            Err(e) => {
                warn!("프레임 파싱 실패: {}", e);
                error_message(e.to_string())
            }
        }
    }

    fn handle_data(&self, encrypted: bool, tr_id: String, count: usize, payload: String) -> Handled {
        let Some(spec) = find_by_tr_id(&tr_id) else {
            debug!("알 수 없는 tr_id: {}", tr_id);
            return Handled::default();
        };

        let payload = if encrypted {
            let Some((key, iv)) = self.keys.get(&tr_id) else {
                return error_message(format!("[{}] 복호화 키가 없습니다", tr_id));
            };
            match decrypt_payload(key, iv, &payload) {
                Ok(plain) => plain,
                Err(e) => return error_message(format!("[{}] {}", tr_id, e)),
            }
        } else {
            payload
        };

        let table = spec.to_table(&payload);
        if table.len() != count {
            debug!("[{}] 데이터 건수 불일치: header={} parsed={}", tr_id, count, table.len());
        }

        Handled {
            reply: None,
            message: Some(RealtimeMessage::Data {
                tr_id,
                name: spec.name,
                table,
            }),
        }
    }
}

fn error_message(msg: String) -> Handled {
    Handled {
        reply: None,
        message: Some(RealtimeMessage::Error(msg)),
    }
}

/// KIS 실시간 WebSocket 클라이언트.
pub struct KisWebSocket {
    oauth: Arc<KisOAuth>,
    tx: mpsc::Sender<RealtimeMessage>,
    rx: Option<mpsc::Receiver<RealtimeMessage>>,
    cmd_tx: mpsc::Sender<Command>,
    cmd_rx: Option<mpsc::Receiver<Command>>,
    subscriptions: Vec<Subscription>,
    handler: FrameHandler,
    is_connected: Arc<RwLock<bool>>,
    reconnect_delay: Duration,
}

impl KisWebSocket {
    pub fn new(oauth: Arc<KisOAuth>) -> Self {
        let (tx, rx) = mpsc::channel(1000);
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        Self {
            oauth,
            tx,
            rx: Some(rx),
            cmd_tx,
            cmd_rx: Some(cmd_rx),
            subscriptions: Vec::new(),
            handler: FrameHandler::new(),
            is_connected: Arc::new(RwLock::new(false)),
            reconnect_delay: Duration::from_secs(RECONNECT_DELAY_SECS),
        }
    }

    /// 재연결 대기 시간 설정.
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// 메시지 수신 채널 가져오기.
    pub fn take_receiver(&mut self) -> Option<mpsc::Receiver<RealtimeMessage>> {
        self.rx.take()
    }

    /// 실행 중 구독 변경/종료용 핸들.
    pub fn handle(&self) -> KisWebSocketHandle {
        KisWebSocketHandle {
            tx: self.cmd_tx.clone(),
        }
    }

    pub async fn is_connected(&self) -> bool {
        *self.is_connected.read().await
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    /// 연결 전에 구독 등록. 연결(재연결) 시 전송됩니다.
    pub fn subscribe(&mut self, spec: &'static RealtimeSpec, tr_key: &str) -> KisResult<()> {
        self.add_subscription(Subscription::new(spec, tr_key)).map(|_| ())
    }

    /// 구독 추가. 이미 있으면 `false`.
    fn add_subscription(&mut self, sub: Subscription) -> KisResult<bool> {
        if self.subscriptions.iter().any(|s| s.same(&sub)) {
            return Ok(false);
        }
        if self.subscriptions.len() >= MAX_SUBSCRIPTIONS {
            return Err(KisError::InvalidInput(format!(
                "세션당 최대 구독 수({}) 초과",
                MAX_SUBSCRIPTIONS
            )));
        }
        self.subscriptions.push(sub);
        Ok(true)
    }

    fn remove_subscription(&mut self, sub: &Subscription) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| !s.same(sub));
        self.subscriptions.len() != before
    }

    /// WebSocket 연결 및 메시지 수신 시작.
    ///
    /// 연결이 끊기면 재연결하고 구독을 복원합니다. 연속 3회 실패하면 종료하며,
    /// 연결에 성공한 세션이 끊긴 경우 시도 횟수를 다시 셉니다.
    /// 별도 태스크에서 실행해야 합니다.
    pub async fn run(&mut self) -> KisResult<()> {
        let mut commands = self
            .cmd_rx
            .take()
            .ok_or_else(|| KisError::WebSocket("이미 실행 중입니다".to_string()))?;
        let mut reconnect_attempts = 0;

        let result = loop {
            let mut connected = false;
            match self.run_session(&mut commands, &mut connected).await {
                Ok(()) => {
                    info!("KIS WebSocket 연결 종료");
                    break Ok(());
                }
                Err(e) => {
                    error!("KIS WebSocket 에러: {}", e);
                    if connected {
                        reconnect_attempts = 0;
                    }
                    reconnect_attempts += 1;

                    if reconnect_attempts > MAX_RECONNECT_ATTEMPTS {
                        error!("최대 재연결 시도 횟수 초과 ({}회)", MAX_RECONNECT_ATTEMPTS);
                        self.emit(RealtimeMessage::Error(format!(
                            "최대 재연결 시도 횟수 초과: {}",
                            e
                        )))
                        .await;
                        break Err(e);
                    }

                    warn!(
                        "{:?} 후 재연결 시도 ({}/{})",
                        self.reconnect_delay, reconnect_attempts, MAX_RECONNECT_ATTEMPTS
                    );
                    tokio::time::sleep(self.reconnect_delay).await;

                    // 접속키 재발급
                    self.oauth.clear_websocket_key().await;
                }
            }
        };

        self.cmd_rx = Some(commands);
        result
    }

    /// 한 번의 연결 수명. 구독 전송까지 마치면 `connected`를 세웁니다.
    async fn run_session(
        &mut self,
        commands: &mut mpsc::Receiver<Command>,
        connected: &mut bool,
    ) -> KisResult<()> {
        let approval_key = self.oauth.get_websocket_key().await?;
        let env = self.oauth.config().environment;
        let ws_url = self.oauth.config().websocket_url().to_string();

        info!("KIS WebSocket 연결 중: {}", ws_url);

        let (ws_stream, _) = connect_async(ws_url.as_str())
            .await
            .map_err(|e| KisError::NetworkError(format!("WebSocket 연결 실패: {}", e)))?;
        let (mut write, mut read) = ws_stream.split();

        self.set_connected(true).await;
        info!("KIS WebSocket 연결 성공");

        for sub in &self.subscriptions {
            write
                .send(Message::Text(sub.message(&approval_key, env, true)))
                .await?;
            debug!("구독 전송: {} {}", sub.spec.tr_id_for(env), sub.tr_key);
        }
        *connected = true;

        let mut ping_interval = interval(Duration::from_secs(PING_INTERVAL_SECS));

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let handled = self.handler.handle(&text);
                            if let Some(reply) = handled.reply {
                                write.send(Message::Text(reply)).await?;
                            }
                            if let Some(message) = handled.message {
                                self.emit(message).await;
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            debug!("Ping 수신, Pong 응답");
                            let _ = write.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(_))) => {
                            warn!("서버에서 연결 종료 요청");
                            break;
                        }
                        Some(Err(e)) => {
                            error!("WebSocket 수신 에러: {}", e);
                            break;
                        }
                        None => {
                            warn!("WebSocket 스트림 종료");
                            break;
                        }
                        _ => {}
                    }
                }
                command = commands.recv() => {
                    match command {
                        Some(Command::Subscribe(sub)) => match self.add_subscription(sub.clone()) {
                            Ok(true) => {
                                write.send(Message::Text(sub.message(&approval_key, env, true))).await?;
                            }
                            Ok(false) => debug!("이미 구독 중: {} {}", sub.spec.name, sub.tr_key),
                            Err(e) => self.emit(RealtimeMessage::Error(e.to_string())).await,
                        },
                        Some(Command::Unsubscribe(sub)) => {
                            if self.remove_subscription(&sub) {
                                write.send(Message::Text(sub.message(&approval_key, env, false))).await?;
                            }
                        }
                        Some(Command::Shutdown) | None => {
                            let _ = write.send(Message::Close(None)).await;
                            self.set_connected(false).await;
                            return Ok(());
                        }
                    }
                }
                _ = ping_interval.tick() => {
                    debug!("Ping 전송");
                    if let Err(e) = write.send(Message::Ping(vec![])).await {
                        error!("Ping 전송 실패: {}", e);
                        break;
                    }
                }
            }
        }

        self.set_connected(false).await;
        Err(KisError::NetworkError("연결 끊김".to_string()))
    }

    async fn set_connected(&self, connected: bool) {
        *self.is_connected.write().await = connected;
        self.emit(RealtimeMessage::ConnectionStatus(connected)).await;
    }

    async fn emit(&self, message: RealtimeMessage) {
        if self.tx.send(message).await.is_err() {
            debug!("수신 채널이 닫혀 메시지를 버립니다");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::kis::config::{KisAccountType, KisConfig};
    use crate::connector::kis::realtime;
    use aes::Aes256;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use cbc::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};

    const KEY: &str = "abcdefghijklmnopqrstuvwxyz123456";
    const IV: &str = "0123456789abcdef";

    fn encrypt(plain: &str) -> String {
        let len = plain.len();
        let mut buf = vec![0u8; len + 16];
        buf[..len].copy_from_slice(plain.as_bytes());
        let enc = cbc::Encryptor::<Aes256>::new_from_slices(KEY.as_bytes(), IV.as_bytes()).unwrap();
        STANDARD.encode(enc.encrypt_padded_mut::<Pkcs7>(&mut buf, len).unwrap())
    }

    fn websocket() -> KisWebSocket {
        let config = KisConfig::new("k", "s", "12345678", KisAccountType::Paper);
        KisWebSocket::new(Arc::new(KisOAuth::new(config).unwrap()))
    }

    #[test]
    fn test_pingpong_is_echoed() {
        let mut handler = FrameHandler::new();
        let text = r#"{"header":{"tr_id":"PINGPONG","datetime":"20260115093000"}}"#;
        let handled = handler.handle(text);
        assert_eq!(handled.reply.as_deref(), Some(text));
        assert!(handled.message.is_none());
    }

    #[test]
    fn test_plain_data_frame() {
        let mut handler = FrameHandler::new();
        let fields: Vec<String> = (0..26).map(|i| format!("f{}", i)).collect();
        let text = format!("0|HDFSCNT0|001|{}", fields.join("^"));

        match handler.handle(&text).message {
            Some(RealtimeMessage::Data { tr_id, name, table }) => {
                assert_eq!(tr_id, "HDFSCNT0");
                assert_eq!(name, "overseas-trade");
                assert_eq!(table.len(), 1);
                assert_eq!(table.get(0, "RSYM"), Some("f0"));
                assert_eq!(table.get(0, "MTYP"), Some("f25"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_encrypted_frame_needs_key_from_ack() {
        let mut handler = FrameHandler::new();
        let plain = (0..26).map(|i| i.to_string()).collect::<Vec<_>>().join("^");
        let data = format!("1|H0STCNI0|001|{}", encrypt(&plain));

        assert!(matches!(
            handler.handle(&data).message,
            Some(RealtimeMessage::Error(_))
        ));

        let ack = format!(
            r#"{{"header":{{"tr_id":"H0STCNI0","tr_key":"HTSID"}},"body":{{"rt_cd":"0","msg_cd":"OPSP0000","msg1":"SUBSCRIBE SUCCESS","output":{{"iv":"{}","key":"{}"}}}}}}"#,
            IV, KEY
        );
        assert!(matches!(
            handler.handle(&ack).message,
            Some(RealtimeMessage::System { ok: true, .. })
        ));
        assert!(handler.has_key("H0STCNI0"));

        match handler.handle(&data).message {
            Some(RealtimeMessage::Data { table, .. }) => {
                assert_eq!(table.get(0, "CUST_ID"), Some("0"));
                assert_eq!(table.get(0, "ODER_PRC"), Some("25"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tr_id_is_ignored() {
        let mut handler = FrameHandler::new();
        let handled = handler.handle("0|H0XXXXX0|001|a^b^c");
        assert!(handled.reply.is_none());
        assert!(handled.message.is_none());
    }

    #[test]
    fn test_subscription_limit_and_dedup() {
        let mut ws = websocket();
        let spec = realtime::find("domestic-trade").unwrap();

        for i in 0..MAX_SUBSCRIPTIONS {
            ws.subscribe(spec, &format!("{:06}", i)).unwrap();
        }
        // 중복은 개수에 포함되지 않음
        ws.subscribe(spec, "000000").unwrap();
        assert_eq!(ws.subscriptions().len(), MAX_SUBSCRIPTIONS);

        let err = ws.subscribe(spec, "999999").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_remove_subscription() {
        let mut ws = websocket();
        let spec = realtime::find("domestic-orderbook").unwrap();
        ws.subscribe(spec, "005930").unwrap();

        assert!(ws.remove_subscription(&Subscription::new(spec, "005930")));
        assert!(!ws.remove_subscription(&Subscription::new(spec, "005930")));
        assert!(ws.subscriptions().is_empty());
    }
}
