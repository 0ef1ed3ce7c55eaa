//! mockito 서버를 상대로 한 REST 클라이언트 테스트.

use kis_core::RequestParams;
use kis_exchange::{
    call_endpoint, catalog, CallOptions, KisAccountType, KisConfig, KisError, KisHttpClient,
    KisOAuth, TokenState,
};
use mockito::{Matcher, Server, ServerGuard};
use std::sync::Arc;
use std::time::Duration;

const APP_KEY: &str = "PSabcdefghijklmnopqrstuvwxyz0123456789";
const APP_SECRET: &str = "secret-abcdefghijklmnopqrstuvwxyz0123456789";

fn config(server: &ServerGuard) -> KisConfig {
    KisConfig::new(APP_KEY, APP_SECRET, "12345678-01", KisAccountType::RealGeneral)
        .with_rest_url(server.url())
        .with_page_delay(Duration::ZERO)
}

async fn mock_token(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/oauth2/tokenP")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "grant_type": "client_credentials",
            "appkey": APP_KEY,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"access_token":"test-token","token_type":"Bearer","expires_in":86400,"access_token_token_expired":"2099-12-31 23:59:59"}"#,
        )
        .create_async()
        .await
}

#[tokio::test]
async fn test_inquire_price_sends_headers_and_query() {
    let mut server = Server::new_async().await;
    let token = mock_token(&mut server).await;
    let price = server
        .mock("GET", "/uapi/domestic-stock/v1/quotations/inquire-price")
        .match_header("authorization", "Bearer test-token")
        .match_header("appkey", APP_KEY)
        .match_header("tr_id", "FHKST01010100")
        .match_header("custtype", "P")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("FID_COND_MRKT_DIV_CODE".into(), "J".into()),
            Matcher::UrlEncoded("FID_INPUT_ISCD".into(), "005930".into()),
        ]))
        .with_status(200)
        .with_header("tr_cont", "")
        .with_body(
            r#"{"rt_cd":"0","msg_cd":"MCA00000","msg1":"정상처리 되었습니다.","output":{"stck_prpr":"71500","prdy_vrss":"-500","acml_vol":"12345678"}}"#,
        )
        .expect(2)
        .create_async()
        .await;

    let client = KisHttpClient::new(KisOAuth::new(config(&server)).unwrap()).unwrap();
    let spec = catalog::find("domestic_stock/inquire-price").unwrap();

    for _ in 0..2 {
        let output = call_endpoint(
            &client,
            spec,
            RequestParams::new().with("fid_input_iscd", "005930"),
            &CallOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(output.first().unwrap().get(0, "stck_prpr"), Some("71500"));
    }

    // 토큰은 한 번만 발급
    token.assert_async().await;
    price.assert_async().await;
}

#[tokio::test]
async fn test_balance_pagination_over_http() {
    let mut server = Server::new_async().await;
    mock_token(&mut server).await;

    let path = "/uapi/domestic-stock/v1/trading/inquire-balance";
    let first = server
        .mock("GET", path)
        .match_header("tr_id", "TTTC8434R")
        .match_query(Matcher::UrlEncoded("CTX_AREA_NK100".into(), "".into()))
        .with_status(200)
        .with_header("tr_cont", "M")
        .with_body(
            r#"{"rt_cd":"0","ctx_area_fk100":"FK1","ctx_area_nk100":"NK1","output1":[{"pdno":"005930","hldg_qty":"10"}],"output2":[{"tot_evlu_amt":"715000"}]}"#,
        )
        .create_async()
        .await;
    let second = server
        .mock("GET", path)
        .match_header("tr_cont", "N")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("CTX_AREA_FK100".into(), "FK1".into()),
            Matcher::UrlEncoded("CTX_AREA_NK100".into(), "NK1".into()),
        ]))
        .with_status(200)
        .with_header("tr_cont", "D")
        .with_body(
            r#"{"rt_cd":"0","ctx_area_fk100":"FK2","ctx_area_nk100":"","output1":[{"pdno":"000660","hldg_qty":"3"}],"output2":[{"tot_evlu_amt":"715000"}]}"#,
        )
        .create_async()
        .await;

    let client = KisHttpClient::new(KisOAuth::new(config(&server)).unwrap()).unwrap();
    let spec = catalog::find("domestic_stock/inquire-balance").unwrap();
    let params = RequestParams::new()
        .with("CANO", "12345678")
        .with("ACNT_PRDT_CD", "01");

    let output = call_endpoint(&client, spec, params, &CallOptions::default())
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(
        output.table("output1").unwrap().column("pdno").unwrap(),
        vec!["005930", "000660"]
    );
}

#[tokio::test]
async fn test_order_uses_hashkey() {
    let mut server = Server::new_async().await;
    mock_token(&mut server).await;
    let hashkey = server
        .mock("POST", "/uapi/hashkey")
        .match_header("appkey", APP_KEY)
        .match_body(Matcher::PartialJson(serde_json::json!({"PDNO": "005930"})))
        .with_status(200)
        .with_body(r#"{"HASH":"deadbeef"}"#)
        .create_async()
        .await;
    let order = server
        .mock("POST", "/uapi/domestic-stock/v1/trading/order-cash")
        .match_header("hashkey", "deadbeef")
        .match_header("tr_id", "TTTC0012U")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "CANO": "12345678",
            "PDNO": "005930",
            "ORD_QTY": "1",
        })))
        .with_status(200)
        .with_body(r#"{"rt_cd":"0","msg1":"주문 전송 완료 되었습니다.","output":{"KRX_FWDG_ORD_ORGNO":"91252","ODNO":"0000117057","ORD_TMD":"121052"}}"#)
        .create_async()
        .await;

    let client = KisHttpClient::new(KisOAuth::new(config(&server)).unwrap()).unwrap();
    let spec = catalog::find("domestic_stock/order-cash-buy").unwrap();
    let params = RequestParams::new()
        .with("CANO", "12345678")
        .with("ACNT_PRDT_CD", "01")
        .with("PDNO", "005930")
        .with("ORD_DVSN", "00")
        .with("ORD_QTY", "1")
        .with("ORD_UNPR", "70000");

    let output = call_endpoint(&client, spec, params, &CallOptions::default())
        .await
        .unwrap();

    hashkey.assert_async().await;
    order.assert_async().await;
    assert_eq!(output.first().unwrap().get(0, "ODNO"), Some("0000117057"));
}

#[tokio::test]
async fn test_http_error_yields_empty_tables() {
    let mut server = Server::new_async().await;
    mock_token(&mut server).await;
    server
        .mock("GET", "/uapi/overseas-price/v1/quotations/price")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body(r#"{"rt_cd":"1","msg_cd":"EGW00201","msg1":"초당 거래건수를 초과하였습니다."}"#)
        .create_async()
        .await;

    let client = KisHttpClient::new(KisOAuth::new(config(&server)).unwrap()).unwrap();
    let spec = catalog::find("overseas_stock/price").unwrap();
    let params = RequestParams::new()
        .with("EXCD", "NAS")
        .with("SYMB", "AAPL");

    let output = call_endpoint(&client, spec, params, &CallOptions::default())
        .await
        .unwrap();
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_token_error_is_unauthorized() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/oauth2/tokenP")
        .with_status(403)
        .with_body(r#"{"error_code":"EGW00103","error_description":"유효하지 않은 AppKey입니다."}"#)
        .create_async()
        .await;

    let oauth = KisOAuth::new(config(&server)).unwrap();
    let err = oauth.get_token().await.unwrap_err();
    assert!(err.is_auth_error(), "unexpected {:?}", err);
}

#[tokio::test]
async fn test_short_app_key_rejected_before_request() {
    let server = Server::new_async().await;
    let config = KisConfig::new("short", APP_SECRET, "12345678-01", KisAccountType::RealGeneral)
        .with_rest_url(server.url());
    let oauth = Arc::new(KisOAuth::new(config).unwrap());

    let err = oauth.refresh_token().await.unwrap_err();
    assert!(matches!(err, KisError::Unauthorized(_)));
}

#[tokio::test]
async fn test_token_cache_file_is_reused() {
    let mut server = Server::new_async().await;
    let token = mock_token(&mut server).await;
    let path = std::env::temp_dir().join(format!("kis_token_{}.json", std::process::id()));

    let first = KisOAuth::new(config(&server).with_token_cache(&path)).unwrap();
    first.get_token().await.unwrap();
    token.assert_async().await;

    // 캐시 파일에서 불러오므로 추가 요청 없음
    let second = KisOAuth::new(config(&server).with_token_cache(&path)).unwrap();
    let cached = second.get_cached_token().await.unwrap();
    assert_eq!(cached.access_token, "test-token");

    second.revoke_token().await.ok();
    assert!(!path.exists());
}

fn saved_token(access_token: &str, issuer: &KisConfig, path: &std::path::Path) {
    TokenState::new(
        access_token.into(),
        "Bearer".into(),
        chrono::Utc::now() + chrono::Duration::hours(12),
    )
    .issued_for(issuer)
    .save(path)
    .unwrap();
}

#[tokio::test]
async fn test_cached_token_from_other_environment_is_ignored() {
    let mut server = Server::new_async().await;
    let token = mock_token(&mut server).await;
    let path = std::env::temp_dir().join(format!("kis_token_env_{}.json", std::process::id()));

    let paper = KisConfig::new(APP_KEY, APP_SECRET, "12345678-01", KisAccountType::Paper)
        .with_rest_url(server.url());
    saved_token("paper-token", &paper, &path);

    let oauth = KisOAuth::new(config(&server).with_token_cache(&path)).unwrap();
    assert!(oauth.get_cached_token().await.is_none());

    let issued = oauth.get_token().await.unwrap();
    token.assert_async().await;
    assert_eq!(issued.access_token, "test-token");

    let saved = TokenState::load(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert!(saved.matches(oauth.config()));
    assert_eq!(saved.access_token, "test-token");
}

#[tokio::test]
async fn test_rejected_token_is_discarded() {
    let mut server = Server::new_async().await;
    let token = mock_token(&mut server).await;
    let path = std::env::temp_dir().join(format!("kis_token_stale_{}.json", std::process::id()));
    saved_token("stale-token", &config(&server), &path);

    let price_path = "/uapi/domestic-stock/v1/quotations/inquire-price";
    let rejected = server
        .mock("GET", price_path)
        .match_header("authorization", "Bearer stale-token")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body(r#"{"rt_cd":"1","msg_cd":"EGW00123","msg1":"기간이 만료된 token 입니다."}"#)
        .create_async()
        .await;
    let accepted = server
        .mock("GET", price_path)
        .match_header("authorization", "Bearer test-token")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"rt_cd":"0","output":{"stck_prpr":"71500"}}"#)
        .create_async()
        .await;

    let client =
        KisHttpClient::new(KisOAuth::new(config(&server).with_token_cache(&path)).unwrap()).unwrap();
    let spec = catalog::find("domestic_stock/inquire-price").unwrap();
    let params = RequestParams::new().with("fid_input_iscd", "005930");

    let output = call_endpoint(&client, spec, params.clone(), &CallOptions::default())
        .await
        .unwrap();
    assert!(output.is_empty());
    assert!(!path.exists());
    assert!(client.oauth().get_cached_token().await.is_none());

    let output = call_endpoint(&client, spec, params, &CallOptions::default())
        .await
        .unwrap();
    std::fs::remove_file(&path).ok();

    rejected.assert_async().await;
    accepted.assert_async().await;
    token.assert_async().await;
    assert_eq!(output.first().unwrap().get(0, "stck_prpr"), Some("71500"));
}
