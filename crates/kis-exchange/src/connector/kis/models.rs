//! 자주 쓰는 응답 표의 타입 뷰.
//!
//! 카탈로그 호출 결과([`EndpointOutput`])를 [`Table::deserialize_rows`]로 변환합니다.

use super::catalog;
use super::client::Fetch;
use super::endpoint::{call_endpoint, CallOptions, EndpointOutput};
use crate::error::{KisError, KisResult};
use kis_core::{RequestParams, Table};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

/// 국내 주식 시세 데이터.
#[derive(Debug, Clone, Deserialize)]
pub struct KrStockPrice {
    /// 종목코드
    #[serde(rename = "stck_shrn_iscd", default)]
    pub stock_code: String,
    /// 현재가
    #[serde(rename = "stck_prpr", deserialize_with = "deserialize_decimal")]
    pub current_price: Decimal,
    /// 전일대비
    #[serde(rename = "prdy_vrss", default, deserialize_with = "deserialize_decimal")]
    pub price_change: Decimal,
    /// 등락률 (%)
    #[serde(rename = "prdy_ctrt", default, deserialize_with = "deserialize_decimal")]
    pub change_rate: Decimal,
    /// 누적거래량
    #[serde(rename = "acml_vol", default, deserialize_with = "deserialize_decimal")]
    pub volume: Decimal,
    #[serde(rename = "stck_hgpr", default, deserialize_with = "deserialize_decimal")]
    pub high: Decimal,
    #[serde(rename = "stck_lwpr", default, deserialize_with = "deserialize_decimal")]
    pub low: Decimal,
    #[serde(rename = "stck_oprc", default, deserialize_with = "deserialize_decimal")]
    pub open: Decimal,
    /// 상한가
    #[serde(rename = "stck_mxpr", default, deserialize_with = "deserialize_decimal")]
    pub upper_limit: Decimal,
    /// 하한가
    #[serde(rename = "stck_llam", default, deserialize_with = "deserialize_decimal")]
    pub lower_limit: Decimal,
}

/// 국내 주식 일봉.
#[derive(Debug, Clone, Deserialize)]
pub struct KrOhlcv {
    /// 영업일자 (YYYYMMDD)
    #[serde(rename = "stck_bsop_date")]
    pub date: String,
    #[serde(rename = "stck_oprc", deserialize_with = "deserialize_decimal")]
    pub open: Decimal,
    #[serde(rename = "stck_hgpr", deserialize_with = "deserialize_decimal")]
    pub high: Decimal,
    #[serde(rename = "stck_lwpr", deserialize_with = "deserialize_decimal")]
    pub low: Decimal,
    #[serde(rename = "stck_clpr", deserialize_with = "deserialize_decimal")]
    pub close: Decimal,
    #[serde(rename = "acml_vol", deserialize_with = "deserialize_decimal")]
    pub volume: Decimal,
}

/// 국내 계좌 보유 종목.
#[derive(Debug, Clone, Deserialize)]
pub struct KrHolding {
    #[serde(rename = "pdno")]
    pub stock_code: String,
    #[serde(rename = "prdt_name", default)]
    pub stock_name: String,
    /// 보유수량
    #[serde(rename = "hldg_qty", deserialize_with = "deserialize_decimal")]
    pub quantity: Decimal,
    /// 매도가능수량
    #[serde(rename = "ord_psbl_qty", default, deserialize_with = "deserialize_decimal")]
    pub sellable_qty: Decimal,
    /// 매입평균가격
    #[serde(rename = "pchs_avg_pric", default, deserialize_with = "deserialize_decimal")]
    pub avg_price: Decimal,
    #[serde(rename = "prpr", default, deserialize_with = "deserialize_decimal")]
    pub current_price: Decimal,
    /// 평가손익금액
    #[serde(rename = "evlu_pfls_amt", default, deserialize_with = "deserialize_decimal")]
    pub profit_loss: Decimal,
}

/// 국내 계좌 요약.
#[derive(Debug, Clone, Deserialize)]
pub struct KrAccountSummary {
    /// 예수금
    #[serde(rename = "dnca_tot_amt", deserialize_with = "deserialize_decimal")]
    pub cash_balance: Decimal,
    /// 총 평가금액
    #[serde(rename = "tot_evlu_amt", default, deserialize_with = "deserialize_decimal")]
    pub total_eval_amount: Decimal,
    /// 총 평가손익
    #[serde(rename = "evlu_pfls_smtl_amt", default, deserialize_with = "deserialize_decimal")]
    pub total_profit_loss: Decimal,
}

/// 국내 계좌 잔고.
#[derive(Debug, Clone)]
pub struct KrBalance {
    pub holdings: Vec<KrHolding>,
    pub summary: Option<KrAccountSummary>,
}

/// 해외 주식 현재가.
#[derive(Debug, Clone, Deserialize)]
pub struct UsStockPrice {
    /// 실시간조회종목코드 (예: "DNASAAPL")
    #[serde(default)]
    pub rsym: String,
    /// 현재가
    #[serde(rename = "last", deserialize_with = "deserialize_decimal")]
    pub current_price: Decimal,
    /// 전일종가
    #[serde(rename = "base", default, deserialize_with = "deserialize_decimal")]
    pub prev_close: Decimal,
    /// 대비
    #[serde(rename = "diff", default, deserialize_with = "deserialize_decimal")]
    pub price_change: Decimal,
    /// 등락율
    #[serde(rename = "rate", default, deserialize_with = "deserialize_decimal")]
    pub change_rate: Decimal,
    #[serde(rename = "tvol", default, deserialize_with = "deserialize_decimal")]
    pub volume: Decimal,
}

/// 국내 시세/잔고 조회.
///
/// 카탈로그 정의를 그대로 호출하고 결과 표를 구조체로 바꿉니다.
pub struct KisKrQuotes {
    fetch: Arc<dyn Fetch>,
    options: CallOptions,
}

impl KisKrQuotes {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self {
            fetch,
            options: CallOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    async fn call(&self, name: &str, params: RequestParams) -> KisResult<EndpointOutput> {
        let spec = catalog::find(name)
            .ok_or_else(|| KisError::InvalidInput(format!("unknown endpoint: {}", name)))?;
        call_endpoint(self.fetch.as_ref(), spec, params, &self.options).await
    }

    /// 주식현재가 시세. 실패 응답이면 `None`.
    pub async fn get_price(&self, stock_code: &str) -> KisResult<Option<KrStockPrice>> {
        let mut params = RequestParams::new();
        params.require("FID_INPUT_ISCD", stock_code)?;

        let output = self.call("domestic_stock/inquire-price", params).await?;
        Ok(rows::<KrStockPrice>(&output.into_table("output"))?
            .into_iter()
            .next())
    }

    /// 일봉 (최근 30 영업일).
    pub async fn get_daily_price(&self, stock_code: &str) -> KisResult<Vec<KrOhlcv>> {
        let mut params = RequestParams::new();
        params.require("FID_INPUT_ISCD", stock_code)?;

        let output = self.call("domestic_stock/inquire-daily-price", params).await?;
        rows(&output.into_table("output"))
    }

    /// 주식 잔고. 보유 수량이 0인 행은 제외합니다.
    pub async fn get_balance(&self, cano: &str, acnt_prdt_cd: &str) -> KisResult<KrBalance> {
        let mut params = RequestParams::new();
        params.require("CANO", cano)?.require("ACNT_PRDT_CD", acnt_prdt_cd)?;

        let output = self.call("domestic_stock/inquire-balance", params).await?;
        let holdings = output
            .table("output1")
            .map(rows::<KrHolding>)
            .transpose()?
            .unwrap_or_default()
            .into_iter()
            .filter(|h| h.quantity > Decimal::ZERO)
            .collect();
        let summary = output
            .table("output2")
            .map(rows::<KrAccountSummary>)
            .transpose()?
            .and_then(|s| s.into_iter().next());

        Ok(KrBalance { holdings, summary })
    }
}

fn rows<T: serde::de::DeserializeOwned>(table: &Table) -> KisResult<Vec<T>> {
    Ok(table.deserialize_rows()?)
}

/// 문자열을 Decimal로 역직렬화. 빈 문자열과 "-"는 0.
pub fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = String::deserialize(deserializer)?;
    let s = s.trim();
    if s.is_empty() || s == "-" {
        return Ok(Decimal::ZERO);
    }
    s.parse::<Decimal>()
        .map_err(|_| serde::de::Error::custom(format!("Invalid decimal: {}", s)))
}
