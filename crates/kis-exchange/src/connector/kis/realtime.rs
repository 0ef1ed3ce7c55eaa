//! 실시간 구독 정의와 프레임 파싱.
//!
//! 구독 정의마다 `(구독 메시지, 컬럼 목록)` 쌍을 만들고,
//! 수신한 데이터 프레임(`flag|tr_id|count|payload`)은 컬럼 목록으로 잘라 표로 만듭니다.

use super::config::KisEnvironment;
use crate::error::{KisError, KisResult};
use kis_core::Table;
use serde_json::{json, Value};

/// 실시간 구독 정의.
#[derive(Debug, Clone, Copy)]
pub struct RealtimeSpec {
    pub name: &'static str,
    pub tr_id: &'static str,
    /// 모의투자용 TR ID (없으면 실전과 동일)
    pub paper_tr_id: Option<&'static str>,
    pub columns: &'static [&'static str],
    /// AES-256-CBC 암호화 여부
    pub encrypted: bool,
    pub description: &'static str,
}

impl RealtimeSpec {
    pub fn tr_id_for(&self, env: KisEnvironment) -> &'static str {
        match (env, self.paper_tr_id) {
            (KisEnvironment::Paper, Some(paper)) => paper,
            _ => self.tr_id,
        }
    }

    /// 구독(또는 해지) 메시지와 컬럼 목록.
    pub fn subscription(
        &self,
        approval_key: &str,
        tr_key: &str,
        env: KisEnvironment,
        subscribe: bool,
    ) -> (String, &'static [&'static str]) {
        (
            subscription_message(approval_key, self.tr_id_for(env), tr_key, subscribe),
            self.columns,
        )
    }

    /// 데이터 프레임 본문을 표로 변환.
    pub fn to_table(&self, payload: &str) -> Table {
        let fields: Vec<&str> = payload.split('^').collect();
        Table::from_delimited(self.columns, &fields)
    }
}

/// 구독 요청 JSON. `subscribe`가 false면 해지 요청 (tr_type "2").
pub fn subscription_message(approval_key: &str, tr_id: &str, tr_key: &str, subscribe: bool) -> String {
    let tr_type = if subscribe { "1" } else { "2" };
    json!({
        "header": {
            "approval_key": approval_key,
            "custtype": "P",
            "tr_type": tr_type,
            "content-type": "utf-8",
        },
        "body": {
            "input": {
                "tr_id": tr_id,
                "tr_key": tr_key,
            }
        }
    })
    .to_string()
}

/// 수신 프레임.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// 서버 heartbeat. 받은 그대로 돌려보내야 합니다.
    PingPong,
    /// 구독 응답 등 JSON 시스템 메시지.
    System {
        tr_id: String,
        tr_key: String,
        rt_cd: String,
        msg_cd: String,
        msg1: String,
        /// 암호화 구독의 AES key
        key: Option<String>,
        /// 암호화 구독의 AES iv
        iv: Option<String>,
    },
    /// `flag|tr_id|count|payload`
    Data {
        encrypted: bool,
        tr_id: String,
        count: usize,
        payload: String,
    },
}

impl Frame {
    pub fn is_ok(&self) -> bool {
        match self {
            Frame::System { rt_cd, .. } => rt_cd == "0",
            _ => true,
        }
    }
}

/// 텍스트 프레임 파싱.
pub fn parse_frame(text: &str) -> KisResult<Frame> {
    match text.chars().next() {
        Some('0') | Some('1') => parse_data_frame(text),
        Some(_) => parse_system_frame(text),
        None => Err(KisError::ParseError("빈 프레임".to_string())),
    }
}

fn parse_data_frame(text: &str) -> KisResult<Frame> {
    let mut parts = text.splitn(4, '|');
    let (flag, tr_id, count, payload) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(f), Some(t), Some(c), Some(p)) => (f, t, c, p),
        _ => {
            return Err(KisError::ParseError(format!(
                "데이터 프레임 형식 오류: {}",
                truncate(text)
            )))
        }
    };

    let count = count
        .trim()
        .parse::<usize>()
        .map_err(|_| KisError::ParseError(format!("데이터 건수 파싱 실패: {}", count)))?;

    Ok(Frame::Data {
        encrypted: flag == "1",
        tr_id: tr_id.to_string(),
        count,
        payload: payload.to_string(),
    })
}

fn parse_system_frame(text: &str) -> KisResult<Frame> {
    let value: Value = serde_json::from_str(text)?;
    let header = &value["header"];
    let tr_id = str_field(header, "tr_id");

    if tr_id == "PINGPONG" {
        return Ok(Frame::PingPong);
    }

    let body = &value["body"];
    let output = &body["output"];
    let opt = |field: &str| output.get(field).and_then(Value::as_str).map(str::to_string);

    Ok(Frame::System {
        tr_id,
        tr_key: str_field(header, "tr_key"),
        rt_cd: str_field(body, "rt_cd"),
        msg_cd: str_field(body, "msg_cd"),
        msg1: str_field(body, "msg1"),
        key: opt("key"),
        iv: opt("iv"),
    })
}

fn str_field(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn truncate(text: &str) -> String {
    text.chars().take(80).collect()
}

/// 한 세션에서 유지할 수 있는 최대 구독 수.
pub const MAX_SUBSCRIPTIONS: usize = 40;

/// 실시간 구독 카탈로그.
pub const REALTIME_SPECS: &[RealtimeSpec] = &[
    RealtimeSpec {
        name: "domestic-trade",
        tr_id: "H0STCNT0",
        paper_tr_id: None,
        columns: DOMESTIC_TRADE_COLUMNS,
        encrypted: false,
        description: "국내주식 실시간체결가 (KRX)",
    },
    RealtimeSpec {
        name: "domestic-orderbook",
        tr_id: "H0STASP0",
        paper_tr_id: None,
        columns: DOMESTIC_ORDERBOOK_COLUMNS,
        encrypted: false,
        description: "국내주식 실시간호가 (KRX)",
    },
    RealtimeSpec {
        name: "domestic-order-notice",
        tr_id: "H0STCNI0",
        paper_tr_id: Some("H0STCNI9"),
        columns: DOMESTIC_ORDER_NOTICE_COLUMNS,
        encrypted: true,
        description: "국내주식 실시간체결통보 (tr_key = HTS ID)",
    },
    RealtimeSpec {
        name: "overseas-trade",
        tr_id: "HDFSCNT0",
        paper_tr_id: None,
        columns: OVERSEAS_TRADE_COLUMNS,
        encrypted: false,
        description: "해외주식 실시간지연체결가 (tr_key 예: DNASAAPL)",
    },
    RealtimeSpec {
        name: "overseas-orderbook",
        tr_id: "HDFSASP0",
        paper_tr_id: None,
        columns: OVERSEAS_ORDERBOOK_COLUMNS,
        encrypted: false,
        description: "해외주식 실시간호가 (미국)",
    },
];

/// 이름으로 찾기.
pub fn find(name: &str) -> Option<&'static RealtimeSpec> {
    REALTIME_SPECS.iter().find(|s| s.name == name)
}

/// 실전/모의 TR ID로 찾기.
pub fn find_by_tr_id(tr_id: &str) -> Option<&'static RealtimeSpec> {
    REALTIME_SPECS
        .iter()
        .find(|s| s.tr_id == tr_id || s.paper_tr_id == Some(tr_id))
}

const DOMESTIC_TRADE_COLUMNS: &[&str] = &[
    "MKSC_SHRN_ISCD",
    "STCK_CNTG_HOUR",
    "STCK_PRPR",
    "PRDY_VRSS_SIGN",
    "PRDY_VRSS",
    "PRDY_CTRT",
    "WGHN_AVRG_STCK_PRC",
    "STCK_OPRC",
    "STCK_HGPR",
    "STCK_LWPR",
    "ASKP1",
    "BIDP1",
    "CNTG_VOL",
    "ACML_VOL",
    "ACML_TR_PBMN",
    "SELN_CNTG_CSNU",
    "SHNU_CNTG_CSNU",
    "NTBY_CNTG_CSNU",
    "CTTR",
    "SELN_CNTG_SMTN",
    "SHNU_CNTG_SMTN",
    "CCLD_DVSN",
    "SHNU_RATE",
    "PRDY_VOL_VRSS_ACML_VOL_RATE",
    "OPRC_HOUR",
    "OPRC_VRSS_PRPR_SIGN",
    "OPRC_VRSS_PRPR",
    "HGPR_HOUR",
    "HGPR_VRSS_PRPR_SIGN",
    "HGPR_VRSS_PRPR",
    "LWPR_HOUR",
    "LWPR_VRSS_PRPR_SIGN",
    "LWPR_VRSS_PRPR",
    "BSOP_DATE",
    "NEW_MKOP_CLS_CODE",
    "TRHT_YN",
    "ASKP_RSQN1",
    "BIDP_RSQN1",
    "TOTAL_ASKP_RSQN",
    "TOTAL_BIDP_RSQN",
    "VOL_TNRT",
    "PRDY_SMNS_HOUR_ACML_VOL",
    "PRDY_SMNS_HOUR_ACML_VOL_RATE",
    "HOUR_CLS_CODE",
    "MRKT_TRTM_CLS_CODE",
    "VI_STND_PRC",
];

const DOMESTIC_ORDERBOOK_COLUMNS: &[&str] = &[
    "MKSC_SHRN_ISCD",
    "BSOP_HOUR",
    "HOUR_CLS_CODE",
    "ASKP1",
    "ASKP2",
    "ASKP3",
    "ASKP4",
    "ASKP5",
    "ASKP6",
    "ASKP7",
    "ASKP8",
    "ASKP9",
    "ASKP10",
    "BIDP1",
    "BIDP2",
    "BIDP3",
    "BIDP4",
    "BIDP5",
    "BIDP6",
    "BIDP7",
    "BIDP8",
    "BIDP9",
    "BIDP10",
    "ASKP_RSQN1",
    "ASKP_RSQN2",
    "ASKP_RSQN3",
    "ASKP_RSQN4",
    "ASKP_RSQN5",
    "ASKP_RSQN6",
    "ASKP_RSQN7",
    "ASKP_RSQN8",
    "ASKP_RSQN9",
    "ASKP_RSQN10",
    "BIDP_RSQN1",
    "BIDP_RSQN2",
    "BIDP_RSQN3",
    "BIDP_RSQN4",
    "BIDP_RSQN5",
    "BIDP_RSQN6",
    "BIDP_RSQN7",
    "BIDP_RSQN8",
    "BIDP_RSQN9",
    "BIDP_RSQN10",
    "TOTAL_ASKP_RSQN",
    "TOTAL_BIDP_RSQN",
    "OVTM_TOTAL_ASKP_RSQN",
    "OVTM_TOTAL_BIDP_RSQN",
    "ANTC_CNPR",
    "ANTC_CNQN",
    "ANTC_VOL",
    "ANTC_CNTG_VRSS",
    "ANTC_CNTG_VRSS_SIGN",
    "ANTC_CNTG_PRDY_CTRT",
    "ACML_VOL",
    "TOTAL_ASKP_RSQN_ICDC",
    "TOTAL_BIDP_RSQN_ICDC",
    "OVTM_TOTAL_ASKP_ICDC",
    "OVTM_TOTAL_BIDP_ICDC",
    "STCK_DEAL_CLS_CODE",
];

const DOMESTIC_ORDER_NOTICE_COLUMNS: &[&str] = &[
    "CUST_ID",
    "ACNT_NO",
    "ODER_NO",
    "OODER_NO",
    "SELN_BYOV_CLS",
    "RCTF_CLS",
    "ODER_KIND",
    "ODER_COND",
    "STCK_SHRN_ISCD",
    "CNTG_QTY",
    "CNTG_UNPR",
    "STCK_CNTG_HOUR",
    "RFUS_YN",
    "CNTG_YN",
    "ACPT_YN",
    "BRNC_NO",
    "ODER_QTY",
    "ACNT_NAME",
    "ORD_COND_PRC",
    "ORD_EXG_GB",
    "POPUP_YN",
    "FILLER",
    "CRDT_CLS",
    "CRDT_LOAN_DATE",
    "CNTG_ISNM40",
    "ODER_PRC",
];

const OVERSEAS_TRADE_COLUMNS: &[&str] = &[
    "RSYM", "SYMB", "ZDIV", "TYMD", "XYMD", "XHMS", "KYMD", "KHMS", "OPEN", "HIGH", "LOW", "LAST",
    "SIGN", "DIFF", "RATE", "PBID", "PASK", "VBID", "VASK", "EVOL", "TVOL", "TAMT", "BIVL", "ASVL",
    "STRN", "MTYP",
];

const OVERSEAS_ORDERBOOK_COLUMNS: &[&str] = &[
    "RSYM", "SYMB", "ZDIV", "XYMD", "XHMS", "KYMD", "KHMS", "BVOL", "AVOL", "BDVL", "ADVL",
    "PBID1", "PASK1", "VBID1", "VASK1", "DBID1", "DASK1",
];
