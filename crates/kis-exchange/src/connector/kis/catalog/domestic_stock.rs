//! 국내주식 (`/uapi/domestic-stock/v1`).

use super::{get, order};
use crate::connector::kis::endpoint::{Category, EndpointSpec, Paging, PaperTrId, CURSOR_100, CURSOR_PLAIN};

const C: Category = Category::DomesticStock;

const ACCOUNT: &[&str] = &["CANO", "ACNT_PRDT_CD"];

pub(super) const ENDPOINTS: &[EndpointSpec] = &[
    // ---- 시세 ----
    EndpointSpec {
        required: &["FID_INPUT_ISCD"],
        defaults: &[("FID_COND_MRKT_DIV_CODE", "J")],
        ..get(
            C,
            "inquire-price",
            "주식현재가 시세",
            "/uapi/domestic-stock/v1/quotations/inquire-price",
            "FHKST01010100",
            PaperTrId::Same,
        )
    },
    EndpointSpec {
        required: &["FID_INPUT_ISCD"],
        defaults: &[("FID_COND_MRKT_DIV_CODE", "J")],
        outputs: &["output1", "output2"],
        ..get(
            C,
            "inquire-asking-price-exp-ccn",
            "주식현재가 호가/예상체결",
            "/uapi/domestic-stock/v1/quotations/inquire-asking-price-exp-ccn",
            "FHKST01010200",
            PaperTrId::Same,
        )
    },
    EndpointSpec {
        required: &["FID_INPUT_ISCD"],
        defaults: &[("FID_COND_MRKT_DIV_CODE", "J")],
        ..get(
            C,
            "inquire-ccnl",
            "주식현재가 체결",
            "/uapi/domestic-stock/v1/quotations/inquire-ccnl",
            "FHKST01010300",
            PaperTrId::Same,
        )
    },
    EndpointSpec {
        required: &["FID_INPUT_ISCD"],
        defaults: &[
            ("FID_COND_MRKT_DIV_CODE", "J"),
            ("FID_PERIOD_DIV_CODE", "D"),
            ("FID_ORG_ADJ_PRC", "1"),
        ],
        ..get(
            C,
            "inquire-daily-price",
            "주식현재가 일자별",
            "/uapi/domestic-stock/v1/quotations/inquire-daily-price",
            "FHKST01010400",
            PaperTrId::Same,
        )
    },
    EndpointSpec {
        required: &["FID_INPUT_ISCD", "FID_INPUT_DATE_1", "FID_INPUT_DATE_2"],
        defaults: &[
            ("FID_COND_MRKT_DIV_CODE", "J"),
            ("FID_PERIOD_DIV_CODE", "D"),
            ("FID_ORG_ADJ_PRC", "0"),
        ],
        outputs: &["output1", "output2"],
        ..get(
            C,
            "inquire-daily-itemchartprice",
            "국내주식 기간별 시세(일/주/월/년)",
            "/uapi/domestic-stock/v1/quotations/inquire-daily-itemchartprice",
            "FHKST03010100",
            PaperTrId::Same,
        )
    },
    EndpointSpec {
        required: &["FID_INPUT_ISCD", "FID_INPUT_HOUR_1"],
        defaults: &[
            ("FID_COND_MRKT_DIV_CODE", "J"),
            ("FID_ETC_CLS_CODE", ""),
            ("FID_PW_DATA_INCU_YN", "N"),
        ],
        outputs: &["output1", "output2"],
        ..get(
            C,
            "inquire-time-itemchartprice",
            "주식당일분봉조회",
            "/uapi/domestic-stock/v1/quotations/inquire-time-itemchartprice",
            "FHKST03010200",
            PaperTrId::Same,
        )
    },
    EndpointSpec {
        defaults: &[
            ("FID_COND_MRKT_DIV_CODE", "J"),
            ("FID_COND_SCR_DIV_CODE", "20171"),
            ("FID_INPUT_ISCD", "0000"),
            ("FID_DIV_CLS_CODE", "0"),
            ("FID_BLNG_CLS_CODE", "0"),
            ("FID_TRGT_CLS_CODE", "111111111"),
            ("FID_TRGT_EXLS_CLS_CODE", "0000000000"),
            ("FID_INPUT_PRICE_1", ""),
            ("FID_INPUT_PRICE_2", ""),
            ("FID_VOL_CNT", ""),
            ("FID_INPUT_DATE_1", ""),
        ],
        ..get(
            C,
            "volume-rank",
            "거래량순위",
            "/uapi/domestic-stock/v1/quotations/volume-rank",
            "FHPST01710000",
            PaperTrId::Unsupported,
        )
    },
    EndpointSpec {
        required: &["BASS_DT"],
        defaults: &[("CTX_AREA_FK", ""), ("CTX_AREA_NK", "")],
        paging: Paging::Continuation {
            cursors: CURSOR_PLAIN,
        },
        ..get(
            C,
            "chk-holiday",
            "국내휴장일조회",
            "/uapi/domestic-stock/v1/quotations/chk-holiday",
            "CTCA0903R",
            PaperTrId::Unsupported,
        )
    },
    // ---- 계좌 ----
    EndpointSpec {
        required: ACCOUNT,
        defaults: &[
            ("AFHR_FLPR_YN", "N"),
            ("OFL_YN", ""),
            ("INQR_DVSN", "02"),
            ("UNPR_DVSN", "01"),
            ("FUND_STTL_ICLD_YN", "N"),
            ("FNCG_AMT_AUTO_RDPT_YN", "N"),
            ("PRCS_DVSN", "00"),
            ("CTX_AREA_FK100", ""),
            ("CTX_AREA_NK100", ""),
        ],
        outputs: &["output1", "output2"],
        paging: Paging::Continuation { cursors: CURSOR_100 },
        ..get(
            C,
            "inquire-balance",
            "주식잔고조회",
            "/uapi/domestic-stock/v1/trading/inquire-balance",
            "TTTC8434R",
            PaperTrId::Prefixed,
        )
    },
    EndpointSpec {
        required: &["CANO", "ACNT_PRDT_CD", "INQR_STRT_DT", "INQR_END_DT"],
        defaults: &[
            ("SLL_BUY_DVSN_CD", "00"),
            ("INQR_DVSN", "00"),
            ("PDNO", ""),
            ("CCLD_DVSN", "00"),
            ("ORD_GNO_BRNO", ""),
            ("ODNO", ""),
            ("INQR_DVSN_3", "00"),
            ("INQR_DVSN_1", ""),
            ("EXCG_ID_DVSN_CD", "KRX"),
            ("CTX_AREA_FK100", ""),
            ("CTX_AREA_NK100", ""),
        ],
        outputs: &["output1", "output2"],
        paging: Paging::Continuation { cursors: CURSOR_100 },
        ..get(
            C,
            "inquire-daily-ccld",
            "주식일별주문체결조회",
            "/uapi/domestic-stock/v1/trading/inquire-daily-ccld",
            "TTTC0081R",
            PaperTrId::Prefixed,
        )
    },
    EndpointSpec {
        required: &["CANO", "ACNT_PRDT_CD", "PDNO"],
        defaults: &[
            ("ORD_UNPR", ""),
            ("ORD_DVSN", "01"),
            ("CMA_EVLU_AMT_ICLD_YN", "N"),
            ("OVRS_ICLD_YN", "N"),
        ],
        ..get(
            C,
            "inquire-psbl-order",
            "매수가능조회",
            "/uapi/domestic-stock/v1/trading/inquire-psbl-order",
            "TTTC8908R",
            PaperTrId::Prefixed,
        )
    },
    EndpointSpec {
        required: ACCOUNT,
        defaults: &[
            ("INQR_DVSN_1", "0"),
            ("INQR_DVSN_2", "0"),
            ("CTX_AREA_FK100", ""),
            ("CTX_AREA_NK100", ""),
        ],
        paging: Paging::Continuation { cursors: CURSOR_100 },
        ..get(
            C,
            "inquire-psbl-rvsecncl",
            "주식정정취소가능주문조회",
            "/uapi/domestic-stock/v1/trading/inquire-psbl-rvsecncl",
            "TTTC0084R",
            PaperTrId::Unsupported,
        )
    },
    EndpointSpec {
        required: &["CANO", "ACNT_PRDT_CD", "INQR_STRT_DT", "INQR_END_DT"],
        defaults: &[
            ("SORT_DVSN", "00"),
            ("INQR_DVSN", "00"),
            ("CBLC_DVSN", "00"),
            ("PDNO", ""),
            ("CTX_AREA_FK100", ""),
            ("CTX_AREA_NK100", ""),
        ],
        outputs: &["output1", "output2"],
        paging: Paging::Continuation { cursors: CURSOR_100 },
        ..get(
            C,
            "inquire-period-profit",
            "기간별손익일별합산조회",
            "/uapi/domestic-stock/v1/trading/inquire-period-profit",
            "TTTC8708R",
            PaperTrId::Unsupported,
        )
    },
    // ---- 주문 ----
    EndpointSpec {
        required: &["CANO", "ACNT_PRDT_CD", "PDNO", "ORD_DVSN", "ORD_QTY", "ORD_UNPR"],
        defaults: &[("EXCG_ID_DVSN_CD", "KRX")],
        ..order(
            C,
            "order-cash-buy",
            "주식주문(현금) 매수",
            "/uapi/domestic-stock/v1/trading/order-cash",
            "TTTC0012U",
            PaperTrId::Prefixed,
        )
    },
    EndpointSpec {
        required: &["CANO", "ACNT_PRDT_CD", "PDNO", "ORD_DVSN", "ORD_QTY", "ORD_UNPR"],
        defaults: &[("EXCG_ID_DVSN_CD", "KRX"), ("SLL_TYPE", "01")],
        ..order(
            C,
            "order-cash-sell",
            "주식주문(현금) 매도",
            "/uapi/domestic-stock/v1/trading/order-cash",
            "TTTC0011U",
            PaperTrId::Prefixed,
        )
    },
    EndpointSpec {
        required: &[
            "CANO",
            "ACNT_PRDT_CD",
            "KRX_FWDG_ORD_ORGNO",
            "ORGN_ODNO",
            "ORD_DVSN",
            "RVSE_CNCL_DVSN_CD",
            "ORD_QTY",
            "QTY_ALL_ORD_YN",
        ],
        defaults: &[("ORD_UNPR", "0"), ("EXCG_ID_DVSN_CD", "KRX")],
        ..order(
            C,
            "order-rvsecncl",
            "주식주문(정정취소)",
            "/uapi/domestic-stock/v1/trading/order-rvsecncl",
            "TTTC0013U",
            PaperTrId::Prefixed,
        )
    },
];
