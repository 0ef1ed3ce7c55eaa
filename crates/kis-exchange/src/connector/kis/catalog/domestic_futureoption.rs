//! 국내선물옵션 (`/uapi/domestic-futureoption/v1`).

use super::get;
use crate::connector::kis::endpoint::{Category, EndpointSpec, Paging, PaperTrId, CURSOR_200};

const C: Category = Category::DomesticFutureOption;

pub(super) const ENDPOINTS: &[EndpointSpec] = &[
    EndpointSpec {
        required: &["FID_INPUT_ISCD"],
        defaults: &[("FID_COND_MRKT_DIV_CODE", "F")],
        outputs: &["output1", "output2", "output3"],
        ..get(
            C,
            "inquire-price",
            "선물옵션 시세",
            "/uapi/domestic-futureoption/v1/quotations/inquire-price",
            "FHMIF10000000",
            PaperTrId::Same,
        )
    },
    EndpointSpec {
        required: &["FID_INPUT_ISCD"],
        defaults: &[("FID_COND_MRKT_DIV_CODE", "F")],
        outputs: &["output1", "output2"],
        ..get(
            C,
            "inquire-asking-price",
            "선물옵션 시세호가",
            "/uapi/domestic-futureoption/v1/quotations/inquire-asking-price",
            "FHMIF10010000",
            PaperTrId::Same,
        )
    },
    EndpointSpec {
        required: &["CANO", "ACNT_PRDT_CD"],
        defaults: &[
            ("MGNA_DVSN", "01"),
            ("EXCC_STAT_CD", "1"),
            ("CTX_AREA_FK200", ""),
            ("CTX_AREA_NK200", ""),
        ],
        outputs: &["output1", "output2"],
        paging: Paging::Continuation { cursors: CURSOR_200 },
        ..get(
            C,
            "inquire-balance",
            "선물옵션 잔고현황",
            "/uapi/domestic-futureoption/v1/trading/inquire-balance",
            "CTFO6118R",
            PaperTrId::Prefixed,
        )
    },
    EndpointSpec {
        required: &["CANO", "ACNT_PRDT_CD", "STRT_ORD_DT", "END_ORD_DT"],
        defaults: &[
            ("SLL_BUY_DVSN_CD", "00"),
            ("CCLD_NCCS_DVSN", "00"),
            ("SORT_SQN", "DS"),
            ("STRT_ODNO", ""),
            ("PDNO", ""),
            ("MKET_ID_CD", ""),
            ("CTX_AREA_FK200", ""),
            ("CTX_AREA_NK200", ""),
        ],
        outputs: &["output1", "output2"],
        paging: Paging::Continuation { cursors: CURSOR_200 },
        ..get(
            C,
            "inquire-ccnl",
            "선물옵션 주문체결내역",
            "/uapi/domestic-futureoption/v1/trading/inquire-ccnl",
            "TTTO5201R",
            PaperTrId::Prefixed,
        )
    },
];
