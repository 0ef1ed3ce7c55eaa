//! 장내채권 (`/uapi/domestic-bond/v1`). 모의투자 미지원.

use super::get;
use crate::connector::kis::endpoint::{Category, EndpointSpec, Paging, PaperTrId, CURSOR_200};

const C: Category = Category::DomesticBond;

pub(super) const ENDPOINTS: &[EndpointSpec] = &[
    EndpointSpec {
        required: &["FID_INPUT_ISCD"],
        defaults: &[("FID_COND_MRKT_DIV_CODE", "B")],
        ..get(
            C,
            "inquire-price",
            "장내채권현재가(시세)",
            "/uapi/domestic-bond/v1/quotations/inquire-price",
            "FHKBJ773400C0",
            PaperTrId::Unsupported,
        )
    },
    EndpointSpec {
        required: &["CANO", "ACNT_PRDT_CD"],
        defaults: &[
            ("INQR_CNDT", "00"),
            ("PDNO", ""),
            ("BUY_DT", ""),
            ("CTX_AREA_FK200", ""),
            ("CTX_AREA_NK200", ""),
        ],
        paging: Paging::Continuation { cursors: CURSOR_200 },
        ..get(
            C,
            "inquire-balance",
            "장내채권 잔고조회",
            "/uapi/domestic-bond/v1/trading/inquire-balance",
            "CTSC8407R",
            PaperTrId::Unsupported,
        )
    },
];
