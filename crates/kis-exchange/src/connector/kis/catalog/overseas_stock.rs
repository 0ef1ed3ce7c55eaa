//! 해외주식 (`/uapi/overseas-price/v1`, `/uapi/overseas-stock/v1`).

use super::{get, order};
use crate::connector::kis::endpoint::{Category, EndpointSpec, Paging, PaperTrId, CURSOR_200, CURSOR_PLAIN};

const C: Category = Category::OverseasStock;

pub(super) const ENDPOINTS: &[EndpointSpec] = &[
    EndpointSpec {
        required: &["EXCD", "SYMB"],
        defaults: &[("AUTH", "")],
        ..get(
            C,
            "price",
            "해외주식 현재체결가",
            "/uapi/overseas-price/v1/quotations/price",
            "HHDFS00000300",
            PaperTrId::Same,
        )
    },
    EndpointSpec {
        required: &["EXCD", "SYMB"],
        defaults: &[("AUTH", "")],
        ..get(
            C,
            "price-detail",
            "해외주식 현재가상세",
            "/uapi/overseas-price/v1/quotations/price-detail",
            "HHDFS76200200",
            PaperTrId::Unsupported,
        )
    },
    EndpointSpec {
        required: &["EXCD", "SYMB"],
        defaults: &[("AUTH", ""), ("GUBN", "0"), ("BYMD", ""), ("MODP", "1")],
        outputs: &["output1", "output2"],
        ..get(
            C,
            "dailyprice",
            "해외주식 기간별시세",
            "/uapi/overseas-price/v1/quotations/dailyprice",
            "HHDFS76240000",
            PaperTrId::Same,
        )
    },
    EndpointSpec {
        required: &["PRDT_TYPE_CD", "PDNO"],
        ..get(
            C,
            "search-info",
            "해외주식 상품기본정보",
            "/uapi/overseas-price/v1/quotations/search-info",
            "CTPF1702R",
            PaperTrId::Unsupported,
        )
    },
    EndpointSpec {
        required: &["TRAD_DT"],
        defaults: &[("CTX_AREA_FK", ""), ("CTX_AREA_NK", "")],
        paging: Paging::Continuation {
            cursors: CURSOR_PLAIN,
        },
        ..get(
            C,
            "countries-holiday",
            "해외결제일자조회",
            "/uapi/overseas-stock/v1/quotations/countries-holiday",
            "CTOS5011R",
            PaperTrId::Unsupported,
        )
    },
    EndpointSpec {
        required: &["CANO", "ACNT_PRDT_CD", "OVRS_EXCG_CD", "TR_CRCY_CD"],
        defaults: &[("CTX_AREA_FK200", ""), ("CTX_AREA_NK200", "")],
        outputs: &["output1", "output2"],
        paging: Paging::Continuation { cursors: CURSOR_200 },
        ..get(
            C,
            "inquire-balance",
            "해외주식 잔고",
            "/uapi/overseas-stock/v1/trading/inquire-balance",
            "TTTS3012R",
            PaperTrId::Prefixed,
        )
    },
    EndpointSpec {
        required: &["CANO", "ACNT_PRDT_CD", "ORD_STRT_DT", "ORD_END_DT"],
        defaults: &[
            ("PDNO", "%"),
            ("SLL_BUY_DVSN", "00"),
            ("CCLD_NCCS_DVSN", "00"),
            ("OVRS_EXCG_CD", "%"),
            ("SORT_SQN", "DS"),
            ("ORD_DT", ""),
            ("ORD_GNO_BRNO", ""),
            ("ODNO", ""),
            ("CTX_AREA_FK200", ""),
            ("CTX_AREA_NK200", ""),
        ],
        paging: Paging::Continuation { cursors: CURSOR_200 },
        ..get(
            C,
            "inquire-ccnl",
            "해외주식 주문체결내역",
            "/uapi/overseas-stock/v1/trading/inquire-ccnl",
            "TTTS3035R",
            PaperTrId::Prefixed,
        )
    },
    EndpointSpec {
        required: &["CANO", "ACNT_PRDT_CD", "OVRS_EXCG_CD"],
        defaults: &[
            ("SORT_SQN", "DS"),
            ("CTX_AREA_FK200", ""),
            ("CTX_AREA_NK200", ""),
        ],
        paging: Paging::Continuation { cursors: CURSOR_200 },
        ..get(
            C,
            "inquire-nccs",
            "해외주식 미체결내역",
            "/uapi/overseas-stock/v1/trading/inquire-nccs",
            "TTTS3018R",
            PaperTrId::Unsupported,
        )
    },
    EndpointSpec {
        required: &[
            "CANO",
            "ACNT_PRDT_CD",
            "OVRS_EXCG_CD",
            "PDNO",
            "ORD_QTY",
            "OVRS_ORD_UNPR",
        ],
        defaults: &[("ORD_SVR_DVSN_CD", "0"), ("ORD_DVSN", "00")],
        ..order(
            C,
            "order-buy-us",
            "해외주식 주문 (미국 매수)",
            "/uapi/overseas-stock/v1/trading/order",
            "TTTT1002U",
            PaperTrId::Prefixed,
        )
    },
    EndpointSpec {
        required: &[
            "CANO",
            "ACNT_PRDT_CD",
            "OVRS_EXCG_CD",
            "PDNO",
            "ORD_QTY",
            "OVRS_ORD_UNPR",
        ],
        defaults: &[
            ("ORD_SVR_DVSN_CD", "0"),
            ("ORD_DVSN", "00"),
            ("SLL_TYPE", "00"),
        ],
        ..order(
            C,
            "order-sell-us",
            "해외주식 주문 (미국 매도)",
            "/uapi/overseas-stock/v1/trading/order",
            "TTTT1006U",
            PaperTrId::Prefixed,
        )
    },
];
