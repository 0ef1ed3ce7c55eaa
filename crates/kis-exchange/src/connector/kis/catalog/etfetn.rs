//! ETF/ETN (`/uapi/etfetn/v1`).

use super::get;
use crate::connector::kis::endpoint::{Category, EndpointSpec, PaperTrId};

const C: Category = Category::EtfEtn;

pub(super) const ENDPOINTS: &[EndpointSpec] = &[
    EndpointSpec {
        required: &["FID_INPUT_ISCD"],
        defaults: &[("FID_COND_MRKT_DIV_CODE", "J")],
        ..get(
            C,
            "inquire-price",
            "ETF/ETN 현재가",
            "/uapi/etfetn/v1/quotations/inquire-price",
            "FHPST02400000",
            PaperTrId::Unsupported,
        )
    },
    EndpointSpec {
        required: &["FID_INPUT_ISCD"],
        defaults: &[("FID_COND_MRKT_DIV_CODE", "J")],
        outputs: &["output1", "output2"],
        ..get(
            C,
            "nav-comparison-trend",
            "NAV 비교추이(종목)",
            "/uapi/etfetn/v1/quotations/nav-comparison-trend",
            "FHPST02440000",
            PaperTrId::Unsupported,
        )
    },
];
