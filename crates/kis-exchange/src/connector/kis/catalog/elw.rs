//! ELW 시세/순위.

use super::get;
use crate::connector::kis::endpoint::{Category, EndpointSpec, PaperTrId};

const C: Category = Category::Elw;

pub(super) const ENDPOINTS: &[EndpointSpec] = &[
    EndpointSpec {
        required: &["FID_INPUT_ISCD"],
        defaults: &[("FID_COND_MRKT_DIV_CODE", "W")],
        ..get(
            C,
            "inquire-elw-price",
            "ELW 현재가 시세",
            "/uapi/domestic-stock/v1/quotations/inquire-elw-price",
            "FHKEW15010000",
            PaperTrId::Same,
        )
    },
    EndpointSpec {
        defaults: &[
            ("FID_COND_MRKT_DIV_CODE", "W"),
            ("FID_COND_SCR_DIV_CODE", "20278"),
            ("FID_UNAS_INPUT_ISCD", "000000"),
            ("FID_INPUT_ISCD", "00000"),
            ("FID_INPUT_RMNN_DYNU_1", ""),
            ("FID_DIV_CLS_CODE", "0"),
            ("FID_INPUT_PRICE_1", ""),
            ("FID_INPUT_PRICE_2", ""),
            ("FID_INPUT_VOL_1", ""),
            ("FID_INPUT_VOL_2", ""),
            ("FID_INPUT_DATE_1", ""),
            ("FID_RANK_SORT_CLS_CODE", "0"),
            ("FID_BLNG_CLS_CODE", "0"),
            ("FID_INPUT_ISCD_2", ""),
            ("FID_INPUT_DATE_2", ""),
        ],
        ..get(
            C,
            "volume-rank",
            "ELW 거래량순위",
            "/uapi/elw/v1/ranking/volume-rank",
            "FHPEW02780000",
            PaperTrId::Unsupported,
        )
    },
];
