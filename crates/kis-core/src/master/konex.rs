//! 코넥스 종목 마스터 (`konex_code.mst`) 레이아웃.

use super::MasterLayout;

pub const KONEX_LAYOUT: MasterLayout = MasterLayout {
    name: "konex",
    short_code_width: 9,
    standard_code_width: 12,
    tail: &[
        ("security_group_code", 2),
        ("market_cap_size", 1),
        ("industry_large", 4),
        ("industry_medium", 4),
        ("industry_small", 4),
        ("trading_halt_yn", 1),
        ("clearing_trade_yn", 1),
        ("managed_issue_yn", 1),
        ("market_warning_code", 2),
        ("warning_notice_yn", 1),
        ("unfaithful_disclosure_yn", 1),
        ("backdoor_listing_yn", 1),
        ("lock_type_code", 2),
        ("par_value_change_code", 2),
        ("capital_increase_code", 2),
        ("margin_rate", 3),
        ("credit_order_yn", 1),
        ("credit_period", 3),
        ("prev_volume", 12),
        ("par_value", 12),
        ("listing_date", 8),
        ("listed_shares", 15),
        ("capital", 21),
        ("settlement_month", 2),
        ("public_offering_price", 7),
        ("preferred_stock_code", 1),
        ("short_selling_overheat_yn", 1),
        ("abnormal_rise_yn", 1),
        ("sales", 9),
        ("operating_profit", 9),
        ("ordinary_profit", 9),
        ("net_income", 5),
        ("roe", 9),
        ("base_year_month", 8),
        ("market_cap", 9),
        ("credit_limit_exceed_yn", 1),
        ("collateral_loan_yn", 1),
        ("stock_loan_yn", 1),
    ],
};
