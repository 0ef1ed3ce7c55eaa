//! ELW 종목 마스터 (`elw_code.mst`) 레이아웃.

use super::MasterLayout;

/// ELW 마스터 레이아웃.
pub const ELW_LAYOUT: MasterLayout = MasterLayout {
    name: "elw",
    short_code_width: 9,
    standard_code_width: 12,
    tail: &[
        ("underlying_code_1", 9),
        ("underlying_code_2", 9),
        ("underlying_code_3", 9),
        ("underlying_code_4", 9),
        ("underlying_code_5", 9),
        ("issuer_code", 5),
        ("right_type", 1),         // C: 콜, P: 풋
        ("exercise_style", 1),     // E: 유럽형, A: 미국형
        ("settlement_type", 1),
        ("exercise_price", 12),
        ("conversion_ratio", 12),
        ("listing_date", 8),
        ("expiry_date", 8),
        ("last_trading_date", 8),
        ("payment_date", 8),
        ("lp_code", 5),
        ("lp_holding_qty", 12),
        ("knock_out_yn", 1),
        ("barrier_price", 12),
        ("listed_shares", 15),
        ("trading_halt_yn", 1),
        ("managed_issue_yn", 1),
    ],
};
