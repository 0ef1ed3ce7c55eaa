//! 엔드포인트 카탈로그.
//!
//! 분류별 파일에 [`EndpointSpec`] 상수 배열로 정의되어 있습니다.
//! 이름은 분류 안에서만 유일하므로 `분류/이름` 형식으로 찾을 수 있습니다.

mod domestic_bond;
mod domestic_futureoption;
mod domestic_stock;
mod elw;
mod etfetn;
mod overseas_stock;

use super::client::Method;
use super::endpoint::{Category, EndpointSpec, Paging, PaperTrId};

/// 분류별 정의 배열.
fn tables() -> [&'static [EndpointSpec]; 6] {
    [
        domestic_stock::ENDPOINTS,
        overseas_stock::ENDPOINTS,
        domestic_futureoption::ENDPOINTS,
        domestic_bond::ENDPOINTS,
        elw::ENDPOINTS,
        etfetn::ENDPOINTS,
    ]
}

/// 전체 엔드포인트.
pub fn all() -> impl Iterator<Item = &'static EndpointSpec> {
    tables().into_iter().flatten()
}

pub fn by_category(category: Category) -> impl Iterator<Item = &'static EndpointSpec> {
    all().filter(move |spec| spec.category == category)
}

/// 이름으로 조회.
///
/// `domestic_stock/inquire-price`처럼 분류를 붙이면 정확히 찾고,
/// 이름만 주면 카탈로그 순서상 첫 번째 항목을 반환합니다.
pub fn find(query: &str) -> Option<&'static EndpointSpec> {
    match query.split_once('/') {
        Some((category, name)) => {
            let category = Category::parse(category)?;
            by_category(category).find(|spec| spec.name == name)
        }
        None => all().find(|spec| spec.name == query),
    }
}

/// GET 조회 기본형 (`output` 하나, 연속 조회 없음).
const fn get(
    category: Category,
    name: &'static str,
    description: &'static str,
    path: &'static str,
    tr_id: &'static str,
    paper: PaperTrId,
) -> EndpointSpec {
    EndpointSpec {
        name,
        category,
        description,
        method: Method::Get,
        path,
        tr_id,
        paper,
        required: &[],
        defaults: &[],
        outputs: &["output"],
        paging: Paging::None,
        hashkey: false,
    }
}

/// 주문용 POST 기본형 (해시 키 포함).
const fn order(
    category: Category,
    name: &'static str,
    description: &'static str,
    path: &'static str,
    tr_id: &'static str,
    paper: PaperTrId,
) -> EndpointSpec {
    EndpointSpec {
        method: Method::Post,
        hashkey: true,
        ..get(category, name, description, path, tr_id, paper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_category_has_entries() {
        for category in Category::ALL {
            assert!(by_category(category).count() > 0, "{} is empty", category);
        }
    }

    #[test]
    fn test_names_unique_within_category() {
        let mut seen = HashSet::new();
        for spec in all() {
            assert!(
                seen.insert((spec.category, spec.name)),
                "duplicate endpoint {}/{}",
                spec.category,
                spec.name
            );
        }
    }

    #[test]
    fn test_definitions_are_consistent() {
        for spec in all() {
            assert!(spec.path.starts_with("/uapi/"), "{}", spec.name);
            assert!(!spec.outputs.is_empty(), "{}", spec.name);
            assert!(!spec.tr_id.is_empty(), "{}", spec.name);
            // 필수 파라미터에는 기본값을 두지 않는다
            for (key, _) in spec.defaults {
                assert!(!spec.required.contains(key), "{}: {}", spec.name, key);
            }
            if spec.hashkey {
                assert_eq!(spec.method, Method::Post, "{}", spec.name);
            }
        }
    }

    #[test]
    fn test_find_qualified_and_plain() {
        let spec = find("overseas_stock/inquire-balance").unwrap();
        assert_eq!(spec.tr_id, "TTTS3012R");

        let spec = find("inquire-balance").unwrap();
        assert_eq!(spec.category, Category::DomesticStock);
        assert_eq!(spec.tr_id, "TTTC8434R");

        assert!(find("domestic_stock/nope").is_none());
        assert!(find("unknown/inquire-price").is_none());
    }
}
