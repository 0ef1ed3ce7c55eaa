//! 요청 파라미터 맵.
//!
//! KIS API의 쿼리/본문 키는 모두 대문자(`FID_INPUT_ISCD`, `CANO` 등)이므로
//! 삽입 시 키를 대문자로 정규화합니다. 삽입 순서는 보존됩니다.

use crate::error::{CoreError, CoreResult};
use serde_json::{Map, Value};

/// 삽입 순서를 보존하는 문자열 파라미터 맵.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    entries: Vec<(String, String)>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// 값 설정. 같은 키가 있으면 교체합니다.
    pub fn set(&mut self, key: impl AsRef<str>, value: impl Into<String>) -> &mut Self {
        let key = key.as_ref().trim().to_uppercase();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// 빌더 형태의 [`RequestParams::set`].
    pub fn with(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// 필수 값 설정. 비어 있으면 네트워크 호출 전에 에러를 반환합니다.
    pub fn require(&mut self, key: impl AsRef<str>, value: impl Into<String>) -> CoreResult<&mut Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(CoreError::MissingParameter(key.as_ref().to_uppercase()));
        }
        Ok(self.set(key, value))
    }

    /// 키가 없을 때만 값 설정.
    pub fn set_default(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        if !self.contains(key.as_ref()) {
            self.set(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_uppercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// 모든 필수 키가 존재하고 비어 있지 않은지 확인합니다.
    ///
    /// 처음 발견한 누락 키로 에러를 반환합니다.
    pub fn check_required(&self, required: &[&str]) -> CoreResult<()> {
        for key in required {
            match self.get(key) {
                Some(v) if !v.trim().is_empty() => {}
                _ => return Err(CoreError::MissingParameter(key.to_uppercase())),
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// POST 본문용 JSON 객체.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Value::Object(map)
    }
}

impl<K, V> FromIterator<(K, V)> for RequestParams
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = RequestParams::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

/// `KEY=VALUE` 형식의 문자열을 분리합니다.
///
/// 값은 비어 있을 수 있지만 키는 비어 있을 수 없습니다.
pub fn parse_assignment(input: &str) -> CoreResult<(String, String)> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| CoreError::InvalidParameter(format!("KEY=VALUE 형식이 아님: {}", input)))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(CoreError::InvalidParameter(format!("키가 비어 있음: {}", input)));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_uppercased_and_replaced() {
        let mut params = RequestParams::new();
        params.set("fid_input_iscd", "005930");
        params.set("FID_INPUT_ISCD", "000660");

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("fid_input_iscd"), Some("000660"));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let params: RequestParams = [("b", "1"), ("a", "2"), ("c", "3")].into_iter().collect();
        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_require_rejects_blank() {
        let mut params = RequestParams::new();
        let err = params.require("cano", "  ").unwrap_err();
        assert!(matches!(err, CoreError::MissingParameter(ref k) if k == "CANO"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_check_required() {
        let params = RequestParams::new()
            .with("CANO", "12345678")
            .with("ACNT_PRDT_CD", "");

        assert!(params.check_required(&["CANO"]).is_ok());
        let err = params.check_required(&["CANO", "ACNT_PRDT_CD"]).unwrap_err();
        assert!(matches!(err, CoreError::MissingParameter(ref k) if k == "ACNT_PRDT_CD"));
    }

    #[test]
    fn test_set_default_keeps_existing() {
        let mut params = RequestParams::new().with("INQR_DVSN", "01");
        params.set_default("INQR_DVSN", "02");
        params.set_default("UNPR_DVSN", "01");
        assert_eq!(params.get("INQR_DVSN"), Some("01"));
        assert_eq!(params.get("UNPR_DVSN"), Some("01"));
    }

    #[test]
    fn test_to_json() {
        let params = RequestParams::new().with("pdno", "005930");
        assert_eq!(params.to_json(), serde_json::json!({"PDNO": "005930"}));
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("FID_INPUT_ISCD=005930").unwrap(),
            ("FID_INPUT_ISCD".to_string(), "005930".to_string())
        );
        assert_eq!(parse_assignment("CTX=").unwrap().1, "");
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }
}
