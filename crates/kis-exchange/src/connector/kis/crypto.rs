//! 실시간 체결통보 복호화.
//!
//! 체결통보(H0STCNI0 등)는 구독 응답으로 받은 key/iv로 AES-256-CBC 암호화되어
//! base64로 전달됩니다.

use crate::error::{KisError, KisResult};
use aes::Aes256;
use base64::{engine::general_purpose::STANDARD, Engine};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};

type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// base64 암호문을 복호화해 UTF-8 문자열로 반환.
pub fn decrypt_payload(key: &str, iv: &str, cipher_text: &str) -> KisResult<String> {
    let mut buf = STANDARD
        .decode(cipher_text.trim())
        .map_err(|e| KisError::Decrypt(format!("base64 디코딩 실패: {}", e)))?;

    let decryptor = Aes256CbcDec::new_from_slices(key.as_bytes(), iv.as_bytes())
        .map_err(|e| KisError::Decrypt(format!("key/iv 길이 오류: {}", e)))?;

    let plain = decryptor
        .decrypt_padded_mut::<Pkcs7>(&mut buf)
        .map_err(|e| KisError::Decrypt(format!("패딩 오류: {}", e)))?;

    String::from_utf8(plain.to_vec())
        .map_err(|e| KisError::Decrypt(format!("UTF-8 변환 실패: {}", e)))
}
