//! Pix "copia e cola" payload encoder.
//!
//! Renders the EMV-MPM tag-length-value text payload for a static or dynamic Pix charge and validates its
//! self-checksum. Everything here is pure: for fixed inputs the output is byte-for-byte deterministic, which lets
//! the same order re-render its code idempotently across page reloads.
mod crc;

use sps_common::Money;
use thiserror::Error;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

pub use crc::{crc16_ccitt_false, crc16_hex};

const PAYLOAD_FORMAT_INDICATOR: &str = "01";
const PIX_GUI: &str = "br.gov.bcb.pix";
const MERCHANT_CATEGORY_CODE: &str = "0000";
const COUNTRY_CODE: &str = "BR";
const DEFAULT_REFERENCE: &str = "***";
const MAX_NAME_LEN: usize = 25;
const MAX_CITY_LEN: usize = 15;
const MAX_FIELD_LEN: usize = 99;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PixCodeError {
    #[error("Invalid merchant configuration: {0}")]
    InvalidMerchantConfig(String),
}

/// The inputs of a Pix charge. Build one with [`PixCode::new`], then call [`PixCode::encode`].
#[derive(Debug, Clone, PartialEq)]
pub struct PixCode {
    pub key: String,
    pub merchant_name: String,
    pub merchant_city: String,
    /// Omitted from the payload entirely when `None` or zero (an open-amount static code).
    pub amount: Option<Money>,
    /// Transaction reference shown on the payer's statement. Defaults to `***` when absent.
    pub reference: Option<String>,
}

impl PixCode {
    pub fn new(key: impl Into<String>, merchant_name: impl Into<String>, merchant_city: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            merchant_name: merchant_name.into(),
            merchant_city: merchant_city.into(),
            amount: None,
            reference: None,
        }
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Renders the full payload, checksum included.
    pub fn encode(&self) -> Result<String, PixCodeError> {
        let key = self.key.trim();
        if key.is_empty() {
            return Err(PixCodeError::InvalidMerchantConfig("the Pix key is empty".to_string()));
        }
        let name = normalize(&self.merchant_name, MAX_NAME_LEN);
        if name.is_empty() {
            return Err(PixCodeError::InvalidMerchantConfig(
                "the merchant name is empty after normalization".to_string(),
            ));
        }
        let city = normalize(&self.merchant_city, MAX_CITY_LEN);
        if city.is_empty() {
            return Err(PixCodeError::InvalidMerchantConfig(
                "the merchant city is empty after normalization".to_string(),
            ));
        }

        let account_info = [tlv("00", PIX_GUI)?, tlv("01", key)?].concat();
        let reference = self.reference.as_deref().filter(|r| !r.trim().is_empty()).unwrap_or(DEFAULT_REFERENCE);
        let additional_data = tlv("05", reference)?;

        let mut payload = String::with_capacity(160);
        payload.push_str(&tlv("00", PAYLOAD_FORMAT_INDICATOR)?);
        payload.push_str(&tlv("26", &account_info)?);
        payload.push_str(&tlv("52", MERCHANT_CATEGORY_CODE)?);
        payload.push_str(&tlv("53", sps_common::BRL_NUMERIC_CURRENCY_CODE)?);
        // A zero amount means "payer types the amount"; the tag is left out entirely, not emitted empty.
        if let Some(amount) = self.amount.filter(|a| !a.is_zero()) {
            payload.push_str(&tlv("54", &amount.to_bacen_string())?);
        }
        payload.push_str(&tlv("58", COUNTRY_CODE)?);
        payload.push_str(&tlv("59", &name)?);
        payload.push_str(&tlv("60", &city)?);
        payload.push_str(&tlv("62", &additional_data)?);
        // The CRC covers everything up to and including the literal "6304"
        payload.push_str("6304");
        let checksum = crc16_hex(payload.as_bytes());
        payload.push_str(&checksum);
        Ok(payload)
    }
}

/// Recomputes the checksum of a full payload and compares it against the trailing four hex digits.
pub fn validate_checksum(payload: &str) -> bool {
    if payload.len() < 8 || !payload.is_ascii() {
        return false;
    }
    let (body, declared) = payload.split_at(payload.len() - 4);
    if !body.ends_with("6304") {
        return false;
    }
    crc16_hex(body.as_bytes()) == declared
}

/// Strips diacritics (NFD decomposition, combining marks dropped), upper-cases, trims and truncates to `max_len`.
/// Truncation happens after the strip so a decomposed-accent string is measured by its final characters.
fn normalize(value: &str, max_len: usize) -> String {
    value.nfd().filter(|c| !is_combining_mark(*c)).collect::<String>().to_uppercase().trim().chars().take(max_len).collect()
}

fn tlv(tag: &str, value: &str) -> Result<String, PixCodeError> {
    if value.len() > MAX_FIELD_LEN {
        return Err(PixCodeError::InvalidMerchantConfig(format!(
            "field {tag} is too long to encode ({} bytes)",
            value.len()
        )));
    }
    Ok(format!("{tag}{:02}{value}", value.len()))
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> PixCode {
        PixCode::new("+5598984991078", "Admilson de Ribamar Coelho Sarmento Filho", "VITORIA DO MEARIM")
            .with_amount(Money::from_cents(2350))
            .with_reference("AB12")
    }

    #[test]
    fn encoding_is_deterministic() {
        let a = sample().encode().unwrap();
        let b = sample().encode().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn payload_shape() {
        let payload = sample().encode().unwrap();
        assert!(payload.starts_with("000201"), "payload was {payload}");
        assert!(payload.contains("br.gov.bcb.pix"));
        assert!(payload.contains("520400005303986"), "category/currency run missing in {payload}");
        assert!(payload.contains("540523.50"));
        assert!(payload.contains("5802BR"));
        assert!(validate_checksum(&payload), "checksum did not validate for {payload}");
    }

    #[test]
    fn name_is_normalized_then_truncated() {
        let payload = sample().encode().unwrap();
        // 41 chars upper-cased, cut to 25 after the (no-op here) diacritic strip
        assert!(payload.contains("5925ADMILSON DE RIBAMAR COELH"), "payload was {payload}");
        assert!(payload.contains("6015VITORIA DO MEAR"), "payload was {payload}");
    }

    #[test]
    fn diacritics_are_stripped_before_measuring() {
        let code = PixCode::new("chave@pix.dev", "Joāo çédille", "São Luís");
        let payload = code.encode().unwrap();
        assert!(payload.contains("5912JOAO CEDILLE"), "payload was {payload}");
        assert!(payload.contains("6008SAO LUIS"), "payload was {payload}");
        assert!(validate_checksum(&payload));
    }

    #[test]
    fn amount_is_omitted_not_zeroed() {
        let open = PixCode::new("chave@pix.dev", "Loja", "CIDADE").encode().unwrap();
        let expected_body = concat!(
            "000201",
            "2635", "0014br.gov.bcb.pix", "0113chave@pix.dev",
            "52040000",
            "5303986",
            "5802BR",
            "5904LOJA",
            "6006CIDADE",
            "62070503***",
            "6304",
        );
        // the currency tag runs straight into the country tag; no 54 field in between
        assert!(open.starts_with(expected_body), "payload was {open}");
        let zero = PixCode::new("chave@pix.dev", "Loja", "CIDADE").with_amount(Money::from_cents(0)).encode().unwrap();
        assert_eq!(open, zero);
    }

    #[test]
    fn default_reference_is_three_stars() {
        let payload = PixCode::new("chave@pix.dev", "Loja", "CIDADE").encode().unwrap();
        assert!(payload.contains("62070503***"), "payload was {payload}");
    }

    #[test]
    fn checksum_tag_is_last_and_recomputable() {
        let payload = sample().encode().unwrap();
        let declared = &payload[payload.len() - 4..];
        let recomputed = crc16_hex(payload[..payload.len() - 4].as_bytes());
        assert_eq!(declared, recomputed);
        // tampering breaks validation
        let mut tampered = payload.clone();
        tampered.replace_range(10..11, "X");
        assert!(!validate_checksum(&tampered));
    }

    #[test]
    fn misconfiguration_is_an_error_not_a_malformed_code() {
        assert!(matches!(
            PixCode::new("", "Loja", "CIDADE").encode(),
            Err(PixCodeError::InvalidMerchantConfig(_))
        ));
        assert!(matches!(
            PixCode::new("chave@pix.dev", "  ́ ", "CIDADE").encode(),
            Err(PixCodeError::InvalidMerchantConfig(_))
        ));
        assert!(matches!(
            PixCode::new("chave@pix.dev", "Loja", "").encode(),
            Err(PixCodeError::InvalidMerchantConfig(_))
        ));
    }
}
