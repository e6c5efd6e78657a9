//! Address helpers: well-formedness, EIP-55 display and ICAP (IBAN) conversion.

use num_bigint::BigUint;
use num_traits::Num;

use crate::crypto::keccak256;
use crate::error::{Result, WalletError};

const ADDRESS_HEX_LEN: usize = 40;
const ICAP_COUNTRY: &str = "XE";
/// Direct ICAP BBAN length; addresses above 36^30 need one more digit.
const ICAP_BBAN_LEN: usize = 30;

/// `0x` followed by exactly 40 hex digits, any case.
pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x").or_else(|| address.strip_prefix("0X")) {
        Some(body) => body.len() == ADDRESS_HEX_LEN && body.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Lowercase 0x-prefixed form used for storage and comparison.
pub fn normalize_address(address: &str) -> Result<String> {
    if !is_valid_address(address) {
        return Err(WalletError::InvalidArgument(format!("malformed address: {}", address)));
    }
    Ok(format!("0x{}", address[2..].to_ascii_lowercase()))
}

pub fn same_address(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Mixed-case EIP-55 rendering of an address.
pub fn to_checksum_address(address: &str) -> Result<String> {
    let lower = normalize_address(address)?;
    let body = &lower[2..];
    let hash = keccak256(body.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in body.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

/// ISO 7064 mod 97-10 over an alphanumeric string (letters expand to 10..35).
fn mod97(input: &str) -> u32 {
    input.chars().fold(0u32, |rem, c| match c.to_digit(36) {
        Some(v) if v < 10 => (rem * 10 + v) % 97,
        Some(v) => (rem * 100 + v) % 97,
        None => rem,
    })
}

/// Encode an address in ICAP form: `XE` + check digits + base-36 BBAN.
pub fn address_to_iban(address: &str) -> Result<String> {
    let lower = normalize_address(address)?;
    let value = BigUint::from_str_radix(&lower[2..], 16)
        .map_err(|e| WalletError::InvalidArgument(format!("malformed address: {}", e)))?;

    let digits = value.to_str_radix(36).to_ascii_uppercase();
    let bban = format!("{:0>width$}", digits, width = ICAP_BBAN_LEN);
    let check = 98 - mod97(&format!("{}{}00", bban, ICAP_COUNTRY));
    Ok(format!("{}{:02}{}", ICAP_COUNTRY, check, bban))
}

pub fn is_valid_iban(iban: &str) -> bool {
    iban_to_address(iban).is_ok()
}

/// Decode an ICAP string back to a lowercase hex address.
pub fn iban_to_address(iban: &str) -> Result<String> {
    let compact: String = iban
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    let invalid = |why: &str| WalletError::InvalidArgument(format!("invalid IBAN {}: {}", iban, why));

    if !compact.starts_with(ICAP_COUNTRY) {
        return Err(invalid("country code must be XE"));
    }
    let bban_len = compact.len().saturating_sub(4);
    if bban_len != ICAP_BBAN_LEN && bban_len != ICAP_BBAN_LEN + 1 {
        return Err(invalid("wrong length"));
    }
    if !compact.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("non-alphanumeric character"));
    }

    let (head, bban) = compact.split_at(4);
    if mod97(&format!("{}{}", bban, head)) != 1 {
        return Err(invalid("checksum mismatch"));
    }

    let value = BigUint::from_str_radix(bban, 36).map_err(|_| invalid("bad base-36 digits"))?;
    let hex = value.to_str_radix(16);
    if hex.len() > ADDRESS_HEX_LEN {
        return Err(invalid("value exceeds 160 bits"));
    }
    Ok(format!("0x{:0>width$}", hex, width = ADDRESS_HEX_LEN))
}

/// Accept either a hex address or an ICAP string and return the hex form.
pub fn resolve_recipient(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if is_valid_address(trimmed) {
        normalize_address(trimmed)
    } else {
        iban_to_address(trimmed)
    }
}
