//! Legacy (EIP-155) transaction encoding and signing.

use rlp::RlpStream;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::address::normalize_address;
use crate::crypto::{keccak256, KeyPair};
use crate::error::{Result, WalletError};

/// Fields of an unsigned transfer.
#[derive(Clone, Debug, PartialEq)]
pub struct TxFields {
    pub nonce: u64,
    pub gas_price: Decimal,
    pub gas_limit: Decimal,
    pub to: String,
    pub value: Decimal,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

/// Signed transaction in wire form, not yet broadcast.
#[derive(Clone, Debug, PartialEq)]
pub struct SignedTransaction {
    raw: Vec<u8>,
}

impl SignedTransaction {
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// 0x-prefixed wire hex, as accepted by the broadcast call.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }

    /// Keccak hash of the wire bytes, which is the transaction id.
    pub fn tx_hash(&self) -> String {
        format!("0x{}", hex::encode(keccak256(&self.raw)))
    }
}

/// Chain id used for replay protection on a named network.
pub fn chain_id_for(network_id: &str) -> Result<u64> {
    match network_id.to_ascii_lowercase().as_str() {
        "mainnet" => Ok(1),
        "ropsten" => Ok(3),
        "rinkeby" => Ok(4),
        "goerli" => Ok(5),
        "sepolia" => Ok(11_155_111),
        "holesky" => Ok(17_000),
        other => other
            .parse::<u64>()
            .map_err(|_| WalletError::InvalidArgument(format!("unknown network: {}", network_id))),
    }
}

fn trim_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

/// Minimal big-endian bytes of a whole, non-negative amount.
fn quantity(value: Decimal, field: &str) -> Result<Vec<u8>> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(WalletError::InvalidArgument(format!("{} must not be negative", field)));
    }
    if !value.fract().is_zero() {
        return Err(WalletError::InvalidArgument(format!("{} must be a whole number", field)));
    }
    let n = value
        .trunc()
        .to_u128()
        .ok_or_else(|| WalletError::InvalidArgument(format!("{} out of range", field)))?;
    Ok(trim_leading_zeros(&n.to_be_bytes()))
}

fn append_common(stream: &mut RlpStream, fields: &TxFields, to: &[u8]) -> Result<()> {
    stream.append(&trim_leading_zeros(&fields.nonce.to_be_bytes()));
    stream.append(&quantity(fields.gas_price, "gas price")?);
    stream.append(&quantity(fields.gas_limit, "gas limit")?);
    stream.append(&to.to_vec());
    stream.append(&quantity(fields.value, "value")?);
    stream.append(&fields.data);
    Ok(())
}

/// Hash that gets signed: `keccak(rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0]))`.
pub fn signing_hash(fields: &TxFields) -> Result<[u8; 32]> {
    let to = recipient_bytes(&fields.to)?;
    let mut stream = RlpStream::new_list(9);
    append_common(&mut stream, fields, &to)?;
    stream.append(&trim_leading_zeros(&fields.chain_id.to_be_bytes()));
    stream.append_empty_data();
    stream.append_empty_data();
    Ok(keccak256(&stream.out()))
}

fn recipient_bytes(to: &str) -> Result<Vec<u8>> {
    let normalized = normalize_address(to)?;
    hex::decode(&normalized[2..]).map_err(|e| WalletError::InvalidArgument(format!("bad recipient: {}", e)))
}

pub fn sign_transaction(fields: &TxFields, keys: &KeyPair) -> Result<SignedTransaction> {
    let digest = signing_hash(fields)?;
    let (signature, recovery_id) = keys.sign_prehash(&digest)?;

    let v = fields
        .chain_id
        .checked_mul(2)
        .and_then(|c| c.checked_add(35 + recovery_id.to_byte() as u64))
        .ok_or_else(|| WalletError::InvalidArgument(format!("chain id {} too large", fields.chain_id)))?;
    let rs = signature.to_bytes();
    let to = recipient_bytes(&fields.to)?;

    let mut stream = RlpStream::new_list(9);
    append_common(&mut stream, fields, &to)?;
    stream.append(&trim_leading_zeros(&v.to_be_bytes()));
    stream.append(&trim_leading_zeros(&rs[..32]));
    stream.append(&trim_leading_zeros(&rs[32..]));

    Ok(SignedTransaction { raw: stream.out().to_vec() })
}
