//! Transaction construction, broadcast and key import (sweep).

use rust_decimal::Decimal;
use tracing::{info, warn};

use super::encoding::{chain_id_for, sign_transaction, SignedTransaction, TxFields};
use super::validation::validate_transfer;
use crate::account::AccountState;
use crate::client::ChainApi;
use crate::crypto::{KeyPair, PRIVATE_KEY_LEN};
use crate::error::{Result, WalletError};

/// Build and sign a transfer from this wallet. Nothing is sent.
pub fn build_transfer(state: &AccountState, to: &str, value: Decimal) -> Result<SignedTransaction> {
    let recipient = validate_transfer(state, to, value)?;
    let fields = TxFields {
        nonce: state.nonce(),
        gas_price: state.gas_price(),
        gas_limit: state.gas_limit(),
        to: recipient,
        value,
        data: Vec::new(),
        chain_id: chain_id_for(state.network_id())?,
    };
    sign_transaction(&fields, state.keys())
}

/// Broadcast a signed transaction and record it once the indexer returns it.
///
/// A broadcast failure leaves the state untouched. If the broadcast succeeds
/// but the follow-up fetch fails, the result is [`WalletError::Unrecorded`]
/// carrying the transaction id; the state is still untouched and should be
/// reconciled with [`AccountState::resync`]. The same applies when the fetched
/// transaction cannot be applied.
pub async fn send<A: ChainApi + ?Sized>(
    state: &mut AccountState,
    api: &A,
    tx: &SignedTransaction,
) -> Result<String> {
    let tx_id = api.broadcast(&tx.to_hex()).await?;
    info!("Broadcast {} from {}", tx_id, state.address());

    let fetched = api.get_tx(&tx_id, state.address()).await;
    let recorded = fetched.and_then(|raw| state.record_transaction(raw).map(|_| ()));
    if let Err(e) = recorded {
        warn!("Transaction {} sent but not recorded, local state is stale: {}", tx_id, e);
        return Err(WalletError::Unrecorded {
            tx_id,
            source: Box::new(e),
        });
    }
    Ok(tx_id)
}

/// What the network knows about a foreign key, ready to be swept.
#[derive(Clone)]
pub struct ImportCandidate {
    pub private_key: [u8; PRIVATE_KEY_LEN],
    pub address: String,
    /// Confirmed balance of the foreign account.
    pub amount: Decimal,
    pub nonce: u64,
}

impl ImportCandidate {
    pub fn with_fee(self, fee: Decimal) -> ImportOptions {
        ImportOptions {
            amount: self.amount,
            fee,
            nonce: self.nonce,
            private_key: self.private_key,
        }
    }
}

impl std::fmt::Debug for ImportCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportCandidate")
            .field("address", &self.address)
            .field("amount", &self.amount)
            .field("nonce", &self.nonce)
            .finish()
    }
}

/// Inputs for sweeping a foreign account into this wallet.
#[derive(Clone)]
pub struct ImportOptions {
    pub amount: Decimal,
    pub fee: Decimal,
    pub nonce: u64,
    pub private_key: [u8; PRIVATE_KEY_LEN],
}

/// Look up the confirmed balance and nonce of a foreign key. Does not touch `state`.
pub async fn prepare_import<A: ChainApi + ?Sized>(
    state: &AccountState,
    api: &A,
    private_key: &[u8],
) -> Result<ImportCandidate> {
    let foreign = KeyPair::from_private_key(private_key)?;
    let address = foreign.address().to_string();

    let balance = api.get_balance(&address, state.min_conf()).await?;
    let nonce = api.get_tx_count(&address).await?;
    info!("Import candidate {}: confirmed {}, nonce {}", address, balance.confirmed_balance, nonce);

    let mut key = [0u8; PRIVATE_KEY_LEN];
    key.copy_from_slice(private_key);
    Ok(ImportCandidate {
        private_key: key,
        address,
        amount: balance.confirmed_balance,
        nonce,
    })
}

/// Sign a transfer of `amount - fee` from the foreign key to this wallet.
///
/// Fails with [`WalletError::InsufficientFunds`] when nothing would be left
/// after the fee.
pub fn build_import_transfer(state: &AccountState, options: &ImportOptions) -> Result<SignedTransaction> {
    let send_amount = match options.amount.checked_sub(options.fee) {
        Some(left) if left > Decimal::ZERO => left,
        _ => {
            return Err(WalletError::InsufficientFunds {
                amount: options.amount,
                fee: options.fee,
            })
        }
    };

    let signer = KeyPair::from_private_key(&options.private_key)?;
    let fields = TxFields {
        nonce: options.nonce,
        gas_price: state.gas_price(),
        gas_limit: state.gas_limit(),
        to: state.address().to_string(),
        value: send_amount,
        data: Vec::new(),
        chain_id: chain_id_for(state.network_id())?,
    };
    sign_transaction(&fields, &signer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::DEFAULT_MIN_CONF;
    use crate::client::mock::{raw_tx, test_address, MockApi, TEST_SEED};
    use crate::crypto::parse_private_key;
    use crate::tx::validation::ValidationError;

    const OTHER: &str = "0x2222222222222222222222222222222222222222";
    const FOREIGN_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const FOREIGN_ADDR: &str = "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23";

    async fn funded(api: &MockApi) -> AccountState {
        AccountState::from_seed(&TEST_SEED, "mainnet", DEFAULT_MIN_CONF, api).await.unwrap()
    }

    fn decode(signed: &SignedTransaction) -> (u64, Vec<u8>, Vec<u8>) {
        let rlp = rlp::Rlp::new(signed.raw());
        (rlp.val_at(0).unwrap(), rlp.val_at(3).unwrap(), rlp.val_at(4).unwrap())
    }

    #[tokio::test]
    async fn test_build_transfer_uses_state_fields() {
        let me = test_address();
        let api = MockApi::new().with_account(&me, 1_000_000, 1_000_000, 7);
        let state = funded(&api).await;

        let signed = build_transfer(&state, OTHER, Decimal::from(1000)).unwrap();
        let (nonce, to, value) = decode(&signed);
        assert_eq!(nonce, 7);
        assert_eq!(format!("0x{}", hex::encode(to)), OTHER);
        assert_eq!(value, vec![0x03, 0xe8]);
        assert!(api.broadcasts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_build_transfer_accepts_iban_recipient() {
        let me = test_address();
        let api = MockApi::new().with_account(&me, 1_000_000, 1_000_000, 0);
        let state = funded(&api).await;

        let signed = build_transfer(&state, "XE7338O073KYGTWWZN0F2WZ0R8PX5ZPPZS", Decimal::from(1)).unwrap();
        let (_, to, _) = decode(&signed);
        assert_eq!(hex::encode(to), "00c5496aee77c1ba1f0854206a26dda82a81d6d8");
    }

    #[tokio::test]
    async fn test_build_transfer_rejected_by_gate() {
        let api = MockApi::new();
        let state = funded(&api).await;
        let err = build_transfer(&state, OTHER, Decimal::from(1)).unwrap_err();
        assert!(matches!(err, WalletError::Validation(ValidationError::ExceedsBalance { .. })));
    }

    #[tokio::test]
    async fn test_build_transfer_unknown_network() {
        let me = test_address();
        let api = MockApi::new().with_account(&me, 1_000_000, 1_000_000, 0);
        let mut state = funded(&api).await;
        state.network_id = "atlantis".to_string();
        assert!(matches!(
            build_transfer(&state, OTHER, Decimal::from(1)),
            Err(WalletError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_build_transfer_oversized_numeric_network() {
        let me = test_address();
        let api = MockApi::new().with_account(&me, 1_000_000, 1_000_000, 0);
        let state = AccountState::from_seed(&TEST_SEED, "18446744073709551615", DEFAULT_MIN_CONF, &api)
            .await
            .unwrap();
        assert!(matches!(
            build_transfer(&state, OTHER, Decimal::from(1)),
            Err(WalletError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_send_records_transaction() {
        let me = test_address();
        let api = MockApi::new()
            .with_account(&me, 1_000_000, 1_000_000, 2)
            .with_tx(raw_tx("0xfeed", &me, OTHER, 1000, 0));
        let mut state = funded(&api).await;

        let signed = build_transfer(&state, OTHER, Decimal::from(1000)).unwrap();
        let tx_id = send(&mut state, &api, &signed).await.unwrap();

        assert_eq!(tx_id, "0xfeed");
        assert_eq!(api.broadcasts.lock().unwrap()[0], signed.to_hex());
        assert!(signed.to_hex().starts_with("0x"));
        assert_eq!(state.nonce(), 3);
        assert_eq!(state.balance(), Decimal::from(1_000_000 - 1000 - 21000));
        assert_eq!(state.history()[0].hash, "0xfeed");
        assert_eq!(state.pending_spends().unwrap(), Decimal::from(1000 + 21000));
    }

    #[tokio::test]
    async fn test_send_broadcast_failure_leaves_state() {
        let me = test_address();
        let api = MockApi::new().with_account(&me, 1_000_000, 1_000_000, 2);
        let mut state = funded(&api).await;
        api.fail("broadcast");

        let signed = build_transfer(&state, OTHER, Decimal::from(1000)).unwrap();
        let err = send(&mut state, &api, &signed).await.unwrap_err();
        assert!(matches!(err, WalletError::Remote(_)));
        assert_eq!(api.call_count("get_tx"), 0);
        assert_eq!(state.nonce(), 2);
        assert!(state.history().is_empty());
    }

    #[tokio::test]
    async fn test_send_fetch_failure_reports_tx_id() {
        let me = test_address();
        let api = MockApi::new().with_account(&me, 1_000_000, 1_000_000, 2);
        let mut state = funded(&api).await;
        api.fail("get_tx");

        let signed = build_transfer(&state, OTHER, Decimal::from(1000)).unwrap();
        match send(&mut state, &api, &signed).await {
            Err(WalletError::Unrecorded { tx_id, source }) => {
                assert_eq!(tx_id, "0xfeed");
                assert!(matches!(*source, WalletError::Remote(_)));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(state.nonce(), 2);
        assert_eq!(state.balance(), Decimal::from(1_000_000));
    }

    #[tokio::test]
    async fn test_send_unapplicable_fetch_reports_tx_id() {
        let me = test_address();
        let mut fetched = raw_tx("0xfeed", &me, OTHER, 1000, 0);
        fetched.gas_price = Decimal::MAX;
        let api = MockApi::new().with_account(&me, 1_000_000, 1_000_000, 2).with_tx(fetched);
        let mut state = funded(&api).await;

        let signed = build_transfer(&state, OTHER, Decimal::from(1000)).unwrap();
        match send(&mut state, &api, &signed).await {
            Err(WalletError::Unrecorded { tx_id, source }) => {
                assert_eq!(tx_id, "0xfeed");
                assert!(matches!(*source, WalletError::Overflow(_)));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(state.nonce(), 2);
        assert_eq!(state.balance(), Decimal::from(1_000_000));
    }

    #[tokio::test]
    async fn test_prepare_import_reads_foreign_account() {
        let api = MockApi::new().with_account(FOREIGN_ADDR, 600_000, 500_000, 11);
        let state = funded(&api).await;
        let before = state.serialize();

        let key = parse_private_key(FOREIGN_KEY).unwrap();
        let candidate = prepare_import(&state, &api, &key).await.unwrap();
        assert_eq!(candidate.address, FOREIGN_ADDR);
        assert_eq!(candidate.amount, Decimal::from(500_000));
        assert_eq!(candidate.nonce, 11);
        assert_eq!(candidate.private_key, key);
        assert_eq!(state.serialize(), before);
        assert!(!format!("{:?}", candidate).contains(&FOREIGN_KEY[2..]));
    }

    #[tokio::test]
    async fn test_prepare_import_propagates_remote_failure() {
        let api = MockApi::new();
        let state = funded(&api).await;
        api.fail("get_tx_count");
        let key = parse_private_key(FOREIGN_KEY).unwrap();
        assert!(matches!(prepare_import(&state, &api, &key).await, Err(WalletError::Remote(_))));
    }

    #[tokio::test]
    async fn test_import_transfer_insufficient_funds() {
        let api = MockApi::new();
        let state = funded(&api).await;
        let options = ImportOptions {
            amount: Decimal::from(100),
            fee: Decimal::from(150),
            nonce: 0,
            private_key: parse_private_key(FOREIGN_KEY).unwrap(),
        };
        assert!(matches!(
            build_import_transfer(&state, &options),
            Err(WalletError::InsufficientFunds { .. })
        ));
    }

    #[tokio::test]
    async fn test_import_transfer_sweeps_to_wallet() {
        let api = MockApi::new().with_account(FOREIGN_ADDR, 500_000, 500_000, 4);
        let state = funded(&api).await;
        let key = parse_private_key(FOREIGN_KEY).unwrap();
        let options = prepare_import(&state, &api, &key).await.unwrap().with_fee(state.default_fee());

        let signed = build_import_transfer(&state, &options).unwrap();
        let (nonce, to, value) = decode(&signed);
        assert_eq!(nonce, 4);
        assert_eq!(format!("0x{}", hex::encode(to)), state.address());
        // 500000 - 42000 = 458000
        assert_eq!(value, vec![0x06, 0xfd, 0x10]);
    }

    #[tokio::test]
    async fn test_sent_import_credits_wallet() {
        let me = test_address();
        let api = MockApi::new()
            .with_account(&me, 0, 0, 0)
            .with_account(FOREIGN_ADDR, 500_000, 500_000, 0)
            .with_tx(raw_tx("0xfeed", FOREIGN_ADDR, &me, 458_000, 0));
        let mut state = funded(&api).await;
        let key = parse_private_key(FOREIGN_KEY).unwrap();
        let options = prepare_import(&state, &api, &key).await.unwrap().with_fee(state.default_fee());

        let signed = build_import_transfer(&state, &options).unwrap();
        send(&mut state, &api, &signed).await.unwrap();
        // Recorded like any other transaction: value less its maximum fee.
        assert_eq!(state.balance(), Decimal::from(458_000 - 21_000));
        assert_eq!(state.nonce(), 0);
    }
}
