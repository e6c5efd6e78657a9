//! Transaction builder: validation, encoding, signing and broadcast.

pub mod builder;
pub mod encoding;
pub mod validation;

pub use builder::{build_import_transfer, build_transfer, prepare_import, send, ImportCandidate, ImportOptions};
pub use encoding::{chain_id_for, SignedTransaction, TxFields};
pub use validation::{validate_transfer, ValidationError};
