use cosmwasm_std::{OverflowError, StdError};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("Empty input")]
    EmptyInput {},

    #[error("Too many ebooks (max {max})")]
    TooManyItems { max: usize },

    #[error("Invalid ebook id")]
    InvalidItemId {},

    #[error("Ebook already listed: {item_id}")]
    AlreadyListed { item_id: String },

    #[error("Ebook not listed: {item_id}")]
    NotListed { item_id: String },

    #[error("Already purchased: {item_id}")]
    AlreadyPurchased { item_id: String },

    #[error("Not authorized")]
    NotAuthorized {},

    #[error("Caller is not the owner")]
    OwnerOnly {},

    #[error("Cannot buy your own ebook")]
    SelfPurchase {},

    #[error("Token not accepted: {token}")]
    TokenNotAccepted { token: String },

    #[error("Mixed payment tokens not allowed")]
    MixedPaymentTokens {},

    #[error("Fee must be at most 10000 bps, got {fee_bps}")]
    InvalidFeeBps { fee_bps: u16 },

    #[error("Token transfer failed: {reason}")]
    TransferFailed { reason: String },

    #[error("The reply ID is unrecognized")]
    UnrecognizedReply {},

    #[error("Cannot migrate from a different contract type: {previous_contract}")]
    InvalidMigration { previous_contract: String },

    #[error("Cannot migrate from newer version {previous_version}")]
    CannotMigrateDowngrade { previous_version: String },

    #[error("Version {version} is not of the form major.minor.patch")]
    InvalidVersion { version: String },
}
