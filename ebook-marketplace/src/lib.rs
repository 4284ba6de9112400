pub mod contract;
mod error;
pub mod events;
pub mod msg;
pub mod payment;
pub mod state;

pub use crate::error::ContractError;
