use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Empty, Uint128};
use cw_storage_plus::{Item, Map};

#[cw_serde]
pub struct Config {
    pub owner: Addr,
    pub fee_recipient: Addr,
    /// Protocol fee in basis points, applied to each sale.
    pub fee_bps: u16,
}

#[cw_serde]
pub struct Listing {
    pub item_id: String,
    pub seller: Addr,
    pub payment_token: Addr,
    pub price: Uint128,
    pub is_active: bool,
    pub total_sales: u64,
}

pub const CONFIG: Item<Config> = Item::new("config");

pub const ACCEPTED_TOKENS: Map<Addr, Empty> = Map::new("accepted_tokens");

// Records are never removed, so a delisted id stays taken.
pub const LISTINGS: Map<String, Listing> = Map::new("listings");

pub const LISTING_COUNT: Item<u64> = Item::new("listing_count");

pub const PURCHASES: Map<(Addr, String), Empty> = Map::new("purchases");

pub const BUYER_PURCHASE_COUNT: Map<Addr, u64> = Map::new("buyer_purchase_count");
