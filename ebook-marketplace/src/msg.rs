use crate::state::Listing;
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::Uint128;

#[cw_serde]
pub struct InstantiateMsg {
    /// Defaults to the instantiating sender.
    pub owner: Option<String>,
    pub fee_recipient: String,
    pub fee_bps: u16,
    #[serde(default)]
    pub accepted_tokens: Vec<String>,
}

/// One row of a bulk listing submitted by the owner on behalf of a seller.
#[cw_serde]
pub struct ListingEntry {
    pub item_id: String,
    pub seller: String,
    pub payment_token: String,
    pub price: Uint128,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// List an ebook with the sender as seller.
    ListItem {
        item_id: String,
        payment_token: String,
        price: Uint128,
    },
    /// Owner only. At most 20 entries, all-or-nothing.
    BulkListItems { entries: Vec<ListingEntry> },
    DelistItem { item_id: String },
    /// At most 20 ids, all-or-nothing.
    BulkDelistItems { item_ids: Vec<String> },
    /// The buyer must have granted this contract a cw20 allowance for the price.
    PurchaseItem { item_id: String },
    /// At most 10 ids sharing one payment token, paid with a single pull.
    BulkPurchaseItems { item_ids: Vec<String> },
    AddAcceptedToken { token: String },
    UpdateConfig {
        fee_recipient: Option<String>,
        fee_bps: Option<u16>,
    },
    TransferOwnership { new_owner: String },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},
    #[returns(Option<Listing>)]
    GetListing { item_id: String },
    /// Index-aligned with `item_ids`; unknown ids yield zeroed values.
    #[returns(BulkListingsResponse)]
    GetBulkListings { item_ids: Vec<String> },
    #[returns(Vec<Listing>)]
    GetListingsBySeller {
        seller: String,
        start_after: Option<String>,
        limit: Option<u32>,
    },
    #[returns(Vec<Listing>)]
    GetAllListings {
        start_after: Option<String>,
        limit: Option<u32>,
    },
    #[returns(bool)]
    CheckPurchase { buyer: String, item_id: String },
    #[returns(Vec<bool>)]
    CheckBulkPurchases { buyer: String, item_ids: Vec<String> },
    #[returns(u64)]
    GetTotalListingCount {},
    #[returns(u64)]
    GetBuyerPurchaseCount { buyer: String },
    #[returns(bool)]
    IsTokenAccepted { token: String },
    #[returns(Vec<String>)]
    AcceptedTokens {
        start_after: Option<String>,
        limit: Option<u32>,
    },
}

#[cw_serde]
pub struct ConfigResponse {
    pub owner: String,
    pub fee_recipient: String,
    pub fee_bps: u16,
}

#[cw_serde]
pub struct BulkListingsResponse {
    pub sellers: Vec<String>,
    pub prices: Vec<Uint128>,
    pub is_active: Vec<bool>,
    pub total_sales: Vec<u64>,
}

#[cw_serde]
pub struct MigrateMsg {}
