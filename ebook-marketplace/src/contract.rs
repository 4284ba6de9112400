use std::collections::BTreeSet;

#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    to_json_binary, Addr, Binary, Deps, DepsMut, Empty, Env, Event, MessageInfo, Order, Reply,
    Response, StdResult, Storage, SubMsg, SubMsgResult, Uint128,
};
use cw2::{get_contract_version, set_contract_version};
use cw_storage_plus::Bound;

use crate::error::ContractError;
use crate::events;
use crate::msg::{
    BulkListingsResponse, ConfigResponse, ExecuteMsg, InstantiateMsg, ListingEntry, MigrateMsg,
    QueryMsg,
};
use crate::payment::{self, FeeSplit, MAX_FEE_BPS, PAYMENT_REPLY};
use crate::state::{
    Config, Listing, ACCEPTED_TOKENS, BUYER_PURCHASE_COUNT, CONFIG, LISTINGS, LISTING_COUNT,
    PURCHASES,
};

// version info for migration info
pub const CONTRACT_NAME: &str = "crates.io:ebook-marketplace";
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const MAX_BULK_LIST: usize = 20;
pub const MAX_BULK_DELIST: usize = 20;
pub const MAX_BULK_PURCHASE: usize = 10;

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 30;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    if msg.fee_bps > MAX_FEE_BPS {
        return Err(ContractError::InvalidFeeBps {
            fee_bps: msg.fee_bps,
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let owner = match msg.owner {
        Some(owner) => deps.api.addr_validate(&owner)?,
        None => info.sender,
    };
    let config = Config {
        owner,
        fee_recipient: deps.api.addr_validate(&msg.fee_recipient)?,
        fee_bps: msg.fee_bps,
    };
    CONFIG.save(deps.storage, &config)?;
    LISTING_COUNT.save(deps.storage, &0)?;

    for token in msg.accepted_tokens {
        let token = deps.api.addr_validate(&token)?;
        ACCEPTED_TOKENS.save(deps.storage, token, &Empty {})?;
    }

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("owner", config.owner)
        .add_attribute("fee_recipient", config.fee_recipient)
        .add_attribute("fee_bps", config.fee_bps.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::ListItem {
            item_id,
            payment_token,
            price,
        } => execute_list_item(deps, info, item_id, payment_token, price),
        ExecuteMsg::BulkListItems { entries } => execute_bulk_list_items(deps, info, entries),
        ExecuteMsg::DelistItem { item_id } => {
            execute_delist(deps, info, vec![item_id], "delist_item")
        }
        ExecuteMsg::BulkDelistItems { item_ids } => {
            check_batch_size(item_ids.len(), MAX_BULK_DELIST)?;
            execute_delist(deps, info, item_ids, "bulk_delist_items")
        }
        ExecuteMsg::PurchaseItem { item_id } => {
            execute_purchase(deps, env, info, vec![item_id], "purchase_item")
        }
        ExecuteMsg::BulkPurchaseItems { item_ids } => {
            check_batch_size(item_ids.len(), MAX_BULK_PURCHASE)?;
            execute_purchase(deps, env, info, item_ids, "bulk_purchase_items")
        }
        ExecuteMsg::AddAcceptedToken { token } => execute_add_accepted_token(deps, info, token),
        ExecuteMsg::UpdateConfig {
            fee_recipient,
            fee_bps,
        } => execute_update_config(deps, info, fee_recipient, fee_bps),
        ExecuteMsg::TransferOwnership { new_owner } => {
            execute_transfer_ownership(deps, info, new_owner)
        }
    }
}

fn check_batch_size(len: usize, max: usize) -> Result<(), ContractError> {
    if len == 0 {
        return Err(ContractError::EmptyInput {});
    }
    if len > max {
        return Err(ContractError::TooManyItems { max });
    }
    Ok(())
}

fn ensure_owner(config: &Config, sender: &Addr) -> Result<(), ContractError> {
    if config.owner != *sender {
        return Err(ContractError::OwnerOnly {});
    }
    Ok(())
}

/// A payment token that does not even parse as an address cannot be in the
/// registry, so it is reported the same way as an unregistered one.
fn accepted_token(deps: Deps, token: String) -> Result<Addr, ContractError> {
    match deps.api.addr_validate(&token) {
        Ok(addr) if ACCEPTED_TOKENS.has(deps.storage, addr.clone()) => Ok(addr),
        _ => Err(ContractError::TokenNotAccepted { token }),
    }
}

/// Checks one prospective listing against stored state and against the ids
/// already claimed earlier in the same batch.
fn validate_listing(
    storage: &dyn Storage,
    claimed: &mut BTreeSet<String>,
    item_id: String,
    seller: Addr,
    payment_token: Addr,
    price: Uint128,
) -> Result<Listing, ContractError> {
    if LISTINGS.has(storage, item_id.clone()) || !claimed.insert(item_id.clone()) {
        return Err(ContractError::AlreadyListed { item_id });
    }
    Ok(Listing {
        item_id,
        seller,
        payment_token,
        price,
        is_active: true,
        total_sales: 0,
    })
}

fn commit_listings(
    storage: &mut dyn Storage,
    listings: &[Listing],
) -> Result<Vec<Event>, ContractError> {
    let mut emitted = Vec::with_capacity(listings.len());
    for listing in listings {
        LISTINGS.save(storage, listing.item_id.clone(), listing)?;
        emitted.push(events::listed(listing));
    }
    LISTING_COUNT.update(storage, |count| -> StdResult<u64> {
        Ok(count + listings.len() as u64)
    })?;
    Ok(emitted)
}

pub fn execute_list_item(
    deps: DepsMut,
    info: MessageInfo,
    item_id: String,
    payment_token: String,
    price: Uint128,
) -> Result<Response, ContractError> {
    if item_id.is_empty() {
        return Err(ContractError::InvalidItemId {});
    }
    let payment_token = accepted_token(deps.as_ref(), payment_token)?;

    let listing = validate_listing(
        deps.storage,
        &mut BTreeSet::new(),
        item_id,
        info.sender.clone(),
        payment_token,
        price,
    )?;
    let emitted = commit_listings(deps.storage, &[listing])?;

    Ok(Response::new()
        .add_attribute("action", "list_item")
        .add_attribute("seller", info.sender)
        .add_events(emitted))
}

pub fn execute_bulk_list_items(
    deps: DepsMut,
    info: MessageInfo,
    entries: Vec<ListingEntry>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_owner(&config, &info.sender)?;
    check_batch_size(entries.len(), MAX_BULK_LIST)?;

    let mut claimed = BTreeSet::new();
    let mut listings = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.item_id.is_empty() {
            return Err(ContractError::InvalidItemId {});
        }
        let seller = deps.api.addr_validate(&entry.seller)?;
        let payment_token = accepted_token(deps.as_ref(), entry.payment_token)?;
        listings.push(validate_listing(
            deps.storage,
            &mut claimed,
            entry.item_id,
            seller,
            payment_token,
            entry.price,
        )?);
    }

    let count = listings.len();
    let emitted = commit_listings(deps.storage, &listings)?;

    Ok(Response::new()
        .add_attribute("action", "bulk_list_items")
        .add_attribute("count", count.to_string())
        .add_events(emitted))
}

/// Sellers may delist their own items; the owner may delist anything.
/// Delisting an inactive listing leaves it inactive and still reports it.
pub fn execute_delist(
    deps: DepsMut,
    info: MessageInfo,
    item_ids: Vec<String>,
    action: &str,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    let mut delisted = Vec::with_capacity(item_ids.len());
    for item_id in item_ids {
        let listing = LISTINGS
            .may_load(deps.storage, item_id.clone())?
            .ok_or(ContractError::NotListed { item_id })?;
        if listing.seller != info.sender && config.owner != info.sender {
            return Err(ContractError::NotAuthorized {});
        }
        delisted.push(listing);
    }

    let mut emitted = Vec::with_capacity(delisted.len());
    for mut listing in delisted {
        listing.is_active = false;
        LISTINGS.save(deps.storage, listing.item_id.clone(), &listing)?;
        emitted.push(events::delisted(&listing.item_id));
    }

    Ok(Response::new()
        .add_attribute("action", action)
        .add_attribute("sender", info.sender)
        .add_events(emitted))
}

struct PurchasePlan {
    listing: Listing,
    split: FeeSplit,
}

/// Validates every item of a purchase before anything is written. All items
/// must share the payment token of the first one, since the whole batch is
/// paid with a single pull.
fn plan_purchases(
    storage: &dyn Storage,
    config: &Config,
    buyer: &Addr,
    item_ids: Vec<String>,
) -> Result<Vec<PurchasePlan>, ContractError> {
    let mut claimed = BTreeSet::new();
    let mut batch_token: Option<Addr> = None;
    let mut plans = Vec::with_capacity(item_ids.len());

    for item_id in item_ids {
        let listing = match LISTINGS.may_load(storage, item_id.clone())? {
            Some(listing) if listing.is_active => listing,
            _ => return Err(ContractError::NotListed { item_id }),
        };
        let token = batch_token.get_or_insert_with(|| listing.payment_token.clone());
        if *token != listing.payment_token {
            return Err(ContractError::MixedPaymentTokens {});
        }
        if listing.seller == *buyer {
            return Err(ContractError::SelfPurchase {});
        }
        if PURCHASES.has(storage, (buyer.clone(), item_id.clone()))
            || !claimed.insert(item_id.clone())
        {
            return Err(ContractError::AlreadyPurchased { item_id });
        }

        let split = payment::split_price(listing.price, config.fee_bps)?;
        plans.push(PurchasePlan { listing, split });
    }
    Ok(plans)
}

pub fn execute_purchase(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    item_ids: Vec<String>,
    action: &str,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let buyer = info.sender;

    let plans = plan_purchases(deps.storage, &config, &buyer, item_ids)?;
    let token = plans
        .first()
        .map(|plan| plan.listing.payment_token.clone())
        .ok_or(ContractError::EmptyInput {})?;
    let total = plans
        .iter()
        .try_fold(Uint128::zero(), |acc, plan| acc.checked_add(plan.listing.price))?;

    let mut messages: Vec<SubMsg> = vec![];
    messages.extend(payment::pull(
        &token,
        &buyer,
        &env.contract.address,
        total,
    )?);

    let count = plans.len() as u64;
    let mut emitted = Vec::with_capacity(plans.len());
    for PurchasePlan { mut listing, split } in plans {
        listing.total_sales += 1;
        LISTINGS.save(deps.storage, listing.item_id.clone(), &listing)?;
        PURCHASES.save(
            deps.storage,
            (buyer.clone(), listing.item_id.clone()),
            &Empty {},
        )?;

        messages.extend(payment::push(&token, &listing.seller, split.seller_amount)?);
        messages.extend(payment::push(&token, &config.fee_recipient, split.fee)?);
        emitted.push(events::purchased(&listing, &buyer, &split));
    }
    BUYER_PURCHASE_COUNT.update(deps.storage, buyer.clone(), |purchased| -> StdResult<u64> {
        Ok(purchased.unwrap_or_default() + count)
    })?;

    Ok(Response::new()
        .add_attribute("action", action)
        .add_attribute("buyer", buyer)
        .add_attribute("payment_token", token)
        .add_attribute("total_paid", total)
        .add_submessages(messages)
        .add_events(emitted))
}

pub fn execute_add_accepted_token(
    deps: DepsMut,
    info: MessageInfo,
    token: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_owner(&config, &info.sender)?;

    let token = deps.api.addr_validate(&token)?;
    ACCEPTED_TOKENS.save(deps.storage, token.clone(), &Empty {})?;

    Ok(Response::new()
        .add_attribute("action", "add_accepted_token")
        .add_event(events::token_accepted(&token)))
}

pub fn execute_update_config(
    deps: DepsMut,
    info: MessageInfo,
    fee_recipient: Option<String>,
    fee_bps: Option<u16>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    ensure_owner(&config, &info.sender)?;

    if let Some(fee_recipient) = fee_recipient {
        config.fee_recipient = deps.api.addr_validate(&fee_recipient)?;
    }
    if let Some(fee_bps) = fee_bps {
        if fee_bps > MAX_FEE_BPS {
            return Err(ContractError::InvalidFeeBps { fee_bps });
        }
        config.fee_bps = fee_bps;
    }
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_config")
        .add_event(events::config_updated(&config)))
}

pub fn execute_transfer_ownership(
    deps: DepsMut,
    info: MessageInfo,
    new_owner: String,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    ensure_owner(&config, &info.sender)?;

    let previous = config.owner;
    config.owner = deps.api.addr_validate(&new_owner)?;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "transfer_ownership")
        .add_event(events::ownership_transferred(&previous, &config.owner)))
}

/// Any failed cw20 transfer aborts the whole call, undoing the state written
/// before the transfers were dispatched.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(_deps: DepsMut, _env: Env, reply: Reply) -> Result<Response, ContractError> {
    match reply.id {
        PAYMENT_REPLY => match reply.result {
            SubMsgResult::Err(reason) => Err(ContractError::TransferFailed { reason }),
            SubMsgResult::Ok(_) => Ok(Response::new()),
        },
        _ => Err(ContractError::UnrecognizedReply {}),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::InvalidMigration {
            previous_contract: stored.contract,
        });
    }
    if parse_version(&stored.version)? > parse_version(CONTRACT_VERSION)? {
        return Err(ContractError::CannotMigrateDowngrade {
            previous_version: stored.version,
        });
    }
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}

fn parse_version(version: &str) -> Result<(u64, u64, u64), ContractError> {
    let mut parts = version.split('.').map(|part| part.parse::<u64>().ok());
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(Some(major)), Some(Some(minor)), Some(Some(patch)), None) => {
            Ok((major, minor, patch))
        }
        _ => Err(ContractError::InvalidVersion {
            version: version.to_string(),
        }),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::GetListing { item_id } => to_json_binary(&get_listing(deps, item_id)?),
        QueryMsg::GetBulkListings { item_ids } => {
            to_json_binary(&get_bulk_listings(deps, item_ids)?)
        }
        QueryMsg::GetListingsBySeller {
            seller,
            start_after,
            limit,
        } => to_json_binary(&get_listings_seller(deps, seller, start_after, limit)?),
        QueryMsg::GetAllListings { start_after, limit } => {
            to_json_binary(&get_all_listings(deps, start_after, limit)?)
        }
        QueryMsg::CheckPurchase { buyer, item_id } => {
            to_json_binary(&check_purchase(deps, buyer, item_id)?)
        }
        QueryMsg::CheckBulkPurchases { buyer, item_ids } => {
            to_json_binary(&check_bulk_purchases(deps, buyer, item_ids)?)
        }
        QueryMsg::GetTotalListingCount {} => to_json_binary(&LISTING_COUNT.load(deps.storage)?),
        QueryMsg::GetBuyerPurchaseCount { buyer } => {
            to_json_binary(&get_buyer_purchase_count(deps, buyer)?)
        }
        QueryMsg::IsTokenAccepted { token } => {
            to_json_binary(&is_token_accepted(deps, token)?)
        }
        QueryMsg::AcceptedTokens { start_after, limit } => {
            to_json_binary(&get_accepted_tokens(deps, start_after, limit)?)
        }
    }
}

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        owner: config.owner.into_string(),
        fee_recipient: config.fee_recipient.into_string(),
        fee_bps: config.fee_bps,
    })
}

pub fn get_listing(deps: Deps, item_id: String) -> StdResult<Option<Listing>> {
    LISTINGS.may_load(deps.storage, item_id)
}

pub fn get_bulk_listings(deps: Deps, item_ids: Vec<String>) -> StdResult<BulkListingsResponse> {
    let mut res = BulkListingsResponse {
        sellers: Vec::with_capacity(item_ids.len()),
        prices: Vec::with_capacity(item_ids.len()),
        is_active: Vec::with_capacity(item_ids.len()),
        total_sales: Vec::with_capacity(item_ids.len()),
    };
    for item_id in item_ids {
        match LISTINGS.may_load(deps.storage, item_id)? {
            Some(listing) => {
                res.sellers.push(listing.seller.into_string());
                res.prices.push(listing.price);
                res.is_active.push(listing.is_active);
                res.total_sales.push(listing.total_sales);
            }
            None => {
                res.sellers.push(String::new());
                res.prices.push(Uint128::zero());
                res.is_active.push(false);
                res.total_sales.push(0);
            }
        }
    }
    Ok(res)
}

pub fn get_listings_seller(
    deps: Deps,
    seller: String,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<Vec<Listing>> {
    let seller = deps.api.addr_validate(&seller)?;
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    LISTINGS
        .range(deps.storage, start, None, Order::Ascending)
        .filter(|item| match item {
            Ok((_, listing)) => listing.seller == seller,
            Err(_) => true,
        })
        .take(limit)
        .map(|item| item.map(|(_, listing)| listing))
        .collect()
}

pub fn get_all_listings(
    deps: Deps,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<Vec<Listing>> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    LISTINGS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, listing)| listing))
        .collect()
}

pub fn check_purchase(deps: Deps, buyer: String, item_id: String) -> StdResult<bool> {
    let buyer = deps.api.addr_validate(&buyer)?;
    Ok(PURCHASES.has(deps.storage, (buyer, item_id)))
}

pub fn check_bulk_purchases(
    deps: Deps,
    buyer: String,
    item_ids: Vec<String>,
) -> StdResult<Vec<bool>> {
    let buyer = deps.api.addr_validate(&buyer)?;
    Ok(item_ids
        .into_iter()
        .map(|item_id| PURCHASES.has(deps.storage, (buyer.clone(), item_id)))
        .collect())
}

pub fn get_buyer_purchase_count(deps: Deps, buyer: String) -> StdResult<u64> {
    let buyer = deps.api.addr_validate(&buyer)?;
    Ok(BUYER_PURCHASE_COUNT
        .may_load(deps.storage, buyer)?
        .unwrap_or_default())
}

pub fn is_token_accepted(deps: Deps, token: String) -> StdResult<bool> {
    let token = deps.api.addr_validate(&token)?;
    Ok(ACCEPTED_TOKENS.has(deps.storage, token))
}

pub fn get_accepted_tokens(
    deps: Deps,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<Vec<String>> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after
        .map(|token| deps.api.addr_validate(&token))
        .transpose()?
        .map(Bound::exclusive);

    ACCEPTED_TOKENS
        .keys(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|token| token.map(Addr::into_string))
        .collect()
}
