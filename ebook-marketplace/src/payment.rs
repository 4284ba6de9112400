use cosmwasm_std::{Addr, OverflowError, StdResult, SubMsg, Uint128};
use cw20::{Cw20Contract, Cw20ExecuteMsg};

pub const MAX_FEE_BPS: u16 = 10_000;
const BPS_DENOMINATOR: u128 = 10_000;

/// Reply id shared by every cw20 transfer the ledger dispatches.
pub const PAYMENT_REPLY: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub fee: Uint128,
    pub seller_amount: Uint128,
}

/// Splits a sale price into the protocol fee (floored) and the seller's share.
pub fn split_price(price: Uint128, fee_bps: u16) -> Result<FeeSplit, OverflowError> {
    let fee = price.multiply_ratio(fee_bps, BPS_DENOMINATOR);
    let seller_amount = price.checked_sub(fee)?;
    Ok(FeeSplit { fee, seller_amount })
}

/// Pulls `amount` of `token` from `owner` into the ledger's custody.
/// cw20 rejects zero-amount transfers, so nothing is dispatched for zero.
pub fn pull(
    token: &Addr,
    owner: &Addr,
    custody: &Addr,
    amount: Uint128,
) -> StdResult<Option<SubMsg>> {
    if amount.is_zero() {
        return Ok(None);
    }
    let msg = Cw20Contract(token.clone()).call(Cw20ExecuteMsg::TransferFrom {
        owner: owner.to_string(),
        recipient: custody.to_string(),
        amount,
    })?;
    Ok(Some(SubMsg::reply_on_error(msg, PAYMENT_REPLY)))
}

/// Pushes `amount` of `token` out of custody to `recipient`.
pub fn push(token: &Addr, recipient: &Addr, amount: Uint128) -> StdResult<Option<SubMsg>> {
    if amount.is_zero() {
        return Ok(None);
    }
    let msg = Cw20Contract(token.clone()).call(Cw20ExecuteMsg::Transfer {
        recipient: recipient.to_string(),
        amount,
    })?;
    Ok(Some(SubMsg::reply_on_error(msg, PAYMENT_REPLY)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::{from_json, CosmosMsg, ReplyOn, WasmMsg};

    #[test]
    fn fee_is_floored_basis_points() {
        let split = split_price(Uint128::new(1000), 250).unwrap();
        assert_eq!(split.fee, Uint128::new(25));
        assert_eq!(split.seller_amount, Uint128::new(975));

        // 2.5% of 15 USDC (6 decimals)
        let split = split_price(Uint128::new(15_000_000), 250).unwrap();
        assert_eq!(split.fee, Uint128::new(375_000));
        assert_eq!(split.seller_amount, Uint128::new(14_625_000));

        let split = split_price(Uint128::new(39), 250).unwrap();
        assert_eq!(split.fee, Uint128::zero());
        assert_eq!(split.seller_amount, Uint128::new(39));
    }

    #[test]
    fn fee_bounds() {
        let split = split_price(Uint128::new(777), 0).unwrap();
        assert_eq!(split.fee, Uint128::zero());
        assert_eq!(split.seller_amount, Uint128::new(777));

        let split = split_price(Uint128::new(777), MAX_FEE_BPS).unwrap();
        assert_eq!(split.fee, Uint128::new(777));
        assert_eq!(split.seller_amount, Uint128::zero());

        let split = split_price(Uint128::MAX, 9_999).unwrap();
        assert_eq!(split.fee + split.seller_amount, Uint128::MAX);
    }

    #[test]
    fn zero_amounts_dispatch_nothing() {
        let token = Addr::unchecked("usdc");
        let buyer = Addr::unchecked("buyer");
        let ledger = Addr::unchecked("ledger");
        assert_eq!(pull(&token, &buyer, &ledger, Uint128::zero()).unwrap(), None);
        assert_eq!(push(&token, &buyer, Uint128::zero()).unwrap(), None);
    }

    #[test]
    fn pull_targets_custody_with_error_reply() {
        let token = Addr::unchecked("usdc");
        let buyer = Addr::unchecked("buyer");
        let ledger = Addr::unchecked("ledger");

        let sub = pull(&token, &buyer, &ledger, Uint128::new(42))
            .unwrap()
            .unwrap();
        assert_eq!(sub.id, PAYMENT_REPLY);
        assert_eq!(sub.reply_on, ReplyOn::Error);
        match sub.msg {
            CosmosMsg::Wasm(WasmMsg::Execute {
                contract_addr, msg, ..
            }) => {
                assert_eq!(contract_addr, "usdc");
                let parsed: Cw20ExecuteMsg = from_json(&msg).unwrap();
                assert_eq!(
                    parsed,
                    Cw20ExecuteMsg::TransferFrom {
                        owner: "buyer".to_string(),
                        recipient: "ledger".to_string(),
                        amount: Uint128::new(42),
                    }
                );
            }
            other => panic!("unexpected message {other:?}"),
        }
    }
}
