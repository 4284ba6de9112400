use cosmwasm_std::{Addr, Event};
use sha3::{Digest, Keccak256};

use crate::payment::FeeSplit;
use crate::state::{Config, Listing};

/// Hex keccak-256 of the item id, the indexed form indexers look up.
pub fn item_id_hash(item_id: &str) -> String {
    hex::encode(Keccak256::digest(item_id.as_bytes()))
}

pub fn listed(listing: &Listing) -> Event {
    Event::new("listed")
        .add_attribute("item_id", &listing.item_id)
        .add_attribute("seller", &listing.seller)
        .add_attribute("payment_token", &listing.payment_token)
        .add_attribute("price", listing.price)
}

pub fn delisted(item_id: &str) -> Event {
    Event::new("delisted").add_attribute("item_id", item_id)
}

pub fn purchased(listing: &Listing, buyer: &Addr, split: &FeeSplit) -> Event {
    Event::new("purchased")
        .add_attribute("item_id_hash", item_id_hash(&listing.item_id))
        .add_attribute("item_id", &listing.item_id)
        .add_attribute("buyer", buyer)
        .add_attribute("seller", &listing.seller)
        .add_attribute("price", listing.price)
        .add_attribute("seller_amount", split.seller_amount)
        .add_attribute("fee", split.fee)
}

pub fn token_accepted(token: &Addr) -> Event {
    Event::new("token_accepted").add_attribute("token", token)
}

pub fn config_updated(config: &Config) -> Event {
    Event::new("config_updated")
        .add_attribute("fee_recipient", &config.fee_recipient)
        .add_attribute("fee_bps", config.fee_bps.to_string())
}

pub fn ownership_transferred(previous: &Addr, new_owner: &Addr) -> Event {
    Event::new("ownership_transferred")
        .add_attribute("previous_owner", previous)
        .add_attribute("new_owner", new_owner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::Uint128;

    #[test]
    fn hash_matches_keccak256() {
        assert_eq!(
            item_id_hash("abc"),
            "4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45"
        );
    }

    #[test]
    fn purchased_carries_split() {
        let listing = Listing {
            item_id: "ebook1".to_string(),
            seller: Addr::unchecked("seller"),
            payment_token: Addr::unchecked("usdc"),
            price: Uint128::new(1000),
            is_active: true,
            total_sales: 1,
        };
        let split = FeeSplit {
            fee: Uint128::new(25),
            seller_amount: Uint128::new(975),
        };
        let event = purchased(&listing, &Addr::unchecked("buyer"), &split);

        assert_eq!(event.ty, "purchased");
        let attr = |key: &str| {
            event
                .attributes
                .iter()
                .find(|a| a.key == key)
                .map(|a| a.value.clone())
        };
        assert_eq!(attr("item_id_hash"), Some(item_id_hash("ebook1")));
        assert_eq!(attr("seller_amount").as_deref(), Some("975"));
        assert_eq!(attr("fee").as_deref(), Some("25"));
        assert_eq!(attr("price").as_deref(), Some("1000"));
    }
}
