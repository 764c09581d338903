use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use super::{
    reducer::{CartAction, reduce},
    state::{CartState, SessionState},
};

/// Durable client storage keys.
pub mod keys {
    pub const USER_INFO: &str = "userInfo";
    pub const CART_ITEMS: &str = "cartItems";
    pub const SHIPPING_ADDRESS: &str = "shippingAddress";
    pub const PAYMENT_METHOD: &str = "paymentMethod";
    pub const BOUQUET_NUMBER: &str = "bouquetNumber";

    pub const ALL: [&str; 5] = [
        USER_INFO,
        CART_ITEMS,
        SHIPPING_ADDRESS,
        PAYMENT_METHOD,
        BOUQUET_NUMBER,
    ];
}

/// String key/value store with `localStorage` semantics.
pub trait ClientStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: String);
    fn remove_item(&mut self, key: &str);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ClientStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove_item(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

fn read_json<T: DeserializeOwned>(storage: &impl ClientStorage, key: &str) -> Option<T> {
    let raw = storage.get_item(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, error = %err, "discarding unreadable stored value");
            None
        }
    }
}

/// Rebuild the session from storage at startup. Missing or corrupt entries
/// fall back to their defaults.
pub fn load_session(storage: &impl ClientStorage) -> SessionState {
    let defaults = CartState::default();
    SessionState {
        user_info: read_json(storage, keys::USER_INFO),
        cart: CartState {
            cart_items: read_json(storage, keys::CART_ITEMS).unwrap_or(defaults.cart_items),
            shipping_address: read_json(storage, keys::SHIPPING_ADDRESS)
                .unwrap_or(defaults.shipping_address),
            payment_method: storage
                .get_item(keys::PAYMENT_METHOD)
                .unwrap_or(defaults.payment_method),
            bouquet_number: storage
                .get_item(keys::BOUQUET_NUMBER)
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.bouquet_number),
        },
    }
}

/// Mirror the whole session into storage. `paymentMethod` and
/// `bouquetNumber` are stored as plain strings, everything else as JSON.
pub fn persist_session(storage: &mut impl ClientStorage, state: &SessionState) {
    match state.user_info.as_ref().map(serde_json::to_string) {
        Some(Ok(json)) => storage.set_item(keys::USER_INFO, json),
        Some(Err(err)) => tracing::warn!(error = %err, "failed to serialize userInfo"),
        None => storage.remove_item(keys::USER_INFO),
    }
    write_json(storage, keys::CART_ITEMS, &state.cart.cart_items);
    write_json(storage, keys::SHIPPING_ADDRESS, &state.cart.shipping_address);
    storage.set_item(keys::PAYMENT_METHOD, state.cart.payment_method.clone());
    storage.set_item(keys::BOUQUET_NUMBER, state.cart.bouquet_number.to_string());
}

fn write_json<T: serde::Serialize>(storage: &mut impl ClientStorage, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => storage.set_item(key, json),
        Err(err) => tracing::warn!(key, error = %err, "failed to serialize stored value"),
    }
}

/// Owns the session state and keeps storage in step with it: the reducer
/// stays pure and this subscriber performs the writes after each dispatch.
pub struct SessionStore<S: ClientStorage> {
    state: SessionState,
    storage: S,
}

impl<S: ClientStorage> SessionStore<S> {
    pub fn open(storage: S) -> Self {
        let state = load_session(&storage);
        Self { state, storage }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn dispatch(&mut self, action: CartAction) -> &SessionState {
        let signing_out = matches!(action, CartAction::SignOut);
        let next = reduce(&self.state, action);

        if signing_out {
            for key in keys::ALL {
                self.storage.remove_item(key);
            }
        } else if next != self.state {
            persist_session(&mut self.storage, &next);
        }

        self.state = next;
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cart::CartLine, kind::CatalogKind};
    use uuid::Uuid;

    fn flower() -> CartLine {
        CartLine {
            item_id: Uuid::new_v4(),
            kind: CatalogKind::Flower,
            name: "Tulip".into(),
            image: "/images/f1.jpg".into(),
            slug: "tulip".into(),
            price: 2.5,
            quantity: 3,
            bouquet_number: None,
        }
    }

    #[test]
    fn empty_storage_loads_defaults() {
        let store = SessionStore::open(MemoryStorage::new());
        assert_eq!(store.state(), &SessionState::default());
    }

    #[test]
    fn dispatch_mirrors_state_into_storage() {
        let mut store = SessionStore::open(MemoryStorage::new());
        store.dispatch(CartAction::AddItem(flower()));
        store.dispatch(CartAction::SetPaymentMethod("Stripe".into()));
        store.dispatch(CartAction::StartNewBouquet);

        let storage = store.storage();
        assert_eq!(storage.get_item(keys::PAYMENT_METHOD).as_deref(), Some("Stripe"));
        assert_eq!(storage.get_item(keys::BOUQUET_NUMBER).as_deref(), Some("2"));
        assert!(storage.get_item(keys::USER_INFO).is_none());

        let reloaded = load_session(storage);
        assert_eq!(&reloaded, store.state());
    }

    #[test]
    fn corrupt_entries_fall_back_to_defaults() {
        let mut storage = MemoryStorage::new();
        storage.set_item(keys::CART_ITEMS, "{not json".into());
        storage.set_item(keys::BOUQUET_NUMBER, "seven".into());
        storage.set_item(keys::PAYMENT_METHOD, "PayPal".into());

        let state = load_session(&storage);
        assert!(state.cart.cart_items.is_empty());
        assert_eq!(state.cart.bouquet_number, 1);
        assert_eq!(state.cart.payment_method, "PayPal");
    }

    #[test]
    fn sign_out_purges_every_key() {
        let mut store = SessionStore::open(MemoryStorage::new());
        store.dispatch(CartAction::AddItem(flower()));
        assert!(!store.storage().is_empty());

        store.dispatch(CartAction::SignOut);
        assert!(store.storage().is_empty());
        assert_eq!(store.state(), &SessionState::default());
    }
}
