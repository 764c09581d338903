use serde::Deserialize;
use uuid::Uuid;

use super::state::{CartLine, CartState, SessionState};
use crate::{
    dto::auth::UserInfo,
    models::{GeoPoint, ShippingAddress},
};

/// Actions dispatched by the frontend, in its `{type, payload}` wire shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CartAction {
    AddItem(CartLine),
    StartNewBouquet,
    RemoveItem(Uuid),
    RemoveBouquet(u32),
    ClearCart,
    SetShippingAddress(ShippingAddress),
    SetShippingLocation(GeoPoint),
    SetPaymentMethod(String),
    SignIn(UserInfo),
    SignOut,
    /// Any action type this store does not handle.
    #[serde(other)]
    Unknown,
}

/// Pure transition function. Never fails: invalid or unknown actions return
/// the input state unchanged.
pub fn reduce(state: &SessionState, action: CartAction) -> SessionState {
    let mut next = state.clone();
    match action {
        CartAction::AddItem(line) => add_item(&mut next.cart, line),
        CartAction::StartNewBouquet => {
            next.cart.bouquet_number = next.cart.max_bouquet_number().map_or(1, |max| max + 1);
        }
        CartAction::RemoveItem(item_id) => {
            next.cart.cart_items.retain(|line| line.item_id != item_id);
        }
        CartAction::RemoveBouquet(number) => remove_bouquet(&mut next.cart, number),
        CartAction::ClearCart => next.cart.cart_items.clear(),
        CartAction::SetShippingAddress(address) => next.cart.shipping_address = address,
        CartAction::SetShippingLocation(location) => {
            next.cart.shipping_address.location = Some(location);
        }
        CartAction::SetPaymentMethod(method) => next.cart.payment_method = method,
        CartAction::SignIn(user) => next.user_info = Some(user),
        CartAction::SignOut => {
            next.user_info = None;
            next.cart = CartState::default();
        }
        CartAction::Unknown => {}
    }
    next
}

fn add_item(cart: &mut CartState, mut line: CartLine) {
    if line.quantity == 0 {
        return;
    }

    let existing = cart
        .cart_items
        .iter()
        .position(|item| item.item_id == line.item_id);

    line.bouquet_number = if line.kind.is_bouquet_component() {
        let prior = existing.and_then(|idx| cart.cart_items[idx].bouquet_number);
        Some(prior.unwrap_or(cart.bouquet_number))
    } else {
        None
    };

    match existing {
        Some(idx) => cart.cart_items[idx] = line,
        None => cart.cart_items.push(line),
    }
}

fn remove_bouquet(cart: &mut CartState, number: u32) {
    cart.cart_items.retain(|line| {
        !(line.kind.is_bouquet_component() && line.bouquet_number == Some(number))
    });
    if cart.bouquet_number == number {
        cart.bouquet_number = number.saturating_sub(1).max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::CatalogKind;

    fn line(kind: CatalogKind, price: f64, quantity: u32) -> CartLine {
        CartLine {
            item_id: Uuid::new_v4(),
            kind,
            name: format!("{kind:?}"),
            image: "/images/p1.jpg".into(),
            slug: format!("{kind:?}-{}", Uuid::new_v4()).to_lowercase(),
            price,
            quantity,
            bouquet_number: None,
        }
    }

    fn run(actions: Vec<CartAction>) -> SessionState {
        actions
            .into_iter()
            .fold(SessionState::default(), |state, action| reduce(&state, action))
    }

    #[test]
    fn re_adding_an_item_replaces_the_line() {
        let rose = line(CatalogKind::Product, 12.0, 1);
        let mut again = rose.clone();
        again.quantity = 4;

        let state = run(vec![CartAction::AddItem(rose), CartAction::AddItem(again)]);

        assert_eq!(state.cart.cart_items.len(), 1);
        assert_eq!(state.cart.cart_items[0].quantity, 4);
    }

    #[test]
    fn bouquet_components_are_grouped_until_a_new_bouquet_starts() {
        let flower_a = line(CatalogKind::Flower, 3.0, 5);
        let packing_b = line(CatalogKind::Packing, 7.0, 1);
        let flower_c = line(CatalogKind::Flower, 4.0, 3);
        let bouquet = line(CatalogKind::Product, 45.0, 1);

        let state = run(vec![
            CartAction::AddItem(flower_a.clone()),
            CartAction::AddItem(packing_b.clone()),
            CartAction::AddItem(bouquet.clone()),
            CartAction::StartNewBouquet,
            CartAction::AddItem(flower_c.clone()),
        ]);

        let number = |id| state.cart.line(id).and_then(|l| l.bouquet_number);
        assert_eq!(number(flower_a.item_id), Some(1));
        assert_eq!(number(packing_b.item_id), Some(1));
        assert_eq!(number(flower_c.item_id), Some(2));
        assert_eq!(number(bouquet.item_id), None);
    }

    #[test]
    fn products_never_keep_a_bouquet_number() {
        let mut bouquet = line(CatalogKind::Product, 45.0, 1);
        bouquet.bouquet_number = Some(9);

        let state = run(vec![CartAction::AddItem(bouquet)]);
        assert_eq!(state.cart.cart_items[0].bouquet_number, None);
    }

    #[test]
    fn updating_a_component_keeps_its_original_bouquet() {
        let flower = line(CatalogKind::Flower, 3.0, 1);
        let mut more = flower.clone();
        more.quantity = 7;

        let state = run(vec![
            CartAction::AddItem(flower),
            CartAction::StartNewBouquet,
            CartAction::AddItem(more),
        ]);

        assert_eq!(state.cart.bouquet_number, 2);
        assert_eq!(state.cart.cart_items[0].bouquet_number, Some(1));
        assert_eq!(state.cart.cart_items[0].quantity, 7);
    }

    #[test]
    fn start_new_bouquet_on_empty_cart_allocates_one() {
        let state = run(vec![CartAction::StartNewBouquet]);
        assert_eq!(state.cart.bouquet_number, 1);
    }

    #[test]
    fn removing_the_active_bouquet_steps_the_counter_back() {
        let flower_a = line(CatalogKind::Flower, 3.0, 1);
        let flower_b = line(CatalogKind::Flower, 3.0, 1);
        let bouquet = line(CatalogKind::Product, 30.0, 1);

        let state = run(vec![
            CartAction::AddItem(flower_a.clone()),
            CartAction::AddItem(bouquet.clone()),
            CartAction::StartNewBouquet,
            CartAction::AddItem(flower_b.clone()),
            CartAction::RemoveBouquet(2),
        ]);

        assert_eq!(state.cart.bouquet_number, 1);
        assert!(state.cart.line(flower_b.item_id).is_none());
        assert!(state.cart.line(flower_a.item_id).is_some());
        assert!(state.cart.line(bouquet.item_id).is_some());
    }

    #[test]
    fn removing_another_bouquet_keeps_the_counter() {
        let flower_a = line(CatalogKind::Flower, 3.0, 1);
        let flower_b = line(CatalogKind::Flower, 3.0, 1);

        let state = run(vec![
            CartAction::AddItem(flower_a.clone()),
            CartAction::StartNewBouquet,
            CartAction::AddItem(flower_b),
            CartAction::RemoveBouquet(1),
        ]);

        assert_eq!(state.cart.bouquet_number, 2);
        assert_eq!(state.cart.cart_items.len(), 1);
    }

    #[test]
    fn remove_item_and_clear_cart() {
        let a = line(CatalogKind::Product, 10.0, 1);
        let b = line(CatalogKind::Packing, 2.0, 1);

        let state = run(vec![
            CartAction::AddItem(a.clone()),
            CartAction::AddItem(b.clone()),
            CartAction::RemoveItem(a.item_id),
        ]);
        assert_eq!(state.cart.cart_items, vec![CartLine { bouquet_number: Some(1), ..b }]);

        let cleared = reduce(&state, CartAction::ClearCart);
        assert!(cleared.cart.cart_items.is_empty());
    }

    #[test]
    fn zero_quantity_add_is_ignored() {
        let state = run(vec![CartAction::AddItem(line(CatalogKind::Flower, 1.0, 0))]);
        assert!(state.cart.cart_items.is_empty());
    }

    #[test]
    fn shipping_location_merges_into_address() {
        let address = ShippingAddress {
            full_name: "Olena K".into(),
            address: "Khreshchatyk 1".into(),
            city: "Kyiv".into(),
            location: None,
        };
        let state = run(vec![
            CartAction::SetShippingAddress(address),
            CartAction::SetShippingLocation(GeoPoint { lat: 50.45, lng: 30.52 }),
        ]);
        assert_eq!(state.cart.shipping_address.city, "Kyiv");
        assert_eq!(
            state.cart.shipping_address.location,
            Some(GeoPoint { lat: 50.45, lng: 30.52 })
        );
    }

    #[test]
    fn sign_out_clears_the_session() {
        let user = UserInfo {
            id: Uuid::new_v4(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            is_admin: false,
            token: "t".into(),
        };
        let state = run(vec![
            CartAction::SignIn(user),
            CartAction::AddItem(line(CatalogKind::Flower, 3.0, 2)),
            CartAction::SetPaymentMethod("PayPal".into()),
            CartAction::SignOut,
        ]);
        assert_eq!(state, SessionState::default());
    }

    #[test]
    fn unknown_actions_are_no_ops() {
        let action: CartAction = serde_json::from_value(serde_json::json!({
            "type": "SET_FULLBOX_ON"
        }))
        .unwrap();
        assert_eq!(action, CartAction::Unknown);

        let state = run(vec![CartAction::AddItem(line(CatalogKind::Product, 5.0, 1))]);
        assert_eq!(reduce(&state, action), state);
    }

    #[test]
    fn actions_decode_from_the_frontend_wire_shape() {
        let id = Uuid::new_v4();
        let action: CartAction = serde_json::from_value(serde_json::json!({
            "type": "REMOVE_ITEM",
            "payload": id,
        }))
        .unwrap();
        assert_eq!(action, CartAction::RemoveItem(id));
    }

    #[test]
    fn same_actions_give_same_state() {
        let flower = line(CatalogKind::Flower, 3.0, 2);
        let actions = vec![
            CartAction::AddItem(flower.clone()),
            CartAction::StartNewBouquet,
            CartAction::AddItem(line(CatalogKind::Packing, 1.0, 1)),
            CartAction::RemoveItem(flower.item_id),
        ];
        assert_eq!(run(actions.clone()), run(actions));
    }
}
