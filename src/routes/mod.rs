use axum::Router;

use crate::{kind::CatalogKind, state::AppState};

pub mod catalog;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    let catalog = CatalogKind::ALL
        .into_iter()
        .fold(Router::new(), |router, kind| {
            router.nest(&format!("/{}", kind.collection()), catalog::router(kind))
        });

    catalog
        .nest("/users", users::router())
        .nest("/orders", orders::router())
}
