use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::{CartLine, CheckoutTotals},
    dto::{
        auth::{SigninRequest, SignupRequest, UserInfo},
        catalog::{
            CatalogItemList, CreateReviewRequest, ItemWithReviews, ReviewCreated,
            UpdateCatalogItemRequest,
        },
        orders::{CreateOrderRequest, DailySales, OrderList, OrderSummary},
    },
    kind::CatalogKind,
    models::{CatalogItem, GeoPoint, Order, OrderItem, PaymentResult, Review, ShippingAddress},
    response::{ApiResponse, Meta},
    routes::{catalog, health, orders, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::signup,
        users::signin,
        catalog::list_items,
        catalog::list_paged,
        catalog::search_items,
        catalog::get_by_slug,
        catalog::get_item,
        catalog::create_item,
        catalog::update_item,
        catalog::delete_item,
        catalog::create_review,
        orders::create_order,
        orders::list_all_orders,
        orders::list_my_orders,
        orders::order_summary,
        orders::get_order,
        orders::pay_order,
        orders::deliver_order,
        orders::delete_order
    ),
    components(
        schemas(
            CatalogKind,
            CatalogItem,
            Review,
            GeoPoint,
            ShippingAddress,
            PaymentResult,
            Order,
            OrderItem,
            CartLine,
            CheckoutTotals,
            SignupRequest,
            SigninRequest,
            UserInfo,
            UpdateCatalogItemRequest,
            CreateReviewRequest,
            CatalogItemList,
            ItemWithReviews,
            ReviewCreated,
            CreateOrderRequest,
            OrderList,
            DailySales,
            OrderSummary,
            health::HealthData,
            Meta,
            ApiResponse<CatalogItem>,
            ApiResponse<CatalogItemList>,
            ApiResponse<ItemWithReviews>,
            ApiResponse<ReviewCreated>,
            ApiResponse<UserInfo>,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<OrderSummary>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Users", description = "Sign up and sign in"),
        (name = "Catalog", description = "Bouquets, flowers and packings"),
        (name = "Orders", description = "Checkout and order administration"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
