pub mod catalog_items;
pub mod order_items;
pub mod orders;
pub mod reviews;
pub mod users;

pub use catalog_items::Entity as CatalogItems;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use reviews::Entity as Reviews;
pub use users::Entity as Users;
