pub mod product;
pub mod user;

pub use product::{seed_products, Order, Product};
pub use user::{seed_users, User};
