//! Data models for crawled products.

mod product;

pub use product::{ListingRow, ProductRecord};
