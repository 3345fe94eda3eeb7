//! Duka
//!
//! Duka is the cart, catalog and checkout state engine behind a client-rendered
//! secondhand kids' clothing storefront. One shared cart store feeds every
//! surface that renders from it, and the cart survives restarts through a
//! single durable-storage payload.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod fixtures;
pub mod prelude;
pub mod products;
pub mod receipt;
pub mod storage;
pub mod utils;
pub mod views;
