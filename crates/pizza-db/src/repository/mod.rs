//! # Repository Module
//!
//! Database repository implementations for the ordering store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two Kinds of Repository Calls                        │
//! │                                                                         │
//! │  Pool-level (&self)                 Transaction-level (associated fn)  │
//! │  ──────────────────                 ───────────────────────────────    │
//! │  db.products().menu()               CourierRepository::claim(&mut tx,  │
//! │  db.customers().list()                  courier_id, now)               │
//! │  db.orders().undelivered()          OrderRepository::insert(&mut tx,   │
//! │                                         &new_order)                    │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  any pooled connection              the caller's open transaction      │
//! │                                                                         │
//! │  Multi-step writes (placing an order, completing a delivery) are       │
//! │  composed from transaction-level calls by the workflow, which owns     │
//! │  commit and rollback.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CustomerRepository`] - Registration, lookup, pizza counter
//! - [`ProductRepository`] - Priced menu from `v_product_prices`
//! - [`DiscountCodeRepository`] - Lookup and one-time consumption
//! - [`CourierRepository`] - Candidates, claim, cooldown release
//! - [`OrderRepository`] - Orders, items, delivery
//! - [`StatusRepository`] - Status vocabulary

pub mod courier;
pub mod customer;
pub mod discount;
pub mod order;
pub mod product;
pub mod status;

pub use courier::CourierRepository;
pub use customer::CustomerRepository;
pub use discount::DiscountCodeRepository;
pub use order::{NewOrder, OrderRepository};
pub use product::{NewProduct, ProductRepository};
pub use status::StatusRepository;
