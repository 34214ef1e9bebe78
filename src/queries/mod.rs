//! Query modules for the CalEnder SDK.
//!
//! Each module provides a query struct that borrows from the SDK's
//! [`ApiClient`](crate::client::ApiClient) and exposes methods returning
//! `Result<T>` with typed models.

pub mod auth;
pub mod subscriptions;

pub use auth::AuthQuery;
pub use subscriptions::SubscriptionQuery;
