//! REST client for the marketplace RBAC API
//!
//! Every call takes explicit [`Credentials`](crate::sdk::Credentials); there is
//! no ambient token. Responses are normalized in one place and non-2xx
//! answers surface as typed errors carrying the server's `message`.

mod access;
mod assignments;
mod audit;
mod client;
mod permissions;
mod roles;


pub use access::AuthenticatedClient;
pub use client::RbacApiClient;
