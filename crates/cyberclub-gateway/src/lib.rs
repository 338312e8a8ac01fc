//! # CyberClub Gateway
//! The HTTP content API: CRUD over the five collections plus the static
//! club profile. One route set per collection, identical shapes except for
//! the identity scheme (events resolve by title, the rest by id).

pub mod about;
pub mod routes;
pub mod server;

pub use server::{AppState, serve};
