//! Middleware shared by every route.

pub mod audit;
