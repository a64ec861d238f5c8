//! Backend API Layer
//!
//! The [`FitnessApi`](client::FitnessApi) trait defines every backend
//! operation the core consumes; [`client::HttpApi`] speaks HTTP to a real
//! server and [`mock::MockApi`] runs the whole backend in process for
//! offline mode and tests. Wire shapes live in [`types`].

pub mod client;
pub mod mock;
pub mod types;
