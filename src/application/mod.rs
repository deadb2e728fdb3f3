//! Application layer containing the checkout and callback orchestration.
//!
//! `PaymentGateway` is the entry point. Each operation lives in its own
//! module as an `impl PaymentGateway` block; the transition table and the
//! redirect builder are pure functions so they can be tested in isolation.

pub mod banks;
pub mod checkout;
pub mod gateway;
pub mod pending;
pub mod redirect;
pub mod transition;
pub mod webhook;
