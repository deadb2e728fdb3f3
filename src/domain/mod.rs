//! Domain types and the ports the gateway talks to.

pub mod bank;
pub mod order;
pub mod payment;
pub mod ports;
pub mod reference;
