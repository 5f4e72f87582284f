//! Decision providers for simulated creatures.

pub mod ai;
