//! Each subsystem is a pure function of the state: no hidden instance state,
//! matching the teacher's `systems::{diplomacy, fiscal, policy}` free
//! functions over `&mut [CountryState]` (§9 "stateless subsystems" note).

pub mod fiscal;
pub mod labor;
pub mod political;
pub mod price;
pub mod production;
pub mod trade;
