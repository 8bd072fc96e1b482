//! Terminal views. Each command renders only what the `view` transforms
//! produce.

pub mod analysis;
pub mod assets;
pub mod ath;
pub mod history;
pub mod projections;
pub mod setup;
pub mod ui;
