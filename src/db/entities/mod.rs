//! SeaORM entity definitions

pub mod integration;
