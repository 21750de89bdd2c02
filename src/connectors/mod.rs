// src/connectors/mod.rs

pub mod gamma;
