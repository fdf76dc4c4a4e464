pub mod cli;
pub mod config;
pub mod engine;
pub mod entities;
pub mod error;
pub mod events;
pub mod models;
pub mod output;
pub mod random;
pub mod state;
pub mod stations;
pub mod stats;
pub mod trace;
