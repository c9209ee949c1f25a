#![deny(rust_2018_idioms, unsafe_code)]

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod logger;
pub mod opt;

use error::EngineError;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Copy)]
pub enum LogFormat {
    Text,
    Json,
}
