//! Emulated DynamoDB tables: item storage, expectations, query evaluation,
//! throughput bookkeeping and the operation provider.
#![allow(missing_docs, clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod condition;
pub mod config;
pub mod error;
pub mod expectation;
pub mod handler;
pub mod provider;
pub mod state;
pub mod storage;
pub mod throughput;
