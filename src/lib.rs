//! Lease analysis client: uploads a lease PDF to an analysis service and
//! keeps a local history of the results that can be searched, sorted,
//! filtered and exported.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod flags;
pub mod history;
pub mod query;
pub mod record;
pub mod storage;
pub mod upload;

pub use error::{LeaseLensError, Result};
pub use record::AnalysisRecord;
