//! Background work execution
//!
//! A fixed pool of named worker threads fed through a job channel, returning
//! pollable [`AsyncResult`] handles.

mod async_executor;
mod async_result;

pub use async_executor::{AsyncExecutor, AsyncTask};
pub use async_result::AsyncResult;
