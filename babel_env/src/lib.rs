//! Babel Environment Layer
//!
//! Generating a page costs 40 sequential cipher evaluations on ~120-digit
//! integers. This crate moves that work off the caller's responsiveness path:
//! - Compute runs on a blocking pool behind the [`LibraryRuntime`] trait
//! - A newer page request cancels the one in flight (the viewport moved on)
//! - Requests can carry a timeout
//!
//! # Example
//!
//! ```ignore
//! use babel_core::{Library, PageRef};
//! use babel_env::{PageService, TokioRuntime};
//! use std::sync::Arc;
//!
//! let library = Arc::new(Library::reference()?);
//! let service = PageService::new(library, TokioRuntime::shared());
//!
//! let lines = service.fetch_page(PageRef::new(0u64, 0, 0, 0, 0)).await?;
//! ```

mod cancel;
mod error;
mod runtime;
mod service;
mod tokio_impl;

pub use cancel::CancelToken;
pub use error::EnvError;
pub use runtime::LibraryRuntime;
pub use service::PageService;
pub use tokio_impl::TokioRuntime;
