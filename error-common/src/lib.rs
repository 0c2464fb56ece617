//! Common error handling utilities for the symptom inference engine
//!
//! This crate provides the error taxonomy shared by the engine library and
//! the operator tooling. It keeps startup failures (which must stop the
//! service) apart from data and validation failures, and gives every error
//! a stable code for log correlation.
//!
//! # Key Features
//!
//! - **Standardized Error Type**: one `DiagnosisError` across crates
//! - **Error Codes**: structured codes such as `CONFIG_1001`
//! - **Context Preservation**: file, row and component context for data errors
//! - **Startup Classification**: `is_startup_fatal()` marks errors that must
//!   abort initialisation instead of degrading a single request
//!
//! # Error Categories
//!
//! - **Configuration**: missing or invalid configuration, corrupt artifacts
//! - **Dataset**: malformed tabular input
//! - **VocabularyMismatch**: model and vocabulary disagree
//! - **Training**: classifier fitting problems
//! - **KnowledgeBase**: invalid knowledge-base edits or lookups
//! - **Validation**: rejected caller input
//!
//! Per-request conditions such as "no symptoms detected" are not errors;
//! the engine reports them as prediction outcomes.
//!
//! # Example
//!
//! ```rust
//! use error_common::{DiagnosisError, ErrorContext};
//!
//! fn check_slots(filled: usize) -> error_common::Result<()> {
//!     if filled == 0 {
//!         let ctx = ErrorContext::new("dataset").with_path("dataset.csv").with_row(7);
//!         return Err(DiagnosisError::dataset("dataset.csv", ctx.describe("no symptom slots")));
//!     }
//!     Ok(())
//! }
//!
//! let err = check_slots(0).unwrap_err();
//! assert_eq!(err.code(), "DATA_2001");
//! assert!(err.is_startup_fatal());
//! ```

pub mod codes;
pub mod context;
pub mod types;

pub use codes::*;
pub use context::*;
pub use types::*;
