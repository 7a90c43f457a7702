//! # vcseal Testkit
//!
//! Testing utilities for vcseal.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: well-known credentials and a preconfigured simulated
//!   ledger for integration scenarios
//! - **Generators**: proptest strategies for credential documents
//!
//! ## Fixtures
//!
//! ```rust
//! use vcseal_testkit::fixtures::{sample_credential, LedgerFixture};
//!
//! let vc = sample_credential();
//! assert!(vc.is_complete());
//!
//! let fixture = LedgerFixture::new();
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use vcseal_testkit::generators::credential;
//!
//! proptest! {
//!     #[test]
//!     fn canonical_is_stable(vc in credential()) {
//!         let b1 = vcseal_core::canonical_bytes(&vc).unwrap();
//!         let b2 = vcseal_core::canonical_bytes(&vc).unwrap();
//!         prop_assert_eq!(b1, b2);
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{credential_without, sample_credential, LedgerFixture};
pub use generators::{credential, json_value};
