//! # KERI Kernel Testkit
//!
//! Testing utilities for the KERI Kernel.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Seeds with their canonical inception bytes and prefixes
//! - **Generators**: Proptest strategies for KELs and JSON payloads
//! - **Fixtures**: An incepted identifier with raw logs for scenario tests
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use keri_kernel_testkit::generators::{kel_from_params, KelParams};
//!
//! proptest! {
//!     #[test]
//!     fn replay_is_lossless(params: KelParams) {
//!         let (_, kel) = kel_from_params(&params);
//!         let replayed = keri_kernel_core::Kel::replay(kel.events().to_vec()).unwrap();
//!         prop_assert_eq!(replayed.current_state(), kel.current_state());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use keri_kernel_testkit::fixtures::TestFixture;
//! use serde_json::json;
//!
//! let mut fixture = TestFixture::with_seed(1);
//! let credential = fixture.issue("test", json!({"msg": "hi"}));
//! fixture.rotate();
//! fixture.revoke(&credential);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, TestFixture};
pub use generators::{kel_from_params, KelOp, KelParams};
pub use vectors::{all_vectors, generate_output, verify_all_vectors, GoldenVector, VectorOutput};
