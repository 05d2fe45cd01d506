//! Runtime errors.
//!
//! Conformance is checked by `rustc`, so the only thing that can go wrong at runtime is borrowing an aliased value
//! while the caller (or another alias) already holds an incompatible borrow of it.

use std::cell::{BorrowError, BorrowMutError};
use thiserror::Error;

/// Errors reported when reaching the value behind a [`Poly`](crate::Poly).
#[derive(Debug, Error)]
pub enum Error {
  /// The aliased value is currently mutably borrowed elsewhere.
  #[error("aliased value is already mutably borrowed: {0}")]
  AliasBorrow(#[from] BorrowError),

  /// The aliased value is currently borrowed elsewhere.
  #[error("aliased value is already borrowed: {0}")]
  AliasBorrowMut(#[from] BorrowMutError),
}
