//! Erased handles.
//!
//! An erased handle is what a [`Poly`](crate::Poly) holds: exactly one concrete value (or an alias to one) hidden
//! behind the interface contract `C`. Every handle knows how to:
//!
//! - Clone itself into a new, independent handle of the same concrete type and the same [`Mode`].
//! - Hand out a view of its concrete value typed as the contract.
//! - Give up part of its lifetime, so that handles valid for different lifetimes can live side by side.
//!
//! The set of handle shapes is closed: [`Owned`](crate::storage::Owned) and [`Aliased`](crate::storage::Aliased).

use crate::{concept::Contract, error::Error};
use std::{
  cell::{Ref, RefMut},
  fmt,
  ops::{Deref, DerefMut},
};

/// How a handle relates to its concrete value.
///
/// The mode is chosen at construction and preserved by cloning: cloning an aliasing handle yields another alias to
/// the same storage, never a copy of it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mode {
  /// The handle owns its concrete value; cloning deep-copies it.
  Owned,
  /// The handle refers to caller-owned storage; cloning copies the reference.
  Aliased,
}

impl fmt::Display for Mode {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Mode::Owned => f.write_str("owned"),
      Mode::Aliased => f.write_str("aliased"),
    }
  }
}

/// Shared view of an erased value, typed as `C`, a contract viewed for `'h`.
pub enum Delegate<'h, C>
where
  C: ?Sized,
{
  /// Borrowed straight out of an owning handle.
  Direct(&'h C),
  /// Borrowed through the cell of an aliasing handle.
  Shared(Ref<'h, C>),
}

impl<'h, C> Deref for Delegate<'h, C>
where
  C: ?Sized,
{
  type Target = C;

  fn deref(&self) -> &C {
    match self {
      Delegate::Direct(r) => r,
      Delegate::Shared(r) => r,
    }
  }
}

/// Exclusive view of an erased value, typed as `C`, a contract viewed for `'h`.
pub enum DelegateMut<'h, C>
where
  C: ?Sized,
{
  /// Borrowed straight out of an owning handle.
  Direct(&'h mut C),
  /// Borrowed through the cell of an aliasing handle.
  Shared(RefMut<'h, C>),
}

impl<'h, C> Deref for DelegateMut<'h, C>
where
  C: ?Sized,
{
  type Target = C;

  fn deref(&self) -> &C {
    match self {
      DelegateMut::Direct(r) => r,
      DelegateMut::Shared(r) => r,
    }
  }
}

impl<'h, C> DerefMut for DelegateMut<'h, C>
where
  C: ?Sized,
{
  fn deref_mut(&mut self) -> &mut C {
    match self {
      DelegateMut::Direct(r) => r,
      DelegateMut::Shared(r) => r,
    }
  }
}

pub(crate) mod sealed {
  pub trait Sealed {}
}

/// Types that support type erasure behind the contract `C`.
///
/// This trait is sealed; the only implementors are the storage strategies of [`storage`](crate::storage).
pub trait Erased<'a, C>: sealed::Sealed + 'a
where
  C: ?Sized + Contract,
{
  /// Produce a new handle with the same concrete type, an equal value and the same [`Mode`].
  fn clone_erased(&self) -> Box<dyn Erased<'a, C> + 'a>;

  /// Forget that the handle is valid for `'a`, keeping only the shorter `'b`.
  ///
  /// The handle is moved as is; nothing gets allocated.
  fn narrow<'b>(self: Box<Self>) -> Box<dyn Erased<'b, C> + 'b>
  where
    'a: 'b;

  /// Shared access to the concrete value, typed as the view of `C`.
  fn erased<'s>(&'s self) -> Result<Delegate<'s, C::View<'s>>, Error>
  where
    C: 's;

  /// Exclusive access to the concrete value, typed as the view of `C`.
  fn erased_mut<'s>(&'s mut self) -> Result<DelegateMut<'s, C::View<'s>>, Error>
  where
    C: 's;

  /// Ownership mode of this handle.
  fn mode(&self) -> Mode;
}
