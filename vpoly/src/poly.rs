//! The erasure container.

use crate::{
  concept::{Concept, Contract},
  erased::{Delegate, DelegateMut, Erased, Mode},
  error::Error,
  storage::{Aliased, Owned},
};
use log::trace;
use std::{cell::RefCell, fmt};

/// A value of any type conforming to the contract `C`, with value semantics.
///
/// `C` is the erased form of an interface contract, such as `dyn Shape`. A `Poly` always holds exactly one
/// erased handle – there is no empty state – and that handle is either [owned](Mode::Owned) or
/// [aliased](Mode::Aliased):
///
/// - [`Poly::new`] moves a concrete value into a fresh owning handle (one allocation).
/// - [`Poly::alias`] refers to a value the caller keeps in a [`RefCell`]. The borrow checker makes sure the storage
///   outlives the `Poly` and all of its clones.
///
/// Cloning a `Poly` asks the handle to clone itself, which goes through the concrete type: owned values are deep
/// copied, aliases are copied as aliases. Moving a `Poly` only moves a pointer. Assigning with [`Clone::clone_from`]
/// (or plain `=`) replaces the handle, so the destination takes the concrete type of the source.
///
/// `Poly<'a, C>` can’t be used where a `Poly<'b, C>` with a shorter `'b` is expected without going through
/// [`Poly::narrow`], which is free. This is what lets an owned `Poly<'static, C>` join a collection of aliases to
/// local values.
///
/// Most users never name `Poly` directly and go through the container generated by the
/// [`interface`](crate::interface) attribute instead, which forwards every operation of the contract.
pub struct Poly<'a, C>
where
  C: ?Sized + Contract,
{
  handle: Box<dyn Erased<'a, C> + 'a>,
}

impl<'a, C> Poly<'a, C>
where
  C: ?Sized + Contract + 'a,
{
  /// Wrap a concrete value in an owning handle.
  pub fn new<T>(value: T) -> Self
  where
    C: Concept<T>,
    T: Clone + 'a,
  {
    trace!("wrapping {} in an owned handle", std::any::type_name::<T>());

    Poly {
      handle: Box::new(Owned::new(value)),
    }
  }

  /// Alias a value owned by the caller.
  ///
  /// Mutation performed through the cell is visible through the `Poly`, and the other way around.
  pub fn alias<T>(cell: &'a RefCell<T>) -> Self
  where
    C: Concept<T>,
    T: 'a,
  {
    trace!("aliasing {}", std::any::type_name::<T>());

    Poly {
      handle: Box::new(Aliased::new(cell)),
    }
  }

  /// Keep the held handle, valid for the shorter lifetime `'b` only.
  pub fn narrow<'b>(self) -> Poly<'b, C>
  where
    'a: 'b,
  {
    Poly {
      handle: self.handle.narrow(),
    }
  }

  /// Ownership mode of the held handle.
  pub fn mode(&self) -> Mode {
    self.handle.mode()
  }

  /// Shared access to the concrete value, typed as the contract.
  ///
  /// # Panics
  ///
  /// Panics if the value is aliased and currently mutably borrowed, as [`RefCell::borrow`] does. See
  /// [`Poly::try_delegate`] for the non-panicking version.
  pub fn delegate(&self) -> Delegate<'_, C::View<'_>> {
    match self.handle.erased() {
      Ok(delegate) => delegate,
      Err(e) => panic!("{}", e),
    }
  }

  /// Exclusive access to the concrete value, typed as the contract.
  ///
  /// # Panics
  ///
  /// Panics if the value is aliased and currently borrowed, as [`RefCell::borrow_mut`] does. See
  /// [`Poly::try_delegate_mut`] for the non-panicking version.
  pub fn delegate_mut(&mut self) -> DelegateMut<'_, C::View<'_>> {
    match self.handle.erased_mut() {
      Ok(delegate) => delegate,
      Err(e) => panic!("{}", e),
    }
  }

  /// Shared access to the concrete value, failing if an aliased value is mutably borrowed.
  pub fn try_delegate(&self) -> Result<Delegate<'_, C::View<'_>>, Error> {
    self.handle.erased()
  }

  /// Exclusive access to the concrete value, failing if an aliased value is borrowed.
  pub fn try_delegate_mut(&mut self) -> Result<DelegateMut<'_, C::View<'_>>, Error> {
    self.handle.erased_mut()
  }
}

impl<'a, C> Clone for Poly<'a, C>
where
  C: ?Sized + Contract + 'a,
{
  fn clone(&self) -> Self {
    trace!("cloning {} handle", self.mode());

    Poly {
      handle: self.handle.clone_erased(),
    }
  }

  fn clone_from(&mut self, source: &Self) {
    trace!("replacing {} handle with a clone of {} handle", self.mode(), source.mode());
    self.handle = source.handle.clone_erased();
  }
}

impl<'a, C> fmt::Debug for Poly<'a, C>
where
  C: ?Sized + Contract + 'a,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("Poly").field("mode", &self.mode()).finish()
  }
}
