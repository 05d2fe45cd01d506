//! Storage strategies of erased handles.

use crate::{
  concept::Concept,
  erased::{sealed::Sealed, Delegate, DelegateMut, Erased, Mode},
  error::Error,
};
use std::cell::{Ref, RefCell, RefMut};

/// Owning handle: holds its own copy of the concrete value.
#[derive(Debug)]
pub struct Owned<T> {
  value: T,
}

impl<T> Owned<T> {
  pub(crate) fn new(value: T) -> Self {
    Self { value }
  }
}

impl<T> Sealed for Owned<T> {}

impl<'a, C, T> Erased<'a, C> for Owned<T>
where
  C: ?Sized + Concept<T>,
  T: Clone + 'a,
{
  fn clone_erased(&self) -> Box<dyn Erased<'a, C> + 'a> {
    Box::new(Owned::new(self.value.clone()))
  }

  fn narrow<'b>(self: Box<Self>) -> Box<dyn Erased<'b, C> + 'b>
  where
    'a: 'b,
  {
    self
  }

  fn erased<'s>(&'s self) -> Result<Delegate<'s, C::View<'s>>, Error>
  where
    C: 's,
  {
    Ok(Delegate::Direct(C::upcast(&self.value)))
  }

  fn erased_mut<'s>(&'s mut self) -> Result<DelegateMut<'s, C::View<'s>>, Error>
  where
    C: 's,
  {
    Ok(DelegateMut::Direct(C::upcast_mut(&mut self.value)))
  }

  fn mode(&self) -> Mode {
    Mode::Owned
  }
}

/// Aliasing handle: refers to a value owned by the caller.
///
/// The value lives in a [`RefCell`] so that the caller and every alias can both read and mutate it; the `'a` lifetime
/// guarantees the storage outlives the handle and all of its clones.
#[derive(Debug)]
pub struct Aliased<'a, T> {
  cell: &'a RefCell<T>,
}

impl<'a, T> Aliased<'a, T> {
  pub(crate) fn new(cell: &'a RefCell<T>) -> Self {
    Self { cell }
  }
}

impl<'a, T> Sealed for Aliased<'a, T> {}

// the handle is valid for any `'a` the borrow of the cell outlives
impl<'a, 'c, C, T> Erased<'a, C> for Aliased<'c, T>
where
  'c: 'a,
  C: ?Sized + Concept<T>,
  T: 'c,
{
  fn clone_erased(&self) -> Box<dyn Erased<'a, C> + 'a> {
    Box::new(Aliased::new(self.cell))
  }

  fn narrow<'b>(self: Box<Self>) -> Box<dyn Erased<'b, C> + 'b>
  where
    'a: 'b,
  {
    self
  }

  fn erased<'s>(&'s self) -> Result<Delegate<'s, C::View<'s>>, Error>
  where
    C: 's,
  {
    let guard = self.cell.try_borrow()?;
    Ok(Delegate::Shared(Ref::map(guard, |value| C::upcast(value))))
  }

  fn erased_mut<'s>(&'s mut self) -> Result<DelegateMut<'s, C::View<'s>>, Error>
  where
    C: 's,
  {
    let guard = self.cell.try_borrow_mut()?;
    Ok(DelegateMut::Shared(RefMut::map(guard, |value| {
      C::upcast_mut(value)
    })))
  }

  fn mode(&self) -> Mode {
    Mode::Aliased
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::concept::Contract;

  trait Counter {
    fn get(&self) -> i32;
    fn bump(&mut self);
  }

  impl Contract for dyn Counter {
    type View<'v> = dyn Counter + 'v where Self: 'v;
  }

  impl<T> Concept<T> for dyn Counter
  where
    T: Counter,
  {
    fn upcast<'r, 'v>(value: &'r T) -> &'r (dyn Counter + 'v)
    where
      Self: 'v,
      T: 'v,
    {
      value
    }

    fn upcast_mut<'r, 'v>(value: &'r mut T) -> &'r mut (dyn Counter + 'v)
    where
      Self: 'v,
      T: 'v,
    {
      value
    }
  }

  #[derive(Clone, Debug)]
  struct Tally(i32);

  impl Counter for Tally {
    fn get(&self) -> i32 {
      self.0
    }

    fn bump(&mut self) {
      self.0 += 1;
    }
  }

  fn owned<'a>(value: Tally) -> Box<dyn Erased<'a, dyn Counter> + 'a> {
    Box::new(Owned::new(value))
  }

  fn aliased<'a>(cell: &'a RefCell<Tally>) -> Box<dyn Erased<'a, dyn Counter> + 'a> {
    Box::new(Aliased::new(cell))
  }

  #[test]
  fn owned_clone_is_deep() {
    let mut a = owned(Tally(1));
    let b = a.clone_erased();

    a.erased_mut().unwrap().bump();

    assert_eq!(a.erased().unwrap().get(), 2);
    assert_eq!(b.erased().unwrap().get(), 1);
    assert_eq!(b.mode(), Mode::Owned);
  }

  #[test]
  fn aliased_clone_shares_storage() {
    let cell = RefCell::new(Tally(10));
    let mut a = aliased(&cell);
    let b = a.clone_erased();

    a.erased_mut().unwrap().bump();

    assert_eq!(b.erased().unwrap().get(), 11);
    assert_eq!(cell.borrow().0, 11);
    assert_eq!(b.mode(), Mode::Aliased);
  }

  #[test]
  fn aliased_reports_borrow_conflicts() {
    let cell = RefCell::new(Tally(0));
    let mut a = aliased(&cell);

    let held = cell.borrow_mut();
    assert!(matches!(a.erased(), Err(Error::AliasBorrow(_))));
    drop(held);

    let held = cell.borrow();
    assert!(matches!(a.erased_mut(), Err(Error::AliasBorrowMut(_))));
    drop(held);

    assert!(a.erased_mut().is_ok());
  }

  #[test]
  fn narrowing_keeps_the_handle() {
    let cell = RefCell::new(Tally(3));
    let kept: Box<dyn Erased<'static, dyn Counter>> = owned(Tally(7));

    let mut handles = vec![kept.narrow(), aliased(&cell)];
    handles[1].erased_mut().unwrap().bump();

    assert_eq!(handles[0].erased().unwrap().get(), 7);
    assert_eq!(handles[0].mode(), Mode::Owned);
    assert_eq!(cell.borrow().0, 4);
  }
}
