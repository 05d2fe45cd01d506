//! Free-function bindings.
//!
//! A concrete type doesn’t have to implement an interface contract to be erased: it can be bound to a table of free
//! functions instead. This is the way to attach behavior to a type you can’t (or don’t want to) modify, to override
//! the type’s own implementation of some operations, or to conform structurally by pointing the table at inherent
//! methods.
//!
//! The tables are generated by the [`interface`](crate::interface) attribute (one `fn` pointer per operation) and
//! come with a `native()` constructor filling every slot with the type’s own trait implementation. The lookup is
//! therefore resolved once, when the table is built:
//!
//! 1. A slot set explicitly always wins.
//! 2. Slots filled by `native()` (for instance with `..Fns::native()`) use the type’s implementation of the
//!    contract.

/// A concrete value paired with a table of functions implementing a contract for it.
#[derive(Clone, Debug)]
pub struct Bound<T, F> {
  value: T,
  fns: F,
}

impl<T, F> Bound<T, F> {
  /// Bind `value` to the function table `fns`.
  pub fn new(value: T, fns: F) -> Self {
    Self { value, fns }
  }

  /// The bound value.
  pub fn value(&self) -> &T {
    &self.value
  }

  /// The function table.
  pub fn fns(&self) -> &F {
    &self.fns
  }

  /// Exclusive access to the bound value along with the function table.
  pub fn parts_mut(&mut self) -> (&mut T, &F) {
    (&mut self.value, &self.fns)
  }

  /// Give the bound value back.
  pub fn into_inner(self) -> T {
    self.value
  }
}
