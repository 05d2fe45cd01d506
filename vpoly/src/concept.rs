//! Viewing a concrete value through an interface contract.

/// The erased form of an interface contract.
///
/// Implemented by `dyn SomeContract`, the trait-object type of the contract. The object type itself doesn’t carry
/// the lifetime of the values it stands for: [`Contract::View`] does, so that the same contract can be viewed for as
/// long as a given borrow lasts. That keeps [`Poly`](crate::Poly) free to [narrow](crate::Poly::narrow) its
/// lifetime without changing its contract.
pub trait Contract {
  /// The contract viewed for `'v`, typically `dyn SomeContract + 'v`.
  type View<'v>: ?Sized + 'v
  where
    Self: 'v;
}

/// A contract that values of type `T` can be viewed as.
///
/// Implementing `Concept<T>` for the erased form of a contract states that `T` conforms to it; the two functions are
/// then plain pointer coercions and compile away.
///
/// You normally don’t write those implementors yourself: the [`interface`](crate::interface) attribute emits a
/// blanket one for every type implementing the annotated trait. Writing one by hand looks like this:
///
/// ```
/// use vpoly::{Concept, Contract, Poly};
///
/// trait Speak {
///   fn speak(&self) -> String;
/// }
///
/// impl Contract for dyn Speak {
///   type View<'v> = dyn Speak + 'v where Self: 'v;
/// }
///
/// impl<T> Concept<T> for dyn Speak
/// where
///   T: Speak,
/// {
///   fn upcast<'r, 'v>(value: &'r T) -> &'r (dyn Speak + 'v)
///   where
///     Self: 'v,
///     T: 'v,
///   {
///     value
///   }
///
///   fn upcast_mut<'r, 'v>(value: &'r mut T) -> &'r mut (dyn Speak + 'v)
///   where
///     Self: 'v,
///     T: 'v,
///   {
///     value
///   }
/// }
///
/// #[derive(Clone)]
/// struct Dog;
///
/// impl Speak for Dog {
///   fn speak(&self) -> String {
///     "woof".to_owned()
///   }
/// }
///
/// let dog: Poly<dyn Speak> = Poly::new(Dog);
/// assert_eq!(dog.delegate().speak(), "woof");
/// ```
pub trait Concept<T>: Contract
where
  T: ?Sized,
{
  /// View a shared reference to the concrete value as the contract.
  fn upcast<'r, 'v>(value: &'r T) -> &'r Self::View<'v>
  where
    Self: 'v,
    T: 'v;

  /// View a mutable reference to the concrete value as the contract.
  fn upcast_mut<'r, 'v>(value: &'r mut T) -> &'r mut Self::View<'v>
  where
    Self: 'v,
    T: 'v;
}
