//! Value-semantic runtime polymorphism for unrelated types.
//!
//! This crate gives types that share no trait hierarchy – types that merely _happen_ to support the same operations
//! – a uniform, runtime-polymorphic interface while keeping value semantics: the polymorphic values can be cloned,
//! moved and stored by value in any container, and cloning one deep-copies the concrete value hiding behind it.
//!
//! # Motivation
//!
//! The usual Rust answer to “a collection of different things that can all do X” is `Vec<Box<dyn X>>`. It works,
//! but it comes with friction as soon as you want to treat those things as _values_:
//!
//! - `Box<dyn X>` isn’t [`Clone`], because the trait object has no idea how to construct a copy of the concrete type
//!   behind it. Everybody ends up writing their own `clone_box` helper, per trait.
//! - Calling an operation requires the trait to be in scope and the value to be dereferenced; the polymorphic type
//!   doesn’t look like a regular type with regular methods.
//! - There is no uniform way to mix values you own with values somebody else owns in the same collection.
//! - Attaching a behavior to a type you can’t modify requires a newtype, per trait and per type.
//!
//! This crate packages the solution to all of the above, sometimes called the _concept-based model idiom_ or
//! _value-oriented polymorphism_, into a small engine plus a procedural macro generating the boilerplate.
//!
//! # The erasure engine
//!
//! The engine is made of a few pieces:
//!
//! - The _interface contract_ is a regular, object-safe Rust trait declaring the operations a concrete type must
//!   support.
//! - [`Contract`] is implemented by the erased form of the contract (`dyn Trait`), and [`Concept`] lets it view any
//!   conforming value. That is the compile-time half of the delegation, and it compiles down to a pointer coercion.
//! - An _erased handle_ ([`Erased`]) holds exactly one concrete value and knows how to clone itself, going through
//!   the concrete type. Handles come in two [`Mode`]s: [owning](storage::Owned) and [aliasing](storage::Aliased).
//! - [`Poly`] is the value-semantic container owning one handle. Cloning it clones the handle; moving it moves a
//!   pointer; [narrowing](Poly::narrow) its lifetime moves the handle as is.
//! - [`Bound`] pairs a value with a table of free functions implementing the contract, so that conformance doesn’t
//!   have to be declared by the concrete type itself.
//!
//! The only dynamic decision left at runtime is which concrete type is behind the handle, and it is resolved by a
//! single virtual call.
//!
//! # The `interface` attribute
//!
//! Writing the forwarding layer by hand is tedious, so [`interface`] generates it from the trait. Consider ducks:
//!
//! ```
//! use vpoly::interface;
//!
//! #[interface(Duck)]
//! pub trait DuckConcept {
//!   fn walk(&self) -> String;
//!   fn quack(&self) -> String;
//! }
//!
//! #[derive(Clone)]
//! struct Mallard;
//!
//! impl DuckConcept for Mallard {
//!   fn walk(&self) -> String {
//!     "walks like a duck".to_owned()
//!   }
//!
//!   fn quack(&self) -> String {
//!     "quacks like a duck".to_owned()
//!   }
//! }
//!
//! #[derive(Clone)]
//! struct Robot {
//!   serial: u32,
//! }
//!
//! impl DuckConcept for Robot {
//!   fn walk(&self) -> String {
//!     "walks like a duck".to_owned()
//!   }
//!
//!   fn quack(&self) -> String {
//!     format!("quacks like a duck (unit {})", self.serial)
//!   }
//! }
//!
//! let ducks = vec![Duck::new(Mallard), Duck::new(Robot { serial: 42 })];
//! let copies = ducks.clone();
//!
//! for duck in ducks.iter().chain(&copies) {
//!   assert_eq!(duck.walk(), "walks like a duck");
//! }
//! ```
//!
//! `Duck` is a regular type with a `walk` and a `quack` method, [`Clone`] and [`Debug`](std::fmt::Debug). See the
//! documentation of [`interface`] for everything it generates: aliasing constructors, free-function binding tables,
//! generic contracts, etc.
//!
//! # Aliasing
//!
//! An aliasing container refers to a value the caller keeps in a [`RefCell`](std::cell::RefCell). Mutation is shared
//! both ways, and cloning the container clones the _alias_, not the value. Because the alias borrows the storage, a
//! container can’t outlive it – what would be a dangling pointer is a compilation error:
//!
//! ```compile_fail
//! use std::cell::RefCell;
//! use vpoly::interface;
//!
//! #[interface(Duck)]
//! pub trait DuckConcept {
//!   fn quack(&self) -> String;
//! }
//!
//! struct Mallard;
//!
//! impl DuckConcept for Mallard {
//!   fn quack(&self) -> String {
//!     "quack".to_owned()
//!   }
//! }
//!
//! let duck;
//!
//! {
//!   let mallard = RefCell::new(Mallard);
//!   duck = Duck::alias(&mallard);
//! }
//!
//! duck.quack();
//! ```
//!
//! Containers holding owned values are often `'static`, for instance when returned from a function. Call `narrow` to
//! store one next to aliases of local values; it only changes the lifetime, the handle stays where it is:
//!
//! ```
//! use std::cell::RefCell;
//! use vpoly::interface;
//!
//! #[interface(Duck)]
//! pub trait DuckConcept {
//!   fn quack(&self) -> String;
//! }
//!
//! #[derive(Clone)]
//! struct Mallard;
//!
//! impl DuckConcept for Mallard {
//!   fn quack(&self) -> String {
//!     "quack".to_owned()
//!   }
//! }
//!
//! fn hatch() -> Duck<'static> {
//!   Duck::new(Mallard)
//! }
//!
//! let local = RefCell::new(Mallard);
//! let ducks = vec![hatch().narrow(), Duck::alias(&local)];
//!
//! assert!(ducks.iter().all(|duck| duck.quack() == "quack"));
//! ```
//!
//! # Conformance is checked by `rustc`
//!
//! Trying to erase a type that doesn’t conform to the contract fails to compile, at the construction site:
//!
//! ```compile_fail
//! use vpoly::interface;
//!
//! #[interface(Duck)]
//! pub trait DuckConcept {
//!   fn quack(&self) -> String;
//! }
//!
//! #[derive(Clone)]
//! struct Rock;
//!
//! let _ = Duck::new(Rock);
//! ```
//!
//! And a moved-from container can’t be used anymore:
//!
//! ```compile_fail
//! use vpoly::interface;
//!
//! #[interface(Duck)]
//! pub trait DuckConcept {
//!   fn quack(&self) -> String;
//! }
//!
//! #[derive(Clone)]
//! struct Mallard;
//!
//! impl DuckConcept for Mallard {
//!   fn quack(&self) -> String {
//!     "quack".to_owned()
//!   }
//! }
//!
//! let a = Duck::new(Mallard);
//! let b = a;
//! a.quack();
//! ```
//!
//! # Tagged-union dispatch
//!
//! When the set of concrete types is closed and known upfront, [`dispatch!`] generates an `enum` over them along
//! with methods forwarding to the active alternative. No allocation ever happens, and operations declared `strict`
//! check at compile time that every alternative takes exactly the declared argument types. See the
//! [`dispatch`](mod@dispatch) module.

extern crate self as vpoly;

pub mod bound;
pub mod concept;
pub mod dispatch;
pub mod erased;
pub mod error;
pub mod poly;
pub mod storage;

pub use crate::{
  bound::Bound,
  concept::{Concept, Contract},
  dispatch::Dispatch,
  erased::{Delegate, DelegateMut, Erased, Mode},
  error::Error,
  poly::Poly,
};

#[cfg(feature = "macros")]
pub use vpoly_macros::{dispatch, interface};
