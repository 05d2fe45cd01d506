//! Procedural macros for [vpoly](https://crates.io/crates/vpoly).
//!
//! You shouldn’t depend on this crate directly: `vpoly` re-exports both macros behind its `macros` feature.
//!
//! # `#[interface]`
//!
//! Put on an object-safe trait, it generates the container type holding any value implementing that trait:
//!
//! ```ignore
//! #[vpoly::interface(Duck)]
//! pub trait DuckConcept {
//!   fn walk(&self) -> String;
//!   fn quack(&self) -> String;
//! }
//!
//! let duck = Duck::new(Mallard::default());
//! ```
//!
//! # `dispatch!`
//!
//! Generates a tagged union over a fixed list of types and forwards operations to the active alternative:
//!
//! ```ignore
//! vpoly::dispatch! {
//!   pub enum Number {
//!     Int(Int),
//!     Real(Real),
//!   }
//!
//!   impl Number {
//!     pub strict fn f3(&mut self, i: i32, d: f64) -> f64;
//!     pub loose fn describe(&self) -> String;
//!   }
//! }
//! ```

mod check;
mod dispatch;
mod interface;

use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use syn::{parse_macro_input, ItemTrait};

/// Turn a trait into an interface contract and generate its value-semantic container.
///
/// The single mandatory argument is the name of the container; `fns = Name` renames the free-function table,
/// which defaults to the container’s name suffixed with `Fns`.
///
/// For `#[interface(Duck)] trait DuckConcept<T..>`, the following items are generated next to the trait:
///
/// - `impl vpoly::Contract for dyn DuckConcept<T..>`, and `impl vpoly::Concept<X> for dyn DuckConcept<T..>` for every
///   `X: DuckConcept<T..>`.
/// - `struct Duck<'poly, T..>`, with:
///   - `Duck::new(value)`, moving a conforming value into an owning handle. `From<X>` does the same
///     when the trait isn’t generic.
///   - `Duck::alias(&cell)`, aliasing a conforming value kept in a `RefCell` by the caller.
///   - `Duck::bind(value, fns)`, binding any value to a table of free functions.
///   - `Duck::narrow`, turning a `Duck<'poly>` into a `Duck` valid for a shorter lifetime, for instance to store an
///     owned `Duck<'static>` next to aliases of local values.
///   - `Duck::mode`, `Duck::poly`, `Duck::poly_mut`, `Duck::from_poly` and `Duck::into_poly`.
///   - One method per operation of the trait, with the same signature, forwarding to the held value.
///   - `Clone` and `Debug`.
/// - `struct DuckFns<X, T..>`, with one `fn` pointer per operation and `DuckFns::native()`, pointing every slot at
///   the implementation `X` already has.
///
/// Operations must take `&self` or `&mut self`, can’t be generic over types and can’t return borrows (unless
/// `'static`). Methods bounded by `where Self: Sized` are left out. Traits with supertraits don’t get a function
/// table.
#[proc_macro_attribute]
pub fn interface(args: TokenStream, item: TokenStream) -> TokenStream {
  let args = parse_macro_input!(args as interface::InterfaceArgs);
  let item = parse_macro_input!(item as ItemTrait);

  match interface::expand(args, &item) {
    Ok(tokens) => tokens.into(),

    // keep the trait around so that its uses don’t pile up more errors
    Err(e) => {
      let e = e.to_compile_error();
      quote! { #item #e }.into()
    }
  }
}

/// Generate a tagged-union dispatcher.
#[proc_macro]
pub fn dispatch(tokens: TokenStream) -> TokenStream {
  parse_macro_input!(tokens as dispatch::DispatchInput)
    .into_token_stream()
    .into()
}
