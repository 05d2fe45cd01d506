//! Tagged-union dispatch.
//!
//! This is the closed-set, allocation-free alternative to [`Poly`](crate::Poly): an `enum` over a fixed list of
//! concrete types, with methods routing every call to whichever alternative is active. The enum and its methods are
//! generated by the [`dispatch!`](crate::dispatch!) macro; this module contains what the generated code relies on.
//!
//! Two forwarding strictness levels exist:
//!
//! - _Strict_ operations go through [`strict`], which only accepts a method whose receiver and parameter types are
//!   exactly the declared ones. Anything else – a different integer type, a borrowed parameter where an owned one was
//!   declared, etc. – is rejected by `rustc` with an _argument(s) not of expected type_ error.
//! - _Loose_ operations are forwarded with method-call syntax, so auto-referencing, deref coercion and generic
//!   methods are free to pick whatever fits.
//!
//! ```
//! #[derive(Clone)]
//! struct Scaled(f64);
//!
//! impl Scaled {
//!   fn f3(&mut self, i: i32, d: f64) -> f64 {
//!     f64::from(i) * d * self.0
//!   }
//! }
//!
//! #[derive(Clone)]
//! struct Offset(f64);
//!
//! impl Offset {
//!   fn f3(&mut self, i: i32, d: f64) -> f64 {
//!     f64::from(i) * d + self.0
//!   }
//! }
//!
//! vpoly::dispatch! {
//!   #[derive(Clone)]
//!   enum Number {
//!     Scaled(Scaled),
//!     Offset(Offset),
//!   }
//!
//!   impl Number {
//!     strict fn f3(&mut self, i: i32, d: f64) -> f64;
//!   }
//! }
//!
//! let mut numbers = vec![Number::from(Scaled(2.)), Number::from(Offset(1.))];
//! let results = numbers.iter_mut().map(|n| n.f3(3, 0.5)).collect::<Vec<_>>();
//!
//! assert_eq!(results, vec![3., 2.5]);
//! ```
//!
//! If one alternative declares a different parameter type, a strict operation doesn’t compile:
//!
//! ```compile_fail
//! struct Scaled(f64);
//!
//! impl Scaled {
//!   fn f3(&mut self, i: i64, d: f64) -> f64 {
//!     i as f64 * d * self.0
//!   }
//! }
//!
//! struct Offset(f64);
//!
//! impl Offset {
//!   fn f3(&mut self, i: i32, d: f64) -> f64 {
//!     f64::from(i) * d + self.0
//!   }
//! }
//!
//! vpoly::dispatch! {
//!   enum Number {
//!     Scaled(Scaled),
//!     Offset(Offset),
//!   }
//!
//!   impl Number {
//!     strict fn f3(&mut self, i: i32, d: f64) -> f64;
//!   }
//! }
//! ```

/// A method (or any function) taking `Recv` followed by the arguments in the tuple `Args`.
///
/// Implemented for every `FnOnce(Recv, A0, …, An) -> R` up to eight arguments. Only lifetimes are ignored when
/// matching; every other part of a type has to be identical.
#[diagnostic::on_unimplemented(
  message = "argument(s) not of expected type",
  label = "`{Self}` does not take `{Recv}` followed by `{Args}`",
  note = "strict dispatch requires the declared parameter types to match exactly; use a loose operation to let method resolution pick a match"
)]
pub trait Method<Recv, Args> {
  /// What calling the method returns.
  type Output;

  /// Call the method.
  fn invoke(self, recv: Recv, args: Args) -> Self::Output;
}

macro_rules! impl_Method {
  ($($arg:ident : $ty:ident),*) => {
    impl<F, Recv, R, $($ty),*> Method<Recv, ($($ty,)*)> for F
    where
      F: FnOnce(Recv, $($ty),*) -> R,
    {
      type Output = R;

      fn invoke(self, recv: Recv, ($($arg,)*): ($($ty,)*)) -> R {
        self(recv, $($arg),*)
      }
    }
  };
}

impl_Method!();
impl_Method!(a0: A0);
impl_Method!(a0: A0, a1: A1);
impl_Method!(a0: A0, a1: A1, a2: A2);
impl_Method!(a0: A0, a1: A1, a2: A2, a3: A3);
impl_Method!(a0: A0, a1: A1, a2: A2, a3: A3, a4: A4);
impl_Method!(a0: A0, a1: A1, a2: A2, a3: A3, a4: A4, a5: A5);
impl_Method!(a0: A0, a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6);
impl_Method!(a0: A0, a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6, a7: A7);

/// Call `method` on `recv` with `args`, provided the argument shapes match exactly.
///
/// ```
/// struct Mul(f64);
///
/// impl Mul {
///   fn apply(&self, i: i32, d: f64) -> f64 {
///     f64::from(i) * d * self.0
///   }
/// }
///
/// let m = Mul(2.);
/// assert_eq!(vpoly::dispatch::strict(Mul::apply, &m, (3, 0.5)), 3.);
/// ```
///
/// A mismatching argument is a compilation error:
///
/// ```compile_fail
/// # struct Mul(f64);
/// # impl Mul {
/// #   fn apply(&self, i: i32, d: f64) -> f64 {
/// #     f64::from(i) * d * self.0
/// #   }
/// # }
/// let m = Mul(2.);
/// vpoly::dispatch::strict(Mul::apply, &m, (3_i64, 0.5));
/// ```
pub fn strict<F, Recv, Args>(method: F, recv: Recv, args: Args) -> F::Output
where
  F: Method<Recv, Args>,
{
  method.invoke(recv, args)
}

/// Tagged unions generated by [`dispatch!`](crate::dispatch!).
pub trait Dispatch {
  /// Names of the alternatives, in declaration order.
  const ALTERNATIVES: &'static [&'static str];

  /// Index (in [`Dispatch::ALTERNATIVES`]) of the active alternative.
  fn active(&self) -> usize;

  /// Name of the active alternative.
  fn active_name(&self) -> &'static str {
    Self::ALTERNATIVES[self.active()]
  }
}

#[cfg(test)]
mod test {
  use super::*;

  struct Acc(i64);

  impl Acc {
    fn reset(&mut self) {
      self.0 = 0;
    }

    fn add(&mut self, x: i64) -> i64 {
      self.0 += x;
      self.0
    }

    fn label(&self, prefix: &str) -> String {
      format!("{}{}", prefix, self.0)
    }

    fn into_value(self) -> i64 {
      self.0
    }
  }

  #[test]
  fn strict_calls_through_any_receiver() {
    let mut acc = Acc(5);

    strict(Acc::reset, &mut acc, ());
    assert_eq!(strict(Acc::add, &mut acc, (7,)), 7);
    assert_eq!(strict(Acc::label, &acc, ("n=",)), "n=7");
    assert_eq!(strict(Acc::into_value, acc, ()), 7);
  }

  #[test]
  fn strict_accepts_closures() {
    let offset = 2;
    let f = |acc: &Acc, a: i64, b: i64, c: i64| acc.0 + a + b + c + offset;

    assert_eq!(strict(f, &Acc(1), (1, 1, 1)), 6);
  }
}
