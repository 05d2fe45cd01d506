use std::ops::Mul;
use vpoly::interface;

#[interface(Gen)]
pub trait GenConcept<T> {
  fn proc(&mut self, value: T) -> T;
}

#[derive(Clone)]
struct Gen2Int;

impl GenConcept<i32> for Gen2Int {
  fn proc(&mut self, i: i32) -> i32 {
    i * 2
  }
}

#[derive(Clone)]
struct Gen3Int;

impl GenConcept<i32> for Gen3Int {
  fn proc(&mut self, i: i32) -> i32 {
    i * 3
  }
}

#[derive(Clone, Default)]
struct Gen4;

impl<T> GenConcept<T> for Gen4
where
  T: Mul<Output = T> + From<u8>,
{
  fn proc(&mut self, value: T) -> T {
    value * T::from(4)
  }
}

#[test]
fn generic_ints() {
  let mut gens: Vec<Gen<i32>> = vec![Gen::new(Gen2Int), Gen::new(Gen3Int), Gen::new(Gen4)];

  for gen in &mut gens {
    let one = gen.proc(1);
    assert_eq!(gen.proc(3), one * 3);
  }
}

#[test]
fn generic_floats() {
  let mut gen: Gen<f64> = Gen::new(Gen4);
  assert_eq!(gen.proc(0.5), 2.);
}

#[test]
fn generic_assignment() {
  let mut g1: Gen<i32> = Gen::new(Gen2Int);
  let mut g2: Gen<i32> = Gen::new(Gen3Int);

  assert_eq!(g1.proc(1), 2);
  assert_eq!(g2.proc(1), 3);

  g1 = g2.clone();
  assert_eq!(g1.proc(1), 3);
}

#[interface(Arg)]
pub trait ArgConcept<A1, A2, R> {
  fn proc(&mut self, a1: A1, a2: A2) -> R;
}

type ArgDis<'a> = Arg<'a, f64, i32, String>;

#[derive(Clone)]
struct Arg1;

impl ArgConcept<f64, i32, String> for Arg1 {
  fn proc(&mut self, d: f64, i: i32) -> String {
    (f64::from(i) * d).to_string()
  }
}

#[derive(Clone)]
struct Arg2;

impl ArgConcept<f64, i32, String> for Arg2 {
  fn proc(&mut self, d: f64, i: i32) -> String {
    (f64::from(i) * 2. * d).to_string()
  }
}

#[derive(Clone)]
struct ArgX;

impl<A1, A2> ArgConcept<A1, A2, String> for ArgX
where
  A1: Mul<Output = A1> + From<A2> + From<u8> + ToString,
{
  fn proc(&mut self, a1: A1, a2: A2) -> String {
    (A1::from(a2) * A1::from(2) * a1).to_string()
  }
}

#[test]
fn multiple_parameters() {
  let mut args: Vec<ArgDis> = vec![Arg::new(Arg1), Arg::new(Arg2), Arg::new(ArgX)];

  for arg in &mut args {
    assert_eq!(arg.proc(3., 7), arg.proc(1., 3 * 7));
  }
}

#[test]
fn parameters_are_threaded_in_order() {
  let mut arg: Arg<i64, i32, String> = Arg::new(ArgX);
  assert_eq!(arg.proc(5, 4), "40");
}
