use std::cell::RefCell;
use vpoly::{interface, Error, Mode};

#[interface(Account)]
pub trait AccountConcept {
  fn balance(&self) -> i64;
  fn deposit(&mut self, amount: i64);
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Ledger {
  entries: Vec<i64>,
}

impl AccountConcept for Ledger {
  fn balance(&self) -> i64 {
    self.entries.iter().sum()
  }

  fn deposit(&mut self, amount: i64) {
    self.entries.push(amount);
  }
}

#[test]
fn clones_of_an_alias_share_storage() {
  let ledger = RefCell::new(Ledger::default());

  let account = Account::alias(&ledger);
  let copy = account.clone();

  ledger.borrow_mut().deposit(100);

  assert_eq!(account.balance(), 100);
  assert_eq!(copy.balance(), 100);
  assert_eq!(copy.mode(), Mode::Aliased);
}

#[test]
fn mutation_through_an_alias_is_visible_outside() {
  let ledger = RefCell::new(Ledger::default());

  {
    let mut account = Account::alias(&ledger);
    account.deposit(30);
    account.deposit(12);
  }

  assert_eq!(ledger.borrow().entries, vec![30, 12]);
  assert_eq!(ledger.into_inner().balance(), 42);
}

#[test]
fn owned_clones_are_independent() {
  let mut a = Account::new(Ledger::default());
  a.deposit(10);

  let mut b = a.clone();
  b.deposit(5);
  a.deposit(-3);

  assert_eq!(a.balance(), 7);
  assert_eq!(b.balance(), 15);
}

#[test]
fn assigning_an_alias_over_a_value() {
  let ledger = RefCell::new(Ledger {
    entries: vec![1, 2, 3],
  });

  let mut owned = Account::new(Ledger::default());
  let alias = Account::alias(&ledger);

  owned.clone_from(&alias);
  assert_eq!(owned.mode(), Mode::Aliased);

  owned.deposit(4);
  assert_eq!(alias.balance(), 10);
}

#[test]
fn conflicting_borrows_are_reported() {
  let ledger = RefCell::new(Ledger::default());
  let account = Account::alias(&ledger);

  let guard = ledger.borrow_mut();
  assert!(matches!(account.poly().try_delegate(), Err(Error::AliasBorrow(_))));
  drop(guard);

  assert!(account.poly().try_delegate().is_ok());
}

#[test]
#[should_panic(expected = "already borrowed")]
fn conflicting_mutation_panics() {
  let ledger = RefCell::new(Ledger::default());
  let mut account = Account::alias(&ledger);

  let _guard = ledger.borrow();
  account.deposit(1);
}

#[test]
fn poly_round_trip() {
  let account = Account::new(Ledger { entries: vec![5] });
  let poly = account.into_poly();

  assert_eq!(poly.delegate().balance(), 5);
  assert_eq!(Account::from_poly(poly).balance(), 5);
}
