//! Type inspection used to reject operations that can’t be erased.

use proc_macro2::Span;
use syn::{
  spanned::Spanned,
  visit::{self, Visit},
  Ident, Lifetime, Path, Type, TypeImplTrait, TypeReference,
};

/// Things found while walking a type.
#[derive(Debug, Default)]
pub struct Findings {
  /// Span of the first `Self` path.
  pub self_type: Option<Span>,
  /// Span of the first borrow that isn’t `'static`.
  pub borrow: Option<Span>,
  /// Span of the first `impl Trait`.
  pub impl_trait: Option<Span>,
}

impl Findings {
  pub fn of(ty: &Type) -> Self {
    let mut findings = Findings::default();
    findings.visit_type(ty);
    findings
  }
}

fn is_static(lifetime: &Lifetime) -> bool {
  lifetime.ident == "static"
}

impl<'ast> Visit<'ast> for Findings {
  fn visit_type_reference(&mut self, r: &'ast TypeReference) {
    if !r.lifetime.as_ref().map_or(false, is_static) {
      self.borrow.get_or_insert(r.span());
    }

    visit::visit_type_reference(self, r);
  }

  fn visit_lifetime(&mut self, lifetime: &'ast Lifetime) {
    if !is_static(lifetime) {
      self.borrow.get_or_insert(lifetime.span());
    }
  }

  fn visit_type_impl_trait(&mut self, i: &'ast TypeImplTrait) {
    self.impl_trait.get_or_insert(i.span());
    visit::visit_type_impl_trait(self, i);
  }

  fn visit_path(&mut self, path: &'ast Path) {
    if let Some(first) = path.segments.first() {
      if first.ident == "Self" {
        self.self_type.get_or_insert(first.ident.span());
      }
    }

    visit::visit_path(self, path);
  }
}

/// Collects the single-segment paths mentioned by types, to know which type parameters are used.
#[derive(Debug, Default)]
pub struct Mentions<'ast> {
  idents: Vec<&'ast Ident>,
}

impl<'ast> Mentions<'ast> {
  pub fn mentions(&self, ident: &Ident) -> bool {
    self.idents.iter().any(|i| *i == ident)
  }
}

impl<'ast> Visit<'ast> for Mentions<'ast> {
  fn visit_path(&mut self, path: &'ast Path) {
    if let Some(first) = path.segments.first() {
      self.idents.push(&first.ident);
    }

    visit::visit_path(self, path);
  }
}
