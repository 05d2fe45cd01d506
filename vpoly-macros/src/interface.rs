//! The `#[interface]` attribute.
//!
//! Given an object-safe trait (the interface contract), this generates:
//!
//! - The [`Contract`] and [`Concept`] glue, letting `dyn Trait` view any implementor.
//! - The container type, wrapping a `vpoly::Poly` and forwarding every operation.
//! - The free-function table, its `native()` constructor and the implementor of the trait for `vpoly::Bound`.
//!
//! [`Contract`]: https://docs.rs/vpoly/latest/vpoly/concept/trait.Contract.html
//! [`Concept`]: https://docs.rs/vpoly/latest/vpoly/concept/trait.Concept.html

use crate::check::{Findings, Mentions};
use proc_macro2::TokenStream;
use quote::{format_ident, quote, ToTokens};
use syn::{
  parse::{Parse, ParseStream},
  parse_quote,
  spanned::Spanned,
  visit::Visit,
  Attribute, FnArg, GenericParam, Generics, Ident, ItemTrait, Pat, PatIdent, PatType, ReturnType,
  Signature, Token, TraitItem, TraitItemMethod, Type, TypeParamBound, WherePredicate,
};

/// Methods the container defines on its own; operations can’t reuse those names.
const RESERVED: &[&str] = &[
  "new",
  "alias",
  "bind",
  "from_poly",
  "narrow",
  "mode",
  "poly",
  "poly_mut",
  "into_poly",
];

/// Arguments of the attribute: `#[interface(Container)]` or `#[interface(Container, fns = Table)]`.
#[derive(Debug)]
pub struct InterfaceArgs {
  container: Ident,
  fns: Option<Ident>,
}

impl Parse for InterfaceArgs {
  fn parse(input: ParseStream) -> syn::Result<Self> {
    let container = input.parse()?;
    let mut fns = None;

    while !input.is_empty() {
      let _: Token![,] = input.parse()?;

      if input.is_empty() {
        break;
      }

      let key: Ident = input.parse()?;

      if key == "fns" {
        let _: Token![=] = input.parse()?;
        fns = Some(input.parse()?);
      } else {
        return Err(syn::Error::new(
          key.span(),
          "unknown interface option; expected `fns = Name`",
        ));
      }
    }

    Ok(InterfaceArgs { container, fns })
  }
}

/// Receiver of an operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Access {
  Shared,
  Exclusive,
}

/// An erasable operation of the interface.
#[derive(Debug)]
struct Operation {
  docs: Vec<Attribute>,
  access: Access,
  /// Signature with every argument pattern replaced by a plain identifier.
  sig: Signature,
  args: Vec<(Ident, Type)>,
}

impl Operation {
  /// Validate a trait method; `Ok(None)` means the method is left out of the erased surface.
  fn from_method(method: &TraitItemMethod) -> syn::Result<Option<Self>> {
    let sig = &method.sig;

    if excluded_from_vtable(sig) {
      if method.default.is_none() {
        return Err(syn::Error::new(
          sig.ident.span(),
          "operations bounded by `Self: Sized` need a default implementation",
        ));
      }

      return Ok(None);
    }

    if let Some(constness) = &sig.constness {
      return Err(syn::Error::new(constness.span(), "const operations can’t be erased"));
    }

    if let Some(asyncness) = &sig.asyncness {
      return Err(syn::Error::new(asyncness.span(), "async operations can’t be erased"));
    }

    if let Some(unsafety) = &sig.unsafety {
      return Err(syn::Error::new(unsafety.span(), "unsafe operations are not supported"));
    }

    if let Some(abi) = &sig.abi {
      return Err(syn::Error::new(abi.span(), "extern operations are not supported"));
    }

    if let Some(variadic) = &sig.variadic {
      return Err(syn::Error::new(variadic.span(), "variadic operations are not supported"));
    }

    if RESERVED.iter().any(|reserved| sig.ident == reserved) {
      return Err(syn::Error::new(
        sig.ident.span(),
        format!("`{}` collides with a method of the generated container", sig.ident),
      ));
    }

    for param in &sig.generics.params {
      if !matches!(param, GenericParam::Lifetime(_)) {
        return Err(syn::Error::new(
          param.span(),
          "generic operations can’t be erased; only lifetime parameters are allowed",
        ));
      }
    }

    let mut inputs = sig.inputs.iter();

    let access = match inputs.next() {
      Some(FnArg::Receiver(receiver)) => match &receiver.reference {
        Some((_, None)) if receiver.mutability.is_some() => Access::Exclusive,
        Some((_, None)) => Access::Shared,
        Some((_, Some(lifetime))) => {
          return Err(syn::Error::new(
            lifetime.span(),
            "the receiver can’t carry an explicit lifetime",
          ));
        }
        None => {
          return Err(syn::Error::new(
            receiver.span(),
            "operations taking `self` by value can’t be erased; use `&self` or `&mut self`",
          ));
        }
      },

      _ => {
        return Err(syn::Error::new(
          sig.span(),
          "operations must take `&self` or `&mut self`",
        ));
      }
    };

    let mut args = Vec::new();

    for (rank, input) in inputs.enumerate() {
      let pat_ty = match input {
        FnArg::Typed(pat_ty) => pat_ty,
        FnArg::Receiver(receiver) => {
          return Err(syn::Error::new(receiver.span(), "unexpected receiver"));
        }
      };

      let findings = Findings::of(&pat_ty.ty);

      if let Some(span) = findings.self_type {
        return Err(syn::Error::new(span, "`Self` can’t appear in an erased operation"));
      }

      if let Some(span) = findings.impl_trait {
        return Err(syn::Error::new(span, "`impl Trait` arguments can’t be erased"));
      }

      args.push((arg_ident(rank, pat_ty), (*pat_ty.ty).clone()));
    }

    if let ReturnType::Type(_, ty) = &sig.output {
      let findings = Findings::of(ty);

      if let Some(span) = findings.self_type {
        return Err(syn::Error::new(span, "`Self` can’t appear in an erased operation"));
      }

      if let Some(span) = findings.impl_trait {
        return Err(syn::Error::new(span, "`impl Trait` can’t be returned from an erased operation"));
      }

      if let Some(span) = findings.borrow {
        return Err(syn::Error::new(
          span,
          "erased operations must return owned values (or `'static` borrows), since aliased values are reached \
           through a short-lived borrow",
        ));
      }
    }

    let mut sig = sig.clone();
    for (input, (ident, _)) in sig.inputs.iter_mut().skip(1).zip(&args) {
      if let FnArg::Typed(pat_ty) = input {
        *pat_ty.pat = Pat::Ident(PatIdent {
          attrs: Vec::new(),
          by_ref: None,
          mutability: None,
          ident: ident.clone(),
          subpat: None,
        });
      }
    }

    let docs = method
      .attrs
      .iter()
      .filter(|attr| attr.path.is_ident("doc"))
      .cloned()
      .collect();

    Ok(Some(Operation {
      docs,
      access,
      sig,
      args,
    }))
  }

  fn ident(&self) -> &Ident {
    &self.sig.ident
  }

  fn arg_idents(&self) -> impl Iterator<Item = &Ident> {
    self.args.iter().map(|(ident, _)| ident)
  }

  /// Type of the function pointer implementing this operation for `PolySelf`.
  fn fn_ptr(&self) -> TokenStream {
    let recv = match self.access {
      Access::Shared => quote! { &PolySelf },
      Access::Exclusive => quote! { &mut PolySelf },
    };
    let arg_tys = self.args.iter().map(|(_, ty)| ty);
    let output = &self.sig.output;
    let lifetimes = self
      .sig
      .generics
      .lifetimes()
      .map(|def| &def.lifetime)
      .collect::<Vec<_>>();

    let binder = if lifetimes.is_empty() {
      quote! {}
    } else {
      quote! { for<#(#lifetimes),*> }
    };

    quote! { #binder fn(#recv #(, #arg_tys)*) #output }
  }
}

/// Whether a method is bounded by `Self: Sized`, which removes it from the trait object.
fn excluded_from_vtable(sig: &Signature) -> bool {
  let where_clause = match &sig.generics.where_clause {
    Some(where_clause) => where_clause,
    None => return false,
  };

  where_clause.predicates.iter().any(|predicate| match predicate {
    WherePredicate::Type(pred) => {
      let is_self = matches!(&pred.bounded_ty, Type::Path(p) if p.qself.is_none() && p.path.is_ident("Self"));
      let is_sized = pred.bounds.iter().any(|bound| match bound {
        TypeParamBound::Trait(t) => t.path.is_ident("Sized"),
        _ => false,
      });

      is_self && is_sized
    }

    _ => false,
  })
}

/// Name used to forward an argument: the user’s identifier if the pattern is a plain one, `arg_{rank}` otherwise.
fn arg_ident(rank: usize, pat_ty: &PatType) -> Ident {
  match &*pat_ty.pat {
    Pat::Ident(PatIdent {
      by_ref: None,
      subpat: None,
      ident,
      ..
    }) if ident != "self" => ident.clone(),
    _ => format_ident!("arg_{}", rank),
  }
}

/// Add `'poly` in front of the generics, with every type parameter outliving it.
fn with_poly_lifetime(generics: &Generics) -> Generics {
  let mut generics = generics.clone();
  let idents = generics
    .type_params()
    .map(|param| param.ident.clone())
    .collect::<Vec<_>>();

  generics.params.insert(0, parse_quote! { 'poly });

  let where_clause = generics.make_where_clause();
  for ident in idents {
    where_clause.predicates.push(parse_quote! { #ident: 'poly });
  }

  generics
}

/// Add an extra type parameter and predicates to the generics.
fn with_param(generics: &Generics, param: GenericParam, predicates: &[WherePredicate]) -> Generics {
  let mut generics = generics.clone();
  generics.params.push(param);

  let where_clause = generics.make_where_clause();
  where_clause.predicates.extend(predicates.iter().cloned());

  generics
}

/// Expand the attribute.
pub fn expand(args: InterfaceArgs, item: &ItemTrait) -> syn::Result<TokenStream> {
  if let Some(unsafety) = &item.unsafety {
    return Err(syn::Error::new(unsafety.span(), "unsafe traits can’t be used as interfaces"));
  }

  if let Some(auto_token) = &item.auto_token {
    return Err(syn::Error::new(auto_token.span(), "auto traits can’t be used as interfaces"));
  }

  for param in &item.generics.params {
    if !matches!(param, GenericParam::Type(_)) {
      return Err(syn::Error::new(
        param.span(),
        "interfaces can only be generic over types",
      ));
    }
  }

  if args.container == item.ident {
    return Err(syn::Error::new(
      args.container.span(),
      "the container must be named differently from the trait",
    ));
  }

  let mut ops = Vec::new();

  for trait_item in &item.items {
    match trait_item {
      TraitItem::Method(method) => ops.extend(Operation::from_method(method)?),

      TraitItem::Const(c) => {
        return Err(syn::Error::new(c.span(), "associated constants can’t be erased"));
      }

      TraitItem::Type(t) => {
        return Err(syn::Error::new(t.span(), "associated types can’t be erased"));
      }

      other => {
        return Err(syn::Error::new(other.span(), "unsupported item in an interface"));
      }
    }
  }

  let vis = &item.vis;
  let trait_ident = &item.ident;
  let container = &args.container;
  let fns = args
    .fns
    .clone()
    .unwrap_or_else(|| format_ident!("{}Fns", container));

  let (item_impl, trait_ty_generics, item_where) = item.generics.split_for_impl();
  let trait_path = quote! { #trait_ident #trait_ty_generics };
  let trait_turbofish = trait_ty_generics.as_turbofish();
  // the view lifetime lives in `Contract::View`, so the object type itself stays `'static`
  let concept = quote! { dyn #trait_path + 'static };

  // container generics: <'poly, T..>
  let container_generics = with_poly_lifetime(&item.generics);
  let (c_impl, c_ty, c_where) = container_generics.split_for_impl();
  let c_params = &container_generics.params;
  let type_idents = item
    .generics
    .type_params()
    .map(|param| &param.ident)
    .collect::<Vec<_>>();

  // generics of impls quantifying over the concrete type
  let conforming = with_param(
    &item.generics,
    parse_quote! { PolySelf },
    &[parse_quote! { PolySelf: #trait_path }],
  );
  let (k_impl, _, k_where) = conforming.split_for_impl();

  let conforming_clone = with_param(
    &container_generics,
    parse_quote! { PolySelf },
    &[parse_quote! { PolySelf: #trait_path + ::std::clone::Clone + 'poly }],
  );
  let (kc_impl, _, kc_where) = conforming_clone.split_for_impl();

  let forwarders = ops.iter().map(|op| {
    let docs = &op.docs;
    let sig = &op.sig;
    let ident = op.ident();
    let arg_idents = op.arg_idents();

    let recv = match op.access {
      Access::Shared => quote! { &*self.poly.delegate() },
      Access::Exclusive => quote! { &mut *self.poly.delegate_mut() },
    };

    quote! {
      #(#docs)*
      pub #sig {
        #trait_ident #trait_turbofish::#ident(#recv #(, #arg_idents)*)
      }
    }
  });

  let bindings = if item.supertraits.is_empty() {
    Some(expand_bindings(item, &ops, &fns)?)
  } else {
    None
  };

  let bind_ctor = bindings.as_ref().map(|_| {
    let mut fns_args = vec![quote! { PolySelf }];
    fns_args.extend(item.generics.type_params().map(|p| p.ident.to_token_stream()));

    let native_doc = format!(
      " The value doesn’t have to implement the interface itself; see [`{}::native`] to start from its own \
       implementation.",
      fns
    );

    quote! {
      /// Bind `value` to a table of free functions implementing the interface for it.
      ///
      #[doc = #native_doc]
      pub fn bind<PolySelf>(value: PolySelf, fns: #fns<#(#fns_args),*>) -> Self
      where
        PolySelf: ::std::clone::Clone + 'poly,
      {
        Self {
          poly: ::vpoly::Poly::new(::vpoly::Bound::new(value, fns)),
        }
      }
    }
  });

  // downstream crates could implement a generic contract for the container itself, which would overlap with the
  // reflexive `From`
  let from_impl = if item.generics.type_params().next().is_none() {
    Some(quote! {
      impl #kc_impl ::std::convert::From<PolySelf> for #container #c_ty #kc_where {
        fn from(value: PolySelf) -> Self {
          Self::new(value)
        }
      }
    })
  } else {
    None
  };

  let container_doc = format!(
    " Value-semantic container for any type implementing [`{}`].",
    trait_ident
  );

  Ok(quote! {
    #item

    impl #item_impl ::vpoly::Contract for #concept #item_where {
      type View<'v> = dyn #trait_path + 'v where Self: 'v;
    }

    impl #k_impl ::vpoly::Concept<PolySelf> for #concept #k_where {
      fn upcast<'r, 'v>(value: &'r PolySelf) -> &'r (dyn #trait_path + 'v)
      where
        Self: 'v,
        PolySelf: 'v,
      {
        value
      }

      fn upcast_mut<'r, 'v>(value: &'r mut PolySelf) -> &'r mut (dyn #trait_path + 'v)
      where
        Self: 'v,
        PolySelf: 'v,
      {
        value
      }
    }

    #[doc = #container_doc]
    #vis struct #container<#c_params> #c_where {
      poly: ::vpoly::Poly<'poly, #concept>,
    }

    impl #c_impl #container #c_ty #c_where {
      /// Wrap `value`, which is moved into an owning handle.
      pub fn new<PolySelf>(value: PolySelf) -> Self
      where
        PolySelf: #trait_path + ::std::clone::Clone + 'poly,
      {
        Self {
          poly: ::vpoly::Poly::new(value),
        }
      }

      /// Alias the value held in `cell`, owned by the caller.
      ///
      /// Clones of the returned container alias the same value.
      pub fn alias<PolySelf>(cell: &'poly ::std::cell::RefCell<PolySelf>) -> Self
      where
        PolySelf: #trait_path + 'poly,
      {
        Self {
          poly: ::vpoly::Poly::alias(cell),
        }
      }

      #bind_ctor

      /// Wrap an already erased value.
      pub fn from_poly(poly: ::vpoly::Poly<'poly, #concept>) -> Self {
        Self { poly }
      }

      /// Keep the held value, with the container valid for the shorter lifetime `'short` only.
      ///
      /// This is how a container owning its value, such as a `'static` one returned from a function, goes into the
      /// same collection as aliases of local values. Nothing is cloned or allocated.
      pub fn narrow<'short>(self) -> #container<'short #(, #type_idents)*>
      where
        'poly: 'short,
      {
        #container {
          poly: self.poly.narrow(),
        }
      }

      /// Ownership mode of the held value.
      pub fn mode(&self) -> ::vpoly::Mode {
        self.poly.mode()
      }

      /// The underlying erased value.
      pub fn poly(&self) -> &::vpoly::Poly<'poly, #concept> {
        &self.poly
      }

      /// The underlying erased value, mutably.
      pub fn poly_mut(&mut self) -> &mut ::vpoly::Poly<'poly, #concept> {
        &mut self.poly
      }

      /// Give the underlying erased value back.
      pub fn into_poly(self) -> ::vpoly::Poly<'poly, #concept> {
        self.poly
      }

      #(#forwarders)*
    }

    impl #c_impl ::std::clone::Clone for #container #c_ty #c_where {
      fn clone(&self) -> Self {
        Self {
          poly: self.poly.clone(),
        }
      }

      fn clone_from(&mut self, source: &Self) {
        self.poly.clone_from(&source.poly);
      }
    }

    impl #c_impl ::std::fmt::Debug for #container #c_ty #c_where {
      fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        f.debug_struct(stringify!(#container))
          .field("mode", &self.poly.mode())
          .finish()
      }
    }

    #from_impl

    #bindings
  })
}

/// Free-function table, its `native()` constructor and the implementor of the trait for `Bound`.
fn expand_bindings(item: &ItemTrait, ops: &[Operation], fns: &Ident) -> syn::Result<TokenStream> {
  let mut mentions = Mentions::default();
  for op in ops {
    for (_, ty) in &op.args {
      mentions.visit_type(ty);
    }

    if let ReturnType::Type(_, ty) = &op.sig.output {
      mentions.visit_type(ty);
    }
  }

  for param in item.generics.type_params() {
    if !mentions.mentions(&param.ident) {
      return Err(syn::Error::new(
        param.ident.span(),
        "every type parameter of an interface must appear in one of its operations",
      ));
    }
  }

  let vis = &item.vis;
  let trait_ident = &item.ident;
  let (_, trait_ty_generics, _) = item.generics.split_for_impl();
  let trait_path = quote! { #trait_ident #trait_ty_generics };

  let mut table_generics = item.generics.clone();
  table_generics.params.insert(0, parse_quote! { PolySelf });
  let (t_impl, t_ty, t_where) = table_generics.split_for_impl();
  let t_params = &table_generics.params;

  let mut native_generics = table_generics.clone();
  native_generics
    .make_where_clause()
    .predicates
    .push(parse_quote! { PolySelf: #trait_path });
  let (_, _, native_where) = native_generics.split_for_impl();

  let idents = ops.iter().map(Operation::ident).collect::<Vec<_>>();
  let fn_ptrs = ops.iter().map(Operation::fn_ptr);

  let impls = ops.iter().map(|op| {
    let sig = &op.sig;
    let ident = op.ident();
    let arg_idents = op.arg_idents();

    match op.access {
      Access::Shared => quote! {
        #sig {
          (self.fns().#ident)(self.value() #(, #arg_idents)*)
        }
      },

      Access::Exclusive => quote! {
        #sig {
          let (poly_value, poly_fns) = self.parts_mut();
          (poly_fns.#ident)(poly_value #(, #arg_idents)*)
        }
      },
    }
  });

  let table_doc = format!(
    " Free functions implementing [`{}`] for `PolySelf`, one per operation.",
    trait_ident
  );

  Ok(quote! {
    #[doc = #table_doc]
    #vis struct #fns<#t_params> #t_where {
      #(pub #idents: #fn_ptrs,)*
    }

    impl #t_impl ::std::clone::Clone for #fns #t_ty #t_where {
      fn clone(&self) -> Self {
        *self
      }
    }

    impl #t_impl ::std::marker::Copy for #fns #t_ty #t_where {}

    impl #t_impl #fns #t_ty #native_where {
      /// Table pointing every operation at the implementation `PolySelf` already has.
      pub fn native() -> Self {
        Self {
          #(#idents: <PolySelf as #trait_path>::#idents,)*
        }
      }
    }

    impl #t_impl #trait_path for ::vpoly::Bound<PolySelf, #fns #t_ty> #t_where {
      #(#impls)*
    }
  })
}
