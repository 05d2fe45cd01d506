//! The `dispatch!` macro.
//!
//! Input is an `enum` whose variants each wrap one concrete type, followed by an `impl` block listing the operations
//! to forward, each one marked `strict` or `loose`:
//!
//! ```ignore
//! dispatch! {
//!   pub enum Shape {
//!     Circle(Circle),
//!     Square(Square),
//!   }
//!
//!   impl Shape {
//!     pub strict fn area(&self) -> f64;
//!     pub loose fn scale(&mut self, by: f64);
//!   }
//! }
//! ```
//!
//! The block of a generic enum may spell its generics out (`impl<T> Either<T>`) or not (`impl Either`).

use proc_macro2::TokenStream;
use quote::{format_ident, quote, ToTokens};
use syn::{
  braced,
  parse::{Parse, ParseStream},
  spanned::Spanned,
  Attribute, Fields, FnArg, GenericParam, Generics, Ident, ItemEnum, Pat, PatIdent, Path, Signature, Token,
  TraitItemMethod, Type, Visibility,
};

mod kw {
  syn::custom_keyword!(strict);
  syn::custom_keyword!(loose);
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Strictness {
  Strict,
  Loose,
}

impl Parse for Strictness {
  fn parse(input: ParseStream) -> syn::Result<Self> {
    let lookahead = input.lookahead1();

    if lookahead.peek(kw::strict) {
      let _: kw::strict = input.parse()?;
      Ok(Strictness::Strict)
    } else if lookahead.peek(kw::loose) {
      let _: kw::loose = input.parse()?;
      Ok(Strictness::Loose)
    } else {
      Err(lookahead.error())
    }
  }
}

/// A forwarded operation: `[attrs] [vis] strict|loose fn sig;`.
#[derive(Debug)]
struct Operation {
  attrs: Vec<Attribute>,
  vis: Visibility,
  strictness: Strictness,
  /// Signature with every argument pattern replaced by a plain identifier.
  sig: Signature,
  args: Vec<Ident>,
}

impl Parse for Operation {
  fn parse(input: ParseStream) -> syn::Result<Self> {
    let attrs = input.call(Attribute::parse_outer)?;
    let vis = input.parse()?;
    let strictness = input.parse()?;
    let method: TraitItemMethod = input.parse()?;

    if let Some(body) = &method.default {
      return Err(syn::Error::new(
        body.span(),
        "forwarded operations are declared without a body",
      ));
    }

    let mut sig = method.sig;

    if let Some(asyncness) = &sig.asyncness {
      return Err(syn::Error::new(asyncness.span(), "async operations can’t be forwarded"));
    }

    for param in &sig.generics.params {
      if !matches!(param, GenericParam::Lifetime(_)) {
        return Err(syn::Error::new(
          param.span(),
          "generic operations can’t be forwarded; only lifetime parameters are allowed",
        ));
      }
    }

    if !matches!(sig.inputs.first(), Some(FnArg::Receiver(_))) {
      return Err(syn::Error::new(
        sig.ident.span(),
        "forwarded operations must take `self`, `&self` or `&mut self`",
      ));
    }

    let mut args = Vec::new();

    for (rank, input) in sig.inputs.iter_mut().skip(1).enumerate() {
      if let FnArg::Typed(pat_ty) = input {
        let ident = match &*pat_ty.pat {
          Pat::Ident(PatIdent {
            by_ref: None,
            subpat: None,
            ident,
            ..
          }) => ident.clone(),
          _ => format_ident!("arg_{}", rank),
        };

        *pat_ty.pat = Pat::Ident(PatIdent {
          attrs: Vec::new(),
          by_ref: None,
          mutability: None,
          ident: ident.clone(),
          subpat: None,
        });

        args.push(ident);
      }
    }

    Ok(Operation {
      attrs: attrs.into_iter().chain(method.attrs).collect(),
      vis,
      strictness,
      sig,
      args,
    })
  }
}

/// One alternative of the union.
#[derive(Debug)]
struct Alternative {
  ident: Ident,
  ty: Type,
}

/// The whole macro input.
#[derive(Debug)]
pub struct DispatchInput {
  item: ItemEnum,
  alternatives: Vec<Alternative>,
  ops: Vec<Operation>,
}

impl Parse for DispatchInput {
  fn parse(input: ParseStream) -> syn::Result<Self> {
    let item: ItemEnum = input.parse()?;

    if item.variants.is_empty() {
      return Err(syn::Error::new(
        item.ident.span(),
        "a dispatcher needs at least one alternative",
      ));
    }

    let mut alternatives = Vec::with_capacity(item.variants.len());

    for variant in &item.variants {
      if let Some((_, discriminant)) = &variant.discriminant {
        return Err(syn::Error::new(
          discriminant.span(),
          "alternatives can’t have explicit discriminants",
        ));
      }

      let ty = match &variant.fields {
        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => fields.unnamed[0].ty.clone(),

        _ => {
          return Err(syn::Error::new(
            variant.span(),
            "every alternative must wrap exactly one type, as in `Name(Type)`",
          ));
        }
      };

      alternatives.push(Alternative {
        ident: variant.ident.clone(),
        ty,
      });
    }

    let _: Option<Token![;]> = input.parse()?;

    let mut ops = Vec::new();

    if !input.is_empty() {
      // `impl Either`, or `impl<T> Either<T>` for a generic enum; the generics declared on the enum are the ones used
      let _: Token![impl] = input.parse()?;
      let _: Generics = input.parse()?;
      let self_ty: Path = input.parse()?;

      let names_enum = self_ty.leading_colon.is_none()
        && self_ty.segments.len() == 1
        && self_ty.segments[0].ident == item.ident;

      if !names_enum {
        return Err(syn::Error::new(
          self_ty.span(),
          format!("expected `impl {}`, the enum declared above", item.ident),
        ));
      }

      let content;
      braced!(content in input);

      while !content.is_empty() {
        ops.push(content.parse()?);
      }
    }

    Ok(DispatchInput {
      item,
      alternatives,
      ops,
    })
  }
}

impl DispatchInput {
  /// Whether `ty` is wrapped by exactly one alternative and isn’t a bare type parameter of the enum.
  fn is_convertible(&self, ty: &Type) -> bool {
    let repr = ty.to_token_stream().to_string();
    let occurrences = self
      .alternatives
      .iter()
      .filter(|alt| alt.ty.to_token_stream().to_string() == repr)
      .count();
    let is_param = self.item.generics.type_params().any(|param| param.ident == repr);

    occurrences == 1 && !is_param
  }

  fn forwarder(&self, op: &Operation) -> TokenStream {
    let Operation {
      attrs,
      vis,
      strictness,
      sig,
      args,
    } = op;
    let ident = &sig.ident;

    let arms = self.alternatives.iter().map(|alt| {
      let variant = &alt.ident;
      let ty = &alt.ty;

      let call = match strictness {
        Strictness::Strict => quote! {
          ::vpoly::dispatch::strict(<#ty>::#ident, alt, (#(#args,)*))
        },

        Strictness::Loose => quote! {
          alt.#ident(#(#args),*)
        },
      };

      quote! {
        Self::#variant(alt) => #call,
      }
    });

    quote! {
      #(#attrs)*
      #vis #sig {
        match self {
          #(#arms)*
        }
      }
    }
  }
}

impl ToTokens for DispatchInput {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let item = &self.item;
    let ident = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();

    let names = self
      .alternatives
      .iter()
      .map(|alt| alt.ident.to_string())
      .collect::<Vec<_>>();
    let variants = self.alternatives.iter().map(|alt| &alt.ident).collect::<Vec<_>>();
    let ranks = 0..self.alternatives.len();

    let froms = self
      .alternatives
      .iter()
      .filter(|alt| self.is_convertible(&alt.ty))
      .map(|alt| {
        let variant = &alt.ident;
        let ty = &alt.ty;

        quote! {
          impl #impl_generics ::std::convert::From<#ty> for #ident #ty_generics #where_clause {
            fn from(alt: #ty) -> Self {
              Self::#variant(alt)
            }
          }
        }
      });

    let forwarders = self.ops.iter().map(|op| self.forwarder(op));

    let methods = if self.ops.is_empty() {
      quote! {}
    } else {
      quote! {
        impl #impl_generics #ident #ty_generics #where_clause {
          #(#forwarders)*
        }
      }
    };

    tokens.extend(quote! {
      #item

      #(#froms)*

      impl #impl_generics ::vpoly::Dispatch for #ident #ty_generics #where_clause {
        const ALTERNATIVES: &'static [&'static str] = &[#(#names),*];

        fn active(&self) -> usize {
          match self {
            #(Self::#variants(_) => #ranks,)*
          }
        }
      }

      #methods
    });
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use syn::{File, ImplItem, Item};

  fn parse(tokens: TokenStream) -> syn::Result<DispatchInput> {
    syn::parse2(tokens)
  }

  fn expand(tokens: TokenStream) -> File {
    let input = parse(tokens).unwrap();
    syn::parse2(input.into_token_stream()).expect("expansion must be valid Rust")
  }

  fn error_of(tokens: TokenStream) -> String {
    parse(tokens).unwrap_err().to_string()
  }

  fn from_impls(file: &File) -> Vec<String> {
    file
      .items
      .iter()
      .filter_map(|item| match item {
        Item::Impl(i) => i.trait_.as_ref().map(|(_, path, _)| path),
        _ => None,
      })
      .map(|path| path.to_token_stream().to_string())
      .filter(|path| path.contains("From"))
      .collect()
  }

  #[test]
  fn parses_operations() {
    let input = parse(quote! {
      enum Shape {
        Circle(Circle),
        Square(Square),
      }

      impl Shape {
        /// Area.
        pub strict fn area(&self) -> f64;
        loose fn scale(&mut self, (by): f64, _: bool);
      }
    })
    .unwrap();

    assert_eq!(input.alternatives.len(), 2);
    assert_eq!(input.ops.len(), 2);
    assert_eq!(input.ops[0].strictness, Strictness::Strict);
    assert_eq!(input.ops[0].attrs.len(), 1);
    assert_eq!(input.ops[1].strictness, Strictness::Loose);
    assert_eq!(input.ops[1].args, vec!["arg_0", "arg_1"]);
  }

  #[test]
  fn operations_are_optional() {
    let file = expand(quote! {
      enum Either {
        Left(u8),
        Right(String),
      };
    });

    let methods = file.items.iter().any(|item| matches!(item, Item::Impl(i) if i.trait_.is_none()));
    assert!(!methods);
  }

  #[test]
  fn forwards_to_every_alternative() {
    let file = expand(quote! {
      enum Shape {
        Circle(Circle),
        Square(Square),
      }

      impl Shape {
        strict fn area(&self) -> f64;
        loose fn scale(&mut self, by: f64);
      }
    });

    let inherent = file
      .items
      .iter()
      .find_map(|item| match item {
        Item::Impl(i) if i.trait_.is_none() => Some(i),
        _ => None,
      })
      .unwrap();

    let bodies = inherent
      .items
      .iter()
      .filter_map(|item| match item {
        ImplItem::Method(m) => Some((m.sig.ident.to_string(), m.block.to_token_stream().to_string())),
        _ => None,
      })
      .collect::<Vec<_>>();

    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0].0, "area");
    assert!(bodies[0].1.contains("strict (< Circle > :: area"));
    assert!(bodies[0].1.contains("strict (< Square > :: area"));
    assert_eq!(bodies[1].0, "scale");
    assert!(bodies[1].1.contains("alt . scale (by)"));
  }

  #[test]
  fn converts_from_unique_alternatives_only() {
    let file = expand(quote! {
      enum Temp<T> {
        Celsius(f64),
        Fahrenheit(f64),
        Kelvin(u32),
        Other(T),
      }
    });

    assert_eq!(from_impls(&file), vec![":: std :: convert :: From < u32 >"]);
  }

  #[test]
  fn lists_alternatives() {
    let file = expand(quote! {
      enum Shape {
        Circle(Circle),
        Square(Square),
      }
    });

    let dispatch = file
      .items
      .iter()
      .find_map(|item| match item {
        Item::Impl(i) => i
          .trait_
          .as_ref()
          .filter(|(_, path, _)| path.to_token_stream().to_string().ends_with("Dispatch"))
          .map(|_| i.to_token_stream().to_string()),
        _ => None,
      })
      .unwrap();

    assert!(dispatch.contains("& [\"Circle\" , \"Square\"]"));
    assert!(dispatch.contains("Self :: Square (_) => 1usize"));
  }

  #[test]
  fn rejects_bad_alternatives() {
    assert!(error_of(quote! { enum E {} }).contains("at least one alternative"));
    assert!(error_of(quote! { enum E { A } }).contains("exactly one type"));
    assert!(error_of(quote! { enum E { A(u8, u8) } }).contains("exactly one type"));
    assert!(error_of(quote! { enum E { A { x: u8 } } }).contains("exactly one type"));
  }

  #[test]
  fn rejects_bad_operations() {
    let cases = vec![
      (quote! { fn f(&self); }, "expected one of"),
      (quote! { strict fn f(&self) {} }, "without a body"),
      (quote! { strict fn f(x: u8); }, "must take `self`"),
      (quote! { loose fn f<T>(&self, t: T); }, "generic operations"),
      (quote! { loose async fn f(&self); }, "async"),
    ];

    for (op, expected) in cases {
      let err = error_of(quote! {
        enum E { A(A) }
        impl E { #op }
      });

      assert!(err.contains(expected), "`{}` doesn’t mention `{}`", err, expected);
    }
  }

  #[test]
  fn rejects_impl_of_another_type() {
    let err = error_of(quote! {
      enum E { A(A) }
      impl F {}
    });

    assert!(err.contains("expected `impl E`"));

    let err = error_of(quote! {
      enum E<T> { A(T) }
      impl<T> other::E<T> {}
    });

    assert!(err.contains("expected `impl E`"));
  }

  #[test]
  fn generic_impl_headers() {
    let plain = expand(quote! {
      enum Either<L, R> { Left(L), Right(R) }
      impl Either { loose fn describe(&self) -> String; }
    });

    let generic = expand(quote! {
      enum Either<L, R> { Left(L), Right(R) }
      impl<L, R> Either<L, R> { loose fn describe(&self) -> String; }
    });

    assert_eq!(
      plain.to_token_stream().to_string(),
      generic.to_token_stream().to_string()
    );
  }
}
