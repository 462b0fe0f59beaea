//! Procedural macros for mvu-dispatch

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: darling::ast::Data<ActionVariant, ()>,

    /// Every variant is broadcast unless marked `local`
    #[darling(default)]
    broadcast: bool,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<()>,

    /// Replicate this variant to every ancestor dispatcher
    #[darling(default)]
    broadcast: bool,

    /// Opt out of an enum-level `broadcast`
    #[darling(default)]
    local: bool,

    /// Explicit name for logging
    #[darling(default)]
    name: Option<String>,
}

impl ActionVariant {
    fn is_broadcast(&self, enum_broadcast: bool) -> bool {
        self.broadcast || (enum_broadcast && !self.local)
    }
}

/// Derive macro for the Action trait
///
/// Generates a `name()` method that returns the variant name as a static
/// string, and an `is_broadcast()` method classifying the variants marked
/// `#[action(broadcast)]`.
///
/// Putting `#[action(broadcast)]` on the enum marks every variant; individual
/// variants opt back out with `#[action(local)]`. `#[action(name = "...")]`
/// overrides the logged name of a variant.
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum CounterAction {
///     Inc,
///     #[action(broadcast)]
///     PlusX(i32),
///     #[action(name = "load")]
///     Load,
/// }
///
/// assert_eq!(CounterAction::PlusX(3).name(), "PlusX");
/// assert!(CounterAction::PlusX(3).is_broadcast());
/// assert!(!CounterAction::Inc.is_broadcast());
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    for v in variants.iter() {
        if v.broadcast && v.local {
            return syn::Error::new_spanned(
                &v.ident,
                "a variant cannot be both `broadcast` and `local`",
            )
            .to_compile_error()
            .into();
        }
    }

    let pattern = |v: &ActionVariant| {
        let variant_name = &v.ident;
        match &v.fields.style {
            darling::ast::Style::Unit => quote! { #name::#variant_name },
            darling::ast::Style::Tuple => quote! { #name::#variant_name(..) },
            darling::ast::Style::Struct => quote! { #name::#variant_name { .. } },
        }
    };

    let name_arms = variants.iter().map(|v| {
        let pat = pattern(v);
        let variant_str = v.name.clone().unwrap_or_else(|| v.ident.to_string());
        quote! { #pat => #variant_str }
    });

    let broadcast_patterns: Vec<_> = variants
        .iter()
        .filter(|v| v.is_broadcast(opts.broadcast))
        .map(pattern)
        .collect();

    // An empty enum has no arms; `matches!` with no patterns is not valid.
    let is_broadcast_body = if broadcast_patterns.is_empty() {
        quote! { false }
    } else {
        quote! { matches!(self, #(#broadcast_patterns)|*) }
    };

    let name_body = if variants.is_empty() {
        quote! { match *self {} }
    } else {
        quote! {
            match self {
                #(#name_arms),*
            }
        }
    };

    let expanded = quote! {
        impl #impl_generics mvu_dispatch::Action for #name #ty_generics #where_clause {
            fn name(&self) -> &'static str {
                #name_body
            }

            fn is_broadcast(&self) -> bool {
                #is_broadcast_body
            }
        }
    };

    TokenStream::from(expanded)
}
