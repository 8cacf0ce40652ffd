//! Derive macros for sgen test data generation.
//!
//! This crate provides a procedural macro turning a struct whose fields are
//! sgen fields into a record schema.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

/// Derive macro implementing `sgen::Declare`.
///
/// Every named field becomes a schema field, in declaration order, named
/// after the struct field. Each struct field must hold an sgen producer,
/// usually a built `Field<D>`.
///
/// # Attributes
///
/// - `#[sgen(rename = "other")]` declares the field under another name.
/// - `#[sgen(skip)]` leaves the field out of the schema.
///
/// # Example
///
/// ```rust,ignore
/// use sgen::*;
///
/// #[derive(Declare)]
/// struct Car {
///     model: Field<Text>,
///     #[sgen(rename = "yearOfIssue")]
///     year: Field<Integer>,
/// }
///
/// let schema = Car {
///     model: field::string().build()?,
///     year: field::integer().required(true).build()?,
/// }
/// .declare()?;
/// ```
#[proc_macro_derive(Declare, attributes(sgen))]
pub fn derive_declare(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match declare_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Options read from `#[sgen(...)]` on a struct field.
#[derive(Default)]
struct FieldOptions {
    rename: Option<LitStr>,
    skip: bool,
}

impl FieldOptions {
    fn parse(field: &syn::Field) -> Result<Self, syn::Error> {
        let mut options = FieldOptions::default();
        for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("sgen")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    options.rename = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    options.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported sgen attribute, expected `rename` or `skip`"))
                }
            })?;
        }
        Ok(options)
    }
}

/// Generate the implementation for the Declare trait.
fn declare_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Declare derive macro requires a struct with named fields",
                ));
            }
        },
        Data::Enum(_) | Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Declare derive macro only supports structs",
            ));
        }
    };

    let mut declarations = Vec::new();
    for field in fields {
        let options = FieldOptions::parse(field)?;
        if options.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let declared = match options.rename {
            Some(rename) => rename,
            None => LitStr::new(&ident.to_string(), ident.span()),
        };
        declarations.push(quote! {
            .field(#declared, self.#ident)
        });
    }

    if declarations.is_empty() {
        return Err(syn::Error::new_spanned(
            input,
            "Declare derive macro requires at least one declared field",
        ));
    }

    Ok(quote! {
        impl #impl_generics sgen::Declare for #name #ty_generics #where_clause {
            fn declare(self) -> sgen::Result<sgen::Schema> {
                sgen::Schema::builder()
                    #(#declarations)*
                    .build()
            }
        }
    })
}
