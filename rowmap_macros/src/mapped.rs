use darling::{ast::Data, FromDeriveInput, FromField, FromVariant};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{DeriveInput, Error, Generics, Type};

use crate::utils::rename::{unraw, RenameRule};

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(mapped), supports(struct_named, enum_unit))]
struct MappedOpts {
    ident: Ident,
    generics: Generics,
    data: Data<MappedVariantOpt, MappedFieldOpt>,
    #[darling(default)]
    rename_all: Option<RenameRule>,
    #[darling(default)]
    opaque: bool,
}

#[derive(Debug, FromField)]
#[darling(attributes(mapped))]
struct MappedFieldOpt {
    ident: Option<Ident>,
    ty: Type,
    #[darling(default)]
    rename: Option<String>,
    #[darling(default)]
    skip: bool,
    #[darling(default)]
    opaque: bool,
}

#[derive(Debug, FromVariant)]
#[darling(attributes(mapped))]
struct MappedVariantOpt {
    ident: Ident,
    #[darling(default)]
    rename: Option<String>,
}

impl MappedFieldOpt {
    fn member_name(&self, ident: &Ident, rule: Option<RenameRule>) -> String {
        if let Some(rename) = &self.rename {
            return rename.clone();
        }
        let name = unraw(ident);
        match rule {
            Some(rule) => rule.apply(&name),
            None => name,
        }
    }
}

pub(crate) fn handle(ast: DeriveInput) -> Result<TokenStream, Error> {
    let opts = MappedOpts::from_derive_input(&ast)?;

    if !opts.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &opts.generics,
            "generic destination types are not supported",
        ));
    }

    match &opts.data {
        Data::Struct(fields) => struct_codegen(&opts, &fields.fields),
        Data::Enum(variants) => {
            if opts.rename_all.is_some() || opts.opaque {
                return Err(Error::new_spanned(
                    &opts.ident,
                    "rename_all and opaque only apply to structs",
                ));
            }
            Ok(enum_codegen(&opts.ident, variants))
        }
    }
}

fn struct_codegen(opts: &MappedOpts, fields: &[MappedFieldOpt]) -> Result<TokenStream, Error> {
    let struct_name = &opts.ident;
    let constructible = !opts.opaque;

    let mut members = Vec::new();
    for field in fields.iter().filter(|field| !field.skip) {
        let Some(ident) = field.ident.as_ref() else {
            return Err(Error::new_spanned(&field.ty, "expected a named field"));
        };
        let name = field.member_name(ident, opts.rename_all);
        let ty = &field.ty;
        let shape = if field.opaque {
            quote!(|| ::rowmap::shape::TypeShape::opaque::<#ty>())
        } else {
            quote!(<#ty as ::rowmap::shape::Member>::shape)
        };
        members.push(quote! {
            ::rowmap::shape::MemberShape::new(#name, #shape, |target, value| {
                ::rowmap::shape::assign_field::<Self, #ty>(target, value, |owner| &mut owner.#ident)
            })
        });
    }

    Ok(quote! {
        impl ::rowmap::shape::Member for #struct_name {
            fn shape() -> ::rowmap::shape::TypeShape {
                ::rowmap::shape::TypeShape::nested::<Self>()
            }
        }

        impl ::rowmap::shape::Mapped for #struct_name {
            const CONSTRUCTIBLE: bool = #constructible;

            fn members() -> ::std::vec::Vec<::rowmap::shape::MemberShape> {
                ::std::vec![#(#members),*]
            }
        }
    })
}

fn enum_codegen(enum_name: &Ident, variants: &[MappedVariantOpt]) -> TokenStream {
    let idents: Vec<&Ident> = variants.iter().map(|variant| &variant.ident).collect();
    let names: Vec<String> = variants
        .iter()
        .map(|variant| variant.rename.clone().unwrap_or_else(|| unraw(&variant.ident)))
        .collect();

    quote! {
        impl ::rowmap::shape::Member for #enum_name {
            fn shape() -> ::rowmap::shape::TypeShape {
                ::rowmap::shape::TypeShape::leaf::<Self>(::rowmap::shape::ShapeKind::Enumeration)
            }
        }

        impl ::rowmap::record::FromValue for #enum_name {
            fn from_value(
                value: &::rowmap::record::Value,
            ) -> ::std::result::Result<Self, ::rowmap::record::ValueError> {
                let expected = ::std::any::type_name::<Self>();
                if let ::std::option::Option::Some(name) = value.as_str() {
                    return match name {
                        #(#names => ::std::result::Result::Ok(Self::#idents),)*
                        other => ::std::result::Result::Err(
                            ::rowmap::record::ValueError::InvalidConversion(::std::format!(
                                "{other:?} is not a variant of {expected}"
                            )),
                        ),
                    };
                }
                if let ::std::option::Option::Some(number) = value.as_integer() {
                    #(
                        if number == Self::#idents as i64 as i128 {
                            return ::std::result::Result::Ok(Self::#idents);
                        }
                    )*
                    return ::std::result::Result::Err(
                        ::rowmap::record::ValueError::InvalidConversion(::std::format!(
                            "{number} is not a discriminant of {expected}"
                        )),
                    );
                }
                if value.is_null() {
                    return ::std::result::Result::Err(
                        ::rowmap::record::ValueError::NullNotAllowed(expected),
                    );
                }
                ::std::result::Result::Err(::rowmap::record::ValueError::TypeMismatch {
                    expected,
                    actual: value.type_name(),
                })
            }
        }
    }
}
