use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, Type};

pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = generate_injectable_impl(&input).unwrap_or_else(syn::Error::into_compile_error);
    TokenStream::from(expanded)
}

fn generate_injectable_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => {
                let field_injections = fields
                    .named
                    .iter()
                    .map(field_injection)
                    .collect::<syn::Result<Vec<_>>>()?;
                quote! {
                    Self {
                        #(#field_injections),*
                    }
                }
            }
            Fields::Unit => quote!(Self),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    struct_name,
                    "#[derive(Injectable)] only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "#[derive(Injectable)] can only be applied to structs",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::class_trait_booter::Injectable for #struct_name #ty_generics #where_clause {
            fn inject(
                container: &::class_trait_booter::Container
            ) -> ::class_trait_booter::Result<Self> {
                Ok(#body)
            }
        }
    })
}

fn field_injection(field: &Field) -> syn::Result<TokenStream2> {
    let field_name = &field.ident;

    if is_default_field(field)? {
        return Ok(quote! {
            #field_name: ::core::default::Default::default()
        });
    }

    let field_type = extract_injectable_type(&field.ty);
    let resolve_method = match &field_type {
        // syn parses `dyn Trait` as TraitObject.
        Type::TraitObject(_) => quote!(resolve_trait),
        _ => quote!(resolve),
    };

    Ok(quote! {
        #field_name: container.#resolve_method::<#field_type>()?
    })
}

/// Whether the field carries `#[inject(default)]`
fn is_default_field(field: &Field) -> syn::Result<bool> {
    let mut default = false;
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("inject")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                default = true;
                Ok(())
            } else {
                Err(meta.error("unsupported inject option, expected `default`"))
            }
        })?;
    }
    Ok(default)
}

/// Extract the inner type from Arc<T> or Arc<dyn Trait>
fn extract_injectable_type(ty: &Type) -> Type {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Arc" {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(syn::GenericArgument::Type(inner_type)) = args.args.first() {
                        return inner_type.clone();
                    }
                }
            }
        }
    }

    // If not Arc<T>, return as-is
    ty.clone()
}
