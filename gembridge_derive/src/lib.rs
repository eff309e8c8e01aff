use proc_macro::TokenStream;
use quote::quote;
use syn::*;

#[proc_macro_derive(ToolParameters)]
pub fn tool_parameters_derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match impl_tool_parameters(&ast) {
        Ok(expanded) => expanded,
        Err(e) => e.to_compile_error().into(),
    }
}

fn impl_tool_parameters(ast: &DeriveInput) -> Result<TokenStream> {
    let name = &ast.ident;

    let fields = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => Err(syn::Error::new_spanned(
                &ast,
                "ToolParameters derive only supports named fields",
            ))?,
        },
        _ => Err(syn::Error::new_spanned(
            &ast,
            "ToolParameters derive only supports structs",
        ))?,
    };

    let properties = fields
        .iter()
        .map(|field| -> Result<(String, proc_macro2::TokenStream, bool)> {
            let name = field
                .ident
                .as_ref()
                .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?
                .to_string();
            let ty = unwrap_option(&field.ty).unwrap_or(&field.ty);
            let property = property_tokens(ty, get_description(field))?;
            Ok((name, property, !is_option(&field.ty)))
        })
        .collect::<Result<Vec<_>>>()?;

    let required_fields = properties
        .iter()
        .filter(|(_, _, required)| *required)
        .map(|(name, _, _)| name.clone())
        .collect::<Vec<_>>();
    let required = if required_fields.is_empty() {
        quote! { None }
    } else {
        quote! { Some(vec![#(#required_fields.to_string()),*]) }
    };
    let keys = properties.iter().map(|(name, _, _)| name);
    let values = properties.iter().map(|(_, prop, _)| prop);

    let gen_code = quote! {
        impl ::gembridge_llm::tools::ToolParameters for #name {
            fn parameters() -> ::gembridge_llm::tools::Parameters {
                ::gembridge_llm::tools::Parameters {
                    r#type: "object".to_string(),
                    properties: {
                        let mut map = ::std::collections::HashMap::new();
                        #(
                            map.insert(#keys.to_string(), #values);
                        )*
                        map
                    },
                    required: #required,
                }
            }
        }
    };

    Ok(gen_code.into())
}

/// `Property` expression for one field type. `Vec<T>` becomes an array whose
/// `items` describe `T`.
fn property_tokens(ty: &Type, description: Option<String>) -> Result<proc_macro2::TokenStream> {
    let data_type = get_data_type(ty)?;
    let description = match description {
        Some(desc) => quote! { Some(#desc.to_string()) },
        None => quote! { None },
    };
    let items = match generic_argument(ty, "Vec") {
        Some(inner) => {
            let inner = property_tokens(inner, None)?;
            quote! { Some(Box::new(#inner)) }
        }
        None => quote! { None },
    };
    Ok(quote! {
        ::gembridge_llm::tools::Property {
            r#type: #data_type.to_string(),
            items: #items,
            description: #description,
            enum_values: None,
            properties: None,
        }
    })
}

fn get_data_type(ty: &Type) -> Result<String> {
    match ty {
        Type::Path(type_path) => match type_path.path.segments.last() {
            Some(segment) => Ok(match segment.ident.to_string().as_str() {
                "String" | "str" => "string",
                "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64" | "usize"
                | "isize" => "integer",
                "f32" | "f64" => "number",
                "bool" => "boolean",
                "Vec" => "array",
                "Option" => {
                    return match unwrap_option(ty) {
                        Some(inner) => get_data_type(inner),
                        None => Err(syn::Error::new_spanned(
                            ty,
                            "Unsupported type for ToolParameters derive",
                        )),
                    };
                }
                _ => "object",
            }
            .to_string()),
            None => Ok("object".to_string()),
        },
        Type::Reference(reference) => get_data_type(&reference.elem),
        _ => Err(syn::Error::new_spanned(
            ty,
            "Unsupported type for ToolParameters derive",
        )),
    }
}

/// The `T` of `Wrapper<T>` when the last path segment is `wrapper`.
fn generic_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) if args.args.len() == 1 => match &args.args[0] {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

fn unwrap_option(ty: &Type) -> Option<&Type> {
    generic_argument(ty, "Option")
}

fn is_option(ty: &Type) -> bool {
    unwrap_option(ty).is_some()
}

fn get_description(field: &Field) -> Option<String> {
    let description = field
        .attrs
        .iter()
        .filter_map(|attr: &Attribute| {
            if let Meta::NameValue(name_value) = &attr.meta {
                if name_value.path.is_ident("doc") {
                    if let syn::Expr::Lit(expr_lit) = &name_value.value {
                        if let syn::Lit::Str(lit_str) = &expr_lit.lit {
                            return Some(lit_str.value().trim().to_string());
                        }
                    }
                }
            }
            None
        })
        .collect::<Vec<_>>()
        .join("\n")
        .to_string();

    if description.is_empty() {
        None
    } else {
        Some(description)
    }
}
