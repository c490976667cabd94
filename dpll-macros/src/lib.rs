//! Internal macros for the dpll SAT solver.
use quote::quote;
use syn::{parse_quote, Attribute, Expr, Lit, LitStr, Meta, MetaNameValue};
use synstructure::decl_derive;

/// Doc comment lines of a field, without the leading space.
fn doc_lines(attrs: &[Attribute]) -> Vec<LitStr> {
    attrs
        .iter()
        .filter_map(|attr| match attr.parse_meta() {
            Ok(Meta::NameValue(MetaNameValue {
                ident,
                lit: Lit::Str(doc_str),
                ..
            })) => {
                if ident == "doc" {
                    Some(doc_str)
                } else {
                    None
                }
            }
            _ => None,
        })
        .collect()
}

/// Derives a default instance and a help text from the documentation.
///
/// Each field's default value is taken from a `(Default: <expr>)` note in its doc comment, fields
/// without such a note use `Default::default()`. The generated `help()` function lists every
/// field with its documentation.
fn derive_doc_default(s: synstructure::Structure) -> proc_macro2::TokenStream {
    let variant = match s.variants() {
        [variant] => variant,
        _ => panic!("DocDefault requires a struct"),
    };

    let default_re = regex::Regex::new(r"\(Default: (.*)\)").unwrap();

    let body = variant.construct(|field, _| {
        let mut default_value: Expr = parse_quote!(Default::default());
        for doc_str in doc_lines(&field.attrs) {
            if let Some(default_str) = default_re.captures(&doc_str.value()) {
                let default_str = default_str.get(1).unwrap().as_str();
                let default_str = LitStr::new(default_str, doc_str.span());
                default_value = default_str
                    .parse()
                    .expect("error parsing default expression");
            }
        }
        default_value
    });

    let mut help = String::new();
    for field in variant.ast().fields.iter() {
        let name = field
            .ident
            .as_ref()
            .expect("DocDefault requires named fields");
        help.push_str(&name.to_string());
        help.push_str(":\n");
        for doc_str in doc_lines(&field.attrs) {
            help.push_str("   ");
            help.push_str(doc_str.value().trim_end());
            help.push('\n');
        }
        help.push('\n');
    }

    let default_impl = s.gen_impl(quote! {
        gen impl Default for @Self {
            fn default() -> Self {
                #body
            }
        }
    });

    let name = &s.ast().ident;

    quote! {
        #default_impl

        impl #name {
            /// Description of all options with their default values.
            pub fn help() -> &'static str {
                #help
            }
        }
    }
}

decl_derive!([DocDefault] => derive_doc_default);
