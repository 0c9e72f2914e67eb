#![doc = "The `#[mapcast_testhelpers::test]` attribute."]

use proc_macro2::TokenStream;
use quote::quote;
use unsynn::*;

keyword! {
    KFn = "fn";
}

unsynn! {
    /// Attributes, visibility and qualifiers ahead of `fn`.
    struct Preamble {
        tokens: Any<Cons<Except<KFn>, TokenTree>>,
    }

    /// Generics, parameters and return type.
    struct Signature {
        tokens: Any<Cons<Except<BraceGroup>, TokenTree>>,
    }

    struct TestFn {
        preamble: Preamble,
        _fn: KFn,
        name: Ident,
        signature: Signature,
        body: BraceGroup,
    }
}

/// Test attribute macro that sets up tracing before running the test.
///
/// # Usage
///
/// Basic usage (uses `#[test]`):
/// ```ignore
/// #[mapcast_testhelpers::test]
/// fn my_test() {
///     // tracing is set up automatically
/// }
/// ```
///
/// With a custom test attribute:
/// ```ignore
/// #[mapcast_testhelpers::test(tokio::test)]
/// async fn my_async_test() {}
/// ```
#[proc_macro_attribute]
pub fn test(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    expand(attr.into(), item.into()).into()
}

fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut iter = item.to_token_iter();
    let decl = match iter.parse::<Cons<TestFn, EndOfStream>>() {
        Ok(decl) => decl.first,
        Err(err) => {
            let message = format!("#[mapcast_testhelpers::test] expects a function: {err}");
            return quote! { ::core::compile_error!(#message); };
        }
    };

    let mut preamble = TokenStream::new();
    decl.preamble.tokens.to_tokens(&mut preamble);
    let mut signature = TokenStream::new();
    decl.signature.tokens.to_tokens(&mut signature);
    let name = decl.name;
    let body = decl.body.0.stream();

    let test_attr = if attr.is_empty() {
        quote! { #[::core::prelude::rust_2024::test] }
    } else {
        quote! { #[#attr] }
    };

    quote! {
        #test_attr
        #preamble fn #name #signature {
            ::mapcast_testhelpers::setup();

            #body
        }
    }
}
