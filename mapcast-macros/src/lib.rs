#![doc = include_str!("../README.md")]

/// Derives `mapcast::Decode` for a struct with named fields.
///
/// Field attributes:
/// - `#[mapcast(embed)]` promotes the field's own fields into the parent
/// - `#[mapcast(<annotation> = "<value>")]` records a raw annotation, such as
///   `schema = "user_id"` or `default = "42"`
#[proc_macro_derive(Decode, attributes(mapcast))]
pub fn derive_decode(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    mapcast_macros_impl::derive_decode(input.into()).into()
}
