//! Parses the item a `#[derive(Decode)]` is attached to.

use proc_macro2::{Delimiter, Group, Ident, Span, TokenStream, TokenTree};
use quote::quote_spanned;
use unsynn::*;

use crate::unescaping::string_value;

keyword! {
    KStruct = "struct";
    KEnum = "enum";
    KUnion = "union";
    KPub = "pub";
    KMapcast = "mapcast";
    KEmbed = "embed";
}

operator! {
    /// Represents the '=' operator.
    Equals = "=";
}

unsynn! {
    /// An outer attribute: `#[...]`
    struct Attribute {
        _pound: Pound,
        body: BracketGroup,
    }

    /// `pub(...)` must come first so it is not read as bare `pub`.
    enum Visibility {
        Restricted(Cons<KPub, ParenthesisGroup>),
        Public(KPub),
    }

    enum ItemKind {
        Struct(KStruct),
        Enum(KEnum),
        Union(KUnion),
    }

    /// The head of a derive input, up to and including its body.
    struct Item {
        _attributes: Vec<Attribute>,
        _vis: Option<Visibility>,
        kind: ItemKind,
        name: Ident,
        body: ItemBody,
    }

    enum ItemBody {
        Generic(Lt),
        Named(BraceGroup),
        Tuple(ParenthesisGroup),
        Unit(Semicolon),
    }

    /// A named field: `#[mapcast(...)] pub name: Type`
    struct FieldDecl {
        attributes: Vec<Attribute>,
        vis: Option<Visibility>,
        name: Ident,
        _colon: Colon,
        ty: VerbatimUntil<Comma>,
    }

    /// A token tree, or a `<...>` run taken as one so commas between generic
    /// arguments stay inside the field type.
    struct AngleTokenTree(
        #[allow(clippy::type_complexity)]
        Either<Cons<Lt, Vec<Cons<Except<Gt>, AngleTokenTree>>, Gt>, TokenTree>,
    );

    /// One argument inside `#[mapcast(...)]`.
    enum MapcastArg {
        Tag(Cons<Ident, Equals, Literal>),
        Embed(KEmbed),
        Unknown(Ident),
    }
}

/// Tokens up to the next `C` at the current nesting level.
type VerbatimUntil<C> = Many<Cons<Except<C>, AngleTokenTree>>;

/// A parse failure, reported as a `compile_error!` at `span`.
#[derive(Debug)]
pub struct Error {
    span: Span,
    message: String,
}

impl Error {
    /// Creates an error pointing at `span`.
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Emits the error as a `compile_error!` invocation.
    pub fn to_compile_error(&self) -> TokenStream {
        let message = &self.message;
        quote_spanned! {self.span=>
            ::core::compile_error!(#message);
        }
    }
}

/// A struct with named fields.
#[derive(Debug)]
pub struct PStruct {
    /// The struct's name
    pub name: Ident,
    /// Fields in declaration order
    pub fields: Vec<PField>,
}

/// A named field and its `#[mapcast(...)]` annotations.
#[derive(Debug)]
pub struct PField {
    /// The field's identifier, possibly raw (`r#type`)
    pub ident: Ident,
    /// The field's type tokens
    pub ty: TokenStream,
    /// Whether the field is declared bare `pub`
    pub public: bool,
    /// Whether the field carries `#[mapcast(embed)]`
    pub embedded: bool,
    /// `key = "value"` annotations in order
    pub tags: Vec<(String, String)>,
}

impl PField {
    /// The declared name, without any `r#` prefix.
    pub fn name(&self) -> String {
        let name = self.ident.to_string();
        match name.strip_prefix("r#") {
            Some(stripped) => stripped.to_owned(),
            None => name,
        }
    }
}

/// Recursively flattens transparent groups (groups with `Delimiter::None`).
///
/// `macro_rules!` captures like `$vis:vis` arrive wrapped in such groups.
pub fn flatten_transparent_groups(input: TokenStream) -> TokenStream {
    input
        .into_iter()
        .flat_map(|tt| match tt {
            TokenTree::Group(group) if group.delimiter() == Delimiter::None => {
                flatten_transparent_groups(group.stream())
            }
            TokenTree::Group(group) => {
                let mut new_group =
                    Group::new(group.delimiter(), flatten_transparent_groups(group.stream()));
                new_group.set_span(group.span());
                std::iter::once(TokenTree::Group(new_group)).collect()
            }
            other => std::iter::once(other).collect(),
        })
        .collect()
}

fn tokens_of(item: &impl ToTokens) -> TokenStream {
    let mut tokens = TokenStream::new();
    item.to_tokens(&mut tokens);
    tokens
}

/// Parses a derive input into a [`PStruct`].
pub fn parse_struct(input: TokenStream) -> std::result::Result<PStruct, Error> {
    let input = flatten_transparent_groups(input);
    let mut iter = input.to_token_iter();
    let item = iter
        .parse::<Item>()
        .map_err(|err| Error::new(Span::call_site(), format!("expected a struct: {err}")))?;

    let kind = match item.kind {
        ItemKind::Struct(_) => None,
        ItemKind::Enum(_) => Some("enums"),
        ItemKind::Union(_) => Some("unions"),
    };
    if let Some(kind) = kind {
        return Err(Error::new(
            item.name.span(),
            format!("`Decode` can only be derived for structs, not {kind}"),
        ));
    }

    let name = item.name;
    match item.body {
        ItemBody::Generic(_) => Err(Error::new(
            name.span(),
            "`Decode` cannot be derived for generic structs",
        )),
        ItemBody::Tuple(group) => Err(Error::new(
            group.0.span(),
            "`Decode` needs named fields; tuple structs are not supported",
        )),
        ItemBody::Unit(_) => Ok(PStruct {
            name,
            fields: Vec::new(),
        }),
        ItemBody::Named(body) => Ok(PStruct {
            fields: parse_fields(&body.0)?,
            name,
        }),
    }
}

fn parse_fields(body: &Group) -> std::result::Result<Vec<PField>, Error> {
    let stream = body.stream();
    let mut iter = stream.to_token_iter();
    let decls = iter
        .parse::<Cons<CommaDelimitedVec<FieldDecl>, EndOfStream>>()
        .map_err(|err| Error::new(body.span(), format!("expected named fields: {err}")))?;

    decls
        .first
        .iter()
        .map(|decl| {
            let decl = &decl.value;
            let mut field = PField {
                ident: decl.name.clone(),
                ty: tokens_of(&decl.ty),
                public: matches!(decl.vis, Some(Visibility::Public(_))),
                embedded: false,
                tags: Vec::new(),
            };
            for attr in &decl.attributes {
                apply_attribute(&mut field, &attr.body.0)?;
            }
            Ok(field)
        })
        .collect()
}

/// Applies one outer attribute to `field`. Attributes other than `mapcast` are ignored.
fn apply_attribute(field: &mut PField, attr: &Group) -> std::result::Result<(), Error> {
    let stream = attr.stream();
    let mut iter = stream.to_token_iter();
    if iter.parse::<KMapcast>().is_err() {
        return Ok(());
    }
    let args = iter
        .parse::<Cons<ParenthesisGroup, EndOfStream>>()
        .map_err(|_| Error::new(attr.span(), "expected `#[mapcast(...)]`"))?
        .first
        .0;

    let stream = args.stream();
    let mut iter = stream.to_token_iter();
    let list = iter
        .parse::<Cons<CommaDelimitedVec<MapcastArg>, EndOfStream>>()
        .map_err(|_| Error::new(args.span(), "expected `embed` or `name = \"value\"`"))?;

    for arg in list.first.iter() {
        match &arg.value {
            MapcastArg::Tag(tag) => {
                let value = string_value(&tag.third)
                    .map_err(|err| Error::new(tag.third.span(), err.to_string()))?;
                field.tags.push((tag.first.to_string(), value));
            }
            MapcastArg::Embed(_) => field.embedded = true,
            MapcastArg::Unknown(flag) => {
                return Err(Error::new(
                    flag.span(),
                    format!("unknown mapcast attribute `{flag}`"),
                ));
            }
        }
    }
    Ok(())
}
