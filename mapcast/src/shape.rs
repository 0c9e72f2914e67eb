//! Static type descriptions for decodable types.
//!
//! Every [`Decode`](crate::Decode) type carries a `&'static Shape` that tells the
//! decoder what it is looking at: a leaf scalar, a pointer, a sequence, a record
//! with a field table, or the dynamic [`Value`](crate::Value) itself.

use core::any::TypeId;
use core::fmt;

/// A `TypeId` that can be captured in a `const` context.
///
/// `TypeId::of` is not usable in consts on stable, so we store the function that
/// produces it instead.
#[derive(Clone, Copy)]
pub struct ConstTypeId {
    type_id_fn: fn() -> TypeId,
}

impl ConstTypeId {
    /// Captures the type id of `T`.
    pub const fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id_fn: TypeId::of::<T>,
        }
    }

    /// Returns the actual `TypeId`.
    #[inline]
    pub fn get(self) -> TypeId {
        (self.type_id_fn)()
    }
}

impl fmt::Debug for ConstTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.get(), f)
    }
}

impl PartialEq for ConstTypeId {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl Eq for ConstTypeId {}

/// Describes a decodable type.
pub struct Shape {
    /// Identity of the described type.
    pub id: ConstTypeId,

    /// Bare type name without generic parameters, e.g. `Vec` or `Config`.
    pub type_identifier: &'static str,

    /// What kind of type this is, and how to reach its parts.
    pub def: Def,
}

impl Shape {
    /// Returns true if this shape describes `T`.
    #[inline]
    pub fn is_type<T: ?Sized + 'static>(&self) -> bool {
        self.id.get() == TypeId::of::<T>()
    }

    /// Returns true if this shape describes a record.
    #[inline]
    pub fn is_record(&self) -> bool {
        matches!(self.def, Def::Struct(_))
    }

    /// Returns the field table if this shape describes a record.
    pub fn fields(&self) -> &'static [Field] {
        match self.def {
            Def::Struct(StructDef { fields }) => fields,
            _ => &[],
        }
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Shape {}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_identifier)?;
        match self.def {
            Def::Pointer(PointerDef { pointee }) => write!(f, "<{}>", pointee()),
            Def::List(ListDef { item }) => write!(f, "<{}>", item()),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({self})")
    }
}

/// The structural kind of a [`Shape`].
#[derive(Clone, Copy, Debug)]
pub enum Def {
    /// A leaf value. Only direct assignment or a converter can produce one.
    Scalar,

    /// An optional or owning pointer, like `Option<T>` or `Box<T>`.
    Pointer(PointerDef),

    /// A growable sequence, like `Vec<T>`.
    List(ListDef),

    /// A record with named fields.
    Struct(StructDef),

    /// The dynamic [`Value`](crate::Value) type, which accepts anything.
    DynamicValue,
}

/// Definition of a pointer type.
#[derive(Clone, Copy)]
pub struct PointerDef {
    /// Shape of the pointed-to type.
    pub pointee: fn() -> &'static Shape,
}

impl fmt::Debug for PointerDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerDef")
            .field("pointee", (self.pointee)())
            .finish()
    }
}

/// Definition of a sequence type.
#[derive(Clone, Copy)]
pub struct ListDef {
    /// Shape of the element type.
    pub item: fn() -> &'static Shape,
}

impl fmt::Debug for ListDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListDef")
            .field("item", (self.item)())
            .finish()
    }
}

/// Definition of a record type.
#[derive(Clone, Copy, Debug)]
pub struct StructDef {
    /// Fields in declaration order.
    pub fields: &'static [Field],
}

/// A single field of a record.
#[derive(Clone, Copy)]
pub struct Field {
    /// Declared name of the field.
    pub name: &'static str,

    /// Shape of the field's type. A function so that recursive types work.
    pub shape: fn() -> &'static Shape,

    /// Raw field annotations as `(annotation, value)` pairs, e.g. `("schema", "id,omitempty")`.
    pub tags: &'static [(&'static str, &'static str)],

    /// Whether the field is `pub`. Only exported fields are ever written.
    pub exported: bool,

    /// Whether the field is marked as embedded, so its fields are promoted into the parent.
    pub embedded: bool,
}

impl Field {
    /// Returns the shape of the field's type.
    #[inline]
    pub fn shape(&self) -> &'static Shape {
        (self.shape)()
    }

    /// Looks up the raw value of the annotation called `name`.
    pub fn tag(&self, name: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("shape", &format_args!("{}", self.shape()))
            .field("tags", &self.tags)
            .field("exported", &self.exported)
            .field("embedded", &self.embedded)
            .finish()
    }
}
