//! Per-type field metadata, built once and shared.

use core::any::TypeId;
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{DefaultTagParser, Field, Shape, TagParser, debug, trace};

/// Annotation holding the source key when none is configured.
pub const DEFAULT_KEY_TAG: &str = "schema";

/// Annotation holding the default literal when none is configured.
pub const DEFAULT_VALUE_TAG: &str = "default";

/// Key annotation name meaning "use declared field names, ignore annotations".
pub const FIELD_NAMES: &str = "-";

/// How one record field is filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Name of the field as declared.
    pub declared_name: &'static str,

    /// Key to look up in the source map. Never empty.
    pub source_key: String,

    /// Index of the field in the record's field table.
    pub position: usize,

    /// Shape of the field's type.
    pub shape: &'static Shape,

    /// Whether the field is embedded.
    pub embedded: bool,

    /// Raw default literal, converted at decode time when the key is absent.
    pub default: Option<&'static str>,
}

/// Ordered descriptors for the decodable fields of one record type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDescriptor {
    fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    /// Fields in declaration order. Skipped and non-`pub` fields are absent.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks up a field by declared name.
    pub fn field(&self, declared_name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.declared_name == declared_name)
    }
}

/// Cache of [`RecordDescriptor`]s keyed by type.
///
/// Reads take a shared lock. A miss builds the descriptor without holding any
/// lock, then stores it only if no other thread got there first, so every
/// caller ends up with the same `Arc`.
pub struct MetadataCache {
    key_tag: String,
    default_tag: String,
    parser: Box<dyn TagParser>,
    descriptors: RwLock<HashMap<TypeId, Arc<RecordDescriptor>>>,
}

impl MetadataCache {
    /// Creates an empty cache reading source keys from `key_tag` and defaults
    /// from `default_tag`. Empty names fall back to `schema` and `default`.
    pub fn new(key_tag: impl Into<String>, default_tag: impl Into<String>) -> Self {
        let key_tag = key_tag.into();
        let default_tag = default_tag.into();
        Self {
            key_tag: if key_tag.is_empty() {
                DEFAULT_KEY_TAG.to_owned()
            } else {
                key_tag
            },
            default_tag: if default_tag.is_empty() {
                DEFAULT_VALUE_TAG.to_owned()
            } else {
                default_tag
            },
            parser: Box::new(DefaultTagParser),
            descriptors: RwLock::new(HashMap::new()),
        }
    }

    /// Replaces the key annotation parser.
    pub fn with_parser(mut self, parser: impl TagParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// Name of the key annotation.
    pub fn key_tag(&self) -> &str {
        &self.key_tag
    }

    /// Name of the default annotation.
    pub fn default_tag(&self) -> &str {
        &self.default_tag
    }

    /// Number of record types cached so far.
    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    /// Returns true if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.descriptors.read().is_empty()
    }

    /// Returns the descriptor for `shape`, building it on first use.
    ///
    /// Non-record shapes get an empty descriptor.
    pub fn descriptor(&self, shape: &'static Shape) -> Arc<RecordDescriptor> {
        let id = shape.id.get();
        if let Some(descriptor) = self.descriptors.read().get(&id) {
            return Arc::clone(descriptor);
        }

        let built = Arc::new(self.build(shape));
        debug!(
            "built descriptor for {shape}: {} decodable fields",
            built.fields.len()
        );

        let mut descriptors = self.descriptors.write();
        Arc::clone(descriptors.entry(id).or_insert(built))
    }

    fn build(&self, shape: &'static Shape) -> RecordDescriptor {
        let fields = shape
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, field)| field.exported)
            .filter_map(|(position, field)| {
                let source_key = self.field_key(field)?;
                Some(FieldDescriptor {
                    declared_name: field.name,
                    source_key,
                    position,
                    shape: field.shape(),
                    embedded: field.embedded,
                    default: field.tag(&self.default_tag),
                })
            })
            .collect();
        RecordDescriptor { fields }
    }

    fn field_key(&self, field: &Field) -> Option<String> {
        if self.key_tag == FIELD_NAMES {
            return Some(field.name.to_owned());
        }
        let key = self.source_key(field.tag(&self.key_tag), field.name);
        if key.is_none() {
            trace!("skipping field {}", field.name);
        }
        key
    }

    /// Resolves the source key for a field from its raw key annotation.
    ///
    /// `None` means the field is skipped.
    pub fn source_key(&self, raw: Option<&str>, declared_name: &str) -> Option<String> {
        match raw {
            None | Some("") => Some(declared_name.to_owned()),
            Some("-") => None,
            Some(raw) => match self.parser.parse(raw) {
                Ok(tag) if tag.name == "-" => None,
                Ok(tag) if !tag.name.is_empty() => Some(tag.name),
                Ok(_) => Some(declared_name.to_owned()),
                Err(_err) => {
                    trace!("unparsable key annotation {raw:?}: {_err}");
                    Some(declared_name.to_owned())
                }
            },
        }
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_TAG, DEFAULT_VALUE_TAG)
    }
}

impl fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataCache")
            .field("key_tag", &self.key_tag)
            .field("default_tag", &self.default_tag)
            .field("parser", &self.parser)
            .field("cached", &self.len())
            .finish()
    }
}
