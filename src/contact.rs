//! Contact record types produced by the vCard assembler.
//!
//! A [`ContactRecord`] is an ordered mapping from property tag (`N`, `TEL`,
//! `PHOTO`, ...) to a [`PropertyValue`]. Each property family has its own value
//! shape, so a telephone number can never be confused with a name:
//!
//! | Family | Variant | Example JSON |
//! |--------|---------|--------------|
//! | Simple (`FN`, `NOTE`, ...) | [`PropertyValue::Text`] | `"Dr. John Doe"` |
//! | `CATEGORIES` | [`PropertyValue::List`] | `["biker", "swimmer"]` |
//! | `TEL`, `EMAIL`, `ADR`, ... | [`PropertyValue::Typed`] | `{"CELL": "+1 555 0100"}` |
//! | `N`, `ORG`, `GEO`, `IMPP` | [`PropertyValue::Components`] | `{"family_name": "Doe"}` |
//! | `PHOTO`, `LOGO`, ... | [`PropertyValue::Media`] | `{"tag_type": "JPEG", "tag_url": "..."}` |
//!
//! # Example
//!
//! ```
//! use phonepack::contact::{ContactRecord, PropertyValue};
//!
//! let mut record = ContactRecord::new();
//! record.insert("FN", PropertyValue::Text("Jane Doe".into()));
//! record.insert("TEL", PropertyValue::typed("CELL", "+1 555 0100"));
//!
//! assert_eq!(record.len(), 2);
//! assert_eq!(record.text("FN"), Some("Jane Doe"));
//! ```

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Key for an explicit short type token (`JPEG`, `PGP`, ...).
pub const TAG_TYPE_KEY: &str = "tag_type";
/// Key for an inline base64 payload.
pub const TAG_DATA_KEY: &str = "tag_data";
/// Key for an external resource reference.
pub const TAG_URL_KEY: &str = "tag_url";
/// Key for a MIME type given instead of a short type token.
pub const TAG_MIME_TYPE_KEY: &str = "tag_mime_type";

/// The four-key multimedia schema, in positional order.
pub const MULTIMEDIA_KEYS: [&str; 4] = [TAG_TYPE_KEY, TAG_DATA_KEY, TAG_URL_KEY, TAG_MIME_TYPE_KEY];

/// Fixed-arity, positionally decoded sub-fields.
///
/// Only non-empty sub-fields are stored; their order follows the schema
/// they were matched against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Components {
    fields: Vec<(&'static str, String)>,
}

impl Components {
    /// Creates an empty component list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sub-field; empty values are dropped.
    pub fn push(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.fields.push((name, value));
        }
    }

    /// Returns the value of the named sub-field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(key, value)| (*key, value.as_str()))
    }

    /// Returns the sub-field names in schema order.
    pub fn names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(key, _)| *key).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Concatenates every value, e.g. `KennedyJohnF` for a name.
    pub fn concatenated(&self) -> String {
        self.fields.iter().map(|(_, value)| value.as_str()).collect()
    }
}

impl Serialize for Components {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Decoded PHOTO / LOGO / SOUND / KEY property.
///
/// A field is `Some` iff its value is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct MultimediaValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_mime_type: Option<String>,
}

impl MultimediaValue {
    /// Builds a value from components matched against [`MULTIMEDIA_KEYS`].
    pub fn from_components(components: &Components) -> Self {
        let owned = |key: &str| components.get(key).map(str::to_string);
        Self {
            tag_type: owned(TAG_TYPE_KEY),
            tag_data: owned(TAG_DATA_KEY),
            tag_url: owned(TAG_URL_KEY),
            tag_mime_type: owned(TAG_MIME_TYPE_KEY),
        }
    }

    /// Returns the keys that are present, in schema order.
    pub fn keys(&self) -> Vec<&'static str> {
        [
            (TAG_TYPE_KEY, &self.tag_type),
            (TAG_DATA_KEY, &self.tag_data),
            (TAG_URL_KEY, &self.tag_url),
            (TAG_MIME_TYPE_KEY, &self.tag_mime_type),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_some())
        .map(|(key, _)| key)
        .collect()
    }

    /// File extension for the asset: the short type token (lower-cased),
    /// else the subtype half of the MIME type.
    pub fn extension(&self) -> Option<String> {
        if let Some(tag_type) = &self.tag_type {
            return Some(tag_type.to_ascii_lowercase());
        }
        self.tag_mime_type
            .as_deref()
            .and_then(|mime| mime.split_once('/'))
            .map(|(_, subtype)| subtype.to_ascii_lowercase())
            .filter(|subtype| !subtype.is_empty())
    }
}

/// Value of a single contact property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// A scalar string (simple properties, single-valued `ORG`, plain `UID`).
    Text(String),
    /// A sorted list (`CATEGORIES`).
    List(Vec<String>),
    /// A single value keyed by its type discriminator (`{"HOME": "..."}`).
    Typed { kind: String, value: String },
    /// Positional sub-fields (`N`, `ORG`, `GEO`, `IMPP`).
    Components(Components),
    /// A multimedia property.
    Media(MultimediaValue),
}

impl PropertyValue {
    /// Shorthand for [`PropertyValue::Typed`].
    pub fn typed(kind: impl Into<String>, value: impl Into<String>) -> Self {
        PropertyValue::Typed {
            kind: kind.into(),
            value: value.into(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_components(&self) -> Option<&Components> {
        match self {
            PropertyValue::Components(components) => Some(components),
            _ => None,
        }
    }

    pub fn as_media(&self) -> Option<&MultimediaValue> {
        match self {
            PropertyValue::Media(media) => Some(media),
            _ => None,
        }
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropertyValue::Text(text) => serializer.serialize_str(text),
            PropertyValue::List(items) => items.serialize(serializer),
            PropertyValue::Typed { kind, value } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(kind, value)?;
                map.end()
            }
            PropertyValue::Components(components) => components.serialize(serializer),
            PropertyValue::Media(media) => media.serialize(serializer),
        }
    }
}

/// One assembled contact: ordered `tag -> value` pairs, one value per tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactRecord {
    properties: Vec<(String, PropertyValue)>,
}

impl ContactRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `tag` to `value`, overwriting (in place) any earlier value.
    ///
    /// Returns the previous value, if any.
    pub fn insert(&mut self, tag: impl Into<String>, value: PropertyValue) -> Option<PropertyValue> {
        let tag = tag.into();
        match self.properties.iter_mut().find(|(key, _)| *key == tag) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.properties.push((tag, value));
                None
            }
        }
    }

    /// Sets `tag` only if it is not present yet. Returns `true` if inserted.
    pub fn insert_if_absent(&mut self, tag: impl Into<String>, value: PropertyValue) -> bool {
        let tag = tag.into();
        if self.contains(&tag) {
            return false;
        }
        self.properties.push((tag, value));
        true
    }

    pub fn get(&self, tag: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(key, _)| key == tag)
            .map(|(_, value)| value)
    }

    /// Returns the scalar text of `tag`, if it holds one.
    pub fn text(&self, tag: &str) -> Option<&str> {
        self.get(tag).and_then(PropertyValue::as_text)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.get(tag).is_some()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Iterates over `(tag, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Tags in insertion order.
    pub fn tags(&self) -> Vec<&str> {
        self.properties.iter().map(|(key, _)| key.as_str()).collect()
    }

    /// Iterates over the multimedia properties of this record.
    pub fn multimedia(&self) -> impl Iterator<Item = (&str, &MultimediaValue)> {
        self.iter()
            .filter_map(|(tag, value)| value.as_media().map(|media| (tag, media)))
    }

    /// Returns `true` if any property is a multimedia property.
    pub fn has_multimedia(&self) -> bool {
        self.multimedia().next().is_some()
    }

    /// Identifying name: the concatenated `N` components, else `FN`.
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self
            .get("N")
            .and_then(PropertyValue::as_components)
            .map(Components::concatenated)
            .filter(|name| !name.is_empty())
        {
            return Some(name);
        }
        self.text("FN")
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

impl Serialize for ContactRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.properties.len()))?;
        for (tag, value) in &self.properties {
            map.serialize_entry(tag, value)?;
        }
        map.end()
    }
}
