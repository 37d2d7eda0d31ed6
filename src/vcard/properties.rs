//! One parsing rule per vCard property family.
//!
//! [`parse_vcard_line`] identifies the tag name of a single logical line and
//! dispatches to the matching parser. Every parser returns the structured
//! [`PropertyValue`] for its family.

use crate::contact::{Components, PropertyValue};
use crate::error::FieldError;

use super::multimedia::{is_multimedia_tag, parse_multimedia_tag};
use super::tokenizer::{
    KEY_VALUE_SEPARATOR, TAG_FIELD_SEPARATOR, TYPE_ASSIGNMENT_SEPARATOR,
    match_generic_label_and_type, match_subkeys_to_values, parse_simple_tag, property_name,
    split_head_value, strip_group,
};

/// Properties declared as a plain key-value pair:
///
/// ```text
/// ANNIVERSARY:19901021
/// FN:Dr. John Doe
/// GENDER:F
/// ```
///
/// No key may be a prefix of another key in this set.
pub const SIMPLE_KEYS: &[&str] = &[
    "AGENT",
    "ANNIVERSARY",
    "BDAY",
    "CALADRURI",
    "CALURI",
    "CLASS",
    "FBURL",
    "FN",
    "GENDER",
    "KIND",
    "LANG",
    "MAILER",
    "NICKNAME",
    "NOTE",
    "PRODID",
    "PROFILE",
    "REV",
    "ROLE",
    "SORT-STRING",
    "SOURCE",
    "TITLE",
    "TZ",
    "URL",
    "VERSION",
    "XML",
];

/// Properties that need structural processing.
pub const INTERMEDIATE_KEYS: &[&str] = &[
    "ADR",
    "CATEGORIES",
    "CLIENTPIDMAP",
    "EMAIL",
    "GEO",
    "IMPP",
    "LABEL",
    "MEMBER",
    "N",
    "ORG",
    "RELATED",
    "TEL",
    "UID",
];

/// Registered properties that have no parser yet.
pub const UNSUPPORTED_KEYS: &[&str] = &[
    "BIRTHPLACE",
    "CONTACT-URI",
    "CREATED",
    "DEATHDATE",
    "DEATHPLACE",
    "EXPERTISE",
    "GRAMGENDER",
    "HOBBY",
    "INTEREST",
    "LANGUAGE",
    "NAME",
    "ORG-DIRECTORY",
    "PRONOUNS",
    "SOCIALPROFILE",
];

const NAME_KEYS: [&str; 5] = [
    "family_name",
    "given_name",
    "additional_middle_names",
    "honorific_prefixes",
    "honorific_suffixes",
];

// https://www.itu.int/ITU-T/formal-language/itu-t/x/x520/2012/SelectedAttributeTypes.html
const ORGANIZATION_KEYS: [&str; 3] = [
    "organization_name",
    "collective_organization_name",
    "organizational_unit_name",
];

/// A parsed property: its tag name and structured value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedProperty {
    pub tag: String,
    pub value: PropertyValue,
}

/// Parses one logical property line.
///
/// ```
/// use phonepack::contact::PropertyValue;
/// use phonepack::vcard::properties::parse_vcard_line;
///
/// let parsed = parse_vcard_line("TEL;TYPE=CELL:+1 555 0100").unwrap();
/// assert_eq!(parsed.tag, "TEL");
/// assert_eq!(parsed.value, PropertyValue::typed("CELL", "+1 555 0100"));
/// ```
pub fn parse_vcard_line(line: &str) -> Result<ParsedProperty, FieldError> {
    let line = strip_group(line.trim());
    let tag = property_name(line);

    tracing::trace!(%tag, "Parsing property line");

    let value = if SIMPLE_KEYS.contains(&tag.as_str()) {
        PropertyValue::Text(parse_simple_tag(line)?.to_string())
    } else if is_multimedia_tag(&tag) {
        let head_end = line
            .find([TAG_FIELD_SEPARATOR, KEY_VALUE_SEPARATOR])
            .unwrap_or(line.len());
        parse_multimedia_tag(&line[head_end..]).map(PropertyValue::Media)?
    } else {
        match tag.as_str() {
            "ADR" => parse_address_tag(line)?,
            "CATEGORIES" => parse_categories_tag(line)?,
            "CLIENTPIDMAP" => parse_clientpidmap_tag(line)?,
            "EMAIL" => parse_email_tag(line)?,
            "GEO" => parse_geo_tag(line)?,
            "IMPP" => parse_instant_messenger_handle_tag(line)?,
            "LABEL" => parse_mailing_label_tag(line)?,
            "MEMBER" => parse_member_tag(line)?,
            "N" => parse_name_tag(line)?,
            "ORG" => parse_organization_tag(line)?,
            "RELATED" => parse_related_tag(line)?,
            "TEL" => parse_telephone_tag(line)?,
            "UID" => parse_uid_tag(line)?,
            other if is_unsupported_tag(other) => {
                return Err(FieldError::Unsupported { tag });
            }
            _ => return Err(FieldError::UnknownProperty { tag }),
        }
    };

    Ok(ParsedProperty { tag, value })
}

/// Extension (`X-`) and registered-but-unparsed properties.
pub fn is_unsupported_tag(tag: &str) -> bool {
    tag.starts_with("X-") || UNSUPPORTED_KEYS.contains(&tag)
}

/// Reconstructs a free-text address from its structured components.
///
/// The value after the first `:` holds the components; non-empty ones are
/// joined with spaces, so missing street/city/etc. components are tolerated.
/// The type comes from the segment after the tag name, either `TYPE=X` or a
/// bare `X`.
pub fn parse_address_tag(line: &str) -> Result<PropertyValue, FieldError> {
    let (head, value) = split_head_value(line)?;
    let address = value
        .split(TAG_FIELD_SEPARATOR)
        .map(str::trim)
        .filter(|component| !component.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let kind = head
        .split(TAG_FIELD_SEPARATOR)
        .nth(1)
        .map(|segment| match segment.split_once(TYPE_ASSIGNMENT_SEPARATOR) {
            Some((name, value)) if name.eq_ignore_ascii_case("TYPE") => value,
            _ => segment,
        })
        .filter(|kind| !kind.is_empty())
        .unwrap_or(super::tokenizer::UNTYPED);

    Ok(PropertyValue::typed(kind, address))
}

/// `CATEGORIES:swimmer,biker` -> `["biker", "swimmer"]`.
pub fn parse_categories_tag(line: &str) -> Result<PropertyValue, FieldError> {
    let (_, value) = split_head_value(line)?;
    let mut categories: Vec<String> = value
        .split(',')
        .filter(|category| !category.is_empty())
        .map(str::to_string)
        .collect();
    categories.sort();
    Ok(PropertyValue::List(categories))
}

/// `CLIENTPIDMAP:1;urn:uuid:...` -> `{"1": "urn:uuid:..."}`.
pub fn parse_clientpidmap_tag(line: &str) -> Result<PropertyValue, FieldError> {
    let segments: Vec<&str> = line.split(TAG_FIELD_SEPARATOR).collect();
    let [head, urn] = segments.as_slice() else {
        return Err(FieldError::malformed("CLIENTPIDMAP", line));
    };
    let (_, pid_source_identifier) = split_head_value(head)?;
    Ok(PropertyValue::typed(pid_source_identifier, *urn))
}

pub fn parse_email_tag(line: &str) -> Result<PropertyValue, FieldError> {
    generic_label(line)
}

/// Handles both `GEO:lat;lon` (2.1/3.0) and `GEO:geo:lat,lon` (4.0).
pub fn parse_geo_tag(line: &str) -> Result<PropertyValue, FieldError> {
    let segments: Vec<&str> = line.split(KEY_VALUE_SEPARATOR).collect();

    let coordinates = match segments.as_slice() {
        [_, legacy] => legacy.split_once(TAG_FIELD_SEPARATOR),
        [_, _, modern] => {
            // Drop uncertainty and other URI parameters: `geo:1,2;u=10`
            let modern = modern.split(TAG_FIELD_SEPARATOR).next().unwrap_or_default();
            modern.split_once(',')
        }
        _ => None,
    };
    let (latitude, longitude) = coordinates.ok_or_else(|| FieldError::malformed("GEO", line))?;

    let mut components = Components::new();
    components.push("latitude", latitude.trim());
    components.push("longitude", longitude.trim());
    Ok(PropertyValue::Components(components))
}

/// `IMPP:aim:johndoe@aol.com` -> `{"type": "aim", "handle": "johndoe@aol.com"}`.
pub fn parse_instant_messenger_handle_tag(line: &str) -> Result<PropertyValue, FieldError> {
    let segments: Vec<&str> = line.split(KEY_VALUE_SEPARATOR).collect();
    let [_, impp_type, impp_handle] = segments.as_slice() else {
        return Err(FieldError::malformed("IMPP", line));
    };

    let mut components = Components::new();
    components.push("type", *impp_type);
    components.push("handle", *impp_handle);
    Ok(PropertyValue::Components(components))
}

pub fn parse_mailing_label_tag(line: &str) -> Result<PropertyValue, FieldError> {
    generic_label(line)
}

/// `MEMBER:urn:uuid:03a0...` -> `{"urn": "uuid:03a0..."}`.
pub fn parse_member_tag(line: &str) -> Result<PropertyValue, FieldError> {
    let mut tokens = line.splitn(3, KEY_VALUE_SEPARATOR);
    let (Some(_), Some(member_id_type), Some(member_id_value)) =
        (tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(FieldError::malformed("MEMBER", line));
    };
    Ok(PropertyValue::typed(member_id_type, member_id_value))
}

/// `N:Smith;John;;;` -> `{"family_name": "Smith", "given_name": "John"}`.
pub fn parse_name_tag(line: &str) -> Result<PropertyValue, FieldError> {
    let values: Vec<&str> = line.split(TAG_FIELD_SEPARATOR).collect();
    match_subkeys_to_values(&NAME_KEYS, &values, true).map(PropertyValue::Components)
}

/// Either a bare organization name or up to three positional sub-fields.
pub fn parse_organization_tag(line: &str) -> Result<PropertyValue, FieldError> {
    let (_, value) = split_head_value(line)?;
    if !line.contains(TAG_FIELD_SEPARATOR) {
        return Ok(PropertyValue::Text(value.to_string()));
    }

    let mut values: Vec<&str> = line.split(TAG_FIELD_SEPARATOR).collect();
    let leading = values
        .iter()
        .position(|segment| segment.contains(KEY_VALUE_SEPARATOR))
        .unwrap_or_default();
    let sub_fields = values.len() - leading;
    if sub_fields < ORGANIZATION_KEYS.len() {
        values.resize(leading + ORGANIZATION_KEYS.len(), "");
    }

    match_subkeys_to_values(&ORGANIZATION_KEYS, &values, true).map(PropertyValue::Components)
}

pub fn parse_related_tag(line: &str) -> Result<PropertyValue, FieldError> {
    generic_label(line)
}

pub fn parse_telephone_tag(line: &str) -> Result<PropertyValue, FieldError> {
    generic_label(line)
}

/// `UID:urn:uuid:f81d...` -> `{"urn": "uuid:f81d..."}`; a plain `UID:abc`
/// stays scalar.
pub fn parse_uid_tag(line: &str) -> Result<PropertyValue, FieldError> {
    let (_, value) = split_head_value(line)?;
    Ok(match value.split_once(KEY_VALUE_SEPARATOR) {
        Some((uid_type, uid_data)) => PropertyValue::typed(uid_type, uid_data),
        None => PropertyValue::Text(value.to_string()),
    })
}

fn generic_label(line: &str) -> Result<PropertyValue, FieldError> {
    let (kind, value) = match_generic_label_and_type(line)?;
    Ok(PropertyValue::Typed { kind, value })
}
