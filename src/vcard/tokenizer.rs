//! Delimiter-splitting primitives shared by every property parser.
//!
//! A vCard property line looks like `[group.]TAG[;PARAM...]:value`. The `;`
//! character separates both parameters in the head and structural fields in
//! the value, so every helper here splits the head from the value on the
//! first `:` before looking at semicolons.

use crate::contact::Components;
use crate::error::FieldError;

/// Separates parameters in the head and structured fields in the value.
pub const TAG_FIELD_SEPARATOR: char = ';';
/// Separates the property head from its value.
pub const KEY_VALUE_SEPARATOR: char = ':';
/// Separates a parameter name from its value (`TYPE=HOME`).
pub const TYPE_ASSIGNMENT_SEPARATOR: char = '=';

/// Type key used when a labelled property carries no type parameter.
pub const UNTYPED: &str = "untyped";

/// Removes an RFC 6350 group prefix (`item1.EMAIL:...` -> `EMAIL:...`).
pub fn strip_group(line: &str) -> &str {
    let head_end = line
        .find([TAG_FIELD_SEPARATOR, KEY_VALUE_SEPARATOR])
        .unwrap_or(line.len());
    match line[..head_end].rfind('.') {
        Some(dot) => &line[dot + 1..],
        None => line,
    }
}

/// Upper-cased tag name of a line, group prefix removed.
///
/// ```
/// use phonepack::vcard::tokenizer::property_name;
///
/// assert_eq!(property_name("tel;TYPE=CELL:+1 555"), "TEL");
/// assert_eq!(property_name("item1.EMAIL:a@b.c"), "EMAIL");
/// ```
pub fn property_name(line: &str) -> String {
    let line = strip_group(line);
    let end = line
        .find([TAG_FIELD_SEPARATOR, KEY_VALUE_SEPARATOR])
        .unwrap_or(line.len());
    line[..end].trim().to_ascii_uppercase()
}

/// Splits a line into its head (tag + parameters) and its value.
///
/// Only the first colon separates; colons inside the value (URLs, URNs)
/// are kept.
pub fn split_head_value(line: &str) -> Result<(&str, &str), FieldError> {
    line.split_once(KEY_VALUE_SEPARATOR)
        .ok_or_else(|| FieldError::MissingSeparator {
            line: line.to_string(),
        })
}

/// Value of a simple `TAG:value` property, verbatim.
pub fn parse_simple_tag(line: &str) -> Result<&str, FieldError> {
    split_head_value(line).map(|(_, value)| value)
}

/// Parameters of a property head, without the tag name.
pub fn head_parameters(head: &str) -> impl Iterator<Item = &str> {
    head.split(TAG_FIELD_SEPARATOR)
        .skip(1)
        .filter(|param| !param.is_empty())
}

/// The type discriminator of a head: the `TYPE=` value, else the first bare
/// parameter.
pub fn type_parameter(head: &str) -> Option<&str> {
    let mut bare = None;
    for param in head_parameters(head) {
        match param.split_once(TYPE_ASSIGNMENT_SEPARATOR) {
            Some((name, value)) if name.eq_ignore_ascii_case("TYPE") && !value.is_empty() => {
                return Some(value);
            }
            Some(_) => {}
            None if bare.is_none() => bare = Some(param),
            None => {}
        }
    }
    bare
}

/// Pairs positional `names` with raw `values`, keeping non-empty pairs.
///
/// With `includes_tag_name`, the leading values up to the first one holding a
/// `:` are the tag name and its parameters; they are dropped and the text after
/// that colon becomes the first value.
///
/// ```
/// use phonepack::vcard::tokenizer::match_subkeys_to_values;
///
/// let names = ["family_name", "given_name", "additional_middle_names"];
/// let values: Vec<&str> = "N:Smith;John;".split(';').collect();
/// let components = match_subkeys_to_values(&names, &values, true).unwrap();
///
/// assert_eq!(components.get("family_name"), Some("Smith"));
/// assert_eq!(components.get("additional_middle_names"), None);
/// ```
pub fn match_subkeys_to_values(
    names: &[&'static str],
    values: &[&str],
    includes_tag_name: bool,
) -> Result<Components, FieldError> {
    let stripped: Vec<&str>;
    let values = if includes_tag_name {
        let first = values
            .iter()
            .position(|value| value.contains(KEY_VALUE_SEPARATOR))
            .ok_or_else(|| FieldError::MissingSeparator {
                line: values.join(";"),
            })?;
        let (_, head_value) = split_head_value(values[first])?;
        stripped = std::iter::once(head_value)
            .chain(values[first + 1..].iter().copied())
            .collect();
        stripped.as_slice()
    } else {
        values
    };

    if names.len() != values.len() {
        return Err(FieldError::SubfieldCount {
            expected: names.len(),
            found: values.len(),
        });
    }

    let mut components = Components::new();
    for (name, value) in names.iter().copied().zip(values) {
        components.push(name, *value);
    }
    Ok(components)
}

/// Matches `TAG[;TYPE=X|;X]:value` lines, returning `(X, value)`.
///
/// Lines without any type parameter are keyed by [`UNTYPED`].
pub fn match_generic_label_and_type(line: &str) -> Result<(String, String), FieldError> {
    let (head, value) = split_head_value(line)?;
    let kind = type_parameter(head).unwrap_or(UNTYPED);
    Ok((kind.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_colons_in_value() {
        let (head, value) = split_head_value("URL:http://x.io:8080/a").unwrap();
        assert_eq!(head, "URL");
        assert_eq!(value, "http://x.io:8080/a");
    }

    #[test]
    fn test_split_without_colon_fails() {
        let err = split_head_value("NOTE just text").unwrap_err();
        assert!(matches!(err, FieldError::MissingSeparator { .. }));
    }

    #[test]
    fn test_property_name() {
        assert_eq!(property_name("FN:John"), "FN");
        assert_eq!(property_name("adr;TYPE=home:;;1 Main"), "ADR");
        assert_eq!(property_name("item2.X-ABLabel:_$!<Other>!$_"), "X-ABLABEL");
        assert_eq!(property_name("NOCOLON"), "NOCOLON");
    }

    #[test]
    fn test_strip_group_ignores_dots_in_value() {
        assert_eq!(strip_group("EMAIL:john.doe@example.com"), "EMAIL:john.doe@example.com");
        assert_eq!(strip_group("item1.TEL;CELL:1"), "TEL;CELL:1");
    }

    #[test]
    fn test_type_parameter_variants() {
        assert_eq!(type_parameter("TEL;TYPE=CELL"), Some("CELL"));
        assert_eq!(type_parameter("TEL;type=work,voice;VALUE=uri"), Some("work,voice"));
        assert_eq!(type_parameter("TEL;HOME;VOICE"), Some("HOME"));
        assert_eq!(type_parameter("TEL;PREF=1;WORK"), Some("WORK"));
        assert_eq!(type_parameter("TEL;PREF=1"), None);
        assert_eq!(type_parameter("TEL"), None);
    }

    #[test]
    fn test_match_subkeys_length_mismatch() {
        let err = match_subkeys_to_values(&["a", "b"], &["x"], false).unwrap_err();
        assert_eq!(
            err,
            FieldError::SubfieldCount {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_match_subkeys_preserves_name_order() {
        let components =
            match_subkeys_to_values(&["a", "b", "c", "d"], &["1", "", "3", "4"], false).unwrap();
        assert_eq!(components.names(), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_match_subkeys_drops_parameters() {
        let values: Vec<&str> = "N;CHARSET=UTF-8:Doe;Jane;;;".split(';').collect();
        let names = [
            "family_name",
            "given_name",
            "additional_middle_names",
            "honorific_prefixes",
            "honorific_suffixes",
        ];
        let components = match_subkeys_to_values(&names, &values, true).unwrap();
        assert_eq!(components.get("family_name"), Some("Doe"));
        assert_eq!(components.get("given_name"), Some("Jane"));
        assert_eq!(components.len(), 2);
    }

    #[test]
    fn test_match_subkeys_requires_tag_colon() {
        let err = match_subkeys_to_values(&["a"], &["N"], true).unwrap_err();
        assert!(matches!(err, FieldError::MissingSeparator { .. }));
    }

    #[test]
    fn test_generic_label_and_type() {
        assert_eq!(
            match_generic_label_and_type("EMAIL;TYPE=INTERNET:a@b.c").unwrap(),
            ("INTERNET".to_string(), "a@b.c".to_string())
        );
        assert_eq!(
            match_generic_label_and_type("TEL;CELL:+1 555 0100").unwrap(),
            ("CELL".to_string(), "+1 555 0100".to_string())
        );
        assert_eq!(
            match_generic_label_and_type("TEL;VALUE=uri;TYPE=home:tel:+1-555-0100").unwrap(),
            ("home".to_string(), "tel:+1-555-0100".to_string())
        );
        assert_eq!(
            match_generic_label_and_type("EMAIL:a@b.c").unwrap(),
            (UNTYPED.to_string(), "a@b.c".to_string())
        );
    }
}
