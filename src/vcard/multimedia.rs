//! Grammar for PHOTO / LOGO / SOUND / KEY properties.
//!
//! After the tag name is stripped, the rest of the line is split on `;` and
//! matched against an ordered rule list. The first rule whose predicate holds
//! extracts the fields:
//!
//! ```text
//! <TAG>;<TYPE>:<URL>                                   TypeUrl
//! <TAG>;ENCODING=BASE64;<TYPE>:<DATA>                  EncodingFirst
//! <TAG>;<TYPE>;ENCODING=BASE64:<DATA>                  EncodingLast
//! <TAG>;TYPE=<TYPE>:<URL>                              AssignedTypeUrl
//! <TAG>;TYPE=<TYPE>;VALUE=URI:<URL>                    AssignedTypeUri
//! <TAG>;TYPE=<TYPE>;ENCODING=b:<DATA>                  AssignedTypeData
//! <TAG>;MEDIATYPE=<MIME>:<URL>                         MediaTypeUrl
//! <TAG>:data:<MIME>;base64,<DATA>                      DataUri
//! ```
//!
//! Anything else is a [`FieldError::Multimedia`].

use crate::contact::{MULTIMEDIA_KEYS, MultimediaValue};
use crate::error::FieldError;

use super::tokenizer::{
    KEY_VALUE_SEPARATOR, TAG_FIELD_SEPARATOR, TYPE_ASSIGNMENT_SEPARATOR, match_subkeys_to_values,
};

/// Tag names whose values may span several physical lines.
pub const ADVANCED_KEYS: [&str; 4] = ["KEY", "LOGO", "PHOTO", "SOUND"];

/// Returns `true` if `tag` is one of the [`ADVANCED_KEYS`].
pub fn is_multimedia_tag(tag: &str) -> bool {
    ADVANCED_KEYS.contains(&tag)
}

/// Which grammar rule decoded a multimedia line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultimediaCase {
    /// `;JPEG:http://...`
    TypeUrl,
    /// `;ENCODING=BASE64;JPEG:<data>`
    EncodingFirst,
    /// `;JPEG;ENCODING=BASE64:<data>`
    EncodingLast,
    /// `;TYPE=JPEG:http://...`
    AssignedTypeUrl,
    /// `;TYPE=JPEG;VALUE=URI:http://...`
    AssignedTypeUri,
    /// `;TYPE=JPEG;ENCODING=b:<data>`
    AssignedTypeData,
    /// `;MEDIATYPE=image/jpeg:http://...`
    MediaTypeUrl,
    /// `:data:image/jpeg;base64,<data>`
    DataUri,
}

#[derive(Debug, Default)]
struct Extracted<'a> {
    tag_type: &'a str,
    tag_data: &'a str,
    tag_url: &'a str,
    tag_mime_type: &'a str,
}

impl<'a> Extracted<'a> {
    /// A type token holding a `/` is a MIME type (`TYPE=image/jpeg`).
    fn typed(token: &'a str) -> Self {
        if token.contains('/') {
            Self {
                tag_mime_type: token,
                ..Self::default()
            }
        } else {
            Self {
                tag_type: token,
                ..Self::default()
            }
        }
    }

    fn with_data(mut self, data: &'a str) -> Self {
        self.tag_data = data;
        self
    }

    fn with_url(mut self, url: &'a str) -> Self {
        self.tag_url = url;
        self
    }
}

struct Rule {
    case: MultimediaCase,
    applies: fn(&[&str]) -> bool,
    extract: for<'a> fn(&[&'a str]) -> Option<Extracted<'a>>,
}

/// Evaluated in order; the first applicable rule wins.
const RULES: &[Rule] = &[
    Rule {
        case: MultimediaCase::TypeUrl,
        applies: |s| {
            s.len() == 2
                && !segment_head(s[1]).contains(TYPE_ASSIGNMENT_SEPARATOR)
                && !starts_with_ignore_case(s[1], "TYPE")
                && !starts_with_ignore_case(s[1], "MEDIATYPE")
                && !starts_with_ignore_case(s[1], "base64")
        },
        extract: |s| {
            let (tag_type, url) = s[1].split_once(KEY_VALUE_SEPARATOR)?;
            Some(Extracted::typed(tag_type).with_url(url))
        },
    },
    Rule {
        case: MultimediaCase::EncodingFirst,
        applies: |s| s.len() == 3 && is_base64_encoding(s[1]),
        extract: |s| {
            let (tag_type, data) = s[2].split_once(KEY_VALUE_SEPARATOR)?;
            Some(Extracted::typed(strip_assignment(tag_type, "TYPE")).with_data(data))
        },
    },
    Rule {
        case: MultimediaCase::EncodingLast,
        applies: |s| {
            s.len() == 3
                && !s[1].contains(TYPE_ASSIGNMENT_SEPARATOR)
                && starts_with_ignore_case(s[2], "ENCODING=")
        },
        extract: |s| {
            let (encoding, data) = s[2].split_once(KEY_VALUE_SEPARATOR)?;
            is_base64_encoding(encoding).then(|| Extracted::typed(s[1]).with_data(data))
        },
    },
    Rule {
        case: MultimediaCase::AssignedTypeUrl,
        applies: |s| s.len() == 2 && starts_with_ignore_case(s[1], "TYPE="),
        extract: |s| {
            let (assignment, url) = s[1].split_once(KEY_VALUE_SEPARATOR)?;
            Some(Extracted::typed(strip_assignment(assignment, "TYPE")).with_url(url))
        },
    },
    Rule {
        case: MultimediaCase::AssignedTypeUri,
        applies: |s| {
            s.len() == 3
                && ((starts_with_ignore_case(s[1], "TYPE=") && is_uri_value(s[2]))
                    || (is_uri_value(s[1]) && starts_with_ignore_case(s[2], "TYPE=")))
        },
        extract: |s| {
            let (last_head, url) = s[2].split_once(KEY_VALUE_SEPARATOR)?;
            let assignment = if is_uri_value(s[1]) { last_head } else { s[1] };
            Some(Extracted::typed(strip_assignment(assignment, "TYPE")).with_url(url))
        },
    },
    Rule {
        case: MultimediaCase::AssignedTypeData,
        applies: |s| s.len() == 3 && starts_with_ignore_case(s[1], "TYPE="),
        extract: |s| {
            let (_, data) = s[2].split_once(KEY_VALUE_SEPARATOR)?;
            Some(Extracted::typed(strip_assignment(s[1], "TYPE")).with_data(data))
        },
    },
    Rule {
        case: MultimediaCase::MediaTypeUrl,
        applies: |s| s.len() == 2 && starts_with_ignore_case(s[1], "MEDIATYPE="),
        extract: |s| {
            let (assignment, url) = s[1].split_once(KEY_VALUE_SEPARATOR)?;
            Some(Extracted {
                tag_mime_type: strip_assignment(assignment, "MEDIATYPE"),
                tag_url: url,
                ..Extracted::default()
            })
        },
    },
    Rule {
        case: MultimediaCase::DataUri,
        applies: |s| s.len() == 2 && starts_with_ignore_case(s[1], "base64"),
        extract: |s| {
            let mime = s[0].rsplit(KEY_VALUE_SEPARATOR).next()?;
            let (_, data) = s[1].split_once(',')?;
            Some(Extracted {
                tag_mime_type: mime,
                tag_data: data,
                ..Extracted::default()
            })
        },
    },
];

fn starts_with_ignore_case(segment: &str, prefix: &str) -> bool {
    segment
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn strip_assignment<'a>(segment: &'a str, name: &str) -> &'a str {
    match segment.split_once(TYPE_ASSIGNMENT_SEPARATOR) {
        Some((param, value)) if param.eq_ignore_ascii_case(name) => value,
        _ => segment,
    }
}

fn is_base64_encoding(segment: &str) -> bool {
    segment.eq_ignore_ascii_case("ENCODING=BASE64") || segment.eq_ignore_ascii_case("ENCODING=B")
}

/// The part of `segment` before its first `:`.
fn segment_head(segment: &str) -> &str {
    segment
        .split_once(KEY_VALUE_SEPARATOR)
        .map_or(segment, |(head, _)| head)
}

fn is_uri_value(segment: &str) -> bool {
    segment_head(segment).eq_ignore_ascii_case("VALUE=URI")
}

/// Returns the rule that decodes `rest` (the line without its tag name).
pub fn classify(rest: &str) -> Option<MultimediaCase> {
    let segments: Vec<&str> = rest.split(TAG_FIELD_SEPARATOR).collect();
    RULES
        .iter()
        .find(|rule| (rule.applies)(&segments))
        .map(|rule| rule.case)
}

/// Decodes a multimedia property; `rest` is the line after the tag name.
///
/// ```
/// use phonepack::vcard::multimedia::parse_multimedia_tag;
///
/// let photo = parse_multimedia_tag(";TYPE=JPEG:http://x/p.jpg").unwrap();
/// assert_eq!(photo.tag_type.as_deref(), Some("JPEG"));
/// assert_eq!(photo.tag_url.as_deref(), Some("http://x/p.jpg"));
/// assert!(photo.tag_data.is_none());
/// ```
pub fn parse_multimedia_tag(rest: &str) -> Result<MultimediaValue, FieldError> {
    let segments: Vec<&str> = rest.split(TAG_FIELD_SEPARATOR).collect();
    let unparsable = || FieldError::Multimedia {
        line: rest.to_string(),
    };

    let rule = RULES
        .iter()
        .find(|rule| (rule.applies)(&segments))
        .ok_or_else(unparsable)?;
    let extracted = (rule.extract)(&segments).ok_or_else(unparsable)?;

    tracing::trace!(case = ?rule.case, "Decoded multimedia property");

    let components = match_subkeys_to_values(
        &MULTIMEDIA_KEYS,
        &[
            extracted.tag_type,
            extracted.tag_data,
            extracted.tag_url,
            extracted.tag_mime_type,
        ],
        false,
    )?;
    Ok(MultimediaValue::from_components(&components))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> MultimediaValue {
        let tag = ADVANCED_KEYS
            .iter()
            .find(|tag| line.starts_with(*tag))
            .expect("multimedia line");
        parse_multimedia_tag(&line[tag.len()..]).unwrap()
    }

    fn case_of(line: &str) -> Option<MultimediaCase> {
        classify(&line["PHOTO".len()..])
    }

    #[test]
    fn test_type_url() {
        let value = parse("PHOTO;JPEG:http://x/p.jpg");
        assert_eq!(value.keys(), vec!["tag_type", "tag_url"]);
        assert_eq!(value.tag_type.as_deref(), Some("JPEG"));
        assert_eq!(value.tag_url.as_deref(), Some("http://x/p.jpg"));
        assert_eq!(case_of("PHOTO;JPEG:http://x/p.jpg"), Some(MultimediaCase::TypeUrl));
    }

    #[test]
    fn test_encoding_first() {
        let value = parse("PHOTO;ENCODING=BASE64;JPEG:QUJD");
        assert_eq!(value.keys(), vec!["tag_type", "tag_data"]);
        assert_eq!(value.tag_type.as_deref(), Some("JPEG"));
        assert_eq!(value.tag_data.as_deref(), Some("QUJD"));
    }

    #[test]
    fn test_encoding_first_with_type_assignment() {
        let value = parse("PHOTO;ENCODING=BASE64;TYPE=JPEG:QUJD");
        assert_eq!(value.tag_type.as_deref(), Some("JPEG"));
        assert_eq!(value.tag_data.as_deref(), Some("QUJD"));
        assert_eq!(
            case_of("PHOTO;ENCODING=BASE64;TYPE=JPEG:QUJD"),
            Some(MultimediaCase::EncodingFirst)
        );
    }

    #[test]
    fn test_encoding_last() {
        let value = parse("PHOTO;JPEG;ENCODING=BASE64:QUJD");
        assert_eq!(value.keys(), vec!["tag_type", "tag_data"]);
        assert_eq!(value.tag_type.as_deref(), Some("JPEG"));
        assert_eq!(value.tag_data.as_deref(), Some("QUJD"));
    }

    #[test]
    fn test_assigned_type_url() {
        let value = parse("LOGO;TYPE=PNG:http://example.com/logo.png");
        assert_eq!(value.keys(), vec!["tag_type", "tag_url"]);
        assert_eq!(value.tag_url.as_deref(), Some("http://example.com/logo.png"));
    }

    #[test]
    fn test_assigned_type_value_uri() {
        let value = parse("PHOTO;TYPE=JPEG;VALUE=URI:http://x/p.jpg");
        assert_eq!(value.keys(), vec!["tag_type", "tag_url"]);
        assert_eq!(value.tag_type.as_deref(), Some("JPEG"));
        assert_eq!(value.tag_url.as_deref(), Some("http://x/p.jpg"));

        let swapped = parse("PHOTO;VALUE=uri;TYPE=GIF:http://x/p.gif");
        assert_eq!(swapped.tag_type.as_deref(), Some("GIF"));
        assert_eq!(swapped.tag_url.as_deref(), Some("http://x/p.gif"));
    }

    #[test]
    fn test_assigned_type_data() {
        let value = parse("PHOTO;TYPE=JPEG;ENCODING=b:QUJD");
        assert_eq!(value.keys(), vec!["tag_type", "tag_data"]);
        assert_eq!(value.tag_data.as_deref(), Some("QUJD"));
        assert_eq!(
            case_of("PHOTO;TYPE=JPEG;ENCODING=b:QUJD"),
            Some(MultimediaCase::AssignedTypeData)
        );
    }

    #[test]
    fn test_assigned_type_before_base64_encoding() {
        let value = parse("PHOTO;TYPE=JPEG;ENCODING=BASE64:QUJD");
        assert_eq!(value.keys(), vec!["tag_type", "tag_data"]);
        assert_eq!(value.tag_type.as_deref(), Some("JPEG"));
        assert_eq!(value.tag_data.as_deref(), Some("QUJD"));
    }

    #[test]
    fn test_type_url_with_query_string() {
        let value = parse("PHOTO;JPEG:http://x/p.php?id=1");
        assert_eq!(value.tag_type.as_deref(), Some("JPEG"));
        assert_eq!(value.tag_url.as_deref(), Some("http://x/p.php?id=1"));
        assert_eq!(case_of("PHOTO;JPEG:http://x/p.php?id=1"), Some(MultimediaCase::TypeUrl));
    }

    #[test]
    fn test_media_type_url() {
        let value = parse("PHOTO;MEDIATYPE=image/jpeg:http://x/p.jpg");
        assert_eq!(value.keys(), vec!["tag_url", "tag_mime_type"]);
        assert_eq!(value.tag_mime_type.as_deref(), Some("image/jpeg"));
        assert_eq!(value.tag_url.as_deref(), Some("http://x/p.jpg"));
    }

    #[test]
    fn test_data_uri() {
        let value = parse("PHOTO:data:image/jpeg;base64,QUJD");
        assert_eq!(value.keys(), vec!["tag_data", "tag_mime_type"]);
        assert_eq!(value.tag_mime_type.as_deref(), Some("image/jpeg"));
        assert_eq!(value.tag_data.as_deref(), Some("QUJD"));
    }

    #[test]
    fn test_mime_type_in_type_parameter() {
        let value = parse("PHOTO;ENCODING=b;TYPE=image/jpeg:QUJD");
        assert_eq!(value.keys(), vec!["tag_data", "tag_mime_type"]);
        assert_eq!(value.extension().as_deref(), Some("jpeg"));
    }

    #[test]
    fn test_key_with_url_port() {
        let value = parse("KEY;PGP:http://keys.example.com:11371/pks/lookup");
        assert_eq!(value.tag_type.as_deref(), Some("PGP"));
        assert_eq!(
            value.tag_url.as_deref(),
            Some("http://keys.example.com:11371/pks/lookup")
        );
    }

    #[test]
    fn test_unknown_shapes_fail() {
        for rest in [
            ":http://x/p.jpg",
            ";A;B;C:D",
            ";ENCODING=QUOTED-PRINTABLE;JPEG:xx",
            ";JPEG",
        ] {
            let err = parse_multimedia_tag(rest).unwrap_err();
            assert!(
                matches!(err, FieldError::Multimedia { ref line } if line == rest),
                "{rest} -> {err:?}"
            );
        }
    }

    #[test]
    fn test_is_multimedia_tag() {
        assert!(is_multimedia_tag("PHOTO"));
        assert!(is_multimedia_tag("KEY"));
        assert!(!is_multimedia_tag("KEYWORDS"));
    }
}
