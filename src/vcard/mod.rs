//! vCard (`.vcf`) parsing.
//!
//! Parsing happens in three layers:
//!
//! - [`tokenizer`] - splitting a property line into head, parameters and value
//! - [`properties`] and [`multimedia`] - one grammar per property family
//! - [`assembler`] - the `BEGIN:VCARD` / `END:VCARD` state machine
//!
//! # Example
//!
//! ```rust
//! use phonepack::vcard::VcardAssembler;
//!
//! let input = "\
//! BEGIN:VCARD
//! VERSION:3.0
//! N:Doe;Jane;;;
//! TEL;TYPE=CELL:+1 555 0100
//! CATEGORIES:work,friends
//! END:VCARD
//! ";
//!
//! let assembly = VcardAssembler::new().assemble(input)?;
//! let jane = &assembly.records[0];
//!
//! assert_eq!(jane.display_name().as_deref(), Some("DoeJane"));
//! assert!(jane.contains("TEL"));
//! # Ok::<(), phonepack::PhonepackError>(())
//! ```

pub mod assembler;
pub mod multimedia;
pub mod properties;
pub mod tokenizer;

pub use assembler::{Assembly, LineError, SkippedProperty, VcardAssembler};
pub use multimedia::{MultimediaCase, parse_multimedia_tag};
pub use properties::{ParsedProperty, parse_vcard_line};
