//! Parsers voor airfoilbestanden, documenten en configuratie.

pub mod airfoil;
pub mod document_xml;

use std::num::ParseFloatError;

use thiserror::Error;

pub use airfoil::{parse_airfoil, read_airfoil};
pub use document_xml::{load_document, parse_document};

/// Result type voor parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Beschrijft fouten tijdens het parsen.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Het XML-document kon niet gede-serialiseerd worden.
    #[error("XML parsefout: {0}")]
    Xml(#[from] quick_xml::DeError),
    /// Fout tijdens het converteren van numerieke waarden.
    #[error("ongeldige numerieke waarde: {0}")]
    Number(#[from] ParseFloatError),
    /// Het regelpatroon kon niet gecompileerd worden.
    #[error("ongeldig patroon: {0}")]
    Regex(#[from] regex::Error),
    /// Een bestand kon niet gelezen worden.
    #[error("kan `{path}` niet lezen: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Het document bevat een onbekend objecttype.
    #[error("onbekend objecttype `{kind}`{hint}")]
    UnknownKind { kind: String, hint: String },
    /// Een eigenschapswaarde past niet bij het gedeclareerde type.
    #[error("ongeldige waarde `{value}` voor eigenschap `{property}` van `{object}`")]
    InvalidValue {
        object: String,
        property: String,
        value: String,
    },
    /// Een eigenschap of link kon niet toegepast worden.
    #[error("object `{object}`: {message}")]
    Document { object: String, message: String },
}
