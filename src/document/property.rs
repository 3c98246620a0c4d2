//! Getypeerde eigenschapswaarden van documentobjecten en features.

use core::fmt;

use serde::Serialize;

use super::object::ObjectId;
use crate::geom::{Placement, Vec3};

/// Waarde van een benoemde eigenschap.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum PropertyValue {
    /// Een reëel getal (ook afstanden en hoeken).
    Number(f64),
    Integer(i64),
    Boolean(bool),
    Text(String),
    Vector(Vec3),
    /// Een lijst vectoren, bv. de punten van een draad.
    VectorList(Vec<Vec3>),
    Placement(Placement),
    /// Verwijzing naar een ander object; `None` is een lege link.
    Link(Option<ObjectId>),
    /// Eén waarde uit een vaste keuzelijst.
    Enumeration(String),
}

impl PropertyValue {
    #[must_use]
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Number(_) => PropertyKind::Number,
            Self::Integer(_) => PropertyKind::Integer,
            Self::Boolean(_) => PropertyKind::Boolean,
            Self::Text(_) => PropertyKind::Text,
            Self::Vector(_) => PropertyKind::Vector,
            Self::VectorList(_) => PropertyKind::VectorList,
            Self::Placement(_) => PropertyKind::Placement,
            Self::Link(_) => PropertyKind::Link,
            Self::Enumeration(_) => PropertyKind::Enumeration,
        }
    }

    /// Verwacht een getal. Gehele getallen worden omgezet.
    pub fn expect_number(&self) -> Result<f64, PropertyError> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Integer(value) => Ok(*value as f64),
            _ => Err(PropertyError::type_mismatch(PropertyKind::Number, self.kind())),
        }
    }

    pub fn expect_integer(&self) -> Result<i64, PropertyError> {
        match self {
            Self::Integer(value) => Ok(*value),
            Self::Number(value) if value.fract() == 0.0 && value.is_finite() => Ok(*value as i64),
            _ => Err(PropertyError::type_mismatch(PropertyKind::Integer, self.kind())),
        }
    }

    pub fn expect_boolean(&self) -> Result<bool, PropertyError> {
        match self {
            Self::Boolean(value) => Ok(*value),
            _ => Err(PropertyError::type_mismatch(PropertyKind::Boolean, self.kind())),
        }
    }

    /// Verwacht tekst; een keuzewaarde wordt als tekst geaccepteerd.
    pub fn expect_text(&self) -> Result<&str, PropertyError> {
        match self {
            Self::Text(value) | Self::Enumeration(value) => Ok(value),
            _ => Err(PropertyError::type_mismatch(PropertyKind::Text, self.kind())),
        }
    }

    pub fn expect_vector(&self) -> Result<Vec3, PropertyError> {
        match self {
            Self::Vector(value) => Ok(*value),
            _ => Err(PropertyError::type_mismatch(PropertyKind::Vector, self.kind())),
        }
    }

    pub fn expect_vector_list(&self) -> Result<&[Vec3], PropertyError> {
        match self {
            Self::VectorList(values) => Ok(values),
            _ => Err(PropertyError::type_mismatch(PropertyKind::VectorList, self.kind())),
        }
    }

    pub fn expect_placement(&self) -> Result<Placement, PropertyError> {
        match self {
            Self::Placement(value) => Ok(*value),
            _ => Err(PropertyError::type_mismatch(PropertyKind::Placement, self.kind())),
        }
    }

    pub fn expect_link(&self) -> Result<Option<ObjectId>, PropertyError> {
        match self {
            Self::Link(value) => Ok(*value),
            _ => Err(PropertyError::type_mismatch(PropertyKind::Link, self.kind())),
        }
    }

    /// Verwacht een keuzewaarde; gewone tekst wordt ook aanvaard.
    pub fn expect_enumeration(&self) -> Result<&str, PropertyError> {
        match self {
            Self::Enumeration(value) | Self::Text(value) => Ok(value),
            _ => Err(PropertyError::type_mismatch(PropertyKind::Enumeration, self.kind())),
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Vec3> for PropertyValue {
    fn from(value: Vec3) -> Self {
        Self::Vector(value)
    }
}

impl From<Option<ObjectId>> for PropertyValue {
    fn from(value: Option<ObjectId>) -> Self {
        Self::Link(value)
    }
}

/// Beschrijft het soort `PropertyValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PropertyKind {
    Number,
    Integer,
    Boolean,
    Text,
    Vector,
    VectorList,
    Placement,
    Link,
    Enumeration,
}

impl PropertyKind {
    /// Of een waarde van soort `found` in een eigenschap van dit soort past.
    #[must_use]
    pub fn accepts(self, found: Self) -> bool {
        self == found
            || matches!(
                (self, found),
                (Self::Number, Self::Integer)
                    | (Self::Integer, Self::Number)
                    | (Self::Enumeration, Self::Text)
                    | (Self::Text, Self::Enumeration)
            )
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Number => "Number",
            Self::Integer => "Integer",
            Self::Boolean => "Boolean",
            Self::Text => "Text",
            Self::Vector => "Vector",
            Self::VectorList => "VectorList",
            Self::Placement => "Placement",
            Self::Link => "Link",
            Self::Enumeration => "Enumeration",
        };
        f.write_str(name)
    }
}

/// Typefout bij het lezen van een `PropertyValue`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyError {
    expected: PropertyKind,
    found: PropertyKind,
}

impl PropertyError {
    #[must_use]
    pub fn type_mismatch(expected: PropertyKind, found: PropertyKind) -> Self {
        Self { expected, found }
    }

    #[must_use]
    pub fn expected(&self) -> PropertyKind {
        self.expected
    }

    #[must_use]
    pub fn found(&self) -> PropertyKind {
        self.found
    }
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "verwachtte type `{}` maar kreeg `{}`",
            self.expected, self.found
        )
    }
}

impl std::error::Error for PropertyError {}

/// Statische beschrijving van een eigenschap: naam, type, groep en vlaggen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PropertySpec {
    pub name: &'static str,
    pub kind: PropertyKind,
    pub group: &'static str,
    pub doc: &'static str,
    pub read_only: bool,
    pub hidden: bool,
    /// Toegelaten waarden voor een `Enumeration`.
    pub choices: &'static [&'static str],
}

impl PropertySpec {
    #[must_use]
    pub const fn new(
        name: &'static str,
        kind: PropertyKind,
        group: &'static str,
        doc: &'static str,
    ) -> Self {
        Self {
            name,
            kind,
            group,
            doc,
            read_only: false,
            hidden: false,
            choices: &[],
        }
    }

    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    #[must_use]
    pub const fn choices(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = choices;
        self
    }
}

/// Zoekt een eigenschap op naam in een tabel.
#[must_use]
pub fn find_spec<'a>(specs: &'a [PropertySpec], name: &str) -> Option<&'a PropertySpec> {
    specs.iter().find(|spec| spec.name == name)
}

#[cfg(test)]
mod tests {
    use super::{PropertyKind, PropertySpec, PropertyValue, find_spec};

    #[test]
    fn expect_number_accepts_integer() {
        assert_eq!(PropertyValue::Integer(3).expect_number().unwrap(), 3.0);
        assert_eq!(PropertyValue::Number(2.5).expect_number().unwrap(), 2.5);
    }

    #[test]
    fn expect_boolean_rejects_wrong_type() {
        let err = PropertyValue::Text("ja".into()).expect_boolean().unwrap_err();
        assert_eq!(err.expected(), PropertyKind::Boolean);
        assert_eq!(err.found(), PropertyKind::Text);
        assert_eq!(err.to_string(), "verwachtte type `Boolean` maar kreeg `Text`");
    }

    #[test]
    fn integer_from_whole_number_only() {
        assert_eq!(PropertyValue::Number(4.0).expect_integer().unwrap(), 4);
        assert!(PropertyValue::Number(4.5).expect_integer().is_err());
    }

    #[test]
    fn spec_builder_sets_flags() {
        const SPECS: &[PropertySpec] = &[
            PropertySpec::new("Scale", PropertyKind::Number, "Profile", "Schaalfactor"),
            PropertySpec::new("Points", PropertyKind::VectorList, "Profile", "Punten").read_only(),
        ];
        let points = find_spec(SPECS, "Points").unwrap();
        assert!(points.read_only);
        assert!(!points.hidden);
        assert!(find_spec(SPECS, "Onbekend").is_none());
        assert!(PropertyKind::Number.accepts(PropertyKind::Integer));
        assert!(!PropertyKind::Link.accepts(PropertyKind::Number));
    }
}
