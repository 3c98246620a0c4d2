//! Parametrische features en hun gemeenschappelijke infrastructuur.
//!
//! Elke feature implementeert [`Feature`]. Het document bewaart ze als
//! [`FeatureKind`], een gesloten enum waarover via `match` gedispatcht wordt.

use serde::Serialize;

use crate::document::{
    Document, DocumentError, ObjectData, ObjectId, PropertyError, PropertySpec, PropertyValue,
    property::find_spec,
};
use crate::geom::{Placement, Point3, Polyline, ShapeError};
use crate::parse::ParseError;

pub mod commands;
pub mod coord_sys;
pub mod cut_wire;
pub mod leading_edge;
pub mod profile;
pub mod ribs;
pub mod rod;
pub mod section;
pub mod wing;
pub mod wrap;

pub use commands::{
    CommandError, create_cut_wire, create_leading_edge, create_ribs, create_rod, create_section,
    create_wing, create_wrap_leading_edge,
};
pub use coord_sys::{CenterType, CoordSys, FrameDirection};
pub use cut_wire::{CutRange, CutWire};
pub use leading_edge::LeadingEdge;
pub use profile::Profile;
pub use ribs::Ribs;
pub use rod::Rod;
pub use section::Section;
pub use wing::Wing;
pub use wrap::WrapLeadingEdge;

/// Fouttype voor feature-bewerkingen.
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("onbekende eigenschap `{0}`")]
    UnknownProperty(String),
    #[error("eigenschap `{0}` is alleen-lezen")]
    ReadOnly(String),
    #[error(transparent)]
    Property(#[from] PropertyError),
    #[error("ongeldige waarde `{value}` voor eigenschap `{property}`")]
    InvalidValue { property: String, value: String },
    #[error("kan `{path}` niet lezen: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("object {0} ontbreekt")]
    MissingObject(ObjectId),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("geometriefout: {0}")]
    Shape(#[from] ShapeError),
    #[error("documentfout: {0}")]
    Document(#[source] Box<DocumentError>),
}

impl FeatureError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub(crate) fn invalid(property: &str, value: impl ToString) -> Self {
        Self::InvalidValue {
            property: property.to_owned(),
            value: value.to_string(),
        }
    }
}

impl From<DocumentError> for FeatureError {
    fn from(error: DocumentError) -> Self {
        Self::Document(Box::new(error))
    }
}

/// Resultaat van een feature-bewerking.
pub type FeatureResult<T = ()> = Result<T, FeatureError>;

/// Gedrag dat elke feature moet leveren.
pub trait Feature {
    /// Typenaam, bv. `"Rod"`.
    fn kind(&self) -> &'static str;

    /// Statische tabel met de eigenschappen van dit featuretype.
    fn properties(&self) -> &'static [PropertySpec];

    fn property(&self, name: &str) -> FeatureResult<PropertyValue>;

    /// Past een eigenschap aan. Type en keuzelijst zijn al gecontroleerd
    /// door [`assign`].
    fn set_property(&mut self, name: &str, value: PropertyValue) -> FeatureResult;

    /// Objecten die de feature leest.
    fn inputs(&self, doc: &Document) -> Vec<ObjectId>;

    /// Objecten waarin de feature schrijft.
    fn outputs(&self, doc: &Document) -> Vec<ObjectId>;

    /// Wordt eenmaal opgeroepen nadat de feature in het document gezet is;
    /// hier maakt een feature zijn vaste kindobjecten aan.
    fn attach(&mut self, _id: ObjectId, _doc: &mut Document) -> FeatureResult {
        Ok(())
    }

    /// Herberekent de feature en schrijft de uitvoer naar het document.
    fn execute(&mut self, id: ObjectId, doc: &mut Document) -> FeatureResult;
}

/// Alle featuretypes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum FeatureKind {
    Profile(Profile),
    Wing(Wing),
    CoordSys(CoordSys),
    Rod(Rod),
    WrapLeadingEdge(WrapLeadingEdge),
    LeadingEdge(LeadingEdge),
    CutWire(CutWire),
    Section(Section),
    Ribs(Ribs),
}

impl FeatureKind {
    /// Alle typenamen die in documentbestanden herkend worden.
    pub const NAMES: &'static [&'static str] = &[
        "Profile",
        "Wing",
        "CoordSys",
        "Rod",
        "WrapLeadingEdge",
        "LeadingEdge",
        "CutWire",
        "Section",
        "Ribs",
    ];

    /// Maakt een feature met standaardwaarden op basis van de typenaam.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "Profile" => Self::Profile(Profile::default()),
            "Wing" => Self::Wing(Wing::default()),
            "CoordSys" => Self::CoordSys(CoordSys::default()),
            "Rod" => Self::Rod(Rod::default()),
            "WrapLeadingEdge" => Self::WrapLeadingEdge(WrapLeadingEdge::default()),
            "LeadingEdge" => Self::LeadingEdge(LeadingEdge::default()),
            "CutWire" => Self::CutWire(CutWire::default()),
            "Section" => Self::Section(Section::default()),
            "Ribs" | "Nervures" => Self::Ribs(Ribs::default()),
            _ => return None,
        };
        Some(kind)
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Profile(_) => "Profile",
            Self::Wing(_) => "Wing",
            Self::CoordSys(_) => "CoordSys",
            Self::Rod(_) => "Rod",
            Self::WrapLeadingEdge(_) => "WrapLeadingEdge",
            Self::LeadingEdge(_) => "LeadingEdge",
            Self::CutWire(_) => "CutWire",
            Self::Section(_) => "Section",
            Self::Ribs(_) => "Ribs",
        }
    }

    #[must_use]
    pub fn as_feature(&self) -> &dyn Feature {
        match self {
            Self::Profile(feature) => feature,
            Self::Wing(feature) => feature,
            Self::CoordSys(feature) => feature,
            Self::Rod(feature) => feature,
            Self::WrapLeadingEdge(feature) => feature,
            Self::LeadingEdge(feature) => feature,
            Self::CutWire(feature) => feature,
            Self::Section(feature) => feature,
            Self::Ribs(feature) => feature,
        }
    }

    pub fn as_feature_mut(&mut self) -> &mut dyn Feature {
        match self {
            Self::Profile(feature) => feature,
            Self::Wing(feature) => feature,
            Self::CoordSys(feature) => feature,
            Self::Rod(feature) => feature,
            Self::WrapLeadingEdge(feature) => feature,
            Self::LeadingEdge(feature) => feature,
            Self::CutWire(feature) => feature,
            Self::Section(feature) => feature,
            Self::Ribs(feature) => feature,
        }
    }

    #[must_use]
    pub fn as_wing(&self) -> Option<&Wing> {
        match self {
            Self::Wing(wing) => Some(wing),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_profile(&self) -> Option<&Profile> {
        match self {
            Self::Profile(profile) => Some(profile),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_coord_sys(&self) -> Option<&CoordSys> {
        match self {
            Self::CoordSys(coord_sys) => Some(coord_sys),
            _ => None,
        }
    }
}

macro_rules! impl_from_feature {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for FeatureKind {
                fn from(feature: $variant) -> Self {
                    Self::$variant(feature)
                }
            }
        )*
    };
}

impl_from_feature!(
    Profile,
    Wing,
    CoordSys,
    Rod,
    WrapLeadingEdge,
    LeadingEdge,
    CutWire,
    Section,
    Ribs,
);

/// Controleert een toekenning tegen de eigenschapstabel en voert ze uit.
pub fn assign(feature: &mut FeatureKind, name: &str, value: PropertyValue) -> FeatureResult {
    let feature = feature.as_feature_mut();
    let spec = find_spec(feature.properties(), name)
        .ok_or_else(|| FeatureError::UnknownProperty(name.to_owned()))?;
    if spec.read_only {
        return Err(FeatureError::ReadOnly(name.to_owned()));
    }
    if !spec.kind.accepts(value.kind()) {
        return Err(PropertyError::type_mismatch(spec.kind, value.kind()).into());
    }
    if !spec.choices.is_empty() {
        let choice = value.expect_enumeration()?;
        if !spec.choices.contains(&choice) {
            return Err(FeatureError::invalid(name, choice));
        }
    }
    feature.set_property(name, value)
}

// ── hulpfuncties voor kindobjecten ──────────────────────────────────────────

/// Maakt de kinddraad aan of vervangt haar punten.
pub(crate) fn ensure_wire(
    doc: &mut Document,
    slot: &mut Option<ObjectId>,
    owner: ObjectId,
    name: &str,
    points: Vec<Point3>,
    closed: bool,
) -> FeatureResult<ObjectId> {
    if let Some(id) = slot.filter(|id| doc.contains(*id)) {
        doc.write_data(id, |data| *data = ObjectData::Wire(Polyline::new(points, closed)))?;
        return Ok(id);
    }
    let id = doc.add_wire(name, points, closed);
    doc.set_owner(id, owner)?;
    *slot = Some(id);
    Ok(id)
}

/// Maakt een loft-kind aan of werkt zijn secties bij.
pub(crate) fn ensure_loft(
    doc: &mut Document,
    slot: &mut Option<ObjectId>,
    owner: ObjectId,
    name: &str,
    sections: Vec<ObjectId>,
) -> FeatureResult<ObjectId> {
    if let Some(id) = slot.filter(|id| doc.contains(*id)) {
        doc.write_data(id, |data| {
            if let ObjectData::Loft { sections: current, .. } = data {
                *current = sections;
            }
        })?;
        return Ok(id);
    }
    let id = doc.add_loft(name, sections, true);
    doc.set_owner(id, owner)?;
    *slot = Some(id);
    Ok(id)
}

/// Maakt een puntmarkering aan of verplaatst ze.
pub(crate) fn ensure_point(
    doc: &mut Document,
    slot: &mut Option<ObjectId>,
    owner: ObjectId,
    name: &str,
    point: Point3,
) -> FeatureResult<ObjectId> {
    if let Some(id) = slot.filter(|id| doc.contains(*id)) {
        doc.write_data(id, |data| *data = ObjectData::Point { point })?;
        return Ok(id);
    }
    let id = doc.add_point(name, point);
    doc.set_owner(id, owner)?;
    *slot = Some(id);
    Ok(id)
}

/// Maakt een vlak-kind aan of past zijn afmetingen en plaatsing aan.
pub(crate) fn ensure_plane(
    doc: &mut Document,
    slot: &mut Option<ObjectId>,
    owner: ObjectId,
    name: &str,
    (length, width): (f64, f64),
    placement: Placement,
) -> FeatureResult<ObjectId> {
    let id = match slot.filter(|id| doc.contains(*id)) {
        Some(id) => {
            doc.write_data(id, |data| *data = ObjectData::Plane { length, width })?;
            id
        }
        None => {
            let id = doc.add_plane(name, length, width);
            doc.set_owner(id, owner)?;
            *slot = Some(id);
            id
        }
    };
    doc.write_placement(id, placement)?;
    Ok(id)
}

/// Schrijft een reeks gesloten of open draden naar kindobjecten. Bestaande
/// kinderen worden hergebruikt; overtollige verdwijnen.
pub(crate) fn sync_wires(
    doc: &mut Document,
    slots: &mut Vec<ObjectId>,
    owner: ObjectId,
    prefix: &str,
    wires: Vec<Polyline>,
) -> FeatureResult {
    slots.retain(|id| doc.contains(*id));
    let count = wires.len();
    for (index, wire) in wires.into_iter().enumerate() {
        let closed = wire.is_closed();
        let mut slot = slots.get(index).copied();
        let id = ensure_wire(
            doc,
            &mut slot,
            owner,
            &format!("{prefix}{index:03}"),
            wire.into_points(),
            closed,
        )?;
        if index >= slots.len() {
            slots.push(id);
        }
    }
    for id in slots.drain(count.min(slots.len())..) {
        if doc.contains(id) {
            doc.remove_object(id)?;
        }
    }
    Ok(())
}

/// Verwijdert een kindobject als het bestaat.
pub(crate) fn drop_child(doc: &mut Document, slot: &mut Option<ObjectId>) -> FeatureResult {
    if let Some(id) = slot.take() {
        if doc.contains(id) {
            doc.remove_object(id)?;
        }
    }
    Ok(())
}

/// Globale draad achter een link, of `None` als de link leeg is of het
/// object geen draad (meer) is.
pub(crate) fn linked_wire(doc: &Document, link: Option<ObjectId>) -> Option<Polyline> {
    link.and_then(|id| doc.global_wire(id).ok())
}

/// Zet een link-eigenschap om naar de waarde voor `property`.
pub(crate) fn link_value(link: Option<ObjectId>) -> PropertyValue {
    PropertyValue::Link(link)
}

/// Bestaande ids uit een lijst optionele ids.
pub(crate) fn present(ids: &[Option<ObjectId>]) -> Vec<ObjectId> {
    ids.iter().flatten().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_registry() {
        for name in FeatureKind::NAMES {
            let kind = FeatureKind::from_name(name).expect("bekend type");
            assert_eq!(kind.name(), *name);
            assert_eq!(kind.as_feature().kind(), *name);
        }
        assert!(FeatureKind::from_name("Onbekend").is_none());
    }

    #[test]
    fn assign_checks_table() {
        let mut kind = FeatureKind::from_name("Rod").expect("rod");
        assert!(matches!(
            assign(&mut kind, "Onbekend", PropertyValue::Number(1.0)),
            Err(FeatureError::UnknownProperty(_))
        ));
        assert!(matches!(
            assign(&mut kind, "VecDirRod", PropertyValue::Vector(crate::geom::Vec3::X)),
            Err(FeatureError::ReadOnly(_))
        ));
        assert!(matches!(
            assign(&mut kind, "RootOffset", PropertyValue::Boolean(true)),
            Err(FeatureError::Property(_))
        ));
        assert!(matches!(
            assign(&mut kind, "TangentType", PropertyValue::Enumeration("Schuin".into())),
            Err(FeatureError::InvalidValue { .. })
        ));
        assign(&mut kind, "RootOffset", PropertyValue::Integer(2)).expect("geldig");
        assert_eq!(
            kind.as_feature().property("RootOffset").expect("waarde"),
            PropertyValue::Number(2.0)
        );
    }

    #[test]
    fn ensure_wire_reuses_child() {
        let mut doc = Document::new();
        let owner = doc.add_point("Owner", Point3::ORIGIN);
        let mut slot = None;
        let first = ensure_wire(&mut doc, &mut slot, owner, "Wire", vec![Point3::ORIGIN], false)
            .expect("draad");
        let second = ensure_wire(
            &mut doc,
            &mut slot,
            owner,
            "Wire",
            vec![Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0)],
            true,
        )
        .expect("draad");
        assert_eq!(first, second);
        assert_eq!(doc.wire(first).expect("draad").len(), 2);
        assert!(doc.wire(first).expect("draad").is_closed());
        drop_child(&mut doc, &mut slot).expect("verwijderd");
        assert!(slot.is_none());
        assert!(!doc.contains(first));
    }
}
