//! Objecten binnen een document: draden, primitieven en features.

use serde::Serialize;

use crate::geom::{Placement, Point3, Polyline, Vec3};

/// Identifier voor een object binnen het document.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd, Serialize)]
pub struct ObjectId(pub usize);

impl ObjectId {
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }
}

impl From<usize> for ObjectId {
    fn from(value: usize) -> Self {
        Self::new(value)
    }
}

impl core::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Gegevens van een object. Features bewaren hun gedrag apart in het
/// document; hier staat dan enkel `Feature`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ObjectData {
    /// Polylijn in lokale coördinaten.
    Wire(Polyline),
    /// Markeringspunt in lokale coördinaten.
    Point { point: Point3 },
    Box {
        length: f64,
        width: f64,
        height: f64,
    },
    Cylinder { radius: f64, height: f64 },
    /// Extrusie van een gesloten draad. Een positieve `length_fwd`
    /// overschrijft de lengte van `direction`.
    Extrusion {
        base: Option<ObjectId>,
        direction: Vec3,
        length_fwd: f64,
    },
    /// Extrusie van een schets langs haar eigen normaal.
    Pad {
        sketch: Option<ObjectId>,
        length: f64,
    },
    Loft {
        sections: Vec<ObjectId>,
        solid: bool,
        ruled: bool,
    },
    /// Rechthoekig vlak in het lokale XY-vlak.
    Plane { length: f64, width: f64 },
    Feature,
}

impl ObjectData {
    /// Typenaam zoals die in documentbestanden voorkomt.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Wire(_) => "Wire",
            Self::Point { .. } => "Point",
            Self::Box { .. } => "Box",
            Self::Cylinder { .. } => "Cylinder",
            Self::Extrusion { .. } => "Extrusion",
            Self::Pad { .. } => "Pad",
            Self::Loft { .. } => "Loft",
            Self::Plane { .. } => "Plane",
            Self::Feature => "Feature",
        }
    }

    /// Objecten waarvan de vorm van dit object afhangt.
    #[must_use]
    pub fn sources(&self) -> Vec<ObjectId> {
        match self {
            Self::Extrusion { base, .. } => base.iter().copied().collect(),
            Self::Pad { sketch, .. } => sketch.iter().copied().collect(),
            Self::Loft { sections, .. } => sections.clone(),
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub fn as_wire(&self) -> Option<&Polyline> {
        match self {
            Self::Wire(wire) => Some(wire),
            _ => None,
        }
    }
}

/// Een object in het document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentObject {
    pub id: ObjectId,
    /// Unieke interne naam, bv. `Wire001`.
    pub name: String,
    pub label: String,
    pub placement: Placement,
    /// Eigenaar; wordt het eigenaarobject verwijderd, dan verdwijnt dit mee.
    pub owner: Option<ObjectId>,
    pub data: ObjectData,
}

impl DocumentObject {
    #[must_use]
    pub fn new(id: ObjectId, name: String, data: ObjectData) -> Self {
        Self {
            id,
            label: name.clone(),
            name,
            placement: Placement::IDENTITY,
            owner: None,
            data,
        }
    }

    #[must_use]
    pub fn is_feature(&self) -> bool {
        matches!(self.data, ObjectData::Feature)
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentObject, ObjectData, ObjectId};

    #[test]
    fn new_object_uses_name_as_label() {
        let obj = DocumentObject::new(
            ObjectId::new(3),
            "Box001".to_owned(),
            ObjectData::Box {
                length: 1.0,
                width: 2.0,
                height: 3.0,
            },
        );
        assert_eq!(obj.label, "Box001");
        assert_eq!(obj.data.type_name(), "Box");
        assert!(!obj.is_feature());
        assert_eq!(ObjectId::new(3).to_string(), "#3");
    }

    #[test]
    fn sources_follow_shape_inputs() {
        let loft = ObjectData::Loft {
            sections: vec![ObjectId::new(1), ObjectId::new(2)],
            solid: true,
            ruled: false,
        };
        assert_eq!(loft.sources(), vec![ObjectId::new(1), ObjectId::new(2)]);
        let pad = ObjectData::Pad {
            sketch: None,
            length: 5.0,
        };
        assert!(pad.sources().is_empty());
    }
}
