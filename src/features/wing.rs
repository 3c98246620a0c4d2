//! Wing: plaatst het tipprofiel ten opzichte van het wortelprofiel.

use serde::Serialize;

use super::{
    Feature, FeatureError, FeatureKind, FeatureResult, drop_child, ensure_loft, link_value,
    present,
};
use crate::document::{Document, ObjectId, PropertyKind, PropertySpec, PropertyValue};
use crate::geom::{Placement, Rotation, Vec3};

const PROPERTIES: &[PropertySpec] = &[
    PropertySpec::new("RootProfile", PropertyKind::Link, "Wing", "Root profile"),
    PropertySpec::new("TipProfile", PropertyKind::Link, "Wing", "Tip profile"),
    PropertySpec::new("RootWire", PropertyKind::Link, "Wing", "Root profile wire").read_only(),
    PropertySpec::new("TipWire", PropertyKind::Link, "Wing", "Tip profile wire").read_only(),
    PropertySpec::new("Length", PropertyKind::Number, "Wing", "Span from root to tip"),
    PropertySpec::new("TipXOffset", PropertyKind::Number, "Wing", "Tip offset along X"),
    PropertySpec::new("TipYOffset", PropertyKind::Number, "Wing", "Tip offset along Y"),
    PropertySpec::new("TipAngle", PropertyKind::Number, "Wing", "Tip rotation about Z (degrees)"),
    PropertySpec::new("MakeLoft", PropertyKind::Boolean, "Wing", "Loft root and tip wires"),
    PropertySpec::new("Loft", PropertyKind::Link, "Wing", "Wing loft").read_only(),
];

#[derive(Debug, Clone, Serialize)]
pub struct Wing {
    root_profile: Option<ObjectId>,
    tip_profile: Option<ObjectId>,
    length: f64,
    tip_x_offset: f64,
    tip_y_offset: f64,
    tip_angle: f64,
    make_loft: bool,
    root_wire: Option<ObjectId>,
    tip_wire: Option<ObjectId>,
    loft: Option<ObjectId>,
}

impl Default for Wing {
    fn default() -> Self {
        Self {
            root_profile: None,
            tip_profile: None,
            length: 10.0,
            tip_x_offset: 0.0,
            tip_y_offset: 0.0,
            tip_angle: 0.0,
            make_loft: false,
            root_wire: None,
            tip_wire: None,
            loft: None,
        }
    }
}

/// Draad van het profiel achter `profile`.
fn profile_wire(doc: &Document, profile: Option<ObjectId>) -> Option<ObjectId> {
    profile
        .and_then(|id| doc.feature(id))
        .and_then(FeatureKind::as_profile)
        .and_then(|profile| profile.wire())
}

impl Wing {
    #[must_use]
    pub fn new(root_profile: Option<ObjectId>, tip_profile: Option<ObjectId>) -> Self {
        Self {
            root_profile,
            tip_profile,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn root_wire(&self) -> Option<ObjectId> {
        self.root_wire
    }

    #[must_use]
    pub fn tip_wire(&self) -> Option<ObjectId> {
        self.tip_wire
    }

    #[must_use]
    pub fn root_profile(&self) -> Option<ObjectId> {
        self.root_profile
    }

    #[must_use]
    pub fn tip_profile(&self) -> Option<ObjectId> {
        self.tip_profile
    }

    #[must_use]
    pub fn loft(&self) -> Option<ObjectId> {
        self.loft
    }

    /// Plaatsing van de tip relatief tot de wortel.
    #[must_use]
    pub fn tip_offset(&self) -> Placement {
        Placement::with_center(
            Vec3::new(self.tip_x_offset, self.tip_y_offset, self.length),
            Rotation::from_axis_degrees(Vec3::Z, self.tip_angle),
            Vec3::Z,
        )
    }

    fn resolve_wires(&mut self, doc: &Document) {
        self.root_wire = profile_wire(doc, self.root_profile);
        self.tip_wire = profile_wire(doc, self.tip_profile);
    }
}

impl Feature for Wing {
    fn kind(&self) -> &'static str {
        "Wing"
    }

    fn properties(&self) -> &'static [PropertySpec] {
        PROPERTIES
    }

    fn property(&self, name: &str) -> FeatureResult<PropertyValue> {
        let value = match name {
            "RootProfile" => link_value(self.root_profile),
            "TipProfile" => link_value(self.tip_profile),
            "RootWire" => link_value(self.root_wire),
            "TipWire" => link_value(self.tip_wire),
            "Length" => PropertyValue::Number(self.length),
            "TipXOffset" => PropertyValue::Number(self.tip_x_offset),
            "TipYOffset" => PropertyValue::Number(self.tip_y_offset),
            "TipAngle" => PropertyValue::Number(self.tip_angle),
            "MakeLoft" => PropertyValue::Boolean(self.make_loft),
            "Loft" => link_value(self.loft),
            _ => return Err(FeatureError::UnknownProperty(name.to_owned())),
        };
        Ok(value)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> FeatureResult {
        match name {
            "RootProfile" => self.root_profile = value.expect_link()?,
            "TipProfile" => self.tip_profile = value.expect_link()?,
            "Length" => self.length = value.expect_number()?,
            "TipXOffset" => self.tip_x_offset = value.expect_number()?,
            "TipYOffset" => self.tip_y_offset = value.expect_number()?,
            "TipAngle" => self.tip_angle = value.expect_number()?,
            "MakeLoft" => self.make_loft = value.expect_boolean()?,
            _ => return Err(FeatureError::UnknownProperty(name.to_owned())),
        }
        Ok(())
    }

    fn inputs(&self, doc: &Document) -> Vec<ObjectId> {
        present(&[
            self.root_profile,
            self.tip_profile,
            profile_wire(doc, self.root_profile),
        ])
    }

    fn outputs(&self, doc: &Document) -> Vec<ObjectId> {
        let root_wire = profile_wire(doc, self.root_profile);
        let tip_wire = profile_wire(doc, self.tip_profile).filter(|tip| Some(*tip) != root_wire);
        present(&[tip_wire, self.loft])
    }

    fn attach(&mut self, _id: ObjectId, doc: &mut Document) -> FeatureResult {
        self.resolve_wires(doc);
        Ok(())
    }

    fn execute(&mut self, id: ObjectId, doc: &mut Document) -> FeatureResult {
        self.resolve_wires(doc);
        let (Some(root_wire), Some(tip_wire)) = (self.root_wire, self.tip_wire) else {
            log::debug!("vleugel zonder twee profielen; niets te doen");
            drop_child(doc, &mut self.loft)?;
            return Ok(());
        };

        if root_wire != tip_wire {
            let placement = doc.placement(root_wire)?.multiply(self.tip_offset());
            doc.write_placement(tip_wire, placement)?;
        }

        if self.make_loft {
            ensure_loft(doc, &mut self.loft, id, "Loft", vec![root_wire, tip_wire])?;
        } else {
            drop_child(doc, &mut self.loft)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Profile;
    use crate::geom::{Point3, Tolerance};

    const SQUARE: &str = "sq\n0.0 0.0\n1.0 0.0\n1.0 1.0\n0.0 1.0\n";

    fn wing_document() -> (Document, ObjectId) {
        let mut doc = Document::new();
        let root = doc
            .add_feature("RootProfile", Profile::from_data(SQUARE, 1.0))
            .unwrap();
        let tip = doc
            .add_feature("TipProfile", Profile::from_data(SQUARE, 0.5))
            .unwrap();
        let wing = doc.add_feature("Wing", Wing::new(Some(root), Some(tip))).unwrap();
        doc.recompute().unwrap();
        (doc, wing)
    }

    fn tip_wire(doc: &Document, wing: ObjectId) -> ObjectId {
        doc.property(wing, "TipWire").unwrap().expect_link().unwrap().unwrap()
    }

    #[test]
    fn tip_follows_length_and_offsets() {
        let (mut doc, wing) = wing_document();
        doc.set_property(wing, "Length", PropertyValue::Number(500.0)).unwrap();
        doc.set_property(wing, "TipXOffset", PropertyValue::Number(20.0)).unwrap();
        doc.recompute().unwrap();
        let tip = doc.global_wire(tip_wire(&doc, wing)).unwrap();
        assert!(Tolerance::DEFAULT.approx_eq_point3(tip.points()[0], Point3::new(20.0, 0.0, 500.0)));
    }

    #[test]
    fn tip_angle_rotates_about_z() {
        let (mut doc, wing) = wing_document();
        doc.set_property(wing, "TipAngle", PropertyValue::Number(90.0)).unwrap();
        doc.recompute().unwrap();
        let tip = doc.global_wire(tip_wire(&doc, wing)).unwrap();
        // (0.5, 0, 0) draait naar (0, 0.5, 10)
        assert!(Tolerance::LOOSE.approx_eq_point3(tip.points()[1], Point3::new(0.0, 0.5, 10.0)));
    }

    #[test]
    fn make_loft_creates_and_removes_child() {
        let (mut doc, wing) = wing_document();
        doc.set_property(wing, "MakeLoft", PropertyValue::Boolean(true)).unwrap();
        doc.recompute().unwrap();
        let loft = doc.property(wing, "Loft").unwrap().expect_link().unwrap().unwrap();
        let bbox = doc.shape(loft).unwrap().bbox().unwrap();
        assert!(Tolerance::DEFAULT.approx_eq_f64(bbox.max.z, 10.0));

        doc.set_property(wing, "MakeLoft", PropertyValue::Boolean(false)).unwrap();
        doc.recompute().unwrap();
        assert!(!doc.contains(loft));
        assert_eq!(doc.property(wing, "Loft").unwrap(), PropertyValue::Link(None));
    }

    #[test]
    fn missing_profile_is_a_no_op() {
        let mut doc = Document::new();
        let wing = doc.add_feature("Wing", Wing::default()).unwrap();
        let report = doc.recompute().unwrap();
        assert!(report.recomputed.contains(&wing));
        assert_eq!(doc.object_count(), 1);
    }
}
