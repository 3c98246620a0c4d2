//! Rod: een ligger tussen een punt op de wortel- en een punt op de tipdraad.
//!
//! De Rod bezit een [`CoordSys`] dat het gekoppelde lichaam verankert. Bij
//! elke herberekening wordt het assenstelsel op de ligger uitgelijnd,
//! eventueel gedraaid naar de bissectrice van de twee draadtangenten, en
//! wordt de lengte van het lichaam aangepast.

use serde::Serialize;

use super::{CoordSys, Feature, FeatureError, FeatureKind, FeatureResult, link_value, linked_wire, present};
use crate::document::{Document, ObjectData, ObjectId, PropertyKind, PropertySpec, PropertyValue};
use crate::geom::{
    Placement, Point3, Polyline, Rotation, Sampling, TangentType, Vec3, normal_vec, tangent_vec,
};

const PROPERTIES: &[PropertySpec] = &[
    PropertySpec::new("Rod", PropertyKind::Link, "Rod", "Solid used as rod"),
    PropertySpec::new("RootWire", PropertyKind::Link, "Rod", "Root wire"),
    PropertySpec::new("TipWire", PropertyKind::Link, "Rod", "Tip wire"),
    PropertySpec::new("RootPoint", PropertyKind::Number, "Rod", "Position on the root wire"),
    PropertySpec::new("TipPoint", PropertyKind::Number, "Rod", "Position on the tip wire"),
    PropertySpec::new("RootOffset", PropertyKind::Number, "Rod", "Extra length beyond the root"),
    PropertySpec::new("TipOffset", PropertyKind::Number, "Rod", "Extra length beyond the tip"),
    PropertySpec::new("RootInwardOffset", PropertyKind::Number, "Rod", "Inward offset at the root"),
    PropertySpec::new("TipInwardOffset", PropertyKind::Number, "Rod", "Inward offset at the tip"),
    PropertySpec::new("AngleOffset", PropertyKind::Number, "Rod", "Rotation about the rod axis (degrees)"),
    PropertySpec::new("AutoRotate", PropertyKind::Boolean, "Rod", "Follow the bisector of the wire tangents"),
    PropertySpec::new("TangentType", PropertyKind::Enumeration, "Rod", "Neighbours used for the tangent")
        .choices(TangentType::NAMES),
    PropertySpec::new("CoordSystem", PropertyKind::Link, "Rod", "Owned coordinate system").read_only(),
    PropertySpec::new("VecRoot", PropertyKind::Vector, "VecList", "Root anchor").read_only(),
    PropertySpec::new("VecRootTangent", PropertyKind::Vector, "VecList", "Root tangent").read_only(),
    PropertySpec::new("VecRootCurvature", PropertyKind::Vector, "VecList", "Root curvature").read_only(),
    PropertySpec::new("VecTip", PropertyKind::Vector, "VecList", "Tip anchor").read_only(),
    PropertySpec::new("VecTipTangent", PropertyKind::Vector, "VecList", "Tip tangent").read_only(),
    PropertySpec::new("VecTipCurvature", PropertyKind::Vector, "VecList", "Tip curvature").read_only(),
    PropertySpec::new("VecDirRod", PropertyKind::Vector, "VecList", "Rod direction").read_only(),
    PropertySpec::new("VecRodCenter", PropertyKind::Vector, "VecList", "Frame origin").read_only(),
];

/// Lokaal assenstelsel op een draad.
#[derive(Debug, Clone, Copy)]
struct WireFrame {
    point: Point3,
    anchor: Point3,
    tangent: Vec3,
    normal: Vec3,
    curvature: Vec3,
}

impl WireFrame {
    fn at(sampling: Sampling, wire: &Polyline, v: f64, tangent_type: TangentType, inward: f64) -> Option<Self> {
        let position = sampling.position(wire, v)?;
        let point = position.point(wire)?;
        let tangent = tangent_vec(wire, position.index, tangent_type);
        let normal = normal_vec(wire, position.index);
        let curvature = tangent.cross(normal).normalized_or_zero();
        Some(Self {
            point,
            anchor: point + curvature * inward,
            tangent,
            normal,
            curvature,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Rod {
    rod: Option<ObjectId>,
    root_wire: Option<ObjectId>,
    tip_wire: Option<ObjectId>,
    root_point: f64,
    tip_point: f64,
    root_offset: f64,
    tip_offset: f64,
    root_inward_offset: f64,
    tip_inward_offset: f64,
    angle_offset: f64,
    auto_rotate: bool,
    tangent_type: TangentType,
    coord_system: Option<ObjectId>,
    vec_root: Vec3,
    vec_root_tangent: Vec3,
    vec_root_curvature: Vec3,
    vec_tip: Vec3,
    vec_tip_tangent: Vec3,
    vec_tip_curvature: Vec3,
    vec_dir_rod: Vec3,
    vec_rod_center: Vec3,
}

impl Default for Rod {
    fn default() -> Self {
        Self {
            rod: None,
            root_wire: None,
            tip_wire: None,
            root_point: 0.0,
            tip_point: 0.0,
            root_offset: 1.0,
            tip_offset: 1.0,
            root_inward_offset: 0.0,
            tip_inward_offset: 0.0,
            angle_offset: 0.0,
            auto_rotate: true,
            tangent_type: TangentType::default(),
            coord_system: None,
            vec_root: Vec3::ZERO,
            vec_root_tangent: Vec3::ZERO,
            vec_root_curvature: Vec3::ZERO,
            vec_tip: Vec3::ZERO,
            vec_tip_tangent: Vec3::ZERO,
            vec_tip_curvature: Vec3::ZERO,
            vec_dir_rod: Vec3::ZERO,
            vec_rod_center: Vec3::ZERO,
        }
    }
}

/// Naam van de lengte-eigenschap per lichaamstype.
fn length_property(data: &ObjectData) -> Option<&'static str> {
    match data {
        ObjectData::Box { .. } | ObjectData::Cylinder { .. } => Some("Height"),
        ObjectData::Pad { .. } => Some("Length"),
        ObjectData::Extrusion { .. } => Some("LengthFwd"),
        _ => None,
    }
}

impl Rod {
    #[must_use]
    pub fn new(rod: Option<ObjectId>, root_wire: Option<ObjectId>, tip_wire: Option<ObjectId>) -> Self {
        Self {
            rod,
            root_wire,
            tip_wire,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn rod(&self) -> Option<ObjectId> {
        self.rod
    }

    #[must_use]
    pub fn coord_system(&self) -> Option<ObjectId> {
        self.coord_system
    }

    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.vec_dir_rod
    }

    /// Lengte die het lichaam krijgt.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.vec_dir_rod.length() + self.root_offset + self.tip_offset
    }

    pub fn set_points(&mut self, root_point: f64, tip_point: f64) {
        self.root_point = root_point;
        self.tip_point = tip_point;
    }

    fn live_coord_system(&self, doc: &Document) -> Option<ObjectId> {
        self.coord_system.filter(|id| doc.contains(*id))
    }

    /// Koppelt het eigen assenstelsel aan het lichaam.
    fn sync_coord_system(&self, doc: &mut Document) -> FeatureResult {
        let Some(cs) = self.live_coord_system(doc) else {
            return Ok(());
        };
        let rod = self.rod;
        doc.with_feature(cs, |feature, _| {
            if let FeatureKind::CoordSys(coord_sys) = feature {
                coord_sys.set_linked_object(rod);
            }
        })?;
        Ok(())
    }

    fn update_axis(&self, doc: &mut Document, placement: Placement) -> FeatureResult {
        let Some(cs) = self.live_coord_system(doc) else {
            return Ok(());
        };
        doc.with_feature(cs, |feature, doc| match feature {
            FeatureKind::CoordSys(coord_sys) => coord_sys.update_axis(doc, placement),
            _ => Ok(()),
        })?
    }

    /// Plaatsing en globale richting van de Tangent-as.
    fn tangent_axis(&self, doc: &Document) -> FeatureResult<(Placement, Vec3)> {
        let Some(coord_sys) = self
            .live_coord_system(doc)
            .and_then(|id| doc.feature(id))
            .and_then(FeatureKind::as_coord_sys)
        else {
            return Ok((Placement::IDENTITY, Vec3::X));
        };
        let placement = coord_sys.tangent_placement(doc)?;
        let (start, end) = coord_sys.tangent_segment(doc)?;
        Ok((placement, end - start))
    }

    fn update_length(&self, doc: &mut Document) -> FeatureResult {
        let Some(rod) = self.rod.filter(|id| doc.contains(*id)) else {
            return Ok(());
        };
        match length_property(&doc.get(rod)?.data) {
            Some(property) => {
                doc.write_property(rod, property, PropertyValue::Number(self.length()))?;
            }
            None => log::debug!("ligger `{}` heeft geen lengte-eigenschap", doc.name_of(rod)),
        }
        Ok(())
    }
}

impl Feature for Rod {
    fn kind(&self) -> &'static str {
        "Rod"
    }

    fn properties(&self) -> &'static [PropertySpec] {
        PROPERTIES
    }

    fn property(&self, name: &str) -> FeatureResult<PropertyValue> {
        let value = match name {
            "Rod" => link_value(self.rod),
            "RootWire" => link_value(self.root_wire),
            "TipWire" => link_value(self.tip_wire),
            "RootPoint" => PropertyValue::Number(self.root_point),
            "TipPoint" => PropertyValue::Number(self.tip_point),
            "RootOffset" => PropertyValue::Number(self.root_offset),
            "TipOffset" => PropertyValue::Number(self.tip_offset),
            "RootInwardOffset" => PropertyValue::Number(self.root_inward_offset),
            "TipInwardOffset" => PropertyValue::Number(self.tip_inward_offset),
            "AngleOffset" => PropertyValue::Number(self.angle_offset),
            "AutoRotate" => PropertyValue::Boolean(self.auto_rotate),
            "TangentType" => PropertyValue::Enumeration(self.tangent_type.name().to_owned()),
            "CoordSystem" => link_value(self.coord_system),
            "VecRoot" => PropertyValue::Vector(self.vec_root),
            "VecRootTangent" => PropertyValue::Vector(self.vec_root_tangent),
            "VecRootCurvature" => PropertyValue::Vector(self.vec_root_curvature),
            "VecTip" => PropertyValue::Vector(self.vec_tip),
            "VecTipTangent" => PropertyValue::Vector(self.vec_tip_tangent),
            "VecTipCurvature" => PropertyValue::Vector(self.vec_tip_curvature),
            "VecDirRod" => PropertyValue::Vector(self.vec_dir_rod),
            "VecRodCenter" => PropertyValue::Vector(self.vec_rod_center),
            _ => return Err(FeatureError::UnknownProperty(name.to_owned())),
        };
        Ok(value)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> FeatureResult {
        match name {
            "Rod" => self.rod = value.expect_link()?,
            "RootWire" => self.root_wire = value.expect_link()?,
            "TipWire" => self.tip_wire = value.expect_link()?,
            "RootPoint" => self.root_point = value.expect_number()?,
            "TipPoint" => self.tip_point = value.expect_number()?,
            "RootOffset" => self.root_offset = value.expect_number()?,
            "TipOffset" => self.tip_offset = value.expect_number()?,
            "RootInwardOffset" => self.root_inward_offset = value.expect_number()?,
            "TipInwardOffset" => self.tip_inward_offset = value.expect_number()?,
            "AngleOffset" => self.angle_offset = value.expect_number()?,
            "AutoRotate" => self.auto_rotate = value.expect_boolean()?,
            "TangentType" => {
                let choice = value.expect_enumeration()?;
                self.tangent_type =
                    TangentType::from_name(choice).ok_or_else(|| FeatureError::invalid(name, choice))?;
            }
            _ => return Err(FeatureError::UnknownProperty(name.to_owned())),
        }
        Ok(())
    }

    fn inputs(&self, _doc: &Document) -> Vec<ObjectId> {
        present(&[self.root_wire, self.tip_wire])
    }

    fn outputs(&self, doc: &Document) -> Vec<ObjectId> {
        let mut outputs = present(&[self.rod, self.coord_system]);
        if let Some(coord_sys) = self
            .coord_system
            .and_then(|id| doc.feature(id))
            .and_then(FeatureKind::as_coord_sys)
        {
            outputs.extend(coord_sys.axis_wires());
        }
        outputs
    }

    fn attach(&mut self, id: ObjectId, doc: &mut Document) -> FeatureResult {
        let cs = doc.add_feature("CoordSystem", CoordSys::new(self.rod))?;
        doc.set_owner(cs, id)?;
        self.coord_system = Some(cs);
        Ok(())
    }

    fn execute(&mut self, _id: ObjectId, doc: &mut Document) -> FeatureResult {
        self.sync_coord_system(doc)?;

        let Some(root_wire) = linked_wire(doc, self.root_wire).filter(|w| w.edge_count() > 0) else {
            log::debug!("ligger zonder worteldraad; niets te doen");
            return Ok(());
        };
        let sampling = doc.sampling();
        let Some(root) =
            WireFrame::at(sampling, &root_wire, self.root_point, self.tangent_type, self.root_inward_offset)
        else {
            return Ok(());
        };
        let tip = linked_wire(doc, self.tip_wire)
            .filter(|w| w.edge_count() > 0)
            .and_then(|wire| WireFrame::at(sampling, &wire, self.tip_point, self.tangent_type, self.tip_inward_offset));

        self.vec_root = root.anchor.to_vec3();
        self.vec_root_tangent = root.tangent;
        self.vec_root_curvature = root.curvature;
        let vec_tip = match &tip {
            Some(tip) => {
                self.vec_tip_tangent = tip.tangent;
                self.vec_tip_curvature = tip.curvature;
                tip.anchor
            }
            None => {
                self.vec_tip_tangent = Vec3::ZERO;
                self.vec_tip_curvature = Vec3::ZERO;
                root.anchor - root.normal
            }
        };
        self.vec_tip = vec_tip.to_vec3();

        let direction = vec_tip - root.anchor;
        let Some(unit) = direction.normalized() else {
            log::warn!("ligger: wortel en tip vallen samen");
            return Ok(());
        };
        self.vec_dir_rod = direction;

        let origin = root.anchor.to_vec3();
        let align = Placement::with_center(Vec3::ZERO, Rotation::between(Vec3::Z, direction), origin)
            .multiply(Placement::translation(origin));
        self.update_axis(doc, align)?;

        if self.auto_rotate && !root.tangent.is_null() {
            let bisector = (root.tangent + self.vec_tip_tangent)
                .normalized_or_zero()
                .project_to_plane(Vec3::ZERO, direction);
            if !bisector.is_null() {
                let (current, axis) = self.tangent_axis(doc)?;
                let turn = Placement::with_center(Vec3::ZERO, Rotation::between(axis, bisector), origin);
                self.update_axis(doc, turn.multiply(current))?;
            }
        }

        let (current, _) = self.tangent_axis(doc)?;
        self.vec_rod_center = current.base;
        let shift = -(unit * self.root_offset) - (self.vec_rod_center - origin);
        let positioned = Placement::with_center(
            Vec3::ZERO,
            Rotation::from_axis_degrees(direction, self.angle_offset),
            root.point.to_vec3(),
        )
        .multiply(Placement::translation(shift))
        .multiply(current);
        self.update_axis(doc, positioned)?;

        if tip.is_some() {
            self.update_length(doc)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Tolerance;

    fn square(doc: &mut Document, name: &str, z: f64) -> ObjectId {
        let wire = doc.add_wire(
            name,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
                Point3::new(4.0, 4.0, 0.0),
                Point3::new(0.0, 4.0, 0.0),
            ],
            true,
        );
        doc.set_placement(wire, Placement::translation(Vec3::new(0.0, 0.0, z)))
            .unwrap();
        wire
    }

    fn rod_document() -> (Document, ObjectId, ObjectId) {
        let mut doc = Document::new();
        let root = square(&mut doc, "Root", 0.0);
        let tip = square(&mut doc, "Tip", 10.0);
        let solid = doc.add_box("Spar", 2.0, 2.0, 5.0);
        let rod = doc.add_feature("Rod", Rod::new(Some(solid), Some(root), Some(tip))).unwrap();
        doc.recompute().unwrap();
        (doc, rod, solid)
    }

    #[test]
    fn length_adds_both_offsets() {
        let (doc, rod, solid) = rod_document();
        assert_eq!(
            doc.property(rod, "VecDirRod").unwrap(),
            PropertyValue::Vector(Vec3::new(0.0, 0.0, 10.0))
        );
        let height = doc.property(solid, "Height").unwrap().expect_number().unwrap();
        assert!(Tolerance::DEFAULT.approx_eq_f64(height, 12.0));
    }

    #[test]
    fn solid_spans_root_to_tip_with_offsets() {
        let (doc, _, solid) = rod_document();
        let bbox = doc.shape(solid).unwrap().bbox().unwrap();
        assert!(Tolerance::LOOSE.approx_eq_f64(bbox.min.z, -1.0));
        assert!(Tolerance::LOOSE.approx_eq_f64(bbox.max.z, 11.0));
    }

    #[test]
    fn recompute_is_stable() {
        let (mut doc, rod, solid) = rod_document();
        let first = doc.placement(solid).unwrap();
        doc.touch(rod).unwrap();
        doc.recompute().unwrap();
        assert!(first.approx_eq(doc.placement(solid).unwrap(), Tolerance::LOOSE));
    }

    #[test]
    fn inward_offset_moves_root_anchor() {
        let (mut doc, rod, _) = rod_document();
        doc.set_property(rod, "RootInwardOffset", PropertyValue::Number(1.0)).unwrap();
        doc.recompute().unwrap();
        let root = doc.property(rod, "VecRoot").unwrap().expect_vector().unwrap();
        let curvature = doc.property(rod, "VecRootCurvature").unwrap().expect_vector().unwrap();
        assert!(Tolerance::DEFAULT.approx_eq_vec3(root, curvature));
        assert!(Tolerance::DEFAULT.approx_eq_f64(curvature.length(), 1.0));
    }

    #[test]
    fn single_wire_points_along_normal() {
        let mut doc = Document::new();
        let root = square(&mut doc, "Root", 0.0);
        let solid = doc.add_box("Spar", 2.0, 2.0, 5.0);
        let rod = doc.add_feature("Rod", Rod::new(Some(solid), Some(root), None)).unwrap();
        doc.recompute().unwrap();
        let dir = doc.property(rod, "VecDirRod").unwrap().expect_vector().unwrap();
        assert!(Tolerance::DEFAULT.approx_eq_f64(dir.length(), 1.0));
        assert!(Tolerance::DEFAULT.approx_eq_f64(dir.x, 0.0));
        // Zonder tip blijft de hoogte onaangeroerd.
        assert_eq!(doc.property(solid, "Height").unwrap(), PropertyValue::Number(5.0));
    }

    #[test]
    fn missing_root_wire_is_a_no_op() {
        let mut doc = Document::new();
        let rod = doc.add_feature("Rod", Rod::default()).unwrap();
        let report = doc.recompute().unwrap();
        assert!(report.is_ok());
        assert!(report.recomputed.contains(&rod));
    }

    #[test]
    fn removing_rod_removes_its_frame() {
        let (mut doc, rod, solid) = rod_document();
        let cs = doc.property(rod, "CoordSystem").unwrap().expect_link().unwrap().unwrap();
        let removed = doc.remove_object(rod).unwrap();
        assert!(removed.contains(&cs));
        assert!(doc.contains(solid));
        assert_eq!(doc.object_count(), 3);
    }
}
