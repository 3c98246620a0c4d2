//! Ribs: een reeks evenwijdige doorsneden op vaste tussenafstand.

use serde::Serialize;

use super::{Feature, FeatureError, FeatureResult, link_value, present, sync_wires};
use crate::document::{Document, ObjectId, PropertyKind, PropertySpec, PropertyValue};
use crate::geom::{Plane, Point3, Polyline, Vec3, section_wires};

const PROPERTIES: &[PropertySpec] = &[
    PropertySpec::new("SlicedObject", PropertyKind::Link, "Ribs", "Solid to slice"),
    PropertySpec::new("Count", PropertyKind::Integer, "Ribs", "Number of ribs"),
    PropertySpec::new("Spacing", PropertyKind::Number, "Ribs", "Distance between ribs"),
    PropertySpec::new("Normal", PropertyKind::Vector, "Ribs", "Rib normal"),
    PropertySpec::new("Wires", PropertyKind::Integer, "Ribs", "Number of rib loops").read_only(),
];

#[derive(Debug, Clone, Serialize)]
pub struct Ribs {
    sliced_object: Option<ObjectId>,
    count: usize,
    spacing: f64,
    normal: Vec3,
    wires: Vec<ObjectId>,
}

impl Default for Ribs {
    fn default() -> Self {
        Self {
            sliced_object: None,
            count: 5,
            spacing: 10.0,
            normal: Vec3::Z,
            wires: Vec::new(),
        }
    }
}

impl Ribs {
    #[must_use]
    pub fn new(sliced_object: Option<ObjectId>, count: usize, spacing: f64) -> Self {
        Self {
            sliced_object,
            count,
            spacing,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn wires(&self) -> &[ObjectId] {
        &self.wires
    }
}

impl Feature for Ribs {
    fn kind(&self) -> &'static str {
        "Ribs"
    }

    fn properties(&self) -> &'static [PropertySpec] {
        PROPERTIES
    }

    fn property(&self, name: &str) -> FeatureResult<PropertyValue> {
        let value = match name {
            "SlicedObject" => link_value(self.sliced_object),
            "Count" => PropertyValue::Integer(self.count as i64),
            "Spacing" => PropertyValue::Number(self.spacing),
            "Normal" => PropertyValue::Vector(self.normal),
            "Wires" => PropertyValue::Integer(self.wires.len() as i64),
            _ => return Err(FeatureError::UnknownProperty(name.to_owned())),
        };
        Ok(value)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> FeatureResult {
        match name {
            "SlicedObject" => self.sliced_object = value.expect_link()?,
            "Count" => {
                let count = value.expect_integer()?;
                self.count = usize::try_from(count).map_err(|_| FeatureError::invalid(name, count))?;
            }
            "Spacing" => self.spacing = value.expect_number()?,
            "Normal" => {
                let normal = value.expect_vector()?;
                if normal.is_null() {
                    return Err(FeatureError::invalid(name, format!("{normal:?}")));
                }
                self.normal = normal;
            }
            _ => return Err(FeatureError::UnknownProperty(name.to_owned())),
        }
        Ok(())
    }

    fn inputs(&self, _doc: &Document) -> Vec<ObjectId> {
        present(&[self.sliced_object])
    }

    fn outputs(&self, _doc: &Document) -> Vec<ObjectId> {
        self.wires.clone()
    }

    fn execute(&mut self, id: ObjectId, doc: &mut Document) -> FeatureResult {
        let Some(sliced) = self.sliced_object.filter(|sliced| doc.contains(*sliced)) else {
            log::debug!("nerven zonder object; niets te doen");
            return Ok(());
        };
        let shape = doc.shape(sliced)?;
        let (Some(bbox), Some(normal)) = (shape.bbox(), self.normal.normalized()) else {
            return Ok(());
        };
        let (start, _) = bbox.projected_range(normal);

        let loops: Vec<Polyline> = (0..self.count)
            .filter_map(|i| {
                let distance = start + self.spacing * i as f64;
                Plane::new(Point3::from(normal * distance), normal)
            })
            .flat_map(|plane| section_wires(&shape, &plane))
            .collect();
        log::debug!("{} nerf-lus(sen) uit `{}`", loops.len(), doc.name_of(sliced));
        sync_wires(doc, &mut self.wires, id, "Rib", loops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Tolerance;

    fn spar() -> (Document, ObjectId, ObjectId) {
        let mut doc = Document::new();
        let solid = doc.add_box("Spar", 2.0, 3.0, 10.0);
        let ribs = doc.add_feature("Ribs", Ribs::new(Some(solid), 3, 4.0)).unwrap();
        doc.recompute().unwrap();
        (doc, solid, ribs)
    }

    fn rib_wires(doc: &Document, id: ObjectId) -> Vec<ObjectId> {
        match doc.feature(id) {
            Some(crate::features::FeatureKind::Ribs(ribs)) => ribs.wires().to_vec(),
            other => panic!("verwacht nerven, kreeg {other:?}"),
        }
    }

    #[test]
    fn ribs_start_at_bbox_minimum() {
        let (doc, _, ribs) = spar();
        let wires = rib_wires(&doc, ribs);
        assert_eq!(wires.len(), 3);
        for (wire, z) in wires.iter().zip([0.0, 4.0, 8.0]) {
            let wire = doc.wire(*wire).unwrap();
            assert!(wire.is_closed());
            assert!(wire.points().iter().all(|p| Tolerance::DEFAULT.approx_eq_f64(p.z, z)));
        }
    }

    #[test]
    fn ribs_beyond_the_solid_are_skipped() {
        let (mut doc, _, ribs) = spar();
        doc.set_property(ribs, "Count", PropertyValue::Integer(6)).unwrap();
        doc.recompute().unwrap();
        assert_eq!(doc.property(ribs, "Wires").unwrap(), PropertyValue::Integer(3));
    }

    #[test]
    fn fewer_ribs_remove_children() {
        let (mut doc, _, ribs) = spar();
        let before = rib_wires(&doc, ribs);
        doc.set_property(ribs, "Count", PropertyValue::Integer(1)).unwrap();
        doc.recompute().unwrap();
        let after = rib_wires(&doc, ribs);
        assert_eq!(after, vec![before[0]]);
        assert!(!doc.contains(before[2]));
    }

    #[test]
    fn normal_along_x() {
        let (mut doc, _, ribs) = spar();
        doc.set_property(ribs, "Normal", PropertyValue::Vector(Vec3::X)).unwrap();
        doc.set_property(ribs, "Spacing", PropertyValue::Number(1.0)).unwrap();
        doc.recompute().unwrap();
        // x = 0 en x = 1; x = 2 is het verre vlak.
        assert_eq!(doc.property(ribs, "Wires").unwrap(), PropertyValue::Integer(2));
    }

    #[test]
    fn rejects_negative_count_and_null_normal() {
        let (mut doc, _, ribs) = spar();
        assert!(doc.set_property(ribs, "Count", PropertyValue::Integer(-1)).is_err());
        assert!(doc.set_property(ribs, "Normal", PropertyValue::Vector(Vec3::ZERO)).is_err());
    }

    #[test]
    fn legacy_name_maps_to_ribs() {
        let kind = crate::features::FeatureKind::from_name("Nervures").unwrap();
        assert_eq!(kind.name(), "Ribs");
    }
}
