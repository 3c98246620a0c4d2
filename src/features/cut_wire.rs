//! CutWire: snijdt één draad op twee parametrische posities.
//!
//! [`CutRange`] bevat de bewerkingsregels voor begin, einde en tussenruimte
//! zoals een invoerpaneel ze toepast voordat de waarden naar de feature
//! gaan.

use serde::Serialize;

use super::{
    Feature, FeatureError, FeatureResult, drop_child, ensure_point, ensure_wire, link_value, linked_wire,
    present,
};
use crate::document::{Document, ObjectId, PropertyKind, PropertySpec, PropertyValue};
use crate::geom::{CutSide, CutType};

const PROPERTIES: &[PropertySpec] = &[
    PropertySpec::new("Wire", PropertyKind::Link, "CutWire", "Wire to cut"),
    PropertySpec::new("StartPoint", PropertyKind::Number, "CutWire", "Cut start"),
    PropertySpec::new("EndPoint", PropertyKind::Number, "CutWire", "Cut end"),
    PropertySpec::new("CutType", PropertyKind::Enumeration, "CutWire", "Halves to keep").choices(CutType::NAMES),
    PropertySpec::new("Left", PropertyKind::Link, "CutWire", "Left half").read_only(),
    PropertySpec::new("Right", PropertyKind::Link, "CutWire", "Right half").read_only(),
    PropertySpec::new("StartPointObj", PropertyKind::Link, "CutWire", "Marker on the cut start").read_only(),
    PropertySpec::new("EndPointObj", PropertyKind::Link, "CutWire", "Marker on the cut end").read_only(),
];

/// Begin, einde en tussenruimte van een snede, begrensd door `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CutRange {
    start: f64,
    end: f64,
    gap: f64,
    max: f64,
    gap_locked: bool,
}

impl CutRange {
    /// `max` is het aantal punten van de draad.
    #[must_use]
    pub fn new(start: f64, end: f64, max: f64) -> Self {
        Self {
            start,
            end,
            gap: (end - start).max(0.0),
            max,
            gap_locked: false,
        }
    }

    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> f64 {
        self.end
    }

    #[must_use]
    pub fn gap(&self) -> f64 {
        self.gap
    }

    #[must_use]
    pub fn is_gap_locked(&self) -> bool {
        self.gap_locked
    }

    pub fn lock_gap(&mut self, locked: bool) {
        self.gap_locked = locked;
    }

    /// Verplaatst het begin. Met vergrendelde tussenruimte schuift het einde
    /// mee; voorbij `max` wordt de wijziging geweigerd en `false` gegeven.
    pub fn set_start(&mut self, start: f64) -> bool {
        if self.gap_locked {
            if start + self.gap > self.max {
                return false;
            }
            self.start = start;
            self.end = start + self.gap;
            return true;
        }
        self.start = start;
        if start >= self.end {
            self.end = (start + 1.0).min(self.max);
        }
        self.gap = self.end - self.start;
        true
    }

    /// Verplaatst het einde, spiegelbeeld van [`CutRange::set_start`].
    pub fn set_end(&mut self, end: f64) -> bool {
        if self.gap_locked {
            if end - self.gap < 0.0 {
                return false;
            }
            self.end = end;
            self.start = end - self.gap;
            return true;
        }
        self.end = end;
        if self.start >= end {
            self.start = (end - 1.0).max(0.0);
        }
        self.gap = self.end - self.start;
        true
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CutWire {
    wire: Option<ObjectId>,
    start_point: f64,
    end_point: f64,
    cut_type: CutType,
    left: Option<ObjectId>,
    right: Option<ObjectId>,
    start_marker: Option<ObjectId>,
    end_marker: Option<ObjectId>,
}

impl Default for CutWire {
    fn default() -> Self {
        Self {
            wire: None,
            start_point: 0.0,
            end_point: 1.0,
            cut_type: CutType::default(),
            left: None,
            right: None,
            start_marker: None,
            end_marker: None,
        }
    }
}

impl CutWire {
    #[must_use]
    pub fn new(wire: Option<ObjectId>, start_point: f64, end_point: f64) -> Self {
        Self {
            wire,
            start_point,
            end_point,
            ..Self::default()
        }
    }

    /// Bewerkingsbereik voor de huidige draad.
    pub fn range(&self, doc: &Document) -> FeatureResult<CutRange> {
        let wire = self
            .wire
            .ok_or_else(|| FeatureError::new("snede zonder draad"))?;
        let max = doc.wire(wire)?.len() as f64;
        Ok(CutRange::new(self.start_point, self.end_point, max))
    }

    /// Neemt begin en einde over uit een bewerkt bereik.
    pub fn apply_range(&mut self, range: &CutRange) {
        self.start_point = range.start();
        self.end_point = range.end();
    }

    fn slot(&mut self, side: CutSide) -> &mut Option<ObjectId> {
        match side {
            CutSide::Left => &mut self.left,
            CutSide::Right => &mut self.right,
        }
    }
}

impl Feature for CutWire {
    fn kind(&self) -> &'static str {
        "CutWire"
    }

    fn properties(&self) -> &'static [PropertySpec] {
        PROPERTIES
    }

    fn property(&self, name: &str) -> FeatureResult<PropertyValue> {
        let value = match name {
            "Wire" => link_value(self.wire),
            "StartPoint" => PropertyValue::Number(self.start_point),
            "EndPoint" => PropertyValue::Number(self.end_point),
            "CutType" => PropertyValue::Enumeration(self.cut_type.name().to_owned()),
            "Left" => link_value(self.left),
            "Right" => link_value(self.right),
            "StartPointObj" => link_value(self.start_marker),
            "EndPointObj" => link_value(self.end_marker),
            _ => return Err(FeatureError::UnknownProperty(name.to_owned())),
        };
        Ok(value)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> FeatureResult {
        match name {
            "Wire" => self.wire = value.expect_link()?,
            "StartPoint" => self.start_point = value.expect_number()?,
            "EndPoint" => self.end_point = value.expect_number()?,
            "CutType" => {
                let choice = value.expect_enumeration()?;
                self.cut_type = CutType::from_name(choice).ok_or_else(|| FeatureError::invalid(name, choice))?;
            }
            _ => return Err(FeatureError::UnknownProperty(name.to_owned())),
        }
        Ok(())
    }

    fn inputs(&self, _doc: &Document) -> Vec<ObjectId> {
        present(&[self.wire])
    }

    fn outputs(&self, _doc: &Document) -> Vec<ObjectId> {
        present(&[self.left, self.right, self.start_marker, self.end_marker])
    }

    fn execute(&mut self, id: ObjectId, doc: &mut Document) -> FeatureResult {
        let Some(wire) = linked_wire(doc, self.wire) else {
            log::debug!("snede zonder draad; niets te doen");
            return Ok(());
        };
        let sampling = doc.sampling();
        let Some(cut) = sampling.cut(&wire, self.start_point, self.end_point) else {
            log::warn!("snede: begin en einde vallen samen");
            return Ok(());
        };
        let markers = (
            sampling.point(&wire, self.start_point),
            sampling.point(&wire, self.end_point),
        );
        if let (Some(start), Some(end)) = markers {
            ensure_point(doc, &mut self.start_marker, id, "StartPointObj", start)?;
            ensure_point(doc, &mut self.end_marker, id, "EndPointObj", end)?;
        }
        let cut_type = self.cut_type;
        for (side, name) in [(CutSide::Left, "Left"), (CutSide::Right, "Right")] {
            let points = cut.side(side).to_vec();
            let slot = self.slot(side);
            if cut_type.includes(side) && points.len() >= 2 {
                ensure_wire(doc, slot, id, name, points, false)?;
            } else {
                drop_child(doc, slot)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ObjectData;
    use crate::geom::{Point3, Tolerance};

    fn hexagon(doc: &mut Document) -> ObjectId {
        let points = (0..6)
            .map(|i| {
                let a = f64::from(i) * std::f64::consts::FRAC_PI_3;
                Point3::new(a.cos(), a.sin(), 0.0)
            })
            .collect();
        doc.add_wire("Hexagon", points, true)
    }

    fn link(doc: &Document, id: ObjectId, name: &str) -> Option<ObjectId> {
        doc.property(id, name).unwrap().expect_link().unwrap()
    }

    #[test]
    fn mid_edge_start_is_interpolated() {
        let mut doc = Document::new();
        let wire = hexagon(&mut doc);
        let id = doc.add_feature("CutWire", CutWire::new(Some(wire), 1.5, 3.0)).unwrap();
        doc.recompute().unwrap();

        let source = doc.wire(wire).unwrap().clone();
        let right = doc.wire(link(&doc, id, "Right").unwrap()).unwrap();
        let expected = source.points()[1].lerp(source.points()[2], 0.5);
        assert!(Tolerance::DEFAULT.approx_eq_point3(right.points()[0], expected));
        assert_eq!(right.points().last(), Some(&source.points()[3]));

        let marker = link(&doc, id, "StartPointObj").unwrap();
        match &doc.get(marker).unwrap().data {
            ObjectData::Point { point } => assert!(Tolerance::DEFAULT.approx_eq_point3(*point, expected)),
            other => panic!("verwacht punt, kreeg {other:?}"),
        }
    }

    #[test]
    fn cut_type_left_drops_right() {
        let mut doc = Document::new();
        let wire = hexagon(&mut doc);
        let id = doc.add_feature("CutWire", CutWire::new(Some(wire), 1.0, 3.0)).unwrap();
        doc.recompute().unwrap();
        let right = link(&doc, id, "Right").unwrap();
        doc.set_property(id, "CutType", PropertyValue::Enumeration("Left".into())).unwrap();
        doc.recompute().unwrap();
        assert!(!doc.contains(right));
        assert_eq!(doc.wire(link(&doc, id, "Left").unwrap()).unwrap().len(), 5);
    }

    #[test]
    fn coinciding_positions_keep_previous_result() {
        let mut doc = Document::new();
        let wire = hexagon(&mut doc);
        let id = doc.add_feature("CutWire", CutWire::new(Some(wire), 1.0, 3.0)).unwrap();
        doc.recompute().unwrap();
        let count = doc.object_count();
        let start = link(&doc, id, "StartPointObj").unwrap();
        let before = doc.get(start).unwrap().data.clone();

        doc.set_property(id, "EndPoint", PropertyValue::Number(1.0)).unwrap();
        doc.recompute().unwrap();
        assert_eq!(doc.object_count(), count);
        assert_eq!(doc.get(start).unwrap().data, before);
    }

    #[test]
    fn fresh_cut_with_coinciding_positions_adds_nothing() {
        let mut doc = Document::new();
        let wire = hexagon(&mut doc);
        let id = doc.add_feature("CutWire", CutWire::new(Some(wire), 1.0, 1.0)).unwrap();
        let count = doc.object_count();
        doc.recompute().unwrap();
        assert_eq!(doc.object_count(), count);
        assert!(link(&doc, id, "StartPointObj").is_none());
        assert!(link(&doc, id, "Left").is_none());
    }

    #[test]
    fn open_wire_cut_leaves_split_rest_out() {
        let mut doc = Document::new();
        let points = (0..4).map(|i| Point3::new(f64::from(i), 0.0, 0.0)).collect();
        let wire = doc.add_wire("Line", points, false);
        let id = doc.add_feature("CutWire", CutWire::new(Some(wire), 2.0, 1.0)).unwrap();
        doc.recompute().unwrap();
        let right = doc.wire(link(&doc, id, "Right").unwrap()).unwrap();
        assert_eq!(right.points(), &[Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)]);
        assert!(link(&doc, id, "Left").is_none());
    }

    #[test]
    fn locked_gap_moves_end_and_refuses_overflow() {
        let mut range = CutRange::new(1.0, 3.0, 6.0);
        range.lock_gap(true);
        assert!(range.set_start(2.5));
        assert_eq!((range.start(), range.end()), (2.5, 4.5));
        assert!(!range.set_start(4.5));
        assert_eq!((range.start(), range.end()), (2.5, 4.5));
        assert!(range.set_end(2.0));
        assert_eq!(range.start(), 0.0);
        assert!(!range.set_end(1.0));
    }

    #[test]
    fn unlocked_start_pushes_end() {
        let mut range = CutRange::new(1.0, 2.0, 6.0);
        assert!(range.set_start(3.0));
        assert_eq!(range.end(), 4.0);
        assert_eq!(range.gap(), 1.0);
        assert!(range.set_start(5.5));
        assert_eq!(range.end(), 6.0);
    }

    #[test]
    fn unlocked_end_pulls_start() {
        let mut range = CutRange::new(2.0, 4.0, 6.0);
        assert!(range.set_end(1.5));
        assert_eq!(range.start(), 0.5);
        assert!(range.set_end(0.5));
        assert_eq!(range.start(), 0.0);
        assert_eq!(range.gap(), 0.5);
    }

    #[test]
    fn range_round_trips_into_feature() {
        let mut doc = Document::new();
        let wire = hexagon(&mut doc);
        let mut cut = CutWire::new(Some(wire), 1.0, 2.0);
        let mut range = cut.range(&doc).unwrap();
        range.set_end(4.0);
        cut.apply_range(&range);
        assert_eq!(cut.property("EndPoint").unwrap(), PropertyValue::Number(4.0));
        assert_eq!(cut.property("StartPoint").unwrap(), PropertyValue::Number(1.0));
    }
}
