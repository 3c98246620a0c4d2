//! Section: een vlakke doorsnede van een lichaam evenwijdig aan XY, XZ of YZ.

use serde::Serialize;

use super::{Feature, FeatureError, FeatureResult, ensure_plane, link_value, present, sync_wires};
use crate::document::{Document, ObjectId, PropertyKind, PropertySpec, PropertyValue};
use crate::geom::{BBox, RefPlane, section_wires};

const PROPERTIES: &[PropertySpec] = &[
    PropertySpec::new("SlicedObject", PropertyKind::Link, "Section", "Solid to slice"),
    PropertySpec::new("RefPlane", PropertyKind::Enumeration, "Section", "Reference plane").choices(RefPlane::NAMES),
    PropertySpec::new("Offset", PropertyKind::Number, "Section", "Distance from the bbox minimum along the normal"),
    PropertySpec::new("Plane", PropertyKind::Link, "Section", "Cutting plane preview").read_only(),
    PropertySpec::new("Wires", PropertyKind::Integer, "Section", "Number of section loops").read_only(),
];

#[derive(Debug, Clone, Default, Serialize)]
pub struct Section {
    sliced_object: Option<ObjectId>,
    ref_plane: RefPlane,
    offset: f64,
    plane: Option<ObjectId>,
    wires: Vec<ObjectId>,
}

impl Section {
    #[must_use]
    pub fn new(sliced_object: Option<ObjectId>, ref_plane: RefPlane, offset: f64) -> Self {
        Self {
            sliced_object,
            ref_plane,
            offset,
            ..Self::default()
        }
    }

    /// Doorsnededraden van de laatste herberekening.
    #[must_use]
    pub fn wires(&self) -> &[ObjectId] {
        &self.wires
    }

    fn bbox(&self, doc: &Document) -> FeatureResult<Option<BBox>> {
        match self.sliced_object.filter(|id| doc.contains(*id)) {
            Some(id) => Ok(doc.shape(id)?.bbox()),
            None => Ok(None),
        }
    }

    /// Grootste zinvolle offset: de uitgestrektheid van de bbox langs de
    /// normaal van het referentievlak.
    pub fn offset_range(&self, doc: &Document) -> FeatureResult<f64> {
        Ok(self
            .bbox(doc)?
            .map_or(0.0, |bbox| self.ref_plane.offset_range(&bbox)))
    }

    /// Verplaatst enkel het voorbeeldvlak naar `offset`; er wordt niet
    /// gesneden en `Offset` blijft ongewijzigd.
    pub fn update_plane(&mut self, doc: &mut Document, owner: ObjectId, offset: f64) -> FeatureResult {
        let Some(bbox) = self.bbox(doc)? else {
            return Ok(());
        };
        ensure_plane(
            doc,
            &mut self.plane,
            owner,
            "SectionPlane",
            self.ref_plane.extents(&bbox),
            self.ref_plane.placement(&bbox, offset),
        )?;
        Ok(())
    }
}

impl Feature for Section {
    fn kind(&self) -> &'static str {
        "Section"
    }

    fn properties(&self) -> &'static [PropertySpec] {
        PROPERTIES
    }

    fn property(&self, name: &str) -> FeatureResult<PropertyValue> {
        let value = match name {
            "SlicedObject" => link_value(self.sliced_object),
            "RefPlane" => PropertyValue::Enumeration(self.ref_plane.name().to_owned()),
            "Offset" => PropertyValue::Number(self.offset),
            "Plane" => link_value(self.plane),
            "Wires" => PropertyValue::Integer(self.wires.len() as i64),
            _ => return Err(FeatureError::UnknownProperty(name.to_owned())),
        };
        Ok(value)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> FeatureResult {
        match name {
            "SlicedObject" => self.sliced_object = value.expect_link()?,
            "RefPlane" => {
                let choice = value.expect_enumeration()?;
                self.ref_plane = RefPlane::from_name(choice).ok_or_else(|| FeatureError::invalid(name, choice))?;
            }
            "Offset" => self.offset = value.expect_number()?,
            _ => return Err(FeatureError::UnknownProperty(name.to_owned())),
        }
        Ok(())
    }

    fn inputs(&self, _doc: &Document) -> Vec<ObjectId> {
        present(&[self.sliced_object])
    }

    fn outputs(&self, _doc: &Document) -> Vec<ObjectId> {
        let mut outputs = present(&[self.plane]);
        outputs.extend(self.wires.iter().copied());
        outputs
    }

    fn execute(&mut self, id: ObjectId, doc: &mut Document) -> FeatureResult {
        let Some(sliced) = self.sliced_object.filter(|sliced| doc.contains(*sliced)) else {
            log::debug!("doorsnede zonder object; niets te doen");
            return Ok(());
        };
        let shape = doc.shape(sliced)?;
        let Some(bbox) = shape.bbox() else {
            return Ok(());
        };
        self.update_plane(doc, id, self.offset)?;

        let loops = section_wires(&shape, &self.ref_plane.cutting_plane(&bbox, self.offset));
        log::debug!(
            "doorsnede van `{}` op {}: {} lus(sen)",
            doc.name_of(sliced),
            self.offset,
            loops.len()
        );
        sync_wires(doc, &mut self.wires, id, "SectionWire", loops)
    }
}
