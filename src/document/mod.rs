//! Het document: objecten, eigenaarschap, eigenschappen en afhankelijkheden.
//!
//! Het document speelt de rol van de CAD-omgeving waarin features leven. Het
//! bewaart draden en primitieve vaste lichamen, levert hun vormen in globale
//! coördinaten en houdt bij welke objecten sinds de laatste herberekening
//! gewijzigd zijn.

use std::collections::{BTreeMap, BTreeSet, HashMap};

pub mod object;
pub mod property;
pub mod recompute;
pub mod topo;

pub use object::{DocumentObject, ObjectData, ObjectId};
pub use property::{PropertyError, PropertyKind, PropertySpec, PropertyValue};
pub use recompute::{RecomputeError, RecomputeReport};
pub use topo::{Dependency, Topology, TopologyError};

use crate::features::{FeatureError, FeatureKind};
use crate::geom::{Placement, Point3, Polyline, Sampling, Shape, ShapeError, Vec3};

/// Fouten bij het opvragen of wijzigen van documentobjecten.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("object {0} bestaat niet in het document")]
    UnknownObject(ObjectId),
    #[error("geen object met naam `{0}`")]
    UnknownName(String),
    #[error("object `{name}` is geen draad")]
    NotAWire { name: String },
    #[error("object `{name}` is geen feature")]
    NotAFeature { name: String },
    #[error("object `{name}` heeft geen bronobject")]
    MissingSource { name: String },
    #[error("object `{name}` heeft geen eigenschap `{property}`")]
    UnknownProperty { name: String, property: String },
    #[error("eigenschap `{property}` van `{name}` is alleen-lezen")]
    ReadOnly { name: String, property: String },
    #[error("eigenschap `{property}` van `{name}`: {source}")]
    Property {
        name: String,
        property: String,
        #[source]
        source: PropertyError,
    },
    #[error("feature `{name}`: {source}")]
    Feature {
        name: String,
        #[source]
        source: Box<FeatureError>,
    },
    #[error("geometriefout: {0}")]
    Shape(#[from] ShapeError),
}

/// Container met alle objecten, features en wijzigingsmarkeringen.
#[derive(Debug, Default)]
pub struct Document {
    objects: BTreeMap<ObjectId, DocumentObject>,
    features: BTreeMap<ObjectId, FeatureKind>,
    name_index: HashMap<String, ObjectId>,
    touched: BTreeSet<ObjectId>,
    next_id: usize,
    sampling: Sampling,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── aanmaken ────────────────────────────────────────────────────────────

    /// Voegt een object toe onder een unieke naam afgeleid van `name`.
    pub fn add_object(&mut self, name: &str, data: ObjectData) -> ObjectId {
        let id = ObjectId::new(self.next_id);
        self.next_id += 1;
        let name = self.unique_name(name);
        self.name_index.insert(name.clone(), id);
        self.objects.insert(id, DocumentObject::new(id, name, data));
        self.touched.insert(id);
        id
    }

    pub fn add_wire(&mut self, name: &str, points: Vec<Point3>, closed: bool) -> ObjectId {
        self.add_object(name, ObjectData::Wire(Polyline::new(points, closed)))
    }

    pub fn add_point(&mut self, name: &str, point: Point3) -> ObjectId {
        self.add_object(name, ObjectData::Point { point })
    }

    pub fn add_box(&mut self, name: &str, length: f64, width: f64, height: f64) -> ObjectId {
        self.add_object(
            name,
            ObjectData::Box {
                length,
                width,
                height,
            },
        )
    }

    pub fn add_cylinder(&mut self, name: &str, radius: f64, height: f64) -> ObjectId {
        self.add_object(name, ObjectData::Cylinder { radius, height })
    }

    pub fn add_extrusion(
        &mut self,
        name: &str,
        base: ObjectId,
        direction: Vec3,
        length_fwd: f64,
    ) -> ObjectId {
        self.add_object(
            name,
            ObjectData::Extrusion {
                base: Some(base),
                direction,
                length_fwd,
            },
        )
    }

    pub fn add_pad(&mut self, name: &str, sketch: ObjectId, length: f64) -> ObjectId {
        self.add_object(
            name,
            ObjectData::Pad {
                sketch: Some(sketch),
                length,
            },
        )
    }

    pub fn add_loft(&mut self, name: &str, sections: Vec<ObjectId>, solid: bool) -> ObjectId {
        self.add_object(
            name,
            ObjectData::Loft {
                sections,
                solid,
                ruled: false,
            },
        )
    }

    pub fn add_plane(&mut self, name: &str, length: f64, width: f64) -> ObjectId {
        self.add_object(name, ObjectData::Plane { length, width })
    }

    /// Voegt een feature toe en laat het zijn eigen kindobjecten aanmaken.
    pub fn add_feature(
        &mut self,
        name: &str,
        feature: impl Into<FeatureKind>,
    ) -> Result<ObjectId, DocumentError> {
        let id = self.add_object(name, ObjectData::Feature);
        self.features.insert(id, feature.into());
        self.with_feature(id, |feature, doc| feature.as_feature_mut().attach(id, doc))?
            .map_err(|source| self.feature_error(id, source))?;
        Ok(id)
    }

    fn unique_name(&self, base: &str) -> String {
        let base = if base.is_empty() { "Object" } else { base };
        if !self.name_index.contains_key(base) {
            return base.to_owned();
        }
        (1..)
            .map(|n| format!("{base}{n:03}"))
            .find(|candidate| !self.name_index.contains_key(candidate))
            .unwrap_or_else(|| base.to_owned())
    }

    // ── opvragen ────────────────────────────────────────────────────────────

    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&DocumentObject> {
        self.objects.get(&id)
    }

    pub fn get(&self, id: ObjectId) -> Result<&DocumentObject, DocumentError> {
        self.objects.get(&id).ok_or(DocumentError::UnknownObject(id))
    }

    fn get_mut(&mut self, id: ObjectId) -> Result<&mut DocumentObject, DocumentError> {
        self.objects
            .get_mut(&id)
            .ok_or(DocumentError::UnknownObject(id))
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn object_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.keys().copied()
    }

    pub fn objects(&self) -> impl Iterator<Item = &DocumentObject> {
        self.objects.values()
    }

    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<ObjectId> {
        self.name_index.get(name).copied()
    }

    /// Naam van het object, of het id als het niet (meer) bestaat.
    #[must_use]
    pub fn name_of(&self, id: ObjectId) -> String {
        self.objects
            .get(&id)
            .map_or_else(|| id.to_string(), |obj| obj.name.clone())
    }

    #[must_use]
    pub fn feature(&self, id: ObjectId) -> Option<&FeatureKind> {
        self.features.get(&id)
    }

    pub fn feature_mut(&mut self, id: ObjectId) -> Option<&mut FeatureKind> {
        self.features.get_mut(&id)
    }

    pub fn features(&self) -> impl Iterator<Item = (ObjectId, &FeatureKind)> {
        self.features.iter().map(|(id, feature)| (*id, feature))
    }

    /// Haalt een feature tijdelijk uit het document zodat het het document
    /// zelf kan wijzigen, en zet het daarna terug.
    pub fn with_feature<R>(
        &mut self,
        id: ObjectId,
        f: impl FnOnce(&mut FeatureKind, &mut Document) -> R,
    ) -> Result<R, DocumentError> {
        let mut feature = self
            .features
            .remove(&id)
            .ok_or_else(|| DocumentError::NotAFeature {
                name: self.name_of(id),
            })?;
        let result = f(&mut feature, self);
        if self.objects.contains_key(&id) {
            self.features.insert(id, feature);
        }
        Ok(result)
    }

    pub(crate) fn feature_error(&self, id: ObjectId, source: FeatureError) -> DocumentError {
        DocumentError::Feature {
            name: self.name_of(id),
            source: Box::new(source),
        }
    }

    // ── eigenaarschap ───────────────────────────────────────────────────────

    pub fn set_owner(&mut self, child: ObjectId, owner: ObjectId) -> Result<(), DocumentError> {
        self.get(owner)?;
        self.get_mut(child)?.owner = Some(owner);
        Ok(())
    }

    /// Directe kinderen van `owner`, in id-volgorde.
    #[must_use]
    pub fn children(&self, owner: ObjectId) -> Vec<ObjectId> {
        self.objects
            .values()
            .filter(|obj| obj.owner == Some(owner))
            .map(|obj| obj.id)
            .collect()
    }

    /// Verwijdert `id` en, recursief, alle objecten die het bezit. Features
    /// die een verwijderd object als invoer gebruikten worden gemarkeerd.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<Vec<ObjectId>, DocumentError> {
        self.get(id)?;
        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if removed.contains(&current) {
                continue;
            }
            removed.push(current);
            stack.extend(self.children(current));
        }

        let dependents: Vec<ObjectId> = self
            .features
            .iter()
            .filter(|(fid, feature)| {
                !removed.contains(fid)
                    && feature
                        .as_feature()
                        .inputs(self)
                        .iter()
                        .any(|input| removed.contains(input))
            })
            .map(|(fid, _)| *fid)
            .collect();

        for gone in &removed {
            if let Some(obj) = self.objects.remove(gone) {
                self.name_index.remove(&obj.name);
            }
            self.features.remove(gone);
            self.touched.remove(gone);
        }
        self.touched.extend(dependents);
        log::debug!("{} object(en) verwijderd", removed.len());
        Ok(removed)
    }

    // ── plaatsing en draden ─────────────────────────────────────────────────

    pub fn placement(&self, id: ObjectId) -> Result<Placement, DocumentError> {
        Ok(self.get(id)?.placement)
    }

    /// Zet de plaatsing en markeert het object als gewijzigd.
    pub fn set_placement(&mut self, id: ObjectId, placement: Placement) -> Result<(), DocumentError> {
        self.write_placement(id, placement)?;
        self.touched.insert(id);
        Ok(())
    }

    /// Zet de plaatsing zonder markering; bedoeld voor features die hun
    /// uitvoer schrijven.
    pub(crate) fn write_placement(
        &mut self,
        id: ObjectId,
        placement: Placement,
    ) -> Result<(), DocumentError> {
        self.get_mut(id)?.placement = placement;
        Ok(())
    }

    pub fn set_label(&mut self, id: ObjectId, label: &str) -> Result<(), DocumentError> {
        self.get_mut(id)?.label = label.to_owned();
        Ok(())
    }

    /// Draad in lokale coördinaten.
    pub fn wire(&self, id: ObjectId) -> Result<&Polyline, DocumentError> {
        let obj = self.get(id)?;
        obj.data.as_wire().ok_or_else(|| DocumentError::NotAWire {
            name: obj.name.clone(),
        })
    }

    /// Draad in globale coördinaten.
    pub fn global_wire(&self, id: ObjectId) -> Result<Polyline, DocumentError> {
        let placement = self.placement(id)?;
        Ok(self.wire(id)?.transformed(&placement))
    }

    /// Vervangt de punten van een draad. Elke lengte is toegestaan.
    pub fn set_wire_points(&mut self, id: ObjectId, points: Vec<Point3>) -> Result<(), DocumentError> {
        self.write_wire_points(id, points)?;
        self.touched.insert(id);
        Ok(())
    }

    pub(crate) fn write_wire_points(
        &mut self,
        id: ObjectId,
        points: Vec<Point3>,
    ) -> Result<(), DocumentError> {
        let obj = self.get_mut(id)?;
        match &mut obj.data {
            ObjectData::Wire(wire) => {
                wire.set_points(points);
                Ok(())
            }
            _ => Err(DocumentError::NotAWire {
                name: obj.name.clone(),
            }),
        }
    }

    pub(crate) fn write_data(
        &mut self,
        id: ObjectId,
        update: impl FnOnce(&mut ObjectData),
    ) -> Result<(), DocumentError> {
        update(&mut self.get_mut(id)?.data);
        Ok(())
    }

    // ── vormen ──────────────────────────────────────────────────────────────

    /// Vorm van het object in globale coördinaten. Features en punten hebben
    /// een lege vorm.
    pub fn shape(&self, id: ObjectId) -> Result<Shape, DocumentError> {
        let obj = self.get(id)?;
        let placement = obj.placement;
        let missing = || DocumentError::MissingSource {
            name: obj.name.clone(),
        };
        let shape = match &obj.data {
            ObjectData::Wire(wire) => Shape::from_polyline(&wire.transformed(&placement)),
            ObjectData::Point { .. } | ObjectData::Feature => Shape::default(),
            ObjectData::Box {
                length,
                width,
                height,
            } => Shape::make_box(*length, *width, *height)?.transformed(&placement),
            ObjectData::Cylinder { radius, height } => {
                Shape::make_cylinder(*radius, *height)?.transformed(&placement)
            }
            ObjectData::Extrusion {
                base,
                direction,
                length_fwd,
            } => {
                let profile = self.global_wire(base.ok_or_else(missing)?)?;
                let vector = if *length_fwd > 0.0 {
                    direction.normalized().ok_or(ShapeError::InvalidDirection)? * *length_fwd
                } else {
                    *direction
                };
                Shape::make_prism(&profile, vector)?.transformed(&placement)
            }
            ObjectData::Pad { sketch, length } => {
                let sketch = sketch.ok_or_else(missing)?;
                let normal = self.placement(sketch)?.apply_vec(Vec3::Z);
                Shape::make_prism(&self.global_wire(sketch)?, normal * *length)?
            }
            ObjectData::Loft {
                sections, solid, ..
            } => {
                let wires = sections
                    .iter()
                    .map(|section| self.global_wire(*section))
                    .collect::<Result<Vec<_>, _>>()?;
                Shape::make_loft(&wires, *solid)?.transformed(&placement)
            }
            ObjectData::Plane { length, width } => {
                Shape::make_plane(*length, *width)?.transformed(&placement)
            }
        };
        Ok(shape)
    }

    // ── eigenschappen ───────────────────────────────────────────────────────

    /// Leest een eigenschap van een feature of primitief.
    pub fn property(&self, id: ObjectId, name: &str) -> Result<PropertyValue, DocumentError> {
        let obj = self.get(id)?;
        match name {
            "Label" => return Ok(PropertyValue::Text(obj.label.clone())),
            "Placement" => return Ok(PropertyValue::Placement(obj.placement)),
            _ => {}
        }
        if let Some(feature) = self.features.get(&id) {
            return feature
                .as_feature()
                .property(name)
                .map_err(|source| self.feature_error(id, source));
        }
        primitive_property(&obj.data, name).ok_or_else(|| DocumentError::UnknownProperty {
            name: obj.name.clone(),
            property: name.to_owned(),
        })
    }

    /// Wijzigt een eigenschap en markeert het object voor herberekening.
    pub fn set_property(
        &mut self,
        id: ObjectId,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), DocumentError> {
        match name {
            "Label" => {
                let label = value.expect_text().map_err(|source| self.property_error(id, name, source))?;
                let label = label.to_owned();
                return self.set_label(id, &label);
            }
            "Placement" => {
                let placement = value
                    .expect_placement()
                    .map_err(|source| self.property_error(id, name, source))?;
                return self.set_placement(id, placement);
            }
            _ => {}
        }
        if self.features.contains_key(&id) {
            self.with_feature(id, |feature, _| crate::features::assign(feature, name, value))?
                .map_err(|source| self.feature_error(id, source))?;
        } else {
            self.write_property(id, name, value)?;
        }
        self.touched.insert(id);
        Ok(())
    }

    /// Schrijft een eigenschap van een primitief zonder markering.
    pub(crate) fn write_property(
        &mut self,
        id: ObjectId,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), DocumentError> {
        let obj = self.get(id)?;
        let object_name = obj.name.clone();
        let mut data = obj.data.clone();
        match assign_primitive(&mut data, name, &value) {
            Ok(true) => {
                self.get_mut(id)?.data = data;
                Ok(())
            }
            Ok(false) => Err(DocumentError::UnknownProperty {
                name: object_name,
                property: name.to_owned(),
            }),
            Err(source) => Err(DocumentError::Property {
                name: object_name,
                property: name.to_owned(),
                source,
            }),
        }
    }

    fn property_error(&self, id: ObjectId, property: &str, source: PropertyError) -> DocumentError {
        DocumentError::Property {
            name: self.name_of(id),
            property: property.to_owned(),
            source,
        }
    }

    /// Zoekt een link op: `Naam` of `Naam.Eigenschap`, waarbij de tweede vorm
    /// de link-uitvoer van een feature volgt (bv. `RootProfile.Wire`).
    pub fn resolve_link(&self, text: &str) -> Result<Option<ObjectId>, DocumentError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        match text.split_once('.') {
            Some((name, property)) => {
                let id = self
                    .by_name(name)
                    .ok_or_else(|| DocumentError::UnknownName(name.to_owned()))?;
                let value = self.property(id, property)?;
                value
                    .expect_link()
                    .map_err(|source| self.property_error(id, property, source))
            }
            None => self
                .by_name(text)
                .map(Some)
                .ok_or_else(|| DocumentError::UnknownName(text.to_owned())),
        }
    }

    // ── markeringen en afhankelijkheden ─────────────────────────────────────

    pub fn touch(&mut self, id: ObjectId) -> Result<(), DocumentError> {
        self.get(id)?;
        self.touched.insert(id);
        Ok(())
    }

    /// Randdiscretisatie waarmee features parametrische posities oplossen.
    #[must_use]
    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    /// Wijzigt de discretisatie en markeert alle features als gewijzigd.
    pub fn set_sampling(&mut self, sampling: Sampling) {
        if sampling == self.sampling {
            return;
        }
        self.sampling = sampling;
        self.touched.extend(self.features.keys().copied());
    }

    #[must_use]
    pub fn is_touched(&self, id: ObjectId) -> bool {
        self.touched.contains(&id)
    }

    #[must_use]
    pub fn touched(&self) -> &BTreeSet<ObjectId> {
        &self.touched
    }

    /// Alle afhankelijkheden: bronnen van primitieven, invoer van features
    /// en de objecten waarin features hun uitvoer schrijven.
    #[must_use]
    pub fn dependencies(&self) -> Vec<Dependency> {
        let mut deps = Vec::new();
        for (id, obj) in &self.objects {
            deps.extend(obj.data.sources().into_iter().map(|src| Dependency::new(src, *id)));
        }
        for (id, feature) in &self.features {
            let feature = feature.as_feature();
            deps.extend(feature.inputs(self).into_iter().map(|input| Dependency::new(input, *id)));
            deps.extend(feature.outputs(self).into_iter().map(|output| Dependency::new(*id, output)));
        }
        deps.retain(|dep| self.objects.contains_key(&dep.from) && self.objects.contains_key(&dep.to));
        deps
    }
}

/// Eigenschappen van primitieve objecten.
fn primitive_property(data: &ObjectData, name: &str) -> Option<PropertyValue> {
    let number = PropertyValue::Number;
    let value = match (data, name) {
        (ObjectData::Wire(wire), "Points") => {
            PropertyValue::VectorList(wire.points().iter().map(|p| p.to_vec3()).collect())
        }
        (ObjectData::Wire(wire), "Closed") => PropertyValue::Boolean(wire.is_closed()),
        (ObjectData::Point { point }, "Point") => PropertyValue::Vector(point.to_vec3()),
        (ObjectData::Box { length, .. }, "Length") => number(*length),
        (ObjectData::Box { width, .. }, "Width") => number(*width),
        (ObjectData::Box { height, .. }, "Height") => number(*height),
        (ObjectData::Cylinder { radius, .. }, "Radius") => number(*radius),
        (ObjectData::Cylinder { height, .. }, "Height") => number(*height),
        (ObjectData::Extrusion { base, .. }, "Base") => PropertyValue::Link(*base),
        (ObjectData::Extrusion { direction, .. }, "Dir") => PropertyValue::Vector(*direction),
        (ObjectData::Extrusion { length_fwd, .. }, "LengthFwd") => number(*length_fwd),
        (ObjectData::Pad { sketch, .. }, "Sketch") => PropertyValue::Link(*sketch),
        (ObjectData::Pad { length, .. }, "Length") => number(*length),
        (ObjectData::Loft { solid, .. }, "Solid") => PropertyValue::Boolean(*solid),
        (ObjectData::Loft { ruled, .. }, "Ruled") => PropertyValue::Boolean(*ruled),
        (ObjectData::Plane { length, .. }, "Length") => number(*length),
        (ObjectData::Plane { width, .. }, "Width") => number(*width),
        _ => return None,
    };
    Some(value)
}

/// Past een eigenschap van een primitief aan. `Ok(false)` als de eigenschap
/// niet bestaat.
fn assign_primitive(
    data: &mut ObjectData,
    name: &str,
    value: &PropertyValue,
) -> Result<bool, PropertyError> {
    match (data, name) {
        (ObjectData::Wire(wire), "Points") => {
            let points = value.expect_vector_list()?.iter().map(|v| Point3::from(*v)).collect();
            wire.set_points(points);
        }
        (ObjectData::Wire(wire), "Closed") => {
            let points = wire.points().to_vec();
            *wire = Polyline::new(points, value.expect_boolean()?);
        }
        (ObjectData::Point { point }, "Point") => *point = Point3::from(value.expect_vector()?),
        (ObjectData::Box { length, .. }, "Length")
        | (ObjectData::Pad { length, .. }, "Length")
        | (ObjectData::Plane { length, .. }, "Length") => *length = value.expect_number()?,
        (ObjectData::Box { width, .. }, "Width") | (ObjectData::Plane { width, .. }, "Width") => {
            *width = value.expect_number()?;
        }
        (ObjectData::Box { height, .. }, "Height")
        | (ObjectData::Cylinder { height, .. }, "Height") => *height = value.expect_number()?,
        (ObjectData::Cylinder { radius, .. }, "Radius") => *radius = value.expect_number()?,
        (ObjectData::Extrusion { base, .. }, "Base") => *base = value.expect_link()?,
        (ObjectData::Extrusion { direction, .. }, "Dir") => *direction = value.expect_vector()?,
        (ObjectData::Extrusion { length_fwd, .. }, "LengthFwd") => {
            *length_fwd = value.expect_number()?;
        }
        (ObjectData::Pad { sketch, .. }, "Sketch") => *sketch = value.expect_link()?,
        (ObjectData::Loft { solid, .. }, "Solid") => *solid = value.expect_boolean()?,
        (ObjectData::Loft { ruled, .. }, "Ruled") => *ruled = value.expect_boolean()?,
        _ => return Ok(false),
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let mut doc = Document::new();
        let a = doc.add_wire("Wire", Vec::new(), true);
        let b = doc.add_wire("Wire", Vec::new(), true);
        let c = doc.add_wire("Wire", Vec::new(), true);
        assert_eq!(doc.get(a).unwrap().name, "Wire");
        assert_eq!(doc.get(b).unwrap().name, "Wire001");
        assert_eq!(doc.get(c).unwrap().name, "Wire002");
        assert_eq!(doc.by_name("Wire001"), Some(b));
    }

    #[test]
    fn remove_object_removes_owned_children() {
        let mut doc = Document::new();
        let parent = doc.add_box("Box", 1.0, 1.0, 1.0);
        let child = doc.add_wire("Wire", Vec::new(), false);
        let grandchild = doc.add_point("Point", Point3::ORIGIN);
        let other = doc.add_point("Point", Point3::ORIGIN);
        doc.set_owner(child, parent).unwrap();
        doc.set_owner(grandchild, child).unwrap();

        let removed = doc.remove_object(parent).unwrap();
        assert_eq!(removed.len(), 3);
        assert!(!doc.contains(child));
        assert!(!doc.contains(grandchild));
        assert!(doc.contains(other));
        assert_eq!(doc.by_name("Box"), None);
    }

    #[test]
    fn primitive_properties_round_trip() {
        let mut doc = Document::new();
        let id = doc.add_box("Box", 3.0, 3.0, 520.0);
        assert_eq!(doc.property(id, "Height").unwrap(), PropertyValue::Number(520.0));
        doc.set_property(id, "Height", PropertyValue::Number(12.0)).unwrap();
        assert_eq!(doc.property(id, "Height").unwrap(), PropertyValue::Number(12.0));
        assert!(matches!(
            doc.set_property(id, "Radius", PropertyValue::Number(1.0)),
            Err(DocumentError::UnknownProperty { .. })
        ));
        assert!(matches!(
            doc.set_property(id, "Height", PropertyValue::Boolean(true)),
            Err(DocumentError::Property { .. })
        ));
    }

    #[test]
    fn internal_writes_do_not_touch() {
        let mut doc = Document::new();
        let id = doc.add_wire("Wire", vec![Point3::ORIGIN], false);
        doc.touched.clear();
        doc.write_placement(id, Placement::translation(Vec3::X)).unwrap();
        assert!(!doc.is_touched(id));
        doc.set_placement(id, Placement::IDENTITY).unwrap();
        assert!(doc.is_touched(id));
    }

    #[test]
    fn shapes_are_global() {
        let mut doc = Document::new();
        let id = doc.add_box("Box", 1.0, 2.0, 3.0);
        doc.set_placement(id, Placement::translation(Vec3::new(10.0, 0.0, 0.0)))
            .unwrap();
        let bbox = doc.shape(id).unwrap().bbox().unwrap();
        assert_eq!(bbox.min, Point3::new(10.0, 0.0, 0.0));
        assert_eq!(bbox.max, Point3::new(11.0, 2.0, 3.0));
    }

    #[test]
    fn pad_follows_sketch_placement() {
        let mut doc = Document::new();
        let sketch = doc.add_wire(
            "Sketch",
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            true,
        );
        let pad = doc.add_pad("Pad", sketch, 4.0);
        doc.set_placement(sketch, Placement::translation(Vec3::new(0.0, 0.0, 2.0)))
            .unwrap();
        let bbox = doc.shape(pad).unwrap().bbox().unwrap();
        assert_eq!(bbox.min.z, 2.0);
        assert_eq!(bbox.max.z, 6.0);
    }

    #[test]
    fn resolve_link_by_name() {
        let mut doc = Document::new();
        let id = doc.add_box("Spar", 1.0, 1.0, 1.0);
        assert_eq!(doc.resolve_link("Spar").unwrap(), Some(id));
        assert_eq!(doc.resolve_link("").unwrap(), None);
        assert!(matches!(
            doc.resolve_link("Onbekend"),
            Err(DocumentError::UnknownName(_))
        ));
    }
}
