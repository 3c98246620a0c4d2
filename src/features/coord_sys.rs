//! CoordSys: een lokaal assenstelsel op de rand van een gekoppeld lichaam.
//!
//! Het assenstelsel bestaat uit drie kinddraden (Tangent, Normal, Bend). De
//! feature verankert het gekoppelde object aan die assen: het gekozen punt
//! op het referentievlak komt op de oorsprong van de Tangent-as te liggen en
//! de buigrichting (of de randtangent) wordt uitgelijnd op de bijhorende as.
//!
//! Dit is het enige geval waarin een feature de plaatsing van een object
//! wijzigt dat het niet bezit. [`CoordSys::apply_frame_to`] doet dat
//! expliciet; het document legt voor die schrijfactie geen afhankelijkheid
//! vast.

use serde::Serialize;

use super::{Feature, FeatureError, FeatureResult, ensure_wire, link_value, present};
use crate::document::{Document, ObjectData, ObjectId, PropertyKind, PropertySpec, PropertyValue};
use crate::geom::{Edge, Face, Placement, Point3, Rotation, Shape, Vec3};

const CENTER_TYPES: &[&str] = &["MassCenter", "Vertexes"];
const DIRECTIONS: &[&str] = &["Edge", "CenterOfMass"];

const PROPERTIES: &[PropertySpec] = &[
    PropertySpec::new("LinkedObject", PropertyKind::Link, "CoordSys", "Object anchored to the frame"),
    PropertySpec::new("CenterType", PropertyKind::Enumeration, "CoordSys", "Either center of mass or vertexes")
        .choices(CENTER_TYPES),
    PropertySpec::new("VertexNum", PropertyKind::Number, "CoordSys", "Vertex or intermediate point on the reference face"),
    PropertySpec::new("Direction", PropertyKind::Enumeration, "CoordSys", "Align the edge tangent or the bend vector")
        .choices(DIRECTIONS),
    PropertySpec::new("Angle", PropertyKind::Number, "CoordSys", "Extra rotation about the normal axis (degrees)"),
    PropertySpec::new("Tangent", PropertyKind::Link, "CoordSys", "Axis tangent to an edge").read_only().hidden(),
    PropertySpec::new("Normal", PropertyKind::Link, "CoordSys", "Normal of the reference face").read_only().hidden(),
    PropertySpec::new("Bend", PropertyKind::Link, "CoordSys", "Bend axis").read_only().hidden(),
    PropertySpec::new("LocalPlacement", PropertyKind::Placement, "CoordSys", "Placement from the reset object to the frame")
        .read_only(),
    PropertySpec::new("ObjectOk", PropertyKind::Boolean, "CoordSys", "Linked object has a known reference face")
        .read_only(),
];

/// Ankerpunt van het assenstelsel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum CenterType {
    MassCenter,
    #[default]
    Vertexes,
}

impl CenterType {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::MassCenter => "MassCenter",
            Self::Vertexes => "Vertexes",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "MassCenter" => Some(Self::MassCenter),
            "Vertexes" => Some(Self::Vertexes),
            _ => None,
        }
    }
}

/// Welke richting op een as uitgelijnd wordt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum FrameDirection {
    /// De tangent van de rand aan de Tangent-as (enkel bij `Vertexes`).
    Edge,
    /// De buigvector aan de Bend-as.
    #[default]
    CenterOfMass,
}

impl FrameDirection {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Edge => "Edge",
            Self::CenterOfMass => "CenterOfMass",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Edge" => Some(Self::Edge),
            "CenterOfMass" => Some(Self::CenterOfMass),
            _ => None,
        }
    }
}

/// Referentievlak van het gekoppelde object.
#[derive(Debug, Clone)]
struct ReferenceFace {
    edges: Vec<Edge>,
    center_of_mass: Point3,
    origin: Point3,
}

/// De drie assen in globale coördinaten.
#[derive(Debug, Clone, Copy)]
struct Axes {
    origin: Point3,
    tangent: Vec3,
    normal: Vec3,
    bend: Vec3,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoordSys {
    linked_object: Option<ObjectId>,
    center_type: CenterType,
    vertex_num: f64,
    direction: FrameDirection,
    angle: f64,
    tangent: Option<ObjectId>,
    normal: Option<ObjectId>,
    bend: Option<ObjectId>,
    local_placement: Placement,
    local_origin: Point3,
    object_ok: bool,
}

impl Default for CoordSys {
    fn default() -> Self {
        Self {
            linked_object: None,
            center_type: CenterType::default(),
            vertex_num: 0.0,
            direction: FrameDirection::default(),
            angle: 0.0,
            tangent: None,
            normal: None,
            bend: None,
            local_placement: Placement::IDENTITY,
            local_origin: Point3::ORIGIN,
            object_ok: false,
        }
    }
}

impl CoordSys {
    #[must_use]
    pub fn new(linked_object: Option<ObjectId>) -> Self {
        Self {
            linked_object,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn linked_object(&self) -> Option<ObjectId> {
        self.linked_object
    }

    pub fn set_linked_object(&mut self, linked_object: Option<ObjectId>) {
        self.linked_object = linked_object;
    }

    #[must_use]
    pub fn object_ok(&self) -> bool {
        self.object_ok
    }

    #[must_use]
    pub fn local_placement(&self) -> Placement {
        self.local_placement
    }

    /// De drie asdraden (Tangent, Normal, Bend) zodra ze bestaan.
    #[must_use]
    pub fn axis_wires(&self) -> Vec<ObjectId> {
        present(&[self.tangent, self.normal, self.bend])
    }

    /// Plaatsing van de Tangent-as.
    pub fn tangent_placement(&self, doc: &Document) -> FeatureResult<Placement> {
        match self.tangent {
            Some(id) => Ok(doc.placement(id)?),
            None => Ok(Placement::IDENTITY),
        }
    }

    /// Begin- en eindpunt van de Tangent-as in globale coördinaten.
    pub fn tangent_segment(&self, doc: &Document) -> FeatureResult<(Point3, Point3)> {
        let axes = self.axes(doc)?;
        Ok((axes.origin, axes.origin + axes.tangent))
    }

    fn axes(&self, doc: &Document) -> FeatureResult<Axes> {
        let segment = |id: Option<ObjectId>, fallback: Vec3| -> FeatureResult<(Point3, Vec3)> {
            let Some(id) = id else {
                return Ok((Point3::ORIGIN, fallback));
            };
            let wire = doc.global_wire(id)?;
            match wire.points() {
                [start, end, ..] => Ok((*start, *end - *start)),
                _ => Ok((Point3::ORIGIN, fallback)),
            }
        };
        let (origin, tangent) = segment(self.tangent, Vec3::X * 2.0)?;
        let (_, normal) = segment(self.normal, Vec3::Z * 2.0)?;
        let (_, bend) = segment(self.bend, Vec3::Y * 2.0)?;
        Ok(Axes {
            origin,
            tangent,
            normal,
            bend,
        })
    }

    /// Zet alle drie de assen op `placement` en verankert het gekoppelde
    /// object opnieuw.
    pub fn update_axis(&mut self, doc: &mut Document, placement: Placement) -> FeatureResult {
        for axis in self.axis_wires() {
            doc.write_placement(axis, placement)?;
        }
        self.apply_frame_to(doc)
    }

    /// Herberekent het lokale assenstelsel en schrijft de plaatsing van het
    /// gekoppelde object (of de schets van een Pad).
    ///
    /// Het object wordt eerst teruggezet op de plaatsing van de Tangent-as,
    /// zodat herhaalde oproepen hetzelfde resultaat geven. Objecttypes zonder
    /// referentievlak worden genegeerd en laten `ObjectOk` op `false`.
    pub fn apply_frame_to(&mut self, doc: &mut Document) -> FeatureResult {
        self.object_ok = false;
        let Some(target) = self.linked_object.filter(|id| doc.contains(*id)) else {
            return Ok(());
        };
        let Some(moved) = placement_target(doc, target)? else {
            log::debug!(
                "assenstelsel: `{}` heeft geen referentievlak",
                doc.name_of(target)
            );
            return Ok(());
        };

        let reset = self.tangent_placement(doc)?;
        doc.write_placement(moved, reset)?;

        let Some(face) = reference_face(doc, target)? else {
            return Ok(());
        };
        if face.edges.is_empty() {
            return Ok(());
        }

        let count = face.edges.len();
        let whole = self.vertex_num.floor();
        let index = (whole as i64).rem_euclid(count as i64) as usize;
        let fraction = ((self.vertex_num - whole) * 100.0).round() / 100.0;
        let edge = &face.edges[index];
        let point = if fraction > 0.0 {
            edge.value_at_fraction(fraction)
        } else {
            edge.first_vertex()
        };

        let (origin, bend) = match self.center_type {
            CenterType::MassCenter => (face.center_of_mass, point - face.center_of_mass),
            CenterType::Vertexes => (point, face.center_of_mass - point),
        };

        let axes = self.axes(doc)?;
        let rotation = match (self.center_type, self.direction) {
            (CenterType::Vertexes, FrameDirection::Edge) => {
                Rotation::between(edge.tangent_at_fraction(fraction), axes.tangent)
            }
            _ => Rotation::between(bend, axes.bend),
        };

        let translation = face.origin - origin;
        let mut local = Placement::with_center(translation, rotation, origin.to_vec3());
        if self.angle != 0.0 {
            let turn = Placement::with_center(
                Vec3::ZERO,
                Rotation::from_axis_degrees(axes.normal, self.angle),
                axes.origin.to_vec3(),
            );
            local = turn.multiply(local);
        }

        doc.write_placement(moved, local.multiply(reset))?;
        self.local_placement = local;
        self.local_origin = origin;
        self.object_ok = true;
        Ok(())
    }
}

/// Het object waarvan de plaatsing verandert: de schets voor een Pad,
/// anders het object zelf. `None` voor types zonder referentievlak.
fn placement_target(doc: &Document, target: ObjectId) -> FeatureResult<Option<ObjectId>> {
    let moved = match &doc.get(target)?.data {
        ObjectData::Box { .. } | ObjectData::Cylinder { .. } | ObjectData::Extrusion { .. } => {
            Some(target)
        }
        ObjectData::Pad { sketch, .. } => *sketch,
        _ => None,
    };
    Ok(moved)
}

fn face_of(shape: &Shape, index: usize, origin: Option<Point3>) -> Option<ReferenceFace> {
    let face = shape.faces.get(index)?;
    let center_of_mass = face.center_of_mass()?;
    Some(ReferenceFace {
        edges: face.edges.clone(),
        center_of_mass,
        origin: origin.unwrap_or(center_of_mass),
    })
}

/// Referentievlak per objecttype, in globale coördinaten.
fn reference_face(doc: &Document, target: ObjectId) -> FeatureResult<Option<ReferenceFace>> {
    let obj = doc.get(target)?;
    let base = Point3::from(obj.placement.base);
    let face = match &obj.data {
        ObjectData::Box { .. } => face_of(&doc.shape(target)?, 4, Some(base)),
        ObjectData::Cylinder { .. } => face_of(&doc.shape(target)?, 2, None),
        ObjectData::Extrusion { base: profile, .. } => {
            let Some(profile) = profile else {
                return Ok(None);
            };
            let nb = doc.wire(*profile)?.edge_count();
            face_of(&doc.shape(target)?, nb + 1, Some(base))
        }
        ObjectData::Pad { sketch, .. } => {
            let Some(sketch) = sketch else {
                return Ok(None);
            };
            let wire = doc.global_wire(*sketch)?;
            let origin = Point3::from(doc.placement(*sketch)?.base);
            let edges = Shape::from_polyline(&wire).edges;
            Face::polygon(wire.points())
                .center_of_mass()
                .map(|center_of_mass| ReferenceFace {
                    edges,
                    center_of_mass,
                    origin,
                })
        }
        _ => None,
    };
    Ok(face)
}

impl Feature for CoordSys {
    fn kind(&self) -> &'static str {
        "CoordSys"
    }

    fn properties(&self) -> &'static [PropertySpec] {
        PROPERTIES
    }

    fn property(&self, name: &str) -> FeatureResult<PropertyValue> {
        let value = match name {
            "LinkedObject" => link_value(self.linked_object),
            "CenterType" => PropertyValue::Enumeration(self.center_type.name().to_owned()),
            "VertexNum" => PropertyValue::Number(self.vertex_num),
            "Direction" => PropertyValue::Enumeration(self.direction.name().to_owned()),
            "Angle" => PropertyValue::Number(self.angle),
            "Tangent" => link_value(self.tangent),
            "Normal" => link_value(self.normal),
            "Bend" => link_value(self.bend),
            "LocalPlacement" => PropertyValue::Placement(self.local_placement),
            "ObjectOk" => PropertyValue::Boolean(self.object_ok),
            _ => return Err(FeatureError::UnknownProperty(name.to_owned())),
        };
        Ok(value)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> FeatureResult {
        match name {
            "LinkedObject" => self.linked_object = value.expect_link()?,
            "CenterType" => {
                let choice = value.expect_enumeration()?;
                self.center_type = CenterType::from_name(choice)
                    .ok_or_else(|| FeatureError::invalid(name, choice))?;
            }
            "VertexNum" => self.vertex_num = value.expect_number()?,
            "Direction" => {
                let choice = value.expect_enumeration()?;
                self.direction = FrameDirection::from_name(choice)
                    .ok_or_else(|| FeatureError::invalid(name, choice))?;
            }
            "Angle" => self.angle = value.expect_number()?,
            _ => return Err(FeatureError::UnknownProperty(name.to_owned())),
        }
        Ok(())
    }

    fn inputs(&self, _doc: &Document) -> Vec<ObjectId> {
        let mut inputs = present(&[self.linked_object]);
        inputs.extend(self.axis_wires());
        inputs
    }

    fn outputs(&self, _doc: &Document) -> Vec<ObjectId> {
        Vec::new()
    }

    fn attach(&mut self, id: ObjectId, doc: &mut Document) -> FeatureResult {
        let axis = |end: Vec3| vec![Point3::ORIGIN, Point3::from(end)];
        ensure_wire(doc, &mut self.tangent, id, "Tangent", axis(Vec3::X * 2.0), false)?;
        ensure_wire(doc, &mut self.normal, id, "Normal", axis(Vec3::Z * 2.0), false)?;
        ensure_wire(doc, &mut self.bend, id, "Bend", axis(Vec3::Y * 2.0), false)?;
        Ok(())
    }

    fn execute(&mut self, _id: ObjectId, doc: &mut Document) -> FeatureResult {
        self.apply_frame_to(doc)
    }
}
