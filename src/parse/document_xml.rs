//! Parser voor `<wingdoc>`-documenten.
//!
//! Objecten worden in twee stappen opgebouwd: eerst alle objecten met hun
//! standaardwaarden, daarna de eigenschappen. Zo kan een link naar een
//! object verwijzen dat verderop in het bestand staat.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use quick_xml::de::from_str;
use serde::Deserialize;

use super::{ParseError, ParseResult};
use crate::document::property::find_spec;
use crate::document::{Document, ObjectData, ObjectId, PropertyKind, PropertyValue};
use crate::features::FeatureKind;
use crate::geom::{Placement, Point3, Rotation, Vec3};

#[derive(Debug, Deserialize)]
#[serde(rename = "wingdoc")]
struct WingDocument {
    #[serde(default)]
    objects: ObjectList,
}

#[derive(Debug, Default, Deserialize)]
struct ObjectList {
    #[serde(default, rename = "object")]
    objects: Vec<XmlObject>,
}

#[derive(Debug, Deserialize)]
struct XmlObject {
    #[serde(rename = "@id")]
    id: usize,
    #[serde(rename = "@kind")]
    kind: String,
    #[serde(rename = "@name")]
    name: String,
    #[serde(default, rename = "property")]
    properties: Vec<XmlProperty>,
}

#[derive(Debug, Deserialize)]
struct XmlProperty {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@value")]
    value: Option<String>,
    #[serde(rename = "@link")]
    link: Option<String>,
}

/// Leest een document uit XML-tekst.
pub fn parse_document(input: &str) -> ParseResult<Document> {
    let document: WingDocument = from_str(strip_xml_preamble(input))?;
    log::debug!("{} object(en) in document", document.objects.objects.len());

    let mut doc = Document::new();
    let mut by_name: HashMap<String, ObjectId> = HashMap::new();
    let mut seen_ids = BTreeSet::new();
    let mut created = Vec::with_capacity(document.objects.objects.len());

    for object in document.objects.objects {
        if !seen_ids.insert(object.id) {
            return Err(ParseError::Document {
                object: object.name,
                message: format!("dubbel id {}", object.id),
            });
        }
        let id = create_object(&mut doc, &object)?;
        by_name.insert(object.name.clone(), id);
        created.push((id, object));
    }

    for (id, object) in &created {
        for property in &object.properties {
            apply_property(&mut doc, &by_name, *id, object, property)?;
        }
    }
    Ok(doc)
}

/// Leest een documentbestand.
pub fn load_document(path: impl AsRef<Path>) -> ParseResult<Document> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_document(&text)
}

fn strip_xml_preamble(input: &str) -> &str {
    let trimmed = input.trim_start_matches(|c: char| c == '\u{feff}' || c.is_whitespace());
    if let Some(rest) = trimmed.strip_prefix("<?xml") {
        if let Some(idx) = rest.find("?>") {
            return rest[idx + 2..].trim_start();
        }
    }
    trimmed
}

fn create_object(doc: &mut Document, object: &XmlObject) -> ParseResult<ObjectId> {
    let name = object.name.as_str();
    let id = match object.kind.as_str() {
        "Wire" => doc.add_wire(name, Vec::new(), false),
        "Point" => doc.add_point(name, Point3::ORIGIN),
        "Box" => doc.add_box(name, 10.0, 10.0, 10.0),
        "Cylinder" => doc.add_cylinder(name, 2.0, 10.0),
        "Extrusion" => doc.add_object(
            name,
            ObjectData::Extrusion {
                base: None,
                direction: Vec3::Z,
                length_fwd: 0.0,
            },
        ),
        "Pad" => doc.add_object(
            name,
            ObjectData::Pad {
                sketch: None,
                length: 10.0,
            },
        ),
        "Loft" => doc.add_loft(name, Vec::new(), true),
        "Plane" => doc.add_plane(name, 10.0, 10.0),
        kind => {
            let feature = FeatureKind::from_name(kind).ok_or_else(|| ParseError::UnknownKind {
                kind: kind.to_owned(),
                hint: suggest_kind(kind).map_or_else(String::new, |known| format!(", bedoelde je `{known}`?")),
            })?;
            doc.add_feature(name, feature).map_err(|err| document_error(object, err))?
        }
    };
    Ok(id)
}

const PRIMITIVE_KINDS: &[&str] = &[
    "Wire",
    "Point",
    "Box",
    "Cylinder",
    "Extrusion",
    "Pad",
    "Loft",
    "Plane",
];

/// Dichtstbijzijnde bekende typenaam bij een tikfout.
fn suggest_kind(kind: &str) -> Option<&'static str> {
    let lowered = kind.to_lowercase();
    PRIMITIVE_KINDS
        .iter()
        .chain(FeatureKind::NAMES)
        .map(|known| (levenshtein::levenshtein(&lowered, &known.to_lowercase()), *known))
        .filter(|(distance, _)| *distance <= 2)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, known)| known)
}

fn document_error(object: &XmlObject, err: impl ToString) -> ParseError {
    ParseError::Document {
        object: object.name.clone(),
        message: err.to_string(),
    }
}

fn apply_property(
    doc: &mut Document,
    by_name: &HashMap<String, ObjectId>,
    id: ObjectId,
    object: &XmlObject,
    property: &XmlProperty,
) -> ParseResult<()> {
    let name = property.name.as_str();
    if name == "Sections" {
        let text = property.link.as_deref().unwrap_or_default();
        let sections = text
            .split([',', ';'])
            .map(|link| resolve(doc, by_name, object, link))
            .filter_map(Result::transpose)
            .collect::<ParseResult<Vec<_>>>()?;
        return doc
            .write_data(id, |data| {
                if let ObjectData::Loft { sections: current, .. } = data {
                    *current = sections;
                }
            })
            .map_err(|err| document_error(object, err));
    }

    let value = match (&property.link, &property.value) {
        (Some(link), _) => PropertyValue::Link(resolve(doc, by_name, object, link)?),
        (None, Some(text)) => {
            let kind = declared_kind(doc, id, name).ok_or_else(|| ParseError::Document {
                object: object.name.clone(),
                message: format!("onbekende eigenschap `{name}`"),
            })?;
            parse_value(kind, text).ok_or_else(|| ParseError::InvalidValue {
                object: object.name.clone(),
                property: name.to_owned(),
                value: text.clone(),
            })?
        }
        (None, None) => return Ok(()),
    };
    doc.set_property(id, name, value)
        .map_err(|err| document_error(object, err))
}

/// `Naam` of `Naam.Eigenschap`; namen uit het bestand gaan voor op namen
/// die het document zelf gaf.
fn resolve(
    doc: &Document,
    by_name: &HashMap<String, ObjectId>,
    object: &XmlObject,
    link: &str,
) -> ParseResult<Option<ObjectId>> {
    let link = link.trim();
    if link.is_empty() {
        return Ok(None);
    }
    let (target, output) = match link.split_once('.') {
        Some((target, output)) => (target, Some(output)),
        None => (link, None),
    };
    let Some(&id) = by_name.get(target) else {
        return doc.resolve_link(link).map_err(|err| document_error(object, err));
    };
    match output {
        None => Ok(Some(id)),
        Some(output) => doc
            .property(id, output)
            .map_err(|err| document_error(object, err))?
            .expect_link()
            .map_err(|err| document_error(object, err)),
    }
}

/// Type van een eigenschap: uit de tabel van een feature, of uit de huidige
/// waarde bij primitieven.
fn declared_kind(doc: &Document, id: ObjectId, name: &str) -> Option<PropertyKind> {
    match name {
        "Label" => return Some(PropertyKind::Text),
        "Placement" => return Some(PropertyKind::Placement),
        _ => {}
    }
    match doc.feature(id) {
        Some(feature) => find_spec(feature.as_feature().properties(), name).map(|spec| spec.kind),
        None => doc.property(id, name).ok().map(|value| value.kind()),
    }
}

fn parse_numbers(text: &str) -> Option<Vec<f64>> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse().ok())
        .collect()
}

/// Een getal of een rekenkundige uitdrukking zoals `300 / 2`.
fn parse_number(text: &str) -> Option<f64> {
    text.parse()
        .ok()
        .or_else(|| meval::eval_str(text).ok())
        .filter(|value: &f64| value.is_finite())
}

fn parse_vector(text: &str) -> Option<Vec3> {
    match parse_numbers(text)?.as_slice() {
        [x, y, z] => Some(Vec3::new(*x, *y, *z)),
        _ => None,
    }
}

/// Zet tekst om volgens het gedeclareerde type.
///
/// Vectoren zijn `x,y,z`, lijsten scheiden vectoren met `;` en een plaatsing
/// is `x,y,z` of `x,y,z;ax,ay,az,graden`.
fn parse_value(kind: PropertyKind, text: &str) -> Option<PropertyValue> {
    let text = text.trim();
    let value = match kind {
        PropertyKind::Number => PropertyValue::Number(parse_number(text)?),
        PropertyKind::Integer => match text.parse() {
            Ok(value) => PropertyValue::Integer(value),
            Err(_) => PropertyValue::Number(parse_number(text).filter(|value| value.fract() == 0.0)?),
        },
        PropertyKind::Boolean => match text.to_ascii_lowercase().as_str() {
            "true" | "1" => PropertyValue::Boolean(true),
            "false" | "0" => PropertyValue::Boolean(false),
            _ => return None,
        },
        PropertyKind::Text => PropertyValue::Text(text.to_owned()),
        PropertyKind::Enumeration => PropertyValue::Enumeration(text.to_owned()),
        PropertyKind::Vector => PropertyValue::Vector(parse_vector(text)?),
        PropertyKind::VectorList => PropertyValue::VectorList(
            text.split(';')
                .filter(|part| !part.trim().is_empty())
                .map(parse_vector)
                .collect::<Option<Vec<_>>>()?,
        ),
        PropertyKind::Placement => {
            let (base, rotation) = match text.split_once(';') {
                Some((base, rotation)) => (base, Some(rotation)),
                None => (text, None),
            };
            let rotation = match rotation.map(parse_numbers) {
                None => Rotation::IDENTITY,
                Some(Some(numbers)) => match numbers.as_slice() {
                    [x, y, z, degrees] => Rotation::from_axis_degrees(Vec3::new(*x, *y, *z), *degrees),
                    _ => return None,
                },
                Some(None) => return None,
            };
            PropertyValue::Placement(Placement::new(parse_vector(base)?, rotation))
        }
        PropertyKind::Link => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Tolerance;

    const ROD_DOCUMENT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<wingdoc>
  <objects>
    <object id="1" kind="Profile" name="RootProfile">
      <property name="Data" value="sq&#10;0.0 0.0&#10;1.0 0.0&#10;1.0 1.0&#10;0.0 1.0"/>
      <property name="Scale" value="50 * 2"/>
    </object>
    <object id="2" kind="Box" name="Spar">
      <property name="Height" value="520"/>
      <property name="Length" value="3"/>
    </object>
    <object id="3" kind="Rod" name="Rod">
      <property name="Rod" link="Spar"/>
      <property name="RootWire" link="RootProfile.Wire"/>
      <property name="RootPoint" value="1"/>
      <property name="TangentType" value="Next"/>
    </object>
  </objects>
</wingdoc>"#;

    #[test]
    fn builds_objects_and_resolves_links() {
        let doc = parse_document(ROD_DOCUMENT).expect("document");
        let rod = doc.by_name("Rod").unwrap();
        let spar = doc.by_name("Spar").unwrap();
        let profile = doc.by_name("RootProfile").unwrap();

        assert_eq!(doc.property(rod, "Rod").unwrap(), PropertyValue::Link(Some(spar)));
        assert_eq!(doc.property(rod, "RootWire").unwrap(), doc.property(profile, "Wire").unwrap());
        assert_eq!(doc.property(rod, "TangentType").unwrap(), PropertyValue::Enumeration("Next".into()));
        assert_eq!(doc.property(spar, "Height").unwrap(), PropertyValue::Number(520.0));
        assert_eq!(doc.property(spar, "Width").unwrap(), PropertyValue::Number(10.0));
        assert_eq!(doc.property(profile, "Scale").unwrap(), PropertyValue::Number(100.0));
    }

    #[test]
    fn recompute_after_load_sizes_the_rod() {
        let mut doc = parse_document(ROD_DOCUMENT).expect("document");
        assert!(doc.recompute().unwrap().is_ok());
        let spar = doc.by_name("Spar").unwrap();
        // zonder tip: richting is de genegeerde normaal, lengte 1 + 1 + 1
        let height = doc.property(spar, "Height").unwrap().expect_number().unwrap();
        assert!(height > 0.0);
        assert!(height < 520.0);
    }

    #[test]
    fn forward_links_and_wire_points() {
        let xml = r#"<wingdoc><objects>
            <object id="1" kind="CutWire" name="Cut"><property name="Wire" link="Outline"/></object>
            <object id="2" kind="Wire" name="Outline">
              <property name="Points" value="0,0,0; 1,0,0; 1,1,0"/>
              <property name="Closed" value="true"/>
              <property name="Placement" value="0,0,5;0,0,1,90"/>
            </object>
        </objects></wingdoc>"#;
        let doc = parse_document(xml).expect("document");
        let cut = doc.by_name("Cut").unwrap();
        let outline = doc.by_name("Outline").unwrap();
        assert_eq!(doc.property(cut, "Wire").unwrap(), PropertyValue::Link(Some(outline)));
        let wire = doc.wire(outline).unwrap();
        assert_eq!(wire.len(), 3);
        assert!(wire.is_closed());
        let global = doc.global_wire(outline).unwrap();
        assert!(Tolerance::DEFAULT.approx_eq_point3(global.points()[1], Point3::new(0.0, 1.0, 5.0)));
    }

    #[test]
    fn loft_sections_are_a_link_list() {
        let xml = r#"<wingdoc><objects>
            <object id="1" kind="Wire" name="A"><property name="Points" value="0,0,0;1,0,0;1,1,0"/><property name="Closed" value="1"/></object>
            <object id="2" kind="Wire" name="B"><property name="Points" value="0,0,1;1,0,1;1,1,1"/><property name="Closed" value="1"/></object>
            <object id="3" kind="Loft" name="Skin"><property name="Sections" link="A;B"/></object>
        </objects></wingdoc>"#;
        let doc = parse_document(xml).expect("document");
        let skin = doc.by_name("Skin").unwrap();
        let bbox = doc.shape(skin).unwrap().bbox().unwrap();
        assert!(Tolerance::DEFAULT.approx_eq_f64(bbox.max.z, 1.0));
    }

    #[test]
    fn legacy_ribs_kind_is_accepted() {
        let xml = r#"<wingdoc><objects><object id="1" kind="Nervures" name="Ribs"/></objects></wingdoc>"#;
        let doc = parse_document(xml).expect("document");
        let ribs = doc.by_name("Ribs").unwrap();
        assert_eq!(doc.feature(ribs).map(FeatureKind::name), Some("Ribs"));
    }

    #[test]
    fn reports_bad_input() {
        let unknown = r#"<wingdoc><objects><object id="1" kind="Gizmo" name="G"/></objects></wingdoc>"#;
        assert!(matches!(parse_document(unknown), Err(ParseError::UnknownKind { kind, hint }) if kind == "Gizmo" && hint.is_empty()));

        let typo = r#"<wingdoc><objects><object id="1" kind="Ribz" name="R"/></objects></wingdoc>"#;
        let err = parse_document(typo).unwrap_err();
        assert_eq!(err.to_string(), "onbekend objecttype `Ribz`, bedoelde je `Ribs`?");

        let bad_value = r#"<wingdoc><objects><object id="1" kind="Box" name="B"><property name="Height" value="hoog"/></object></objects></wingdoc>"#;
        assert!(matches!(parse_document(bad_value), Err(ParseError::InvalidValue { .. })));

        let bad_link = r#"<wingdoc><objects><object id="1" kind="Rod" name="R"><property name="Rod" link="Nergens"/></object></objects></wingdoc>"#;
        assert!(matches!(parse_document(bad_link), Err(ParseError::Document { .. })));

        let duplicate = r#"<wingdoc><objects><object id="1" kind="Box" name="A"/><object id="1" kind="Box" name="B"/></objects></wingdoc>"#;
        assert!(matches!(parse_document(duplicate), Err(ParseError::Document { .. })));

        let read_only = r#"<wingdoc><objects><object id="1" kind="LeadingEdge" name="L"><property name="TipEndPoint" value="1"/></object></objects></wingdoc>"#;
        assert!(matches!(parse_document(read_only), Err(ParseError::Document { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            load_document("/bestaat/niet.xml"),
            Err(ParseError::Io { .. })
        ));
    }
}
