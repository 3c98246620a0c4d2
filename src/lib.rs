#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod document;
pub mod features;
pub mod geom;
pub mod parse;

use std::collections::BTreeMap;
use std::fmt;

use config::{ConfigError, WorkbenchConfig};
use document::{Document, DocumentError, ObjectData, ObjectId, PropertyValue, RecomputeError, RecomputeReport};
use features::{CommandError, FeatureKind};
use parse::ParseError;
use serde::Serialize;
use wasm_bindgen::JsError;
use wildmatch::WildMatch;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Fouten van de werkbank.
#[derive(Debug, thiserror::Error)]
pub enum WorkbenchError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Recompute(#[from] RecomputeError),
    #[error("waarde voor `{0}` moet een eindig getal zijn")]
    NotFinite(String),
}

/// Aanmaakcommando's van de werkbank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Wing,
    Rod,
    WrapLeadingEdge,
    LeadingEdge,
    CutWire,
    Section,
    Ribs,
}

#[derive(Debug, Default, Serialize)]
pub struct GeometryDiff {
    pub added: Vec<GeometryDiffItem>,
    pub updated: Vec<GeometryDiffItem>,
    pub removed: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct GeometryDiffItem {
    pub id: usize,
    pub name: String,
    pub items: Vec<GeometryItem>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum GeometryItem {
    Point {
        coordinates: [f64; 3],
    },
    Polyline {
        points: Vec<[f64; 3]>,
        closed: bool,
    },
    Mesh {
        vertices: Vec<[f64; 3]>,
        faces: Vec<Vec<u32>>,
    },
}

#[derive(Debug, Serialize)]
pub struct PropertyExport {
    pub name: &'static str,
    pub group: &'static str,
    pub doc: &'static str,
    pub read_only: bool,
    pub value: PropertyValue,
    pub choices: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct FailedExport {
    pub name: String,
    pub error: String,
}

/// Samenvatting van een herberekening met objectnamen.
#[derive(Debug, Serialize)]
pub struct RecomputeExport {
    pub recomputed: Vec<String>,
    pub failed: Vec<FailedExport>,
    pub skipped: Vec<String>,
}

impl RecomputeExport {
    fn new(doc: &Document, report: &RecomputeReport) -> Self {
        let names = |ids: &[ObjectId]| -> Vec<String> { ids.iter().map(|id| doc.name_of(*id)).collect() };
        Self {
            recomputed: names(report.recomputed.as_slice()),
            failed: report
                .failed
                .iter()
                .map(|(id, err)| FailedExport {
                    name: doc.name_of(*id),
                    error: err.to_string(),
                })
                .collect(),
            skipped: names(report.skipped.as_slice()),
        }
    }
}

/// Publiek toegangspunt: een document, de selectie en de configuratie.
#[wasm_bindgen]
pub struct Workbench {
    initialized: bool,
    config: WorkbenchConfig,
    document: Document,
    selection: Vec<ObjectId>,
    geometry_map: BTreeMap<ObjectId, Vec<GeometryItem>>,
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Workbench {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Workbench {
        Workbench {
            initialized: true,
            config: WorkbenchConfig::default(),
            document: Document::new(),
            selection: Vec::new(),
            geometry_map: BTreeMap::new(),
        }
    }

    /// Geeft terug of de werkbank de minimale initialisatie heeft doorlopen.
    #[wasm_bindgen]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Vervangt het document door een `<wingdoc>`-document.
    #[wasm_bindgen]
    pub fn load_document(&mut self, xml: &str) -> Result<(), JsValue> {
        self.read_document(xml).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn load_config(&mut self, xml: &str) -> Result<(), JsValue> {
        self.read_config(xml).map_err(to_js_error)
    }

    /// Voegt objecten op naam of patroon toe aan de selectie.
    #[wasm_bindgen]
    pub fn select(&mut self, name: &str) -> Result<(), JsValue> {
        self.select_object(name).map(|_| ()).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    #[wasm_bindgen]
    pub fn create_wing(&mut self) -> Result<String, JsValue> {
        self.create_js(Command::Wing)
    }

    #[wasm_bindgen]
    pub fn create_rod(&mut self) -> Result<String, JsValue> {
        self.create_js(Command::Rod)
    }

    #[wasm_bindgen]
    pub fn create_wrap_leading_edge(&mut self) -> Result<String, JsValue> {
        self.create_js(Command::WrapLeadingEdge)
    }

    #[wasm_bindgen]
    pub fn create_leading_edge(&mut self) -> Result<String, JsValue> {
        self.create_js(Command::LeadingEdge)
    }

    #[wasm_bindgen]
    pub fn create_cut_wire(&mut self) -> Result<String, JsValue> {
        self.create_js(Command::CutWire)
    }

    #[wasm_bindgen]
    pub fn create_section(&mut self) -> Result<String, JsValue> {
        self.create_js(Command::Section)
    }

    #[wasm_bindgen]
    pub fn create_ribs(&mut self) -> Result<String, JsValue> {
        self.create_js(Command::Ribs)
    }

    #[wasm_bindgen]
    pub fn set_number(&mut self, object: &str, property: &str, value: f64) -> Result<(), JsValue> {
        if !value.is_finite() {
            return Err(to_js_error(WorkbenchError::NotFinite(property.to_owned())));
        }
        self.assign(object, property, PropertyValue::Number(value))
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn set_boolean(&mut self, object: &str, property: &str, value: bool) -> Result<(), JsValue> {
        self.assign(object, property, PropertyValue::Boolean(value))
            .map_err(to_js_error)
    }

    /// Tekst, keuzewaarde of link (`Naam` / `Naam.Eigenschap`).
    #[wasm_bindgen]
    pub fn set_text(&mut self, object: &str, property: &str, value: &str) -> Result<(), JsValue> {
        self.assign_text(object, property, value).map_err(to_js_error)
    }

    /// Herberekent gewijzigde objecten en hun afhankelijken.
    #[wasm_bindgen]
    pub fn recompute(&mut self) -> Result<JsValue, JsValue> {
        let report = self.recompute_document().map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&report).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Geometrie sinds de vorige oproep in een "diff" formaat.
    #[wasm_bindgen]
    pub fn get_geometry(&mut self) -> Result<JsValue, JsValue> {
        let diff = self.geometry_diff();
        serde_wasm_bindgen::to_value(&diff).map_err(|err| JsError::new(&err.to_string()).into())
    }

    #[wasm_bindgen]
    pub fn get_properties(&self, object: &str) -> Result<JsValue, JsValue> {
        let properties = self.properties(object).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&properties).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Bewaarde toestand van een feature.
    #[wasm_bindgen]
    pub fn get_feature_state(&self, object: &str) -> Result<JsValue, JsValue> {
        let feature = self.feature_state(object).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(feature).map_err(|err| JsError::new(&err.to_string()).into())
    }
}

impl Workbench {
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    #[must_use]
    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    #[must_use]
    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    pub fn read_document(&mut self, xml: &str) -> Result<(), WorkbenchError> {
        let mut document = parse::parse_document(xml)?;
        debug_log!("document geladen met {} objecten", document.object_count());
        document.set_sampling(self.config.sampling());
        self.document = document;
        self.selection.clear();
        self.geometry_map.clear();
        Ok(())
    }

    pub fn read_config(&mut self, xml: &str) -> Result<(), WorkbenchError> {
        self.config = WorkbenchConfig::from_xml_str(xml)?;
        log::set_max_level(self.config.log_level());
        self.document.set_sampling(self.config.sampling());
        Ok(())
    }

    /// Voegt objecten toe aan de selectie. `name` mag jokertekens bevatten
    /// (`Rib*`); de volgorde van het document blijft behouden.
    pub fn select_object(&mut self, name: &str) -> Result<Vec<ObjectId>, WorkbenchError> {
        let ids = if name.contains(['*', '?']) {
            let pattern = WildMatch::new(name);
            self.document
                .objects()
                .filter(|obj| pattern.matches(&obj.name))
                .map(|obj| obj.id)
                .collect()
        } else {
            vec![self.lookup(name)?]
        };
        if ids.is_empty() {
            return Err(DocumentError::UnknownName(name.to_owned()).into());
        }
        for id in &ids {
            if !self.selection.contains(id) {
                self.selection.push(*id);
            }
        }
        Ok(ids)
    }

    /// Voert een aanmaakcommando uit op de huidige selectie.
    pub fn run_command(&mut self, command: Command) -> Result<ObjectId, WorkbenchError> {
        let doc = &mut self.document;
        let selection = self.selection.as_slice();
        let id = match command {
            Command::Wing => features::create_wing(doc, &self.config)?,
            Command::Rod => features::create_rod(doc, selection)?,
            Command::WrapLeadingEdge => features::create_wrap_leading_edge(doc, selection)?,
            Command::LeadingEdge => features::create_leading_edge(doc, selection)?,
            Command::CutWire => features::create_cut_wire(doc, selection)?,
            Command::Section => features::create_section(doc, selection)?,
            Command::Ribs => features::create_ribs(doc, selection)?,
        };
        debug_log!("{command:?} aangemaakt als `{}`", self.document.name_of(id));
        Ok(id)
    }

    pub fn assign(&mut self, object: &str, property: &str, value: PropertyValue) -> Result<(), WorkbenchError> {
        let id = self.lookup(object)?;
        self.document.set_property(id, property, value)?;
        Ok(())
    }

    /// Zoals [`Workbench::assign`], maar een link-eigenschap krijgt het
    /// object met de opgegeven naam.
    pub fn assign_text(&mut self, object: &str, property: &str, text: &str) -> Result<(), WorkbenchError> {
        let id = self.lookup(object)?;
        let value = match self.document.property(id, property)? {
            PropertyValue::Link(_) => PropertyValue::Link(self.document.resolve_link(text)?),
            PropertyValue::Enumeration(_) => PropertyValue::Enumeration(text.to_owned()),
            _ => PropertyValue::Text(text.to_owned()),
        };
        self.document.set_property(id, property, value)?;
        Ok(())
    }

    pub fn recompute_document(&mut self) -> Result<RecomputeExport, WorkbenchError> {
        let report = self.document.recompute()?;
        for (id, err) in &report.failed {
            log::warn!("`{}` faalde: {err}", self.document.name_of(*id));
        }
        self.selection.retain(|id| self.document.contains(*id));
        Ok(RecomputeExport::new(&self.document, &report))
    }

    /// Vergelijkt de huidige geometrie met die van de vorige oproep.
    pub fn geometry_diff(&mut self) -> GeometryDiff {
        let mut diff = GeometryDiff::default();
        let mut next_geometry_map = BTreeMap::new();

        for obj in self.document.objects() {
            let items = match geometry_items(&self.document, obj.id, &obj.data) {
                Ok(items) if !items.is_empty() => items,
                Ok(_) => continue,
                Err(err) => {
                    log::warn!("geen geometrie voor `{}`: {err}", obj.name);
                    continue;
                }
            };
            let entry = GeometryDiffItem {
                id: obj.id.0,
                name: obj.name.clone(),
                items: items.clone(),
            };
            match self.geometry_map.get(&obj.id) {
                Some(existing) if *existing == items => {}
                Some(_) => diff.updated.push(entry),
                None => diff.added.push(entry),
            }
            next_geometry_map.insert(obj.id, items);
        }

        for id in self.geometry_map.keys() {
            if !next_geometry_map.contains_key(id) {
                diff.removed.push(id.0);
            }
        }

        self.geometry_map = next_geometry_map;
        diff
    }

    pub fn properties(&self, object: &str) -> Result<Vec<PropertyExport>, WorkbenchError> {
        let id = self.lookup(object)?;
        let feature = self.feature(id)?;
        feature
            .as_feature()
            .properties()
            .iter()
            .filter(|spec| !spec.hidden)
            .map(|spec| {
                Ok(PropertyExport {
                    name: spec.name,
                    group: spec.group,
                    doc: spec.doc,
                    read_only: spec.read_only,
                    value: self.document.property(id, spec.name)?,
                    choices: spec.choices,
                })
            })
            .collect()
    }

    pub fn feature_state(&self, object: &str) -> Result<&FeatureKind, WorkbenchError> {
        let id = self.lookup(object)?;
        self.feature(id)
    }

    fn feature(&self, id: ObjectId) -> Result<&FeatureKind, WorkbenchError> {
        self.document.feature(id).ok_or_else(|| {
            DocumentError::NotAFeature {
                name: self.document.name_of(id),
            }
            .into()
        })
    }

    fn lookup(&self, name: &str) -> Result<ObjectId, WorkbenchError> {
        self.document
            .by_name(name)
            .ok_or_else(|| DocumentError::UnknownName(name.to_owned()).into())
    }

    fn create_js(&mut self, command: Command) -> Result<String, JsValue> {
        let id = self.run_command(command).map_err(to_js_error)?;
        Ok(self.document.name_of(id))
    }
}

/// Weergave-items van één object; features hebben er geen.
fn geometry_items(doc: &Document, id: ObjectId, data: &ObjectData) -> Result<Vec<GeometryItem>, DocumentError> {
    let items = match data {
        ObjectData::Feature => Vec::new(),
        ObjectData::Point { point } => {
            let point = doc.placement(id)?.apply_point(*point);
            vec![GeometryItem::Point {
                coordinates: point.to_array(),
            }]
        }
        ObjectData::Wire(_) => {
            let wire = doc.global_wire(id)?;
            if wire.is_empty() {
                Vec::new()
            } else {
                vec![GeometryItem::Polyline {
                    points: wire.points().iter().map(|p| p.to_array()).collect(),
                    closed: wire.is_closed(),
                }]
            }
        }
        _ => {
            let shape = doc.shape(id)?;
            let mut vertices = Vec::new();
            let mut faces = Vec::new();
            for facet in shape.faces.iter().flat_map(geom::Face::facets) {
                let start = vertices.len();
                vertices.extend(facet.iter().map(|p| p.to_array()));
                faces.push((start..vertices.len()).map(index_u32).collect());
            }
            if faces.is_empty() {
                Vec::new()
            } else {
                vec![GeometryItem::Mesh { vertices, faces }]
            }
        }
    };
    Ok(items)
}

fn index_u32(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"<wingdoc><objects>
        <object id="1" kind="Box" name="Cube"><property name="Length" value="2"/></object>
        <object id="2" kind="Section" name="Cut"><property name="SlicedObject" link="Cube"/></object>
    </objects></wingdoc>"#;

    fn loaded() -> Workbench {
        let mut bench = Workbench::new();
        bench.read_document(DOCUMENT).expect("document");
        bench
    }

    #[test]
    fn geometry_diff_tracks_added_updated_removed() {
        let mut bench = loaded();
        bench.recompute_document().expect("herberekend");
        let first = bench.geometry_diff();
        let names: Vec<&str> = first.added.iter().map(|item| item.name.as_str()).collect();
        assert!(names.contains(&"Cube"));
        assert!(names.contains(&"SectionPlane"));
        assert!(names.iter().any(|name| name.starts_with("SectionWire")));

        let unchanged = bench.geometry_diff();
        assert!(unchanged.added.is_empty() && unchanged.updated.is_empty() && unchanged.removed.is_empty());

        bench.assign("Cut", "Offset", PropertyValue::Number(0.5)).expect("offset");
        bench.recompute_document().expect("herberekend");
        let moved = bench.geometry_diff();
        assert!(moved.added.is_empty());
        assert!(moved.updated.iter().any(|item| item.name == "SectionPlane"));

        bench.assign("Cut", "Offset", PropertyValue::Number(10.0)).expect("offset");
        bench.recompute_document().expect("herberekend");
        let emptied = bench.geometry_diff();
        assert_eq!(emptied.removed.len(), 1);
    }

    #[test]
    fn selection_drives_commands() {
        let mut bench = loaded();
        assert!(matches!(
            bench.run_command(Command::WrapLeadingEdge),
            Err(WorkbenchError::Command(CommandError::NoWingSelected))
        ));
        bench.select_object("Cube").expect("selectie");
        bench.select_object("Cube").expect("selectie");
        assert_eq!(bench.selection().len(), 1);
        let ribs = bench.run_command(Command::Ribs).expect("nerven");
        let cube = bench.document().by_name("Cube");
        assert_eq!(bench.document().property(ribs, "SlicedObject").unwrap(), PropertyValue::Link(cube));
        bench.clear_selection();
        assert!(bench.selection().is_empty());

        bench.recompute_document().expect("herberekend");
        let ribs_wires = bench.select_object("Rib0*").expect("patroon");
        assert_eq!(ribs_wires.len(), 1);
        assert!(bench.select_object("Geen*").is_err());
    }

    #[test]
    fn set_text_resolves_links_and_choices() {
        let mut bench = loaded();
        bench.assign_text("Cut", "RefPlane", "YZ").expect("keuze");
        bench.assign_text("Cut", "SlicedObject", "").expect("lege link");
        let cut = bench.document().by_name("Cut").unwrap();
        assert_eq!(bench.document().property(cut, "SlicedObject").unwrap(), PropertyValue::Link(None));
        assert!(bench.assign_text("Cut", "RefPlane", "XX").is_err());
        assert!(bench.assign_text("Nergens", "RefPlane", "XY").is_err());
    }

    #[test]
    fn recompute_export_names_objects() {
        let mut bench = loaded();
        let report = bench.recompute_document().expect("herberekend");
        assert_eq!(report.recomputed, vec!["Cut".to_owned()]);
        assert!(report.failed.is_empty());
    }

    #[test]
    fn properties_hide_internal_fields() {
        let bench = loaded();
        let properties = bench.properties("Cut").expect("eigenschappen");
        let names: Vec<&str> = properties.iter().map(|p| p.name).collect();
        assert_eq!(names, ["SlicedObject", "RefPlane", "Offset", "Plane", "Wires"]);
        assert!(properties[3].read_only);
        assert!(bench.properties("Cube").is_err());
        assert!(matches!(bench.feature_state("Cut"), Ok(FeatureKind::Section(_))));
    }

    #[test]
    fn config_replaces_defaults() {
        let mut bench = Workbench::new();
        bench
            .read_config(r#"<config profiles_dir="/p" default_profile="clarky.dat"/>"#)
            .expect("configuratie");
        let wing = bench.run_command(Command::Wing).expect("vleugel");
        let root = bench.document().property(wing, "RootProfile").unwrap().expect_link().unwrap().unwrap();
        assert_eq!(
            bench.document().property(root, "File").unwrap(),
            PropertyValue::Text("/p/clarky.dat".into())
        );
        assert!(bench.read_config("<config discretize_samples=\"0\"/>").is_err());
    }

    #[test]
    fn config_samples_reach_the_document() {
        let mut bench = loaded();
        bench.recompute_document().expect("herberekend");
        assert!(bench.document().touched().is_empty());
        bench
            .read_config(r#"<config discretize_samples="51"/>"#)
            .expect("configuratie");
        assert_eq!(bench.document().sampling().intervals(), 50);
        let cut = bench.document().by_name("Cut").unwrap();
        assert!(bench.document().is_touched(cut));

        bench.read_document(DOCUMENT).expect("document");
        assert_eq!(bench.document().sampling().intervals(), 50);
    }
}
