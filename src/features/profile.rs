//! Profile: een geschaalde airfoil als gesloten draad.

use serde::Serialize;

use super::{Feature, FeatureError, FeatureResult, ensure_wire, link_value, present};
use crate::document::{Document, ObjectId, PropertyKind, PropertySpec, PropertyValue};
use crate::geom::{Point3, Vec3};
use crate::parse::{ParseError, parse_airfoil, read_airfoil};

const PROPERTIES: &[PropertySpec] = &[
    PropertySpec::new("File", PropertyKind::Text, "Profile", "Airfoil coordinate file"),
    PropertySpec::new("Data", PropertyKind::Text, "Profile", "Inline airfoil data").hidden(),
    PropertySpec::new("Scale", PropertyKind::Number, "Profile", "Scale factor"),
    PropertySpec::new("Points", PropertyKind::VectorList, "Profile", "Scaled points").read_only(),
    PropertySpec::new("Wire", PropertyKind::Link, "Profile", "Profile wire").read_only(),
];

/// Waar de ruwe punten vandaan komen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
enum Source {
    File(String),
    Data(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    file: String,
    #[serde(skip)]
    data: Option<String>,
    scale: f64,
    points: Vec<Point3>,
    wire: Option<ObjectId>,
    #[serde(skip)]
    raw: Vec<Point3>,
    #[serde(skip)]
    loaded: Option<Source>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            file: String::new(),
            data: None,
            scale: 1.0,
            points: Vec::new(),
            wire: None,
            raw: Vec::new(),
            loaded: None,
        }
    }
}

impl Profile {
    #[must_use]
    pub fn new(file: impl Into<String>, scale: f64) -> Self {
        Self {
            file: file.into(),
            scale,
            ..Self::default()
        }
    }

    /// Profiel uit inline airfoiltekst.
    #[must_use]
    pub fn from_data(data: impl Into<String>, scale: f64) -> Self {
        Self {
            data: Some(data.into()),
            scale,
            ..Self::default()
        }
    }

    pub fn set_file(&mut self, file: impl Into<String>) {
        self.file = file.into();
        self.data = None;
    }

    pub fn set_data(&mut self, data: impl Into<String>) {
        self.data = Some(data.into());
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Geschaalde punten van de laatste herberekening.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn wire(&self) -> Option<ObjectId> {
        self.wire
    }

    fn source(&self) -> Option<Source> {
        match (&self.data, self.file.trim()) {
            (Some(data), _) => Some(Source::Data(data.clone())),
            (None, "") => None,
            (None, file) => Some(Source::File(file.to_owned())),
        }
    }

    /// Leest de bron opnieuw als die veranderde sinds de vorige lezing.
    fn reload(&mut self) -> FeatureResult {
        let source = self.source();
        if source == self.loaded {
            return Ok(());
        }
        self.raw = match &source {
            None => Vec::new(),
            Some(Source::Data(data)) => parse_airfoil(data)?,
            Some(Source::File(path)) => read_airfoil(path).map_err(|err| match err {
                ParseError::Io { path, source } => FeatureError::Io { path, source },
                other => other.into(),
            })?,
        };
        self.loaded = source;
        Ok(())
    }
}

impl Feature for Profile {
    fn kind(&self) -> &'static str {
        "Profile"
    }

    fn properties(&self) -> &'static [PropertySpec] {
        PROPERTIES
    }

    fn property(&self, name: &str) -> FeatureResult<PropertyValue> {
        let value = match name {
            "File" => PropertyValue::Text(self.file.clone()),
            "Data" => PropertyValue::Text(self.data.clone().unwrap_or_default()),
            "Scale" => PropertyValue::Number(self.scale),
            "Points" => PropertyValue::VectorList(self.points.iter().map(|p| p.to_vec3()).collect()),
            "Wire" => link_value(self.wire),
            _ => return Err(FeatureError::UnknownProperty(name.to_owned())),
        };
        Ok(value)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> FeatureResult {
        match name {
            "File" => self.set_file(value.expect_text()?),
            "Data" => {
                let data = value.expect_text()?;
                self.data = (!data.is_empty()).then(|| data.to_owned());
            }
            "Scale" => self.scale = value.expect_number()?,
            _ => return Err(FeatureError::UnknownProperty(name.to_owned())),
        }
        Ok(())
    }

    fn inputs(&self, _doc: &Document) -> Vec<ObjectId> {
        Vec::new()
    }

    fn outputs(&self, _doc: &Document) -> Vec<ObjectId> {
        present(&[self.wire])
    }

    fn attach(&mut self, id: ObjectId, doc: &mut Document) -> FeatureResult {
        ensure_wire(doc, &mut self.wire, id, "Wire", Vec::new(), true)?;
        Ok(())
    }

    fn execute(&mut self, id: ObjectId, doc: &mut Document) -> FeatureResult {
        self.reload()?;
        let scale = self.scale;
        self.points = scale_points(&self.raw, scale);
        ensure_wire(doc, &mut self.wire, id, "Wire", self.points.clone(), true)?;
        log::debug!("profiel met {} punten (schaal {scale})", self.points.len());
        Ok(())
    }
}

/// Schaalt punten rond de oorsprong.
#[must_use]
pub fn scale_points(points: &[Point3], scale: f64) -> Vec<Point3> {
    points
        .iter()
        .map(|p| Point3::from(Vec3::from(*p) * scale))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = "test\n1.0 0.0\n0.5 0.1\n0.0 0.0\n0.5 -0.1\n";

    #[test]
    fn execute_scales_into_wire() {
        let mut doc = Document::new();
        let id = doc
            .add_feature("Profile", Profile::from_data(DATA, 2.0))
            .expect("profiel");
        doc.recompute().expect("herberekening");

        let wire = doc.property(id, "Wire").unwrap().expect_link().unwrap().unwrap();
        let polyline = doc.wire(wire).unwrap();
        assert!(polyline.is_closed());
        assert_eq!(polyline.points()[1], Point3::new(1.0, 0.2, 0.0));
        assert_eq!(doc.get(wire).unwrap().owner, Some(id));
    }

    #[test]
    fn rescale_by_one_reproduces_parsed_points() {
        let mut doc = Document::new();
        let id = doc
            .add_feature("Profile", Profile::from_data(DATA, 3.0))
            .expect("profiel");
        doc.recompute().unwrap();
        doc.set_property(id, "Scale", PropertyValue::Number(1.0)).unwrap();
        doc.recompute().unwrap();
        let parsed = parse_airfoil(DATA).unwrap();
        match doc.feature(id) {
            Some(crate::features::FeatureKind::Profile(profile)) => {
                assert_eq!(profile.points(), parsed.as_slice());
            }
            other => panic!("verwacht profiel, kreeg {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut profile = Profile::new("/bestaat/niet/profiel.dat", 1.0);
        let mut doc = Document::new();
        let err = profile.execute(ObjectId::new(0), &mut doc).unwrap_err();
        assert!(matches!(err, FeatureError::Io { .. }));
    }

    #[test]
    fn empty_profile_gives_empty_wire() {
        let mut doc = Document::new();
        let id = doc.add_feature("Profile", Profile::default()).unwrap();
        let report = doc.recompute().unwrap();
        assert!(report.is_ok());
        let wire = doc.property(id, "Wire").unwrap().expect_link().unwrap().unwrap();
        assert!(doc.wire(wire).unwrap().is_empty());
    }

    #[test]
    fn scale_points_multiplies_coordinates() {
        let scaled = scale_points(&[Point3::new(1.0, -2.0, 0.0)], 1.5);
        assert_eq!(scaled, vec![Point3::new(1.5, -3.0, 0.0)]);
    }
}
