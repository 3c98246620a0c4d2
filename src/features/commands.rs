//! Aanmaakcommando's: maken een feature met zijn standaardobjecten aan en
//! koppelen het aan de huidige selectie.

use thiserror::Error;

use super::{CutWire, FeatureKind, LeadingEdge, Profile, Ribs, Rod, Section, Wing, WrapLeadingEdge};
use crate::config::WorkbenchConfig;
use crate::document::{Document, DocumentError, ObjectData, ObjectId, PropertyValue};
use crate::geom::RefPlane;

/// Fouten bij het uitvoeren van een aanmaakcommando.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("geen vleugel geselecteerd")]
    NoWingSelected,
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Vleugel geselecteerd als eerste object.
fn selected_wing<'a>(doc: &'a Document, selection: &[ObjectId]) -> Option<&'a Wing> {
    selection
        .first()
        .and_then(|id| doc.feature(*id))
        .and_then(FeatureKind::as_wing)
}

/// Eerste geselecteerde draad, los of als uitvoer van een profiel.
fn selected_wire(doc: &Document, selection: &[ObjectId]) -> Option<ObjectId> {
    selection.iter().find_map(|id| match doc.feature(*id) {
        Some(FeatureKind::Profile(profile)) => profile.wire(),
        Some(_) => None,
        None => doc.wire(*id).is_ok().then_some(*id),
    })
}

/// Eerste geselecteerd object met een vaste vorm.
fn selected_solid(doc: &Document, selection: &[ObjectId]) -> Option<ObjectId> {
    selection.iter().copied().find(|id| {
        doc.object(*id).is_some_and(|obj| {
            !matches!(
                obj.data,
                ObjectData::Feature | ObjectData::Wire(_) | ObjectData::Point { .. }
            )
        })
    })
}

/// Twee profielen uit het standaardbestand en een vleugel die ze verbindt.
pub fn create_wing(doc: &mut Document, config: &WorkbenchConfig) -> Result<ObjectId, CommandError> {
    let file = config.default_profile_path().display().to_string();
    let root = doc.add_feature("RootProfile", Profile::new(file.clone(), 300.0))?;
    let tip = doc.add_feature("TipProfile", Profile::new(file, 150.0))?;
    let wing = doc.add_feature("Wing", Wing::new(Some(root), Some(tip)))?;
    doc.set_property(wing, "Length", PropertyValue::Number(500.0))?;
    log::debug!("vleugel `{}` aangemaakt", doc.name_of(wing));
    Ok(wing)
}

/// Een staaf met een standaardbalk; volgt de vleugeldraden als er een
/// vleugel geselecteerd is.
pub fn create_rod(doc: &mut Document, selection: &[ObjectId]) -> Result<ObjectId, CommandError> {
    let wires = selected_wing(doc, selection).map(|wing| (wing.root_wire(), wing.tip_wire()));
    let solid = doc.add_box("RodSolid", 3.0, 3.0, 520.0);
    let rod = match wires {
        Some((root, tip)) => {
            let mut rod = Rod::new(Some(solid), root, tip);
            rod.set_points(1.0, 1.0);
            rod
        }
        None => Rod::new(Some(solid), None, None),
    };
    let id = doc.add_feature("Rod", rod)?;
    doc.set_owner(solid, id)?;
    Ok(id)
}

/// Bekleding van de neus tussen punt 1 en 2 van beide vleugeldraden.
pub fn create_wrap_leading_edge(
    doc: &mut Document,
    selection: &[ObjectId],
) -> Result<ObjectId, CommandError> {
    let wing = selected_wing(doc, selection).ok_or(CommandError::NoWingSelected)?;
    let mut wrap = WrapLeadingEdge::new(wing.root_wire(), wing.tip_wire());
    wrap.set_range(1.0, 2.0);
    Ok(doc.add_feature("WrapLeadingEdge", wrap)?)
}

/// Neuslijst op de vleugeldraden, of ongekoppeld zonder vleugel.
pub fn create_leading_edge(doc: &mut Document, selection: &[ObjectId]) -> Result<ObjectId, CommandError> {
    let feature = match selected_wing(doc, selection) {
        Some(wing) => LeadingEdge::new(wing.root_wire(), wing.tip_wire()),
        None => LeadingEdge::default(),
    };
    Ok(doc.add_feature("LeadingEdge", feature)?)
}

pub fn create_cut_wire(doc: &mut Document, selection: &[ObjectId]) -> Result<ObjectId, CommandError> {
    let wire = selected_wire(doc, selection);
    Ok(doc.add_feature("CutWire", CutWire::new(wire, 0.0, 1.0))?)
}

pub fn create_section(doc: &mut Document, selection: &[ObjectId]) -> Result<ObjectId, CommandError> {
    let solid = selected_solid(doc, selection);
    Ok(doc.add_feature("Section", Section::new(solid, RefPlane::XY, 0.0))?)
}

pub fn create_ribs(doc: &mut Document, selection: &[ObjectId]) -> Result<ObjectId, CommandError> {
    let solid = selected_solid(doc, selection);
    Ok(doc.add_feature("Ribs", Ribs::new(solid, 5, 10.0))?)
}
