//! WrapLeadingEdge: beplanking rond de neus van wortel- en tipprofiel.

use serde::Serialize;

use super::{
    Feature, FeatureError, FeatureResult, drop_child, ensure_loft, ensure_wire, link_value, linked_wire,
    present,
};
use crate::document::{Document, ObjectId, PropertyKind, PropertySpec, PropertyValue};
use crate::geom::{Polyline, Sampling, TangentType, Wrap};

const PROPERTIES: &[PropertySpec] = &[
    PropertySpec::new("RootWire", PropertyKind::Link, "WrapLeadingEdge", "Root wire"),
    PropertySpec::new("TipWire", PropertyKind::Link, "WrapLeadingEdge", "Tip wire"),
    PropertySpec::new("RootStartPoint", PropertyKind::Number, "WrapLeadingEdge", "Wrap start on the root wire"),
    PropertySpec::new("RootEndPoint", PropertyKind::Number, "WrapLeadingEdge", "Wrap end on the root wire"),
    PropertySpec::new("TipStartPoint", PropertyKind::Number, "WrapLeadingEdge", "Wrap start on the tip wire"),
    PropertySpec::new("TipEndPoint", PropertyKind::Number, "WrapLeadingEdge", "Wrap end on the tip wire"),
    PropertySpec::new("Thickness", PropertyKind::Number, "WrapLeadingEdge", "Sheeting thickness"),
    PropertySpec::new("Inward", PropertyKind::Boolean, "WrapLeadingEdge", "Offset towards the inside"),
    PropertySpec::new("TangentType", PropertyKind::Enumeration, "WrapLeadingEdge", "Neighbours used for the tangent")
        .choices(TangentType::NAMES),
    PropertySpec::new("MakeLoft", PropertyKind::Boolean, "WrapLeadingEdge", "Loft the two wraps"),
    PropertySpec::new("MakeCutWires", PropertyKind::Boolean, "WrapLeadingEdge", "Build the wires left after wrapping"),
    PropertySpec::new("RootWrap", PropertyKind::Link, "WrapLeadingEdge", "Root wrap").read_only(),
    PropertySpec::new("TipWrap", PropertyKind::Link, "WrapLeadingEdge", "Tip wrap").read_only(),
    PropertySpec::new("RootCut", PropertyKind::Link, "WrapLeadingEdge", "Root wire after wrapping").read_only(),
    PropertySpec::new("TipCut", PropertyKind::Link, "WrapLeadingEdge", "Tip wire after wrapping").read_only(),
    PropertySpec::new("Loft", PropertyKind::Link, "WrapLeadingEdge", "Loft of the wraps").read_only(),
];

/// Bereik op één draad.
#[derive(Debug, Clone, Copy, Serialize)]
struct WrapRange {
    start: f64,
    end: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WrapLeadingEdge {
    root_wire: Option<ObjectId>,
    tip_wire: Option<ObjectId>,
    root: WrapRange,
    tip: WrapRange,
    thickness: f64,
    inward: bool,
    tangent_type: TangentType,
    make_loft: bool,
    make_cut_wires: bool,
    root_wrap: Option<ObjectId>,
    tip_wrap: Option<ObjectId>,
    root_cut: Option<ObjectId>,
    tip_cut: Option<ObjectId>,
    loft: Option<ObjectId>,
}

impl Default for WrapLeadingEdge {
    fn default() -> Self {
        Self {
            root_wire: None,
            tip_wire: None,
            root: WrapRange { start: 0.0, end: 1.0 },
            tip: WrapRange { start: 0.0, end: 1.0 },
            thickness: 1.5,
            inward: true,
            tangent_type: TangentType::default(),
            make_loft: false,
            make_cut_wires: false,
            root_wrap: None,
            tip_wrap: None,
            root_cut: None,
            tip_cut: None,
            loft: None,
        }
    }
}

impl WrapLeadingEdge {
    #[must_use]
    pub fn new(root_wire: Option<ObjectId>, tip_wire: Option<ObjectId>) -> Self {
        Self {
            root_wire,
            tip_wire,
            ..Self::default()
        }
    }

    /// Zet begin en einde op beide draden.
    pub fn set_range(&mut self, start: f64, end: f64) {
        self.root = WrapRange { start, end };
        self.tip = WrapRange { start, end };
    }

    #[must_use]
    pub fn root_wrap(&self) -> Option<ObjectId> {
        self.root_wrap
    }

    #[must_use]
    pub fn tip_wrap(&self) -> Option<ObjectId> {
        self.tip_wrap
    }

    fn wrap(&self, sampling: Sampling, wire: Option<&Polyline>, range: WrapRange) -> Option<Wrap> {
        wire.and_then(|wire| {
            sampling.wrap(wire, range.start, range.end, self.thickness, self.tangent_type, self.inward)
        })
    }
}

/// Werkt de wrap en de restdraad van één kant bij.
#[allow(clippy::too_many_arguments)]
fn update_side(
    doc: &mut Document,
    owner: ObjectId,
    wire: Option<&Polyline>,
    range: WrapRange,
    wrap: Option<Wrap>,
    make_cut: bool,
    slots: (&mut Option<ObjectId>, &mut Option<ObjectId>),
    names: (&str, &str),
) -> FeatureResult {
    let (wrap_slot, cut_slot) = slots;
    let (Some(wire), Some(wrap)) = (wire, wrap) else {
        drop_child(doc, wrap_slot)?;
        drop_child(doc, cut_slot)?;
        return Ok(());
    };
    ensure_wire(doc, wrap_slot, owner, names.0, wrap.ribbon(), true)?;
    let sampling = doc.sampling();
    match sampling
        .cut_after_wrap(wire, range.start, range.end, &wrap)
        .filter(|_| make_cut)
    {
        Some(points) => {
            ensure_wire(doc, cut_slot, owner, names.1, points, true)?;
        }
        None => drop_child(doc, cut_slot)?,
    }
    Ok(())
}

impl Feature for WrapLeadingEdge {
    fn kind(&self) -> &'static str {
        "WrapLeadingEdge"
    }

    fn properties(&self) -> &'static [PropertySpec] {
        PROPERTIES
    }

    fn property(&self, name: &str) -> FeatureResult<PropertyValue> {
        let value = match name {
            "RootWire" => link_value(self.root_wire),
            "TipWire" => link_value(self.tip_wire),
            "RootStartPoint" => PropertyValue::Number(self.root.start),
            "RootEndPoint" => PropertyValue::Number(self.root.end),
            "TipStartPoint" => PropertyValue::Number(self.tip.start),
            "TipEndPoint" => PropertyValue::Number(self.tip.end),
            "Thickness" => PropertyValue::Number(self.thickness),
            "Inward" => PropertyValue::Boolean(self.inward),
            "TangentType" => PropertyValue::Enumeration(self.tangent_type.name().to_owned()),
            "MakeLoft" => PropertyValue::Boolean(self.make_loft),
            "MakeCutWires" => PropertyValue::Boolean(self.make_cut_wires),
            "RootWrap" => link_value(self.root_wrap),
            "TipWrap" => link_value(self.tip_wrap),
            "RootCut" => link_value(self.root_cut),
            "TipCut" => link_value(self.tip_cut),
            "Loft" => link_value(self.loft),
            _ => return Err(FeatureError::UnknownProperty(name.to_owned())),
        };
        Ok(value)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> FeatureResult {
        match name {
            "RootWire" => self.root_wire = value.expect_link()?,
            "TipWire" => self.tip_wire = value.expect_link()?,
            "RootStartPoint" => self.root.start = value.expect_number()?,
            "RootEndPoint" => self.root.end = value.expect_number()?,
            "TipStartPoint" => self.tip.start = value.expect_number()?,
            "TipEndPoint" => self.tip.end = value.expect_number()?,
            "Thickness" => self.thickness = value.expect_number()?,
            "Inward" => self.inward = value.expect_boolean()?,
            "TangentType" => {
                let choice = value.expect_enumeration()?;
                self.tangent_type =
                    TangentType::from_name(choice).ok_or_else(|| FeatureError::invalid(name, choice))?;
            }
            "MakeLoft" => self.make_loft = value.expect_boolean()?,
            "MakeCutWires" => self.make_cut_wires = value.expect_boolean()?,
            _ => return Err(FeatureError::UnknownProperty(name.to_owned())),
        }
        Ok(())
    }

    fn inputs(&self, _doc: &Document) -> Vec<ObjectId> {
        present(&[self.root_wire, self.tip_wire])
    }

    fn outputs(&self, _doc: &Document) -> Vec<ObjectId> {
        present(&[self.root_wrap, self.tip_wrap, self.root_cut, self.tip_cut, self.loft])
    }

    fn execute(&mut self, id: ObjectId, doc: &mut Document) -> FeatureResult {
        let root_wire = linked_wire(doc, self.root_wire);
        let tip_wire = linked_wire(doc, self.tip_wire);
        let sampling = doc.sampling();
        let root_wrap = self.wrap(sampling, root_wire.as_ref(), self.root);
        let tip_wrap = self.wrap(sampling, tip_wire.as_ref(), self.tip);

        update_side(
            doc,
            id,
            root_wire.as_ref(),
            self.root,
            root_wrap,
            self.make_cut_wires,
            (&mut self.root_wrap, &mut self.root_cut),
            ("RootWrap", "RootCut"),
        )?;
        update_side(
            doc,
            id,
            tip_wire.as_ref(),
            self.tip,
            tip_wrap,
            self.make_cut_wires,
            (&mut self.tip_wrap, &mut self.tip_cut),
            ("TipWrap", "TipCut"),
        )?;

        match (self.make_loft, self.root_wrap, self.tip_wrap) {
            (true, Some(root), Some(tip)) => {
                ensure_loft(doc, &mut self.loft, id, "Loft", vec![root, tip])?;
            }
            _ => drop_child(doc, &mut self.loft)?,
        }
        log::debug!(
            "neusbeplanking: wrap wortel {:?}, tip {:?}",
            self.root_wrap,
            self.tip_wrap
        );
        Ok(())
    }
}
