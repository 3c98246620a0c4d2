//! LeadingEdge: snijdt wortel- en tipdraad op overeenkomstige posities.
//!
//! Het snijvlak gaat door begin- en eindpunt op de wortel en het beginpunt
//! op de tip. Het eindpunt op de tip is het eerste snijpunt van de tipdraad
//! met dat vlak. Zonder snijpunt blijft alles ongewijzigd.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{Feature, FeatureError, FeatureResult, drop_child, ensure_wire, link_value, linked_wire, present};
use crate::document::{Document, ObjectId, PropertyKind, PropertySpec, PropertyValue};
use crate::geom::{CutSide, CutType, Plane, WireCut, calculate_tip_end_point};

const PROPERTIES: &[PropertySpec] = &[
    PropertySpec::new("RootWire", PropertyKind::Link, "LeadingEdge", "Root wire"),
    PropertySpec::new("TipWire", PropertyKind::Link, "LeadingEdge", "Tip wire"),
    PropertySpec::new("RootStartPoint", PropertyKind::Number, "LeadingEdge", "Cut start on the root wire"),
    PropertySpec::new("RootEndPoint", PropertyKind::Number, "LeadingEdge", "Cut end on the root wire"),
    PropertySpec::new("TipStartPoint", PropertyKind::Number, "LeadingEdge", "Cut start on the tip wire"),
    PropertySpec::new("TipEndPoint", PropertyKind::Number, "LeadingEdge", "Matching cut end on the tip wire")
        .read_only(),
    PropertySpec::new("CutType", PropertyKind::Enumeration, "LeadingEdge", "Halves to keep")
        .choices(CutType::NAMES),
    PropertySpec::new("RootLeft", PropertyKind::Link, "LeadingEdge", "Left half of the root wire").read_only(),
    PropertySpec::new("RootRight", PropertyKind::Link, "LeadingEdge", "Right half of the root wire").read_only(),
    PropertySpec::new("TipLeft", PropertyKind::Link, "LeadingEdge", "Left half of the tip wire").read_only(),
    PropertySpec::new("TipRight", PropertyKind::Link, "LeadingEdge", "Right half of the tip wire").read_only(),
];

/// Kinddraden van één kant.
#[derive(Debug, Clone, Copy, Default, Serialize)]
struct SideWires {
    root: Option<ObjectId>,
    tip: Option<ObjectId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadingEdge {
    root_wire: Option<ObjectId>,
    tip_wire: Option<ObjectId>,
    root_start_point: f64,
    root_end_point: f64,
    tip_start_point: f64,
    tip_end_point: f64,
    cut_type: CutType,
    sides: BTreeMap<CutSide, SideWires>,
}

impl Default for LeadingEdge {
    fn default() -> Self {
        Self {
            root_wire: None,
            tip_wire: None,
            root_start_point: 0.0,
            root_end_point: 1.0,
            tip_start_point: 0.0,
            tip_end_point: 0.0,
            cut_type: CutType::default(),
            sides: BTreeMap::new(),
        }
    }
}

impl LeadingEdge {
    #[must_use]
    pub fn new(root_wire: Option<ObjectId>, tip_wire: Option<ObjectId>) -> Self {
        Self {
            root_wire,
            tip_wire,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn tip_end_point(&self) -> f64 {
        self.tip_end_point
    }

    fn side(&self, side: CutSide) -> SideWires {
        self.sides.get(&side).copied().unwrap_or_default()
    }

    fn drop_side(&mut self, doc: &mut Document, side: CutSide) -> FeatureResult {
        if let Some(mut wires) = self.sides.remove(&side) {
            drop_child(doc, &mut wires.root)?;
            drop_child(doc, &mut wires.tip)?;
        }
        Ok(())
    }

    fn write_side(
        &mut self,
        doc: &mut Document,
        owner: ObjectId,
        side: CutSide,
        cuts: (&WireCut, &WireCut),
    ) -> FeatureResult {
        let mut wires = self.side(side);
        let (root_name, tip_name) = match side {
            CutSide::Left => ("RootLeft", "TipLeft"),
            CutSide::Right => ("RootRight", "TipRight"),
        };
        ensure_wire(doc, &mut wires.root, owner, root_name, cuts.0.side(side).to_vec(), false)?;
        ensure_wire(doc, &mut wires.tip, owner, tip_name, cuts.1.side(side).to_vec(), false)?;
        self.sides.insert(side, wires);
        Ok(())
    }
}

impl Feature for LeadingEdge {
    fn kind(&self) -> &'static str {
        "LeadingEdge"
    }

    fn properties(&self) -> &'static [PropertySpec] {
        PROPERTIES
    }

    fn property(&self, name: &str) -> FeatureResult<PropertyValue> {
        let value = match name {
            "RootWire" => link_value(self.root_wire),
            "TipWire" => link_value(self.tip_wire),
            "RootStartPoint" => PropertyValue::Number(self.root_start_point),
            "RootEndPoint" => PropertyValue::Number(self.root_end_point),
            "TipStartPoint" => PropertyValue::Number(self.tip_start_point),
            "TipEndPoint" => PropertyValue::Number(self.tip_end_point),
            "CutType" => PropertyValue::Enumeration(self.cut_type.name().to_owned()),
            "RootLeft" => link_value(self.side(CutSide::Left).root),
            "RootRight" => link_value(self.side(CutSide::Right).root),
            "TipLeft" => link_value(self.side(CutSide::Left).tip),
            "TipRight" => link_value(self.side(CutSide::Right).tip),
            _ => return Err(FeatureError::UnknownProperty(name.to_owned())),
        };
        Ok(value)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> FeatureResult {
        match name {
            "RootWire" => self.root_wire = value.expect_link()?,
            "TipWire" => self.tip_wire = value.expect_link()?,
            "RootStartPoint" => self.root_start_point = value.expect_number()?,
            "RootEndPoint" => self.root_end_point = value.expect_number()?,
            "TipStartPoint" => self.tip_start_point = value.expect_number()?,
            "CutType" => {
                let choice = value.expect_enumeration()?;
                self.cut_type = CutType::from_name(choice).ok_or_else(|| FeatureError::invalid(name, choice))?;
            }
            _ => return Err(FeatureError::UnknownProperty(name.to_owned())),
        }
        Ok(())
    }

    fn inputs(&self, _doc: &Document) -> Vec<ObjectId> {
        present(&[self.root_wire, self.tip_wire])
    }

    fn outputs(&self, _doc: &Document) -> Vec<ObjectId> {
        let children: Vec<Option<ObjectId>> = self
            .sides
            .values()
            .flat_map(|wires| [wires.root, wires.tip])
            .collect();
        present(&children)
    }

    fn execute(&mut self, id: ObjectId, doc: &mut Document) -> FeatureResult {
        let (Some(root), Some(tip)) = (linked_wire(doc, self.root_wire), linked_wire(doc, self.tip_wire)) else {
            log::debug!("neuslijst zonder twee draden; niets te doen");
            return Ok(());
        };
        let sampling = doc.sampling();
        let points = (
            sampling.point(&root, self.root_start_point),
            sampling.point(&root, self.root_end_point),
            sampling.point(&tip, self.tip_start_point),
        );
        let (Some(root_start), Some(root_end), Some(tip_start)) = points else {
            return Ok(());
        };
        let Some(plane) = Plane::from_points(root_start, root_end, tip_start) else {
            log::warn!("neuslijst: snijpunten liggen op één lijn");
            return Ok(());
        };
        let Some(tip_end) = calculate_tip_end_point(&tip, self.tip_start_point, &plane) else {
            log::warn!("neuslijst: tipdraad snijdt het vlak niet");
            return Ok(());
        };
        let (Some(root_cut), Some(tip_cut)) = (
            sampling.cut(&root, self.root_start_point, self.root_end_point),
            sampling.cut(&tip, self.tip_start_point, tip_end),
        ) else {
            return Ok(());
        };

        self.tip_end_point = tip_end;
        for side in [CutSide::Left, CutSide::Right] {
            if self.cut_type.includes(side) {
                self.write_side(doc, id, side, (&root_cut, &tip_cut))?;
            } else {
                self.drop_side(doc, side)?;
            }
        }
        Ok(())
    }
}
