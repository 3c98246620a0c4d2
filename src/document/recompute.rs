//! Incrementele herberekening van gewijzigde objecten en hun afhankelijken.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::Document;
use super::object::ObjectId;
use super::topo::{Topology, TopologyError};
use crate::features::FeatureError;

/// Verslag van één herberekening.
#[derive(Debug, Default, Serialize)]
pub struct RecomputeReport {
    /// Features die zonder fout uitgevoerd zijn, in uitvoeringsvolgorde.
    pub recomputed: Vec<ObjectId>,
    /// Features die faalden, met hun fout.
    #[serde(skip)]
    pub failed: Vec<(ObjectId, FeatureError)>,
    /// Features die overgeslagen zijn omdat een invoer faalde.
    pub skipped: Vec<ObjectId>,
}

impl RecomputeReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }

    #[must_use]
    pub fn failed_ids(&self) -> Vec<ObjectId> {
        self.failed.iter().map(|(id, _)| *id).collect()
    }
}

/// Fouttype voor een herberekening die niet kan starten.
#[derive(Debug)]
pub enum RecomputeError {
    Topology(TopologyError),
}

impl fmt::Display for RecomputeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topology(err) => write!(f, "topologiesortering mislukt: {err}"),
        }
    }
}

impl std::error::Error for RecomputeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Topology(err) => Some(err),
        }
    }
}

impl From<TopologyError> for RecomputeError {
    fn from(error: TopologyError) -> Self {
        Self::Topology(error)
    }
}

impl Document {
    /// Herberekent alle gemarkeerde objecten en alles wat ervan afhangt, in
    /// topologische volgorde. Een falende feature stopt de run niet; enkel
    /// zijn afhankelijken worden overgeslagen.
    pub fn recompute(&mut self) -> Result<RecomputeReport, RecomputeError> {
        let topology = Topology::sort(self)?;
        let dirty = topology.downstream(&self.touched);
        let mut report = RecomputeReport::default();
        let mut blocked: BTreeSet<ObjectId> = BTreeSet::new();

        log::debug!(
            "herberekening: {} gemarkeerd, {} te bezoeken",
            self.touched.len(),
            dirty.len()
        );

        for &id in &topology.order {
            if !dirty.contains(&id) || !self.contains(id) {
                continue;
            }
            let upstream_blocked = topology
                .predecessors(id)
                .iter()
                .any(|pred| blocked.contains(pred));
            let is_feature = self.features.contains_key(&id);

            if upstream_blocked {
                blocked.insert(id);
                if is_feature {
                    log::warn!("feature `{}` overgeslagen: invoer faalde", self.name_of(id));
                    report.skipped.push(id);
                }
                continue;
            }
            if !is_feature {
                continue;
            }

            let outcome = match self.with_feature(id, |feature, doc| feature.as_feature_mut().execute(id, doc)) {
                Ok(outcome) => outcome,
                Err(_) => continue,
            };
            match outcome {
                Ok(()) => {
                    log::debug!("feature `{}` herberekend", self.name_of(id));
                    report.recomputed.push(id);
                }
                Err(err) => {
                    log::warn!("feature `{}` faalde: {err}", self.name_of(id));
                    blocked.insert(id);
                    report.failed.push((id, err));
                }
            }
        }

        self.touched.clear();
        Ok(report)
    }

    /// Markeert alle objecten en herberekent het volledige document.
    pub fn recompute_all(&mut self) -> Result<RecomputeReport, RecomputeError> {
        let ids: Vec<ObjectId> = self.object_ids().collect();
        self.touched.extend(ids);
        self.recompute()
    }
}
