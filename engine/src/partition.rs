//! Minimum information partitions at mechanism and system scope.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    distance::{intrinsic_difference, repertoire_distance, snap_to_zero},
    errors::{PhiError, Result},
    models::{Concept, ConceptStructure, PartitionResult},
    nodes::{Bipartition, Bipartitions, NodeSet},
    repertoire::{Direction, Repertoire},
    subsystem::Subsystem,
    telemetry,
};

/// Every bipartition of `nodes` into non-empty parts, both orderings.
pub fn all_bipartitions(nodes: NodeSet) -> Bipartitions {
    nodes.bipartitions()
}

/// Least damaging cut of a mechanism over one purview.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MechanismMip {
    partition: Option<Bipartition>,
    phi: f64,
}

impl MechanismMip {
    /// A mechanism that cannot be cut, or whose search failed.
    pub fn reducible() -> Self {
        Self {
            partition: None,
            phi: 0.0,
        }
    }

    pub fn partition(&self) -> Option<Bipartition> {
        self.partition
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }
}

/// Mechanism cut with the purview split between the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MechanismCut {
    mechanism: Bipartition,
    purview: Bipartition,
}

impl MechanismCut {
    pub fn mechanism(&self) -> &Bipartition {
        &self.mechanism
    }

    pub fn purview(&self) -> &Bipartition {
        &self.purview
    }

    /// `(mechanism part, purview part)` for each side.
    pub fn sides(&self) -> [(NodeSet, NodeSet); 2] {
        [
            (self.mechanism.part1(), self.purview.part1()),
            (self.mechanism.part2(), self.purview.part2()),
        ]
    }
}

/// Concept lists of partition parts, keyed by the part's node set.
pub(crate) type PartCache = Mutex<HashMap<NodeSet, Arc<Vec<Concept>>>>;

impl Subsystem<'_> {
    /// Give each purview node to the mechanism side whose outputs reach it.
    ///
    /// Nodes reached by both sides or by neither go to whichever purview side
    /// is smaller so far, the first side on ties. The MIP searches do not use
    /// this split; both sides of a cut see the whole purview.
    pub fn cut_mechanism(&self, partition: &Bipartition, purview: NodeSet) -> Result<MechanismCut> {
        self.check_nodes(partition.nodes(), "partition")?;
        self.check_nodes(purview, "purview")?;
        let network = self.network();
        let [reach1, reach2] = partition.parts().map(|part| network.outputs_of(part));

        let mut first = NodeSet::empty();
        let mut second = NodeSet::empty();
        for node in purview.iter() {
            let single = NodeSet::singleton(node);
            match (reach1.contains(node), reach2.contains(node)) {
                (true, false) => first = first.union(single),
                (false, true) => second = second.union(single),
                _ if first.len() <= second.len() => first = first.union(single),
                _ => second = second.union(single),
            }
        }
        Ok(MechanismCut {
            mechanism: *partition,
            purview: Bipartition::new(first, second),
        })
    }

    /// Minimum distance between `repertoire` (the whole mechanism's) and the
    /// repertoire of any bipartition of the mechanism.
    pub fn find_mip_for_mechanism(
        &self,
        mechanism: NodeSet,
        purview: NodeSet,
        repertoire: &Repertoire,
        direction: Direction,
    ) -> Result<MechanismMip> {
        self.check_nodes(mechanism, "mechanism")?;
        self.check_nodes(purview, "purview")?;
        let expected = 1usize << purview.len();
        if repertoire.len() != expected {
            return Err(PhiError::DimensionMismatch {
                left: repertoire.len(),
                right: expected,
            });
        }
        Ok(self.mechanism_mip(direction, mechanism, purview, repertoire))
    }

    pub(crate) fn mechanism_mip(
        &self,
        direction: Direction,
        mechanism: NodeSet,
        purview: NodeSet,
        repertoire: &Repertoire,
    ) -> MechanismMip {
        match self.search_mechanism_mip(direction, mechanism, purview, repertoire) {
            Ok(mip) => mip,
            Err(err) => {
                tracing::warn!(
                    target: "phi",
                    %mechanism,
                    %purview,
                    %direction,
                    "mechanism MIP search failed, using phi = 0: {err}"
                );
                MechanismMip::reducible()
            }
        }
    }

    fn search_mechanism_mip(
        &self,
        direction: Direction,
        mechanism: NodeSet,
        purview: NodeSet,
        repertoire: &Repertoire,
    ) -> Result<MechanismMip> {
        if mechanism.len() < 2 {
            return Ok(MechanismMip::reducible());
        }
        let measure = self.options().measure;
        let mut best: Option<MechanismMip> = None;
        for partition in self.bipartitions(mechanism) {
            let cut = self.partitioned_repertoire_unchecked(&partition, purview, direction);
            let phi = snap_to_zero(repertoire_distance(repertoire, &cut, measure)?);
            if best.map_or(true, |b| phi < b.phi) {
                best = Some(MechanismMip {
                    partition: Some(partition),
                    phi,
                });
            }
        }
        best.ok_or_else(|| {
            PhiError::Computation(format!("no partition found for mechanism {mechanism}"))
        })
    }

    /// Cut the whole system every possible way and keep the cut whose
    /// partitioned structure lies closest to `unpartitioned`.
    ///
    /// Distances below [`crate::distance::PRECISION`] count as zero, here and
    /// in the mechanism search. A single-node system has nothing to cut: the
    /// result carries the trivial partition, phi 0 and an empty partitioned
    /// structure.
    pub fn find_system_mip(&self, unpartitioned: &ConceptStructure) -> Result<PartitionResult> {
        let nodes = self.node_indices();
        let measure = self.options().measure;
        let cache = self.options().memoize.then(PartCache::default);
        let cache = cache.as_ref();

        let partitions: Vec<Bipartition> = self.bipartitions(nodes).collect();
        let evaluate = |partition: &Bipartition| -> Result<(f64, ConceptStructure)> {
            let partitioned = self.partitioned_ces_cached(partition, cache)?;
            let phi = snap_to_zero(intrinsic_difference(
                unpartitioned.concepts(),
                partitioned.concepts(),
                measure,
            )?);
            Ok((phi, partitioned))
        };
        let evaluated: Vec<(f64, ConceptStructure)> = if self.options().parallel {
            partitions.par_iter().map(evaluate).collect::<Result<_>>()?
        } else {
            partitions.iter().map(evaluate).collect::<Result<_>>()?
        };
        telemetry::record_partitions_evaluated(evaluated.len());

        let mut best: Option<(Bipartition, f64, ConceptStructure)> = None;
        for (partition, (phi, partitioned)) in partitions.into_iter().zip(evaluated) {
            tracing::trace!(target: "phi", cut = %partition, phi, "system cut evaluated");
            if best.as_ref().map_or(true, |(_, b, _)| phi < *b) {
                best = Some((partition, phi, partitioned));
            }
        }
        Ok(match best {
            Some((partition, phi, partitioned)) => {
                PartitionResult::new(partition, phi, unpartitioned.clone(), partitioned)
            }
            None => PartitionResult::new(
                Bipartition::new(nodes, NodeSet::empty()),
                0.0,
                unpartitioned.clone(),
                ConceptStructure::unevaluated(Vec::new()),
            ),
        })
    }

    /// Concepts of one partition part, numbered in this subsystem's nodes.
    pub(crate) fn part_concepts(
        &self,
        part: NodeSet,
        cache: Option<&PartCache>,
    ) -> Result<Arc<Vec<Concept>>> {
        if let Some(cache) = cache {
            if let Some(found) = cache.lock().get(&part) {
                telemetry::record_cache(true);
                return Ok(Arc::clone(found));
            }
            telemetry::record_cache(false);
        }
        let subnetwork = self.network().subnetwork(part)?;
        let sub = Subsystem::new(&subnetwork, self.state().restrict(part))?
            .with_options(*self.options());
        let concepts: Arc<Vec<Concept>> = Arc::new(
            sub.concepts()?
                .iter()
                .map(|concept| concept.remapped(part))
                .collect(),
        );
        if let Some(cache) = cache {
            cache.lock().insert(part, Arc::clone(&concepts));
        }
        Ok(concepts)
    }
}
