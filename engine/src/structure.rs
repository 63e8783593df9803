//! Unfolding of the full cause-effect structure and system-level phi.

use rayon::prelude::*;

use crate::{
    config::ComputeOptions,
    errors::{PhiError, Result},
    models::{Concept, ConceptStructure, MainComplex, PartitionResult},
    network::Network,
    nodes::{Bipartition, NodeSet},
    partition::PartCache,
    state::SystemState,
    subsystem::Subsystem,
    telemetry,
};

impl Subsystem<'_> {
    /// Every concept with positive phi, in mechanism enumeration order.
    pub fn concepts(&self) -> Result<Vec<Concept>> {
        let mechanisms: Vec<NodeSet> = self.node_indices().subsets(1).collect();
        let found: Vec<Option<Concept>> = if self.options().parallel {
            mechanisms
                .par_iter()
                .map(|&mechanism| self.concept_unchecked(mechanism))
                .collect()
        } else {
            mechanisms
                .iter()
                .map(|&mechanism| self.concept_unchecked(mechanism))
                .collect()
        };
        Ok(found.into_iter().flatten().collect())
    }

    /// System MIP against the full structure. An empty structure is
    /// trivially reducible: phi 0 under the trivial partition.
    pub fn mip(&self) -> Result<PartitionResult> {
        let unpartitioned = ConceptStructure::unevaluated(self.concepts()?);
        if unpartitioned.is_empty() {
            let trivial = Bipartition::new(self.node_indices(), NodeSet::empty());
            return Ok(PartitionResult::new(
                trivial,
                0.0,
                unpartitioned.clone(),
                unpartitioned,
            ));
        }
        self.find_system_mip(&unpartitioned)
    }

    /// Full structure annotated with Big Phi and the system MIP.
    pub fn concept_structure(&self) -> Result<ConceptStructure> {
        let ces = self.mip()?.into_structure();
        tracing::info!(
            target: "phi",
            state = %self.state(),
            concepts = ces.num_concepts(),
            big_phi = ces.phi(),
            cut = ?ces.partition().map(ToString::to_string),
            "concept structure unfolded"
        );
        telemetry::record_structure(&ces);
        Ok(ces)
    }

    pub fn phi(&self) -> Result<f64> {
        Ok(self.mip()?.phi())
    }

    /// Structure of the system with every cross-part interaction severed:
    /// each part contributes the concepts of its own sub-network, whose
    /// mechanisms never straddle the cut.
    pub fn partitioned_ces(&self, partition: &Bipartition) -> Result<ConceptStructure> {
        self.check_nodes(partition.nodes(), "partition")?;
        self.partitioned_ces_cached(partition, None)
    }

    pub(crate) fn partitioned_ces_cached(
        &self,
        partition: &Bipartition,
        cache: Option<&PartCache>,
    ) -> Result<ConceptStructure> {
        let mut concepts = Vec::new();
        for part in partition.parts() {
            if part.is_empty() {
                continue;
            }
            concepts.extend(self.part_concepts(part, cache)?.iter().cloned());
        }
        Ok(ConceptStructure::unevaluated(concepts))
    }

    /// Node subset whose own sub-network has the highest Big Phi. The first
    /// subset in enumeration order wins ties, so a system with no integration
    /// anywhere reports its first single node.
    pub fn main_complex(&self) -> Result<MainComplex> {
        let mut best: Option<MainComplex> = None;
        for nodes in self.node_indices().subsets(1) {
            let subnetwork = self.network().subnetwork(nodes)?;
            let ces = Subsystem::new(&subnetwork, self.state().restrict(nodes))?
                .with_options(*self.options())
                .mip()?
                .into_structure();
            if best.as_ref().map_or(true, |b| ces.phi() > b.phi()) {
                best = Some(MainComplex::new(nodes, ces.remapped(nodes)));
            }
        }
        best.ok_or_else(|| PhiError::config("network has no nodes"))
    }
}

/// Concept structure of `network` in `state` with default options.
pub fn concept_structure(network: &Network, state: &SystemState) -> Result<ConceptStructure> {
    Subsystem::new(network, *state)?.concept_structure()
}

/// Big Phi of `network` in `state` with default options.
pub fn phi(network: &Network, state: &SystemState) -> Result<f64> {
    Subsystem::new(network, *state)?.phi()
}

pub fn mip(network: &Network, state: &SystemState) -> Result<PartitionResult> {
    Subsystem::new(network, *state)?.mip()
}

pub fn main_complex(
    network: &Network,
    state: &SystemState,
    options: ComputeOptions,
) -> Result<MainComplex> {
    Subsystem::new(network, *state)?
        .with_options(options)
        .main_complex()
}
