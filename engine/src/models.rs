//! Value types produced by concept and structure computations.
//!
//! Everything here is built once and read through accessors; there are no
//! setters.

use serde::{Deserialize, Serialize};

use crate::{
    nodes::{Bipartition, NodeSet},
    repertoire::{Direction, Repertoire},
};

/// Renumber `set`, whose node `k` stands for the `k`-th member of `onto`.
fn lift(set: NodeSet, onto: NodeSet) -> NodeSet {
    NodeSet::from_bits(onto.scatter(set.bits() as usize))
}

fn lift_partition(partition: Bipartition, onto: NodeSet) -> Bipartition {
    Bipartition::new(lift(partition.part1(), onto), lift(partition.part2(), onto))
}

/// Winning purview of a cause or effect search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepertoireResult {
    direction: Direction,
    purview: NodeSet,
    repertoire: Repertoire,
    phi: f64,
    partition: Option<Bipartition>,
}

impl RepertoireResult {
    pub fn new(
        direction: Direction,
        purview: NodeSet,
        repertoire: Repertoire,
        phi: f64,
        partition: Option<Bipartition>,
    ) -> Self {
        Self {
            direction,
            purview,
            repertoire,
            phi,
            partition,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn purview(&self) -> NodeSet {
        self.purview
    }

    pub fn repertoire(&self) -> &Repertoire {
        &self.repertoire
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Mechanism cut that achieved `phi`, if the mechanism could be cut.
    pub fn partition(&self) -> Option<&Bipartition> {
        self.partition.as_ref()
    }

    fn remapped(&self, onto: NodeSet) -> Self {
        Self {
            purview: lift(self.purview, onto),
            partition: self.partition.map(|p| lift_partition(p, onto)),
            ..self.clone()
        }
    }
}

/// An irreducible cause/effect pair specified by one mechanism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    mechanism: NodeSet,
    cause: RepertoireResult,
    effect: RepertoireResult,
    phi: f64,
}

impl Concept {
    /// Pair a cause and an effect; `phi` is the smaller of the two.
    pub fn new(mechanism: NodeSet, cause: RepertoireResult, effect: RepertoireResult) -> Self {
        let phi = cause.phi().min(effect.phi());
        Self {
            mechanism,
            cause,
            effect,
            phi,
        }
    }

    pub fn mechanism(&self) -> NodeSet {
        self.mechanism
    }

    pub fn cause(&self) -> &RepertoireResult {
        &self.cause
    }

    pub fn effect(&self) -> &RepertoireResult {
        &self.effect
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Re-express a concept computed on a sub-network whose node `k` is the
    /// `k`-th member of `onto` in the parent network's numbering.
    pub fn remapped(&self, onto: NodeSet) -> Self {
        Self {
            mechanism: lift(self.mechanism, onto),
            cause: self.cause.remapped(onto),
            effect: self.effect.remapped(onto),
            phi: self.phi,
        }
    }
}

/// Cause-effect structure: every concept a system specifies in one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptStructure {
    concepts: Vec<Concept>,
    phi: f64,
    partition: Option<Bipartition>,
}

impl ConceptStructure {
    pub fn new(concepts: Vec<Concept>, phi: f64, partition: Option<Bipartition>) -> Self {
        Self {
            concepts,
            phi,
            partition,
        }
    }

    /// A structure whose system-level phi has not been evaluated.
    pub fn unevaluated(concepts: Vec<Concept>) -> Self {
        Self::new(concepts, 0.0, None)
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// System MIP, when one was found.
    pub fn partition(&self) -> Option<&Bipartition> {
        self.partition.as_ref()
    }

    pub fn num_concepts(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Sum of the concepts' small phi.
    pub fn total_concept_phi(&self) -> f64 {
        self.concepts.iter().map(Concept::phi).sum()
    }

    pub fn get_concept(&self, mechanism: NodeSet) -> Option<&Concept> {
        self.concepts.iter().find(|c| c.mechanism() == mechanism)
    }

    /// See [`Concept::remapped`]; the system cut is moved as well.
    pub fn remapped(&self, onto: NodeSet) -> Self {
        Self {
            concepts: self.concepts.iter().map(|c| c.remapped(onto)).collect(),
            phi: self.phi,
            partition: self.partition.map(|p| lift_partition(p, onto)),
        }
    }
}

/// Outcome of a system-level partition search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionResult {
    partition: Bipartition,
    phi: f64,
    unpartitioned: ConceptStructure,
    partitioned: ConceptStructure,
}

impl PartitionResult {
    pub fn new(
        partition: Bipartition,
        phi: f64,
        unpartitioned: ConceptStructure,
        partitioned: ConceptStructure,
    ) -> Self {
        Self {
            partition,
            phi,
            unpartitioned,
            partitioned,
        }
    }

    pub fn partition(&self) -> &Bipartition {
        &self.partition
    }

    pub fn part1(&self) -> NodeSet {
        self.partition.part1()
    }

    pub fn part2(&self) -> NodeSet {
        self.partition.part2()
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    pub fn unpartitioned(&self) -> &ConceptStructure {
        &self.unpartitioned
    }

    pub fn partitioned(&self) -> &ConceptStructure {
        &self.partitioned
    }

    /// True when one side of the cut holds every node.
    pub fn is_trivial_partition(&self) -> bool {
        self.partition.is_trivial()
    }

    /// The unpartitioned structure annotated with this result's phi and cut.
    pub fn into_structure(self) -> ConceptStructure {
        let partition = (!self.partition.is_trivial()).then_some(self.partition);
        ConceptStructure::new(self.unpartitioned.concepts, self.phi, partition)
    }
}

/// Node subset with the highest Big Phi in a given state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainComplex {
    nodes: NodeSet,
    structure: ConceptStructure,
}

impl MainComplex {
    pub fn new(nodes: NodeSet, structure: ConceptStructure) -> Self {
        Self { nodes, structure }
    }

    pub fn nodes(&self) -> NodeSet {
        self.nodes
    }

    pub fn phi(&self) -> f64 {
        self.structure.phi()
    }

    /// Structure of the complex, numbered in the parent network's nodes.
    pub fn structure(&self) -> &ConceptStructure {
        &self.structure
    }
}
