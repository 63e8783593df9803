//! Cause and effect repertoires: distributions over a purview's joint
//! configurations conditioned on a mechanism's current state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    errors::{PhiError, Result},
    nodes::{Bipartition, NodeSet},
    subsystem::Subsystem,
    utils::{is_distribution, normalized_or_uniform, uniform},
};

/// Temporal direction of a repertoire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Cause,
    Effect,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cause => f.write_str("cause"),
            Self::Effect => f.write_str("effect"),
        }
    }
}

/// Probability vector over `2^|purview|` configurations, always normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Repertoire(Vec<f64>);

impl Repertoire {
    /// The single-outcome distribution of an empty purview.
    pub fn trivial() -> Self {
        Self(vec![1.0])
    }

    /// Uniform distribution over a purview of `nodes` nodes.
    pub fn uniform(nodes: usize) -> Self {
        Self(uniform(1usize << nodes))
    }

    /// Normalize raw weights; a zero-mass vector becomes uniform.
    pub fn from_weights(weights: Vec<f64>) -> Self {
        Self(normalized_or_uniform(weights))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }

    pub fn is_distribution(&self, tol: f64) -> bool {
        is_distribution(&self.0, tol)
    }

    /// Re-express a repertoire over `from` as one over the superset `to`,
    /// spreading mass uniformly over the added nodes.
    pub fn expand(&self, from: NodeSet, to: NodeSet) -> Result<Self> {
        if !from.is_subset(to) {
            return Err(PhiError::config(format!(
                "cannot expand purview {from} onto {to}"
            )));
        }
        if self.len() != 1usize << from.len() {
            return Err(PhiError::DimensionMismatch {
                left: self.len(),
                right: 1usize << from.len(),
            });
        }
        let weight = 1.0 / (1usize << (to.len() - from.len())) as f64;
        Ok(Self(
            (0..1usize << to.len())
                .map(|index| self.0[from.gather(to.scatter(index))] * weight)
                .collect(),
        ))
    }
}

impl Subsystem<'_> {
    /// Distribution over past purview configurations that would produce the
    /// mechanism's observed state.
    pub fn cause_repertoire(&self, mechanism: NodeSet, purview: NodeSet) -> Result<Repertoire> {
        self.check_nodes(mechanism, "mechanism")?;
        self.check_nodes(purview, "purview")?;
        Ok(self.cause_repertoire_unchecked(mechanism, purview))
    }

    /// Distribution over next-step purview configurations from the current
    /// state.
    pub fn effect_repertoire(&self, mechanism: NodeSet, purview: NodeSet) -> Result<Repertoire> {
        self.check_nodes(mechanism, "mechanism")?;
        self.check_nodes(purview, "purview")?;
        Ok(self.effect_repertoire_unchecked(mechanism, purview))
    }

    pub fn repertoire(
        &self,
        direction: Direction,
        mechanism: NodeSet,
        purview: NodeSet,
    ) -> Result<Repertoire> {
        match direction {
            Direction::Cause => self.cause_repertoire(mechanism, purview),
            Direction::Effect => self.effect_repertoire(mechanism, purview),
        }
    }

    /// Repertoire of a cut mechanism: each part's repertoire over the same
    /// purview, multiplied as if independent. An empty part contributes a
    /// uniform distribution.
    pub fn partitioned_repertoire(
        &self,
        partition: &Bipartition,
        purview: NodeSet,
        direction: Direction,
    ) -> Result<Repertoire> {
        self.check_nodes(partition.nodes(), "partition")?;
        self.check_nodes(purview, "purview")?;
        Ok(self.partitioned_repertoire_unchecked(partition, purview, direction))
    }

    pub(crate) fn repertoire_unchecked(
        &self,
        direction: Direction,
        mechanism: NodeSet,
        purview: NodeSet,
    ) -> Repertoire {
        match direction {
            Direction::Cause => self.cause_repertoire_unchecked(mechanism, purview),
            Direction::Effect => self.effect_repertoire_unchecked(mechanism, purview),
        }
    }

    fn cause_repertoire_unchecked(&self, mechanism: NodeSet, purview: NodeSet) -> Repertoire {
        if purview.is_empty() {
            return Repertoire::trivial();
        }
        if mechanism.is_empty() {
            return Repertoire::uniform(purview.len());
        }
        let network = self.network();
        let state = self.state();
        // Nodes outside the purview keep their current value in the prior state.
        let background = state.bits() & !purview.bits();
        let weights = (0..1usize << purview.len())
            .map(|purview_index| {
                let prior = (background | purview.scatter(purview_index)) as usize;
                mechanism
                    .iter()
                    .map(|node| {
                        let p_on = network.p_on(prior, node);
                        if state.is_on(node) {
                            p_on
                        } else {
                            1.0 - p_on
                        }
                    })
                    .product::<f64>()
            })
            .collect();
        Repertoire::from_weights(weights)
    }

    fn effect_repertoire_unchecked(&self, mechanism: NodeSet, purview: NodeSet) -> Repertoire {
        if purview.is_empty() {
            return Repertoire::trivial();
        }
        if mechanism.is_empty() {
            return Repertoire::uniform(purview.len());
        }
        let network = self.network();
        let row = self.state().to_index();
        let weights = (0..1usize << purview.len())
            .map(|purview_index| {
                purview
                    .iter()
                    .enumerate()
                    .map(|(k, node)| {
                        let p_on = network.p_on(row, node);
                        if (purview_index >> k) & 1 == 1 {
                            p_on
                        } else {
                            1.0 - p_on
                        }
                    })
                    .product::<f64>()
            })
            .collect();
        Repertoire::from_weights(weights)
    }

    pub(crate) fn partitioned_repertoire_unchecked(
        &self,
        partition: &Bipartition,
        purview: NodeSet,
        direction: Direction,
    ) -> Repertoire {
        let [first, second] = partition.parts().map(|part| {
            if part.is_empty() {
                Repertoire::uniform(purview.len())
            } else {
                self.repertoire_unchecked(direction, part, purview)
            }
        });
        Repertoire::from_weights(
            first
                .as_slice()
                .iter()
                .zip(second.as_slice())
                .map(|(a, b)| a * b)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        fixtures::{copy_network, random_network, set},
        state::SystemState,
    };

    #[test]
    fn cause_repertoire_of_copy_network() {
        let network = copy_network();
        let subsystem = Subsystem::new(&network, SystemState::new(&[1, 0]).unwrap()).unwrap();
        let rep = subsystem
            .cause_repertoire(set(&[0]), set(&[0, 1]))
            .unwrap();
        assert_eq!(rep.as_slice(), &[0.0, 0.5, 0.0, 0.5]);
        let rep = subsystem.cause_repertoire(set(&[0, 1]), set(&[0, 1])).unwrap();
        assert_eq!(rep.as_slice(), &[0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn effect_repertoire_of_copy_network() {
        let network = copy_network();
        let subsystem = Subsystem::new(&network, SystemState::new(&[1, 0]).unwrap()).unwrap();
        let rep = subsystem
            .effect_repertoire(set(&[0]), set(&[0, 1]))
            .unwrap();
        assert_eq!(rep.len(), 4);
        assert_eq!(rep.as_slice(), &[0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn degenerate_inputs() {
        let network = copy_network();
        let subsystem = Subsystem::new(&network, SystemState::new(&[0, 1]).unwrap()).unwrap();
        for direction in [Direction::Cause, Direction::Effect] {
            let empty_purview = subsystem
                .repertoire(direction, set(&[0]), NodeSet::empty())
                .unwrap();
            assert_eq!(empty_purview, Repertoire::trivial());
            let empty_mechanism = subsystem
                .repertoire(direction, NodeSet::empty(), set(&[0, 1]))
                .unwrap();
            assert_eq!(empty_mechanism, Repertoire::uniform(2));
        }
    }

    #[test]
    fn impossible_mechanism_state_is_uniform() {
        // Node 0 never turns on, so observing it on has no possible cause.
        let network = crate::network::Network::new(vec![
            vec![0.0, 0.3],
            vec![0.0, 0.6],
            vec![0.0, 0.2],
            vec![0.0, 0.9],
        ])
        .unwrap();
        let subsystem = Subsystem::new(&network, SystemState::new(&[1, 1]).unwrap()).unwrap();
        let rep = subsystem.cause_repertoire(set(&[0]), set(&[1])).unwrap();
        assert_eq!(rep, Repertoire::uniform(1));
    }

    #[test]
    fn rejects_foreign_nodes() {
        let network = copy_network();
        let subsystem = Subsystem::new(&network, SystemState::new(&[0, 0]).unwrap()).unwrap();
        assert!(subsystem.cause_repertoire(set(&[2]), set(&[0])).is_err());
        assert!(subsystem.effect_repertoire(set(&[0]), set(&[3])).is_err());
    }

    #[test]
    fn partitioned_repertoire_with_empty_part_matches_whole() {
        let network = copy_network();
        let subsystem = Subsystem::new(&network, SystemState::new(&[1, 0]).unwrap()).unwrap();
        let partition = Bipartition::new(set(&[0]), NodeSet::empty());
        for direction in [Direction::Cause, Direction::Effect] {
            let whole = subsystem.repertoire(direction, set(&[0]), set(&[0, 1])).unwrap();
            let cut = subsystem
                .partitioned_repertoire(&partition, set(&[0, 1]), direction)
                .unwrap();
            assert_eq!(whole, cut);
        }
    }

    #[test]
    fn partitioned_effect_squares_the_distribution() {
        let two = crate::network::Network::new(vec![
            vec![0.25, 0.5],
            vec![0.25, 0.5],
            vec![0.25, 0.5],
            vec![0.25, 0.5],
        ])
        .unwrap();
        let subsystem = Subsystem::new(&two, SystemState::new(&[0, 0]).unwrap()).unwrap();
        let partition = Bipartition::new(set(&[0]), set(&[1]));
        let cut = subsystem
            .partitioned_repertoire(&partition, set(&[0]), Direction::Effect)
            .unwrap();
        assert!((cut.as_slice()[0] - 0.9).abs() < 1e-12);
        assert!((cut.as_slice()[1] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn random_repertoires_are_normalized() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..5 {
            let network = random_network(&mut rng, 3);
            for state in network.all_states() {
                let subsystem = Subsystem::new(&network, state).unwrap();
                for mechanism in network.node_indices().subsets(1) {
                    for purview in network.node_indices().subsets(1) {
                        for direction in [Direction::Cause, Direction::Effect] {
                            let rep = subsystem.repertoire(direction, mechanism, purview).unwrap();
                            assert_eq!(rep.len(), 1 << purview.len());
                            let total: f64 = rep.as_slice().iter().sum();
                            assert!((total - 1.0).abs() < 1e-9, "sum {total}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn expand_spreads_uniformly() {
        let rep = Repertoire::from_weights(vec![0.2, 0.8]);
        let expanded = rep.expand(set(&[1]), set(&[0, 1])).unwrap();
        for (got, want) in expanded.as_slice().iter().zip([0.1, 0.1, 0.4, 0.4]) {
            assert!((got - want).abs() < 1e-12);
        }
        assert!(expanded.is_distribution(1e-12));
        assert!(rep.expand(set(&[0, 1]), set(&[1])).is_err());
    }
}
