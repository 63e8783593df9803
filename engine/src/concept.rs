//! Maximally irreducible causes and effects of a single mechanism.

use crate::{
    errors::Result,
    models::{Concept, RepertoireResult},
    nodes::NodeSet,
    repertoire::{Direction, Repertoire},
    subsystem::Subsystem,
};

impl Subsystem<'_> {
    /// Maximally irreducible cause of `mechanism`.
    pub fn mic(&self, mechanism: NodeSet) -> Result<RepertoireResult> {
        self.check_nodes(mechanism, "mechanism")?;
        Ok(self.max_irreducible(Direction::Cause, mechanism))
    }

    /// Maximally irreducible effect of `mechanism`.
    pub fn mie(&self, mechanism: NodeSet) -> Result<RepertoireResult> {
        self.check_nodes(mechanism, "mechanism")?;
        Ok(self.max_irreducible(Direction::Effect, mechanism))
    }

    /// The concept `mechanism` specifies, or `None` when it is reducible in
    /// either direction.
    pub fn concept(&self, mechanism: NodeSet) -> Result<Option<Concept>> {
        self.check_nodes(mechanism, "mechanism")?;
        Ok(self.concept_unchecked(mechanism))
    }

    pub(crate) fn concept_unchecked(&self, mechanism: NodeSet) -> Option<Concept> {
        let cause = self.max_irreducible(Direction::Cause, mechanism);
        let effect = self.max_irreducible(Direction::Effect, mechanism);
        let concept = Concept::new(mechanism, cause, effect);
        if concept.phi() <= 0.0 {
            return None;
        }
        tracing::debug!(
            target: "phi",
            %mechanism,
            phi = concept.phi(),
            cause = %concept.cause().purview(),
            effect = %concept.effect().purview(),
            "concept found"
        );
        Some(concept)
    }

    /// Try every non-empty purview and keep the first one with the highest
    /// phi. A mechanism of fewer than two nodes has phi 0 everywhere, so only
    /// the first purview is examined.
    fn max_irreducible(&self, direction: Direction, mechanism: NodeSet) -> RepertoireResult {
        let mut best: Option<RepertoireResult> = None;
        for purview in self.node_indices().subsets(1) {
            let repertoire = self.repertoire_unchecked(direction, mechanism, purview);
            let mip = self.mechanism_mip(direction, mechanism, purview, &repertoire);
            if best.as_ref().map_or(true, |b| mip.phi() > b.phi()) {
                best = Some(RepertoireResult::new(
                    direction,
                    purview,
                    repertoire,
                    mip.phi(),
                    mip.partition(),
                ));
            }
            if mechanism.len() < 2 {
                break;
            }
        }
        best.unwrap_or_else(|| {
            RepertoireResult::new(direction, NodeSet::empty(), Repertoire::trivial(), 0.0, None)
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::fixtures::{copy_network, integrated_pair, random_network, set, state};

    #[test]
    fn copy_network_mechanism_has_non_empty_purviews() {
        let network = copy_network();
        let subsystem = Subsystem::new(&network, state(&[1, 0])).unwrap();
        let mechanism = set(&[0, 1]);
        let mic = subsystem.mic(mechanism).unwrap();
        let mie = subsystem.mie(mechanism).unwrap();
        for result in [&mic, &mie] {
            assert!(!result.purview().is_empty());
            assert!(result.phi() >= 0.0);
            assert_eq!(result.repertoire().len(), 1 << result.purview().len());
        }
        assert_eq!(mic.direction(), Direction::Cause);
        assert_eq!(mie.direction(), Direction::Effect);
        assert!(subsystem.concept(mechanism).unwrap().is_none());
    }

    #[test]
    fn integrated_pair_specifies_a_concept() {
        let network = integrated_pair();
        let subsystem = Subsystem::new(&network, state(&[1, 1])).unwrap();
        let concept = subsystem.concept(set(&[0, 1])).unwrap().unwrap();
        assert!((concept.phi() - 0.3).abs() < 1e-9);
        assert!((concept.cause().phi() - 0.351_351_351_351).abs() < 1e-9);
        assert_eq!(concept.cause().purview(), set(&[0, 1]));
        assert_eq!(concept.effect().purview(), set(&[0, 1]));
        assert!(concept.cause().partition().is_some());
    }

    #[test]
    fn best_purview_can_be_smaller_than_the_system() {
        let network = integrated_pair();
        let subsystem = Subsystem::new(&network, state(&[1, 0])).unwrap();
        let mic = subsystem.mic(set(&[0, 1])).unwrap();
        assert_eq!(mic.purview(), set(&[0]));
        assert!((mic.phi() - 0.388_888_888_889).abs() < 1e-9, "{}", mic.phi());
    }

    #[test]
    fn single_nodes_stop_after_first_purview() {
        let network = integrated_pair();
        let subsystem = Subsystem::new(&network, state(&[1, 1])).unwrap();
        let mie = subsystem.mie(set(&[1])).unwrap();
        assert_eq!(mie.purview(), set(&[0]));
        assert_eq!(mie.phi(), 0.0);
        assert!(mie.partition().is_none());
        assert!(subsystem.concept(set(&[1])).unwrap().is_none());
    }

    #[test]
    fn concept_exists_iff_both_directions_irreducible() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..4 {
            let network = random_network(&mut rng, 3);
            let subsystem = Subsystem::new(&network, state(&[1, 0, 1])).unwrap();
            for mechanism in network.node_indices().subsets(1) {
                let mic = subsystem.mic(mechanism).unwrap();
                let mie = subsystem.mie(mechanism).unwrap();
                let concept = subsystem.concept(mechanism).unwrap();
                assert_eq!(concept.is_some(), mic.phi().min(mie.phi()) > 0.0);
                if let Some(concept) = concept {
                    assert_eq!(concept.cause(), &mic);
                    assert_eq!(concept.effect(), &mie);
                }
            }
        }
    }

    #[test]
    fn rejects_foreign_mechanism() {
        let network = copy_network();
        let subsystem = Subsystem::new(&network, state(&[0, 0])).unwrap();
        assert!(subsystem.mic(set(&[2])).is_err());
        assert!(subsystem.concept(set(&[0, 5])).is_err());
    }
}
