use crate::{
    config::ComputeOptions,
    errors::Result,
    network::Network,
    nodes::{Bipartitions, NodeSet},
    state::SystemState,
};

/// A network paired with its current state: the unit every repertoire,
/// concept and structure query runs against.
#[derive(Debug, Clone)]
pub struct Subsystem<'a> {
    network: &'a Network,
    state: SystemState,
    options: ComputeOptions,
}

impl<'a> Subsystem<'a> {
    pub fn new(network: &'a Network, state: SystemState) -> Result<Self> {
        network.check_state(&state)?;
        Ok(Self {
            network,
            state,
            options: ComputeOptions::default(),
        })
    }

    pub fn with_options(self, options: ComputeOptions) -> Self {
        Self { options, ..self }
    }

    pub fn network(&self) -> &'a Network {
        self.network
    }

    pub fn state(&self) -> &SystemState {
        &self.state
    }

    pub fn options(&self) -> &ComputeOptions {
        &self.options
    }

    pub fn node_indices(&self) -> NodeSet {
        self.network.node_indices()
    }

    pub(crate) fn check_nodes(&self, nodes: NodeSet, what: &str) -> Result<()> {
        self.network.check_nodes(nodes, what)
    }

    /// Bipartitions of `nodes` in the order configured for this subsystem.
    pub(crate) fn bipartitions(&self, nodes: NodeSet) -> Bipartitions {
        Bipartitions::new(nodes, self.options.unordered_bipartitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::PhiError, fixtures::copy_network};

    #[test]
    fn rejects_state_of_wrong_length() {
        let network = copy_network();
        let err = Subsystem::new(&network, SystemState::new(&[1]).unwrap()).unwrap_err();
        assert!(matches!(err, PhiError::Configuration(_)));
    }

    #[test]
    fn options_are_carried() {
        let network = copy_network();
        let options = ComputeOptions {
            unordered_bipartitions: true,
            ..ComputeOptions::default()
        };
        let subsystem = Subsystem::new(&network, SystemState::new(&[1, 0]).unwrap())
            .unwrap()
            .with_options(options);
        assert_eq!(subsystem.options(), &options);
        assert_eq!(subsystem.bipartitions(NodeSet::full(2)).count(), 1);
        assert!(subsystem.check_nodes(NodeSet::singleton(2), "purview").is_err());
    }
}
