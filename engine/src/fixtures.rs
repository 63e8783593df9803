//! Networks shared by the unit tests.

use rand::Rng;

use crate::{network::Network, nodes::NodeSet, state::SystemState};

pub fn set(nodes: &[usize]) -> NodeSet {
    NodeSet::from_nodes(nodes).unwrap()
}

pub fn state(values: &[u8]) -> SystemState {
    SystemState::new(values).unwrap()
}

/// Each node copies its own previous value.
pub fn copy_network_rows() -> Vec<Vec<f64>> {
    vec![
        vec![0.0, 0.0],
        vec![1.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 1.0],
    ]
}

pub fn copy_network() -> Network {
    Network::new(copy_network_rows()).unwrap()
}

/// Two nodes that ignore each other and flip fair coins.
pub fn coin_network() -> Network {
    Network::with_connectivity(vec![vec![0.5, 0.5]; 4], vec![vec![1, 0], vec![0, 1]]).unwrap()
}

/// Node 0 never turns on; node 1 is stochastic in the whole state.
///
/// In state (1, 1) the mechanism {0, 1} has a cause phi of 0.35135 and an
/// effect phi of 0.3 under EMD, so its concept phi (and the system's Big
/// Phi) is 0.3.
pub fn integrated_pair() -> Network {
    Network::new(vec![
        vec![0.0, 0.2],
        vec![0.0, 0.9],
        vec![0.0, 0.5],
        vec![0.0, 0.25],
    ])
    .unwrap()
}

/// Three-node network used across the structure tests.
pub fn integrated_triple() -> Network {
    Network::new(vec![
        vec![0.0, 0.1, 0.3],
        vec![0.0, 0.8, 0.6],
        vec![0.0, 0.4, 0.2],
        vec![0.0, 0.7, 0.9],
        vec![0.0, 0.3, 0.5],
        vec![0.0, 0.6, 0.35],
        vec![0.0, 0.2, 0.75],
        vec![0.0, 0.25, 0.4],
    ])
    .unwrap()
}

pub fn random_network<R: Rng>(rng: &mut R, nodes: usize) -> Network {
    let rows = (0..1usize << nodes)
        .map(|_| (0..nodes).map(|_| rng.gen::<f64>()).collect())
        .collect();
    Network::new(rows).unwrap()
}

/// Every node reads only its own previous bit, with random switching
/// probabilities. Connectivity is the identity.
pub fn self_dependent_network<R: Rng>(rng: &mut R, nodes: usize) -> Network {
    let p_off: Vec<f64> = (0..nodes).map(|_| rng.gen()).collect();
    let p_on: Vec<f64> = (0..nodes).map(|_| rng.gen()).collect();
    let rows = (0..1usize << nodes)
        .map(|index| {
            (0..nodes)
                .map(|k| if index >> k & 1 == 1 { p_on[k] } else { p_off[k] })
                .collect()
        })
        .collect();
    let connectivity = (0..nodes)
        .map(|i| (0..nodes).map(|j| u8::from(i == j)).collect())
        .collect();
    Network::with_connectivity(rows, connectivity).unwrap()
}
