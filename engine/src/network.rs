//! Immutable transition probability model over binary nodes.
//!
//! The model is stored state-by-node: row `i` is the current joint state with
//! index `i` (node `k` is bit `k`), column `k` is the probability that node
//! `k` is on at the next step.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{PhiError, Result},
    nodes::NodeSet,
    state::SystemState,
};

/// Slack allowed when a state-by-state row sums slightly above one.
const PROBABILITY_SLACK: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    tpm: DMatrix<f64>,
    connectivity: DMatrix<u8>,
    labels: Vec<String>,
}

impl Network {
    /// Fully connected network with default labels.
    pub fn new(tpm: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_parts(tpm, None, None)
    }

    pub fn with_connectivity(tpm: Vec<Vec<f64>>, connectivity: Vec<Vec<u8>>) -> Result<Self> {
        Self::from_parts(tpm, Some(connectivity), None)
    }

    /// Build from nested rows. The transition matrix may be state-by-state
    /// (`2^n x 2^n`) or state-by-node (`2^n x n`).
    pub fn from_parts(
        tpm: Vec<Vec<f64>>,
        connectivity: Option<Vec<Vec<u8>>>,
        labels: Option<Vec<String>>,
    ) -> Result<Self> {
        let tpm = matrix_from_rows(&tpm, "transition matrix")?;
        let connectivity = connectivity
            .map(|rows| matrix_from_rows(&rows, "connectivity"))
            .transpose()?;
        Self::from_matrix(tpm, connectivity, labels)
    }

    pub fn from_matrix(
        tpm: DMatrix<f64>,
        connectivity: Option<DMatrix<u8>>,
        labels: Option<Vec<String>>,
    ) -> Result<Self> {
        let rows = tpm.nrows();
        if rows == 0 || !rows.is_power_of_two() {
            return Err(PhiError::config(format!(
                "number of rows must be a power of two, got {rows}"
            )));
        }
        let n = rows.trailing_zeros() as usize;
        if n == 0 {
            return Err(PhiError::config("network must contain at least one node"));
        }
        if n > NodeSet::CAPACITY {
            return Err(PhiError::config(format!(
                "{n} nodes exceeds the {} node limit",
                NodeSet::CAPACITY
            )));
        }
        if let Some(bad) = tpm.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Err(PhiError::config(format!(
                "transition probabilities must lie in [0, 1], found {bad}"
            )));
        }

        let tpm = if tpm.ncols() == rows {
            state_by_state_to_state_by_node(&tpm, n)?
        } else if tpm.ncols() == n {
            tpm
        } else {
            return Err(PhiError::config(format!(
                "transition matrix shape ({rows}, {}) invalid, expected ({rows}, {rows}) or ({rows}, {n})",
                tpm.ncols()
            )));
        };

        let connectivity = match connectivity {
            Some(conn) if conn.shape() != (n, n) => {
                return Err(PhiError::config(format!(
                    "connectivity shape {:?} does not match ({n}, {n})",
                    conn.shape()
                )))
            }
            Some(conn) => conn,
            None => DMatrix::from_element(n, n, 1u8),
        };

        let labels = match labels {
            Some(labels) if labels.len() != n => {
                return Err(PhiError::config(format!(
                    "expected {n} labels, got {}",
                    labels.len()
                )))
            }
            Some(labels) => labels,
            None => (0..n).map(|i| format!("n{i}")).collect(),
        };

        Ok(Self {
            tpm,
            connectivity,
            labels,
        })
    }

    pub fn node_count(&self) -> usize {
        self.tpm.ncols()
    }

    pub fn state_count(&self) -> usize {
        self.tpm.nrows()
    }

    pub fn node_indices(&self) -> NodeSet {
        NodeSet::full(self.node_count())
    }

    /// State-by-node transition matrix.
    pub fn tpm(&self) -> &DMatrix<f64> {
        &self.tpm
    }

    pub fn connectivity(&self) -> &DMatrix<u8> {
        &self.connectivity
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Probability that `node` is on next step given the current state row.
    #[inline]
    pub fn p_on(&self, state_index: usize, node: usize) -> f64 {
        self.tpm[(state_index, node)]
    }

    pub fn get_tpm_for_state(&self, state: &SystemState) -> Result<Vec<f64>> {
        let row = self.state_to_index(state)?;
        Ok(self.tpm.row(row).iter().copied().collect())
    }

    pub fn state_to_index(&self, state: &SystemState) -> Result<usize> {
        self.check_state(state)?;
        Ok(state.to_index())
    }

    pub fn index_to_state(&self, index: usize) -> Result<SystemState> {
        SystemState::from_index(index, self.node_count())
    }

    /// Every joint state in index order.
    pub fn all_states(&self) -> impl Iterator<Item = SystemState> + '_ {
        let n = self.node_count();
        (0..self.state_count()).filter_map(move |idx| SystemState::from_index(idx, n).ok())
    }

    pub fn check_state(&self, state: &SystemState) -> Result<()> {
        if state.len() != self.node_count() {
            return Err(PhiError::config(format!(
                "state has {} nodes, network has {}",
                state.len(),
                self.node_count()
            )));
        }
        Ok(())
    }

    pub fn check_nodes(&self, nodes: NodeSet, what: &str) -> Result<()> {
        if !nodes.is_subset(self.node_indices()) {
            return Err(PhiError::config(format!(
                "{what} {nodes} references nodes outside a {}-node network",
                self.node_count()
            )));
        }
        Ok(())
    }

    pub fn is_connected(&self, from: usize, to: usize) -> bool {
        self.connectivity[(from, to)] != 0
    }

    fn check_node(&self, node: usize) -> Result<()> {
        if node >= self.node_count() {
            return Err(PhiError::config(format!(
                "node {node} is outside a {}-node network",
                self.node_count()
            )));
        }
        Ok(())
    }

    /// Nodes that can causally influence `node`.
    pub fn get_inputs(&self, node: usize) -> Result<NodeSet> {
        self.check_node(node)?;
        Ok((0..self.node_count())
            .filter(|&i| self.is_connected(i, node))
            .collect())
    }

    /// Nodes that `node` can causally influence.
    pub fn get_outputs(&self, node: usize) -> Result<NodeSet> {
        self.check_node(node)?;
        Ok((0..self.node_count())
            .filter(|&j| self.is_connected(node, j))
            .collect())
    }

    /// Union of the outputs of every node in `nodes`.
    pub fn outputs_of(&self, nodes: NodeSet) -> NodeSet {
        nodes
            .iter()
            .flat_map(|from| (0..self.node_count()).filter(move |&to| self.is_connected(from, to)))
            .collect()
    }

    /// Induced model over `nodes`.
    ///
    /// Excluded nodes are held at off (0) while reading the full model's
    /// rows; they are not marginalised over.
    pub fn subnetwork(&self, nodes: NodeSet) -> Result<Network> {
        if nodes.is_empty() {
            return Err(PhiError::config("subnetwork needs at least one node"));
        }
        self.check_nodes(nodes, "subnetwork")?;
        let members = nodes.to_vec();
        let k = members.len();

        let tpm = DMatrix::from_fn(1usize << k, k, |sub_index, i| {
            let full_index = nodes.scatter(sub_index) as usize;
            self.p_on(full_index, members[i])
        });
        let connectivity =
            DMatrix::from_fn(k, k, |i, j| self.connectivity[(members[i], members[j])]);
        let labels = members.iter().map(|&m| self.labels[m].clone()).collect();

        Ok(Network {
            tpm,
            connectivity,
            labels,
        })
    }

    /// Render a node set with labels, e.g. `(A, C)`.
    pub fn render_nodes(&self, nodes: NodeSet) -> String {
        let names: Vec<&str> = nodes
            .iter()
            .filter_map(|i| self.labels.get(i).map(String::as_str))
            .collect();
        format!("({})", names.join(", "))
    }
}

fn matrix_from_rows<T>(rows: &[Vec<T>], what: &str) -> Result<DMatrix<T>>
where
    T: nalgebra::Scalar + Copy,
{
    let width = rows.first().map_or(0, Vec::len);
    if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(PhiError::config(format!(
            "{what} row {idx} has {} entries, expected {width}",
            row.len()
        )));
    }
    let flat: Vec<T> = rows.iter().flatten().copied().collect();
    Ok(DMatrix::from_row_slice(rows.len(), width, &flat))
}

/// For each current state, sum the probability of every next state in which
/// a node's bit is set.
fn state_by_state_to_state_by_node(sbs: &DMatrix<f64>, n: usize) -> Result<DMatrix<f64>> {
    let states = sbs.nrows();
    let mut sbn = DMatrix::zeros(states, n);
    for row in 0..states {
        for node in 0..n {
            let p_on: f64 = (0..states)
                .filter(|next| (next >> node) & 1 == 1)
                .map(|next| sbs[(row, next)])
                .sum();
            if p_on > 1.0 + PROBABILITY_SLACK {
                return Err(PhiError::config(format!(
                    "state-by-state row {row} assigns probability {p_on} to node {node}"
                )));
            }
            sbn[(row, node)] = p_on.min(1.0);
        }
    }
    Ok(sbn)
}
