use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    errors::{PhiError, Result},
    nodes::NodeSet,
};

/// Binary system state, one bit per node in little-endian order.
///
/// Node `i` is bit `i`, so the packed bits are also the state's row index in
/// the transition model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct SystemState {
    bits: u32,
    len: usize,
}

impl SystemState {
    pub fn new(values: &[u8]) -> Result<Self> {
        if values.len() > NodeSet::CAPACITY {
            return Err(PhiError::config(format!(
                "state has {} nodes, limit is {}",
                values.len(),
                NodeSet::CAPACITY
            )));
        }
        let mut bits = 0u32;
        for (node, &value) in values.iter().enumerate() {
            match value {
                0 => {}
                1 => bits |= 1u32 << node,
                other => {
                    return Err(PhiError::config(format!(
                        "state entry {node} must be 0 or 1, got {other}"
                    )))
                }
            }
        }
        Ok(Self {
            bits,
            len: values.len(),
        })
    }

    /// Decode a row index into a state over `len` nodes.
    pub fn from_index(index: usize, len: usize) -> Result<Self> {
        if len > NodeSet::CAPACITY || index.checked_shr(len as u32).unwrap_or(0) != 0 {
            return Err(PhiError::config(format!(
                "index {index} is not a valid state over {len} nodes"
            )));
        }
        Ok(Self {
            bits: index as u32,
            len,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn to_index(&self) -> usize {
        self.bits as usize
    }

    pub fn is_on(&self, node: usize) -> bool {
        node < self.len && self.bits & (1u32 << node) != 0
    }

    pub fn value(&self, node: usize) -> u8 {
        u8::from(self.is_on(node))
    }

    /// Sub-state over `nodes`, in ascending member order.
    pub fn restrict(&self, nodes: NodeSet) -> Self {
        Self {
            bits: nodes.gather(self.bits) as u32,
            len: nodes.len(),
        }
    }

    pub fn to_vec(&self) -> Vec<u8> {
        (0..self.len).map(|node| self.value(node)).collect()
    }
}

impl TryFrom<Vec<u8>> for SystemState {
    type Error = PhiError;

    fn try_from(value: Vec<u8>) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<SystemState> for Vec<u8> {
    fn from(value: SystemState) -> Self {
        value.to_vec()
    }
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.to_vec().iter().map(u8::to_string).collect();
        write!(f, "({})", parts.join(", "))
    }
}
