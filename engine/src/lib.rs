//! Integrated information (Phi) engine: repertoires, minimum information
//! partitions, concepts and system-level cause-effect structures over binary
//! transition models.

pub mod api;
pub mod concept;
pub mod config;
pub mod distance;
pub mod errors;
pub mod io;
pub mod models;
pub mod network;
pub mod nodes;
pub mod partition;
pub mod repertoire;
pub mod runtime;
pub mod state;
pub mod structure;
pub mod subsystem;
pub mod telemetry;
pub mod utils;

#[cfg(test)]
pub(crate) mod fixtures;

pub use api::{handle, handle_with, Method, PhiRequest, PhiResponse, RequestConfig};
pub use config::{ComputeOptions, Concurrency, EngineConfig, IoConfig};
pub use distance::{
    concept_distance, extended_earth_movers_distance, intrinsic_difference, repertoire_distance,
    Measure,
};
pub use errors::{PhiError, Result};
pub use models::{Concept, ConceptStructure, MainComplex, PartitionResult, RepertoireResult};
pub use network::Network;
pub use nodes::{Bipartition, NodeSet};
pub use partition::{all_bipartitions, MechanismCut, MechanismMip};
pub use repertoire::{Direction, Repertoire};
pub use runtime::{BatchReport, Engine, JobHandle, PhiBatch, PhiEngine, RequestOutcome};
pub use state::SystemState;
pub use structure::{concept_structure, main_complex, mip, phi};
pub use subsystem::Subsystem;

/// Emit a textual banner used by CLI integrations and smoke tests.
pub fn banner() -> String {
    const MSG: &str = "Phi Engine :: Integrated Information Runtime";
    tracing::info!(target: "phi", "{}", MSG);
    MSG.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_mentions_engine() {
        let b = banner();
        assert!(b.contains("Engine"));
    }

    #[test]
    fn top_level_entry_points() {
        let network = Network::new(vec![
            vec![0.0, 0.2],
            vec![0.0, 0.9],
            vec![0.0, 0.5],
            vec![0.0, 0.25],
        ])
        .unwrap();
        let state = SystemState::new(&[1, 1]).unwrap();
        let value = phi(&network, &state).unwrap();
        assert_eq!(mip(&network, &state).unwrap().phi(), value);
        assert_eq!(concept_structure(&network, &state).unwrap().phi(), value);
    }
}
