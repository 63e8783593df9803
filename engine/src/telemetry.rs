use metrics::{counter, gauge};

use crate::models::ConceptStructure;

pub fn record_structure(ces: &ConceptStructure) {
    gauge!("phi.structure.big_phi", ces.phi());
    gauge!("phi.structure.concepts", ces.num_concepts() as f64);
}

pub fn record_partitions_evaluated(count: usize) {
    counter!("phi.partition.evaluated", count as u64);
}

pub fn record_cache(hit: bool) {
    if hit {
        counter!("phi.cache.hits", 1);
    } else {
        counter!("phi.cache.misses", 1);
    }
}

pub fn record_request(method: &str, ok: bool) {
    counter!("phi.requests", 1, "method" => method.to_string());
    if !ok {
        counter!("phi.requests.failed", 1, "method" => method.to_string());
    }
}
