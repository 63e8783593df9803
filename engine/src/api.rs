//! Request/response boundary used by external callers.

use serde::{Deserialize, Serialize};

use crate::{
    config::ComputeOptions,
    distance::Measure,
    errors::Result,
    models::ConceptStructure,
    network::Network,
    nodes::{Bipartition, NodeSet},
    state::SystemState,
    subsystem::Subsystem,
    telemetry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    ComputePhi,
    FindMip,
    GetMainComplex,
    ComputeCauseEffectStructure,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ComputePhi => "compute_phi",
            Self::FindMip => "find_mip",
            Self::GetMainComplex => "get_main_complex",
            Self::ComputeCauseEffectStructure => "compute_cause_effect_structure",
        }
    }
}

/// Per-request overrides of the engine's compute options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,
}

impl RequestConfig {
    /// Apply these overrides on top of `base`.
    pub fn resolve(&self, base: ComputeOptions) -> Result<ComputeOptions> {
        let measure = match self.measure.as_deref() {
            Some(name) => name.parse::<Measure>()?,
            None => base.measure,
        };
        Ok(ComputeOptions {
            measure,
            parallel: self.parallel.unwrap_or(base.parallel),
            ..base
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhiRequest {
    pub method: Method,
    pub tpm: Vec<Vec<f64>>,
    pub state: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connectivity: Option<Vec<Vec<u8>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub config: RequestConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhiSummary {
    pub phi: f64,
    pub main_complex: String,
    pub cut: Option<String>,
    pub concepts: usize,
    pub small_phi_sum: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MipSummary {
    pub mip: Option<String>,
    pub phi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MainComplexSummary {
    pub main_complex: String,
    pub phi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConceptSummary {
    pub mechanism: String,
    pub phi: f64,
    pub cause: String,
    pub effect: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructureSummary {
    pub concepts: Vec<ConceptSummary>,
    pub total_concepts: usize,
}

/// Result of one request; the shape depends on the method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhiResponse {
    Phi(PhiSummary),
    Mip(MipSummary),
    MainComplex(MainComplexSummary),
    Structure(StructureSummary),
}

/// Evaluate a request with default compute options.
pub fn handle(request: &PhiRequest) -> Result<PhiResponse> {
    handle_with(request, ComputeOptions::default())
}

/// Evaluate a request, letting its config override `base`.
pub fn handle_with(request: &PhiRequest, base: ComputeOptions) -> Result<PhiResponse> {
    let outcome = evaluate(request, base);
    telemetry::record_request(request.method.as_str(), outcome.is_ok());
    outcome
}

fn evaluate(request: &PhiRequest, base: ComputeOptions) -> Result<PhiResponse> {
    let options = request.config.resolve(base)?;
    let network = Network::from_parts(
        request.tpm.clone(),
        request.connectivity.clone(),
        request.labels.clone(),
    )?;
    let state = SystemState::new(&request.state)?;
    let subsystem = Subsystem::new(&network, state)?.with_options(options);
    tracing::debug!(
        target: "phi",
        method = request.method.as_str(),
        nodes = network.node_count(),
        %state,
        measure = %options.measure,
        "handling request"
    );

    Ok(match request.method {
        Method::ComputePhi => {
            let ces = subsystem.concept_structure()?;
            PhiResponse::Phi(PhiSummary {
                phi: ces.phi(),
                main_complex: network.render_nodes(network.node_indices()),
                cut: ces.partition().map(|cut| render_cut(&network, cut)),
                concepts: ces.num_concepts(),
                small_phi_sum: ces.total_concept_phi(),
            })
        }
        Method::FindMip => {
            let ces = subsystem.concept_structure()?;
            PhiResponse::Mip(MipSummary {
                mip: ces.partition().map(|cut| render_cut(&network, cut)),
                phi: ces.phi(),
            })
        }
        Method::GetMainComplex => {
            let complex = subsystem.main_complex()?;
            PhiResponse::MainComplex(MainComplexSummary {
                main_complex: network.render_nodes(complex.nodes()),
                phi: complex.phi(),
            })
        }
        Method::ComputeCauseEffectStructure => {
            let ces = ConceptStructure::unevaluated(subsystem.concepts()?);
            PhiResponse::Structure(summarize_concepts(&network, &ces))
        }
    })
}

fn render_cut(network: &Network, cut: &Bipartition) -> String {
    format!(
        "{} | {}",
        network.render_nodes(cut.part1()),
        network.render_nodes(cut.part2())
    )
}

fn summarize_concepts(network: &Network, ces: &ConceptStructure) -> StructureSummary {
    let render = |nodes: NodeSet| network.render_nodes(nodes);
    let concepts: Vec<ConceptSummary> = ces
        .concepts()
        .iter()
        .map(|concept| ConceptSummary {
            mechanism: render(concept.mechanism()),
            phi: concept.phi(),
            cause: render(concept.cause().purview()),
            effect: render(concept.effect().purview()),
        })
        .collect();
    StructureSummary {
        total_concepts: concepts.len(),
        concepts,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::errors::PhiError;

    fn request(method: &str, tpm: serde_json::Value, state: serde_json::Value) -> PhiRequest {
        serde_json::from_value(json!({ "method": method, "tpm": tpm, "state": state })).unwrap()
    }

    fn pair_tpm() -> serde_json::Value {
        json!([[0.0, 0.2], [0.0, 0.9], [0.0, 0.5], [0.0, 0.25]])
    }

    #[test]
    fn compute_phi_summary() {
        let response = handle(&request("compute_phi", pair_tpm(), json!([1, 1]))).unwrap();
        let PhiResponse::Phi(summary) = response else {
            panic!("expected a phi summary");
        };
        assert!((summary.phi - 0.3).abs() < 1e-9);
        assert_eq!(summary.main_complex, "(n0, n1)");
        assert_eq!(summary.cut.as_deref(), Some("(n0) | (n1)"));
        assert_eq!(summary.concepts, 1);
        assert!((summary.small_phi_sum - 0.3).abs() < 1e-9);
    }

    #[test]
    fn find_mip_without_concepts_has_no_cut() {
        let tpm = json!([[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]);
        let response = handle(&request("find_mip", tpm, json!([1, 0]))).unwrap();
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "mip": null, "phi": 0.0 })
        );
    }

    #[test]
    fn main_complex_uses_labels() {
        let mut req = request("get_main_complex", pair_tpm(), json!([1, 1]));
        req.labels = Some(vec!["A".into(), "B".into()]);
        let PhiResponse::MainComplex(summary) = handle(&req).unwrap() else {
            panic!("expected a main complex");
        };
        assert_eq!(summary.main_complex, "(A, B)");
        assert!((summary.phi - 0.3).abs() < 1e-9);
    }

    #[test]
    fn structure_lists_concepts() {
        let response = handle(&request(
            "compute_cause_effect_structure",
            pair_tpm(),
            json!([1, 1]),
        ))
        .unwrap();
        let PhiResponse::Structure(summary) = response else {
            panic!("expected a structure");
        };
        assert_eq!(summary.total_concepts, 1);
        assert_eq!(summary.concepts[0].mechanism, "(n0, n1)");
        assert_eq!(summary.concepts[0].cause, "(n0, n1)");
    }

    #[test]
    fn request_config_overrides_base() {
        let config = RequestConfig {
            measure: Some("KL".into()),
            parallel: Some(true),
        };
        let options = config.resolve(ComputeOptions::default()).unwrap();
        assert_eq!(options.measure, Measure::Kl);
        assert!(options.parallel);
        assert!(options.memoize);

        // An omitted flag inherits the engine's setting, which is off by default.
        let inherit = RequestConfig::default();
        assert!(!inherit.resolve(ComputeOptions::default()).unwrap().parallel);
        let pooled = ComputeOptions {
            parallel: true,
            ..ComputeOptions::default()
        };
        assert!(inherit.resolve(pooled).unwrap().parallel);

        let bad = RequestConfig {
            measure: Some("wasserstein".into()),
            parallel: None,
        };
        assert!(matches!(
            bad.resolve(ComputeOptions::default()),
            Err(PhiError::Configuration(_))
        ));
    }

    #[test]
    fn malformed_inputs_are_configuration_errors() {
        let three_rows = json!([[0.5], [0.5], [0.5]]);
        let err = handle(&request("compute_phi", three_rows, json!([0]))).unwrap_err();
        assert!(matches!(err, PhiError::Configuration(_)));

        let err = handle(&request("compute_phi", pair_tpm(), json!([1, 2]))).unwrap_err();
        assert!(matches!(err, PhiError::Configuration(_)));

        let err = handle(&request("compute_phi", pair_tpm(), json!([1]))).unwrap_err();
        assert!(matches!(err, PhiError::Configuration(_)));
    }

    #[test]
    fn unknown_method_is_rejected_at_parse_time() {
        let parsed: std::result::Result<PhiRequest, _> = serde_json::from_value(json!({
            "method": "compute_everything",
            "tpm": [[0.5]],
            "state": [0],
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn responses_round_trip_untagged() {
        let text = r#"{"main_complex":"(n0)","phi":0.0}"#;
        let parsed: PhiResponse = serde_json::from_str(text).unwrap();
        assert!(matches!(parsed, PhiResponse::MainComplex(_)));
        let text = r#"{"mip":"(n0) | (n1)","phi":0.3}"#;
        assert!(matches!(
            serde_json::from_str::<PhiResponse>(text).unwrap(),
            PhiResponse::Mip(_)
        ));
    }
}
