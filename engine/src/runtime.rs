use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use rayon::{prelude::*, ThreadPool};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{self, PhiRequest, PhiResponse},
    config::{ComputeOptions, Concurrency, EngineConfig},
    errors::{PhiError, Result},
};

/// Independent requests evaluated together.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(transparent)]
pub struct PhiBatch {
    pub requests: Vec<PhiRequest>,
}

impl From<Vec<PhiRequest>> for PhiBatch {
    fn from(requests: Vec<PhiRequest>) -> Self {
        Self { requests }
    }
}

/// Outcome of one request: its response or the reason it failed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    Response(PhiResponse),
    Error(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestReport {
    pub index: usize,
    pub method: String,
    pub outcome: RequestOutcome,
}

impl RequestReport {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, RequestOutcome::Response(_))
    }
}

/// Aggregated report returned to the caller, in submission order.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BatchReport {
    pub requests: Vec<RequestReport>,
    pub failures: usize,
}

impl BatchReport {
    pub fn summary(&self) -> String {
        format!(
            "requests={}, succeeded={}, failed={}",
            self.requests.len(),
            self.requests.len() - self.failures,
            self.failures
        )
    }
}

/// Handle representing a completed job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHandle(Uuid);

pub trait PhiEngine {
    fn prepare(&mut self, cfg: EngineConfig) -> Result<()>;
    fn submit(&self, batch: PhiBatch) -> Result<JobHandle>;
    fn join(&self, handle: JobHandle) -> Result<BatchReport>;
    fn shutdown(&mut self) -> Result<()>;
}

/// Batch runtime; requests share nothing, so they run side by side on the
/// pool.
pub struct Engine {
    cfg: Option<EngineConfig>,
    pool: Option<Arc<ThreadPool>>,
    jobs: Arc<Mutex<HashMap<Uuid, BatchReport>>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            cfg: None,
            pool: None,
            jobs: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    fn evaluate_one(index: usize, request: &PhiRequest, options: ComputeOptions) -> RequestReport {
        let method = request.method.as_str();
        let outcome = match api::handle_with(request, options) {
            Ok(response) => RequestOutcome::Response(response),
            Err(err) => {
                tracing::warn!(target: "phi", index, method, "request failed: {err}");
                RequestOutcome::Error(err.to_string())
            }
        };
        RequestReport {
            index,
            method: method.to_string(),
            outcome,
        }
    }

    fn evaluate_batch(cfg: &EngineConfig, batch: &PhiBatch, parallel: bool) -> BatchReport {
        let options = cfg.compute;
        let requests: Vec<RequestReport> = if parallel {
            batch
                .requests
                .par_iter()
                .enumerate()
                .map(|(index, request)| Self::evaluate_one(index, request, options))
                .collect()
        } else {
            batch
                .requests
                .iter()
                .enumerate()
                .map(|(index, request)| Self::evaluate_one(index, request, options))
                .collect()
        };
        let failures = requests.iter().filter(|r| !r.is_ok()).count();
        BatchReport { requests, failures }
    }
}

impl PhiEngine for Engine {
    fn prepare(&mut self, cfg: EngineConfig) -> Result<()> {
        if let Concurrency::Rayon { workers } = cfg.concurrency {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|err| PhiError::config(format!("failed to build rayon pool: {err}")))?;
            self.pool = Some(Arc::new(pool));
        } else {
            self.pool = None;
        }
        self.cfg = Some(cfg);
        Ok(())
    }

    fn submit(&self, batch: PhiBatch) -> Result<JobHandle> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| PhiError::other("engine not prepared"))?;
        let report = if let Some(pool) = &self.pool {
            pool.install(|| Engine::evaluate_batch(cfg, &batch, true))
        } else {
            Engine::evaluate_batch(cfg, &batch, false)
        };
        tracing::info!(target: "phi", "batch finished: {}", report.summary());

        let id = Uuid::new_v4();
        self.jobs.lock().insert(id, report);
        Ok(JobHandle(id))
    }

    fn join(&self, handle: JobHandle) -> Result<BatchReport> {
        self.jobs
            .lock()
            .remove(&handle.0)
            .ok_or_else(|| PhiError::other("unknown job handle"))
    }

    fn shutdown(&mut self) -> Result<()> {
        self.cfg = None;
        self.pool = None;
        self.jobs.lock().clear();
        Ok(())
    }
}
