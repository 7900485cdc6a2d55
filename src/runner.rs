//! JSON request dispatch for the command-line entry point.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assembly::{build_form, AssemblyError, ExamForm, FormRequest};
use crate::progression::{
    record_attempt, sync_tree, AbilityEstimate, AttemptOutcome, AttemptResult, LearnerContext,
    PrerequisiteEdge, ProgressionConfig, ProgressionError, SkillNode, TreeSnapshot, TreeSync,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum EngineRequest {
    BuildForm(FormRequest),
    #[serde(rename_all = "camelCase")]
    SyncTree {
        nodes: Vec<SkillNode>,
        #[serde(default)]
        edges: Vec<PrerequisiteEdge>,
        learner: LearnerContext,
    },
    #[serde(rename_all = "camelCase")]
    RecordAttempt {
        node: SkillNode,
        outcome: AttemptOutcome,
        #[serde(default)]
        estimate: AbilityEstimate,
    },
}

impl EngineRequest {
    pub fn op(&self) -> &'static str {
        match self {
            Self::BuildForm(_) => "buildForm",
            Self::SyncTree { .. } => "syncTree",
            Self::RecordAttempt { .. } => "recordAttempt",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EngineResponse {
    Form(ExamForm),
    Tree(TreeSync),
    Attempt(AttemptResult),
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid request json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Progression(#[from] ProgressionError),
}

pub fn parse_request(raw: &str) -> Result<EngineRequest, RunnerError> {
    Ok(serde_json::from_str(raw)?)
}

/// Reads a request from `path`, or from stdin when no path is given.
pub fn load_request(path: Option<&Path>) -> Result<EngineRequest, RunnerError> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    parse_request(&raw)
}

pub fn run_request(
    request: EngineRequest,
    config: &ProgressionConfig,
) -> Result<EngineResponse, RunnerError> {
    tracing::debug!(op = request.op(), "running request");

    let response = match request {
        EngineRequest::BuildForm(form) => EngineResponse::Form(build_form(&form)?),
        EngineRequest::SyncTree {
            nodes,
            edges,
            learner,
        } => EngineResponse::Tree(sync_tree(TreeSnapshot { nodes, edges }, &learner, config)?),
        EngineRequest::RecordAttempt {
            node,
            outcome,
            estimate,
        } => EngineResponse::Attempt(record_attempt(&node, &outcome, &estimate, &config.rewards)),
    };

    Ok(response)
}
