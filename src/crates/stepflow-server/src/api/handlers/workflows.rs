//! Workflow listing and execution handlers

use axum::{
    extract::{Path, State},
    response::sse::{KeepAlive, Sse},
    Json,
};
use futures::Stream;
use serde_json::{json, Value};
use stepflow_core::{CompiledGraph, RunConfig};

use crate::api::{
    error::{ApiError, ApiResult},
    models::{RunRequest, RunResponse, WorkflowList, WorkflowSummary},
    routes::AppState,
    sse,
};

/// Handler for GET /api/workflows
pub async fn list_workflows(State(state): State<AppState>) -> Json<WorkflowList> {
    let workflows = state
        .registry
        .iter()
        .map(|(name, graph)| {
            let mut nodes: Vec<String> =
                graph.graph().node_names().into_iter().map(String::from).collect();
            nodes.sort();
            WorkflowSummary {
                name: name.to_string(),
                nodes,
                fields: graph.schema().fields(),
            }
        })
        .collect();
    Json(WorkflowList { workflows })
}

/// Handler for POST /api/workflows/:name/invoke
///
/// Runs to completion and returns the final state.
pub async fn invoke_workflow(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<RunRequest>,
) -> ApiResult<Json<RunResponse>> {
    let graph = lookup(&state, &name)?;
    let config = run_config(&request)?;
    let thread_id = config.thread_id.clone();
    let input = normalize_input(request.input);

    tracing::info!(workflow = %name, thread_id = ?thread_id, "Invoking workflow");
    let final_state = graph.invoke(input, config).await?;

    Ok(Json(RunResponse {
        thread_id,
        state: final_state,
    }))
}

/// Handler for POST /api/workflows/:name/stream
pub async fn stream_workflow(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<RunRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<axum::response::sse::Event, axum::Error>>>> {
    let graph = lookup(&state, &name)?;
    let config = run_config(&request)?;
    let thread_id = config.thread_id.clone();
    let input = normalize_input(request.input);

    tracing::info!(workflow = %name, thread_id = ?thread_id, "Streaming workflow");
    let snapshots = graph.stream(input, config);

    Ok(Sse::new(sse::step_events(thread_id, snapshots)).keep_alive(KeepAlive::default()))
}

pub(crate) fn lookup(state: &AppState, name: &str) -> ApiResult<CompiledGraph> {
    state
        .registry
        .get(name)
        .cloned()
        .ok_or_else(|| ApiError::workflow_not_found(name))
}

/// Without a thread id the run is stateless and nothing is checkpointed
fn run_config(request: &RunRequest) -> ApiResult<RunConfig> {
    let mut config = match request.thread_id.as_deref().filter(|id| !id.is_empty()) {
        Some(thread_id) => RunConfig::thread(thread_id),
        None => RunConfig::new(),
    };
    if let Some(max_steps) = request.max_steps {
        if max_steps == 0 {
            return Err(ApiError::BadRequest("max_steps must be at least 1".into()));
        }
        config = config.with_max_steps(max_steps);
    }
    Ok(config)
}

fn normalize_input(input: Value) -> Value {
    match input {
        Value::Null => json!({}),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_config_without_thread_is_stateless() {
        let config = run_config(&RunRequest::default()).unwrap();
        assert_eq!(config.thread_id, None);
        assert_eq!(config.max_steps, None);

        let blank = RunRequest {
            thread_id: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(run_config(&blank).unwrap().thread_id, None);
    }

    #[test]
    fn test_run_config_rejects_zero_step_limit() {
        let request = RunRequest {
            max_steps: Some(0),
            ..Default::default()
        };
        assert!(matches!(run_config(&request), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_run_config_keeps_caller_thread() {
        let request = RunRequest {
            thread_id: Some("t-1".into()),
            max_steps: Some(4),
            ..Default::default()
        };
        let config = run_config(&request).unwrap();
        assert_eq!(config.thread_id.as_deref(), Some("t-1"));
        assert_eq!(config.max_steps, Some(4));
    }

    #[test]
    fn test_null_input_becomes_empty_object() {
        assert_eq!(normalize_input(Value::Null), json!({}));
        assert_eq!(normalize_input(json!({"a": 1})), json!({"a": 1}));
    }
}
