//! HTTP handlers: two static pages, the generation endpoint that drives
//! the analyzer subprocess, and a catch-all file route for the generated
//! treemap artifacts.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tokio::process::Command;

use crate::factors::{factor_index, field_name};
use crate::git::clone;
use crate::patterns::{write_pattern_file, BUGFIX_PATTERN_FILE, FILETYPE_PATTERN_FILE};
use crate::state::AppState;

/// Commit map written by the ingestion pass and read by the report pass.
pub const GENERATED_JSON: &str = "generatedJson.json";
/// Prefix of the treemap artifacts the viewer page fetches.
pub const D3_PREFIX: &str = "full";

#[derive(Debug, Deserialize)]
pub struct GenerationParams {
    pub path: Option<String>,
    pub factor: Option<String>,
    pub is_remote: Option<String>,
    pub bugfix_regex: Option<String>,
    pub filetype_regex: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerationSummary {
    pub repo: String,
    pub factor: String,
    pub factor_index: usize,
    pub cloned: bool,
}

/// GET / - treemap viewer
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// GET /generation - data generation form
pub async fn generation_page() -> Html<&'static str> {
    Html(include_str!("../static/generation.html"))
}

/// GET /full_backend_generation - run the full pipeline: write pattern
/// files, optionally clone, ingest, generate treemaps, clean up.
pub async fn full_backend_generation(
    State(state): State<AppState>,
    Query(params): Query<GenerationParams>,
) -> Result<Json<GenerationSummary>, (StatusCode, String)> {
    let Some(raw_path) = params.path.clone() else {
        return Err((
            StatusCode::BAD_REQUEST,
            "path query parameter is required".to_string(),
        ));
    };
    let factor = factor_index(params.factor.as_deref());
    tracing::info!(
        "Generation request: path={} factor={} ({})",
        raw_path,
        field_name(factor),
        factor
    );

    let _guard = state.generation_lock.lock().await;
    let work_dir = &state.config.work_dir;

    write_pattern_file(work_dir, BUGFIX_PATTERN_FILE, params.bugfix_regex.as_deref())
        .map_err(internal)?;
    write_pattern_file(work_dir, FILETYPE_PATTERN_FILE, params.filetype_regex.as_deref())
        .map_err(internal)?;

    let is_remote = params.is_remote.as_deref() == Some("true");
    let (repo_path, clone_dir) = if is_remote {
        let dir = clone::clone_repo(work_dir, &raw_path).await.map_err(internal)?;
        (dir.clone(), Some(dir))
    } else {
        (PathBuf::from(&raw_path), None)
    };

    let result = run_analysis(&state, &repo_path, factor).await;

    // The clone is deleted whether analysis succeeded or not.
    if let Some(dir) = clone_dir {
        clone::remove_clone(&dir).await;
    }

    result.map_err(internal)?;
    tracing::info!("Generation complete for {raw_path}");

    Ok(Json(GenerationSummary {
        repo: raw_path,
        factor: field_name(factor).to_string(),
        factor_index: factor,
        cloned: is_remote,
    }))
}

async fn run_analysis(state: &AppState, repo_path: &Path, factor: usize) -> Result<(), String> {
    let repo = repo_path.to_string_lossy();
    run_analyzer(state, &["repo", &repo]).await?;
    run_analyzer(
        state,
        &[
            "d3",
            GENERATED_JSON,
            D3_PREFIX,
            "files",
            &factor.to_string(),
            &state.config.page_size.to_string(),
        ],
    )
    .await
}

/// One synchronous pass of the analyzer executable, run in the working
/// directory so its relative inputs and outputs land there.
async fn run_analyzer(state: &AppState, args: &[&str]) -> Result<(), String> {
    tracing::info!("Running {} {}", state.config.analyzer_bin, args.join(" "));
    let output = Command::new(&state.config.analyzer_bin)
        .args(args)
        .current_dir(&state.config.work_dir)
        .output()
        .await
        .map_err(|e| format!("failed to start {}: {e}", state.config.analyzer_bin))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "{} {} failed: {}",
            state.config.analyzer_bin,
            args.join(" "),
            stderr.trim()
        ));
    }
    Ok(())
}

fn internal(e: String) -> (StatusCode, String) {
    tracing::error!("{e}");
    (StatusCode::INTERNAL_SERVER_ERROR, e)
}

/// Catch-all GET: serves generated artifacts (`full_d3.json`,
/// `containers/*.json`, …) relative to the working directory.
pub async fn serve_workdir_file(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Response, (StatusCode, String)> {
    let Some(rel) = sanitize_rel_path(uri.path()) else {
        return Err((StatusCode::BAD_REQUEST, "invalid path".to_string()));
    };

    let full = state.config.work_dir.join(&rel);
    match tokio::fs::read(&full).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&full).first_or_octet_stream();
            Ok(([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response())
        }
        Err(_) => Err((
            StatusCode::NOT_FOUND,
            format!("no such file: {}", rel.display()),
        )),
    }
}

/// Accepts only plain relative components — anything with `..`, a root or
/// a prefix is rejected rather than resolved.
fn sanitize_rel_path(uri_path: &str) -> Option<PathBuf> {
    let rel = uri_path.trim_start_matches('/');
    if rel.is_empty() {
        return None;
    }
    let path = Path::new(rel);
    if path
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        Some(path.to_path_buf())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_accepts_plain_relative_paths() {
        assert_eq!(
            sanitize_rel_path("/full_d3.json"),
            Some(PathBuf::from("full_d3.json"))
        );
        assert_eq!(
            sanitize_rel_path("/containers/src/lib.json"),
            Some(PathBuf::from("containers/src/lib.json"))
        );
    }

    #[test]
    fn test_sanitize_rejects_traversal() {
        assert_eq!(sanitize_rel_path("/../etc/passwd"), None);
        assert_eq!(sanitize_rel_path("/containers/../../secret"), None);
        assert_eq!(sanitize_rel_path("/"), None);
    }
}
