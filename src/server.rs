use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::Config;
use crate::preset::store::PresetStore;
use crate::preset::{BundleDraft, BundleError, PresetError, PresetPayload, PresetRecord, UpdateOutcome};
use crate::scenario::compare::compare_scenarios;
use crate::scenario::{NamedScenario, ScenarioComparison};
use crate::scoring::engine::Scenario;
use crate::scoring::ClassifierResult;
use crate::weights::ConfigWarning;

#[derive(Clone)]
struct ApiState {
    config: Config,
    db_path: PathBuf,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }

    /// Store errors carry typed causes worth a 4xx.
    fn from_store(error: anyhow::Error) -> Self {
        match error.downcast_ref::<PresetError>() {
            Some(PresetError::NameTooShort(_)) => Self::bad_request(error.to_string()),
            Some(PresetError::NotFound(_)) => Self::not_found(error.to_string()),
            None if error.downcast_ref::<BundleError>().is_some() => {
                Self::bad_request(format!("{error:#}"))
            }
            None => Self::internal(format!("{error:#}")),
        }
    }
}

impl From<BundleError> for ApiError {
    fn from(error: BundleError) -> Self {
        Self::bad_request(error.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;
type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;

#[derive(Debug, Clone, Deserialize, Default)]
struct CompareSide {
    name: Option<String>,
    /// Stored preset id or name; used when `data` is absent.
    preset: Option<String>,
    data: Option<BundleDraft>,
}

#[derive(Debug, Clone, Deserialize)]
struct CompareRequest {
    a: CompareSide,
    b: CompareSide,
}

#[derive(Debug, Clone, Deserialize)]
struct SavePresetRequest {
    #[serde(default)]
    name: String,
    data: BundleDraft,
}

#[derive(Debug, Clone, Deserialize)]
struct UpdatePresetRequest {
    name: Option<String>,
    data: BundleDraft,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ScoreResponse {
    fingerprint: String,
    result: ClassifierResult,
    warnings: Vec<ConfigWarning>,
}

#[derive(Debug, Serialize)]
struct PresetDetail {
    #[serde(flatten)]
    record: PresetRecord,
    result: ClassifierResult,
}

#[derive(Debug, Serialize)]
struct DeleteResponse {
    deleted: usize,
}

fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/v1/defaults", get(defaults))
        .route("/v1/score", post(score))
        .route("/v1/compare", post(compare))
        .route("/v1/presets", get(list_presets).post(save_preset))
        .route(
            "/v1/presets/:id",
            get(get_preset).put(update_preset).delete(delete_preset),
        )
        .route("/v1/config", get(show_config))
        .layer(cors)
        .with_state(state)
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let state = ApiState {
        db_path: config.resolved_db_path(),
        config,
    };
    PresetStore::open(&state.db_path)?;

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config)
}

async fn defaults(State(state): State<ApiState>) -> Json<ApiResponse<PresetPayload>> {
    ok(PresetPayload::from_scenario(
        state.config.default_scenario(),
        Some(state.config.scoring.preset_label.clone()),
    ))
}

async fn score(
    State(state): State<ApiState>,
    body: JsonBody<BundleDraft>,
) -> ApiResult<ScoreResponse> {
    let Json(draft) = body?;
    let scenario = draft.into_payload()?.into_scenario();
    Ok(ok(score_scenario(&state, &scenario)))
}

async fn compare(
    State(state): State<ApiState>,
    body: JsonBody<CompareRequest>,
) -> ApiResult<ScenarioComparison> {
    let Json(request) = body?;
    let a = resolve_side(&state, request.a, "Scenario A")?;
    let b = resolve_side(&state, request.b, "Scenario B")?;
    Ok(ok(compare_scenarios(&a, &b)))
}

async fn list_presets(State(state): State<ApiState>) -> ApiResult<Vec<PresetRecord>> {
    let store = open_store(&state)?;
    let presets = store.list().map_err(ApiError::from_store)?;
    Ok(ok(presets))
}

async fn save_preset(
    State(state): State<ApiState>,
    body: JsonBody<SavePresetRequest>,
) -> ApiResult<PresetRecord> {
    let Json(request) = body?;
    let payload = labelled(&state, request.data.into_payload()?);
    let store = open_store(&state)?;
    let record = store
        .save(&request.name, &payload)
        .map_err(ApiError::from_store)?;
    Ok(ok(record))
}

async fn get_preset(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<PresetDetail> {
    let store = open_store(&state)?;
    let record = store.require(&id).map_err(ApiError::from_store)?;
    let result = record.data.scenario().evaluate();
    Ok(ok(PresetDetail { record, result }))
}

async fn update_preset(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    body: JsonBody<UpdatePresetRequest>,
) -> ApiResult<UpdateOutcome> {
    let Json(request) = body?;
    let payload = labelled(&state, request.data.into_payload()?);
    let store = open_store(&state)?;
    let outcome = store
        .update(&id, request.name.as_deref(), &payload)
        .map_err(ApiError::from_store)?;
    if outcome.updated == 0 {
        return Err(ApiError::not_found(format!("preset not found: {id}")));
    }
    Ok(ok(outcome))
}

async fn delete_preset(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<DeleteResponse> {
    let store = open_store(&state)?;
    let deleted = store.delete(&id).map_err(ApiError::from_store)?;
    if deleted == 0 {
        return Err(ApiError::not_found(format!("preset not found: {id}")));
    }
    Ok(ok(DeleteResponse { deleted }))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

fn open_store(state: &ApiState) -> std::result::Result<PresetStore, ApiError> {
    PresetStore::open(&state.db_path).map_err(ApiError::internal)
}

fn labelled(state: &ApiState, mut payload: PresetPayload) -> PresetPayload {
    if payload.label.is_none() {
        payload.label = Some(state.config.scoring.preset_label.clone());
    }
    payload
}

fn score_scenario(state: &ApiState, scenario: &Scenario) -> ScoreResponse {
    let warnings = scenario.warnings(state.config.scoring.weight_sum_tolerance);
    for warning in &warnings {
        warn!("scoring with questionable configuration: {warning}");
    }
    ScoreResponse {
        fingerprint: scenario.fingerprint(),
        result: scenario.evaluate(),
        warnings,
    }
}

fn resolve_side(
    state: &ApiState,
    side: CompareSide,
    fallback_name: &str,
) -> std::result::Result<NamedScenario, ApiError> {
    if let Some(draft) = side.data {
        let scenario = draft.into_payload()?.into_scenario();
        let name = side.name.unwrap_or_else(|| fallback_name.to_string());
        return Ok(NamedScenario::new(name, scenario));
    }
    let Some(reference) = side.preset else {
        return Err(ApiError::bad_request(format!(
            "{fallback_name}: either `data` or `preset` is required"
        )));
    };
    let store = open_store(state)?;
    let record = store.require(&reference).map_err(ApiError::from_store)?;
    let name = side.name.unwrap_or(record.name);
    Ok(NamedScenario::new(name, record.data.into_scenario()))
}

#[cfg(test)]
mod tests {
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::Json;
    use serde_json::json;

    use super::{
        compare, defaults, delete_preset, get_preset, health, list_presets, save_preset, score,
        update_preset, ApiState, CompareRequest, CompareSide, SavePresetRequest,
        UpdatePresetRequest,
    };
    use crate::config::Config;
    use crate::preset::BundleDraft;
    use crate::scoring::classify::Tier;

    fn state(name: &str) -> ApiState {
        let db_path = std::env::temp_dir().join(format!(
            "onboarding-classifier-{}-{name}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&db_path);
        ApiState {
            config: Config::default(),
            db_path,
        }
    }

    fn default_draft() -> BundleDraft {
        serde_json::from_value(json!({
            "inputs": crate::inputs::ClassifierInput::default(),
            "gw": crate::weights::GroupWeights::default(),
            "vw": crate::weights::VarWeights::default(),
            "th": crate::weights::Thresholds::default(),
        }))
        .expect("draft")
    }

    #[test]
    fn health_reports_ok() {
        let Json(body) = tokio_test::block_on(health());
        assert!(body.ok);
        assert_eq!(body.data.status, "ok");
    }

    #[tokio::test]
    async fn scores_complete_bundle() {
        let Json(body) = score(State(state("score")), Ok(Json(default_draft())))
            .await
            .expect("score");
        assert_eq!(body.data.result.total_score_label, "37.5");
        assert_eq!(body.data.result.classification.code, Tier::A3);
        assert!(body.data.warnings.is_empty());
    }

    #[tokio::test]
    async fn rejects_incomplete_bundle() {
        let mut draft = default_draft();
        draft.th = None;
        let err = score(State(state("incomplete")), Ok(Json(draft)))
            .await
            .expect_err("incomplete bundle");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("th"));
    }

    #[tokio::test]
    async fn warns_about_group_weight_sum() {
        let mut draft = default_draft();
        if let Some(gw) = draft.gw.as_mut() {
            gw.contract = 0.5;
        }
        let Json(body) = score(State(state("warn")), Ok(Json(draft)))
            .await
            .expect("score");
        assert_eq!(body.data.warnings.len(), 1);
    }

    #[tokio::test]
    async fn defaults_are_labelled() {
        let Json(body) = defaults(State(state("defaults"))).await;
        assert_eq!(body.data.label.as_deref(), Some("v1.0.2"));
    }

    #[tokio::test]
    async fn preset_lifecycle() {
        let state = state("lifecycle");

        let Json(saved) = save_preset(
            State(state.clone()),
            Ok(Json(SavePresetRequest {
                name: "Webshop".to_string(),
                data: default_draft(),
            })),
        )
        .await
        .expect("save");
        let id = saved.data.id.to_string();
        assert_eq!(saved.data.data.label.as_deref(), Some("v1.0.2"));

        let Json(listed) = list_presets(State(state.clone())).await.expect("list");
        assert_eq!(listed.data.len(), 1);

        let Json(detail) = get_preset(State(state.clone()), Path(id.clone()))
            .await
            .expect("get");
        assert_eq!(detail.data.result.total_score_label, "37.5");

        let Json(updated) = update_preset(
            State(state.clone()),
            Path(id.clone()),
            Ok(Json(UpdatePresetRequest {
                name: Some("Webshop XL".to_string()),
                data: default_draft(),
            })),
        )
        .await
        .expect("update");
        assert_eq!(updated.data.updated, 1);

        let Json(cmp) = compare(
            State(state.clone()),
            Ok(Json(CompareRequest {
                a: CompareSide {
                    preset: Some("Webshop XL".to_string()),
                    ..CompareSide::default()
                },
                b: CompareSide {
                    data: Some(default_draft()),
                    ..CompareSide::default()
                },
            })),
        )
        .await
        .expect("compare");
        assert_eq!(cmp.data.a.name, "Webshop XL");
        assert_eq!(cmp.data.b.name, "Scenario B");
        assert!(cmp.data.identical);

        let Json(deleted) = delete_preset(State(state.clone()), Path(id.clone()))
            .await
            .expect("delete");
        assert_eq!(deleted.data.deleted, 1);

        let missing = get_preset(State(state.clone()), Path(id))
            .await
            .expect_err("gone");
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn compare_requires_a_source() {
        let err = compare(
            State(state("compare")),
            Ok(Json(CompareRequest {
                a: CompareSide::default(),
                b: CompareSide::default(),
            })),
        )
        .await
        .expect_err("no source");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
