//! Asset inventory web server
//!
//! Thin HTTP tier over the `inv-poc` library: upload + CRUD routes, the
//! Salesforce asset-type and debug endpoints, and PDF report generation.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use inv_poc::{
    ai::{AssetMetadata, GroqClient},
    config::AppConfig,
    models::{AssetRecord, CrmStatus, HistoryEntry},
    salesforce::{
        create_asset_record, types::is_user_id, AssetDraft, CreateOutcome, SalesforceClient,
    },
    store::{AssetStore, HistoryLog},
};

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub stores: Arc<Mutex<Stores>>,
    pub vision: Option<Arc<GroqClient>>,
}

pub struct Stores {
    pub assets: AssetStore,
    pub history: HistoryLog,
}

// API types
#[derive(Serialize)]
pub struct AssetTypeInfo {
    pub id: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct AssetTypesResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub asset_types: Vec<AssetTypeInfo>,
}

#[derive(Deserialize)]
pub struct CreateAssetTypeRequest {
    pub name: Option<String>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub asset: AssetRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salesforce_status: Option<CrmStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salesforce_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salesforce_error: Option<String>,
}

#[derive(Deserialize)]
pub struct GeneratePdfRequest {
    pub engineer_name: String,
    pub engineer_category: String,
    #[serde(default)]
    pub asset_ids: Vec<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter("inv_poc_web_server=info,inv_poc=info,tower_http=debug")
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Arc::new(AppConfig::from_env());

    let vision = GroqClient::from_env().map(Arc::new);
    if vision.is_none() {
        warn!("GROQ_API_KEY not configured; uploads will use placeholder metadata");
    }

    let stores = Arc::new(Mutex::new(Stores {
        assets: AssetStore::new(&config.assets_file),
        history: HistoryLog::new(&config.history_file),
    }));

    let state = AppState {
        config: config.clone(),
        stores,
        vision,
    };

    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/get-asset-types", get(get_asset_types))
        .route("/create-asset-type", post(create_asset_type))
        .route("/upload-image", post(upload_image))
        .route("/assets", get(get_assets))
        .route(
            "/assets/:asset_id",
            get(get_single_asset).put(update_asset).delete(delete_asset),
        )
        .route("/debug/asset_fields", get(debug_asset_fields))
        .route("/generate-pdf", post(generate_pdf))
        .route("/asset-history", get(get_asset_history))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        config.frontend_url.as_str(),
        "http://localhost:5173",
        "http://localhost:3000",
        "http://localhost:5000",
    ]
    .iter()
    .filter_map(|origin| origin.parse().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn home() -> Json<Value> {
    Json(json!({
        "message": "Asset Inventory Server Running",
        "status": "healthy"
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_asset_types(State(state): State<AppState>) -> Response {
    let sf = match SalesforceClient::connect(&state.config.salesforce).await {
        Ok(sf) => sf,
        Err(err) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AssetTypesResponse {
                    success: false,
                    error: Some(err.to_string()),
                    asset_types: Vec::new(),
                }),
            )
                .into_response();
        }
    };

    match sf.list_asset_types().await {
        Ok(records) => Json(AssetTypesResponse {
            success: true,
            error: None,
            asset_types: records
                .into_iter()
                .map(|r| AssetTypeInfo {
                    id: r.id,
                    name: r.name,
                })
                .collect(),
        })
        .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(AssetTypesResponse {
                success: false,
                error: Some(err.to_string()),
                asset_types: Vec::new(),
            }),
        )
            .into_response(),
    }
}

async fn create_asset_type(
    State(state): State<AppState>,
    Json(request): Json<CreateAssetTypeRequest>,
) -> Response {
    let Some(name) = request.name.filter(|n| !n.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "Missing name" })),
        )
            .into_response();
    };

    let sf = match SalesforceClient::connect(&state.config.salesforce).await {
        Ok(sf) => sf,
        Err(err) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": err.to_string() })),
            )
                .into_response();
        }
    };

    match sf.create_asset_type(&name).await {
        Ok(id) => Json(json!({ "success": true, "id": id, "name": name })).into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": err.to_string() })),
        )
            .into_response(),
    }
}

async fn upload_image(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut image_bytes: Option<Vec<u8>> = None;
    let mut image_filename = String::from("upload");
    let mut image_mime = String::from("image/jpeg");
    let mut form: HashMap<String, String> = HashMap::new();

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let name = field.name().unwrap_or_default().to_string();
                if name == "image" {
                    if let Some(filename) = field.file_name() {
                        image_filename = filename.to_string();
                    }
                    if let Some(mime) = field.content_type() {
                        image_mime = mime.to_string();
                    }
                    match field.bytes().await {
                        Ok(bytes) => image_bytes = Some(bytes.to_vec()),
                        Err(err) => {
                            return (
                                StatusCode::BAD_REQUEST,
                                Json(json!({ "error": format!("Failed to read image: {err}") })),
                            )
                                .into_response();
                        }
                    }
                } else {
                    form.insert(name, field.text().await.unwrap_or_default());
                }
            }
            Ok(None) => break,
            Err(err) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("Malformed multipart body: {err}") })),
                )
                    .into_response();
            }
        }
    }

    let Some(image_bytes) = image_bytes else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No image file provided" })),
        )
            .into_response();
    };

    let text = |key: &str| form.get(key).cloned().unwrap_or_default();
    let engineer_name = form
        .get("engineer_name")
        .cloned()
        .unwrap_or_else(|| "Unknown".to_string());
    let engineer_id = text("engineer_id");
    let category = form
        .get("category")
        .cloned()
        .unwrap_or_else(|| "general".to_string());

    let image_base64 = BASE64.encode(&image_bytes);

    // Vision analysis; any failure degrades to placeholder metadata
    let metadata = match &state.vision {
        Some(vision) => match vision.analyze_asset(&image_base64, &image_mime).await {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!(error = %err, "vision analysis failed; using placeholder metadata");
                AssetMetadata::placeholder("Failed to analyze", "Unable to generate description.")
            }
        },
        None => AssetMetadata::default(),
    };

    let final_asset_name = {
        let requested = text("asset_name");
        if requested.is_empty() {
            metadata.asset_name.clone()
        } else {
            requested
        }
    };

    let stores = state.stores.lock().await;
    let mut assets = stores.assets.load();
    let new_id = AssetStore::next_id(&assets);

    let mut record = AssetRecord {
        id: new_id,
        filename: image_filename,
        engineer_name: engineer_name.clone(),
        engineer_id: engineer_id.clone(),
        engineer_category: category.clone(),
        asset_id: text("asset_id"),
        asset_name: final_asset_name.clone(),
        asset_number: text("asset_number"),
        serial_number: text("serial_number"),
        purchase_date: text("purchase_date"),
        asset_type: text("asset_type"),
        asset_price: {
            let price = text("asset_price");
            if price.is_empty() {
                "0".to_string()
            } else {
                price
            }
        },
        manufacturer: metadata.manufacturer.clone(),
        model_number: metadata.model_number.clone(),
        condition: metadata.condition.clone(),
        visual_description: metadata.visual_description.clone(),
        detailed_description: metadata.detailed_description.clone(),
        category: if metadata.category.is_empty() {
            category.clone()
        } else {
            metadata.category.clone()
        },
        image_base64,
        raw_metadata: metadata,
        stored_location: state.config.storage_location.clone(),
        uploaded_at: Utc::now(),
        updated_at: None,
        salesforce_id: None,
        salesforce_status: None,
        salesforce_error: None,
    };

    // The engineer identity handed to resolution: a canonical ID when the
    // form carried one, the display name otherwise.
    let engineer_value = if is_user_id(&engineer_id) {
        engineer_id
    } else {
        engineer_name
    };

    let draft = AssetDraft {
        name: final_asset_name,
        asset_type_id: Some(record.asset_type.clone()).filter(|v| !v.is_empty()),
        account_id: Some(text("account_id")).filter(|v| !v.is_empty()),
        contact_id: Some(text("contact_id")).filter(|v| !v.is_empty()),
        description: Some(record.detailed_description.clone()).filter(|v| !v.is_empty()),
        serial_number: Some(record.serial_number.clone()).filter(|v| !v.is_empty()),
        purchase_date: Some(record.purchase_date.clone()).filter(|v| !v.is_empty()),
        price: Some(record.asset_price.clone()).filter(|v| !v.is_empty()),
        engineer: Some(engineer_value).filter(|v| !v.trim().is_empty()),
    };

    match SalesforceClient::connect(&state.config.salesforce).await {
        Ok(sf) => {
            match create_asset_record(
                &sf,
                &draft,
                &state.config.engineer_mapping,
                state.config.default_account_id.as_deref(),
            )
            .await
            {
                Ok(CreateOutcome::Created { id, .. }) => {
                    record.salesforce_id = Some(id);
                    record.salesforce_status = Some(CrmStatus::Created);
                }
                Ok(CreateOutcome::Skipped { reason }) => {
                    record.salesforce_status = Some(CrmStatus::Skipped);
                    record.salesforce_error = Some(reason);
                }
                Err(err) => {
                    record.salesforce_status = Some(CrmStatus::Failed);
                    record.salesforce_error = Some(err.to_string());
                }
            }
        }
        Err(err) => {
            warn!(error = %err, "Salesforce unavailable for this upload");
            record.salesforce_status = Some(CrmStatus::Failed);
            record.salesforce_error = Some(err.to_string());
        }
    }

    assets.push(record.clone());

    let seq = stores.history.next_seq();
    if let Err(err) = stores.history.append(HistoryEntry::stored_location(
        seq,
        record.id,
        &record.asset_name,
        &record.stored_location,
    )) {
        warn!(error = %err, "failed to append history entry");
    }

    if let Err(err) = stores.assets.save(&assets) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to save asset locally", "details": err.to_string() })),
        )
            .into_response();
    }

    Json(UploadResponse {
        success: true,
        message: "Asset saved successfully".to_string(),
        salesforce_status: record.salesforce_status,
        salesforce_id: record.salesforce_id.clone(),
        salesforce_error: record.salesforce_error.clone(),
        asset: record,
    })
    .into_response()
}

async fn get_assets(State(state): State<AppState>) -> Json<Vec<AssetRecord>> {
    let stores = state.stores.lock().await;
    Json(stores.assets.load())
}

async fn get_single_asset(
    State(state): State<AppState>,
    Path(asset_id): Path<u64>,
) -> Response {
    let stores = state.stores.lock().await;
    match stores.assets.load().into_iter().find(|a| a.id == asset_id) {
        Some(asset) => Json(asset).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Asset not found" })),
        )
            .into_response(),
    }
}

async fn update_asset(
    State(state): State<AppState>,
    Path(asset_id): Path<u64>,
    Json(patch): Json<Map<String, Value>>,
) -> Response {
    let stores = state.stores.lock().await;
    let mut assets = stores.assets.load();
    let Some(asset) = assets.iter_mut().find(|a| a.id == asset_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Asset not found" })),
        )
            .into_response();
    };

    asset.apply_update(&patch);
    let updated = asset.clone();

    match stores.assets.save(&assets) {
        Ok(()) => Json(json!({
            "success": true,
            "message": "Asset updated",
            "asset": updated
        }))
        .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to update asset", "details": err.to_string() })),
        )
            .into_response(),
    }
}

async fn delete_asset(State(state): State<AppState>, Path(asset_id): Path<u64>) -> Response {
    let stores = state.stores.lock().await;
    let mut assets = stores.assets.load();
    let original_count = assets.len();
    assets.retain(|a| a.id != asset_id);

    if assets.len() == original_count {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Asset not found" })),
        )
            .into_response();
    }

    match stores.assets.save(&assets) {
        Ok(()) => Json(json!({ "success": true, "message": "Asset deleted" })).into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to delete asset", "details": err.to_string() })),
        )
            .into_response(),
    }
}

async fn debug_asset_fields(State(state): State<AppState>) -> Response {
    let sf = match SalesforceClient::connect(&state.config.salesforce).await {
        Ok(sf) => sf,
        Err(err) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response();
        }
    };

    match sf.describe_raw("Asset").await {
        Ok(fields) => Json(json!({
            "success": true,
            "fields": fields,
            "PREFERRED_USER_LOOKUP": state.config.engineer_mapping.preferred_user_field
        }))
        .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

async fn generate_pdf(
    State(state): State<AppState>,
    Json(request): Json<GeneratePdfRequest>,
) -> Response {
    if request.engineer_name.is_empty()
        || request.engineer_category.is_empty()
        || request.asset_ids.is_empty()
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing required fields" })),
        )
            .into_response();
    }

    let selected: Vec<AssetRecord> = {
        let stores = state.stores.lock().await;
        let all = stores.assets.load();
        request
            .asset_ids
            .iter()
            .filter_map(|id| all.iter().find(|a| a.id == *id).cloned())
            .collect()
    };

    if selected.is_empty() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No valid assets found" })),
        )
            .into_response();
    }

    match inv_poc::report::render_inventory_report(
        &request.engineer_name,
        &request.engineer_category,
        &selected,
    ) {
        Ok(bytes) => {
            let filename = format!(
                "{}_Report_{}.pdf",
                request.engineer_name.replace(' ', "_"),
                Utc::now().format("%Y%m%d")
            );
            Response::builder()
                .header(header::CONTENT_TYPE, "application/pdf")
                .header(
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={filename}"),
                )
                .body(Body::from(bytes))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to generate PDF", "details": err.to_string() })),
        )
            .into_response(),
    }
}

async fn get_asset_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    let stores = state.stores.lock().await;
    Json(stores.history.load())
}
