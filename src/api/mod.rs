pub mod auth;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Json, Multipart, State},
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::policy::PolicyStore;
use crate::request::{
    self, BatchResponse, CalculationRequest, DeductionSetting, RequestError, ServiceError,
};

pub use auth::AdminCredentials;

/// Multipart field carrying the uploaded tax file
pub const TAX_FILE_FIELD: &str = "taxFile";

const CALCULATION_FAILED: &str = "failed to calculate tax";
const PERSONAL_UPDATE_FAILED: &str = "failed to set personal deduction";
const K_RECEIPT_UPDATE_FAILED: &str = "failed to set k-receipt deduction";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PolicyStore>,
    pub admin: AdminCredentials,
}

impl AppState {
    pub fn new(store: Arc<dyn PolicyStore>, admin: AdminCredentials) -> Self {
        AppState { store, admin }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
}

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/deductions/personal", post(personal_deduction_handler))
        .route("/deductions/k-receipt", post(k_receipt_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    Router::new()
        .route("/", get(index_handler))
        .route("/tax/calculations", post(calculate_handler))
        .route("/tax/calculations/upload-csv", post(upload_csv_handler))
        .nest("/admin", admin)
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(port: u16, state: AppState) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    log::info!("Income tax HTTP API listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("Shutting down the server");
}

async fn index_handler() -> impl IntoResponse {
    "Hello, Income Tax!"
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(payload)) = payload else {
        return request_error_response(RequestError::InvalidBody);
    };
    match request::calculate(state.store.as_ref(), &payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(e) => service_error_response(e, CALCULATION_FAILED),
    }
}

async fn upload_csv_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let contents = match tax_file_contents(multipart).await {
        Ok(contents) => contents,
        Err(e) => return request_error_response(e),
    };
    match request::calculate_batch(state.store.as_ref(), &contents[..]) {
        Ok(taxes) => json_response(StatusCode::OK, BatchResponse { taxes }),
        Err(e) => service_error_response(e, CALCULATION_FAILED),
    }
}

async fn tax_file_contents(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Bytes, RequestError> {
    let mut multipart = multipart.map_err(|_| RequestError::MissingTaxFile)?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| RequestError::MissingTaxFile)?
    {
        if field.name() == Some(TAX_FILE_FIELD) {
            return field.bytes().await.map_err(|e| {
                log::debug!("Failed to read {}: {}", TAX_FILE_FIELD, e);
                RequestError::InvalidFileFormat
            });
        }
    }
    Err(RequestError::MissingTaxFile)
}

async fn personal_deduction_handler(
    State(state): State<AppState>,
    payload: Result<Json<DeductionSetting>, JsonRejection>,
) -> Response {
    let Ok(Json(setting)) = payload else {
        return request_error_response(RequestError::InvalidBody);
    };
    match request::update_personal_deduction(state.store.as_ref(), &setting) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(e) => service_error_response(e, PERSONAL_UPDATE_FAILED),
    }
}

async fn k_receipt_handler(
    State(state): State<AppState>,
    payload: Result<Json<DeductionSetting>, JsonRejection>,
) -> Response {
    let Ok(Json(setting)) = payload else {
        return request_error_response(RequestError::InvalidBody);
    };
    match request::update_capped_deduction_ceiling(state.store.as_ref(), &setting) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(e) => service_error_response(e, K_RECEIPT_UPDATE_FAILED),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            message: msg.to_string(),
        },
    )
}

fn request_error_response(err: RequestError) -> Response {
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

/// Store failures are logged and reported with a fixed message.
fn service_error_response(err: ServiceError, failure: &str) -> Response {
    match err {
        ServiceError::Invalid(e) => request_error_response(e),
        ServiceError::Store(e) => {
            log::error!("{}: {}", failure, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, failure)
        }
    }
}
