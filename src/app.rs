use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, patch, post, put},
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::aggregate::Cgpa;
use crate::calculator::Calculator;
use crate::grade::Grade;
use crate::row::{Row, RowKey, RowPatch};
use crate::store::Action;

/// Shared state behind every handler: one calculator for the whole server.
pub struct AppState {
    calculator: Mutex<Calculator>,
}

impl AppState {
    pub fn new(calculator: Calculator) -> Arc<Self> {
        Arc::new(AppState {
            calculator: Mutex::new(calculator),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Calculator>, AppError> {
        self.calculator.lock().map_err(|_| AppError::StatePoisoned)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("calculator state is unavailable")]
    StatePoisoned,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

#[derive(Serialize)]
struct RowView<'a> {
    #[serde(flatten)]
    row: &'a Row,
    counted: bool,
}

/// Everything the page needs to redraw: the rows and the CGPA line.
#[derive(Serialize)]
struct SheetView<'a> {
    rows: Vec<RowView<'a>>,
    cgpa: Cgpa,
    display: String,
}

impl<'a> SheetView<'a> {
    fn of(calculator: &'a Calculator) -> Self {
        SheetView {
            rows: calculator
                .rows()
                .iter()
                .map(|row| RowView {
                    row,
                    counted: row.is_counted(),
                })
                .collect(),
            cgpa: calculator.cgpa(),
            display: calculator.cgpa().to_string(),
        }
    }
}

#[derive(Serialize)]
struct GradeOption {
    label: &'static str,
    points: u8,
    text: String,
}

#[derive(Deserialize)]
struct GradeUpdate {
    grade: Grade,
}

/// Build the application router
///
/// # Arguments
/// * `state` - Shared calculator state, see [`AppState::new`]
///
/// # Returns
/// * `Router` - The page at `/` and the JSON API under `/api`
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/api/grades", get(get_grades))
        .route("/api/rows", get(get_rows).post(add_row))
        .route("/api/rows/:key", patch(edit_row).delete(delete_row))
        .route("/api/rows/:key/grade", put(set_grade))
        .route("/api/clear", post(clear_rows))
        .with_state(state)
}

/// Serve the calculator until the process is stopped
///
/// # Arguments
/// * `addr` - Address to bind, `127.0.0.1:3000` by default
/// * `calculator` - Starting table
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Error if binding or serving fails
pub async fn run(addr: SocketAddr, calculator: Calculator) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(AppState::new(calculator));

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("./static/index.html"))
}

async fn get_grades() -> Json<Vec<GradeOption>> {
    Json(
        Grade::ALL
            .into_iter()
            .map(|g| GradeOption {
                label: g.label(),
                points: g.points(),
                text: format!("{:#}", g),
            })
            .collect(),
    )
}

async fn get_rows(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let calculator = state.lock()?;
    Ok(Json(SheetView::of(&calculator)).into_response())
}

// Applies one action and answers with the redrawn sheet. Unknown keys are
// not an error; the sheet just comes back unchanged.
fn apply(state: &AppState, action: Action) -> Result<Response, AppError> {
    let mut calculator = state.lock()?;
    if !calculator.apply(action) {
        debug!("request did not match any row");
    }
    Ok(Json(SheetView::of(&calculator)).into_response())
}

async fn add_row(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    apply(&state, Action::AddRow)
}

async fn edit_row(
    Path(key): Path<u64>,
    State(state): State<Arc<AppState>>,
    Json(changes): Json<RowPatch>,
) -> Result<Response, AppError> {
    apply(&state, Action::EditRow(RowKey(key), changes))
}

async fn set_grade(
    Path(key): Path<u64>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<GradeUpdate>,
) -> Result<Response, AppError> {
    apply(&state, Action::SetGrade(RowKey(key), update.grade))
}

async fn delete_row(
    Path(key): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    apply(&state, Action::DeleteRow(RowKey(key)))
}

async fn clear_rows(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    apply(&state, Action::ClearAll)
}
