//! HTTP surface for the scanner.
//!
//! Three endpoints: `/scan` triggers a scan and returns the figures,
//! `/status` reports phase, cooldown and the ticker frame, `/health` is a
//! liveness probe.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::config::{Config, LinksConfig};
use crate::error::Error;
use crate::gap;
use crate::gate;
use crate::session::{Phase, ScanSession, ScanSnapshot};
use crate::ticker::{CyclingDisplay, TickerFrame};
use crate::types::InvestmentAmount;

/// Shared state behind every handler.
pub struct AppState {
    pub session: Arc<ScanSession>,
    pub display: CyclingDisplay,
    pub config: Config,
}

#[derive(Debug, Deserialize)]
pub struct ScanParams {
    /// Notional for the profit projection, [100, 10000] step 100.
    pub amount: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub phase: Phase,
    pub progress: f64,
    pub reference_price: f64,
    pub comparison_price: f64,
    pub gap_percent: f64,
    pub investment: f64,
    pub units_acquired: f64,
    pub final_amount: f64,
    pub profit: f64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub phase: Phase,
    pub progress: f64,
    /// `HH:MM:SS` until a new scan is permitted; absent means ready.
    pub cooldown_remaining: Option<String>,
    pub reference_price: Option<f64>,
    pub comparison_price: Option<f64>,
    pub gap_percent: Option<f64>,
    pub labels: TickerFrame,
    pub links: LinksConfig,
}

async fn scan(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScanParams>,
) -> Result<Json<ScanResponse>, (StatusCode, String)> {
    let amount = params.amount.unwrap_or(state.config.scan.default_investment);
    let amount =
        InvestmentAmount::new(amount).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let snapshot = state
        .session
        .start()
        .await
        .map_err(|e| (error_status(&e), e.to_string()))?;

    scan_response(&snapshot, amount)
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "scan armed without a quote".to_string(),
            )
        })
}

async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, (StatusCode, String)> {
    let snapshot = state.session.snapshot().await;
    let remaining = state
        .session
        .cooldown_remaining()
        .await
        .map_err(|e| (error_status(&e), e.to_string()))?;

    Ok(Json(StatusResponse {
        phase: snapshot.phase,
        progress: snapshot.progress,
        cooldown_remaining: remaining.map(gate::format_remaining),
        reference_price: snapshot.quote.map(|q| q.reference_price),
        comparison_price: snapshot.gap.map(|g| g.comparison_price),
        gap_percent: snapshot.gap.map(|g| g.gap_percent),
        labels: state.display.frame(),
        links: state.config.links.clone(),
    }))
}

async fn health_check() -> &'static str {
    "OK"
}

fn scan_response(snapshot: &ScanSnapshot, amount: InvestmentAmount) -> Option<ScanResponse> {
    let quote = snapshot.quote?;
    let gap = snapshot.gap?;
    let projection = gap::project(amount, quote.reference_price, gap.comparison_price);
    Some(ScanResponse {
        phase: snapshot.phase,
        progress: snapshot.progress,
        reference_price: quote.reference_price,
        comparison_price: gap.comparison_price,
        gap_percent: gap.gap_percent,
        investment: amount.get(),
        units_acquired: projection.units_acquired,
        final_amount: projection.final_amount,
        profit: projection.profit,
    })
}

fn error_status(error: &Error) -> StatusCode {
    match error {
        Error::CooldownActive(_) => StatusCode::TOO_MANY_REQUESTS,
        Error::Fetch(_) => StatusCode::BAD_GATEWAY,
        Error::InvalidInvestment { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Create the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/scan", get(scan))
        .route("/status", get(status))
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn serve(
    state: Arc<AppState>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("gapfinder API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
