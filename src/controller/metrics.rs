//! Prometheus scrape endpoint
//!
//! Every request runs one full collection cycle.

use std::time::Instant;

use actix_web::{get, web, HttpResponse, Responder};
use prometheus::TEXT_FORMAT;
use tracing::{info, info_span};
use uuid::Uuid;

use crate::{
    configuration::{AppState, State},
    error::Error,
};

#[get("/metrics")]
pub async fn index(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    let request_id = Uuid::new_v4();
    let span = info_span!(
        parent: &state.span,
        "request",
        request_id = %request_id
    );
    let start = Instant::now();

    let snapshot = state.collector.collect(&span).await?;
    let body = snapshot.render()?;

    info!(
        parent: &span,
        "Request processed in {:?}, {} queries",
        start.elapsed(),
        snapshot.queries.len()
    );

    Ok(HttpResponse::Ok().content_type(TEXT_FORMAT).body(body))
}
