use std::fmt::Write;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::routing::RouteTable;

/// Body of the health endpoint.
pub const HEALTH_BODY: &str = "Gateway is healthy!";

pub fn health() -> Response {
    (StatusCode::OK, HEALTH_BODY).into_response()
}

/// One block per route, in table order.
pub fn render_routes(table: &RouteTable) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Configured Routes ({}):", table.len());
    out.push('\n');

    for route in table.routes() {
        let _ = writeln!(out, "Path: {}", route.path_pattern());
        let _ = writeln!(out, "Service: {}", route.service_name());
        let _ = writeln!(out, "Auth: {}", route.auth_required());
        let _ = writeln!(out, "Target: {}", route.target_url());
        out.push_str("---\n");
    }

    out
}

pub fn routes(table: &RouteTable) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain")],
        render_routes(table),
    )
        .into_response()
}
