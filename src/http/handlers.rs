use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::group::peer::FetchResponse;
use crate::group::registry;

use super::protocol::{encode_fetch_response, unescape_component};

/// Builds the router serving peer lookups under `base_path`.
///
/// The host process mounts this next to whatever else it serves; every peer
/// in the cluster must use the same base path. Requests outside the base path
/// are dispatched elsewhere by the host mux and never reach the handler.
pub fn router(base_path: &str) -> Router {
    let cleaned = base_path.trim_matches('/');
    let base = if cleaned.is_empty() {
        "/".to_string()
    } else {
        format!("/{cleaned}/")
    };

    let route = format!("{base}*suffix");
    Router::new().route(
        &route,
        get(move |uri: Uri| handle_fetch(uri, base.clone())),
    )
}

/// Serves one peer lookup: `GET <base path><group>/<key>`.
///
/// Answers 400 for a malformed suffix, 404 for an unknown group, 500 with the
/// error text when the group lookup fails, and 200 with the encoded response
/// record otherwise.
async fn handle_fetch(uri: Uri, base_path: String) -> Response {
    let path = uri.path();
    tracing::debug!("Peer request: {}", path);

    // The route registration pins the prefix; anything else means the host
    // mux misrouted the request to us.
    let suffix = path
        .strip_prefix(&base_path)
        .unwrap_or_else(|| panic!("peer handler received a request outside {base_path}: {path}"));

    // Exactly <group>/<key>; the key may itself contain escaped slashes.
    let mut parts = suffix.splitn(2, '/');
    let (group, key) = match (parts.next(), parts.next()) {
        (Some(group), Some(key)) => (group, key),
        _ => return (StatusCode::BAD_REQUEST, "bad request").into_response(),
    };

    let (group, key) = match (unescape_component(group), unescape_component(key)) {
        (Ok(group), Ok(key)) => (group, key),
        _ => return (StatusCode::BAD_REQUEST, "bad request").into_response(),
    };

    let Some(group) = registry::lookup(&group) else {
        return (StatusCode::NOT_FOUND, format!("no such group: {group}")).into_response();
    };

    match group.get(&key).await {
        Ok(view) => {
            let record = encode_fetch_response(&FetchResponse { value: view.to_vec() });
            (
                [(header::CONTENT_TYPE, "application/octet-stream")],
                record,
            )
                .into_response()
        }
        Err(error) => (StatusCode::INTERNAL_SERVER_ERROR, format!("{error:#}")).into_response(),
    }
}
