use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

/// Rendering collaborator. Handlers hand it a view name and a data context;
/// what comes back is a complete HTTP response. HTML templating lives behind
/// this seam and is not part of this crate.
pub trait Renderer: Send + Sync {
    fn render(&self, view: &str, context: Value) -> Response;
}

/// Default renderer: echoes the view name and context as JSON. Keeps the
/// binary self-contained until a template engine is plugged in.
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, view: &str, context: Value) -> Response {
        Json(json!({ "view": view, "context": context })).into_response()
    }
}
