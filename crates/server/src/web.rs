//! Landing page and static assets.
//!
//! - `GET /`        — chat landing page with the product catalog (HTML)
//! - `GET /static/*` — stylesheet and other assets

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use tera::{Context, Tera};
use tower_http::services::ServeDir;
use tracing::{error, warn};

use metrobot_core::catalog::ProductCatalog;

#[derive(Clone)]
pub struct WebState {
    catalog: ProductCatalog,
    templates: Arc<Tera>,
}

fn init_templates() -> Arc<Tera> {
    let mut tera = match Tera::new("templates/**/*") {
        Ok(tera) => tera,
        Err(cause) => {
            warn!(error = %cause, "failed to load templates from filesystem, using empty Tera instance");
            Tera::default()
        }
    };

    // Embedded fallback keeps the page working when the binary runs outside
    // the repository root.
    tera.add_raw_template("index.html", include_str!("../../../templates/index.html")).ok();

    Arc::new(tera)
}

pub fn router(catalog: ProductCatalog) -> Router {
    let templates = init_templates();

    Router::new()
        .route("/", get(index))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(WebState { catalog, templates })
}

async fn index(State(state): State<WebState>) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let mut context = Context::new();
    context.insert("products", state.catalog.entries());

    match state.templates.render("index.html", &context) {
        Ok(page) => Ok(Html(page)),
        Err(cause) => {
            error!(event_name = "web.render_failed", error = %cause, "landing page render failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h1>Something went wrong</h1>".to_string()),
            ))
        }
    }
}
