use axum::Router;
use axum::extract::Query;
use axum::middleware::from_fn_with_state;
use axum::response::Html;
use axum::routing::get;
use serde::Deserialize;
use storefront_auth::middleware::{AuthConfig, SessionUser, auth_routes, require_session};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::services::ServeDir;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading auth configuration...");
    let config = AuthConfig::from_env().inspect_err(|e| {
        error!(error = %e, "Auth configuration invalid, refusing to start");
    })?;

    let port: u16 = match std::env::var("PORT") {
        Ok(p) => p.parse()?,
        Err(_) => 3000,
    };

    let client = config.credentials_client();
    let gate = config.gate();

    let app = Router::new()
        .route("/", get(home))
        .route("/login", get(login_page))
        .route("/signin", get(login_page))
        .nest_service("/static", ServeDir::new("static"))
        .merge(auth_routes(config, client))
        .layer(from_fn_with_state(gate, require_session));

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "Storefront listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn home(user: SessionUser) -> Html<String> {
    let identity = &user.identity;
    Html(format!(
        "<h1>Welcome back, {}</h1>\
         <p>Signed in as {} ({})</p>\
         <form method=\"post\" action=\"/api/auth/signout\"><button>Sign out</button></form>",
        escape(&identity.name),
        escape(&identity.email),
        escape(identity.role.as_str()),
    ))
}

#[derive(Deserialize)]
struct LoginQuery {
    error: Option<String>,
    #[serde(rename = "callbackUrl")]
    callback_url: Option<String>,
}

async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    let error = query
        .error
        .map(|e| format!("<p class=\"error\">{}</p>", escape(&e)))
        .unwrap_or_default();
    let callback = query.callback_url.unwrap_or_else(|| "/".into());
    Html(format!(
        "<h1>Sign in</h1>{error}\
         <form method=\"post\" action=\"/api/auth/callback/credentials\">\
         <input type=\"hidden\" name=\"callbackUrl\" value=\"{}\">\
         <input name=\"email\" type=\"email\" placeholder=\"Email\" required>\
         <input name=\"password\" type=\"password\" placeholder=\"Password\" required>\
         <button>Sign in</button></form>",
        escape(&callback),
    ))
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutting down...");
}
