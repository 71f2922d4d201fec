use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use glidepath_core::advice::{Advice, Advisor};
use glidepath_core::domain::glide_path::{self, GlidePoint};
use glidepath_core::domain::questionnaire::Questionnaire;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = glidepath_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let advisor = match Advisor::from_settings(&settings) {
        Ok(advisor) => advisor,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            return Err(e);
        }
    };

    let app = router(AppState { advisor });

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!(%addr, market_data = %settings.market_data_base_url, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/glide-path", get(get_glide_path))
        .route("/advice", post(post_advice))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    advisor: Advisor,
}

#[derive(Debug, Serialize)]
struct ApiAdvice {
    request_id: Uuid,
    #[serde(flatten)]
    advice: Advice,
    glide_path: Vec<GlidePoint>,
}

#[derive(Debug, Serialize)]
struct ApiError {
    request_id: Uuid,
    error: String,
    field: Option<&'static str>,
}

impl ApiError {
    fn response(status: StatusCode, request_id: Uuid, error: String, field: Option<&'static str>) -> Response {
        (
            status,
            Json(Self {
                request_id,
                error,
                field,
            }),
        )
            .into_response()
    }
}

async fn get_glide_path() -> Json<Vec<GlidePoint>> {
    Json(glide_path::series())
}

async fn post_advice(
    State(state): State<AppState>,
    body: Result<Json<Questionnaire>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();

    let Json(questionnaire) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::info!(%request_id, error = %rejection.body_text(), "malformed questionnaire");
            return ApiError::response(rejection.status(), request_id, rejection.body_text(), None);
        }
    };

    match state.advisor.advise(questionnaire).await {
        Ok(advice) => {
            tracing::info!(
                %request_id,
                years_left = advice.assessment.horizon.years_left,
                band = ?advice.assessment.band,
                "advice served"
            );
            (
                StatusCode::OK,
                Json(ApiAdvice {
                    request_id,
                    advice,
                    glide_path: glide_path::series(),
                }),
            )
                .into_response()
        }
        Err(err) => {
            tracing::info!(%request_id, error = %err, "questionnaire rejected");
            ApiError::response(
                StatusCode::UNPROCESSABLE_ENTITY,
                request_id,
                err.to_string(),
                Some(err.field()),
            )
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &glidepath_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
