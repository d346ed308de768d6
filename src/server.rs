use crate::compare::compare;
use crate::config::AppConfig;
use crate::data::CensusSource;
use crate::error::CompareError;
use crate::render::{render_page, PageModel};
use crate::types::{ComparisonTable, Dimension};
use anyhow::Result;
use axum::{
    extract::{Query, State},
    response::{Html, Json},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Built once at startup and shared read-only by every request.
pub struct AppState {
    pub config: AppConfig,
    pub dimensions: Vec<Dimension>,
    pub source: Arc<dyn CensusSource>,
}

impl AppState {
    fn dimension_or_default<'a>(&'a self, requested: Option<&'a str>) -> Option<&'a str> {
        requested
            .filter(|d| !d.is_empty())
            .or_else(|| self.dimensions.first().map(|d| d.id.as_str()))
    }

    /// Runs the pipeline; every failure degrades to no table.
    async fn comparison(&self, postcode: &str, dimension: &str) -> Option<ComparisonTable> {
        match compare(self.source.as_ref(), &self.config.api, postcode, dimension).await {
            Ok(table) => table,
            Err(CompareError::Geocode { postcode, source }) => {
                warn!("Error getting output area for postcode {}: {}", postcode, source);
                None
            }
            Err(err @ CompareError::Observations { .. }) => {
                debug!("{}", err);
                None
            }
        }
    }
}

#[derive(Deserialize)]
pub struct FormParams {
    postcode: Option<String>,
    dimension: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/dimensions", get(dimensions_handler))
        .route("/api/compare", get(compare_handler))
        .route("/health", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Starting server on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FormParams>,
) -> Html<String> {
    let postcode = params.postcode.as_deref().unwrap_or("");
    let dimension = state.dimension_or_default(params.dimension.as_deref());

    let table = match dimension {
        Some(dimension) => state.comparison(postcode, dimension).await,
        None => None,
    };

    Html(render_page(&PageModel {
        dimensions: &state.dimensions,
        postcode,
        selected_dimension: dimension,
        table: table.as_ref(),
    }))
}

async fn dimensions_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Dimension>> {
    Json(state.dimensions.clone())
}

async fn compare_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FormParams>,
) -> Json<Option<ComparisonTable>> {
    let postcode = params.postcode.as_deref().unwrap_or("");
    let table = match state.dimension_or_default(params.dimension.as_deref()) {
        Some(dimension) => state.comparison(postcode, dimension).await,
        None => None,
    };
    Json(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{observation, FakeSource};
    use serde_json::Value;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn state(source: FakeSource) -> AppState {
        AppState {
            config: AppConfig::default(),
            dimensions: vec![
                Dimension {
                    id: "hh_tenure_5a".to_string(),
                    label: "Tenure of household (5 categories)".to_string(),
                },
                Dimension {
                    id: "sex".to_string(),
                    label: "Sex (2 categories)".to_string(),
                },
            ],
            source: Arc::new(source),
        }
    }

    fn source() -> FakeSource {
        FakeSource::default()
            .with_postcode("SW1A 1AA", "E01004736", "Westminster 018C")
            .with_observations(
                "lsoa,E01004736",
                "hh_tenure_5a",
                vec![
                    observation("lsoa", "Owned", 30),
                    observation("lsoa", "Does not apply", 5),
                    observation("lsoa", "Rented", 70),
                ],
            )
            .with_observations(
                "ctry,E92000001",
                "hh_tenure_5a",
                vec![
                    observation("ctry", "Owned", 40),
                    observation("ctry", "Rented", 60),
                ],
            )
    }

    async fn request(state: AppState, path: &str) -> (u16, String) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        let app = router(Arc::new(state));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        let mut stream = tokio::net::TcpStream::connect(addr)
            .await
            .expect("connect server");
        let req = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
        stream
            .write_all(req.as_bytes())
            .await
            .expect("write request");
        let mut response = String::new();
        stream
            .read_to_string(&mut response)
            .await
            .expect("read response");
        let (head, body) = response
            .split_once("\r\n\r\n")
            .expect("http response separator");
        let status = head
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|s| s.parse::<u16>().ok())
            .expect("status");
        (status, body.to_string())
    }

    #[tokio::test]
    async fn index_without_postcode_shows_empty_form() {
        let (status, body) = request(state(source()), "/").await;

        assert_eq!(status, 200);
        assert!(body.contains(r#"<option value="hh_tenure_5a" selected>"#));
        assert!(!body.contains("<th>"));
    }

    #[tokio::test]
    async fn index_renders_comparison() {
        let (status, body) = request(
            state(source()),
            "/?postcode=SW1A+1AA&dimension=hh_tenure_5a",
        )
        .await;

        assert_eq!(status, 200);
        assert!(body.contains("<th>Share of residents Westminster 018C</th>"));
        assert!(body.contains("<td>Owned</td>"));
        assert!(body.contains(r#"<td class="num">30%</td><td class="num">40%</td>"#));
        assert!(!body.contains("Does not apply"));
    }

    #[tokio::test]
    async fn unknown_postcode_renders_empty_table() {
        let (status, body) = request(state(source()), "/?postcode=ZZ99+9ZZ").await;

        assert_eq!(status, 200);
        assert!(body.contains(r#"value="ZZ99 9ZZ""#));
        assert!(!body.contains("<td>"));
    }

    #[tokio::test]
    async fn api_compare_returns_json_rows() {
        let (status, body) = request(state(source()), "/api/compare?postcode=SW1A%201AA").await;
        assert_eq!(status, 200);

        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["area"]["area_code"], "E01004736");
        assert_eq!(json["columns"][1], "Number of residents in Westminster 018C");
        assert_eq!(json["rows"].as_array().unwrap().len(), 2);
        assert_eq!(json["rows"][1]["category"], "Rented");
        assert_eq!(json["rows"][1]["area_share"], "70%");
        assert_eq!(json["rows"][1]["reference_share"], "60%");
    }

    #[tokio::test]
    async fn api_compare_failure_is_null() {
        let (status, body) = request(state(source()), "/api/compare?postcode=SW1A%201AA&dimension=sex").await;
        assert_eq!(status, 200);
        assert_eq!(body, "null");
    }

    #[tokio::test]
    async fn api_dimensions_lists_catalog() {
        let (status, body) = request(state(source()), "/api/dimensions").await;
        assert_eq!(status, 200);

        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json[1]["id"], "sex");
        assert_eq!(json[1]["label"], "Sex (2 categories)");
    }

    #[tokio::test]
    async fn health() {
        let (status, body) = request(state(FakeSource::default()), "/health").await;
        assert_eq!(status, 200);
        assert_eq!(body, "ok");
    }
}
