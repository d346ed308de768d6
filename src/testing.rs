//! Test doubles shared by the unit tests.

use crate::data::CensusSource;
use crate::error::{SourceError, SourceResult};
use crate::types::{AreaResolution, Dimension, DimensionOption, Observation};
use async_trait::async_trait;
use axum::Router;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream");
    let addr = listener.local_addr().expect("upstream addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve upstream");
    });
    format!("http://{addr}")
}

pub fn observation(area_type: &str, category: &str, count: u64) -> Observation {
    Observation {
        area: DimensionOption {
            id: area_type.to_string(),
            label: None,
            option: "area".to_string(),
            option_id: None,
        },
        category: DimensionOption {
            id: "dimension".to_string(),
            label: None,
            option: category.to_string(),
            option_id: None,
        },
        count,
    }
}

/// In-memory [`CensusSource`]. Unknown postcodes answer 404, unknown
/// (selector, dimension) pairs answer 400.
#[derive(Default)]
pub struct FakeSource {
    pub dimensions: Vec<Dimension>,
    pub postcodes: HashMap<String, AreaResolution>,
    pub observations: HashMap<(String, String), Vec<Observation>>,
    pub calls: AtomicUsize,
}

impl FakeSource {
    pub fn with_postcode(mut self, postcode: &str, code: &str, name: &str) -> Self {
        self.postcodes.insert(
            postcode.to_string(),
            AreaResolution {
                area_code: code.to_string(),
                area_name: name.to_string(),
            },
        );
        self
    }

    pub fn with_observations(
        mut self,
        selector: &str,
        dimension: &str,
        observations: Vec<Observation>,
    ) -> Self {
        self.observations
            .insert((selector.to_string(), dimension.to_string()), observations);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CensusSource for FakeSource {
    async fn dimensions(&self) -> SourceResult<Vec<Dimension>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.dimensions.clone())
    }

    async fn resolve_postcode(&self, postcode: &str) -> SourceResult<AreaResolution> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.postcodes
            .get(postcode)
            .cloned()
            .ok_or_else(|| SourceError::Status {
                url: format!("fake://postcodes/{postcode}"),
                status: 404,
            })
    }

    async fn observations(
        &self,
        area_selector: &str,
        dimension_id: &str,
    ) -> SourceResult<Vec<Observation>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.observations
            .get(&(area_selector.to_string(), dimension_id.to_string()))
            .cloned()
            .ok_or_else(|| SourceError::Status {
                url: format!("fake://census-observations?area-type={area_selector}"),
                status: 400,
            })
    }
}
