//! Remote census data: the ONS beta API and postcodes.io.

use crate::config::AppConfig;
use crate::error::{SourceError, SourceResult};
use crate::types::{AreaResolution, Dimension, DimensionOption, Observation};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// The three upstream lookups a comparison needs.
#[async_trait]
pub trait CensusSource: Send + Sync {
    /// Every dimension of the population type, unfiltered, in upstream order.
    async fn dimensions(&self) -> SourceResult<Vec<Dimension>>;
    /// Postcode to LSOA.
    async fn resolve_postcode(&self, postcode: &str) -> SourceResult<AreaResolution>;
    /// Observations for an area selector such as `lsoa,E01000001` or `ctry,E92000001`.
    /// A response without observations is an empty vec, not an error.
    async fn observations(
        &self,
        area_selector: &str,
        dimension_id: &str,
    ) -> SourceResult<Vec<Observation>>;
}

#[derive(Deserialize)]
struct DimensionsPage {
    items: Vec<Dimension>,
    #[serde(default)]
    total_count: Option<u64>,
}

#[derive(Deserialize)]
struct PostcodeResponse {
    result: PostcodeResult,
}

#[derive(Deserialize)]
struct PostcodeResult {
    lsoa: Option<String>,
    codes: PostcodeCodes,
}

#[derive(Deserialize)]
struct PostcodeCodes {
    lsoa: Option<String>,
}

#[derive(Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Option<Vec<RawObservation>>,
}

#[derive(Deserialize)]
struct RawObservation {
    dimensions: Vec<DimensionOption>,
    observation: u64,
}

impl TryFrom<RawObservation> for Observation {
    type Error = String;

    fn try_from(raw: RawObservation) -> Result<Self, Self::Error> {
        let count = raw.observation;
        let mut axes = raw.dimensions.into_iter();
        match (axes.next(), axes.next()) {
            (Some(area), Some(category)) => Ok(Observation {
                area,
                category,
                count,
            }),
            _ => Err("observation has fewer than two dimensions".to_string()),
        }
    }
}

/// [`CensusSource`] backed by the public HTTP APIs.
#[derive(Debug, Clone)]
pub struct HttpCensusSource {
    client: reqwest::Client,
    ons_base_url: String,
    postcodes_base_url: String,
    population_type: String,
    page_size: u32,
}

impl HttpCensusSource {
    pub fn new(config: &AppConfig) -> SourceResult<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("postcode-census/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.api.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            ons_base_url: config.api.ons_base_url.clone(),
            postcodes_base_url: config.api.postcodes_base_url.clone(),
            population_type: config.api.population_type.clone(),
            page_size: config.dimensions.page_size.max(1),
        })
    }

    fn endpoint(base: &str, path: &str) -> SourceResult<Url> {
        let raw = format!("{}/{}", base.trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|e| SourceError::InvalidUrl {
            url: raw,
            message: e.to_string(),
        })
    }

    fn ons_endpoint(&self, resource: &str) -> SourceResult<Url> {
        Self::endpoint(
            &self.ons_base_url,
            &format!("population-types/{}/{}", self.population_type, resource),
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> SourceResult<T> {
        debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| SourceError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl CensusSource for HttpCensusSource {
    async fn dimensions(&self) -> SourceResult<Vec<Dimension>> {
        let mut dimensions = Vec::new();

        // The listing is paged; keep following offset until total_count is reached
        loop {
            let mut url = self.ons_endpoint("dimensions")?;
            url.query_pairs_mut()
                .append_pair("limit", &self.page_size.to_string())
                .append_pair("offset", &dimensions.len().to_string());

            let page: DimensionsPage = self.get_json(url).await?;
            let fetched = page.items.len();
            dimensions.extend(page.items);

            match page.total_count {
                Some(total) if fetched > 0 && (dimensions.len() as u64) < total => continue,
                _ => break,
            }
        }

        debug!("Fetched {} dimensions", dimensions.len());
        Ok(dimensions)
    }

    async fn resolve_postcode(&self, postcode: &str) -> SourceResult<AreaResolution> {
        let mut url = Self::endpoint(&self.postcodes_base_url, "postcodes")?;
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidUrl {
                url: self.postcodes_base_url.clone(),
                message: "cannot be a base url".to_string(),
            })?
            .push(postcode);

        let response: PostcodeResponse = self.get_json(url.clone()).await?;
        let missing = |field: &str| SourceError::Decode {
            url: url.to_string(),
            message: format!("postcode has no {field}"),
        };

        Ok(AreaResolution {
            area_code: response.result.codes.lsoa.ok_or_else(|| missing("LSOA code"))?,
            area_name: response.result.lsoa.ok_or_else(|| missing("LSOA name"))?,
        })
    }

    async fn observations(
        &self,
        area_selector: &str,
        dimension_id: &str,
    ) -> SourceResult<Vec<Observation>> {
        let mut url = self.ons_endpoint("census-observations")?;
        url.query_pairs_mut()
            .append_pair("area-type", area_selector)
            .append_pair("dimensions", dimension_id);

        let response: ObservationsResponse = self.get_json(url.clone()).await?;
        let raw = response.observations.unwrap_or_default();

        raw.into_iter()
            .map(Observation::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|message| SourceError::Decode {
                url: url.to_string(),
                message,
            })
    }
}
