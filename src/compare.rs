use crate::config::ApiConfig;
use crate::data::CensusSource;
use crate::error::CompareError;
use crate::processing::join_and_compute;
use crate::types::{ComparisonTable, Observation};
use tracing::debug;

/// Runs one submission: postcode lookup, then area and reference
/// observations, then the join.
///
/// `Ok(None)` covers the no-data cases: a blank postcode, or either
/// observation set coming back empty.
pub async fn compare(
    source: &dyn CensusSource,
    api: &ApiConfig,
    postcode: &str,
    dimension_id: &str,
) -> Result<Option<ComparisonTable>, CompareError> {
    let postcode = postcode.trim();
    if postcode.is_empty() {
        return Ok(None);
    }

    let area = source
        .resolve_postcode(postcode)
        .await
        .map_err(|source| CompareError::Geocode {
            postcode: postcode.to_string(),
            source,
        })?;
    debug!("{} is in {} ({})", postcode, area.area_name, area.area_code);

    let area_selector = api.area_selector(&area.area_code);
    let area_observations = fetch(source, &area_selector, dimension_id).await?;
    let reference_observations = fetch(source, &api.reference_area, dimension_id).await?;

    if area_observations.is_empty() || reference_observations.is_empty() {
        debug!(
            "No observations for {} ({} area, {} reference)",
            dimension_id,
            area_observations.len(),
            reference_observations.len()
        );
        return Ok(None);
    }

    let rows = join_and_compute(&area_observations, &reference_observations);
    Ok(Some(ComparisonTable::new(area, &api.reference_name, rows)))
}

async fn fetch(
    source: &dyn CensusSource,
    selector: &str,
    dimension_id: &str,
) -> Result<Vec<Observation>, CompareError> {
    source
        .observations(selector, dimension_id)
        .await
        .map_err(|source| CompareError::Observations {
            selector: selector.to_string(),
            source,
        })
}
