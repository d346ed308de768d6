use crate::data::CensusSource;
use crate::error::SourceResult;
use crate::types::Dimension;
use tracing::info;

/// Dimensions too granular to be useful at LSOA level.
pub const EXCLUDED_DIMENSIONS: [&str; 9] = [
    "Country of birth (extended) (190 categories)",
    "Country of birth (60 categories)",
    "Industry (current) (88 categories)",
    "Industry (former) (17 categories)",
    "Occupation (current) (105 categories)",
    "Occupation (former) (11 categories)",
    "Passports held (52 categories)",
    "Employment history (4 categories)",
    "National identity (detailed) (73 categories)",
];

/// Fetches the dimension list and drops denylisted labels.
/// `extra_excluded` adds to the built-in denylist, it never replaces it.
pub async fn load_dimensions(
    source: &dyn CensusSource,
    extra_excluded: &[String],
) -> SourceResult<Vec<Dimension>> {
    let all = source.dimensions().await?;
    let total = all.len();
    let dimensions = filter_dimensions(all, extra_excluded);

    info!(
        "Loaded {} dimensions ({} excluded)",
        dimensions.len(),
        total - dimensions.len()
    );
    Ok(dimensions)
}

pub fn filter_dimensions(dimensions: Vec<Dimension>, extra_excluded: &[String]) -> Vec<Dimension> {
    dimensions
        .into_iter()
        .filter(|d| {
            !EXCLUDED_DIMENSIONS.contains(&d.label.as_str())
                && !extra_excluded.iter().any(|label| *label == d.label)
        })
        .collect()
}
