use serde::{Deserialize, Serialize};

/// A selectable census variable, e.g. `highest_qualification`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub id: String,
    pub label: String,
}

/// The LSOA a postcode falls in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaResolution {
    pub area_code: String,
    pub area_name: String,
}

/// One classification-axis entry of an observation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DimensionOption {
    // ONS publishes this as `dimension_id`
    #[serde(alias = "dimension_id")]
    pub id: String,
    #[serde(default, rename = "dimension")]
    pub label: Option<String>,
    pub option: String,
    #[serde(default)]
    pub option_id: Option<String>,
}

/// A single (area, category) count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub area: DimensionOption,
    pub category: DimensionOption,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinedRow {
    pub category: String,
    pub area_count: u64,
    // None when the reference dataset has no such category
    pub reference_count: Option<u64>,
    pub area_share: String,
    pub reference_share: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonTable {
    pub area: AreaResolution,
    pub reference_name: String,
    pub columns: [String; 4],
    pub rows: Vec<JoinedRow>,
}

impl ComparisonTable {
    pub fn new(area: AreaResolution, reference_name: &str, rows: Vec<JoinedRow>) -> Self {
        let columns = [
            "Category".to_string(),
            format!("Number of residents in {}", area.area_name),
            format!("Share of residents {}", area.area_name),
            format!("Share of residents in {}", reference_name),
        ];
        Self {
            area,
            reference_name: reference_name.to_string(),
            columns,
            rows,
        }
    }
}
