use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub time: DateTime<Utc>,
    pub value: f64,
}

// Price series plus 7 and 30 period simple moving averages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChartSeries {
    pub prices: Vec<ChartPoint>,
    pub ma7: Vec<ChartPoint>,
    pub ma30: Vec<ChartPoint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<ChartPoint>,
}
