//! Chart.js 折线图配置（字段名与 Chart.js 一致）

use serde::{Deserialize, Serialize};

use super::VisitorBucket;

pub const DAILY_VISITORS_LABEL: &str = "Daily Visitors";
pub const DAILY_VISITORS_COLOR: &str = "rgb(75, 192, 192)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChartConfig {
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<LineDataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDataset {
    pub label: String,
    pub data: Vec<u64>,
    pub border_color: String,
    pub tension: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub maintain_aspect_ratio: bool,
}

impl LineChartConfig {
    pub fn daily_visitors(series: &[VisitorBucket]) -> Self {
        Self {
            data: ChartData {
                labels: series.iter().map(|b| b.date.clone()).collect(),
                datasets: vec![LineDataset {
                    label: DAILY_VISITORS_LABEL.to_string(),
                    data: series.iter().map(|b| b.count).collect(),
                    border_color: DAILY_VISITORS_COLOR.to_string(),
                    tension: 0.1,
                }],
            },
            options: ChartOptions {
                maintain_aspect_ratio: false,
            },
        }
    }
}
