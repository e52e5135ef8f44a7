//! Historical series construction and period-label arithmetic.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;
use crate::query::types::ResultSet;

/// One point in a forecast payload: period label plus numeric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: String,
    pub value: f64,
}

/// Granularity inferred from the shape of the period labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodGranularity {
    /// `YYYY`
    Yearly,
    /// `YYYY-MM`
    Monthly,
    /// `YYYY-MM-DD`
    Daily,
}

/// A chronologically sorted `(date, value)` series built from a query
/// result set.
#[derive(Debug, Clone)]
pub struct HistoricalSeries {
    points: Vec<SeriesPoint>,
    granularity: PeriodGranularity,
}

#[derive(Debug, Clone)]
struct SeriesPoint {
    label: String,
    date: NaiveDate,
    value: f64,
}

impl HistoricalSeries {
    /// Build a series from a result set.
    ///
    /// Requires `date` and `value` columns with at least one row, every
    /// date parseable as `YYYY`, `YYYY-MM`, or `YYYY-MM-DD`, and every
    /// value numeric. Points come out sorted ascending by date.
    pub fn from_result_set(rs: &ResultSet) -> Result<Self, ForecastError> {
        let date_idx = rs.column_index("date");
        let value_idx = rs.column_index("value");
        let (Some(date_idx), Some(value_idx)) = (date_idx, value_idx) else {
            return Err(ForecastError::MissingColumns);
        };
        if rs.rows.is_empty() {
            return Err(ForecastError::MissingColumns);
        }

        let mut points = Vec::with_capacity(rs.rows.len());
        let mut granularity = None;
        for row in &rs.rows {
            let label = match &row[date_idx] {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                other => return Err(ForecastError::UnparseableDate(other.to_string())),
            };
            let (date, g) = parse_period_label(&label)
                .ok_or_else(|| ForecastError::UnparseableDate(label.clone()))?;
            granularity.get_or_insert(g);

            let value = match &row[value_idx] {
                serde_json::Value::Number(n) => n
                    .as_f64()
                    .ok_or_else(|| ForecastError::NonNumeric(n.to_string()))?,
                serde_json::Value::String(s) => s
                    .parse::<f64>()
                    .map_err(|_| ForecastError::NonNumeric(s.clone()))?,
                other => return Err(ForecastError::NonNumeric(other.to_string())),
            };

            points.push(SeriesPoint { label, date, value });
        }
        points.sort_by_key(|p| p.date);

        Ok(Self {
            points,
            // At least one row, so the granularity is always set.
            granularity: granularity.unwrap_or(PeriodGranularity::Monthly),
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn granularity(&self) -> PeriodGranularity {
        self.granularity
    }

    /// Values in chronological order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Period labels in chronological order.
    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|p| p.label.clone()).collect()
    }

    /// The series as forecast-shaped points.
    pub fn to_points(&self) -> Vec<ForecastPoint> {
        self.points
            .iter()
            .map(|p| ForecastPoint {
                date: p.label.clone(),
                value: p.value,
            })
            .collect()
    }

    /// The next `n` period labels after the last historical period, at
    /// this series' granularity. Strictly increasing.
    pub fn future_labels(&self, n: u32) -> Vec<String> {
        let Some(last) = self.points.last() else {
            return Vec::new();
        };
        let mut date = last.date;
        let mut labels = Vec::with_capacity(n as usize);
        for _ in 0..n {
            date = match self.granularity {
                PeriodGranularity::Yearly => date
                    .with_year(date.year() + 1)
                    .unwrap_or(date + Months::new(12)),
                PeriodGranularity::Monthly => date + Months::new(1),
                PeriodGranularity::Daily => date.succ_opt().unwrap_or(date),
            };
            labels.push(format_period_label(date, self.granularity));
        }
        labels
    }
}

/// Parse a period label into its anchor date and granularity.
fn parse_period_label(label: &str) -> Option<(NaiveDate, PeriodGranularity)> {
    let label = label.trim();
    if label.len() == 4 && label.chars().all(|c| c.is_ascii_digit()) {
        let year: i32 = label.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1).map(|d| (d, PeriodGranularity::Yearly));
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", label), "%Y-%m-%d") {
        if label.len() == 7 {
            return Some((date, PeriodGranularity::Monthly));
        }
    }
    NaiveDate::parse_from_str(label, "%Y-%m-%d")
        .ok()
        .map(|d| (d, PeriodGranularity::Daily))
}

fn format_period_label(date: NaiveDate, granularity: PeriodGranularity) -> String {
    match granularity {
        PeriodGranularity::Yearly => date.format("%Y").to_string(),
        PeriodGranularity::Monthly => date.format("%Y-%m").to_string(),
        PeriodGranularity::Daily => date.format("%Y-%m-%d").to_string(),
    }
}
