//! Chart-side validation with a canned fallback series.
//!
//! A chart never renders a broken series: if the reconciled points are too
//! few or carry non-finite numbers, a fixed day profile is substituted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::EnergyDataPoint;

/// Minimum number of points a chart accepts
pub const MIN_CHART_POINTS: usize = 2;

/// (minutes after midnight, consumption kW, solar kW)
const FALLBACK_PROFILE: [(i64, f64, f64); 12] = [
    (0, 0.8, 0.0),
    (120, 0.6, 0.0),
    (240, 0.6, 0.0),
    (360, 1.9, 0.4),
    (480, 3.1, 2.2),
    (600, 1.8, 5.1),
    (720, 1.6, 7.2),
    (840, 1.7, 6.0),
    (960, 2.4, 3.1),
    (1080, 4.2, 0.6),
    (1200, 3.6, 0.0),
    (1320, 1.4, 0.0),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub points: Vec<EnergyDataPoint>,
    pub is_fallback: bool,
}

/// At least `min_points` points, every numeric field finite
pub fn validate_chart_data(points: &[EnergyDataPoint], min_points: usize) -> bool {
    points.len() >= min_points && points.iter().all(EnergyDataPoint::is_finite)
}

/// Canned profile anchored at the start of `anchor`'s UTC day.
/// Depends only on that day, so repeated calls agree.
pub fn fallback_series(anchor: DateTime<Utc>) -> Vec<EnergyDataPoint> {
    let midnight = anchor
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|d| d.and_utc())
        .unwrap_or(anchor);
    FALLBACK_PROFILE
        .iter()
        .map(|&(minutes, consumption, solar)| {
            EnergyDataPoint::new(midnight + Duration::minutes(minutes), consumption, solar)
        })
        .collect()
}

pub fn chart_series_or_fallback(
    points: Vec<EnergyDataPoint>,
    min_points: usize,
    anchor: DateTime<Utc>,
) -> ChartSeries {
    if validate_chart_data(&points, min_points) {
        return ChartSeries {
            points,
            is_fallback: false,
        };
    }
    debug!(
        received = points.len(),
        min_points, "chart data rejected, using fallback series"
    );
    ChartSeries {
        points: fallback_series(anchor),
        is_fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, h, 17, 0).unwrap()
    }

    #[test]
    fn single_point_is_rejected() {
        let pts = vec![EnergyDataPoint::new(at(1), 1.0, 0.0)];
        assert!(!validate_chart_data(&pts, MIN_CHART_POINTS));
    }

    #[test]
    fn non_finite_point_is_rejected() {
        let pts = vec![
            EnergyDataPoint::new(at(1), 1.0, 0.0),
            EnergyDataPoint::new(at(2), f64::NAN, 0.0),
        ];
        assert!(!validate_chart_data(&pts, MIN_CHART_POINTS));
    }

    #[test]
    fn valid_series_passes_through() {
        let pts = vec![
            EnergyDataPoint::new(at(1), 1.0, 0.0),
            EnergyDataPoint::new(at(2), 2.0, 0.5),
        ];
        let chart = chart_series_or_fallback(pts.clone(), MIN_CHART_POINTS, at(3));
        assert!(!chart.is_fallback);
        assert_eq!(chart.points, pts);
    }

    #[test]
    fn fallback_is_idempotent() {
        let bad = vec![EnergyDataPoint::new(at(1), f64::INFINITY, 0.0)];
        let first = chart_series_or_fallback(bad.clone(), MIN_CHART_POINTS, at(5));
        let second = chart_series_or_fallback(bad, MIN_CHART_POINTS, at(20));
        assert!(first.is_fallback);
        assert_eq!(first, second);
    }

    #[test]
    fn fallback_profile_shape() {
        let pts = fallback_series(at(9));
        assert_eq!(pts.len(), 12);
        assert_eq!(pts[0].time, "00:00");
        assert_eq!(pts[11].time, "22:00");
        assert!(pts.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert!(pts.iter().all(|p| p.grid >= 0.0));
        assert!(validate_chart_data(&pts, MIN_CHART_POINTS));
    }
}
