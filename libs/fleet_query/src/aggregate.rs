use std::collections::BTreeMap;

use chrono::NaiveDate;
use data_connector_client::ODataRow;
use serde_json::Value;
use utils::serials::is_valid_serial;

use crate::models::{Granularity, Metric, MetricRow, TimeSeriesPoint};

pub const DATE_TIME_COLUMN: &str = "DateTime";
pub const SERIAL_COLUMN: &str = "SerialNo";

/// Bucket for an ISO-8601 timestamp: its `YYYY-MM-DD` or `YYYY-MM` prefix.
///
/// Returns `None` when the prefix is not a calendar date or month.
pub fn bucket_of(timestamp: &str, granularity: Granularity) -> Option<String> {
    let prefix = timestamp.get(..granularity.bucket_len())?;

    let parsed = match granularity {
        Granularity::Daily => NaiveDate::parse_from_str(prefix, "%Y-%m-%d"),
        Granularity::Monthly => {
            NaiveDate::parse_from_str(&format!("{prefix}-01"), "%Y-%m-%d")
        }
    };

    parsed.is_ok().then(|| prefix.to_string())
}

/// Trimmed `SerialNo` of a KPI row, if it is a usable serial.
pub fn row_serial(row: &ODataRow) -> Option<&str> {
    row.get(SERIAL_COLUMN)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| is_valid_serial(s))
}

/// Numeric metric value; numeric strings are accepted.
pub fn row_value(row: &ODataRow, column: &str) -> Option<f64> {
    let value = match row.get(column)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    value.is_finite().then_some(value)
}

/// Projects raw KPI rows into sorted [`MetricRow`]s, dropping rows without
/// a value, serial or valid timestamp. Devices missing from `names` are
/// shown by serial.
pub fn project_rows(
    raw: &[ODataRow],
    metric: Metric,
    granularity: Granularity,
    names: &BTreeMap<String, String>,
) -> Vec<MetricRow> {
    let column = metric.column();

    let mut rows: Vec<MetricRow> = raw
        .iter()
        .filter_map(|row| {
            let value = row_value(row, column)?;
            let serial = row_serial(row)?;
            let bucket = row
                .get(DATE_TIME_COLUMN)
                .and_then(Value::as_str)
                .and_then(|ts| bucket_of(ts, granularity))?;

            Some(MetricRow {
                bucket,
                device_name: names
                    .get(serial)
                    .cloned()
                    .unwrap_or_else(|| serial.to_string()),
                device_serial: serial.to_string(),
                value,
            })
        })
        .collect();

    sort_rows(&mut rows);
    rows
}

/// Orders rows by bucket, then device name, then serial.
pub fn sort_rows(rows: &mut [MetricRow]) {
    rows.sort_by(|a, b| {
        (a.bucket.as_str(), a.device_name.as_str(), a.device_serial.as_str())
            .cmp(&(
                b.bucket.as_str(),
                b.device_name.as_str(),
                b.device_serial.as_str(),
            ))
    });
}

/// Sums row values per bucket, ordered by bucket.
pub fn aggregate_points(rows: &[MetricRow]) -> Vec<TimeSeriesPoint> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for row in rows {
        *totals.entry(row.bucket.as_str()).or_default() += row.value;
    }

    totals
        .into_iter()
        .map(|(bucket, value)| TimeSeriesPoint {
            bucket: bucket.to_string(),
            value: round3(value),
        })
        .collect()
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn raw(ts: &str, serial: &str, value: Value) -> ODataRow {
        let Value::Object(map) = json!({
            "DateTime": ts,
            "SerialNo": serial,
            "Distance_Km": value,
        }) else {
            unreachable!()
        };
        map
    }

    fn row(bucket: &str, name: &str, serial: &str, value: f64) -> MetricRow {
        MetricRow {
            bucket: bucket.into(),
            device_name: name.into(),
            device_serial: serial.into(),
            value,
        }
    }

    #[test]
    fn daily_bucket_is_first_ten_characters() {
        assert_eq!(
            bucket_of("2024-03-09T23:59:59Z", Granularity::Daily),
            Some("2024-03-09".to_string())
        );
    }

    #[test]
    fn monthly_bucket_is_first_seven_characters() {
        assert_eq!(
            bucket_of("2024-03-09T23:59:59Z", Granularity::Monthly),
            Some("2024-03".to_string())
        );
    }

    #[test]
    fn unparseable_timestamps_have_no_bucket() {
        assert_eq!(bucket_of("2024-3", Granularity::Daily), None);
        assert_eq!(bucket_of("yesterday!", Granularity::Daily), None);
        assert_eq!(bucket_of("2024-13-01", Granularity::Monthly), None);
        assert_eq!(bucket_of("", Granularity::Monthly), None);
    }

    #[test]
    fn values_accept_numbers_and_numeric_strings() {
        let r = raw("2024-01-01T00:00:00Z", "S1", json!("12.5"));
        assert_eq!(row_value(&r, "Distance_Km"), Some(12.5));
        let r = raw("2024-01-01T00:00:00Z", "S1", json!(3));
        assert_eq!(row_value(&r, "Distance_Km"), Some(3.0));
        let r = raw("2024-01-01T00:00:00Z", "S1", Value::Null);
        assert_eq!(row_value(&r, "Distance_Km"), None);
        let r = raw("2024-01-01T00:00:00Z", "S1", json!("n/a"));
        assert_eq!(row_value(&r, "Distance_Km"), None);
    }

    #[test]
    fn projection_drops_incomplete_rows_and_names_devices() {
        let raw_rows = vec![
            raw("2024-01-02T00:00:00Z", "S2", json!(1.0)),
            raw("2024-01-01T00:00:00Z", "S1", json!(2.0)),
            raw("2024-01-01T00:00:00Z", "  ", json!(3.0)),
            raw("bad", "S1", json!(4.0)),
            raw("2024-01-01T00:00:00Z", "S3", Value::Null),
        ];
        let names: BTreeMap<String, String> =
            [("S1".to_string(), "Truck".to_string())].into_iter().collect();

        let rows = project_rows(
            &raw_rows,
            Metric::Distance,
            Granularity::Daily,
            &names,
        );

        assert_eq!(
            rows,
            vec![
                row("2024-01-01", "Truck", "S1", 2.0),
                row("2024-01-02", "S2", "S2", 1.0),
            ]
        );
    }

    #[test]
    fn placeholder_and_malformed_serials_are_dropped() {
        let raw_rows = vec![
            raw("2024-01-01T00:00:00Z", "000-000-0000", json!(1.0)),
            raw("2024-01-01T00:00:00Z", "G9/ABC", json!(2.0)),
            raw("2024-01-01T00:00:00Z", " G9ABC ", json!(3.0)),
        ];

        assert_eq!(row_serial(&raw_rows[0]), None);
        assert_eq!(row_serial(&raw_rows[1]), None);
        assert_eq!(row_serial(&raw_rows[2]), Some("G9ABC"));

        let rows = project_rows(
            &raw_rows,
            Metric::Distance,
            Granularity::Daily,
            &BTreeMap::new(),
        );
        assert_eq!(rows, vec![row("2024-01-01", "G9ABC", "G9ABC", 3.0)]);
    }

    #[test]
    fn rows_sort_by_bucket_then_name_then_serial() {
        let mut rows = vec![
            row("2024-01-02", "A", "S1", 1.0),
            row("2024-01-01", "b", "S2", 1.0),
            row("2024-01-01", "B", "S9", 1.0),
            row("2024-01-01", "B", "S3", 1.0),
        ];
        sort_rows(&mut rows);

        let keys: Vec<_> = rows
            .iter()
            .map(|r| (r.bucket.as_str(), r.device_name.as_str(), r.device_serial.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("2024-01-01", "B", "S3"),
                ("2024-01-01", "B", "S9"),
                ("2024-01-01", "b", "S2"),
                ("2024-01-02", "A", "S1"),
            ]
        );
    }

    #[test]
    fn points_sum_per_bucket_and_round_to_three_decimals() {
        let rows = vec![
            row("2024-01-01", "A", "S1", 0.1111),
            row("2024-01-01", "B", "S2", 0.2222),
            row("2024-01-03", "A", "S1", 5.0),
            row("2024-01-02", "A", "S1", 1.0),
        ];

        let points = aggregate_points(&rows);

        assert_eq!(
            points,
            vec![
                TimeSeriesPoint { bucket: "2024-01-01".into(), value: 0.333 },
                TimeSeriesPoint { bucket: "2024-01-02".into(), value: 1.0 },
                TimeSeriesPoint { bucket: "2024-01-03".into(), value: 5.0 },
            ]
        );

        let row_total: f64 = rows.iter().map(|r| r.value).sum();
        let point_total: f64 = points.iter().map(|p| p.value).sum();
        assert!((row_total - point_total).abs() <= 0.0005 * points.len() as f64);
    }
}
