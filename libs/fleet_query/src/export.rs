use crate::models::MetricRow;

pub const CSV_HEADER: &str = "bucket,device_name,device_serial,value";
pub const CSV_ROW_LIMIT: usize = 1000;

/// Renders at most [`CSV_ROW_LIMIT`] rows as CSV, header first.
pub fn rows_to_csv(rows: &[MetricRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len().min(CSV_ROW_LIMIT) + 1);
    lines.push(CSV_HEADER.to_string());

    for row in rows.iter().take(CSV_ROW_LIMIT) {
        lines.push(format!(
            "{},{},{},{:?}",
            escape(&row.bucket),
            escape(&row.device_name),
            escape(&row.device_serial),
            row.value
        ));
    }

    lines.join("\n")
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(name: &str, value: f64) -> MetricRow {
        MetricRow {
            bucket: "2024-01".into(),
            device_name: name.into(),
            device_serial: "S1".into(),
            value,
        }
    }

    #[test]
    fn renders_header_and_rows() {
        let csv = rows_to_csv(&[row("Truck 1", 15.0), row("Van", 0.125)]);
        assert_eq!(
            csv,
            "bucket,device_name,device_serial,value\n\
             2024-01,Truck 1,S1,15.0\n\
             2024-01,Van,S1,0.125"
        );
    }

    #[test]
    fn quotes_fields_with_separators() {
        let csv = rows_to_csv(&[row("Truck, \"big\"", 1.0)]);
        assert_eq!(csv.lines().nth(1), Some("2024-01,\"Truck, \"\"big\"\"\",S1,1.0"));
    }

    #[test]
    fn caps_output_rows() {
        let rows: Vec<_> = (0..1500).map(|i| row("T", i as f64)).collect();
        let csv = rows_to_csv(&rows);
        assert_eq!(csv.lines().count(), CSV_ROW_LIMIT + 1);
    }

    #[test]
    fn empty_input_is_header_only() {
        assert_eq!(rows_to_csv(&[]), CSV_HEADER);
    }
}
