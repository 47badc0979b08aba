use serde_json::{Map, Value};

use crate::error::ServiceError;

/// A parsed prediction request: ordered feature columns and row-major
/// numeric cells. Column order follows the JSON document, which is the
/// order the model sees.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularInput {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl TabularInput {
    /// Accepts the three tabular JSON orientations: an object of
    /// column-name to value-array, an array of per-row objects, or an
    /// array of bare numeric rows.
    pub fn from_json(value: &Value) -> Result<Self, ServiceError> {
        match value {
            Value::Object(map) => Self::from_columns(map),
            Value::Array(items) => match items.first() {
                Some(Value::Object(_)) => Self::from_records(items),
                Some(Value::Array(_)) => Self::from_rows(items),
                _ => Err(ServiceError::Prediction(
                    "rows must be JSON objects or arrays of numbers".into(),
                )),
            },
            _ => Err(ServiceError::Prediction(
                "expected an object of columns or an array of rows".into(),
            )),
        }
    }

    /// True for payloads that carry no rows at all (`null`, `{}`, `[]`).
    pub fn is_empty_payload(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    fn from_columns(map: &Map<String, Value>) -> Result<Self, ServiceError> {
        let mut columns = Vec::with_capacity(map.len());
        let mut series: Vec<Vec<f64>> = Vec::with_capacity(map.len());
        let mut expected_len: Option<usize> = None;

        for (name, value) in map {
            let Value::Array(items) = value else {
                return Err(ServiceError::Prediction(format!(
                    "column '{name}' must be a JSON array of values"
                )));
            };
            match expected_len {
                Some(len) if len != items.len() => {
                    return Err(ServiceError::Prediction(format!(
                        "column '{name}' has {} values, expected {len}",
                        items.len()
                    )));
                }
                None => expected_len = Some(items.len()),
                _ => {}
            }

            let mut column = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                let cell = item.as_f64().ok_or_else(|| {
                    ServiceError::Prediction(format!(
                        "column '{name}' row {idx} is not numeric"
                    ))
                })?;
                column.push(cell);
            }
            columns.push(name.clone());
            series.push(column);
        }

        let row_count = expected_len.unwrap_or(0);
        let rows = (0..row_count)
            .map(|r| series.iter().map(|column| column[r]).collect())
            .collect();

        Ok(Self { columns, rows })
    }

    fn from_records(items: &[Value]) -> Result<Self, ServiceError> {
        let columns: Vec<String> = match items.first() {
            Some(Value::Object(first)) => first.keys().cloned().collect(),
            _ => {
                return Err(ServiceError::Prediction(
                    "rows must be JSON objects".into(),
                ));
            }
        };

        let mut rows = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            let Value::Object(record) = item else {
                return Err(ServiceError::Prediction(format!(
                    "row {idx} is not a JSON object"
                )));
            };
            if record.len() != columns.len() {
                return Err(ServiceError::Prediction(format!(
                    "row {idx} has {} fields, expected {}",
                    record.len(),
                    columns.len()
                )));
            }

            let mut row = Vec::with_capacity(columns.len());
            for name in &columns {
                let cell = record.get(name).ok_or_else(|| {
                    ServiceError::Prediction(format!("row {idx} missing column '{name}'"))
                })?;
                let cell = cell.as_f64().ok_or_else(|| {
                    ServiceError::Prediction(format!(
                        "row {idx} column '{name}' is not numeric"
                    ))
                })?;
                row.push(cell);
            }
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    fn from_rows(items: &[Value]) -> Result<Self, ServiceError> {
        let mut width: Option<usize> = None;
        let mut rows = Vec::with_capacity(items.len());

        for (idx, item) in items.iter().enumerate() {
            let Value::Array(values) = item else {
                return Err(ServiceError::Prediction(format!(
                    "row {idx} is not a JSON array"
                )));
            };
            match width {
                Some(len) if len != values.len() => {
                    return Err(ServiceError::Prediction(format!(
                        "row {idx} has {} values, expected {len}",
                        values.len()
                    )));
                }
                None => width = Some(values.len()),
                _ => {}
            }

            let mut row = Vec::with_capacity(values.len());
            for (col, value) in values.iter().enumerate() {
                let cell = value.as_f64().ok_or_else(|| {
                    ServiceError::Prediction(format!(
                        "row {idx} column {col} is not numeric"
                    ))
                })?;
                row.push(cell);
            }
            rows.push(row);
        }

        // Positional columns keep the row width observable downstream.
        let columns = (0..width.unwrap_or(0)).map(|i| i.to_string()).collect();

        Ok(Self { columns, rows })
    }
}
