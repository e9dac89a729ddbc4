use crate::domain::model::Record;
use serde_json::Value;

/// Serialize a uniform list of records to CSV text.
///
/// The header comes from the first record's field order; later records are
/// assumed to share that schema. String values containing a comma are
/// wrapped in double quotes; embedded quotes and newlines are not escaped.
/// Both are documented limitations of the format this feed has always used,
/// kept deliberately.
pub fn to_csv(records: &[Record]) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };

    let headers: Vec<&str> = first.data.keys().map(String::as_str).collect();
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(headers.join(","));

    for record in records {
        let fields: Vec<String> = headers
            .iter()
            .map(|header| render_field(record.field(header)))
            .collect();
        lines.push(fields.join(","));
    }

    lines.join("\n")
}

fn render_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if s.contains(',') => format!("\"{}\"", s),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(v) => v.to_string(),
    }
}
