use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data_value) = data {
                response["data"] = data_value;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print a JSON object as aligned `key  value` lines, or as pretty JSON.
pub fn output_record(output_format: &OutputFormat, value: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => {
            let Some(fields) = value.as_object() else {
                println!("{}", value);
                return Ok(());
            };

            let width = fields.keys().map(String::len).max().unwrap_or(0);
            for (key, field) in fields {
                let rendered = match field {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                println!("{:width$}  {}", key, rendered, width = width);
            }
        }
    }
    Ok(())
}
