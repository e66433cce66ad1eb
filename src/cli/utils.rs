use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;
use crate::error::ClientError;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = Map::new();
            response.insert("success".into(), json!(true));
            response.insert("message".into(), json!(message));

            if let Some(Value::Object(extra)) = data {
                response.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&Value::Object(response))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Report a library error with its code
pub fn output_client_error(output_format: &OutputFormat, error: &ClientError) -> anyhow::Result<()> {
    output_error(output_format, &error.message(), Some(error.error_code()))
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Pretty-print any serializable value under a key
pub fn output_json<T: Serialize>(key: &str, value: &T) -> anyhow::Result<()> {
    let value = serde_json::to_value(value)?;
    println!("{}", serde_json::to_string_pretty(&json!({ key: value }))?);
    Ok(())
}

/// Shorten text for table columns
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Footer under a listing: loaded count, page estimate and whether more exist
pub fn listing_footer(showing: usize, loaded: usize, has_more: bool, searching: bool) -> String {
    let mut footer = format!("Showing {showing} of {loaded}");
    if searching {
        footer.push_str(" (filtered; pagination disabled while searching)");
    } else if has_more {
        footer.push_str(" (more available, use --pages)");
    }
    footer
}
