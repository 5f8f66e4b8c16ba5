use serde_json::json;

use crate::cli::OutputFormat;
use crate::warehouse::validate_code;

/// Print the normalized code, or fail so the process exits non-zero
pub fn handle(raw: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let code = validate_code(raw).ok_or_else(|| anyhow::anyhow!("Invalid code: {:?}", raw))?;

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "success": true, "code": code }))?);
        }
        OutputFormat::Text => println!("{}", code),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_codes() {
        assert!(handle("AB 12", OutputFormat::Text).is_ok());
        assert!(handle("ABCDE-1", OutputFormat::Json).is_err());
    }
}
