use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub pretty: bool,
    pub use_color: bool,
    pub verbose: bool,
}

pub fn detect_color(color_flag: bool) -> bool {
    if !color_flag {
        return false;
    }
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    std::io::stdout().is_terminal()
}

/// Serialize `value` for stdout, honoring `--pretty`.
pub fn to_json<T: serde::Serialize>(value: &T, opts: &OutputOptions) -> serde_json::Result<String> {
    if opts.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(pretty: bool) -> OutputOptions {
        OutputOptions {
            format: OutputFormat::Json,
            pretty,
            use_color: false,
            verbose: false,
        }
    }

    #[test]
    fn detect_color_respects_flag() {
        assert!(!detect_color(false));
    }

    #[test]
    fn to_json_compact_and_pretty() {
        let value = serde_json::json!({ "total": 1.5 });
        assert_eq!(to_json(&value, &opts(false)).unwrap(), r#"{"total":1.5}"#);
        assert!(to_json(&value, &opts(true)).unwrap().contains('\n'));
    }
}
