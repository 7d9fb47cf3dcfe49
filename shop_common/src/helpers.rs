/// Interprets an optional flag value (typically read from an environment variable).
///
/// `1`, `true`, `yes` and `on` enable the flag; `0`, `false`, `no` and `off` disable it. Anything else,
/// including a missing value, yields `default`.
pub fn parse_boolean_flag(value: Option<&str>, default: bool) -> bool {
    let Some(value) = value else {
        return default;
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
