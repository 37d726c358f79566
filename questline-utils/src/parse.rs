/// Extract the token from an `Authorization` header value like `Bearer abc`.
///
/// The scheme is matched case-insensitively. Empty tokens are rejected.
pub fn parse_bearer_token(header: &str) -> Option<&str> {
    let value = header.trim();
    let (scheme, token) = value.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Interpret a loose boolean flag (`1`, `true`, `yes`, `on`).
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Split a command line like `javac Father.java Main.java` into program and args.
pub fn parse_command_line(raw: &str) -> Option<Vec<String>> {
    let parts: Vec<String> = raw.split_whitespace().map(str::to_owned).collect();
    if parts.is_empty() { None } else { Some(parts) }
}
