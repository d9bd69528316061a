/// Canonical form of an email address for comparisons: trimmed, lowercase.
///
/// Example: " Jane.Doe@Co.com " → "jane.doe@co.com"
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Compare two email addresses, ignoring surrounding whitespace and ASCII case.
///
/// Blank addresses never match anything, including each other.
pub fn emails_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    !a.is_empty() && a.eq_ignore_ascii_case(b)
}

/// Derive a display name from an email address (best-effort).
///
/// Example: "sarah.chen@acme.com" → "Sarah Chen"
pub fn name_from_email(email: &str) -> String {
    let local = email.trim().split('@').next().unwrap_or(email);
    local
        .split(|c: char| c == '.' || c == '_' || c == '-' || c == '+')
        .filter(|s| !s.is_empty())
        .map(|s| {
            let mut chars = s.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Return the trimmed value if it has any content.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
