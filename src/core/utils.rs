//! String helpers for turning API identifiers into display text

/// Turns a camelCase field name into a form label.
///
/// The first character is upper-cased and every interior capital letter is
/// preceded by a space.
///
/// # Examples
/// ```
/// use elements_admin::core::utils::humanize_field_name;
///
/// assert_eq!(humanize_field_name("displayName"), "Display Name");
/// assert_eq!(humanize_field_name("email"), "Email");
/// ```
pub fn humanize_field_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if i == 0 {
            result.extend(ch.to_uppercase());
        } else {
            if ch.is_uppercase() {
                result.push(' ');
            }
            result.push(ch);
        }
    }
    result
}

/// Converts kebab-case or snake_case into Title Case.
///
/// # Examples
/// ```
/// use elements_admin::core::utils::to_title_case;
///
/// assert_eq!(to_title_case("smart-contracts"), "Smart Contracts");
/// assert_eq!(to_title_case("auth_scheme"), "Auth Scheme");
/// ```
pub fn to_title_case(s: &str) -> String {
    s.split(['-', '_'])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncates to `max_chars` characters, appending `...` when shortened.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_field_name() {
        assert_eq!(humanize_field_name("name"), "Name");
        assert_eq!(humanize_field_name("displayName"), "Display Name");
        assert_eq!(humanize_field_name("sessionExpiryMs"), "Session Expiry Ms");
        assert_eq!(humanize_field_name(""), "");
    }

    #[test]
    fn test_to_title_case() {
        assert_eq!(to_title_case("users"), "Users");
        assert_eq!(to_title_case("game-on_matches"), "Game On Matches");
        assert_eq!(to_title_case("hello/world"), "Hello/world");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdefghij", 4), "abcd...");
        // Multi-byte characters count as one
        assert_eq!(truncate_chars("ééééé", 2), "éé...");
    }
}
