//! Path template helpers

use once_cell::sync::Lazy;
use regex::Regex;

static PATH_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^}]+)\}").unwrap());

/// `{name}` placeholders of a path template, in order of appearance.
///
/// ```
/// use elements_admin::analysis::paths::extract_path_params;
///
/// assert_eq!(extract_path_params("/user/{id}/profile/{profileId}"), vec!["id", "profileId"]);
/// ```
pub fn extract_path_params(path: &str) -> Vec<String> {
    PATH_PARAM
        .captures_iter(path)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// A list path can be loaded without any parent identifiers
pub fn is_list_path(path: &str) -> bool {
    !path.contains('{')
}

/// Resource name a path belongs to.
///
/// - one non-parameter segment: that segment (`/helloworld` -> `helloworld`)
/// - several segments, none parameters: the whole path (`/hello/world` -> `hello/world`)
/// - otherwise the first non-parameter segment (`/application/{id}` -> `application`)
///
/// An empty string means the path has no usable name.
pub fn resource_name(path: &str) -> String {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let parts: Vec<&str> = trimmed.split('/').collect();
    let non_param: Vec<&str> = parts
        .iter()
        .copied()
        .filter(|part| !part.starts_with('{'))
        .collect();

    if non_param.len() == 1 {
        return non_param[0].to_string();
    }
    if parts.len() == non_param.len() {
        return non_param.join("/");
    }
    non_param.first().map(|s| s.to_string()).unwrap_or_default()
}

/// Replace each `{name}` placeholder using `lookup`; `Err(name)` names the first missing value
pub fn substitute_path<F>(template: &str, lookup: F) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing = None;
    let substituted = PATH_PARAM.replace_all(template, |caps: &regex::Captures<'_>| {
        match lookup(&caps[1]) {
            Some(value) => url::form_urlencoded::byte_serialize(value.as_bytes())
                .collect::<String>()
                .replace('+', "%20"),
            None => {
                missing.get_or_insert_with(|| caps[1].to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(name),
        None => Ok(substituted.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_path_params() {
        assert!(extract_path_params("/user").is_empty());
        assert_eq!(extract_path_params("/user/{id}"), vec!["id"]);
        assert_eq!(
            extract_path_params("/inventory/{profileId}/item/{itemId}"),
            vec!["profileId", "itemId"]
        );
    }

    #[test]
    fn test_resource_name() {
        assert_eq!(resource_name("/helloworld"), "helloworld");
        assert_eq!(resource_name("/hello/world"), "hello/world");
        assert_eq!(resource_name("/application/{id}"), "application");
        assert_eq!(resource_name("/user/{id}/profile"), "user");
        assert_eq!(resource_name("/{id}/profile"), "profile");
        assert_eq!(resource_name("/{id}"), "");
        assert_eq!(resource_name("/"), "");
    }

    #[test]
    fn test_is_list_path() {
        assert!(is_list_path("/user"));
        assert!(is_list_path("/auth/oidc"));
        assert!(!is_list_path("/user/{id}"));
    }

    #[test]
    fn test_substitute_path() {
        let path = substitute_path("/user/{id}/profile/{name}", |name| match name {
            "id" => Some("42".to_string()),
            "name" => Some("a b/c".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(path, "/user/42/profile/a%20b%2Fc");

        let missing = substitute_path("/vault/{vaultId}/wallet/{walletId}", |name| {
            (name == "vaultId").then(|| "v1".to_string())
        });
        assert_eq!(missing, Err("walletId".to_string()));
    }
}
