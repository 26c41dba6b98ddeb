//! URL composition and normalization.
//!
//! # Design Decisions
//! - Only separator runs are collapsed; case and trailing slashes are kept,
//!   so lookups are exact on the normalized string
//! - The context path is removed only as a whole leading segment run

/// Collapses every run of `/` into a single `/`.
pub fn collapse_separators(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut previous_slash = false;
    for c in raw.chars() {
        if c == '/' {
            if !previous_slash {
                out.push(c);
            }
            previous_slash = true;
        } else {
            out.push(c);
            previous_slash = false;
        }
    }
    out
}

/// Route key for a method mapped at `path` under a component mapped at `base`.
pub fn compose(base: &str, path: &str) -> String {
    collapse_separators(&format!("/{base}/{path}"))
}

/// Normalizes an inbound request path: strips `context_path`, then collapses separators.
pub fn normalize_request_path(raw: &str, context_path: &str) -> String {
    let context = collapse_separators(context_path);
    let context = context.trim_end_matches('/');
    let raw = collapse_separators(raw);

    let stripped = if context.is_empty() {
        raw.as_str()
    } else {
        match raw.strip_prefix(context) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => raw.as_str(),
        }
    };

    if stripped.is_empty() {
        "/".to_string()
    } else if stripped.starts_with('/') {
        stripped.to_string()
    } else {
        format!("/{stripped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_collapses_separators() {
        assert_eq!(compose("/test/", "/get"), "/test/get");
        assert_eq!(compose("test", "get"), "/test/get");
        assert_eq!(compose("", "/get"), "/get");
        assert_eq!(compose("//a//", "//b//c"), "/a/b/c");
    }

    #[test]
    fn test_compose_keeps_trailing_slash() {
        assert_eq!(compose("/test", ""), "/test/");
        assert_eq!(compose("", ""), "/");
    }

    #[test]
    fn test_normalize_without_context() {
        assert_eq!(normalize_request_path("/test//get", ""), "/test/get");
        assert_eq!(normalize_request_path("", ""), "/");
        assert_eq!(normalize_request_path("///", "/"), "/");
    }

    #[test]
    fn test_normalize_strips_context_path() {
        assert_eq!(normalize_request_path("/app/test/get", "/app"), "/test/get");
        assert_eq!(normalize_request_path("/app//test/get", "/app/"), "/test/get");
        assert_eq!(normalize_request_path("/app", "/app"), "/");
    }

    #[test]
    fn test_context_prefix_must_be_whole_segment() {
        assert_eq!(normalize_request_path("/apple/get", "/app"), "/apple/get");
        assert_eq!(normalize_request_path("/test/get", "/app"), "/test/get");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = normalize_request_path("//app///test//get/", "/app");
        assert_eq!(normalize_request_path(&once, ""), once);
    }
}
