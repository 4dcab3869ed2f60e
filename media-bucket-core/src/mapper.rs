//! Source URL → bucket key mapping.
//!
//! Provider delivery URLs look like
//! `https://res.example.com/<cloud>/<type>/upload/v<version>/<folder>/<file>`.
//! By default the key is the part after `<type>/upload/v<version>/`, which mirrors the
//! folder layout seen in the media library. With `keep_structure` the whole path after
//! the host is kept instead.

use std::sync::LazyLock;

use regex::Regex;

use crate::contract::Mapping;

static UPLOAD_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:image|video|raw)/upload/v[0-9]+/").expect("upload segment pattern is valid")
});

/// Map one source URL to its target key.
///
/// A URL that yields no object path (no recognised `<type>/upload/v<n>/` segment, or
/// nothing after the host) keeps the full URL as key, so a key is never empty.
pub fn map_url(url: &str, keep_structure: bool, parent_path: Option<&str>) -> Mapping {
    let path = strip_query(url);

    let key = if keep_structure {
        path.splitn(4, '/').nth(3).unwrap_or_default()
    } else {
        UPLOAD_SEGMENT
            .find_iter(path)
            .last()
            .map(|m| &path[m.end()..])
            .unwrap_or_default()
    };
    let key = match key.trim_matches('/') {
        "" => {
            tracing::warn!(url = %url, "No object path in URL, using it whole as target key");
            path.to_string()
        }
        _ => key.to_string(),
    };

    let target_key = match parent_path.map(|p| p.trim_matches('/')) {
        Some(parent) if !parent.is_empty() => format!("{parent}/{key}"),
        _ => key,
    };

    Mapping {
        source_url: url.to_string(),
        target_key,
    }
}

/// Map every URL, keeping input order.
pub fn map_urls<I, S>(urls: I, keep_structure: bool, parent_path: Option<&str>) -> Vec<Mapping>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    urls.into_iter()
        .map(|url| map_url(url.as_ref(), keep_structure, parent_path))
        .collect()
}

fn strip_query(url: &str) -> &str {
    match url.find(|c: char| c == '?' || c == '#') {
        Some(idx) => &url[..idx],
        None => url,
    }
}
