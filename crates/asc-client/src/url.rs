//! URL construction helpers.
//!
//! Pure functions for turning resource paths and pagination links into
//! absolute URLs against the configured service root.

use url::Url;

use crate::error::ClientResult;

/// Largest page size the service accepts.
pub const MAX_PAGE_LIMIT: u32 = 200;

/// Resolve a resource path such as `v1/apps?filter[platform]=IOS`.
///
/// Absolute URLs are returned unchanged; relative paths are appended to the
/// base URL's path, keeping any query string.
pub fn build_resource_url(base: &Url, path: &str) -> ClientResult<Url> {
    if let Ok(url) = Url::parse(path) {
        return Ok(url);
    }

    let (path, query) = path.split_once('?').map_or((path, None), |(p, q)| (p, Some(q)));

    let mut url = base.clone();
    let base_path = url.path().trim_end_matches('/');
    url.set_path(&format!("{base_path}/{}", path.trim_start_matches('/')));
    url.set_query(query);

    Ok(url)
}

/// Add a `limit` query parameter clamped to `1..=MAX_PAGE_LIMIT`.
///
/// An existing `limit` parameter is replaced.
pub fn with_limit(url: &Url, limit: u32) -> Url {
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "limit")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = url.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair("limit", &limit.clamp(1, MAX_PAGE_LIMIT).to_string());
    url
}

/// Resolve a `links.next` value, which may be absolute or relative.
pub fn resolve_next_link(base: &Url, link: &str) -> ClientResult<Url> {
    match Url::parse(link) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(base.join(link)?),
        Err(e) => Err(e.into()),
    }
}

/// URL of a single build run.
pub fn build_run_url(base: &Url, id: &str) -> ClientResult<Url> {
    build_resource_url(base, &format!("v1/ciBuildRuns/{}", urlencoding_segment(id)))
}

fn urlencoding_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}
