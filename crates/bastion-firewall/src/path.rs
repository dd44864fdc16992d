//! Path inspection and rewriting helpers.
//!
//! A firewall may rewrite the request path so that chain matching sees a
//! canonical form. The original URI is kept in a request extension and put
//! back by [`restore_original_uri`], which every [`Firewall::reset`]
//! implementation calls.
//!
//! [`Firewall::reset`]: crate::Firewall::reset

use bastion_core::Request;
use http::uri::{PathAndQuery, Uri};

/// Request extension holding the URI as it was before a firewall rewrite.
#[derive(Debug, Clone)]
struct OriginalUri(Uri);

/// Replaces the request path, remembering the original URI.
///
/// The query string is kept. A second rewrite keeps the first original.
/// Returns `false` and leaves the request untouched if `path` does not
/// form a valid URI.
pub fn rewrite_path(request: &mut Request, path: &str) -> bool {
    let uri = request.uri().clone();
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    let Ok(path_and_query) = PathAndQuery::try_from(path_and_query) else {
        return false;
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    let Ok(rewritten) = Uri::from_parts(parts) else {
        return false;
    };

    if request.extensions().get::<OriginalUri>().is_none() {
        request.extensions_mut().insert(OriginalUri(uri));
    }
    *request.uri_mut() = rewritten;
    true
}

/// Puts back the URI saved by [`rewrite_path`].
///
/// Returns `true` if a rewrite was undone.
pub fn restore_original_uri(request: &mut Request) -> bool {
    match request.extensions_mut().remove::<OriginalUri>() {
        Some(OriginalUri(uri)) => {
            *request.uri_mut() = uri;
            true
        }
        None => false,
    }
}

/// Returns true if the request path is currently rewritten.
pub fn is_rewritten(request: &Request) -> bool {
    request.extensions().get::<OriginalUri>().is_some()
}

/// Removes `;`-delimited path parameters from every segment.
///
/// `/a;jsessionid=1/b;v=2` becomes `/a/b`.
pub(crate) fn strip_path_parameters(path: &str) -> String {
    path.split('/')
        .map(|segment| segment.split(';').next().unwrap_or_default())
        .collect::<Vec<_>>()
        .join("/")
}

/// Returns true if no segment of `path` is `.` or `..`.
pub(crate) fn is_normalized(path: &str) -> bool {
    path.split('/').all(|segment| segment != "." && segment != "..")
}

/// Returns true if every byte is printable ASCII (`0x20..=0x7E`).
pub(crate) fn is_printable_ascii(value: &[u8]) -> bool {
    value.iter().all(|b| (0x20..=0x7E).contains(b))
}
