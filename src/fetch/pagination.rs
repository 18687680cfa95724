use reqwest::header::{HeaderMap, LINK};

/// Returns the `rel="next"` target of an RFC 8288 `Link` header, if any.
///
/// Canvas paginates list endpoints this way:
/// `<https://host/api/v1/...&page=2>; rel="next", <...&page=1>; rel="first"`
pub fn next_link(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(parse_next)
}

fn parse_next(entry: &str) -> Option<String> {
    let (target, params) = entry.trim().split_once(';')?;
    let url = target.trim().strip_prefix('<')?.strip_suffix('>')?;

    let is_next = params.split(';').any(|param| {
        param
            .trim()
            .strip_prefix("rel=")
            .map(|rel| rel.trim_matches('"').split_whitespace().any(|r| r == "next"))
            .unwrap_or(false)
    });

    is_next.then(|| url.to_string())
}
