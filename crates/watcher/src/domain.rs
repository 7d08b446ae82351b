use url::Url;

/// Extracts the normalized hostname from a tab URL: http(s) schemes only,
/// leading `www.` stripped. Anything else is untrackable.
pub fn normalize(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}
