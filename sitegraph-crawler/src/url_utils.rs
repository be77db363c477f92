use url::Url;

/// `0.0.0.0` and `localhost` serve the same site in local dev setups,
/// so both map to one identity for internal/external checks.
fn host_identity(host: &str) -> &str {
    if host == "0.0.0.0" { "localhost" } else { host }
}

/// Resolve `href` against `base` and canonicalize: drop the fragment,
/// collapse the trailing slash everywhere except the site root.
///
/// Returns `None` for unparseable input and for hrefs that can never be
/// crawled (empty, `javascript:`, `mailto:`, `tel:`, bare fragments).
/// Callers skip the link; normalization failure is never fatal.
pub fn normalize(href: &str, base: &Url) -> Option<Url> {
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    url.set_fragment(None);

    if url.path() != "/" && url.path().ends_with('/') {
        let trimmed = url.path().trim_end_matches('/').to_string();
        url.set_path(&trimmed);
    }

    Some(url)
}

/// Canonicalize an already-parsed URL with the same rules as [`normalize`].
pub fn canonicalize(url: &Url, base: &Url) -> Url {
    normalize(url.as_str(), base).unwrap_or_else(|| url.clone())
}

/// True iff `url` points at the same site as `base`: hostname (after
/// identity mapping) and explicit port both match. Scheme is ignored.
pub fn is_internal(url: &Url, base: &Url) -> bool {
    match (url.host_str(), base.host_str()) {
        (Some(a), Some(b)) => host_identity(a) == host_identity(b) && url.port() == base.port(),
        _ => false,
    }
}

/// Strip the base origin for report display: path + query + fragment when
/// the hostnames match, the full URL otherwise. Display only; graph keys
/// always use full canonical URLs.
pub fn strip_base(url: &Url, base: &Url) -> String {
    let same_host = match (url.host_str(), base.host_str()) {
        (Some(a), Some(b)) => host_identity(a) == host_identity(b),
        _ => false,
    };
    if !same_host {
        return url.to_string();
    }

    let mut out = url.path().to_string();
    if let Some(query) = url.query() {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        out.push('#');
        out.push_str(fragment);
    }
    out
}
