/// Root of the platform's REST API.
pub const API_ROOT: &str = "https://api.tumblr.com";
/// REST API version segment.
pub const API_VERSION: &str = "v2";

/// Normalizes a blog identifier to the bare host used in API paths:
/// trailing slashes and any `scheme://` prefix are removed.
pub fn normalize_blog_url(blog_url: &str) -> &str {
    let trimmed = blog_url.trim_end_matches('/');
    match trimmed.find("://") {
        Some(idx) => &trimmed[idx + 3..],
        None => trimmed,
    }
}

/// Composes `{root}/{version}/[blog/{blog}/]{endpoint}[/{segments...}]`.
pub fn build_url<S: AsRef<str>>(
    base_root: &str,
    version: &str,
    endpoint: &str,
    blog_url: Option<&str>,
    extra_segments: &[S],
) -> String {
    let mut url = format!("{}/{}/", base_root.trim_end_matches('/'), version);
    if let Some(blog_url) = blog_url {
        url.push_str("blog/");
        url.push_str(normalize_blog_url(blog_url));
        url.push('/');
    }
    url.push_str(endpoint.trim_start_matches('/'));
    if !extra_segments.is_empty() {
        let joined = extra_segments
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join("/");
        url.push('/');
        url.push_str(&joined);
    }
    url
}
