//! Host extraction from ERP URLs

/// Extract the bare host from a URL.
///
/// Strips the scheme, then anything from the first `/`, `?` or `#`, then the
/// port. The result keys the durable snapshot file and is the base for every
/// derived ERP endpoint.
///
/// ```
/// use consinco_domain::extract_domain;
///
/// assert_eq!(extract_domain("https://erp.example.com:8443/Login"), "erp.example.com");
/// assert_eq!(extract_domain("erp.example.com"), "erp.example.com");
/// ```
pub fn extract_domain(url: &str) -> String {
    let trimmed = url.trim();
    let without_scheme = trimmed.split_once("://").map_or(trimmed, |(_, rest)| rest);
    let authority =
        without_scheme.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let host = host.split(':').next().unwrap_or_default();
    host.to_string()
}
