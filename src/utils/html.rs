/// Clean HTML content using the ammonia library.
///
/// Whitelist-based sanitization: safe tags are preserved while dangerous tags
/// (<script>, <iframe>) and attributes (onclick) are stripped. Applied to
/// guide-published titles and descriptions before they are stored, as a
/// fail-safe against stored XSS on the public homepage.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
