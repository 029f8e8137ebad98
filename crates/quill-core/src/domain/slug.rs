/// Derive a URL slug from a title.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into a
/// single `-` and trims dashes from both ends.
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_slug() {
        assert_eq!(generate_slug("Hello, World!"), "hello-world");
        assert_eq!(generate_slug("  The Cost of Context-Switching  "), "the-cost-of-context-switching");
        assert_eq!(generate_slug("TalkLY 2.0 -- launch"), "talkly-2-0-launch");
        assert_eq!(generate_slug("Café au lait"), "caf-au-lait");
        assert_eq!(generate_slug("!!!"), "");
    }
}
