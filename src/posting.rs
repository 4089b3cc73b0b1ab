//! Posted-article header inspection
//!
//! `POST` only needs one thing out of the accumulated lines before handing
//! them to a backend: the `Newsgroups:` header, to resolve a target. Full
//! RFC 5536 validation of the rest is out of scope — the backend is the
//! final arbiter of what it accepts.

/// Extract the first `Newsgroups:` header value from a raw article, split
/// on commas and trimmed. Returns an empty vector if the header is absent
/// or empty.
pub fn target_groups(raw: &str) -> Vec<String> {
    let header_block = raw.split("\r\n\r\n").next().unwrap_or(raw);
    for line in header_block.lines() {
        if let Some((name, value)) = line.split_once(':')
            && name.trim().eq_ignore_ascii_case("newsgroups")
        {
            return value.split(',').map(|g| g.trim().to_string()).filter(|g| !g.is_empty()).collect();
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_single_group() {
        let raw = "Subject: hi\r\nNewsgroups: papercut.test\r\n\r\nbody\r\n";
        assert_eq!(target_groups(raw), vec!["papercut.test"]);
    }

    #[test]
    fn extracts_multiple_groups() {
        let raw = "Newsgroups: papercut.test, papercut.other\r\n\r\nbody\r\n";
        assert_eq!(target_groups(raw), vec!["papercut.test", "papercut.other"]);
    }

    #[test]
    fn missing_header_yields_empty() {
        let raw = "Subject: hi\r\n\r\nbody\r\n";
        assert!(target_groups(raw).is_empty());
    }
}
