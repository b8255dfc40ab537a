// src/extract/anchor.rs
// =============================================================================
// Rules for turning an anchor tag into a link.
//
// 1. Only `<a>` start tags are considered
// 2. Among the tag's attributes, the last `href` wins
// 3. The value is kept only if it starts with "https"
//
// No resolution or cleanup is applied to the value: relative links and
// plain http links are simply skipped.
//
// html5ever keeps only the first of two same-named attributes, so rule 2 needs
// the tag's source text: `raw_href_attrs` finds every href in it.
// =============================================================================

// Returns the value of the last `href` in an attribute sequence
//
// Parameters:
//   attrs: (name, value) pairs in the order the tokenizer produced them
//
// Example:
//   [("class", "nav"), ("href", "/a"), ("href", "https://b")] -> Some("https://b")
pub fn last_href<'a, I>(attrs: I) -> Option<&'a str>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    attrs
        .into_iter()
        .filter(|(name, _)| *name == "href")
        .last()
        .map(|(_, value)| value)
}

// Checks whether an href counts as a secure link
//
// This is a plain prefix test, not a scheme parse, so "httpsomething" also
// passes. Kept as-is to match the established output of the tool.
pub fn is_secure_link(href: &str) -> bool {
    href.starts_with("https")
}

// Finds every `href` attribute of the first tag in `text`
//
// Parameters:
//   text: markup starting at or before the tag, e.g. `x <a id=1 href=a HREF='b'>`
//
// Returns: the raw `name=value` slices (quotes included), in source order, or
// None if the first tag is not an anchor.
//
// Boundaries follow the HTML tokenizer: a tag opens at `<` plus a letter,
// names end at whitespace, `/`, `>` or `=`, values are quoted or run to
// whitespace or `>`.
pub fn raw_href_attrs(text: &str) -> Option<Vec<&str>> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let is_space = |b: u8| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C');

    let start = bytes
        .windows(2)
        .position(|w| w[0] == b'<' && w[1].is_ascii_alphabetic())?;

    let mut i = start + 1;
    while i < len && !is_space(bytes[i]) && bytes[i] != b'/' && bytes[i] != b'>' {
        i += 1;
    }
    if !text[start + 1..i].eq_ignore_ascii_case("a") {
        return None;
    }

    let mut hrefs = Vec::new();
    loop {
        while i < len && (is_space(bytes[i]) || bytes[i] == b'/') {
            i += 1;
        }
        if i >= len || bytes[i] == b'>' {
            break;
        }

        // The first character of a name may be '='.
        let attr_start = i;
        i += 1;
        while i < len && !is_space(bytes[i]) && !matches!(bytes[i], b'/' | b'>' | b'=') {
            i += 1;
        }
        let name = &text[attr_start..i];

        let mut j = i;
        while j < len && is_space(bytes[j]) {
            j += 1;
        }
        if j < len && bytes[j] == b'=' {
            j += 1;
            while j < len && is_space(bytes[j]) {
                j += 1;
            }
            match bytes.get(j) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    j += 1;
                    while j < len && bytes[j] != quote {
                        j += 1;
                    }
                    j = (j + 1).min(len);
                }
                _ => {
                    while j < len && !is_space(bytes[j]) && bytes[j] != b'>' {
                        j += 1;
                    }
                }
            }
            i = j;
        }

        if name.eq_ignore_ascii_case("href") {
            hrefs.push(&text[attr_start..i]);
        }
    }

    Some(hrefs)
}
