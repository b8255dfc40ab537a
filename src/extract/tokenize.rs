// src/extract/tokenize.rs
// =============================================================================
// This module finds links in an HTML body while it is still arriving.
//
// We use html5ever's tokenizer directly (without building a DOM):
// - Each decoded chunk is pushed into a BufferQueue and fed to the tokenizer
// - The tokenizer calls our TokenSink once per token, in document order
// - The sink reports each anchor; the extractor picks its href and keeps it
//   until the caller drains the links
//
// A chunk may end in the middle of a tag; the tokenizer keeps its state and
// finishes the tag when the next chunk arrives.
// =============================================================================

use encoding_rs::Encoding;
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
    TokenizerResult,
};
use tracing::trace;

use super::anchor::{is_secure_link, last_href, raw_href_attrs};
use super::decode::ChunkDecoder;
use super::DiscoveredLink;

// An `<a>` start tag as html5ever reported it
struct AnchorTag {
    href: Option<String>,
}

// Receives tokens from the tokenizer
#[derive(Default)]
struct AnchorSink {
    anchor: Option<AnchorTag>,
    // A tag, comment or doctype finished during the last feed
    markup_ended: bool,
    parse_errors: usize,
}

impl AnchorSink {
    fn start_tag(&mut self, tag: &Tag) -> TokenSinkResult<()> {
        let name: &str = &tag.name;

        if name == "a" {
            let attrs = tag.attrs.iter().map(|attr| (&*attr.name.local, &*attr.value));
            self.anchor = Some(AnchorTag {
                href: last_href(attrs).map(str::to_string),
            });
        }

        // The tokenizer does not know which elements hold raw text; that is
        // normally the tree builder's job. Switch states here so markup inside
        // <script> and friends is not mistaken for anchors.
        match name {
            "script" => TokenSinkResult::RawData(RawKind::ScriptData),
            "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
                TokenSinkResult::RawData(RawKind::Rawtext)
            }
            "title" | "textarea" => TokenSinkResult::RawData(RawKind::Rcdata),
            "plaintext" => TokenSinkResult::Plaintext,
            _ => TokenSinkResult::Continue,
        }
    }
}

impl TokenSink for AnchorSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => {
                self.markup_ended = true;
                if tag.kind == TagKind::StartTag {
                    self.start_tag(&tag)
                } else {
                    TokenSinkResult::Continue
                }
            }
            Token::CommentToken(_) | Token::DoctypeToken(_) => {
                self.markup_ended = true;
                TokenSinkResult::Continue
            }
            Token::ParseError(message) => {
                // Recoverable: the tokenizer has already picked a way forward.
                self.parse_errors += 1;
                trace!(line = line_number, %message, "html parse error");
                TokenSinkResult::Continue
            }
            _ => TokenSinkResult::Continue,
        }
    }
}

// Runs the tokenizer until `input` is drained
fn drive(tokenizer: &mut Tokenizer<AnchorSink>, input: &mut BufferQueue) {
    match tokenizer.feed(input) {
        TokenizerResult::Done => {}
        TokenizerResult::Script(()) => {
            debug_assert!(false, "AnchorSink never hands out script handles")
        }
    }
}

// Tokenizes a lone `<a {raw_attr}>` so the value gets html5ever's handling of
// quotes and character references
fn tokenize_href(raw_attr: &str) -> Option<String> {
    let mut tokenizer = Tokenizer::new(AnchorSink::default(), TokenizerOpts::default());
    let mut input = BufferQueue::new();
    input.push_back(StrTendril::from(format!("<a {raw_attr}>")));
    drive(&mut tokenizer, &mut input);
    tokenizer.end();

    tokenizer.sink.anchor.take().and_then(|anchor| anchor.href)
}

/// Streaming link extractor for one document.
///
/// Feed it body chunks with [`LinkExtractor::feed`] and call
/// [`LinkExtractor::finish`] once the body has ended (normally or not).
///
/// Text is handed to the tokenizer in pieces that each end at a `>`, so an
/// anchor tag always ends exactly where a piece ends. `tail` holds the source
/// text since the last finished tag, comment or doctype; when an anchor comes
/// out, its source is in there and every `href` can be read back, duplicates
/// included.
pub struct LinkExtractor {
    decoder: ChunkDecoder,
    tokenizer: Tokenizer<AnchorSink>,
    input: BufferQueue,
    tail: String,
    found: Vec<DiscoveredLink>,
}

impl LinkExtractor {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            decoder: ChunkDecoder::new(encoding),
            tokenizer: Tokenizer::new(AnchorSink::default(), TokenizerOpts::default()),
            input: BufferQueue::new(),
            tail: String::new(),
            found: Vec::new(),
        }
    }

    /// Tokenizes one more chunk and returns the links completed by it.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<DiscoveredLink> {
        let text = self.decoder.decode(bytes, false);
        self.push_text(&text);
        std::mem::take(&mut self.found)
    }

    /// Flushes the tokenizer and returns any links still pending, along with
    /// the number of parse errors it recovered from over the whole document.
    pub fn finish(mut self) -> (Vec<DiscoveredLink>, usize) {
        let text = self.decoder.decode(&[], true);
        self.push_text(&text);
        self.tokenizer.end();
        self.collect();

        (self.found, self.tokenizer.sink.parse_errors)
    }

    fn push_text(&mut self, text: &str) {
        for piece in text.split_inclusive('>') {
            self.tail.push_str(piece);
            self.input.push_back(StrTendril::from_slice(piece));
            drive(&mut self.tokenizer, &mut self.input);
            self.collect();
        }
    }

    // Turns an anchor reported by the last feed into a link
    fn collect(&mut self) {
        if let Some(anchor) = self.tokenizer.sink.anchor.take() {
            let href = match raw_href_attrs(&self.tail) {
                // html5ever kept the first of these; the last one wins.
                Some(raw) if raw.len() > 1 => {
                    raw.last().copied().and_then(tokenize_href).or(anchor.href)
                }
                _ => anchor.href,
            };
            if let Some(href) = href.filter(|href| is_secure_link(href)) {
                self.found.push(DiscoveredLink::new(href));
            }
        }

        if std::mem::take(&mut self.tokenizer.sink.markup_ended) || !self.tail.contains('<') {
            self.tail.clear();
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Tokenizer vs parser
//    - A tokenizer only splits text into tags, text, comments...
//    - A parser (like scraper's Html::parse_document) also builds a tree
//    - We only need start tags, so the tokenizer alone is enough and nothing
//      has to be kept in memory after a tag is processed
//
// 2. What is a TokenSink?
//    - A trait html5ever calls back with every token it produces
//    - The return value can switch the tokenizer into another state, which is
//      how we handle <script> and <style>
//
// 3. What is std::mem::take?
//    - Replaces a value with its Default and gives you the old one
//    - Here it hands out the found links and resets the sink's flag in one step
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;

    // Runs a document through the extractor, one chunk at a time
    fn extract_chunks(chunks: &[&[u8]]) -> Vec<String> {
        let mut extractor = LinkExtractor::new(UTF_8);
        let mut links = Vec::new();
        for chunk in chunks {
            links.extend(extractor.feed(chunk));
        }
        let (rest, _) = extractor.finish();
        links.extend(rest);
        links.into_iter().map(DiscoveredLink::into_inner).collect()
    }

    fn extract(html: &str) -> Vec<String> {
        extract_chunks(&[html.as_bytes()])
    }

    #[test]
    fn test_extract_https_anchor() {
        let html = r#"<p>See <a href="https://x.example/page">this</a></p>"#;
        assert_eq!(extract(html), vec!["https://x.example/page"]);
    }

    #[test]
    fn test_prefix_match_edge_case() {
        let html = r#"
            <a href="httpsomething">odd</a>
            <a href="http://example.com">plain</a>
            <a href="/relative">relative</a>
        "#;
        assert_eq!(extract(html), vec!["httpsomething"]);
    }

    #[test]
    fn test_only_anchor_tags() {
        let html = r#"
            <link href="https://cdn.example/style.css">
            <area href="https://map.example/">
            <a href="https://keep.example/">keep</a>
        "#;
        assert_eq!(extract(html), vec!["https://keep.example/"]);
    }

    #[test]
    fn test_no_dedup_within_document() {
        let html = r#"<a href="https://a.example">1</a><a href="https://a.example">2</a>"#;
        assert_eq!(extract(html).len(), 2);
    }

    #[test]
    fn test_case_insensitive_names() {
        let html = r#"<A HREF="https://upper.example">x</A>"#;
        assert_eq!(extract(html), vec!["https://upper.example"]);
    }

    #[test]
    fn test_anchor_without_href() {
        let html = r#"<a name="top">top</a><a id="x" class="y">none</a>"#;
        assert!(extract(html).is_empty());
    }

    #[test]
    fn test_tag_split_across_chunks() {
        let chunks: [&[u8]; 3] = [
            b"<div><a hr",
            b"ef=\"https://split.exa",
            b"mple/\">x</a></div>",
        ];
        assert_eq!(extract_chunks(&chunks), vec!["https://split.example/"]);
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        let html = r#"<a href="https://café.example/">x</a>"#.as_bytes();
        let cut = html.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let (head, tail) = html.split_at(cut);
        assert_eq!(extract_chunks(&[head, tail]), vec!["https://café.example/"]);
    }

    #[test]
    fn test_links_arrive_per_chunk() {
        let mut extractor = LinkExtractor::new(UTF_8);
        let first = extractor.feed(br#"<a href="https://one.example">1</a>"#);
        assert_eq!(first, vec![DiscoveredLink::new("https://one.example")]);

        let second = extractor.feed(br#"<a href="https://two.example">2</a>"#);
        assert_eq!(second, vec![DiscoveredLink::new("https://two.example")]);
    }

    #[test]
    fn test_script_content_is_not_markup() {
        let html = r#"
            <script>document.write('<a href="https://hidden.example">x</a>');</script>
            <a href="https://visible.example">y</a>
        "#;
        assert_eq!(extract(html), vec!["https://visible.example"]);
    }

    #[test]
    fn test_malformed_markup_keeps_going() {
        // Duplicate attribute and an end tag with attributes: both are parse
        // errors the tokenizer recovers from.
        let html = r#"<a href="https://one.example" href="https://dup.example">1</a>
            </p id="x"> <a href='https://two.example'>2</a>"#;
        let mut extractor = LinkExtractor::new(UTF_8);
        let mut links = extractor.feed(html.as_bytes());
        let (rest, errors) = extractor.finish();
        links.extend(rest);

        assert!(errors > 0);
        assert_eq!(
            links,
            vec![
                DiscoveredLink::new("https://dup.example"),
                DiscoveredLink::new("https://two.example"),
            ]
        );
    }

    #[test]
    fn test_unclosed_tag_at_end_of_body() {
        assert!(extract(r#"<a href="https://cut.example"#).is_empty());
    }

    #[test]
    fn test_duplicate_href_last_wins() {
        let html = r#"<a href="https://first.example" href="https://last.example">x</a>"#;
        assert_eq!(extract(html), vec!["https://last.example"]);
    }

    #[test]
    fn test_duplicate_href_last_not_secure() {
        let html = r#"<a href="https://first.example" href="/local">x</a>"#;
        assert!(extract(html).is_empty());
    }

    #[test]
    fn test_duplicate_href_value_is_unescaped() {
        let html = r#"<p>intro</p> <A HREF=/x class=c href='https://b.example/?a=1&amp;b=2'>x</A>"#;
        assert_eq!(extract(html), vec!["https://b.example/?a=1&b=2"]);
    }

    #[test]
    fn test_duplicate_href_split_across_chunks() {
        let chunks: [&[u8]; 4] = [
            b"<!-- nav --><a href=\"https://first.ex",
            b"ample\" title=\"a > b\" hr",
            b"ef=\"https://last.example\">x</a>",
            b"<a href=\"https://next.example\">y</a>",
        ];
        assert_eq!(
            extract_chunks(&chunks),
            vec!["https://last.example", "https://next.example"]
        );
    }

    #[test]
    fn test_duplicate_href_inside_script_ignored() {
        let html = r#"<script>var s = '<a href="https://a.example" href="https://b.example">';</script>
            <a href="https://c.example">c</a>"#;
        assert_eq!(extract(html), vec!["https://c.example"]);
    }
}
