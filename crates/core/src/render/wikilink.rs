//! Wiki-link rewriting over transpiled HTML.
//!
//! Recognizes `[[target]]` and `[[target|title]]` tokens, replaces them with
//! `<a href="/target">title</a>` anchors and records each `/target` in order
//! of appearance. A `!` directly before a token escapes it: the `!` is
//! dropped and the token is kept as literal text.
//!
//! Matching is leftmost and non-overlapping. `target` is one or more bytes
//! other than `|` and `]`; `title` is one or more bytes other than `]`. Both
//! delimiters are ASCII, so byte offsets always fall on char boundaries.

/// Output of a wiki-link pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLinks {
    /// Input with every unescaped token rewritten to an anchor.
    pub html: String,
    /// `"/" + target` for each rewritten token, duplicates kept.
    pub links: Vec<String>,
}

/// A matched token, as byte ranges into the scanned input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token {
    start: usize,
    end: usize,
    target: (usize, usize),
    title: Option<(usize, usize)>,
}

/// Outcome of trying to match a token at one `[[` position.
enum Attempt {
    Matched(Token),
    /// No token starts anywhere before this offset.
    Resume(usize),
}

/// Byte scanner that yields tokens left to right.
struct Scanner<'a> {
    s: &'a [u8],
    i: usize,
}

impl<'a> Scanner<'a> {
    fn new(s: &'a str) -> Self {
        Self { s: s.as_bytes(), i: 0 }
    }

    /// Index just past the run of bytes starting at `from` that are not in `stops`.
    fn run_end(&self, from: usize, stops: &[u8]) -> usize {
        self.s[from..]
            .iter()
            .position(|b| stops.contains(b))
            .map_or(self.s.len(), |n| from + n)
    }

    fn closes_at(&self, at: usize) -> bool {
        self.s[at..].starts_with(b"]]")
    }

    /// Try to match a token whose `[[` sits at `start`.
    ///
    /// On failure every start before the returned offset is known to fail
    /// the same way, since it would share the target run (or, past a `|`,
    /// the title run) and the same missing `]]`.
    fn attempt(&self, start: usize) -> Attempt {
        let target_start = start + 2;
        let target_end = self.run_end(target_start, b"|]");
        if target_end == target_start {
            return Attempt::Resume(target_end + 1);
        }

        if self.closes_at(target_end) {
            return Attempt::Matched(Token {
                start,
                end: target_end + 2,
                target: (target_start, target_end),
                title: None,
            });
        }

        if self.s.get(target_end) == Some(&b'|') {
            let title_start = target_end + 1;
            let title_end = self.run_end(title_start, b"]");
            if title_end > title_start {
                if self.closes_at(title_end) {
                    return Attempt::Matched(Token {
                        start,
                        end: title_end + 2,
                        target: (target_start, target_end),
                        title: Some((title_start, title_end)),
                    });
                }
                return Attempt::Resume(title_end);
            }
        }

        Attempt::Resume(target_end + 1)
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        while self.i + 1 < self.s.len() {
            let rel = self.s[self.i..].windows(2).position(|w| w == b"[[")?;
            let start = self.i + rel;
            match self.attempt(start) {
                Attempt::Matched(token) => {
                    self.i = token.end;
                    return Some(token);
                }
                Attempt::Resume(next) => self.i = next.max(start + 1),
            }
        }
        None
    }
}

/// Rewrite wiki-link tokens in `html` into anchors and collect their targets.
///
/// Never fails: text that does not form a complete token, such as `[[a` or
/// `[[a|]]`, passes through unchanged.
pub fn parse_wikilinks(html: &str) -> ParsedLinks {
    let mut out = String::with_capacity(html.len() + 250);
    let mut links = Vec::new();
    let mut copied = 0;

    for token in Scanner::new(html) {
        let escaped = token.start > 0 && html.as_bytes()[token.start - 1] == b'!';
        if escaped {
            out.push_str(&html[copied..token.start - 1]);
            out.push_str(&html[token.start..token.end]);
            copied = token.end;
            continue;
        }

        let target = &html[token.target.0..token.target.1];
        let title = token.title.map_or(target, |(a, b)| &html[a..b]);

        out.push_str(&html[copied..token.start]);
        out.push_str("<a href=\"/");
        out.push_str(target);
        out.push_str("\">");
        out.push_str(title);
        out.push_str("</a>");
        links.push(format!("/{target}"));
        copied = token.end;
    }

    out.push_str(&html[copied..]);
    ParsedLinks { html: out, links }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> (String, Vec<String>) {
        let parsed = parse_wikilinks(s);
        (parsed.html, parsed.links)
    }

    fn links(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_text_without_tokens_is_unchanged() {
        for input in ["", "plain", "<p>a [b] c</p>", "]] [ ] ! |", "[x]]"] {
            assert_eq!(parse(input), (input.to_string(), vec![]));
        }
    }

    #[test]
    fn test_simple_link() {
        assert_eq!(parse("x [[A]] y"), ("x <a href=\"/A\">A</a> y".to_string(), links(&["/A"])));
    }

    #[test]
    fn test_link_with_title() {
        assert_eq!(parse("[[A|B]]"), ("<a href=\"/A\">B</a>".to_string(), links(&["/A"])));
    }

    #[test]
    fn test_escaped_link() {
        assert_eq!(parse("![[A]]"), ("[[A]]".to_string(), vec![]));
        assert_eq!(parse("see ![[A|b]] here"), ("see [[A|b]] here".to_string(), vec![]));
    }

    #[test]
    fn test_multiple_links_keep_order() {
        assert_eq!(
            parse("[[A]] and [[B|C]]"),
            ("<a href=\"/A\">A</a> and <a href=\"/B\">C</a>".to_string(), links(&["/A", "/B"]))
        );
    }

    #[test]
    fn test_duplicates_are_kept() {
        let (_, found) = parse("[[A]] [[B]] [[A]]");
        assert_eq!(found, links(&["/A", "/B", "/A"]));
    }

    #[test]
    fn test_adjacent_tokens() {
        assert_eq!(
            parse("[[A]][[B]]"),
            ("<a href=\"/A\">A</a><a href=\"/B\">B</a>".to_string(), links(&["/A", "/B"]))
        );
    }

    #[test]
    fn test_escape_only_affects_its_token() {
        assert_eq!(
            parse("![[A]] [[B]]"),
            ("[[A]] <a href=\"/B\">B</a>".to_string(), links(&["/B"]))
        );
    }

    #[test]
    fn test_bang_not_immediately_before_is_kept() {
        assert_eq!(parse("! [[A]]"), ("! <a href=\"/A\">A</a>".to_string(), links(&["/A"])));
    }

    #[test]
    fn test_unterminated_tokens_pass_through() {
        for input in ["[[A", "[[A]", "[[A|B", "[[A|B]", "[[]]", "[[|B]]", "[[A|]]", "[[A|B]x]]"] {
            assert_eq!(parse(input), (input.to_string(), vec![]), "input {input:?}");
        }
    }

    #[test]
    fn test_pipe_without_title_does_not_fall_back() {
        assert_eq!(parse("[[A|]] [[B]]"), ("[[A|]] <a href=\"/B\">B</a>".to_string(), links(&["/B"])));
    }

    #[test]
    fn test_leading_bracket_belongs_to_target() {
        assert_eq!(parse("[[[A]]"), ("<a href=\"/[A\">[A</a>".to_string(), links(&["/[A"])));
    }

    #[test]
    fn test_title_may_contain_pipes_and_brackets() {
        assert_eq!(parse("[[A|b|c[d]]"), ("<a href=\"/A\">b|c[d</a>".to_string(), links(&["/A"])));
    }

    #[test]
    fn test_title_swallows_nested_open_brackets() {
        assert_eq!(parse("[[A|x [[B]] y"), ("<a href=\"/A\">x [[B</a> y".to_string(), links(&["/A"])));
    }

    #[test]
    fn test_token_after_failed_target_is_found() {
        assert_eq!(parse("[[A] [[B]]"), ("[[A] <a href=\"/B\">B</a>".to_string(), links(&["/B"])));
    }

    #[test]
    fn test_failed_title_then_later_token() {
        assert_eq!(
            parse("[[A|x]y [[C]]"),
            ("[[A|x]y <a href=\"/C\">C</a>".to_string(), links(&["/C"]))
        );
    }

    #[test]
    fn test_target_spans_lines() {
        assert_eq!(parse("[[a\nb]]"), ("<a href=\"/a\nb\">a\nb</a>".to_string(), links(&["/a\nb"])));
    }

    #[test]
    fn test_non_ascii_target() {
        assert_eq!(
            parse("→[[Zürich|城市]]←"),
            ("→<a href=\"/Zürich\">城市</a>←".to_string(), links(&["/Zürich"]))
        );
    }

    #[test]
    fn test_no_html_escaping_is_applied() {
        assert_eq!(
            parse("[[a&amp;b|<em>t</em>]]"),
            ("<a href=\"/a&amp;b\"><em>t</em></a>".to_string(), links(&["/a&amp;b"]))
        );
    }

    #[test]
    fn test_reparse_only_touches_remaining_tokens() {
        let (once, _) = parse("x [[A]] ![[B]] [[C|d]]");
        let (twice, again) = parse(&once);
        assert_eq!(twice, "x <a href=\"/A\">A</a> <a href=\"/B\">B</a> <a href=\"/C\">d</a>");
        assert_eq!(again, links(&["/B"]));

        let plain = "no tokens [here] at all";
        let (first, _) = parse(plain);
        let (second, _) = parse(&first);
        assert_eq!(second, plain);
    }

    #[test]
    fn test_long_unterminated_runs() {
        let input = "[[a|".repeat(2_000);
        assert_eq!(parse(&input), (input.clone(), vec![]));

        let brackets = "[".repeat(5_000);
        assert_eq!(parse(&brackets), (brackets.clone(), vec![]));
    }
}
