//! Markdown image reference scanner.

use pulldown_cmark::{Event, LinkType, Options, Parser, Tag};
use std::ops::Range;

/// Image reference found in markdown text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef<'a> {
    /// Alt text between the brackets
    pub alt: &'a str,
    /// Literal destination, without angle brackets or title
    pub token: &'a str,
    /// Byte range of `token` within the scanned text
    pub span: Range<usize>,
}

/// Finds inline image references, ordered by position.
///
/// The text is parsed as CommonMark with the GFM extensions the renderer
/// enables, so only images the renderer would draw are reported. Code
/// blocks in any container, inline code spans, and reference-style images
/// are not scanned.
///
/// ```
/// use gitdocs::scan_images;
///
/// let images = scan_images(r#"![logo](./img/logo.png "Logo")"#);
/// assert_eq!(images[0].alt, "logo");
/// assert_eq!(images[0].token, "./img/logo.png");
/// ```
pub fn scan_images(text: &str) -> Vec<ImageRef<'_>> {
    let mut images: Vec<ImageRef<'_>> = Parser::new_ext(text, parse_options())
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::Image {
                link_type: LinkType::Inline,
                dest_url,
                ..
            }) => image_at(text, range, &dest_url),
            _ => None,
        })
        .collect();

    // An image nested in alt text is reported after its parent
    images.sort_by_key(|image| image.span.start);
    images
}

fn parse_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

/// Locates the destination inside the source range of one parsed image.
fn image_at<'a>(text: &'a str, range: Range<usize>, dest_url: &str) -> Option<ImageRef<'a>> {
    let raw = text.get(range.clone())?;
    let (alt, dest) = split_image(raw)?;
    let token = &raw[dest.clone()];

    // Escapes and entities are decoded by the parser, not in the source
    if token != dest_url && !token.contains(['\\', '&']) {
        return None;
    }

    Some(ImageRef {
        alt: &raw[alt],
        token,
        span: range.start + dest.start..range.start + dest.end,
    })
}

/// Splits `![alt](dest "title")` into alt and destination ranges.
fn split_image(raw: &str) -> Option<(Range<usize>, Range<usize>)> {
    if !raw.starts_with("![") {
        return None;
    }

    let bytes = raw.as_bytes();
    let alt_start = 2;
    let alt_end = closing_bracket(bytes, alt_start)?;
    if bytes.get(alt_end + 1) != Some(&b'(') {
        return None;
    }

    let mut pos = alt_end + 2;
    while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
        pos += 1;
    }

    let dest = if bytes.get(pos) == Some(&b'<') {
        let start = pos + 1;
        let end = start + raw[start..].find(['>', '\n'])?;
        if bytes[end] != b'>' {
            return None;
        }
        start..end
    } else {
        let start = pos;
        let mut depth = 0usize;
        while pos < bytes.len() {
            match bytes[pos] {
                b'\\' => pos += 1,
                b'(' => depth += 1,
                b')' if depth == 0 => break,
                b')' => depth -= 1,
                b if b.is_ascii_whitespace() => break,
                _ => {}
            }
            pos += 1;
        }
        start..pos.min(bytes.len())
    };

    Some((alt_start..alt_end, dest))
}

/// Finds the `]` closing alt text, honoring nested brackets and code spans.
fn closing_bracket(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut pos = start;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 1,
            b'`' => {
                pos = skip_code_span(bytes, pos);
                continue;
            }
            b'[' => depth += 1,
            b']' if depth == 0 => return Some(pos),
            b']' => depth -= 1,
            _ => {}
        }
        pos += 1;
    }

    None
}

/// Skips an inline code span starting at `start`.
///
/// An unmatched backtick run is literal text.
fn skip_code_span(bytes: &[u8], start: usize) -> usize {
    let run = bytes[start..].iter().take_while(|&&b| b == b'`').count();
    let mut pos = start + run;

    while pos < bytes.len() {
        if bytes[pos] == b'`' {
            let close = bytes[pos..].iter().take_while(|&&b| b == b'`').count();
            if close == run {
                return pos + close;
            }
            pos += close;
        } else {
            pos += 1;
        }
    }

    start + run
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<&str> {
        scan_images(text).into_iter().map(|i| i.token).collect()
    }

    #[test]
    fn test_scan_basic_image() {
        // Arrange
        let text = "Intro\n\n![logo](./img/logo.png)\n";

        // Act
        let images = scan_images(text);

        // Assert
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].alt, "logo");
        assert_eq!(images[0].token, "./img/logo.png");
        assert_eq!(&text[images[0].span.clone()], "./img/logo.png");
    }

    #[test]
    fn test_scan_records_every_occurrence_in_order() {
        let text = "![a](x.png) text ![b](y.png)\n![c](x.png)";

        assert_eq!(tokens(text), vec!["x.png", "y.png", "x.png"]);
    }

    #[test]
    fn test_scan_title_is_not_part_of_token() {
        let text = r#"![shot](img/shot.png "Login screen") and ![s2](a.png 'single')"#;

        assert_eq!(tokens(text), vec!["img/shot.png", "a.png"]);
    }

    #[test]
    fn test_scan_angle_bracket_destination() {
        let text = "![x](<my images/shot one.png>)";

        let images = scan_images(text);

        assert_eq!(images[0].token, "my images/shot one.png");
        assert_eq!(&text[images[0].span.clone()], "my images/shot one.png");
    }

    #[test]
    fn test_scan_balanced_parentheses_in_destination() {
        assert_eq!(tokens("![x](img/chart(1).png)"), vec!["img/chart(1).png"]);
    }

    #[test]
    fn test_scan_empty_destination() {
        let images = scan_images("![nothing]()");

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].token, "");
    }

    #[test]
    fn test_scan_ignores_links_and_prose() {
        let text = "[link](a.png) and a.png and ! [x](b.png) and ![broken](c.png";

        assert!(tokens(text).is_empty());
    }

    #[test]
    fn test_scan_skips_fenced_code() {
        // Arrange
        let text = "![a](a.png)\n```markdown\n![b](b.png)\n```\n~~~~\n![c](c.png)\n~~~~\n![d](d.png)\n";

        // Act
        let found = tokens(text);

        // Assert
        assert_eq!(found, vec!["a.png", "d.png"]);
    }

    #[test]
    fn test_scan_fence_needs_matching_marker() {
        let text = "````\n```\n![b](b.png)\n````\n![a](a.png)";

        assert_eq!(tokens(text), vec!["a.png"]);
    }

    #[test]
    fn test_scan_skips_inline_code() {
        let text = "Use `![alt](path.png)` syntax, like ![real](real.png)";

        assert_eq!(tokens(text), vec!["real.png"]);
    }

    #[test]
    fn test_scan_escaped_bang() {
        assert!(tokens(r"\![x](a.png)").is_empty());
    }

    #[test]
    fn test_scan_spans_with_multibyte_text() {
        // Arrange
        let text = "概要 ![構成図](./図/構成.png) 終わり";

        // Act
        let images = scan_images(text);

        // Assert
        assert_eq!(images[0].alt, "構成図");
        assert_eq!(&text[images[0].span.clone()], "./図/構成.png");
    }

    #[test]
    fn test_scan_data_uri_token() {
        assert_eq!(
            tokens("![d](data:image/png;base64,AAAA)"),
            vec!["data:image/png;base64,AAAA"]
        );
    }

    #[test]
    fn test_scan_skips_indented_code() {
        let text = "Example:\n\n    ![x](a.png)\n\n![y](b.png)\n";

        assert_eq!(tokens(text), vec!["b.png"]);
    }

    #[test]
    fn test_scan_skips_fence_in_list_item() {
        let text = "1. Step\n\n    ```md\n    ![x](a.png)\n    ```\n";

        assert!(tokens(text).is_empty());
    }

    #[test]
    fn test_scan_skips_fence_in_blockquote() {
        let text = "> ```md\n> ![x](a.png)\n> ```\n";

        assert!(tokens(text).is_empty());
    }

    #[test]
    fn test_scan_image_in_blockquote() {
        // Arrange
        let text = "> Figure:\n> ![chart](img/chart.png)\n";

        // Act
        let images = scan_images(text);

        // Assert
        assert_eq!(images.len(), 1);
        assert_eq!(&text[images[0].span.clone()], "img/chart.png");
    }

    #[test]
    fn test_scan_brackets_in_alt_text() {
        // Arrange
        let text = "![see [fig]](a.png)";

        // Act
        let images = scan_images(text);

        // Assert
        assert_eq!(images[0].alt, "see [fig]");
        assert_eq!(images[0].token, "a.png");
        assert_eq!(&text[images[0].span.clone()], "a.png");
    }

    #[test]
    fn test_scan_nested_image_ordered_by_position() {
        let text = "![outer ![inner](b.png)](a.png)";

        assert_eq!(tokens(text), vec!["b.png", "a.png"]);
    }

    #[test]
    fn test_scan_skips_reference_images() {
        let text = "![logo][brand]\n\n[brand]: logo.png\n";

        assert!(tokens(text).is_empty());
    }
}
