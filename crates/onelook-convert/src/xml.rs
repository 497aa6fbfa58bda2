//! Hand-written XML output.

pub(crate) fn escape_xml_into(out: &mut String, text: &str) {
    escape_into(out, text, false);
}

/// Like [`escape_xml_into`], but also writes tabs and line breaks as character references.
/// Parsers normalise literal whitespace in attribute values to spaces; references survive.
pub(crate) fn escape_xml_attr_into(out: &mut String, text: &str) {
    escape_into(out, text, true);
}

fn escape_into(out: &mut String, text: &str, attr: bool) {
    let mut start = 0usize;
    for (i, &b) in text.as_bytes().iter().enumerate() {
        let esc = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&apos;",
            b'\n' if attr => "&#10;",
            b'\r' if attr => "&#13;",
            b'\t' if attr => "&#9;",
            _ => continue,
        };
        out.push_str(&text[start..i]);
        out.push_str(esc);
        start = i + 1;
    }
    out.push_str(&text[start..]);
}

pub(crate) fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

/// Writes ` name="value"` with the value escaped.
pub(crate) fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    escape_xml_attr_into(out, value);
    out.push('"');
}

/// Writes `<tag>text</tag>` on its own indented line.
pub(crate) fn push_text_element(out: &mut String, level: usize, tag: &str, text: &str) {
    push_indent(out, level);
    out.push('<');
    out.push_str(tag);
    out.push('>');
    escape_xml_into(out, text);
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        let mut out = String::new();
        escape_xml_into(&mut out, r#"a & <b> "c" 'd' é"#);
        assert_eq!(out, "a &amp; &lt;b&gt; &quot;c&quot; &apos;d&apos; é");
    }

    #[test]
    fn attributes_are_quoted() {
        let mut out = String::from("<x");
        push_attr(&mut out, "text", "1 < 2");
        assert_eq!(out, r#"<x text="1 &lt; 2""#);
    }

    #[test]
    fn attribute_whitespace_controls_become_references() {
        let mut out = String::new();
        push_attr(&mut out, "TEXT", "a\nb\tc\r\n");
        assert_eq!(out, r#" TEXT="a&#10;b&#9;c&#13;&#10;""#);

        let mut text = String::new();
        escape_xml_into(&mut text, "a\nb");
        assert_eq!(text, "a\nb");

        let xml = format!("<x{out}/>");
        let doc = roxmltree::Document::parse(&xml).unwrap();
        assert_eq!(doc.root_element().attribute("TEXT"), Some("a\nb\tc\r\n"));
    }
}
