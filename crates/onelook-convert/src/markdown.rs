//! Markdown outlines: the root as a `#` heading, descendants as indented bullet items and notes
//! as `>` quote lines under their node.
//!
//! Multi-line node text uses CommonMark hard breaks: a line ending in an odd number of
//! backslashes continues on the next line. Any other trailing backslash run is an escape and is
//! halved on import.

use crate::{
    Converter, DEFAULT_IMPORT_TITLE, Error, Format, ImportOptions, Result, document_from_root,
    promote_single_child,
};
use onelook_core::validate::MAX_IMPORT_DEPTH;
use onelook_core::{MindMapDocument, MindMapNode, NodeData};

pub struct MarkdownConverter;

impl Converter for MarkdownConverter {
    fn format(&self) -> Format {
        Format::Markdown
    }

    fn import(&self, bytes: &[u8], _options: &ImportOptions) -> Result<MindMapDocument> {
        let text = std::str::from_utf8(bytes)?;
        let root = parse_outline(text)?;
        Ok(document_from_root(promote_single_child(root)))
    }

    fn export(&self, document: &MindMapDocument) -> Result<Vec<u8>> {
        let mut out = String::new();
        write_node(&mut out, &document.root, 0);
        Ok(out.into_bytes())
    }
}

enum Line<'a> {
    Heading { level: usize, text: &'a str },
    Item { indent: usize, text: &'a str },
    Quote(&'a str),
}

fn classify(raw: &str) -> Option<Line<'_>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(rest) = trimmed.strip_prefix('>') {
        return Some(Line::Quote(rest.trim()));
    }
    let hashes = trimmed.bytes().take_while(|&b| b == b'#').count();
    if hashes > 0 && trimmed[hashes..].starts_with(' ') {
        return Some(Line::Heading {
            level: hashes - 1,
            text: trimmed[hashes..].trim(),
        });
    }
    let indent = raw
        .chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 2 } else { 1 })
        .sum();
    let text = ["- ", "* ", "+ "]
        .iter()
        .find_map(|marker| trimmed.strip_prefix(marker))
        .or_else(|| ordered_item(trimmed))
        .unwrap_or(trimmed)
        .trim();
    Some(Line::Item { indent, text })
}

/// Strips a `1.` / `1)` ordered-list marker.
fn ordered_item(s: &str) -> Option<&str> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    s[digits..]
        .strip_prefix(". ")
        .or_else(|| s[digits..].strip_prefix(") "))
}

/// Builds the outline under a placeholder root.
///
/// A `#`-heading with N hashes sits at level N - 1. List items sit one level below the latest
/// heading, nested by indentation (two spaces per level) relative to the first item after it.
fn parse_outline(text: &str) -> Result<MindMapNode> {
    // Nodes are kept flat with parent indices until the end so the stack can refer to them.
    let mut nodes: Vec<(MindMapNode, Option<usize>)> =
        vec![(MindMapNode::new(DEFAULT_IMPORT_TITLE), None)];
    // Open ancestors as (level, node index); the placeholder root sits at level -1.
    let mut stack: Vec<(isize, usize)> = vec![(-1, 0)];
    let mut item_base: Option<(isize, usize)> = None;
    let mut last: Option<usize> = None;
    let mut continues: Option<usize> = None;

    for (line_no, raw) in text.lines().enumerate() {
        if let Some(i) = continues.take() {
            let (line, more) = split_hard_break(raw.trim());
            let node_text = &mut nodes[i].0.text;
            node_text.push('\n');
            node_text.push_str(&line);
            if more {
                continues = Some(i);
            }
            continue;
        }
        let Some(line) = classify(raw) else {
            continue;
        };
        let (level, text) = match line {
            Line::Quote(note) => {
                if let Some(i) = last {
                    append_note(&mut nodes[i].0, note);
                }
                continue;
            }
            Line::Heading { level, text } => {
                item_base = None;
                (level as isize, text)
            }
            Line::Item { indent, text } => {
                let (base_level, base_indent) = *item_base.get_or_insert_with(|| {
                    // Right after a heading (or at the start) the top of the stack is that heading.
                    let heading = stack.last().map_or(-1, |&(l, _)| l);
                    (heading + 1, indent)
                });
                let nested = indent.saturating_sub(base_indent) / 2;
                (base_level + nested as isize, text)
            }
        };
        if level as usize > MAX_IMPORT_DEPTH {
            return Err(Error::too_deep(format!("line {}", line_no + 1)));
        }

        while stack.last().is_some_and(|&(l, _)| l >= level) {
            stack.pop();
        }
        let parent = stack.last().map_or(0, |&(_, i)| i);
        let index = nodes.len();
        let (text, more) = split_hard_break(text);
        nodes.push((MindMapNode::new(text), Some(parent)));
        stack.push((level, index));
        last = Some(index);
        if more {
            continues = Some(index);
        }
    }

    // Children always follow their parent, so folding from the back assembles the tree.
    let mut children: Vec<Vec<MindMapNode>> = vec![Vec::new(); nodes.len()];
    while let Some((node, parent)) = nodes.pop() {
        let index = nodes.len();
        let kids = std::mem::take(&mut children[index]);
        let node = node.with_children(kids.into_iter().rev());
        match parent {
            Some(p) => children[p].push(node),
            None => return Ok(node),
        }
    }
    Ok(MindMapNode::new(DEFAULT_IMPORT_TITLE))
}

fn append_note(node: &mut MindMapNode, line: &str) {
    let data = node.data.get_or_insert_with(NodeData::default);
    match &mut data.note {
        Some(note) => {
            note.push('\n');
            note.push_str(line);
        }
        None => data.note = Some(line.to_string()),
    }
}

/// Splits a trailing hard break off `line` and unescapes the remaining backslash run.
fn split_hard_break(line: &str) -> (String, bool) {
    let body = line.trim_end_matches('\\');
    let run = line.len() - body.len();
    let mut text = body.to_string();
    text.extend(std::iter::repeat_n('\\', run / 2));
    (text, run % 2 == 1)
}

/// Writes `text` with its trailing backslashes doubled; every line but the last ends in a hard
/// break and the next one starts at `indent`.
fn push_text_lines(out: &mut String, text: &str, indent: &str) {
    let mut lines = text.split('\n').peekable();
    while let Some(line) = lines.next() {
        let body = line.trim_end_matches('\\');
        out.push_str(body);
        for _ in 0..2 * (line.len() - body.len()) {
            out.push('\\');
        }
        if lines.peek().is_some() {
            out.push_str("\\\n");
            out.push_str(indent);
        } else {
            out.push('\n');
        }
    }
}

fn write_node(out: &mut String, node: &MindMapNode, level: usize) {
    let indent = "  ".repeat(level);
    out.push_str(&indent);
    out.push_str(if level == 0 { "# " } else { "- " });
    push_text_lines(out, &node.text, &format!("{indent}  "));
    if let Some(note) = node.data.as_ref().and_then(|d| d.note.as_deref()) {
        for line in note.split('\n') {
            out.push_str(&indent);
            out.push_str("  > ");
            out.push_str(line);
            out.push('\n');
        }
    }
    for child in &node.children {
        write_node(out, child, level + 1);
    }
}
