//! Node size estimation.
//!
//! There is no font engine here: widths come from a per-character heuristic (wide CJK glyphs vs
//! everything else) and heights from a wrapped line count plus any images. The numbers are
//! deliberately stable so that layouts are reproducible across platforms.

#[cfg(test)]
mod tests;

use onelook_core::NodeRecord;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FONT_SIZE: f64 = 14.0;

const WIDE_CHAR_WIDTH: f64 = 14.0;
const NARROW_CHAR_WIDTH: f64 = 8.0;
const ICON_WIDTH: f64 = 24.0;
const LINE_HEIGHT_RATIO: f64 = 1.4;

const MIN_NODE_WIDTH: f64 = 60.0;
const MAX_TEXT_NODE_WIDTH: f64 = 300.0;
const MAX_IMAGE_NODE_WIDTH: f64 = 420.0;
const IMAGE_MIN_NODE_WIDTH: f64 = 220.0;
const MIN_NODE_HEIGHT: f64 = 36.0;

pub const IMAGE_WIDTH_DEFAULT: f64 = 220.0;
pub const IMAGE_WIDTH_MIN: f64 = 80.0;
pub const IMAGE_WIDTH_MAX: f64 = 260.0;
const IMAGE_RATIO_DEFAULT: f64 = 0.68;
const IMAGE_RATIO_MIN: f64 = 0.35;
const IMAGE_RATIO_MAX: f64 = 1.2;
const IMAGE_VERTICAL_GAP: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSize {
    pub width: f64,
    pub height: f64,
}

/// Produces the box a node occupies on the canvas.
pub trait NodeMeasurer {
    fn measure(&self, node: &NodeRecord) -> NodeSize;
}

/// Font-size dependent padding around node content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentSpacing {
    pub padding_x: f64,
    pub padding_y: f64,
    pub image_text_gap: f64,
}

impl ContentSpacing {
    pub fn for_font_size(font_size: f64) -> Self {
        let fs = if font_size.is_finite() {
            font_size
        } else {
            DEFAULT_FONT_SIZE
        };
        let padding_x = (fs * 0.85).round().clamp(10.0, 20.0);
        let padding_y = (fs * 0.55).round().clamp(6.0, 14.0);
        Self {
            padding_x,
            padding_y,
            image_text_gap: padding_y,
        }
    }
}

/// The default estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicNodeMeasurer;

impl NodeMeasurer for HeuristicNodeMeasurer {
    fn measure(&self, node: &NodeRecord) -> NodeSize {
        let font_size = node
            .style
            .as_ref()
            .and_then(|s| s.font_size)
            .filter(|fs| fs.is_finite() && *fs > 0.0)
            .unwrap_or(DEFAULT_FONT_SIZE);
        let font_scale = font_size / DEFAULT_FONT_SIZE;
        let spacing = ContentSpacing::for_font_size(font_size);
        let total_padding_x = spacing.padding_x * 2.0;
        let total_padding_y = spacing.padding_y * 2.0;

        let data = node.data.as_ref();
        let icon_width = if data.is_some_and(|d| d.icon.is_some()) {
            ICON_WIDTH
        } else {
            0.0
        };
        let markdown_images = markdown_image_count(&node.text);
        let data_image = data.is_some_and(|d| d.image_ref().is_some());
        let image_count = markdown_images + usize::from(data_image);

        let measured = strip_markdown_for_measure(&node.text);
        let text_width = estimate_text_width(&measured) * font_scale;

        let (min_width, max_width, image_preferred) = if image_count > 0 {
            (
                IMAGE_MIN_NODE_WIDTH,
                MAX_IMAGE_NODE_WIDTH,
                IMAGE_WIDTH_DEFAULT + total_padding_x + icon_width,
            )
        } else {
            (MIN_NODE_WIDTH, MAX_TEXT_NODE_WIDTH, 0.0)
        };
        let base_width = (text_width + total_padding_x + icon_width).max(image_preferred);
        let width = base_width.min(max_width).max(min_width);

        let content_width = (width - total_padding_x - icon_width).max(1.0);
        let lines = wrapped_line_count(&measured, content_width, font_scale);
        let text_height = lines as f64 * font_size * LINE_HEIGHT_RATIO;

        let mut image_heights = Vec::with_capacity(image_count);
        if markdown_images > 0 {
            let w = content_width.min(IMAGE_WIDTH_DEFAULT).max(IMAGE_WIDTH_MIN);
            image_heights.extend(std::iter::repeat_n(image_height(w, None), markdown_images));
        }
        if let Some(data) = data.filter(|_| data_image) {
            let chosen = normalize_image_width(data.image_width);
            let w = content_width.min(chosen).max(IMAGE_WIDTH_MIN);
            image_heights.push(image_height(w, data.image_aspect_ratio));
        }
        let image_total = if image_heights.is_empty() {
            0.0
        } else {
            image_heights.iter().sum::<f64>()
                + (image_heights.len() - 1) as f64 * IMAGE_VERTICAL_GAP
        };

        let gap = if text_height > 0.0 && image_total > 0.0 {
            spacing.image_text_gap
        } else {
            0.0
        };
        let height = (text_height + image_total + gap + total_padding_y)
            .ceil()
            .max(MIN_NODE_HEIGHT);

        NodeSize { width, height }
    }
}

fn is_wide_char(ch: char) -> bool {
    matches!(ch,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3000}'..='\u{303F}'
        | '\u{FF00}'..='\u{FFEF}'
    )
}

/// Unscaled width of `text` at the default font size.
pub fn estimate_text_width(text: &str) -> f64 {
    text.chars()
        .map(|ch| {
            if is_wide_char(ch) {
                WIDE_CHAR_WIDTH
            } else {
                NARROW_CHAR_WIDTH
            }
        })
        .sum()
}

/// Number of rendered lines once each logical line wraps at `content_width`.
pub fn wrapped_line_count(text: &str, content_width: f64, font_scale: f64) -> usize {
    if text.trim().is_empty() {
        return 0;
    }
    let total: usize = text
        .split('\n')
        .map(str::trim)
        .map(|line| {
            if line.is_empty() {
                1
            } else {
                let w = estimate_text_width(line) * font_scale;
                ((w / content_width).ceil() as usize).max(1)
            }
        })
        .sum();
    total.max(1)
}

/// Clamps a user-chosen image width; missing or non-finite widths use the default.
pub fn normalize_image_width(width: Option<f64>) -> f64 {
    match width {
        Some(w) if w.is_finite() => w.round().clamp(IMAGE_WIDTH_MIN, IMAGE_WIDTH_MAX),
        _ => IMAGE_WIDTH_DEFAULT,
    }
}

pub fn normalize_image_aspect_ratio(ratio: Option<f64>) -> f64 {
    match ratio {
        Some(r) if r.is_finite() => r.clamp(IMAGE_RATIO_MIN, IMAGE_RATIO_MAX),
        _ => IMAGE_RATIO_DEFAULT,
    }
}

pub fn image_height(width: f64, ratio: Option<f64>) -> f64 {
    (width * normalize_image_aspect_ratio(ratio)).round().max(1.0)
}

fn markdown_image_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!\[[^\]]*\]\(([^)]+)\)").expect("valid regex"))
}

pub fn markdown_image_count(text: &str) -> usize {
    markdown_image_regex().find_iter(text).count()
}

struct StripRules {
    link: Regex,
    bullet: Regex,
    ordered: Regex,
    emphasis: Regex,
    spaces: Regex,
    blank_lines: Regex,
}

fn strip_rules() -> &'static StripRules {
    static RULES: std::sync::OnceLock<StripRules> = std::sync::OnceLock::new();
    RULES.get_or_init(|| StripRules {
        link: Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid regex"),
        bullet: Regex::new(r"(?m)^\s*[-+*]\s+").expect("valid regex"),
        ordered: Regex::new(r"(?m)^\s*\d+\.\s+").expect("valid regex"),
        emphasis: Regex::new(r"[*_`~>#]").expect("valid regex"),
        spaces: Regex::new(r"[ \t\x0C\x0B]+").expect("valid regex"),
        blank_lines: Regex::new(r"\n{3,}").expect("valid regex"),
    })
}

/// Reduces Markdown to roughly the text a reader would see.
pub fn strip_markdown_for_measure(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let rules = strip_rules();
    let s = markdown_image_regex().replace_all(text, " ");
    let s = rules.link.replace_all(&s, "$1");
    let s = rules.bullet.replace_all(&s, "");
    let s = rules.ordered.replace_all(&s, "");
    let s = rules.emphasis.replace_all(&s, "");
    let s = rules.spaces.replace_all(&s, " ");
    let s = rules.blank_lines.replace_all(&s, "\n\n");
    s.trim().to_string()
}
