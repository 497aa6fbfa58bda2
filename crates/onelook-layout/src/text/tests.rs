use super::*;
use onelook_core::{NodeData, NodeStyle};

fn measure(node: &NodeRecord) -> NodeSize {
    HeuristicNodeMeasurer.measure(node)
}

fn with_data(text: &str, data: NodeData) -> NodeRecord {
    let mut node = NodeRecord::new(text);
    node.data = Some(data);
    node
}

#[test]
fn short_latin_text_hits_min_height() {
    let size = measure(&NodeRecord::new("Hello"));
    assert_eq!(size, NodeSize { width: 64.0, height: 36.0 });
}

#[test]
fn empty_text_is_clamped_to_minimum_box() {
    let size = measure(&NodeRecord::new(""));
    assert_eq!(size, NodeSize { width: 60.0, height: 36.0 });
}

#[test]
fn cjk_characters_are_wider() {
    assert_eq!(estimate_text_width("中文"), 28.0);
    assert_eq!(estimate_text_width("ab"), 16.0);
    assert_eq!(estimate_text_width("，"), 14.0);
}

#[test]
fn long_text_wraps_at_max_width() {
    let size = measure(&NodeRecord::new("a".repeat(100)));
    assert_eq!(size.width, 300.0);
    // 800 / 276 → 3 lines of 19.6 plus 16 padding.
    assert_eq!(size.height, 75.0);
}

#[test]
fn icon_adds_fixed_allowance() {
    let node = with_data(
        "Hello",
        NodeData {
            icon: Some("star".to_string()),
            ..NodeData::default()
        },
    );
    assert_eq!(measure(&node).width, 88.0);
}

#[test]
fn font_size_scales_text_and_padding() {
    let mut node = NodeRecord::new("Hello");
    node.style = Some(NodeStyle {
        font_size: Some(28.0),
        ..NodeStyle::default()
    });
    assert_eq!(measure(&node), NodeSize { width: 120.0, height: 68.0 });
}

#[test]
fn non_finite_font_size_falls_back_to_default() {
    let mut node = NodeRecord::new("Hello");
    node.style = Some(NodeStyle {
        font_size: Some(f64::NAN),
        ..NodeStyle::default()
    });
    assert_eq!(measure(&node), measure(&NodeRecord::new("Hello")));
    assert_eq!(
        ContentSpacing::for_font_size(f64::INFINITY),
        ContentSpacing::for_font_size(DEFAULT_FONT_SIZE)
    );
}

#[test]
fn data_image_widens_and_grows_node() {
    let image = NodeData {
        image: Some("cat.png".to_string()),
        ..NodeData::default()
    };
    assert_eq!(
        measure(&with_data("", image.clone())),
        NodeSize { width: 244.0, height: 166.0 }
    );
    assert_eq!(measure(&with_data("Pic", image)).height, 194.0);
}

#[test]
fn blank_data_image_is_ignored() {
    let node = with_data(
        "Hello",
        NodeData {
            image: Some("   ".to_string()),
            ..NodeData::default()
        },
    );
    assert_eq!(measure(&node), measure(&NodeRecord::new("Hello")));
}

#[test]
fn markdown_image_counts_as_image() {
    let node = NodeRecord::new("![alt](cat.png)");
    assert_eq!(markdown_image_count(&node.text), 1);
    assert_eq!(measure(&node), NodeSize { width: 244.0, height: 166.0 });
}

#[test]
fn image_helpers_clamp_inputs() {
    assert_eq!(normalize_image_width(None), IMAGE_WIDTH_DEFAULT);
    assert_eq!(normalize_image_width(Some(10.0)), IMAGE_WIDTH_MIN);
    assert_eq!(normalize_image_width(Some(1000.0)), IMAGE_WIDTH_MAX);
    assert_eq!(normalize_image_width(Some(f64::NAN)), IMAGE_WIDTH_DEFAULT);
    assert_eq!(normalize_image_aspect_ratio(Some(5.0)), 1.2);
    assert_eq!(image_height(100.0, Some(0.0)), 35.0);
}

#[test]
fn markdown_is_stripped_before_measuring() {
    assert_eq!(
        strip_markdown_for_measure("**bold** and [link](http://x)"),
        "bold and link"
    );
    assert_eq!(strip_markdown_for_measure("- item\n- two"), "item\ntwo");
    assert_eq!(strip_markdown_for_measure("1. first"), "first");
    assert_eq!(strip_markdown_for_measure("# Title"), "Title");
    assert_eq!(strip_markdown_for_measure("a\n\n\n\nb"), "a\n\nb");
    assert_eq!(strip_markdown_for_measure("a \t  b"), "a b");
}

#[test]
fn blank_lines_count_as_lines() {
    assert_eq!(wrapped_line_count("", 100.0, 1.0), 0);
    assert_eq!(wrapped_line_count("a\n\nb", 100.0, 1.0), 3);
}
