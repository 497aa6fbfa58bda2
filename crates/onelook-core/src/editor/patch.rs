use crate::model::{FontWeight, NodeData, NodeShape, NodeStyle};

/// A field update: `None` leaves the field alone, `Some(None)` clears it, `Some(Some(v))` sets it.
pub type FieldPatch<T> = Option<Option<T>>;

fn apply<T>(field: &mut Option<T>, patch: FieldPatch<T>) {
    if let Some(value) = patch {
        *field = value;
    }
}

/// Partial update for [`NodeData`]; fields left as `None` are untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDataPatch {
    pub note: FieldPatch<String>,
    pub hyperlink: FieldPatch<String>,
    pub image: FieldPatch<String>,
    pub image_width: FieldPatch<f64>,
    pub image_aspect_ratio: FieldPatch<f64>,
    pub icon: FieldPatch<String>,
    pub priority: FieldPatch<u8>,
    pub progress: FieldPatch<u8>,
    pub tags: FieldPatch<Vec<String>>,
}

impl NodeDataPatch {
    pub fn note(note: impl Into<String>) -> Self {
        Self {
            note: Some(Some(note.into())),
            ..Self::default()
        }
    }

    pub fn hyperlink(url: impl Into<String>) -> Self {
        Self {
            hyperlink: Some(Some(url.into())),
            ..Self::default()
        }
    }

    pub(crate) fn apply_to(self, data: &mut NodeData) {
        apply(&mut data.note, self.note);
        apply(&mut data.hyperlink, self.hyperlink);
        apply(&mut data.image, self.image);
        apply(&mut data.image_width, self.image_width.map(|w| w.filter(|w| w.is_finite())));
        apply(
            &mut data.image_aspect_ratio,
            self.image_aspect_ratio.map(|r| r.filter(|r| r.is_finite())),
        );
        apply(&mut data.icon, self.icon);
        // 0 means "no priority"; anything above 9 saturates.
        apply(
            &mut data.priority,
            self.priority.map(|p| p.filter(|p| *p > 0).map(|p| p.min(9))),
        );
        apply(&mut data.progress, self.progress.map(|p| p.map(|p| p.min(100))));
        apply(&mut data.tags, self.tags);
    }
}

/// Partial update for [`NodeStyle`]; fields left as `None` are untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeStylePatch {
    pub background: FieldPatch<String>,
    pub color: FieldPatch<String>,
    pub font_size: FieldPatch<f64>,
    pub font_weight: FieldPatch<FontWeight>,
    pub shape: FieldPatch<NodeShape>,
    pub border_color: FieldPatch<String>,
    pub border_width: FieldPatch<f64>,
}

impl NodeStylePatch {
    pub(crate) fn apply_to(self, style: &mut NodeStyle) {
        apply(&mut style.background, self.background);
        apply(&mut style.color, self.color);
        apply(
            &mut style.font_size,
            self.font_size.map(|s| s.filter(|s| s.is_finite() && *s > 0.0)),
        );
        apply(&mut style.font_weight, self.font_weight);
        apply(&mut style.shape, self.shape);
        apply(&mut style.border_color, self.border_color);
        apply(
            &mut style.border_width,
            self.border_width.map(|w| w.filter(|w| w.is_finite())),
        );
    }
}
