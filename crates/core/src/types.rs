//! Domain types for representing presentation content, style, and geometry.
//!
//! Geometry is expressed in points throughout; host backends convert from
//! their native units before constructing these values.

use serde::{Deserialize, Serialize};

/// A tri-state style flag.
///
/// `Unset` means the style is mixed across the span or was never specified.
/// It is informative in its own right and must not be read as `False`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriState {
    True,
    False,
    #[default]
    Unset,
}

impl TriState {
    /// Collapse to a plain bool, if determinate.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            TriState::True => Some(true),
            TriState::False => Some(false),
            TriState::Unset => None,
        }
    }

    /// Whether the flag holds a determinate value.
    pub fn is_set(self) -> bool {
        self != TriState::Unset
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value {
            TriState::True
        } else {
            TriState::False
        }
    }
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(v) => v.into(),
            None => TriState::Unset,
        }
    }
}

/// The kind of a page element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    /// A shape carrying styled text.
    Shape,
    /// A picture; has geometry but no text styles.
    Picture,
    /// Anything else (tables, groups, media, ...).
    Other,
}

impl ElementType {
    /// The element kind as an opaque comparable token.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Shape => "SHAPE",
            ElementType::Picture => "PICTURE",
            ElementType::Other => "OTHER",
        }
    }
}

/// Paragraph alignment values the host layer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParagraphAlignment {
    Start,
    Center,
    End,
    Justify,
}

/// Style fields of a text run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub bold: TriState,
    pub italic: TriState,
    pub underline: TriState,

    /// Font size in points. None if unspecified.
    pub font_size: Option<f64>,

    /// Font family name. None if unspecified.
    pub font_family: Option<String>,

    /// Foreground color as an opaque comparable token (hex string).
    pub fg_color: Option<String>,

    /// Background/highlight color as an opaque comparable token.
    pub bg_color: Option<String>,
}

impl TextStyle {
    /// Combine two styles field-wise: agreement keeps the value,
    /// disagreement yields unset.
    fn merge(&self, other: &TextStyle) -> TextStyle {
        TextStyle {
            bold: merge_flag(self.bold, other.bold),
            italic: merge_flag(self.italic, other.italic),
            underline: merge_flag(self.underline, other.underline),
            font_size: merge_opt(&self.font_size, &other.font_size),
            font_family: merge_opt(&self.font_family, &other.font_family),
            fg_color: merge_opt(&self.fg_color, &other.fg_color),
            bg_color: merge_opt(&self.bg_color, &other.bg_color),
        }
    }
}

fn merge_flag(a: TriState, b: TriState) -> TriState {
    if a == b {
        a
    } else {
        TriState::Unset
    }
}

fn merge_opt<T: PartialEq + Clone>(a: &Option<T>, b: &Option<T>) -> Option<T> {
    if a == b {
        a.clone()
    } else {
        None
    }
}

/// A maximal contiguous span of text sharing one style.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRun {
    /// The literal text of the run.
    pub text: String,

    /// The run's style.
    pub style: TextStyle,
}

impl TextRun {
    /// Create a run with the given text and style.
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// A page element: geometry plus, for shapes, styled text runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    /// What kind of page element this is.
    pub element_type: ElementType,

    /// Left edge in points. None if unknown.
    pub left: Option<f64>,

    /// Top edge in points. None if unknown.
    pub top: Option<f64>,

    /// Width in points. None if unknown.
    pub width: Option<f64>,

    /// Height in points. None if unknown.
    pub height: Option<f64>,

    /// Paragraph alignment of the shape's text, if any was specified.
    pub alignment: Option<ParagraphAlignment>,

    /// Text runs in document order. Empty for elements without text.
    pub runs: Vec<TextRun>,
}

impl Shape {
    /// Create an empty element of the given kind.
    pub fn new(element_type: ElementType) -> Self {
        Self {
            element_type,
            left: None,
            top: None,
            width: None,
            height: None,
            alignment: None,
            runs: Vec::new(),
        }
    }

    /// All of the shape's text, runs concatenated in order.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// The shape-level style: the merge of all run styles.
    ///
    /// A field on which the runs disagree comes back unset; a shape with no
    /// text has every field unset.
    pub fn style(&self) -> TextStyle {
        let mut runs = self.runs.iter();
        let first = match runs.next() {
            Some(run) => run.style.clone(),
            None => return TextStyle::default(),
        };
        runs.fold(first, |acc, run| acc.merge(&run.style))
    }
}

/// A single slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    /// 1-based slide number.
    pub number: usize,

    /// Page elements in document order.
    pub shapes: Vec<Shape>,
}

impl Slide {
    /// Create an empty slide with the given number.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            shapes: Vec::new(),
        }
    }

    /// Add a page element to this slide.
    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }
}

/// A placeholder on the slide master: the layout the master prescribes
/// for one element position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placeholder {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub alignment: Option<ParagraphAlignment>,
}

/// The first slide master of a presentation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Master {
    /// Placeholders in document order.
    pub placeholders: Vec<Placeholder>,
}

/// An entire presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presentation {
    /// Original filename (without path).
    pub filename: String,

    /// Slides in presentation order.
    pub slides: Vec<Slide>,

    /// The first slide master, if one was read.
    pub master: Option<Master>,
}

impl Presentation {
    /// Create a new presentation with the given filename.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            slides: Vec::new(),
            master: None,
        }
    }

    /// Add a slide to the presentation.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    /// Look up a page element by 0-based slide and element index.
    pub fn shape_at(&self, slide: usize, element: usize) -> Option<&Shape> {
        self.slides.get(slide).and_then(|s| s.shapes.get(element))
    }

    /// Mutable variant of [`shape_at`](Self::shape_at).
    pub fn shape_at_mut(&mut self, slide: usize, element: usize) -> Option<&mut Shape> {
        self.slides
            .get_mut(slide)
            .and_then(|s| s.shapes.get_mut(element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styled_run(text: &str, bold: TriState, size: Option<f64>) -> TextRun {
        TextRun::new(
            text,
            TextStyle {
                bold,
                font_size: size,
                ..TextStyle::default()
            },
        )
    }

    #[test]
    fn test_tristate_conversions() {
        assert_eq!(TriState::from(true), TriState::True);
        assert_eq!(TriState::from(Some(false)), TriState::False);
        assert_eq!(TriState::from(None), TriState::Unset);
        assert_eq!(TriState::True.as_bool(), Some(true));
        assert_eq!(TriState::Unset.as_bool(), None);
        assert!(!TriState::Unset.is_set());
    }

    #[test]
    fn test_shape_style_agreement() {
        let mut shape = Shape::new(ElementType::Shape);
        shape.runs.push(styled_run("Hello ", TriState::True, Some(18.0)));
        shape.runs.push(styled_run("world", TriState::True, Some(18.0)));

        let style = shape.style();
        assert_eq!(style.bold, TriState::True);
        assert_eq!(style.font_size, Some(18.0));
    }

    #[test]
    fn test_shape_style_disagreement_is_unset() {
        let mut shape = Shape::new(ElementType::Shape);
        shape.runs.push(styled_run("Hello ", TriState::True, Some(18.0)));
        shape.runs.push(styled_run("world", TriState::False, Some(24.0)));

        let style = shape.style();
        assert_eq!(style.bold, TriState::Unset);
        assert_eq!(style.font_size, None);
    }

    #[test]
    fn test_empty_shape_style_is_unset() {
        let shape = Shape::new(ElementType::Shape);
        let style = shape.style();
        assert_eq!(style.bold, TriState::Unset);
        assert_eq!(style.font_family, None);
    }

    #[test]
    fn test_shape_text_concatenates_runs() {
        let mut shape = Shape::new(ElementType::Shape);
        shape.runs.push(styled_run("Hello ", TriState::Unset, None));
        shape.runs.push(styled_run("world", TriState::Unset, None));
        assert_eq!(shape.text(), "Hello world");
    }

    #[test]
    fn test_presentation_shape_lookup() {
        let mut presentation = Presentation::new("deck.pptx");
        let mut slide = Slide::new(1);
        slide.add_shape(Shape::new(ElementType::Shape));
        presentation.add_slide(slide);

        assert!(presentation.shape_at(0, 0).is_some());
        assert!(presentation.shape_at(0, 1).is_none());
        assert!(presentation.shape_at(1, 0).is_none());
    }
}
