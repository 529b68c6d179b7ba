//! Flat attribute records: the training rows and query vectors the
//! decision tree operates on.
//!
//! A record is a named-field snapshot of one element's (or one run's) style
//! and geometry. Records are immutable once built and are rebuilt from host
//! state on every prediction call.

use crate::types::{ElementType, Shape, TextRun, TriState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names of the attributes a record can carry.
///
/// Declaration order is the deterministic enumeration order used when
/// breaking ties between equally good split attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Bold,
    Italic,
    Underline,
    FontSize,
    FontFamily,
    FgColor,
    BgColor,
    ElementType,
    Height,
    Width,
    Top,
    Left,
    Run,
}

impl Attribute {
    /// Every attribute, in declaration order.
    pub const ALL: [Attribute; 13] = [
        Attribute::Bold,
        Attribute::Italic,
        Attribute::Underline,
        Attribute::FontSize,
        Attribute::FontFamily,
        Attribute::FgColor,
        Attribute::BgColor,
        Attribute::ElementType,
        Attribute::Height,
        Attribute::Width,
        Attribute::Top,
        Attribute::Left,
        Attribute::Run,
    ];

    /// Whether values of this attribute order numerically (threshold splits)
    /// rather than categorically (equality splits).
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Attribute::FontSize
                | Attribute::Height
                | Attribute::Width
                | Attribute::Top
                | Attribute::Left
        )
    }

    /// The attribute's name as used in messages and record dumps.
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Bold => "bold",
            Attribute::Italic => "italic",
            Attribute::Underline => "underline",
            Attribute::FontSize => "fontsize",
            Attribute::FontFamily => "fontfamily",
            Attribute::FgColor => "fgcolor",
            Attribute::BgColor => "bgcolor",
            Attribute::ElementType => "elementtype",
            Attribute::Height => "height",
            Attribute::Width => "width",
            Attribute::Top => "top",
            Attribute::Left => "left",
            Attribute::Run => "run",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The value a record holds for one attribute.
///
/// `Unset` is a legitimate categorical value (it marks mixed or missing
/// styling) and forms its own branch at categorical splits; it is never
/// coerced to `false` or zero. Serializes untagged: `true`, `14.0`,
/// `"Arial"`, or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Flag(bool),
    Number(f64),
    Text(String),
    Unset,
}

impl AttrValue {
    /// Whether this is the indeterminate/no-prediction sentinel.
    pub fn is_unset(&self) -> bool {
        matches!(self, AttrValue::Unset)
    }

    /// The numeric payload, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean payload, if this is a flag.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            AttrValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Flag(b) => write!(f, "{}", b),
            AttrValue::Number(n) => write!(f, "{}", n),
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::Unset => f.write_str("unset"),
        }
    }
}

/// One observed element (or text run): a mapping from attribute to value
/// with explicit named fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub bold: TriState,
    pub italic: TriState,
    pub underline: TriState,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub fg_color: Option<String>,
    pub bg_color: Option<String>,
    pub element_type: Option<ElementType>,
    pub height: Option<f64>,
    pub width: Option<f64>,
    pub top: Option<f64>,
    pub left: Option<f64>,
    /// Literal run text; present only in run-granular records.
    pub run: Option<String>,
}

impl AttributeRecord {
    /// Build an element-granular record from a shape's merged style and
    /// geometry.
    pub fn from_shape(shape: &Shape) -> Self {
        let style = shape.style();
        Self {
            bold: style.bold,
            italic: style.italic,
            underline: style.underline,
            font_size: style.font_size,
            font_family: style.font_family,
            fg_color: style.fg_color,
            bg_color: style.bg_color,
            element_type: Some(shape.element_type),
            height: shape.height,
            width: shape.width,
            top: shape.top,
            left: shape.left,
            run: None,
        }
    }

    /// Build a run-granular record: the run's own style, the parent shape's
    /// geometry, and the run's literal text.
    pub fn from_run(shape: &Shape, run: &TextRun) -> Self {
        Self {
            bold: run.style.bold,
            italic: run.style.italic,
            underline: run.style.underline,
            font_size: run.style.font_size,
            font_family: run.style.font_family.clone(),
            fg_color: run.style.fg_color.clone(),
            bg_color: run.style.bg_color.clone(),
            element_type: Some(shape.element_type),
            height: shape.height,
            width: shape.width,
            top: shape.top,
            left: shape.left,
            run: Some(run.text.clone()),
        }
    }

    /// The value this record holds for `attr`.
    pub fn get(&self, attr: Attribute) -> AttrValue {
        match attr {
            Attribute::Bold => flag_value(self.bold),
            Attribute::Italic => flag_value(self.italic),
            Attribute::Underline => flag_value(self.underline),
            Attribute::FontSize => number_value(self.font_size),
            Attribute::FontFamily => text_value(&self.font_family),
            Attribute::FgColor => text_value(&self.fg_color),
            Attribute::BgColor => text_value(&self.bg_color),
            Attribute::ElementType => match self.element_type {
                Some(t) => AttrValue::Text(t.as_str().to_string()),
                None => AttrValue::Unset,
            },
            Attribute::Height => number_value(self.height),
            Attribute::Width => number_value(self.width),
            Attribute::Top => number_value(self.top),
            Attribute::Left => number_value(self.left),
            Attribute::Run => text_value(&self.run),
        }
    }

    /// Clear the field for `attr`, leaving it unset.
    ///
    /// Used to strip the prediction target out of a query vector.
    pub fn clear(&mut self, attr: Attribute) {
        match attr {
            Attribute::Bold => self.bold = TriState::Unset,
            Attribute::Italic => self.italic = TriState::Unset,
            Attribute::Underline => self.underline = TriState::Unset,
            Attribute::FontSize => self.font_size = None,
            Attribute::FontFamily => self.font_family = None,
            Attribute::FgColor => self.fg_color = None,
            Attribute::BgColor => self.bg_color = None,
            Attribute::ElementType => self.element_type = None,
            Attribute::Height => self.height = None,
            Attribute::Width => self.width = None,
            Attribute::Top => self.top = None,
            Attribute::Left => self.left = None,
            Attribute::Run => self.run = None,
        }
    }
}

fn flag_value(flag: TriState) -> AttrValue {
    match flag.as_bool() {
        Some(b) => AttrValue::Flag(b),
        None => AttrValue::Unset,
    }
}

fn number_value(value: Option<f64>) -> AttrValue {
    match value {
        Some(n) => AttrValue::Number(n),
        None => AttrValue::Unset,
    }
}

fn text_value(value: &Option<String>) -> AttrValue {
    match value {
        Some(s) => AttrValue::Text(s.clone()),
        None => AttrValue::Unset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TextStyle, TriState};

    #[test]
    fn test_get_and_clear_round_trip() {
        let mut record = AttributeRecord {
            bold: TriState::True,
            font_size: Some(14.0),
            font_family: Some("Arial".to_string()),
            ..AttributeRecord::default()
        };

        assert_eq!(record.get(Attribute::Bold), AttrValue::Flag(true));
        assert_eq!(record.get(Attribute::FontSize), AttrValue::Number(14.0));
        assert_eq!(
            record.get(Attribute::FontFamily),
            AttrValue::Text("Arial".to_string())
        );
        assert_eq!(record.get(Attribute::Italic), AttrValue::Unset);

        record.clear(Attribute::Bold);
        assert_eq!(record.get(Attribute::Bold), AttrValue::Unset);
    }

    #[test]
    fn test_from_shape_uses_merged_style() {
        let mut shape = Shape::new(ElementType::Shape);
        shape.left = Some(48.0);
        shape.width = Some(600.0);
        shape.runs.push(TextRun::new(
            "Title",
            TextStyle {
                bold: TriState::True,
                font_size: Some(44.0),
                ..TextStyle::default()
            },
        ));

        let record = AttributeRecord::from_shape(&shape);
        assert_eq!(record.bold, TriState::True);
        assert_eq!(record.font_size, Some(44.0));
        assert_eq!(record.left, Some(48.0));
        assert_eq!(record.element_type, Some(ElementType::Shape));
        assert_eq!(record.run, None);
    }

    #[test]
    fn test_from_run_carries_run_text_and_shape_geometry() {
        let mut shape = Shape::new(ElementType::Shape);
        shape.top = Some(100.0);
        let run = TextRun::new(
            "emphasis",
            TextStyle {
                italic: TriState::True,
                ..TextStyle::default()
            },
        );
        shape.runs.push(run.clone());

        let record = AttributeRecord::from_run(&shape, &run);
        assert_eq!(record.italic, TriState::True);
        assert_eq!(record.top, Some(100.0));
        assert_eq!(record.run.as_deref(), Some("emphasis"));
    }

    #[test]
    fn test_attribute_order_is_stable() {
        assert_eq!(Attribute::ALL[0], Attribute::Bold);
        assert_eq!(Attribute::ALL[12], Attribute::Run);
        assert_eq!(Attribute::ALL.len(), 13);
    }

    #[test]
    fn test_attr_value_display() {
        assert_eq!(AttrValue::Flag(true).to_string(), "true");
        assert_eq!(AttrValue::Number(14.0).to_string(), "14");
        assert_eq!(AttrValue::Text("Arial".into()).to_string(), "Arial");
        assert_eq!(AttrValue::Unset.to_string(), "unset");
    }
}
