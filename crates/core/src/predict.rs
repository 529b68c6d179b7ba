//! Prediction façade: entry points that train a transient decision tree
//! from the slides before the selection and predict one style or layout
//! attribute of the selected element.
//!
//! Style predictions ignore the foreground color as a split criterion;
//! geometry predictions ignore nothing.

use crate::error::{Error, Result};
use crate::extract::{extract_records, Granularity};
use crate::record::{AttrValue, Attribute, AttributeRecord};
use crate::tree::{DecisionTree, TreeConfig};
use crate::types::Presentation;

const STYLE_IGNORED: &[Attribute] = &[Attribute::FgColor];
const GEOMETRY_IGNORED: &[Attribute] = &[];

/// The current selection, captured once per invocation.
///
/// Always an explicit value handed to the entry points, never ambient
/// state.
#[derive(Debug, Clone)]
pub struct SelectionContext {
    /// 0-based index of the slide holding the selection.
    pub slide_index: usize,

    /// 0-based index of the selected element within that slide.
    pub element_index: usize,

    /// The known attributes of the selected element.
    pub record: AttributeRecord,
}

impl SelectionContext {
    /// Capture the element at the given 0-based coordinates.
    pub fn from_presentation(
        presentation: &Presentation,
        slide_index: usize,
        element_index: usize,
    ) -> Result<Self> {
        let shape = presentation
            .shape_at(slide_index, element_index)
            .ok_or(Error::SelectionOutOfRange {
                slide: slide_index,
                element: element_index,
            })?;

        let mut record = AttributeRecord::from_shape(shape);
        let text = shape.text();
        if !text.is_empty() {
            record.run = Some(text);
        }

        Ok(Self {
            slide_index,
            element_index,
            record,
        })
    }

    /// The query vector for predicting `target`: the selection's record
    /// with the target attribute cleared.
    fn query_for(&self, target: Attribute) -> AttributeRecord {
        let mut query = self.record.clone();
        query.clear(target);
        query
    }
}

/// Predict whether the selection should be bold.
pub fn predict_bold(presentation: &Presentation, selection: &SelectionContext) -> Result<AttrValue> {
    predict_attribute(
        presentation,
        selection,
        Attribute::Bold,
        STYLE_IGNORED,
        Granularity::Element,
    )
}

/// Predict whether the selection should be italic.
pub fn predict_italic(
    presentation: &Presentation,
    selection: &SelectionContext,
) -> Result<AttrValue> {
    predict_attribute(
        presentation,
        selection,
        Attribute::Italic,
        STYLE_IGNORED,
        Granularity::Element,
    )
}

/// Predict whether the selection should be underlined.
pub fn predict_underline(
    presentation: &Presentation,
    selection: &SelectionContext,
) -> Result<AttrValue> {
    predict_attribute(
        presentation,
        selection,
        Attribute::Underline,
        STYLE_IGNORED,
        Granularity::Element,
    )
}

/// Predict the selection's font size from element-granular records.
pub fn predict_font_size(
    presentation: &Presentation,
    selection: &SelectionContext,
) -> Result<AttrValue> {
    predict_attribute(
        presentation,
        selection,
        Attribute::FontSize,
        STYLE_IGNORED,
        Granularity::Element,
    )
}

/// Predict the selection's font size from run-granular records; the query
/// carries the selection's literal text as its run.
pub fn predict_font_size_runs(
    presentation: &Presentation,
    selection: &SelectionContext,
) -> Result<AttrValue> {
    predict_attribute(
        presentation,
        selection,
        Attribute::FontSize,
        STYLE_IGNORED,
        Granularity::Run,
    )
}

/// Predict the selection's distance from the top of the slide.
pub fn predict_top(presentation: &Presentation, selection: &SelectionContext) -> Result<AttrValue> {
    predict_attribute(
        presentation,
        selection,
        Attribute::Top,
        GEOMETRY_IGNORED,
        Granularity::Element,
    )
}

/// Predict the selection's distance from the left edge of the slide.
pub fn predict_left(presentation: &Presentation, selection: &SelectionContext) -> Result<AttrValue> {
    predict_attribute(
        presentation,
        selection,
        Attribute::Left,
        GEOMETRY_IGNORED,
        Granularity::Element,
    )
}

/// Predict the selection's top/left and move the element to the predicted
/// left edge when it is off.
///
/// Returns `"Positioned perfectly."` (and mutates nothing) when both
/// predictions match the element's actual position; otherwise sets the
/// element's left to the predicted value and reports the shift in points.
/// When the preceding slides offer nothing to learn from, reports that and
/// mutates nothing.
pub fn fix_position(presentation: &mut Presentation, selection: &SelectionContext) -> Result<String> {
    let predicted_top = predict_top(presentation, selection)?;
    let predicted_left = predict_left(presentation, selection)?;

    let (top, left) = match (predicted_top.as_number(), predicted_left.as_number()) {
        (Some(top), Some(left)) => (top, left),
        _ => return Ok("Not enough data to position this element.".to_string()),
    };

    if selection.record.top == Some(top) && selection.record.left == Some(left) {
        return Ok("Positioned perfectly.".to_string());
    }

    let shape = presentation
        .shape_at_mut(selection.slide_index, selection.element_index)
        .ok_or(Error::SelectionOutOfRange {
            slide: selection.slide_index,
            element: selection.element_index,
        })?;
    let actual_left = shape.left.unwrap_or(left);
    shape.left = Some(left);

    let shift = actual_left - left;
    Ok(format!("Shifted element {:.2} points to the left.", shift))
}

fn predict_attribute(
    presentation: &Presentation,
    selection: &SelectionContext,
    target: Attribute,
    ignored: &[Attribute],
    granularity: Granularity,
) -> Result<AttrValue> {
    let records = extract_records(
        presentation,
        selection.slide_index,
        granularity,
        Some(target),
    );
    let query = selection.query_for(target);
    let tree = DecisionTree::train(&records, target, ignored, &TreeConfig::default())?;
    let prediction = tree.predict(&query);
    log::debug!(
        "predicted {} = {} from {} records",
        target,
        prediction,
        records.len()
    );
    Ok(prediction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ElementType, Shape, Slide, TextRun, TextStyle, TriState};

    fn titled_shape(bold: TriState, size: f64, top: f64, left: f64) -> Shape {
        let mut shape = Shape::new(ElementType::Shape);
        shape.top = Some(top);
        shape.left = Some(left);
        shape.width = Some(600.0);
        shape.height = Some(80.0);
        shape.runs.push(TextRun::new(
            "Slide title",
            TextStyle {
                bold,
                font_size: Some(size),
                ..TextStyle::default()
            },
        ));
        shape
    }

    /// Three slides of uniformly positioned bold titles, then the slide
    /// holding the selection.
    fn deck_with_selection(selection_shape: Shape) -> (Presentation, SelectionContext) {
        let mut presentation = Presentation::new("deck.pptx");
        for number in 1..=3 {
            let mut slide = Slide::new(number);
            slide.add_shape(titled_shape(TriState::True, 40.0, 50.0, 96.0));
            presentation.add_slide(slide);
        }
        let mut slide = Slide::new(4);
        slide.add_shape(selection_shape);
        presentation.add_slide(slide);

        let selection = SelectionContext::from_presentation(&presentation, 3, 0).unwrap();
        (presentation, selection)
    }

    #[test]
    fn test_predict_bold_follows_precedent() {
        let (presentation, selection) =
            deck_with_selection(titled_shape(TriState::Unset, 40.0, 50.0, 96.0));
        let prediction = predict_bold(&presentation, &selection).unwrap();
        assert_eq!(prediction, AttrValue::Flag(true));
    }

    #[test]
    fn test_predict_font_size_follows_precedent() {
        let (presentation, selection) =
            deck_with_selection(titled_shape(TriState::True, 12.0, 50.0, 96.0));
        let prediction = predict_font_size(&presentation, &selection).unwrap();
        assert_eq!(prediction, AttrValue::Number(40.0));
    }

    #[test]
    fn test_predictions_with_no_prior_slides_are_sentinel() {
        let mut presentation = Presentation::new("deck.pptx");
        let mut slide = Slide::new(1);
        slide.add_shape(titled_shape(TriState::Unset, 18.0, 10.0, 10.0));
        presentation.add_slide(slide);

        let selection = SelectionContext::from_presentation(&presentation, 0, 0).unwrap();
        let prediction = predict_font_size(&presentation, &selection).unwrap();
        assert_eq!(prediction, AttrValue::Unset);
    }

    #[test]
    fn test_fix_position_perfect_keeps_element_in_place() {
        let (mut presentation, selection) =
            deck_with_selection(titled_shape(TriState::True, 40.0, 50.0, 96.0));

        let status = fix_position(&mut presentation, &selection).unwrap();
        assert_eq!(status, "Positioned perfectly.");
        assert_eq!(presentation.shape_at(3, 0).unwrap().left, Some(96.0));
    }

    #[test]
    fn test_fix_position_shifts_left_to_prediction() {
        let (mut presentation, selection) =
            deck_with_selection(titled_shape(TriState::True, 40.0, 50.0, 100.0));

        let status = fix_position(&mut presentation, &selection).unwrap();
        assert_eq!(status, "Shifted element 4.00 points to the left.");
        assert_eq!(presentation.shape_at(3, 0).unwrap().left, Some(96.0));
    }

    #[test]
    fn test_fix_position_without_training_data_mutates_nothing() {
        let mut presentation = Presentation::new("deck.pptx");
        let mut slide = Slide::new(1);
        slide.add_shape(titled_shape(TriState::True, 40.0, 50.0, 100.0));
        presentation.add_slide(slide);

        let selection = SelectionContext::from_presentation(&presentation, 0, 0).unwrap();
        let status = fix_position(&mut presentation, &selection).unwrap();
        assert_eq!(status, "Not enough data to position this element.");
        assert_eq!(presentation.shape_at(0, 0).unwrap().left, Some(100.0));
    }

    #[test]
    fn test_run_granular_font_size_matches_identical_text() {
        let mut presentation = Presentation::new("deck.pptx");
        for number in 1..=2 {
            let mut slide = Slide::new(number);
            let mut heading = Shape::new(ElementType::Shape);
            heading.runs.push(TextRun::new(
                "Agenda",
                TextStyle {
                    font_size: Some(32.0),
                    ..TextStyle::default()
                },
            ));
            let mut body = Shape::new(ElementType::Shape);
            body.runs.push(TextRun::new(
                "Details follow",
                TextStyle {
                    font_size: Some(14.0),
                    ..TextStyle::default()
                },
            ));
            slide.add_shape(heading);
            slide.add_shape(body);
            presentation.add_slide(slide);
        }
        let mut slide = Slide::new(3);
        let mut selected = Shape::new(ElementType::Shape);
        selected
            .runs
            .push(TextRun::new("Agenda", TextStyle::default()));
        slide.add_shape(selected);
        presentation.add_slide(slide);

        let selection = SelectionContext::from_presentation(&presentation, 2, 0).unwrap();
        let prediction = predict_font_size_runs(&presentation, &selection).unwrap();
        assert_eq!(prediction, AttrValue::Number(32.0));
    }

    #[test]
    fn test_selection_out_of_range() {
        let presentation = Presentation::new("deck.pptx");
        let result = SelectionContext::from_presentation(&presentation, 0, 0);
        assert!(matches!(
            result,
            Err(Error::SelectionOutOfRange { slide: 0, element: 0 })
        ));
    }
}
