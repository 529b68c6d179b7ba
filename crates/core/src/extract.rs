//! Feature record extraction from a bounded prefix of slides.
//!
//! Training data for a prediction is drawn from the slides that precede the
//! selection, so the selection's own (not yet finalized) record can never
//! leak into its own training set.

use crate::record::{Attribute, AttributeRecord};
use crate::types::{ElementType, Presentation};

/// Minimum literal length for a text run to produce a record.
pub const MIN_RUN_LEN: usize = 2;

/// Whether records are emitted one per element or one per text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// One record per shape, with the shape's merged style.
    Element,
    /// One record per text run of length >= [`MIN_RUN_LEN`], with the run's
    /// own style and the parent shape's geometry.
    Run,
}

/// Walk the slides with index < `before_slide` (0-based) and emit one
/// record per qualifying shape-type element, in presentation order.
///
/// When `target` names the attribute about to be predicted, records without
/// a determinate value for it are dropped; a missing label teaches the tree
/// nothing. A pure read: two calls with unchanged input yield identical
/// sequences.
pub fn extract_records(
    presentation: &Presentation,
    before_slide: usize,
    granularity: Granularity,
    target: Option<Attribute>,
) -> Vec<AttributeRecord> {
    let mut records = Vec::new();
    for slide in presentation.slides.iter().take(before_slide) {
        let already = records.len();
        for shape in &slide.shapes {
            if shape.element_type != ElementType::Shape {
                continue;
            }
            match granularity {
                Granularity::Element => {
                    push_record(&mut records, AttributeRecord::from_shape(shape), target);
                }
                Granularity::Run => {
                    for run in &shape.runs {
                        if run.text.chars().count() < MIN_RUN_LEN {
                            continue;
                        }
                        push_record(&mut records, AttributeRecord::from_run(shape, run), target);
                    }
                }
            }
        }
        log::debug!(
            "slide {}: {} training records",
            slide.number,
            records.len() - already
        );
    }
    records
}

fn push_record(
    records: &mut Vec<AttributeRecord>,
    record: AttributeRecord,
    target: Option<Attribute>,
) {
    if let Some(attr) = target {
        if record.get(attr).is_unset() {
            return;
        }
    }
    records.push(record);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Shape, Slide, TextRun, TextStyle, TriState};

    fn shape_with_size(size: Option<f64>) -> Shape {
        let mut shape = Shape::new(ElementType::Shape);
        shape.runs.push(TextRun::new(
            "Some text",
            TextStyle {
                bold: TriState::True,
                font_size: size,
                ..TextStyle::default()
            },
        ));
        shape
    }

    fn three_slide_deck() -> Presentation {
        let mut presentation = Presentation::new("deck.pptx");
        for number in 1..=3 {
            let mut slide = Slide::new(number);
            slide.add_shape(shape_with_size(Some(12.0 + number as f64)));
            presentation.add_slide(slide);
        }
        presentation
    }

    #[test]
    fn test_scope_excludes_current_and_later_slides() {
        let presentation = three_slide_deck();
        let records = extract_records(&presentation, 2, Granularity::Element, None);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].font_size, Some(13.0));
        assert_eq!(records[1].font_size, Some(14.0));
    }

    #[test]
    fn test_zero_scope_yields_no_records() {
        let presentation = three_slide_deck();
        let records = extract_records(&presentation, 0, Granularity::Element, None);
        assert!(records.is_empty());
    }

    #[test]
    fn test_non_shape_elements_are_filtered() {
        let mut presentation = Presentation::new("deck.pptx");
        let mut slide = Slide::new(1);
        slide.add_shape(Shape::new(ElementType::Picture));
        slide.add_shape(shape_with_size(Some(20.0)));
        presentation.add_slide(slide);

        let records = extract_records(&presentation, 1, Granularity::Element, None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].element_type, Some(ElementType::Shape));
    }

    #[test]
    fn test_records_without_target_value_are_dropped() {
        let mut presentation = Presentation::new("deck.pptx");
        let mut slide = Slide::new(1);
        slide.add_shape(shape_with_size(None));
        slide.add_shape(shape_with_size(Some(24.0)));
        presentation.add_slide(slide);

        let all = extract_records(&presentation, 1, Granularity::Element, None);
        assert_eq!(all.len(), 2);

        let labelled = extract_records(
            &presentation,
            1,
            Granularity::Element,
            Some(Attribute::FontSize),
        );
        assert_eq!(labelled.len(), 1);
        assert_eq!(labelled[0].font_size, Some(24.0));
    }

    #[test]
    fn test_run_granularity_skips_short_runs() {
        let mut presentation = Presentation::new("deck.pptx");
        let mut slide = Slide::new(1);
        let mut shape = Shape::new(ElementType::Shape);
        shape.runs.push(TextRun::new("A", TextStyle::default()));
        shape.runs.push(TextRun::new("longer run", TextStyle::default()));
        slide.add_shape(shape);
        presentation.add_slide(slide);

        let records = extract_records(&presentation, 1, Granularity::Run, None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].run.as_deref(), Some("longer run"));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let presentation = three_slide_deck();
        let first = extract_records(&presentation, 3, Granularity::Element, None);
        let second = extract_records(&presentation, 3, Granularity::Element, None);
        assert_eq!(first, second);
    }
}
