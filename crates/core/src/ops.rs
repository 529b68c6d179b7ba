//! Bulk text-formatting operations and master-mimic layout utilities.
//!
//! These are plain iteration-and-mutation helpers over a slide's elements;
//! the prediction engine lives in [`crate::tree`] and [`crate::predict`].

use crate::error::{Error, Result};
use crate::types::{ParagraphAlignment, Presentation, Slide, TextStyle};

/// Set bold on every run of every shape of the slide.
pub fn set_bold(slide: &mut Slide, value: bool) {
    for_each_style(slide, |style| style.bold = value.into());
}

/// Set italic on every run of every shape of the slide.
pub fn set_italic(slide: &mut Slide, value: bool) {
    for_each_style(slide, |style| style.italic = value.into());
}

/// Set underline on every run of every shape of the slide.
pub fn set_underline(slide: &mut Slide, value: bool) {
    for_each_style(slide, |style| style.underline = value.into());
}

/// Set the font size (points) on every run of every shape of the slide.
pub fn set_font_size(slide: &mut Slide, size: f64) {
    for_each_style(slide, |style| style.font_size = Some(size));
}

/// Set the font family on every run of every shape of the slide.
pub fn set_font_family(slide: &mut Slide, family: &str) {
    for_each_style(slide, |style| style.font_family = Some(family.to_string()));
}

/// Set the foreground color on every run of every shape of the slide.
pub fn set_fg_color(slide: &mut Slide, color: &str) {
    for_each_style(slide, |style| style.fg_color = Some(color.to_string()));
}

/// Set the background color on every run of every shape of the slide.
pub fn set_bg_color(slide: &mut Slide, color: &str) {
    for_each_style(slide, |style| style.bg_color = Some(color.to_string()));
}

/// Left-align the text of every shape of the slide.
pub fn align_paragraphs_start(slide: &mut Slide) {
    for shape in &mut slide.shapes {
        shape.alignment = Some(ParagraphAlignment::Start);
    }
}

/// Give every element of the slide the width of its widest element and the
/// left edge of its leftmost one.
pub fn resize_and_position(slide: &mut Slide) {
    let mut widest: Option<f64> = None;
    let mut leftmost: Option<f64> = None;
    for shape in &slide.shapes {
        if let Some(width) = shape.width {
            if widest.map_or(true, |current| width > current) {
                widest = Some(width);
            }
        }
        if let Some(left) = shape.left {
            if leftmost.map_or(true, |current| left < current) {
                leftmost = Some(left);
            }
        }
    }
    for shape in &mut slide.shapes {
        if widest.is_some() {
            shape.width = widest;
        }
        if leftmost.is_some() {
            shape.left = leftmost;
        }
    }
}

/// Copy the master's per-placeholder paragraph alignments onto the slide's
/// elements, pairwise in enumeration order.
pub fn align_like_master(presentation: &mut Presentation, slide_index: usize) -> Result<()> {
    let master = presentation.master.as_ref().ok_or(Error::MissingMaster)?;
    let alignments: Vec<Option<ParagraphAlignment>> =
        master.placeholders.iter().map(|p| p.alignment).collect();

    let slide = slide_mut(presentation, slide_index)?;
    for (shape, alignment) in slide.shapes.iter_mut().zip(alignments) {
        if alignment.is_some() {
            shape.alignment = alignment;
        }
    }
    Ok(())
}

/// Copy the master's placeholder geometry (left, height, top, width) onto
/// the slide's elements, pairwise in enumeration order. Elements beyond
/// the master's placeholder count are untouched.
pub fn layout_like_master(presentation: &mut Presentation, slide_index: usize) -> Result<()> {
    let master = presentation.master.as_ref().ok_or(Error::MissingMaster)?;
    let layouts: Vec<(Option<f64>, Option<f64>, Option<f64>, Option<f64>)> = master
        .placeholders
        .iter()
        .map(|p| (p.left, p.height, p.top, p.width))
        .collect();

    let slide = slide_mut(presentation, slide_index)?;
    for (shape, (left, height, top, width)) in slide.shapes.iter_mut().zip(layouts) {
        if left.is_some() {
            shape.left = left;
        }
        if height.is_some() {
            shape.height = height;
        }
        if top.is_some() {
            shape.top = top;
        }
        if width.is_some() {
            shape.width = width;
        }
    }
    Ok(())
}

fn slide_mut(presentation: &mut Presentation, slide_index: usize) -> Result<&mut Slide> {
    presentation
        .slides
        .get_mut(slide_index)
        .ok_or(Error::SelectionOutOfRange {
            slide: slide_index,
            element: 0,
        })
}

fn for_each_style(slide: &mut Slide, mut apply: impl FnMut(&mut TextStyle)) {
    for shape in &mut slide.shapes {
        for run in &mut shape.runs {
            apply(&mut run.style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ElementType, Master, Placeholder, Shape, TextRun, TriState};

    fn two_run_slide() -> Slide {
        let mut slide = Slide::new(1);
        let mut shape = Shape::new(ElementType::Shape);
        shape.runs.push(TextRun::new("one ", TextStyle::default()));
        shape.runs.push(TextRun::new("two", TextStyle::default()));
        slide.add_shape(shape);
        slide
    }

    #[test]
    fn test_set_bold_touches_every_run() {
        let mut slide = two_run_slide();
        set_bold(&mut slide, true);
        for run in &slide.shapes[0].runs {
            assert_eq!(run.style.bold, TriState::True);
        }
        set_bold(&mut slide, false);
        for run in &slide.shapes[0].runs {
            assert_eq!(run.style.bold, TriState::False);
        }
    }

    #[test]
    fn test_set_font_fields() {
        let mut slide = two_run_slide();
        set_font_size(&mut slide, 28.0);
        set_font_family(&mut slide, "Georgia");
        set_fg_color(&mut slide, "FF0000");

        let style = &slide.shapes[0].runs[0].style;
        assert_eq!(style.font_size, Some(28.0));
        assert_eq!(style.font_family.as_deref(), Some("Georgia"));
        assert_eq!(style.fg_color.as_deref(), Some("FF0000"));
    }

    #[test]
    fn test_resize_and_position_uses_widest_and_leftmost() {
        let mut slide = Slide::new(1);
        for (width, left) in [(300.0, 120.0), (500.0, 48.0), (200.0, 96.0)] {
            let mut shape = Shape::new(ElementType::Shape);
            shape.width = Some(width);
            shape.left = Some(left);
            slide.add_shape(shape);
        }

        resize_and_position(&mut slide);
        for shape in &slide.shapes {
            assert_eq!(shape.width, Some(500.0));
            assert_eq!(shape.left, Some(48.0));
        }
    }

    #[test]
    fn test_align_paragraphs_start() {
        let mut slide = two_run_slide();
        align_paragraphs_start(&mut slide);
        assert_eq!(slide.shapes[0].alignment, Some(ParagraphAlignment::Start));
    }

    fn master_with_placeholders() -> Master {
        Master {
            placeholders: vec![
                Placeholder {
                    left: Some(48.0),
                    top: Some(30.0),
                    width: Some(620.0),
                    height: Some(90.0),
                    alignment: Some(ParagraphAlignment::Center),
                },
                Placeholder {
                    left: Some(48.0),
                    top: Some(140.0),
                    width: Some(620.0),
                    height: Some(340.0),
                    alignment: Some(ParagraphAlignment::Start),
                },
            ],
        }
    }

    #[test]
    fn test_layout_like_master_copies_pairwise() {
        let mut presentation = Presentation::new("deck.pptx");
        let mut slide = Slide::new(1);
        for _ in 0..3 {
            let mut shape = Shape::new(ElementType::Shape);
            shape.left = Some(999.0);
            shape.top = Some(999.0);
            slide.add_shape(shape);
        }
        presentation.add_slide(slide);
        presentation.master = Some(master_with_placeholders());

        layout_like_master(&mut presentation, 0).unwrap();

        let shapes = &presentation.slides[0].shapes;
        assert_eq!(shapes[0].top, Some(30.0));
        assert_eq!(shapes[1].top, Some(140.0));
        // Third element has no matching placeholder and keeps its layout.
        assert_eq!(shapes[2].top, Some(999.0));
    }

    #[test]
    fn test_align_like_master_copies_alignments() {
        let mut presentation = Presentation::new("deck.pptx");
        let mut slide = Slide::new(1);
        slide.add_shape(Shape::new(ElementType::Shape));
        slide.add_shape(Shape::new(ElementType::Shape));
        presentation.add_slide(slide);
        presentation.master = Some(master_with_placeholders());

        align_like_master(&mut presentation, 0).unwrap();

        let shapes = &presentation.slides[0].shapes;
        assert_eq!(shapes[0].alignment, Some(ParagraphAlignment::Center));
        assert_eq!(shapes[1].alignment, Some(ParagraphAlignment::Start));
    }

    #[test]
    fn test_master_ops_require_a_master() {
        let mut presentation = Presentation::new("deck.pptx");
        presentation.add_slide(Slide::new(1));
        assert!(matches!(
            align_like_master(&mut presentation, 0),
            Err(Error::MissingMaster)
        ));
        assert!(matches!(
            layout_like_master(&mut presentation, 0),
            Err(Error::MissingMaster)
        ));
    }
}
