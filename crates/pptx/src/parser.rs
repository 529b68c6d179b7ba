//! PPTX file parser implementation.
//!
//! Walks the slide XML for shape geometry (`a:off`/`a:ext`, converted from
//! EMU to points), per-run text styles (`a:rPr`), paragraph alignment, and
//! the first slide master's placeholders.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slides_core::{
    ElementType, Error, Master, ParagraphAlignment, Placeholder, Presentation, Result, Shape,
    Slide, TextRun, TextStyle, TriState,
};
use std::io::{Read, Seek};
use zip::ZipArchive;

/// English Metric Units per typographic point.
const EMU_PER_POINT: f64 = 12700.0;

/// Archive path of the first slide master.
const MASTER_PATH: &str = "ppt/slideMasters/slideMaster1.xml";

/// Whether the bytes begin with the ZIP magic all PPTX files carry.
pub fn looks_like_pptx(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04])
}

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PPTX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R, filename: &str) -> Result<Presentation> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut presentation = Presentation::new(filename);

        // Get the slide order from the presentation relationships.
        let slide_order = self.get_slide_order(&mut archive)?;

        for (idx, slide_path) in slide_order.iter().enumerate() {
            let content = self.read_file_from_archive(&mut archive, slide_path)?;
            let mut slide = Slide::new(idx + 1);
            for parsed in extract_shapes_from_xml(&content)? {
                slide.add_shape(parsed.shape);
            }
            log::debug!("slide {}: {} elements", idx + 1, slide.shapes.len());
            presentation.add_slide(slide);
        }

        presentation.master = self.parse_master(&mut archive)?;

        Ok(presentation)
    }

    /// Get the ordered list of slide paths from the presentation relationships.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_path = "ppt/_rels/presentation.xml.rels";
        let rels_content = self.read_file_from_archive(archive, rels_path)?;

        let mut slides: Vec<(String, Option<usize>)> = Vec::new();
        let mut reader = Reader::from_str(&rels_content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let rel_type = attr_string(e, b"Type").unwrap_or_default();
                    let target = attr_string(e, b"Target").unwrap_or_default();
                    let id = attr_string(e, b"Id").unwrap_or_default();

                    // Slide relationships only, not layouts or masters.
                    if rel_type.contains("/slide")
                        && !rel_type.contains("slideLayout")
                        && !rel_type.contains("slideMaster")
                    {
                        let order_num =
                            extract_slide_number(&id).or_else(|| extract_slide_number(&target));
                        let full_path = if let Some(stripped) = target.strip_prefix('/') {
                            stripped.to_string()
                        } else {
                            format!("ppt/{}", target)
                        };
                        slides.push((full_path, order_num));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Parse the first slide master's placeholders, if the archive has one.
    fn parse_master<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Option<Master>> {
        let content = match self.read_file_from_archive(archive, MASTER_PATH) {
            Ok(content) => content,
            Err(_) => {
                log::debug!("no slide master at {}", MASTER_PATH);
                return Ok(None);
            }
        };

        let placeholders: Vec<Placeholder> = extract_shapes_from_xml(&content)?
            .into_iter()
            .filter(|parsed| parsed.is_placeholder)
            .map(|parsed| Placeholder {
                left: parsed.shape.left,
                top: parsed.shape.top,
                width: parsed.shape.width,
                height: parsed.shape.height,
                alignment: parsed.shape.alignment,
            })
            .collect();

        log::debug!("master: {} placeholders", placeholders.len());
        Ok(Some(Master { placeholders }))
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// A shape pulled out of slide or master XML.
#[derive(Debug)]
struct ParsedShape {
    shape: Shape,
    /// Whether the shape carried a `p:ph` placeholder marker.
    is_placeholder: bool,
}

/// Which color slot an `a:srgbClr`/`a:schemeClr` inside run properties
/// belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FillTarget {
    None,
    Foreground,
    Background,
}

/// Extract shapes with geometry, alignment, and styled runs from slide (or
/// master) XML.
fn extract_shapes_from_xml(xml_content: &str) -> Result<Vec<ParsedShape>> {
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);

    let mut shapes: Vec<ParsedShape> = Vec::new();
    let mut current: Option<ParsedShape> = None;
    let mut in_text_body = false;
    let mut in_run = false;
    let mut in_run_props = false;
    let mut in_text = false;
    let mut fill = FillTarget::None;
    let mut run_style = TextStyle::default();
    let mut run_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => current = Some(ParsedShape {
                    shape: Shape::new(ElementType::Shape),
                    is_placeholder: false,
                }),
                b"pic" => current = Some(ParsedShape {
                    shape: Shape::new(ElementType::Picture),
                    is_placeholder: false,
                }),
                b"txBody" => in_text_body = true,
                b"r" if in_text_body => {
                    in_run = true;
                    in_run_props = false;
                    run_style = TextStyle::default();
                    run_text.clear();
                }
                b"rPr" if in_run => {
                    in_run_props = true;
                    apply_run_props(e, &mut run_style);
                }
                b"solidFill" if in_run_props => fill = FillTarget::Foreground,
                b"highlight" if in_run_props => fill = FillTarget::Background,
                b"t" if in_run => in_text = true,
                other => apply_value_element(other, e, current.as_mut(), &mut run_style, in_run_props, fill),
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"rPr" if in_run => apply_run_props(e, &mut run_style),
                other => apply_value_element(other, e, current.as_mut(), &mut run_style, in_run_props, fill),
            },
            Ok(Event::Text(ref e)) => {
                if in_text {
                    let text = e.unescape().unwrap_or_default();
                    run_text.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" | b"pic" => {
                    if let Some(parsed) = current.take() {
                        shapes.push(parsed);
                    }
                    in_text_body = false;
                    in_run = false;
                    in_run_props = false;
                    in_text = false;
                    fill = FillTarget::None;
                }
                b"txBody" => in_text_body = false,
                b"r" => {
                    if in_run {
                        if !run_text.is_empty() {
                            if let Some(parsed) = current.as_mut() {
                                parsed
                                    .shape
                                    .runs
                                    .push(TextRun::new(run_text.clone(), run_style.clone()));
                            }
                        }
                        in_run = false;
                        run_text.clear();
                    }
                }
                b"rPr" => in_run_props = false,
                b"solidFill" | b"highlight" => fill = FillTarget::None,
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("XML parsing error (continuing): {}", e);
                // Continue parsing despite errors
            }
            _ => {}
        }
    }

    Ok(shapes)
}

/// Handle the attribute-bearing elements that carry values rather than
/// open a parsing context: geometry, placeholder markers, paragraph
/// alignment, fonts, and colors.
fn apply_value_element(
    name: &[u8],
    e: &BytesStart,
    current: Option<&mut ParsedShape>,
    run_style: &mut TextStyle,
    in_run_props: bool,
    fill: FillTarget,
) {
    let parsed = match current {
        Some(parsed) => parsed,
        None => return,
    };
    match name {
        b"off" => {
            if let Some(x) = attr_points(e, b"x") {
                parsed.shape.left = Some(x);
            }
            if let Some(y) = attr_points(e, b"y") {
                parsed.shape.top = Some(y);
            }
        }
        b"ext" => {
            if let Some(cx) = attr_points(e, b"cx") {
                parsed.shape.width = Some(cx);
            }
            if let Some(cy) = attr_points(e, b"cy") {
                parsed.shape.height = Some(cy);
            }
        }
        b"ph" => parsed.is_placeholder = true,
        b"pPr" => {
            // First paragraph's alignment stands for the shape.
            if parsed.shape.alignment.is_none() {
                parsed.shape.alignment = attr_string(e, b"algn").and_then(parse_alignment);
            }
        }
        b"latin" if in_run_props => {
            if let Some(typeface) = attr_string(e, b"typeface") {
                run_style.font_family = Some(typeface);
            }
        }
        b"srgbClr" | b"schemeClr" => match fill {
            FillTarget::Foreground => {
                if let Some(val) = attr_string(e, b"val") {
                    run_style.fg_color = Some(val);
                }
            }
            FillTarget::Background => {
                if let Some(val) = attr_string(e, b"val") {
                    run_style.bg_color = Some(val);
                }
            }
            FillTarget::None => {}
        },
        _ => {}
    }
}

/// Copy `a:rPr` attributes (b, i, u, sz) onto a run style. Absent
/// attributes stay unset.
fn apply_run_props(e: &BytesStart, style: &mut TextStyle) {
    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value).to_string();
        match local_name(attr.key.as_ref()) {
            b"b" => style.bold = parse_ooxml_bool(&value),
            b"i" => style.italic = parse_ooxml_bool(&value),
            b"u" => {
                style.underline = if value == "none" {
                    TriState::False
                } else {
                    TriState::True
                };
            }
            b"sz" => {
                // Font size is serialized in hundredths of a point.
                if let Ok(hundredths) = value.parse::<f64>() {
                    style.font_size = Some(hundredths / 100.0);
                }
            }
            _ => {}
        }
    }
}

fn parse_ooxml_bool(value: &str) -> TriState {
    match value {
        "1" | "true" | "on" => TriState::True,
        "0" | "false" | "off" => TriState::False,
        _ => TriState::Unset,
    }
}

fn parse_alignment(value: String) -> Option<ParagraphAlignment> {
    match value.as_str() {
        "l" => Some(ParagraphAlignment::Start),
        "ctr" => Some(ParagraphAlignment::Center),
        "r" => Some(ParagraphAlignment::End),
        "just" => Some(ParagraphAlignment::Justify),
        _ => None,
    }
}

/// Read an attribute by local name.
fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| local_name(attr.key.as_ref()) == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Read an EMU attribute and convert it to points.
fn attr_points(e: &BytesStart, key: &[u8]) -> Option<f64> {
    attr_string(e, key)
        .and_then(|value| value.parse::<f64>().ok())
        .map(|emu| emu / EMU_PER_POINT)
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
