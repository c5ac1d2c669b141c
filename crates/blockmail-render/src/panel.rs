//! The property panel for the selected block.
//!
//! Controls are listed in display order: kind-specific controls first, then
//! alignment, font size and text color for text-like kinds, then top and
//! bottom spacing for every kind. Each control carries the [`FieldPath`] it
//! edits, so a front end feeds user input straight back into
//! `Editor::update_field`.

use blockmail_core::{Block, BlockContent, Document, FieldPath, FieldValue, NumericRange};

pub const NO_SELECTION_SUBTITLE: &str = "Select a block to edit its properties.";
pub const NO_SELECTION_MESSAGE: &str =
    "No block selected. Click a block in the email preview to start editing.";
pub const HELP_TEXT: &str = "Changes are applied instantly and auto-saved.";

/// What kind of widget edits a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Text,
    TextArea,
    /// Formatted text; the value is the HTML (or plain text if none)
    RichText,
    Color,
    Number { min: i64, max: Option<i64> },
    /// URL input plus file upload
    Image,
    Alignment,
}

impl From<NumericRange> for ControlKind {
    fn from(range: NumericRange) -> Self {
        ControlKind::Number {
            min: range.min,
            max: range.max,
        }
    }
}

/// One editable field.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub label: &'static str,
    pub path: FieldPath,
    pub kind: ControlKind,
    pub value: FieldValue,
}

impl Control {
    fn content(label: &'static str, name: &str, kind: ControlKind, value: impl Into<FieldValue>) -> Self {
        Self {
            label,
            path: FieldPath::content(name),
            kind,
            value: value.into(),
        }
    }

    fn style(label: &'static str, name: &str, kind: ControlKind, value: impl Into<FieldValue>) -> Self {
        Self {
            label,
            path: FieldPath::style(name),
            kind,
            value: value.into(),
        }
    }
}

/// The panel contents.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub subtitle: String,
    pub controls: Vec<Control>,
    /// Set only when nothing is selected
    pub empty_message: Option<&'static str>,
    pub help: Option<&'static str>,
}

impl Panel {
    pub fn control(&self, path: &FieldPath) -> Option<&Control> {
        self.controls.iter().find(|c| &c.path == path)
    }
}

/// Builds the panel for the document's selected block.
pub fn settings_for(document: &Document) -> Panel {
    match document.selected_block() {
        Some(block) => Panel {
            subtitle: format!("Editing {} block", block.kind()),
            controls: controls_for(block),
            empty_message: None,
            help: Some(HELP_TEXT),
        },
        None => Panel {
            subtitle: NO_SELECTION_SUBTITLE.to_string(),
            controls: Vec::new(),
            empty_message: Some(NO_SELECTION_MESSAGE),
            help: None,
        },
    }
}

/// Lists the controls for one block.
pub fn controls_for(block: &Block) -> Vec<Control> {
    use ControlKind::*;

    let mut controls = match block.content() {
        BlockContent::Title(c) | BlockContent::Subtitle(c) | BlockContent::Paragraph(c) => {
            let value = c.rich_html().unwrap_or(c.text.as_str());
            vec![Control::content("Content", "html", RichText, value)]
        }
        BlockContent::Image(c) => vec![
            Control::content("Image", "src", Image, c.src.as_str()),
            Control::content("Alt text", "alt", Text, c.alt.as_str()),
            Control::content("Width (%)", "width", NumericRange::IMAGE_WIDTH.into(), c.width),
        ],
        BlockContent::Button(c) => vec![
            Control::content("Button text", "text", Text, c.text.as_str()),
            Control::content("URL", "url", Text, c.url.as_str()),
            Control::content("Background", "backgroundColor", Color, c.background_color.as_str()),
            Control::content("Text color", "textColor", Color, c.text_color.as_str()),
            Control::content(
                "Border radius (px)",
                "borderRadius",
                NumericRange::BORDER_RADIUS.into(),
                c.border_radius,
            ),
        ],
        BlockContent::Header(c) => vec![
            Control::content("Logo", "logo", Image, c.logo.as_str()),
            Control::content("Background color", "backgroundColor", Color, c.background_color.as_str()),
        ],
        BlockContent::Hero(c) => vec![
            Control::content("Title", "title", Text, c.title.as_str()),
            Control::content("Subtitle", "subtitle", Text, c.subtitle.as_str()),
            Control::content("Button text", "buttonText", Text, c.button_text.as_str()),
            Control::content("Button URL", "buttonUrl", Text, c.button_url.as_str()),
            Control::content("Background Image", "backgroundImage", Image, c.background_image.as_str()),
            Control::content("Background color", "backgroundColor", Color, c.background_color.as_str()),
        ],
        BlockContent::Cta(c) => vec![
            Control::content("Title", "title", Text, c.title.as_str()),
            Control::content("Text", "text", Text, c.text.as_str()),
            Control::content("Button text", "buttonText", Text, c.button_text.as_str()),
            Control::content("Button URL", "buttonUrl", Text, c.button_url.as_str()),
            Control::content("Background color", "backgroundColor", Color, c.background_color.as_str()),
            Control::content("Text color", "textColor", Color, c.text_color.as_str()),
        ],
        BlockContent::Footer(c) => vec![
            Control::content("Contact info", "contactInfo", TextArea, c.contact_info.as_str()),
            Control::content("Unsubscribe text", "unsubscribeText", Text, c.unsubscribe_text.as_str()),
            Control::content("Unsubscribe URL", "unsubscribeUrl", Text, c.unsubscribe_url.as_str()),
            Control::content("Background color", "backgroundColor", Color, c.background_color.as_str()),
            Control::content("Text color", "textColor", Color, c.text_color.as_str()),
        ],
        BlockContent::Section(c) => vec![
            Control::content("Padding (px)", "padding", NumericRange::NON_NEGATIVE.into(), c.padding),
            Control::content("Background Image", "backgroundImage", Image, c.background_image.as_str()),
            Control::content("Background color", "backgroundColor", Color, c.background_color.as_str()),
        ],
        BlockContent::TwoColumn(c) => vec![
            Control::content("Padding (px)", "padding", NumericRange::NON_NEGATIVE.into(), c.padding),
            Control::content("Background Image", "backgroundImage", Image, c.background_image.as_str()),
            Control::content("Background color", "backgroundColor", Color, c.background_color.as_str()),
            Control::content("Gap (px)", "gap", NumericRange::NON_NEGATIVE.into(), c.gap),
        ],
    };

    let style = block.style();
    if block.kind().has_text_style() {
        controls.push(Control::style("Alignment", "align", Alignment, style.align.as_str()));
        controls.push(Control::style(
            "Font size (px)",
            "fontSize",
            NumericRange::FONT_SIZE.into(),
            style.font_size,
        ));
        controls.push(Control::style("Text color", "color", Color, style.color.as_str()));
    }
    controls.push(Control::style(
        "Top space (px)",
        "marginTop",
        NumericRange::MARGIN.into(),
        style.margin_top,
    ));
    controls.push(Control::style(
        "Bottom space (px)",
        "marginBottom",
        NumericRange::MARGIN.into(),
        style.margin_bottom,
    ));
    controls
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockmail_core::BlockKind;

    fn selected_doc(kind: BlockKind) -> Document {
        Document::from_blocks(vec![Block::new(kind)]).unwrap()
    }

    fn labels(panel: &Panel) -> Vec<&'static str> {
        panel.controls.iter().map(|c| c.label).collect()
    }

    #[test]
    fn test_no_selection() {
        let panel = settings_for(&Document::new());
        assert_eq!(panel.subtitle, NO_SELECTION_SUBTITLE);
        assert!(panel.controls.is_empty());
        assert_eq!(panel.empty_message, Some(NO_SELECTION_MESSAGE));
    }

    #[test]
    fn test_button_controls() {
        let panel = settings_for(&selected_doc(BlockKind::Button));
        assert_eq!(panel.subtitle, "Editing button block");
        assert_eq!(
            labels(&panel),
            [
                "Button text",
                "URL",
                "Background",
                "Text color",
                "Border radius (px)",
                "Alignment",
                "Font size (px)",
                "Text color",
                "Top space (px)",
                "Bottom space (px)",
            ]
        );

        let radius = panel.control(&FieldPath::content("borderRadius")).unwrap();
        assert_eq!(radius.kind, ControlKind::Number { min: 0, max: Some(60) });
        assert_eq!(radius.value, FieldValue::Number(999));
    }

    #[test]
    fn test_image_has_no_text_style() {
        let panel = settings_for(&selected_doc(BlockKind::Image));
        assert!(panel.control(&FieldPath::style("align")).is_none());
        assert!(panel.control(&FieldPath::style("marginTop")).is_some());
    }

    #[test]
    fn test_text_blocks_use_rich_editor() {
        let panel = settings_for(&selected_doc(BlockKind::Paragraph));
        let first = &panel.controls[0];
        assert_eq!(first.kind, ControlKind::RichText);
        assert_eq!(first.path, FieldPath::content("html"));
        assert!(panel.control(&FieldPath::style("fontSize")).is_some());
    }

    #[test]
    fn test_plain_text_edit_replaces_rich_content() {
        let mut doc = selected_doc(BlockKind::Paragraph);
        let id = doc.blocks()[0].id().clone();
        let content = FieldPath::content("html");
        doc.update_field(&id, &content, "<b>Old</b>".into()).unwrap();
        doc.update_field(&id, &FieldPath::content("text"), "New".into())
            .unwrap();

        let control = settings_for(&doc).controls.remove(0);
        assert_eq!(control.value, FieldValue::Text("New".to_string()));
        let surface = crate::surface::project(&doc);
        assert!(matches!(
            &surface.cards[0].view,
            crate::surface::BlockView::Text { html, .. } if html == "New"
        ));

        // Committing the control as shown must not bring the old markup back.
        doc.update_field(&id, &control.path, control.value).unwrap();
        let text = doc.blocks()[0].content().as_text().unwrap();
        assert_eq!(text.text, "New");
        assert!(!text.text.contains("Old"));
    }

    #[test]
    fn test_two_column_has_gap() {
        let panel = settings_for(&selected_doc(BlockKind::TwoColumn));
        assert!(panel.control(&FieldPath::content("gap")).is_some());
        let section = settings_for(&selected_doc(BlockKind::Section));
        assert!(section.control(&FieldPath::content("gap")).is_none());
    }

    #[test]
    fn test_every_control_path_is_editable() {
        for kind in BlockKind::ALL {
            let mut doc = selected_doc(kind);
            let id = doc.blocks()[0].id().clone();
            for control in settings_for(&doc.clone()).controls {
                doc.update_field(&id, &control.path, control.value.clone())
                    .unwrap_or_else(|e| panic!("{kind} {}: {e}", control.path));
            }
        }
    }
}
