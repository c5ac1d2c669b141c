//! The editable surface: one card per block.
//!
//! A `Surface` is a description, not markup. A front end walks the cards
//! and paints them however its toolkit likes. String fields ending in
//! `_html`, and every string inside a [`BlockView`], are already safe to
//! inject as HTML: plain text is escaped, rich text is passed through.

use blockmail_core::{Align, Block, BlockContent, BlockId, BlockKind, Document};

use crate::{or, resolved_text, text};

/// Shown on the canvas when the document has no blocks.
pub const EMPTY_CANVAS_MESSAGE: &str =
    "Your email is empty. Add a block from the sidebar to get started.";

/// Shown in an image card without a source.
pub const EMPTY_IMAGE_MESSAGE: &str = "No image selected. Click to edit and add an image.";

/// The whole canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub cards: Vec<BlockCard>,
    /// Set only when there are no cards
    pub empty_message: Option<&'static str>,
}

impl Surface {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn selected(&self) -> Option<&BlockCard> {
        self.cards.iter().find(|card| card.selected)
    }
}

/// One block on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockCard {
    pub id: BlockId,
    pub kind: BlockKind,
    /// Upper-case kind name, e.g. `TWO COLUMN`
    pub label: String,
    pub selected: bool,
    pub view: BlockView,
}

/// Typography shared by the text-like views.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLook {
    pub font_size: u32,
    pub font_weight: Option<u16>,
    pub line_height: Option<f32>,
    pub color: String,
    pub align: Align,
    pub margin_top: u32,
    pub margin_bottom: u32,
}

/// What a card shows, per block kind.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockView {
    /// Title, subtitle, paragraph
    Text { html: String, look: TextLook },
    Image {
        /// `None` shows [`EMPTY_IMAGE_MESSAGE`] instead
        src: Option<String>,
        alt: String,
        width_percent: u32,
        /// `Alt: ...` line under the picture
        caption: Option<String>,
        placeholder: Option<&'static str>,
    },
    Button {
        label: String,
        background_color: String,
        text_color: String,
        border_radius: u32,
    },
    Header {
        /// Logo URL, or `None` for the "Logo" placeholder
        logo: Option<String>,
        placeholder: &'static str,
        background_color: String,
    },
    Hero {
        title: String,
        subtitle: String,
        button_text: String,
        background_color: String,
        background_image: Option<String>,
    },
    Cta {
        title: String,
        text: String,
        button_text: String,
        background_color: String,
        text_color: String,
    },
    Footer {
        contact_info: String,
        unsubscribe_text: String,
        unsubscribe_url: String,
        background_color: String,
        text_color: String,
    },
    /// Section and two-column: layout only, children are not shown
    Container {
        label: &'static str,
        padding: u32,
        gap: Option<u32>,
        background_color: Option<String>,
        background_image: Option<String>,
    },
}

/// Projects a document onto the canvas.
pub fn project(document: &Document) -> Surface {
    let selected = document.selected();
    let cards: Vec<BlockCard> = document
        .blocks()
        .iter()
        .map(|block| card_for(block, selected == Some(block.id())))
        .collect();

    Surface {
        empty_message: cards.is_empty().then_some(EMPTY_CANVAS_MESSAGE),
        cards,
    }
}

fn card_for(block: &Block, selected: bool) -> BlockCard {
    BlockCard {
        id: block.id().clone(),
        kind: block.kind(),
        label: block.kind().label(),
        selected,
        view: view_for(block),
    }
}

/// Builds the view for a single block.
pub fn view_for(block: &Block) -> BlockView {
    let style = block.style();
    let look = |font_weight: Option<u16>, line_height: Option<f32>| TextLook {
        font_size: style.font_size,
        font_weight,
        line_height,
        color: style.color.clone(),
        align: style.align,
        margin_top: style.margin_top,
        margin_bottom: style.margin_bottom,
    };

    match block.content() {
        BlockContent::Title(c) => BlockView::Text {
            html: resolved_text(c),
            look: look(Some(600), None),
        },
        BlockContent::Subtitle(c) => BlockView::Text {
            html: resolved_text(c),
            look: look(Some(500), None),
        },
        BlockContent::Paragraph(c) => BlockView::Text {
            html: resolved_text(c),
            look: look(None, Some(1.6)),
        },
        BlockContent::Image(c) => {
            let has_src = !c.src.is_empty();
            BlockView::Image {
                src: has_src.then(|| c.src.clone()),
                alt: text(or(&c.alt, "Image")),
                width_percent: c.width,
                caption: (has_src && !c.alt.is_empty()).then(|| format!("Alt: {}", text(&c.alt))),
                placeholder: (!has_src).then_some(EMPTY_IMAGE_MESSAGE),
            }
        }
        BlockContent::Button(c) => BlockView::Button {
            label: text(or(&c.text, "Button")),
            background_color: c.background_color.clone(),
            text_color: c.text_color.clone(),
            border_radius: c.border_radius,
        },
        BlockContent::Header(c) => BlockView::Header {
            logo: (!c.logo.is_empty()).then(|| c.logo.clone()),
            placeholder: "Logo",
            background_color: or(&c.background_color, "#ffffff").to_string(),
        },
        BlockContent::Hero(c) => BlockView::Hero {
            title: text(or(&c.title, "Hero Title")),
            subtitle: text(or(&c.subtitle, "Hero Subtitle")),
            button_text: text(or(&c.button_text, "Button")),
            background_color: or(&c.background_color, "#f3f4f6").to_string(),
            background_image: non_empty(&c.background_image),
        },
        BlockContent::Cta(c) => BlockView::Cta {
            title: text(or(&c.title, "CTA Title")),
            text: text(or(&c.text, "CTA Text")),
            button_text: text(or(&c.button_text, "Button")),
            background_color: or(&c.background_color, "#2563EB").to_string(),
            text_color: or(&c.text_color, "#ffffff").to_string(),
        },
        BlockContent::Footer(c) => BlockView::Footer {
            contact_info: text(or(&c.contact_info, "Contact info")),
            unsubscribe_text: text(or(&c.unsubscribe_text, "Unsubscribe")),
            unsubscribe_url: or(&c.unsubscribe_url, "#").to_string(),
            background_color: or(&c.background_color, "#f9fafb").to_string(),
            text_color: or(&c.text_color, "#6b7280").to_string(),
        },
        BlockContent::Section(c) => BlockView::Container {
            label: "Section (add blocks here)",
            padding: c.padding,
            gap: None,
            background_color: non_empty(&c.background_color),
            background_image: non_empty(&c.background_image),
        },
        BlockContent::TwoColumn(c) => BlockView::Container {
            label: "Left Column | Right Column",
            padding: c.padding,
            gap: Some(c.gap),
            background_color: non_empty(&c.background_color),
            background_image: non_empty(&c.background_image),
        },
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
