//! Blocks: the atomic unit of an email document.
//!
//! ## Learning: Closed Sum Types
//!
//! The set of block kinds is fixed, so content is an enum with one payload
//! struct per kind. Every `match` on it is checked for exhaustiveness by
//! the compiler: adding a kind fails to build until every projection and
//! every settings panel handles it.
//!
//! ## Wire format
//!
//! A block serialises as `{"id", "type", "content", "style"}`. The enum is
//! not serde-tagged directly; `Block` implements `Serialize`/`Deserialize`
//! by hand so the `type` tag sits next to `content` instead of inside it.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::str::FromStr;
use uuid::Uuid;

use crate::{CoreError, registry};

/// Fields a payload does not recognise, kept verbatim.
pub type Extra = Map<String, Value>;

/// Unique identifier for a block.
///
/// Opaque string, minted from a v4 UUID. Blocks loaded from disk keep
/// whatever id they were saved with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Mints a new unique block ID.
    pub fn new() -> Self {
        Self(format!("b_{}", Uuid::new_v4().simple()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BlockId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The closed set of block types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Header,
    Hero,
    Cta,
    Footer,
    Title,
    Subtitle,
    Paragraph,
    Image,
    Button,
    Section,
    #[serde(rename = "two-column")]
    TwoColumn,
}

impl BlockKind {
    /// All kinds in palette order.
    pub const ALL: [Self; 11] = [
        Self::Header,
        Self::Hero,
        Self::Cta,
        Self::Footer,
        Self::Title,
        Self::Subtitle,
        Self::Paragraph,
        Self::Image,
        Self::Button,
        Self::Section,
        Self::TwoColumn,
    ];

    /// Type tag as stored in documents.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Hero => "hero",
            Self::Cta => "cta",
            Self::Footer => "footer",
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::Paragraph => "paragraph",
            Self::Image => "image",
            Self::Button => "button",
            Self::Section => "section",
            Self::TwoColumn => "two-column",
        }
    }

    /// Card label: upper case, hyphen replaced by a space.
    pub fn label(&self) -> String {
        self.as_str().to_uppercase().replace('-', " ")
    }

    /// Title, subtitle and paragraph hold formatted text.
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Title | Self::Subtitle | Self::Paragraph)
    }

    /// Kinds whose alignment, font size and text color are editable.
    pub const fn has_text_style(&self) -> bool {
        matches!(
            self,
            Self::Title | Self::Subtitle | Self::Paragraph | Self::Button
        )
    }

    /// Section and two-column hold nested blocks.
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::Section | Self::TwoColumn)
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::UnknownBlockType(s.to_string()))
    }
}

/// Horizontal alignment of text-like blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    pub const ALL: [Self; 3] = [Self::Left, Self::Center, Self::Right];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl FromStr for Align {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|align| align.as_str() == s.trim())
            .ok_or_else(|| CoreError::validation(format!("Alignment must be left, center or right, not \"{s}\"")))
    }
}

/// Shared presentation attributes.
///
/// Not every field means something for every kind: images ignore the font
/// size, for instance. Missing fields load as the base style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Style {
    pub color: String,
    pub font_size: u32,
    pub align: Align,
    pub margin_top: u32,
    pub margin_bottom: u32,
    pub padding: u32,
    pub background_color: String,
    pub background_image: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: "#111827".to_string(),
            font_size: 14,
            align: Align::Left,
            margin_top: 6,
            margin_bottom: 6,
            padding: 0,
            background_color: String::new(),
            background_image: String::new(),
            extra: Extra::new(),
        }
    }
}

/// A labelled link (navigation, social).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub text: String,
    pub url: String,
}

/// Title, subtitle and paragraph payload.
///
/// `html` wins over `text` when `is_rich_text` is set and `html` is
/// non-empty; `text` is always the plain-text fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextContent {
    pub text: String,
    pub is_rich_text: bool,
    pub html: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl TextContent {
    /// Returns the rich markup if this text is flagged rich and has any.
    pub fn rich_html(&self) -> Option<&str> {
        (self.is_rich_text && !self.html.is_empty()).then_some(self.html.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageContent {
    pub src: String,
    pub alt: String,
    /// Width as a percentage of the content column
    pub width: u32,
    pub height: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ButtonContent {
    pub text: String,
    pub url: String,
    pub background_color: String,
    pub text_color: String,
    pub border_radius: u32,
    pub font_size: u32,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderContent {
    pub logo: String,
    pub logo_width: u32,
    pub nav_links: Vec<Link>,
    pub social_icons: Vec<Link>,
    pub background_color: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroContent {
    pub title: String,
    pub subtitle: String,
    pub button_text: String,
    pub button_url: String,
    pub background_image: String,
    pub background_color: String,
    pub overlay: bool,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CtaContent {
    pub title: String,
    pub text: String,
    pub button_text: String,
    pub button_url: String,
    pub background_color: String,
    pub text_color: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FooterContent {
    pub contact_info: String,
    pub social_links: Vec<Link>,
    pub unsubscribe_text: String,
    pub unsubscribe_url: String,
    pub background_color: String,
    pub text_color: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Single-column container.
///
/// `blocks` exists in the data model but nothing populates or renders it
/// yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionContent {
    pub background_color: String,
    pub background_image: String,
    pub padding: u32,
    pub margin: u32,
    pub blocks: Vec<Block>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Two-column container; the columns are not rendered yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TwoColumnContent {
    pub background_color: String,
    pub background_image: String,
    pub padding: u32,
    pub gap: u32,
    pub left_column: Vec<Block>,
    pub right_column: Vec<Block>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Kind-specific content of a block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Header(HeaderContent),
    Hero(HeroContent),
    Cta(CtaContent),
    Footer(FooterContent),
    Title(TextContent),
    Subtitle(TextContent),
    Paragraph(TextContent),
    Image(ImageContent),
    Button(ButtonContent),
    Section(SectionContent),
    TwoColumn(TwoColumnContent),
}

impl BlockContent {
    /// Returns the kind this payload belongs to.
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Header(_) => BlockKind::Header,
            Self::Hero(_) => BlockKind::Hero,
            Self::Cta(_) => BlockKind::Cta,
            Self::Footer(_) => BlockKind::Footer,
            Self::Title(_) => BlockKind::Title,
            Self::Subtitle(_) => BlockKind::Subtitle,
            Self::Paragraph(_) => BlockKind::Paragraph,
            Self::Image(_) => BlockKind::Image,
            Self::Button(_) => BlockKind::Button,
            Self::Section(_) => BlockKind::Section,
            Self::TwoColumn(_) => BlockKind::TwoColumn,
        }
    }

    /// Decodes a raw JSON payload for the given kind.
    ///
    /// A missing payload (`null`) decodes as an all-empty payload.
    pub fn from_value(kind: BlockKind, value: Value) -> serde_json::Result<Self> {
        let value = match value {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        Ok(match kind {
            BlockKind::Header => Self::Header(serde_json::from_value(value)?),
            BlockKind::Hero => Self::Hero(serde_json::from_value(value)?),
            BlockKind::Cta => Self::Cta(serde_json::from_value(value)?),
            BlockKind::Footer => Self::Footer(serde_json::from_value(value)?),
            BlockKind::Title => Self::Title(serde_json::from_value(value)?),
            BlockKind::Subtitle => Self::Subtitle(serde_json::from_value(value)?),
            BlockKind::Paragraph => Self::Paragraph(serde_json::from_value(value)?),
            BlockKind::Image => Self::Image(serde_json::from_value(value)?),
            BlockKind::Button => Self::Button(serde_json::from_value(value)?),
            BlockKind::Section => Self::Section(serde_json::from_value(value)?),
            BlockKind::TwoColumn => Self::TwoColumn(serde_json::from_value(value)?),
        })
    }

    /// Returns the text payload of title, subtitle and paragraph blocks.
    pub fn as_text(&self) -> Option<&TextContent> {
        match self {
            Self::Title(c) | Self::Subtitle(c) | Self::Paragraph(c) => Some(c),
            _ => None,
        }
    }

    /// Nested blocks held by container kinds.
    pub fn children(&self) -> Vec<&Block> {
        match self {
            Self::Section(c) => c.blocks.iter().collect(),
            Self::TwoColumn(c) => c.left_column.iter().chain(&c.right_column).collect(),
            _ => Vec::new(),
        }
    }

    fn children_mut(&mut self) -> Vec<&mut Block> {
        match self {
            Self::Section(c) => c.blocks.iter_mut().collect(),
            Self::TwoColumn(c) => c
                .left_column
                .iter_mut()
                .chain(c.right_column.iter_mut())
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl Serialize for BlockContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Header(c) => c.serialize(serializer),
            Self::Hero(c) => c.serialize(serializer),
            Self::Cta(c) => c.serialize(serializer),
            Self::Footer(c) => c.serialize(serializer),
            Self::Title(c) | Self::Subtitle(c) | Self::Paragraph(c) => c.serialize(serializer),
            Self::Image(c) => c.serialize(serializer),
            Self::Button(c) => c.serialize(serializer),
            Self::Section(c) => c.serialize(serializer),
            Self::TwoColumn(c) => c.serialize(serializer),
        }
    }
}

/// A typed content block.
///
/// Fields are private: the kind is fixed at creation and content changes go
/// through [`Block::set_field`], which cannot swap the payload variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    id: BlockId,
    content: BlockContent,
    style: Style,
}

impl Block {
    /// Creates a block of the given kind with registry defaults and a new id.
    pub fn new(kind: BlockKind) -> Self {
        let mut style = registry::base_style_for(kind);
        style.font_size = registry::font_size_for(kind);
        Self {
            id: BlockId::new(),
            content: registry::defaults_for(kind),
            style,
        }
    }

    /// Assembles a block from existing parts, keeping the given id.
    pub fn from_parts(id: BlockId, content: BlockContent, style: Style) -> Self {
        Self { id, content, style }
    }

    pub fn id(&self) -> &BlockId {
        &self.id
    }

    pub fn kind(&self) -> BlockKind {
        self.content.kind()
    }

    pub fn content(&self) -> &BlockContent {
        &self.content
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub(crate) fn content_mut(&mut self) -> &mut BlockContent {
        &mut self.content
    }

    pub(crate) fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    /// Deep copy with a freshly minted id, nested children included.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.reassign_ids();
        copy
    }

    fn reassign_ids(&mut self) {
        self.id = BlockId::new();
        for child in self.content.children_mut() {
            child.reassign_ids();
        }
    }

    /// Returns this block's id followed by the ids of nested children.
    pub fn all_ids(&self) -> Vec<&BlockId> {
        let mut ids = vec![&self.id];
        for child in self.content.children() {
            ids.extend(child.all_ids());
        }
        ids
    }
}

#[derive(Serialize)]
struct WireRef<'a> {
    id: &'a BlockId,
    #[serde(rename = "type")]
    kind: BlockKind,
    content: &'a BlockContent,
    style: &'a Style,
}

#[derive(Deserialize)]
struct Wire {
    id: BlockId,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    style: Style,
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireRef {
            id: &self.id,
            kind: self.kind(),
            content: &self.content,
            style: &self.style,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = Wire::deserialize(deserializer)?;
        let kind: BlockKind = wire.kind.parse().map_err(D::Error::custom)?;
        let content = BlockContent::from_value(kind, wire.content).map_err(D::Error::custom)?;
        Ok(Self {
            id: wire.id,
            content,
            style: wire.style,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("two-column".parse::<BlockKind>().unwrap(), BlockKind::TwoColumn);
        assert_eq!("cta".parse::<BlockKind>().unwrap(), BlockKind::Cta);
        assert!(matches!(
            "carousel".parse::<BlockKind>(),
            Err(CoreError::UnknownBlockType(tag)) if tag == "carousel"
        ));
    }

    #[test]
    fn test_kind_label() {
        assert_eq!(BlockKind::TwoColumn.label(), "TWO COLUMN");
        assert_eq!(BlockKind::Paragraph.label(), "PARAGRAPH");
    }

    #[test]
    fn test_new_block_ids_are_unique() {
        let a = Block::new(BlockKind::Button);
        let b = Block::new(BlockKind::Button);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_wire_shape() {
        let block = Block::new(BlockKind::Button);
        let value = serde_json::to_value(&block).unwrap();

        assert_eq!(value["type"], "button");
        assert_eq!(value["id"], block.id().as_str());
        assert_eq!(value["content"]["borderRadius"], 999);
        assert_eq!(value["content"]["textColor"], "#FFFFFF");
        assert_eq!(value["style"]["marginTop"], 6);
        assert_eq!(value["style"]["align"], "left");
    }

    #[test]
    fn test_roundtrip_preserves_unknown_fields() {
        let raw = json!({
            "id": "b_legacy_1",
            "type": "paragraph",
            "content": { "text": "Hi", "isRichText": false, "html": "", "tone": "friendly" },
            "style": { "color": "#333333", "fontSize": 15, "align": "center", "shadow": "none" }
        });

        let block: Block = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(block.id().as_str(), "b_legacy_1");
        assert_eq!(block.style().align, Align::Center);
        assert_eq!(block.style().margin_top, 6);

        let back = serde_json::to_value(&block).unwrap();
        assert_eq!(back["content"]["tone"], "friendly");
        assert_eq!(back["style"]["shadow"], "none");
    }

    #[test]
    fn test_unknown_type_is_rejected_on_load() {
        let raw = json!({ "id": "b1", "type": "video", "content": {}, "style": {} });
        let err = serde_json::from_value::<Block>(raw).unwrap_err();
        assert!(err.to_string().contains("Unknown block type: video"));
    }

    #[test]
    fn test_missing_content_loads_empty_payload() {
        let raw = json!({ "id": "b1", "type": "hero" });
        let block: Block = serde_json::from_value(raw).unwrap();
        assert_eq!(block.kind(), BlockKind::Hero);
        assert_eq!(block.style(), &Style::default());
    }

    #[test]
    fn test_duplicate_reassigns_nested_ids() {
        let inner = Block::new(BlockKind::Paragraph);
        let section = Block::from_parts(
            BlockId::new(),
            BlockContent::Section(SectionContent {
                blocks: vec![inner.clone()],
                ..Default::default()
            }),
            Style::default(),
        );

        let copy = section.duplicate();

        assert_ne!(copy.id(), section.id());
        let copied_inner = copy.content().children()[0];
        assert_ne!(copied_inner.id(), inner.id());
        assert_eq!(copied_inner.content(), inner.content());
        assert_eq!(copy.all_ids().len(), 2);
    }
}
