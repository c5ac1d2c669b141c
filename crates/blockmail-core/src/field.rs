//! Field paths and value coercion for block updates.
//!
//! A property panel edits one field at a time: `content.text`,
//! `style.fontSize`, and so on. Values arrive loosely typed (whatever an
//! input widget produced) and are coerced here before anything is written.
//!
//! ## Learning: Validate, Then Assign
//!
//! Every arm of [`apply`] converts the incoming value first and only then
//! assigns it. If conversion fails the `?` returns early and the block is
//! untouched, so callers get all-or-nothing updates for free.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::block::{Align, Block, BlockContent, BlockKind, Style};
use crate::{CoreError, CoreResult};

/// Which half of a block a field lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldScope {
    Content,
    Style,
}

impl FieldScope {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Style => "style",
        }
    }
}

/// Address of a single editable field, e.g. `content.buttonText`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    pub scope: FieldScope,
    pub name: String,
}

impl FieldPath {
    pub fn content(name: impl Into<String>) -> Self {
        Self {
            scope: FieldScope::Content,
            name: name.into(),
        }
    }

    pub fn style(name: impl Into<String>) -> Self {
        Self {
            scope: FieldScope::Style,
            name: name.into(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.scope.as_str(), self.name)
    }
}

impl FromStr for FieldPath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scope, name) = s
            .split_once('.')
            .ok_or_else(|| CoreError::validation(format!("Field path must look like content.<name> or style.<name>, got \"{s}\"")))?;
        if name.is_empty() {
            return Err(CoreError::validation(format!("Field path \"{s}\" has no field name")));
        }
        match scope {
            "content" => Ok(Self::content(name)),
            "style" => Ok(Self::style(name)),
            other => Err(CoreError::validation(format!("Unknown field scope: {other}"))),
        }
    }
}

/// A loosely typed incoming value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(i64),
    Flag(bool),
}

impl FieldValue {
    /// Renders the value as text, whatever its variant.
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(n) => n.to_string(),
            Self::Flag(b) => b.to_string(),
        }
    }

    /// Coerces to a number clamped into `range`.
    ///
    /// Text is read the way a browser's `parseInt` reads it: leading
    /// whitespace, optional sign, then as many digits as there are.
    pub fn to_number(&self, range: NumericRange) -> CoreResult<u32> {
        let raw = match self {
            Self::Number(n) => *n,
            Self::Text(text) => leading_integer(text)
                .ok_or_else(|| CoreError::validation(format!("\"{text}\" is not a number")))?,
            Self::Flag(_) => return Err(CoreError::validation("Expected a number")),
        };
        Ok(range.clamp(raw))
    }

    pub fn to_flag(&self) -> CoreResult<bool> {
        match self {
            Self::Flag(b) => Ok(*b),
            Self::Number(n) => Ok(*n != 0),
            Self::Text(text) => match text.trim() {
                "true" | "on" | "1" => Ok(true),
                "false" | "off" | "0" | "" => Ok(false),
                other => Err(CoreError::validation(format!("\"{other}\" is not true or false"))),
            },
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        Self::Number(i64::from(n))
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

/// Inclusive numeric bounds; `max: None` means unbounded above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericRange {
    pub min: i64,
    pub max: Option<i64>,
}

impl NumericRange {
    pub const FONT_SIZE: Self = Self::new(10, Some(40));
    pub const MARGIN: Self = Self::new(0, Some(80));
    pub const BORDER_RADIUS: Self = Self::new(0, Some(60));
    pub const IMAGE_WIDTH: Self = Self::new(10, Some(100));
    pub const NON_NEGATIVE: Self = Self::new(0, None);

    pub const fn new(min: i64, max: Option<i64>) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: i64) -> u32 {
        let upper = self.max.unwrap_or(i64::from(u32::MAX)).min(i64::from(u32::MAX));
        let lower = self.min.max(0).min(upper);
        u32::try_from(value.clamp(lower, upper)).unwrap_or(u32::MAX)
    }
}

/// Applies one field update to a block.
///
/// On error the block is left exactly as it was.
pub fn apply(block: &mut Block, path: &FieldPath, value: FieldValue) -> CoreResult<()> {
    match path.scope {
        FieldScope::Content => apply_content(block.content_mut(), &path.name, value),
        FieldScope::Style => apply_style(block.style_mut(), &path.name, value),
    }
}

/// Reduces rich HTML to its plain-text fallback: tags dropped, line breaks
/// kept, entities decoded.
pub fn plain_text_fallback(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        let tail = &rest[open..];
        let Some(close) = tail.find('>') else {
            rest = tail;
            break;
        };
        let tag = tail[1..close].trim().to_ascii_lowercase();
        if tag.starts_with("br") || tag == "/p" || tag == "/div" {
            text.push('\n');
        }
        rest = &tail[close + 1..];
    }
    text.push_str(rest);
    html_escape::decode_html_entities(text.trim_end_matches('\n')).into_owned()
}

// ==================== Content ====================

fn apply_content(content: &mut BlockContent, name: &str, value: FieldValue) -> CoreResult<()> {
    let kind = content.kind();
    match (content, name) {
        (
            BlockContent::Title(c) | BlockContent::Subtitle(c) | BlockContent::Paragraph(c),
            field,
        ) => match field {
            "text" => {
                c.text = value.into_text();
                c.html.clear();
                c.is_rich_text = false;
            }
            "html" => {
                let html = value.into_text();
                c.text = plain_text_fallback(&html);
                c.html = html;
                c.is_rich_text = true;
            }
            "isRichText" => c.is_rich_text = value.to_flag()?,
            _ => return Err(unknown_field(kind, name)),
        },

        (BlockContent::Image(c), "src") => c.src = image_source(value)?,
        (BlockContent::Image(c), "alt") => c.alt = value.into_text(),
        (BlockContent::Image(c), "width") => c.width = value.to_number(NumericRange::IMAGE_WIDTH)?,
        (BlockContent::Image(c), "height") => c.height = value.into_text(),

        (BlockContent::Button(c), "text") => c.text = value.into_text(),
        (BlockContent::Button(c), "url") => c.url = value.into_text(),
        (BlockContent::Button(c), "backgroundColor") => c.background_color = color(value)?,
        (BlockContent::Button(c), "textColor") => c.text_color = color(value)?,
        (BlockContent::Button(c), "borderRadius") => {
            c.border_radius = value.to_number(NumericRange::BORDER_RADIUS)?
        }
        (BlockContent::Button(c), "fontSize") => {
            c.font_size = value.to_number(NumericRange::FONT_SIZE)?
        }

        (BlockContent::Header(c), "logo") => c.logo = image_source(value)?,
        (BlockContent::Header(c), "logoWidth") => {
            c.logo_width = value.to_number(NumericRange::NON_NEGATIVE)?
        }
        (BlockContent::Header(c), "backgroundColor") => c.background_color = color(value)?,

        (BlockContent::Hero(c), "title") => c.title = value.into_text(),
        (BlockContent::Hero(c), "subtitle") => c.subtitle = value.into_text(),
        (BlockContent::Hero(c), "buttonText") => c.button_text = value.into_text(),
        (BlockContent::Hero(c), "buttonUrl") => c.button_url = value.into_text(),
        (BlockContent::Hero(c), "backgroundImage") => c.background_image = image_source(value)?,
        (BlockContent::Hero(c), "backgroundColor") => c.background_color = color(value)?,
        (BlockContent::Hero(c), "overlay") => c.overlay = value.to_flag()?,

        (BlockContent::Cta(c), "title") => c.title = value.into_text(),
        (BlockContent::Cta(c), "text") => c.text = value.into_text(),
        (BlockContent::Cta(c), "buttonText") => c.button_text = value.into_text(),
        (BlockContent::Cta(c), "buttonUrl") => c.button_url = value.into_text(),
        (BlockContent::Cta(c), "backgroundColor") => c.background_color = color(value)?,
        (BlockContent::Cta(c), "textColor") => c.text_color = color(value)?,

        (BlockContent::Footer(c), "contactInfo") => c.contact_info = value.into_text(),
        (BlockContent::Footer(c), "unsubscribeText") => c.unsubscribe_text = value.into_text(),
        (BlockContent::Footer(c), "unsubscribeUrl") => c.unsubscribe_url = value.into_text(),
        (BlockContent::Footer(c), "backgroundColor") => c.background_color = color(value)?,
        (BlockContent::Footer(c), "textColor") => c.text_color = color(value)?,

        (BlockContent::Section(c), "backgroundColor") => c.background_color = color(value)?,
        (BlockContent::Section(c), "backgroundImage") => {
            c.background_image = image_source(value)?
        }
        (BlockContent::Section(c), "padding") => {
            c.padding = value.to_number(NumericRange::NON_NEGATIVE)?
        }
        (BlockContent::Section(c), "margin") => {
            c.margin = value.to_number(NumericRange::NON_NEGATIVE)?
        }

        (BlockContent::TwoColumn(c), "backgroundColor") => c.background_color = color(value)?,
        (BlockContent::TwoColumn(c), "backgroundImage") => {
            c.background_image = image_source(value)?
        }
        (BlockContent::TwoColumn(c), "padding") => {
            c.padding = value.to_number(NumericRange::NON_NEGATIVE)?
        }
        (BlockContent::TwoColumn(c), "gap") => {
            c.gap = value.to_number(NumericRange::NON_NEGATIVE)?
        }

        _ => return Err(unknown_field(kind, name)),
    }
    Ok(())
}

// ==================== Style ====================

fn apply_style(style: &mut Style, name: &str, value: FieldValue) -> CoreResult<()> {
    match name {
        "color" => style.color = color(value)?,
        "fontSize" => style.font_size = value.to_number(NumericRange::FONT_SIZE)?,
        "align" => style.align = value.into_text().parse::<Align>()?,
        "marginTop" => style.margin_top = value.to_number(NumericRange::MARGIN)?,
        "marginBottom" => style.margin_bottom = value.to_number(NumericRange::MARGIN)?,
        "padding" => style.padding = value.to_number(NumericRange::NON_NEGATIVE)?,
        "backgroundColor" => style.background_color = color(value)?,
        "backgroundImage" => style.background_image = image_source(value)?,
        _ => return Err(CoreError::validation(format!("Unknown style field: {name}"))),
    }
    Ok(())
}

// ==================== Coercion ====================

fn unknown_field(kind: BlockKind, name: &str) -> CoreError {
    CoreError::validation(format!("{kind} blocks have no editable field \"{name}\""))
}

fn leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Overlong digit runs saturate; the result is clamped anyway.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Accepts empty, `#rgb` or `#rrggbb`.
pub fn is_valid_color(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

fn color(value: FieldValue) -> CoreResult<String> {
    let text = value.into_text().trim().to_string();
    if is_valid_color(&text) {
        Ok(text)
    } else {
        Err(CoreError::validation(format!("\"{text}\" is not a hex color like #2563EB")))
    }
}

/// Accepts empty, an absolute http(s) URL, or an inline `data:image/` URL.
pub fn is_valid_image_source(value: &str) -> bool {
    if value.is_empty() || value.starts_with("data:image/") {
        return true;
    }
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

fn image_source(value: FieldValue) -> CoreResult<String> {
    let text = value.into_text().trim().to_string();
    if is_valid_image_source(&text) {
        Ok(text)
    } else {
        Err(CoreError::validation(
            "Image source must be an http(s) URL or an uploaded image",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(block: &mut Block, path: &str, value: impl Into<FieldValue>) -> CoreResult<()> {
        apply(block, &path.parse().unwrap(), value.into())
    }

    #[test]
    fn test_path_parsing() {
        let path: FieldPath = "content.buttonText".parse().unwrap();
        assert_eq!(path, FieldPath::content("buttonText"));
        assert_eq!(path.to_string(), "content.buttonText");

        assert!("fontSize".parse::<FieldPath>().is_err());
        assert!("layout.width".parse::<FieldPath>().is_err());
        assert!("style.".parse::<FieldPath>().is_err());
    }

    #[test]
    fn test_font_size_is_clamped() {
        let mut block = Block::new(BlockKind::Title);

        set(&mut block, "style.fontSize", 100i64).unwrap();
        assert_eq!(block.style().font_size, 40);

        set(&mut block, "style.fontSize", "4").unwrap();
        assert_eq!(block.style().font_size, 10);
    }

    #[test]
    fn test_numeric_text_reads_leading_digits() {
        let mut block = Block::new(BlockKind::Paragraph);
        set(&mut block, "style.marginTop", " 24px").unwrap();
        assert_eq!(block.style().margin_top, 24);

        set(&mut block, "style.marginBottom", "-5").unwrap();
        assert_eq!(block.style().margin_bottom, 0);
    }

    #[test]
    fn test_non_numeric_text_is_rejected_and_block_untouched() {
        let mut block = Block::new(BlockKind::Button);
        let before = block.clone();

        let err = set(&mut block, "content.borderRadius", "round").unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(block, before);
    }

    #[test]
    fn test_button_ranges() {
        let mut block = Block::new(BlockKind::Button);
        set(&mut block, "content.borderRadius", 999i64).unwrap();
        set(&mut block, "content.fontSize", 2i64).unwrap();

        match block.content() {
            BlockContent::Button(button) => {
                assert_eq!(button.border_radius, 60);
                assert_eq!(button.font_size, 10);
            }
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn test_image_width_range() {
        let mut block = Block::new(BlockKind::Image);
        set(&mut block, "content.width", 3i64).unwrap();
        match block.content() {
            BlockContent::Image(image) => assert_eq!(image.width, 10),
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn test_align_validation() {
        let mut block = Block::new(BlockKind::Subtitle);
        set(&mut block, "style.align", "center").unwrap();
        assert_eq!(block.style().align, Align::Center);

        assert!(set(&mut block, "style.align", "justify").is_err());
        assert_eq!(block.style().align, Align::Center);
    }

    #[test]
    fn test_color_validation() {
        let mut block = Block::new(BlockKind::Cta);
        set(&mut block, "content.backgroundColor", "#0f0").unwrap();
        set(&mut block, "style.color", "").unwrap();
        assert!(set(&mut block, "content.textColor", "red").is_err());
        assert!(set(&mut block, "content.textColor", "#12345").is_err());
    }

    #[test]
    fn test_image_source_validation() {
        let mut block = Block::new(BlockKind::Image);
        set(&mut block, "content.src", "https://cdn.example.com/a.png").unwrap();
        set(&mut block, "content.src", "data:image/png;base64,AAAA").unwrap();
        set(&mut block, "content.src", "").unwrap();
        assert!(set(&mut block, "content.src", "javascript:alert(1)").is_err());
        assert!(set(&mut block, "content.src", "not a url").is_err());
    }

    #[test]
    fn test_text_clears_rich_mode() {
        let mut block = Block::new(BlockKind::Paragraph);
        set(&mut block, "content.html", "<b>Bold</b> &amp; plain").unwrap();

        let text = block.content().as_text().unwrap();
        assert!(text.is_rich_text);
        assert_eq!(text.text, "Bold & plain");
        assert_eq!(text.rich_html(), Some("<b>Bold</b> &amp; plain"));

        set(&mut block, "content.text", "Just text").unwrap();
        let text = block.content().as_text().unwrap();
        assert!(!text.is_rich_text);
        assert_eq!(text.rich_html(), None);
        assert!(text.html.is_empty());
    }

    #[test]
    fn test_unknown_fields() {
        let mut block = Block::new(BlockKind::Image);
        assert!(set(&mut block, "content.buttonText", "x").is_err());
        assert!(set(&mut block, "style.shadow", "x").is_err());
    }

    #[test]
    fn test_plain_text_fallback_keeps_breaks() {
        assert_eq!(plain_text_fallback("Line one<br>Line two"), "Line one\nLine two");
        assert_eq!(plain_text_fallback("<p>A</p><p>B</p>"), "A\nB");
        assert_eq!(plain_text_fallback("5 &lt; 6"), "5 < 6");
    }

    proptest! {
        #[test]
        fn prop_clamp_stays_in_range(value in any::<i64>(), min in 0i64..50, span in 0i64..100) {
            let range = NumericRange::new(min, Some(min + span));
            let clamped = i64::from(range.clamp(value));
            prop_assert!(clamped >= min && clamped <= min + span);
        }

        #[test]
        fn prop_font_size_update_in_bounds(value in -1000i64..1000) {
            let mut block = Block::new(BlockKind::Paragraph);
            apply(&mut block, &FieldPath::style("fontSize"), value.into()).unwrap();
            prop_assert!((10..=40).contains(&block.style().font_size));
        }
    }
}
