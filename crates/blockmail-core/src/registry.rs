//! Block registry: default content and style per block kind.
//!
//! Every call builds a fresh value, so callers may mutate what they get
//! without affecting later blocks.

use crate::block::{
    BlockContent, BlockKind, ButtonContent, CtaContent, FooterContent, HeaderContent, HeroContent,
    ImageContent, SectionContent, Style, TextContent, TwoColumnContent,
};
use crate::CoreResult;

/// Placeholder shown by freshly inserted image blocks.
pub const PLACEHOLDER_IMAGE: &str =
    "https://via.placeholder.com/600x220/2563EB/FFFFFF?text=Email+Image";

/// Accent color used by buttons and call-to-action blocks.
pub const ACCENT_COLOR: &str = "#2563EB";

/// Returns default content for a block kind.
pub fn defaults_for(kind: BlockKind) -> BlockContent {
    match kind {
        BlockKind::Header => BlockContent::Header(HeaderContent {
            logo: String::new(),
            logo_width: 120,
            nav_links: Vec::new(),
            social_icons: Vec::new(),
            background_color: "#ffffff".to_string(),
            ..Default::default()
        }),
        BlockKind::Hero => BlockContent::Hero(HeroContent {
            title: "Welcome to our newsletter".to_string(),
            subtitle: "Stay updated with our latest news and offers".to_string(),
            button_text: "Get Started".to_string(),
            button_url: "https://example.com".to_string(),
            background_image: String::new(),
            background_color: "#f3f4f6".to_string(),
            overlay: false,
            ..Default::default()
        }),
        BlockKind::Cta => BlockContent::Cta(CtaContent {
            title: "Ready to get started?".to_string(),
            text: "Join thousands of satisfied customers today.".to_string(),
            button_text: "Sign Up Now".to_string(),
            button_url: "https://example.com".to_string(),
            background_color: ACCENT_COLOR.to_string(),
            text_color: "#ffffff".to_string(),
            ..Default::default()
        }),
        BlockKind::Footer => BlockContent::Footer(FooterContent {
            contact_info: "Contact us at support@example.com".to_string(),
            social_links: Vec::new(),
            unsubscribe_text: "Unsubscribe".to_string(),
            unsubscribe_url: "#".to_string(),
            background_color: "#f9fafb".to_string(),
            text_color: "#6b7280".to_string(),
            ..Default::default()
        }),
        BlockKind::Title => BlockContent::Title(plain_text("Main headline for your email")),
        BlockKind::Subtitle => {
            BlockContent::Subtitle(plain_text("Optional subtitle with supporting context"))
        }
        BlockKind::Paragraph => BlockContent::Paragraph(plain_text(
            "Write the main body of your email here. You can keep this short and scannable for better engagement.",
        )),
        BlockKind::Image => BlockContent::Image(ImageContent {
            src: PLACEHOLDER_IMAGE.to_string(),
            alt: "Email image".to_string(),
            width: 100,
            height: "auto".to_string(),
            ..Default::default()
        }),
        BlockKind::Button => BlockContent::Button(ButtonContent {
            text: "Call to action".to_string(),
            url: "https://example.com".to_string(),
            background_color: ACCENT_COLOR.to_string(),
            text_color: "#FFFFFF".to_string(),
            border_radius: 999,
            font_size: 14,
            ..Default::default()
        }),
        BlockKind::Section => BlockContent::Section(SectionContent {
            padding: 16,
            margin: 0,
            ..Default::default()
        }),
        BlockKind::TwoColumn => BlockContent::TwoColumn(TwoColumnContent {
            padding: 16,
            gap: 16,
            ..Default::default()
        }),
    }
}

/// Returns default content for a type tag.
pub fn defaults_for_tag(tag: &str) -> CoreResult<BlockContent> {
    Ok(defaults_for(tag.parse()?))
}

/// Returns the base style shared by every kind.
///
/// The font size is the generic one; see [`font_size_for`].
pub fn base_style_for(_kind: BlockKind) -> Style {
    Style::default()
}

/// Initial font size: headlines are larger than body text.
pub fn font_size_for(kind: BlockKind) -> u32 {
    match kind {
        BlockKind::Title => 22,
        BlockKind::Subtitle => 16,
        _ => 14,
    }
}

fn plain_text(text: &str) -> TextContent {
    TextContent {
        text: text.to_string(),
        is_rich_text: false,
        html: String::new(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoreError;
    use crate::block::Block;

    #[test]
    fn test_every_kind_has_matching_defaults() {
        for kind in BlockKind::ALL {
            assert_eq!(defaults_for(kind).kind(), kind);
        }
    }

    #[test]
    fn test_font_sizes() {
        assert_eq!(Block::new(BlockKind::Title).style().font_size, 22);
        assert_eq!(Block::new(BlockKind::Subtitle).style().font_size, 16);
        assert_eq!(Block::new(BlockKind::Paragraph).style().font_size, 14);
        assert_eq!(Block::new(BlockKind::Hero).style().font_size, 14);
    }

    #[test]
    fn test_base_style_values() {
        let style = base_style_for(BlockKind::Image);
        assert_eq!(style.color, "#111827");
        assert_eq!(style.margin_top, 6);
        assert_eq!(style.margin_bottom, 6);
        assert_eq!(style.padding, 0);
        assert!(style.background_color.is_empty());
    }

    #[test]
    fn test_defaults_are_fresh_values() {
        let mut first = defaults_for(BlockKind::Button);
        if let BlockContent::Button(button) = &mut first {
            button.text = "Changed".to_string();
        }

        match defaults_for(BlockKind::Button) {
            BlockContent::Button(button) => assert_eq!(button.text, "Call to action"),
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn test_unknown_tag() {
        assert!(matches!(
            defaults_for_tag("banner"),
            Err(CoreError::UnknownBlockType(_))
        ));
        assert!(defaults_for_tag("two-column").is_ok());
    }
}
