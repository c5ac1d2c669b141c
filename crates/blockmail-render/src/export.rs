//! Static HTML export.
//!
//! Email clients ignore stylesheets and most layout CSS, so the export is
//! built the old-fashioned way: nested presentation tables, one `<tr>` per
//! block, every style inline. The result is a complete document that can
//! be pasted into any sending tool.
//!
//! ## Learning: Building Markup with a Buffer
//!
//! Rows are written into a single `String` through a small [`Context`]
//! that tracks indentation, the same way a code generator emits source.
//! `format!` handles interpolation; every value coming from the document
//! passes through [`text`] or [`attr`] first.

use blockmail_core::{
    Block, BlockContent, ButtonContent, CtaContent, ExportConfig, FooterContent, HeaderContent,
    HeroContent, ImageContent, Style, TextContent,
};
use tracing::debug;

use crate::{attr, or, resolved_text, text};

const FONT_STACK: &str = "font-family:Arial,Helvetica,sans-serif;";

/// Renders block lists as standalone email HTML.
#[derive(Debug, Clone, Default)]
pub struct HtmlExporter {
    config: ExportConfig,
}

impl HtmlExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Exports `blocks` in order. An empty list still yields the scaffold.
    pub fn export(&self, blocks: &[Block]) -> String {
        let rows: Vec<String> = blocks.iter().filter_map(export_row).collect();
        debug!(blocks = blocks.len(), rows = rows.len(), "Exported HTML");
        self.scaffold(&rows.join("\n"))
    }

    fn scaffold(&self, rows: &str) -> String {
        let title = text(&self.config.title);
        let background = attr(&self.config.background_color);
        let max_width = self.config.max_width;

        let mut ctx = Context::new();
        ctx.line("<!DOCTYPE html>");
        ctx.line(r#"<html lang="en">"#);
        ctx.open("<head>");
        ctx.line(r#"<meta charset="UTF-8">"#);
        ctx.line(r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#);
        ctx.line(r#"<meta http-equiv="X-UA-Compatible" content="IE=edge">"#);
        ctx.line(&format!("<title>{title}</title>"));
        ctx.line("<!--[if mso]>");
        ctx.line(r#"<style type="text/css">"#);
        ctx.line("  body, table, td {font-family: Arial, Helvetica, sans-serif !important;}");
        ctx.line("</style>");
        ctx.line("<![endif]-->");
        ctx.close("</head>");
        ctx.open(&format!(
            r#"<body style="margin:0;padding:0;background-color:{background};">"#
        ));
        ctx.open(&format!(
            r#"<table role="presentation" cellpadding="0" cellspacing="0" border="0" width="100%" style="background-color:{background};">"#
        ));
        ctx.open("<tr>");
        ctx.open(r#"<td align="center" style="padding:24px 12px;">"#);
        ctx.open(&format!(
            r#"<table role="presentation" cellpadding="0" cellspacing="0" border="0" width="100%" style="max-width:{max_width}px;background-color:#ffffff;border-radius:4px;">"#
        ));
        ctx.open("<tbody>");
        if !rows.is_empty() {
            ctx.add(rows);
            ctx.add("\n");
        }
        ctx.close("</tbody>");
        ctx.close("</table>");
        ctx.close("</td>");
        ctx.close("</tr>");
        ctx.close("</table>");
        ctx.close("</body>");
        ctx.add("</html>");
        ctx.finish()
    }
}

// ==================== Context ====================

struct Context {
    depth: usize,
    buffer: String,
}

impl Context {
    fn new() -> Self {
        Self {
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.buffer.push_str("  ");
        }
        self.add(text);
        self.add("\n");
    }

    fn open(&mut self, tag: &str) {
        self.line(tag);
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(tag);
    }

    fn finish(self) -> String {
        self.buffer
    }
}

// ==================== Rows ====================

/// One `<tr>` for a block, or `None` for kinds that have no export.
fn export_row(block: &Block) -> Option<String> {
    let style = block.style();
    let row = match block.content() {
        BlockContent::Title(c) => heading_row(c, style, "h1", 600),
        BlockContent::Subtitle(c) => heading_row(c, style, "h2", 500),
        BlockContent::Paragraph(c) => paragraph_row(c, style),
        BlockContent::Image(c) => image_row(c, style),
        BlockContent::Button(c) => button_row(c, style),
        BlockContent::Header(c) => header_row(c),
        BlockContent::Hero(c) => hero_row(c),
        BlockContent::Cta(c) => cta_row(c),
        BlockContent::Footer(c) => footer_row(c),
        // Containers are editor-only layout for now.
        BlockContent::Section(_) | BlockContent::TwoColumn(_) => return None,
    };
    Some(row)
}

/// Wraps inner markup in the padded, aligned cell shared by simple blocks.
fn padded_row(style: &Style, inner: &str) -> String {
    format!(
        "<tr>\n  <td align=\"{align}\" style=\"padding:{mt}px 20px {mb}px 20px;\">\n    {inner}\n  </td>\n</tr>",
        align = style.align.as_str(),
        mt = style.margin_top,
        mb = style.margin_bottom,
    )
}

fn heading_row(content: &TextContent, style: &Style, tag: &str, weight: u16) -> String {
    let inner = format!(
        "<{tag} style=\"margin:0;font-size:{size}px;line-height:1.3;font-weight:{weight};color:{color};{FONT_STACK}\">{body}</{tag}>",
        size = style.font_size,
        color = attr(&style.color),
        body = resolved_text(content),
    );
    padded_row(style, &inner)
}

fn paragraph_row(content: &TextContent, style: &Style) -> String {
    let inner = format!(
        "<p style=\"margin:0;font-size:{size}px;line-height:1.6;color:{color};{FONT_STACK}\">{body}</p>",
        size = style.font_size,
        color = attr(&style.color),
        body = resolved_text(content).replace('\n', "<br>"),
    );
    padded_row(style, &inner)
}

fn image_row(content: &ImageContent, style: &Style) -> String {
    let width = if content.width == 0 { 100 } else { content.width };
    let inner = format!(
        "<img src=\"{src}\" alt=\"{alt}\" style=\"display:block;width:{width}%;max-width:100%;height:auto;border:0;outline:none;text-decoration:none;-ms-interpolation-mode:bicubic;\">",
        src = attr(&content.src),
        alt = attr(&content.alt),
    );
    padded_row(style, &inner)
}

fn button_row(content: &ButtonContent, style: &Style) -> String {
    let font_size = if content.font_size == 0 { 14 } else { content.font_size };
    let inner = format!(
        concat!(
            "<table role=\"presentation\" cellpadding=\"0\" cellspacing=\"0\" border=\"0\">\n",
            "      <tr>\n",
            "        <td>\n",
            "          <a href=\"{url}\" style=\"display:inline-block;background-color:{bg};color:{tc};padding:10px 20px;border-radius:{radius}px;font-size:{font_size}px;font-weight:500;{font}text-decoration:none;\">{label}</a>\n",
            "        </td>\n",
            "      </tr>\n",
            "    </table>"
        ),
        url = attr(or(&content.url, "#")),
        bg = attr(or(&content.background_color, "#2563EB")),
        tc = attr(or(&content.text_color, "#FFFFFF")),
        radius = content.border_radius,
        font_size = font_size,
        font = FONT_STACK,
        label = text(or(&content.text, "Click")),
    );
    padded_row(style, &inner)
}

fn header_row(content: &HeaderContent) -> String {
    let logo = if content.logo.is_empty() {
        format!("<span style=\"font-weight:600;color:#1f2937;{FONT_STACK}\">Logo</span>")
    } else {
        format!(
            "<img src=\"{}\" alt=\"Logo\" style=\"max-height:40px;width:auto;border:0;outline:none;text-decoration:none;\">",
            attr(&content.logo)
        )
    };

    let nav_link = |label: &str, url: &str| {
        format!(
            "<a href=\"{}\" style=\"color:#3b82f6;text-decoration:none;margin-left:16px;font-size:14px;{FONT_STACK}\">{}</a>",
            attr(or(url, "#")),
            text(label),
        )
    };
    let links: Vec<String> = if content.nav_links.is_empty() {
        vec![nav_link("Link 1", "#"), nav_link("Link 2", "#")]
    } else {
        content
            .nav_links
            .iter()
            .map(|link| nav_link(&link.text, &link.url))
            .collect()
    };

    format!(
        concat!(
            "<tr>\n",
            "  <td style=\"background-color:{bg};padding:16px 24px;border-bottom:1px solid #e5e7eb;\">\n",
            "    <table role=\"presentation\" cellpadding=\"0\" cellspacing=\"0\" border=\"0\" width=\"100%\">\n",
            "      <tr>\n",
            "        <td style=\"vertical-align:middle;\">{logo}</td>\n",
            "        <td align=\"right\" style=\"vertical-align:middle;\">\n",
            "          {links}\n",
            "        </td>\n",
            "      </tr>\n",
            "    </table>\n",
            "  </td>\n",
            "</tr>"
        ),
        bg = attr(or(&content.background_color, "#ffffff")),
        logo = logo,
        links = links.join("\n          "),
    )
}

/// Centered button used by hero and call-to-action rows.
fn centered_button(url: &str, label: &str, bg: &str, color: &str) -> String {
    format!(
        concat!(
            "<table role=\"presentation\" cellpadding=\"0\" cellspacing=\"0\" border=\"0\" style=\"margin:0 auto;\">\n",
            "      <tr>\n",
            "        <td>\n",
            "          <a href=\"{url}\" style=\"display:inline-block;background-color:{bg};color:{color};padding:12px 24px;border-radius:6px;font-size:14px;font-weight:500;{font}text-decoration:none;\">{label}</a>\n",
            "        </td>\n",
            "      </tr>\n",
            "    </table>"
        ),
        url = attr(or(url, "#")),
        bg = attr(bg),
        color = attr(color),
        font = FONT_STACK,
        label = text(label),
    )
}

/// Escapes a value for a single-quoted CSS string.
fn css_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' | '\'' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '\n' | '\r' => {}
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn hero_row(content: &HeroContent) -> String {
    let background_image = if content.background_image.is_empty() {
        String::new()
    } else {
        format!(
            "background-image:url('{}');background-size:cover;background-position:center;",
            attr(&css_string(&content.background_image))
        )
    };
    format!(
        concat!(
            "<tr>\n",
            "  <td style=\"background-color:{bg};{image}padding:48px 24px;text-align:center;\">\n",
            "    <h2 style=\"margin:0 0 12px 0;font-size:28px;font-weight:600;color:#111827;{font}\">{title}</h2>\n",
            "    <p style=\"margin:0 0 20px 0;font-size:16px;color:#4b5563;{font}\">{subtitle}</p>\n",
            "    {button}\n",
            "  </td>\n",
            "</tr>"
        ),
        bg = attr(or(&content.background_color, "#f3f4f6")),
        image = background_image,
        font = FONT_STACK,
        title = text(&content.title),
        subtitle = text(&content.subtitle),
        button = centered_button(&content.button_url, &content.button_text, "#2563EB", "#ffffff"),
    )
}

fn cta_row(content: &CtaContent) -> String {
    let bg = or(&content.background_color, "#2563EB");
    let tc = attr(or(&content.text_color, "#ffffff"));
    format!(
        concat!(
            "<tr>\n",
            "  <td style=\"background-color:{bg};padding:32px 24px;text-align:center;\">\n",
            "    <h3 style=\"margin:0 0 12px 0;font-size:22px;font-weight:600;color:{tc};{font}\">{title}</h3>\n",
            "    <p style=\"margin:0 0 20px 0;font-size:14px;color:{tc};{font}\">{text}</p>\n",
            "    {button}\n",
            "  </td>\n",
            "</tr>"
        ),
        bg = attr(bg),
        tc = tc,
        font = FONT_STACK,
        title = text(&content.title),
        text = text(&content.text),
        button = centered_button(&content.button_url, &content.button_text, "#ffffff", bg),
    )
}

fn footer_row(content: &FooterContent) -> String {
    let tc = attr(or(&content.text_color, "#6b7280"));
    format!(
        concat!(
            "<tr>\n",
            "  <td style=\"background-color:{bg};padding:24px;text-align:center;font-size:12px;color:{tc};{font}\">\n",
            "    <div style=\"margin-bottom:8px;\">{contact}</div>\n",
            "    <div><a href=\"{url}\" style=\"color:{tc};text-decoration:underline;\">{unsubscribe}</a></div>\n",
            "  </td>\n",
            "</tr>"
        ),
        bg = attr(or(&content.background_color, "#f9fafb")),
        tc = tc,
        font = FONT_STACK,
        contact = text(&content.contact_info),
        url = attr(or(&content.unsubscribe_url, "#")),
        unsubscribe = text(or(&content.unsubscribe_text, "Unsubscribe")),
    )
}
