//! # Ticket Layout
//!
//! Flows blocks top to bottom with a single vertical cursor:
//!
//! ```text
//! y = margins.top
//! for block:
//!     y += gap_top
//!     title/text → glyph path at y,         y += text height
//!     photo      → y += auto_gap_top (16),  placement at y,
//!                  y += side + auto_gap_bottom (2)
//!     y += gap_bottom
//! height = ceil(y + margins.bottom)
//! ```
//!
//! Blocks never reorder or overlap; the cursor only moves down. Text goes into
//! an SVG overlay, photos become bitmap placements composited afterwards by
//! the rasterizer.

use std::fmt::Write;

use super::block::{
    Align, DEFAULT_PHOTO_GAP_BOTTOM, DEFAULT_PHOTO_GAP_TOP, DEFAULT_TEXT_SIZE, DEFAULT_TITLE_SIZE,
    PhotoBlock, TicketBlock,
};
use crate::error::TicketError;
use crate::font::{TextShaper, Weight};
use crate::printer::PrinterConfig;
use crate::render::photo::{self, PhotoBitmap, PhotoOptions};

/// A photo bitmap positioned on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub bitmap: PhotoBitmap,
    pub left: usize,
    pub top: usize,
}

/// Result of laying out a ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketLayout {
    /// Text overlay: white background plus one path per text line.
    pub svg: String,
    pub placements: Vec<Placement>,
    pub width: usize,
    pub height: usize,
}

/// Shared inputs of one layout pass.
pub struct LayoutContext<'a, S: TextShaper + ?Sized> {
    pub config: &'a PrinterConfig,
    pub shaper: &'a S,
    pub client: &'a reqwest::Client,
}

/// Lay out `blocks` in order.
///
/// A photo that cannot be fetched or decoded aborts the whole layout.
pub async fn layout_ticket<S: TextShaper + ?Sized>(
    blocks: &[TicketBlock],
    ctx: &LayoutContext<'_, S>,
) -> Result<TicketLayout, TicketError> {
    let config = ctx.config;
    let content_width = config.content_width() as f32;
    let left_margin = config.margins.left as f32;

    let mut y = config.margins.top as f32;
    let mut paths = Vec::new();
    let mut placements = Vec::new();

    for block in blocks {
        y += block.gap_top();

        match block {
            TicketBlock::Title(title) if !title.text.is_empty() => {
                let line = TextLine {
                    text: &title.text,
                    font_size: title.font_size.unwrap_or(DEFAULT_TITLE_SIZE),
                    weight: title.weight,
                    align: title.align,
                    one_line: title.one_line,
                };
                let (path, height) = line.render(ctx.shaper, left_margin, content_width, y);
                paths.push(path);
                y += height;
            }
            TicketBlock::Text(text) if !text.text.is_empty() => {
                let line = TextLine {
                    text: &text.text,
                    font_size: text.font_size.unwrap_or(DEFAULT_TEXT_SIZE),
                    weight: text.weight,
                    align: text.align,
                    one_line: false,
                };
                let (path, height) = line.render(ctx.shaper, left_margin, content_width, y);
                paths.push(path);
                y += height;
            }
            TicketBlock::Photo(photo) if !photo.src.is_empty() => {
                y += photo.auto_gap_top.unwrap_or(DEFAULT_PHOTO_GAP_TOP);

                let bitmap = load_block_photo(photo, ctx).await?;
                let side = bitmap.size as f32;
                let left = (left_margin + (content_width - side) / 2.0).floor().max(0.0) as usize;
                let top = y.round() as usize;

                tracing::debug!(left, top, size = bitmap.size, "photo placed");
                placements.push(Placement { bitmap, left, top });

                y += side + photo.auto_gap_bottom.unwrap_or(DEFAULT_PHOTO_GAP_BOTTOM);
            }
            _ => {}
        }

        y += block.gap_bottom();
        tracing::debug!(cursor = y, "block laid out");
    }

    let width = config.width;
    let height = (y + config.margins.bottom as f32).ceil() as usize;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><rect width="100%" height="100%" fill="white"/>"#,
        w = width,
        h = height
    );
    for path in &paths {
        svg.push_str(path);
    }
    svg.push_str("</svg>");

    Ok(TicketLayout {
        svg,
        placements,
        width,
        height,
    })
}

async fn load_block_photo<S: TextShaper + ?Sized>(
    photo: &PhotoBlock,
    ctx: &LayoutContext<'_, S>,
) -> Result<PhotoBitmap, TicketError> {
    let defaults = &ctx.config.photo;
    let content_width = ctx.config.content_width();

    let max_width = photo.max_width.unwrap_or(content_width).min(content_width);
    let max_height = photo.max_height.unwrap_or(defaults.max_height);

    let options = PhotoOptions {
        circle_mask: photo.circle_mask.unwrap_or(defaults.circle_mask),
        border: photo.border.unwrap_or(defaults.border),
        dither: photo.dither,
    };

    photo::load_photo_bitmap(ctx.client, &photo.src, max_width, max_height, options).await
}

/// One line of title or body text.
struct TextLine<'a> {
    text: &'a str,
    font_size: f32,
    weight: Weight,
    align: Align,
    one_line: bool,
}

impl TextLine<'_> {
    /// Glyph path positioned at `y` and the height the line occupies.
    fn render<S: TextShaper + ?Sized>(
        &self,
        shaper: &S,
        left_margin: f32,
        content_width: f32,
        y: f32,
    ) -> (String, f32) {
        let mut font_size = self.font_size;
        let mut metrics = shaper.measure(self.text, font_size, self.weight);

        if self.one_line && metrics.width > content_width && metrics.width > 0.0 {
            font_size *= content_width / metrics.width;
            metrics = shaper.measure(self.text, font_size, self.weight);
        }

        let x = match self.align {
            Align::Left => left_margin,
            Align::Center => (left_margin + (content_width - metrics.width) / 2.0).floor(),
            Align::Right => (left_margin + content_width - metrics.width).floor(),
        };

        let path = shaper.glyph_path(self.text, x, y, font_size, self.weight);
        (path, metrics.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::TextMetrics;
    use crate::ticket::block::{TextBlock, TitleBlock};
    use crate::ticket::PhotoSource;

    /// Every glyph is a `size/2` wide box, lines are `size` tall.
    struct BoxShaper;

    impl TextShaper for BoxShaper {
        fn measure(&self, text: &str, font_size: f32, _weight: Weight) -> TextMetrics {
            TextMetrics {
                width: text.chars().count() as f32 * font_size / 2.0,
                height: font_size,
            }
        }

        fn glyph_path(&self, text: &str, x: f32, y: f32, font_size: f32, weight: Weight) -> String {
            let w = self.measure(text, font_size, weight).width;
            format!(
                r#"<path fill="black" d="M{x} {y}L{r} {y}L{r} {b}L{x} {b}Z"/>"#,
                r = x + w,
                b = y + font_size
            )
        }
    }

    fn text(content: &str, size: f32, gap_top: f32, gap_bottom: f32) -> TicketBlock {
        TicketBlock::Text(TextBlock {
            text: content.to_string(),
            font_size: Some(size),
            gap_top: Some(gap_top),
            gap_bottom: Some(gap_bottom),
            ..Default::default()
        })
    }

    async fn run(blocks: &[TicketBlock], config: &PrinterConfig) -> TicketLayout {
        let client = reqwest::Client::new();
        let ctx = LayoutContext {
            config,
            shaper: &BoxShaper,
            client: &client,
        };
        layout_ticket(blocks, &ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_text_only_height() {
        let config = PrinterConfig::default();
        let blocks = vec![
            text("one", 20.0, 3.0, 4.0),
            text("two", 18.0, 0.0, 10.0),
            text("three", 30.0, 5.0, 0.0),
        ];
        let layout = run(&blocks, &config).await;

        let expected = 12.0 + (3.0 + 20.0 + 4.0) + (18.0 + 10.0) + (5.0 + 30.0) + 8.0;
        assert_eq!(layout.height, expected as usize);
        assert_eq!(layout.width, 384);
        assert!(layout.placements.is_empty());
    }

    #[tokio::test]
    async fn test_fractional_height_rounds_up() {
        let config = PrinterConfig::default();
        let layout = run(&[text("x", 10.5, 0.0, 0.0)], &config).await;
        // 12 + 10.5 + 8 = 30.5
        assert_eq!(layout.height, 31);
    }

    #[tokio::test]
    async fn test_empty_text_contributes_only_gaps() {
        let config = PrinterConfig::default();
        let blocks = vec![text("", 40.0, 2.0, 3.0)];
        let layout = run(&blocks, &config).await;
        assert_eq!(layout.height, 12 + 2 + 3 + 8);
        assert!(!layout.svg.contains("<path"));
    }

    #[tokio::test]
    async fn test_default_sizes() {
        let config = PrinterConfig::default();
        let layout = run(&[TicketBlock::title("T"), TicketBlock::text("t")], &config).await;
        assert_eq!(layout.height, 12 + 24 + 18 + 8);
    }

    #[tokio::test]
    async fn test_alignment() {
        let config = PrinterConfig::default();
        let line = |align| {
            TicketBlock::Text(TextBlock {
                text: "abcd".to_string(),
                font_size: Some(20.0),
                align,
                ..Default::default()
            })
        };
        // "abcd" at 20px is 40 wide; content is 356 wide starting at 14
        let left = run(&[line(Align::Left)], &config).await;
        assert!(left.svg.contains("M14 12L54 12"), "{}", left.svg);

        let center = run(&[line(Align::Center)], &config).await;
        assert!(center.svg.contains("M172 12L212 12"), "{}", center.svg);

        let right = run(&[line(Align::Right)], &config).await;
        assert!(right.svg.contains("M330 12L370 12"), "{}", right.svg);
    }

    #[tokio::test]
    async fn test_one_line_title_shrinks() {
        let config = PrinterConfig::default();
        // 40 chars at 24px would be 480 wide
        let long = "x".repeat(40);
        let block = TicketBlock::Title(TitleBlock {
            text: long.clone(),
            font_size: Some(24.0),
            one_line: true,
            ..Default::default()
        });
        let layout = run(&[block], &config).await;
        let scaled = 24.0 * 356.0 / 480.0;
        assert_eq!(layout.height, (12.0f32 + scaled + 8.0).ceil() as usize);

        let wrapped = TicketBlock::Title(TitleBlock {
            text: long,
            font_size: Some(24.0),
            ..Default::default()
        });
        let layout = run(&[wrapped], &config).await;
        assert_eq!(layout.height, 12 + 24 + 8);
    }

    #[tokio::test]
    async fn test_svg_document() {
        let config = PrinterConfig::default();
        let layout = run(&[TicketBlock::title("Hi")], &config).await;
        assert!(layout.svg.starts_with("<svg"));
        assert!(layout.svg.contains(r#"width="384""#));
        assert!(layout.svg.contains(&format!(r#"height="{}""#, layout.height)));
        assert!(layout.svg.contains(r#"fill="white""#));
        assert!(layout.svg.ends_with("</svg>"));
    }

    #[tokio::test]
    async fn test_empty_photo_source_is_skipped() {
        let config = PrinterConfig::default();
        let layout = run(&[TicketBlock::photo(PhotoSource::default())], &config).await;
        assert!(layout.placements.is_empty());
        assert_eq!(layout.height, 12 + 8);
    }

    #[tokio::test]
    async fn test_broken_photo_aborts_layout() {
        let config = PrinterConfig::default();
        let client = reqwest::Client::new();
        let ctx = LayoutContext {
            config: &config,
            shaper: &BoxShaper,
            client: &client,
        };
        let blocks = vec![
            TicketBlock::title("before"),
            TicketBlock::photo(PhotoSource::Bytes(vec![1, 2, 3])),
        ];
        assert!(layout_ticket(&blocks, &ctx).await.is_err());
    }
}
