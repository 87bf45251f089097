//! Ticket block types.
//!
//! A ticket is an ordered list of [`TicketBlock`]s rendered top to bottom.
//! Blocks carry data only; the layout engine is the single place that
//! dispatches on the variant.
//!
//! Blocks deserialize from JSON tagged by `type`:
//!
//! ```
//! use ticketera::ticket::TicketBlock;
//!
//! let blocks: Vec<TicketBlock> = serde_json::from_str(r#"[
//!     {"type": "title", "text": "NEW FOLLOWER!", "fontSize": 32, "weight": "bold"},
//!     {"type": "photo", "src": "https://example.com/avatar.png", "circleMask": true},
//!     {"type": "text", "text": "Thanks!", "align": "center", "gapBottom": 80}
//! ]"#).unwrap();
//!
//! assert_eq!(blocks.len(), 3);
//! ```

use serde::{Deserialize, Serialize};

use crate::font::Weight;
use crate::render::dither::DitherConfig;

/// Default font size of title blocks, in pixels per em.
pub const DEFAULT_TITLE_SIZE: f32 = 24.0;

/// Default font size of text blocks, in pixels per em.
pub const DEFAULT_TEXT_SIZE: f32 = 18.0;

/// Default space above a photo.
pub const DEFAULT_PHOTO_GAP_TOP: f32 = 16.0;

/// Default space below a photo.
pub const DEFAULT_PHOTO_GAP_BOTTOM: f32 = 2.0;

/// Horizontal placement of a text line within the content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

/// One content unit of a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TicketBlock {
    Title(TitleBlock),
    Text(TextBlock),
    Photo(PhotoBlock),
}

/// A heading line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TitleBlock {
    pub text: String,
    pub font_size: Option<f32>,
    pub weight: Weight,
    /// Shrink the font so the title never exceeds the content width.
    pub one_line: bool,
    pub align: Align,
    pub gap_top: Option<f32>,
    pub gap_bottom: Option<f32>,
}

/// A body text line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextBlock {
    pub text: String,
    pub font_size: Option<f32>,
    pub weight: Weight,
    pub align: Align,
    pub gap_top: Option<f32>,
    pub gap_bottom: Option<f32>,
}

/// Where a photo's bytes come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhotoSource {
    /// Fetched over HTTP when the ticket is rendered.
    Url(String),
    /// Already-encoded image file contents.
    Bytes(Vec<u8>),
}

impl PhotoSource {
    pub fn is_empty(&self) -> bool {
        match self {
            PhotoSource::Url(url) => url.is_empty(),
            PhotoSource::Bytes(bytes) => bytes.is_empty(),
        }
    }
}

impl Default for PhotoSource {
    fn default() -> Self {
        PhotoSource::Url(String::new())
    }
}

/// A dithered photo, optionally masked to a circle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhotoBlock {
    pub src: PhotoSource,
    pub max_width: Option<usize>,
    pub max_height: Option<usize>,
    /// Defaults to the printer's photo settings when unset.
    pub circle_mask: Option<bool>,
    /// Defaults to the printer's photo settings when unset.
    pub border: Option<bool>,
    pub dither: DitherConfig,
    pub auto_gap_top: Option<f32>,
    pub auto_gap_bottom: Option<f32>,
    pub gap_top: Option<f32>,
    pub gap_bottom: Option<f32>,
}

impl TicketBlock {
    /// Title block with default styling.
    pub fn title(text: impl Into<String>) -> Self {
        TicketBlock::Title(TitleBlock {
            text: text.into(),
            ..Default::default()
        })
    }

    /// Text block with default styling.
    pub fn text(text: impl Into<String>) -> Self {
        TicketBlock::Text(TextBlock {
            text: text.into(),
            ..Default::default()
        })
    }

    /// Photo block with default settings.
    pub fn photo(src: PhotoSource) -> Self {
        TicketBlock::Photo(PhotoBlock {
            src,
            ..Default::default()
        })
    }

    pub fn gap_top(&self) -> f32 {
        match self {
            TicketBlock::Title(b) => b.gap_top,
            TicketBlock::Text(b) => b.gap_top,
            TicketBlock::Photo(b) => b.gap_top,
        }
        .unwrap_or(0.0)
    }

    pub fn gap_bottom(&self) -> f32 {
        match self {
            TicketBlock::Title(b) => b.gap_bottom,
            TicketBlock::Text(b) => b.gap_bottom,
            TicketBlock::Photo(b) => b.gap_bottom,
        }
        .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::dither::DitherMode;

    #[test]
    fn test_title_defaults() {
        let block: TicketBlock = serde_json::from_str(r#"{"type":"title","text":"Hi"}"#).unwrap();
        match block {
            TicketBlock::Title(t) => {
                assert_eq!(t.text, "Hi");
                assert_eq!(t.font_size, None);
                assert_eq!(t.weight, Weight::Regular);
                assert_eq!(t.align, Align::Center);
                assert!(!t.one_line);
            }
            other => panic!("Expected title, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_text_is_empty() {
        let block: TicketBlock = serde_json::from_str(r#"{"type":"text","gapTop":4}"#).unwrap();
        assert_eq!(block, TicketBlock::Text(TextBlock {
            gap_top: Some(4.0),
            ..Default::default()
        }));
    }

    #[test]
    fn test_photo_block_fields() {
        let block: TicketBlock = serde_json::from_str(
            r#"{"type":"photo","src":"https://x/y.png","maxHeight":100,"circleMask":false,
                "dither":{"mode":"bayer","matrixSize":8},"autoGapTop":4}"#,
        )
        .unwrap();
        let TicketBlock::Photo(photo) = block else {
            panic!("Expected photo block");
        };
        assert_eq!(photo.src, PhotoSource::Url("https://x/y.png".to_string()));
        assert_eq!(photo.max_height, Some(100));
        assert_eq!(photo.circle_mask, Some(false));
        assert_eq!(photo.border, None);
        assert_eq!(photo.dither.mode, DitherMode::Bayer);
        assert_eq!(photo.auto_gap_top, Some(4.0));
    }

    #[test]
    fn test_photo_bytes_source() {
        let src: PhotoSource = serde_json::from_str("[137, 80, 78, 71]").unwrap();
        assert_eq!(src, PhotoSource::Bytes(vec![137, 80, 78, 71]));
        assert!(!src.is_empty());
        assert!(PhotoSource::default().is_empty());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result = serde_json::from_str::<TicketBlock>(r#"{"type":"barcode"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_gaps() {
        let block = TicketBlock::Text(TextBlock {
            gap_top: Some(3.0),
            gap_bottom: Some(5.0),
            ..Default::default()
        });
        assert_eq!(block.gap_top(), 3.0);
        assert_eq!(block.gap_bottom(), 5.0);
        assert_eq!(TicketBlock::title("x").gap_bottom(), 0.0);
    }
}
