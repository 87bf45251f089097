//! # Tickets
//!
//! A ticket is an ordered list of [`TicketBlock`]s laid out top to bottom on
//! one continuous canvas.
//!
//! - [`block`]: block types and their serialized form
//! - [`layout`]: the vertical-cursor layout engine
//! - [`follower`]: the "new follower" alert ticket
//!
//! ## JSON Form
//!
//! ```json
//! [
//!   { "type": "title", "text": "NEW FOLLOWER!", "fontSize": 32, "oneLine": true },
//!   { "type": "photo", "src": "https://example.com/avatar.png", "circleMask": true },
//!   { "type": "text", "text": "Thanks!", "align": "center", "gapBottom": 80 }
//! ]
//! ```

pub mod block;
pub mod follower;
pub mod layout;

pub use block::{Align, PhotoBlock, PhotoSource, TextBlock, TicketBlock, TitleBlock};
pub use follower::{follower_ticket, format_timestamp, kick_avatar};
pub use layout::{LayoutContext, Placement, TicketLayout, layout_ticket};
