//! # Follower Alert Ticket
//!
//! Block list printed when a new follower arrives:
//!
//! ```text
//! ┌──────────────────────────┐
//! │      NEW FOLLOWER!       │  bold, shrunk to one line
//! │        (avatar)          │  optional, circular
//! │        username          │  bold
//! │     16/10/26 18:42       │
//! │ Thanks for following ... │
//! └──────────────────────────┘
//! ```

use chrono::{DateTime, Local, TimeZone};
use serde::Deserialize;

use super::block::{Align, PhotoBlock, PhotoSource, TextBlock, TicketBlock, TitleBlock};
use crate::font::Weight;
use crate::printer::PrinterConfig;

/// Channel lookup endpoint; the username is appended as one path segment.
pub const KICK_CHANNEL_API: &str = "https://kick.com/api/v2/channels";

pub const FOLLOWER_HEADLINE: &str = "NEW FOLLOWER!";
pub const FOLLOWER_THANKS: &str = "Thanks for following the channel!";

/// Build the follower ticket stamped with the current local time.
pub fn follower_ticket(username: &str, avatar_url: Option<&str>, config: &PrinterConfig) -> Vec<TicketBlock> {
    follower_ticket_at(username, avatar_url, config, &Local::now())
}

/// Build the follower ticket stamped with `at`.
pub fn follower_ticket_at<Tz: TimeZone>(
    username: &str,
    avatar_url: Option<&str>,
    config: &PrinterConfig,
    at: &DateTime<Tz>,
) -> Vec<TicketBlock>
where
    Tz::Offset: std::fmt::Display,
{
    let mut blocks = vec![TicketBlock::Title(TitleBlock {
        text: FOLLOWER_HEADLINE.to_string(),
        font_size: Some(32.0),
        weight: Weight::Bold,
        one_line: true,
        gap_bottom: Some(10.0),
        ..Default::default()
    })];

    if let Some(url) = avatar_url.filter(|url| !url.is_empty()) {
        blocks.push(TicketBlock::Photo(PhotoBlock {
            src: PhotoSource::Url(url.to_string()),
            max_width: Some(config.photo.max_width),
            max_height: Some(config.photo.max_height),
            auto_gap_top: Some(16.0),
            auto_gap_bottom: Some(16.0),
            ..Default::default()
        }));
    }

    blocks.push(TicketBlock::Title(TitleBlock {
        text: username.to_string(),
        font_size: Some(36.0),
        weight: Weight::Bold,
        gap_bottom: Some(8.0),
        ..Default::default()
    }));
    blocks.push(TicketBlock::Text(TextBlock {
        text: format_timestamp(at),
        font_size: Some(24.0),
        align: Align::Center,
        gap_bottom: Some(10.0),
        ..Default::default()
    }));
    blocks.push(TicketBlock::Text(TextBlock {
        text: FOLLOWER_THANKS.to_string(),
        font_size: Some(28.0),
        align: Align::Center,
        gap_bottom: Some(80.0),
        ..Default::default()
    }));

    blocks
}

/// Short date and time: `dd/mm/yy HH:MM`.
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%d/%m/%y %H:%M").to_string()
}

#[derive(Debug, Deserialize)]
struct Channel {
    user: Option<ChannelUser>,
}

#[derive(Debug, Deserialize)]
struct ChannelUser {
    profile_pic: Option<String>,
}

/// Look up a Kick user's avatar URL.
///
/// Any failure (network, status, malformed body, missing picture) is logged
/// and yields `None`; the ticket is then printed without a photo.
pub async fn kick_avatar(client: &reqwest::Client, username: &str) -> Option<String> {
    let url = channel_url(username)?;

    let response = match client.get(url).send().await {
        Ok(response) if response.status().is_success() => response,
        Ok(response) => {
            tracing::warn!(username, status = %response.status(), "avatar lookup failed");
            return None;
        }
        Err(e) => {
            tracing::warn!(username, error = %e, "avatar lookup failed");
            return None;
        }
    };

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(username, error = %e, "avatar lookup failed");
            return None;
        }
    };

    parse_profile_pic(&body).or_else(|| {
        tracing::warn!(username, "channel has no profile picture");
        None
    })
}

/// Channel endpoint for `username`, trimmed, lowercased and escaped.
///
/// `None` for a blank username.
pub fn channel_url(username: &str) -> Option<reqwest::Url> {
    let name = username.trim().to_lowercase();
    if name.is_empty() {
        return None;
    }
    let mut url = reqwest::Url::parse(KICK_CHANNEL_API).ok()?;
    url.path_segments_mut().ok()?.push(&name);
    Some(url)
}

fn parse_profile_pic(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<Channel>(body)
        .ok()?
        .user?
        .profile_pic
        .filter(|url| !url.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use pretty_assertions::assert_eq;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 5, 9, 7, 0).unwrap()
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(&at()), "05/01/24 09:07");

        let offset = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(format_timestamp(&at().with_timezone(&offset)), "05/01/24 10:07");
    }

    #[test]
    fn test_blocks_without_avatar() {
        let blocks = follower_ticket_at("alice", None, &PrinterConfig::default(), &at());
        assert_eq!(blocks.len(), 4);

        match &blocks[0] {
            TicketBlock::Title(t) => {
                assert_eq!(t.text, "NEW FOLLOWER!");
                assert_eq!(t.font_size, Some(32.0));
                assert!(t.one_line);
                assert_eq!(t.weight, Weight::Bold);
            }
            other => panic!("Expected title, got {:?}", other),
        }
        match &blocks[1] {
            TicketBlock::Title(t) => {
                assert_eq!(t.text, "alice");
                assert_eq!(t.font_size, Some(36.0));
                assert_eq!(t.gap_bottom, Some(8.0));
            }
            other => panic!("Expected title, got {:?}", other),
        }
        match &blocks[2] {
            TicketBlock::Text(t) => {
                assert_eq!(t.text, "05/01/24 09:07");
                assert_eq!(t.align, Align::Center);
            }
            other => panic!("Expected text, got {:?}", other),
        }
        assert_eq!(blocks[3].gap_bottom(), 80.0);
    }

    #[test]
    fn test_blocks_with_avatar() {
        let config = PrinterConfig::default();
        let blocks = follower_ticket_at("bob", Some("https://example.com/a.png"), &config, &at());
        assert_eq!(blocks.len(), 5);

        match &blocks[1] {
            TicketBlock::Photo(p) => {
                assert_eq!(p.src, PhotoSource::Url("https://example.com/a.png".to_string()));
                assert_eq!(p.max_width, Some(220));
                assert_eq!(p.max_height, Some(220));
                assert_eq!(p.auto_gap_top, Some(16.0));
                assert_eq!(p.auto_gap_bottom, Some(16.0));
            }
            other => panic!("Expected photo, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_avatar_is_skipped() {
        let blocks = follower_ticket_at("carol", Some(""), &PrinterConfig::default(), &at());
        assert!(!blocks.iter().any(|b| matches!(b, TicketBlock::Photo(_))));
    }

    #[test]
    fn test_channel_url() {
        let url = |name: &str| channel_url(name).map(|u| u.to_string());

        assert_eq!(
            url("alice"),
            Some("https://kick.com/api/v2/channels/alice".to_string())
        );
        assert_eq!(
            url(" Alice "),
            Some("https://kick.com/api/v2/channels/alice".to_string())
        );
        assert_eq!(
            url("a/b c"),
            Some("https://kick.com/api/v2/channels/a%2Fb%20c".to_string())
        );
        assert_eq!(url(""), None);
        assert_eq!(url("   "), None);
    }

    #[tokio::test]
    async fn test_blank_username_skips_lookup() {
        let client = reqwest::Client::new();
        assert_eq!(kick_avatar(&client, "  ").await, None);
    }

    #[test]
    fn test_parse_profile_pic() {
        let body = br#"{"id":1,"user":{"username":"alice","profile_pic":"https://files.kick.com/a.webp"}}"#;
        assert_eq!(
            parse_profile_pic(body),
            Some("https://files.kick.com/a.webp".to_string())
        );
        assert_eq!(parse_profile_pic(br#"{"user":{"profile_pic":null}}"#), None);
        assert_eq!(parse_profile_pic(br#"{"user":null}"#), None);
        assert_eq!(parse_profile_pic(b"<html>"), None);
    }
}
