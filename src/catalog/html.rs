//! Legacy HTML strategy.
//!
//! Letter pages (`/profiles/letter/X`) list programs, each with its latest
//! episodes inline. Programs therefore arrive fully populated and get a
//! synthetic `orf://program/<uuid>` locator that routes to a passthrough.
//! Episode pages embed the player playlist as JSON in a `data-jsb`
//! attribute; its progressive sources are ranked by quality tier.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::strategy::{CatalogStrategy, Route};
use crate::error::{ParserError, Result};
use crate::html::{select_all, select_attr, select_text};
use crate::http_client::Fetcher;
use crate::page::{Page, PageNode, VideoDetails};
use crate::protocols::ProtocolSet;
use crate::quality::{select_progressive, VideoSource};

/// `datetime` attribute format of episode `<time>` elements.
pub const EPISODE_TIME_FORMAT: &str = "%B %d, %Y %H:%M";
/// Display format used when an episode has no title of its own.
pub const EPISODE_TITLE_FORMAT: &str = "%d.%m.%Y %H:%M";

const PROGRAM_ITEMS: &str = "div.mod_results_list ul li.results_item";
const PROGRAM_TITLE: &str = "h4.base_list_item_headline";
const EPISODE_ITEMS: &str = "ul.latest_episodes li.base_list_item";
const PLAYLIST: &str = "div.jsb_VideoPlaylist";

pub struct HtmlStrategy {
    parser_id: String,
}

impl HtmlStrategy {
    pub fn new(parser_id: &str) -> Self {
        Self {
            parser_id: parser_id.to_string(),
        }
    }

    /// Programs (with their latest episodes) listed on a letter page.
    pub fn parse_letter_page(&self, content: &str) -> Result<Vec<PageNode>> {
        let mut programs = Vec::new();
        for item in select_all(content, PROGRAM_ITEMS)? {
            let Some(title) = select_text(&item, PROGRAM_TITLE)? else {
                warn!("Skipping program item without headline");
                continue;
            };
            let page = Page::overview(format!("orf://program/{}", Uuid::new_v4()), title)
                .with_parser(&self.parser_id);
            let episodes = self.parse_episodes(&item, &page.title)?;
            programs.push(PageNode::with_children(page, episodes));
        }
        Ok(programs)
    }

    fn parse_episodes(&self, item: &str, program_title: &str) -> Result<Vec<PageNode>> {
        let mut episodes = Vec::new();
        for episode in select_all(item, EPISODE_ITEMS)? {
            let Some(href) = select_attr(&episode, "a", "href")? else {
                warn!("Skipping episode of {:?} without link", program_title);
                continue;
            };
            let link_title = select_attr(&episode, "a", "title")?.unwrap_or_default();
            let publish_date = parse_publish_date(select_attr(&episode, "time", "datetime")?.as_deref());

            let title = if link_title.to_lowercase() == program_title.to_lowercase() {
                publish_date.format(EPISODE_TITLE_FORMAT).to_string()
            } else {
                link_title
            };

            let mut page = Page::overview(href, title).with_parser(&self.parser_id);
            page.user_data.publish_date = Some(publish_date);
            episodes.push(PageNode::leaf(page));
        }
        Ok(episodes)
    }

    /// Videos of the playlist embedded in an episode page.
    pub fn parse_playlist(&self, episode: &Page, content: &str) -> Result<Vec<PageNode>> {
        let encoded = select_attr(content, PLAYLIST, "data-jsb")?
            .ok_or_else(|| ParserError::malformed(&episode.uri, "no embedded playlist"))?;
        let player: Value = serde_json::from_str(&encoded)?;
        let videos = player
            .pointer("/playlist/videos")
            .and_then(Value::as_array)
            .ok_or_else(|| ParserError::malformed(&episode.uri, "playlist has no videos"))?;

        videos
            .iter()
            .map(|video| self.parse_video(episode, video))
            .collect()
    }

    fn parse_video(&self, episode: &Page, video: &Value) -> Result<PageNode> {
        let title = video
            .get("title")
            .and_then(Value::as_str)
            .ok_or_else(|| ParserError::malformed(&episode.uri, "video without title"))?;
        let hash = video
            .get("hash")
            .and_then(Value::as_str)
            .ok_or_else(|| ParserError::malformed(&episode.uri, "video without hash"))?;

        let duration = video
            .get("duration")
            .and_then(Value::as_u64)
            .map_or_else(
                || {
                    warn!("Couldn't parse duration of {:?}", title);
                    0
                },
                |ms| ms / 1000,
            );

        let sources: Vec<VideoSource> = video
            .get("sources")
            .and_then(Value::as_array)
            .map(|sources| sources.iter().map(video_source).collect())
            .unwrap_or_default();
        let video_uri = select_progressive(&sources, title)?;

        let details = VideoDetails {
            duration,
            publish_date: episode.user_data.publish_date,
            description: video
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            thumbnail: video
                .get("preview_image_url")
                .and_then(Value::as_str)
                .map(str::to_string),
            video_uri,
        };
        let mut page = Page::video(format!("{}#{hash}", episode.uri), title, details)
            .with_parser(&self.parser_id);
        page.user_data.publish_date = episode.user_data.publish_date;
        Ok(PageNode::leaf(page))
    }
}

#[async_trait]
impl CatalogStrategy for HtmlStrategy {
    fn name(&self) -> &'static str {
        "html"
    }

    fn classify(&self, uri: &str) -> Route {
        if uri.contains("/letter/") {
            Route::Letter
        } else if uri.contains("/program/") {
            Route::Passthrough
        } else {
            Route::Episode
        }
    }

    async fn program_directory(&self, _fetcher: &dyn Fetcher) -> Result<Option<Vec<PageNode>>> {
        Ok(None)
    }

    async fn letter_programs(&self, fetcher: &dyn Fetcher, letter: &Page) -> Result<Option<Vec<PageNode>>> {
        let content = fetcher.fetch_text(&letter.uri).await?;
        let programs = self.parse_letter_page(&content)?;
        debug!("Letter page {} lists {} programs", letter.title, programs.len());
        Ok(Some(programs))
    }

    async fn videos(
        &self,
        fetcher: &dyn Fetcher,
        episode: &Page,
        _protocols: &ProtocolSet,
    ) -> Result<Vec<PageNode>> {
        let content = fetcher.fetch_text(&episode.uri).await?;
        self.parse_playlist(episode, &content)
    }
}

fn video_source(source: &Value) -> VideoSource {
    let field = |name: &str| {
        source
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    VideoSource {
        delivery: field("delivery"),
        protocol: field("protocol"),
        quality: field("quality_string"),
        url: field("src"),
    }
}

/// Parse an episode `datetime` attribute, epoch zero if absent or invalid.
pub fn parse_publish_date(value: Option<&str>) -> NaiveDateTime {
    let parsed = value.and_then(|v| NaiveDateTime::parse_from_str(v.trim(), EPISODE_TIME_FORMAT).ok());
    parsed.unwrap_or_else(|| {
        warn!("Couldn't parse publish date {:?}", value);
        DateTime::<Utc>::UNIX_EPOCH.naive_utc()
    })
}
