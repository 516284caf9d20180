//! JSON service strategy.
//!
//! Endpoints, all relative to the configured service base:
//!
//! - `programs?page=0&entries_per_page=N`: program directory (`programShorts`)
//! - `episodes/by_program/<programId>?page=0&entries_per_page=N`: episode
//!   listing (`episodeShorts`), each entry naming its own detail URL
//! - `episode/<episodeId>`: episode detail (`episodeDetail.segments`)
//!
//! Letter buckets are filled on root refresh, so letter locators pass
//! through untouched.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::strategy::{CatalogStrategy, Route};
use crate::config::ParserConfig;
use crate::error::{ParserError, Result};
use crate::http_client::Fetcher;
use crate::page::{Page, PageNode, VideoDetails};
use crate::protocols::ProtocolSet;
use crate::quality::select_streaming;

/// Format of `livedate` fields, e.g. `10.08.2014 12:05:00`.
pub const LIVEDATE_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

const TEASER_FIELD: &str = "small_teaser_text";

static LETTER_URI: Lazy<Regex> = Lazy::new(|| Regex::new(r"/letter/[0-9A-Za-z]/?$").unwrap());
static EPISODE_DETAIL_URI: Lazy<Regex> = Lazy::new(|| Regex::new(r"/episode/\d+").unwrap());

const JSON_HEADERS: &[(&str, &str)] = &[("Accept", "application/json")];

pub struct ServiceStrategy {
    parser_id: String,
    service_base: String,
    entries_per_page: u32,
}

impl ServiceStrategy {
    pub fn new(parser_id: &str, config: &ParserConfig) -> Self {
        Self {
            parser_id: parser_id.to_string(),
            service_base: config.service_base.trim_end_matches('/').to_string(),
            entries_per_page: config.entries_per_page,
        }
    }

    pub fn programs_url(&self) -> String {
        format!(
            "{}/programs?page=0&entries_per_page={}",
            self.service_base, self.entries_per_page
        )
    }

    pub fn episodes_url(&self, program_id: i64) -> String {
        format!(
            "{}/episodes/by_program/{program_id}?page=0&entries_per_page={}",
            self.service_base, self.entries_per_page
        )
    }

    pub fn episode_url(&self, episode_id: i64) -> String {
        format!("{}/episode/{episode_id}", self.service_base)
    }

    async fn fetch_json(&self, fetcher: &dyn Fetcher, url: &str) -> Result<Value> {
        let body = fetcher.fetch_text_with_headers(url, JSON_HEADERS).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Turn a `programShorts` document into program pages.
    ///
    /// Programs without episodes are dropped.
    pub fn parse_program_directory(&self, data: &Value) -> Result<Vec<PageNode>> {
        let programs = data
            .pointer("/programShorts")
            .and_then(Value::as_array)
            .ok_or_else(|| ParserError::malformed("program directory", "missing programShorts"))?;

        let mut pages = Vec::with_capacity(programs.len());
        for program in programs {
            let Some(name) = program.get("name").and_then(Value::as_str) else {
                warn!("Skipping program without name: {}", program);
                continue;
            };
            let Some(program_id) = program.get("programId").and_then(as_i64_lenient) else {
                warn!("Skipping program {:?} without programId", name);
                continue;
            };
            let episodes = program
                .get("episodesCount")
                .and_then(as_i64_lenient)
                .unwrap_or_else(|| {
                    warn!("Couldn't parse episodesCount of {:?}", name);
                    0
                });
            if episodes <= 0 {
                continue;
            }

            let page = Page::overview(self.episodes_url(program_id), name.trim())
                .with_parser(&self.parser_id);
            pages.push(PageNode::leaf(page));
        }

        Ok(pages)
    }

    /// Turn an `episodeShorts` document into episode pages.
    pub fn parse_episode_listing(&self, data: &Value) -> Result<Vec<PageNode>> {
        let episodes = data
            .pointer("/episodeShorts")
            .and_then(Value::as_array)
            .ok_or_else(|| ParserError::malformed("episode listing", "missing episodeShorts"))?;

        let mut pages = Vec::with_capacity(episodes.len());
        for episode in episodes {
            let title = episode.get("title").and_then(Value::as_str).unwrap_or_default();
            let livedate = episode.get("livedate").and_then(Value::as_str).unwrap_or_default();

            let detail_uri = match episode.get("detailApiCall").and_then(Value::as_str) {
                Some(uri) => uri.to_string(),
                None => match episode.get("episodeId").and_then(as_i64_lenient) {
                    Some(id) => self.episode_url(id),
                    None => {
                        warn!("Skipping episode {:?} without detail locator", title);
                        continue;
                    }
                },
            };

            let mut page = Page::overview(detail_uri, format!("{title} - {livedate}"))
                .with_parser(&self.parser_id);
            page.user_data.publish_date = parse_livedate(livedate);
            pages.push(PageNode::leaf(page));
        }

        Ok(pages)
    }

    /// Turn an `episodeDetail` document into one video page per segment.
    ///
    /// Segment order is kept. One unresolvable segment fails the episode.
    pub fn parse_episode_detail(
        &self,
        episode_uri: &str,
        data: &Value,
        protocols: &ProtocolSet,
    ) -> Result<Vec<PageNode>> {
        let detail = data
            .pointer("/episodeDetail")
            .ok_or_else(|| ParserError::malformed("episode detail", "missing episodeDetail"))?;
        let segments = detail
            .get("segments")
            .and_then(Value::as_array)
            .ok_or_else(|| ParserError::malformed("episode detail", "missing segments"))?;

        let publish_date = detail
            .get("livedate")
            .and_then(Value::as_str)
            .and_then(parse_livedate);
        if publish_date.is_none() {
            warn!("Couldn't parse publish date of {}", episode_uri);
        }

        segments
            .iter()
            .map(|segment| self.parse_segment(episode_uri, segment, publish_date, protocols))
            .collect()
    }

    fn parse_segment(
        &self,
        episode_uri: &str,
        segment: &Value,
        publish_date: Option<NaiveDateTime>,
        protocols: &ProtocolSet,
    ) -> Result<PageNode> {
        let segment_id = segment
            .get("segmentId")
            .and_then(as_i64_lenient)
            .ok_or_else(|| ParserError::malformed("segment", "missing segmentId"))?;
        let title = segment
            .get("title")
            .and_then(Value::as_str)
            .ok_or_else(|| ParserError::malformed(format!("segment {segment_id}"), "missing title"))?;
        let videos = segment
            .get("videos")
            .and_then(Value::as_array)
            .ok_or_else(|| ParserError::malformed(format!("segment {segment_id}"), "missing videos"))?;

        let urls: Vec<&str> = videos
            .iter()
            .filter_map(|v| {
                let url = v.get("streamingUrl").and_then(Value::as_str);
                if url.is_none() {
                    debug!("Ignoring video without streamingUrl in segment {}", segment_id);
                }
                url
            })
            .collect();
        let selection = select_streaming(&urls, protocols)?;

        let details = VideoDetails {
            duration: parse_duration(segment),
            publish_date,
            description: parse_description(segment),
            thumbnail: parse_thumbnail(segment),
            video_uri: selection.url,
        };
        let mut page = Page::video(format!("{episode_uri}#segment_{segment_id}"), title, details)
            .with_parser(&self.parser_id);
        page.user_data.segment_id = Some(segment_id);
        page.user_data.publish_date = publish_date;
        page.user_data.rtmp_stream_name = selection.rtmp_stream_name;

        Ok(PageNode::leaf(page))
    }
}

#[async_trait]
impl CatalogStrategy for ServiceStrategy {
    fn name(&self) -> &'static str {
        "service"
    }

    fn classify(&self, uri: &str) -> Route {
        if LETTER_URI.is_match(uri) {
            Route::Passthrough
        } else if EPISODE_DETAIL_URI.is_match(uri) {
            Route::Episode
        } else {
            Route::Listing
        }
    }

    async fn program_directory(&self, fetcher: &dyn Fetcher) -> Result<Option<Vec<PageNode>>> {
        let data = self.fetch_json(fetcher, &self.programs_url()).await?;
        let programs = self.parse_program_directory(&data)?;
        info!("Program directory lists {} programs with episodes", programs.len());
        Ok(Some(programs))
    }

    async fn episodes(&self, fetcher: &dyn Fetcher, program: &Page) -> Result<Option<Vec<PageNode>>> {
        let data = self.fetch_json(fetcher, &program.uri).await?;
        self.parse_episode_listing(&data).map(Some)
    }

    async fn videos(
        &self,
        fetcher: &dyn Fetcher,
        episode: &Page,
        protocols: &ProtocolSet,
    ) -> Result<Vec<PageNode>> {
        let data = self.fetch_json(fetcher, &episode.uri).await?;
        self.parse_episode_detail(&episode.uri, &data, protocols)
    }
}

/// Parse a `livedate` value, `None` if it is not in the expected format.
pub fn parse_livedate(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), LIVEDATE_FORMAT).ok()
}

/// Integers sometimes arrive as strings.
fn as_i64_lenient(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn parse_duration(segment: &Value) -> u64 {
    let duration = segment.get("duration").and_then(|d| {
        d.as_u64()
            .or_else(|| d.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .or_else(|| d.as_str().and_then(|s| s.trim().parse().ok()))
    });
    duration.unwrap_or_else(|| {
        warn!("Couldn't parse duration: {:?}", segment.get("duration"));
        0
    })
}

fn parse_description(segment: &Value) -> String {
    let Some(descriptions) = segment.get("descriptions").and_then(Value::as_array) else {
        warn!("Couldn't parse description: no descriptions array");
        return String::new();
    };
    descriptions
        .iter()
        .find(|d| d.get("fieldName").and_then(Value::as_str) == Some(TEASER_FIELD))
        .and_then(|d| d.get("text").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_default()
}

fn parse_thumbnail(segment: &Value) -> Option<String> {
    let Some(images) = segment.get("images").and_then(Value::as_array) else {
        warn!("Couldn't parse video thumbnail: no images array");
        return None;
    };
    let url = images.first()?.get("url").and_then(Value::as_str);
    if url.is_none() {
        warn!("Couldn't parse video thumbnail: first image has no url");
    }
    url.map(str::to_string)
}
