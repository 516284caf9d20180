//! Best-source selection for a single video.
//!
//! Two upstream shapes exist and each gets its own policy:
//!
//! - [`select_progressive`]: sources carry a delivery mode, a protocol and a
//!   named quality tier. Only progressive HTTP sources with a known tier are
//!   eligible; the highest tier wins.
//! - [`select_streaming`]: a plain list of streaming URLs ordered from low to
//!   high quality. HLS manifests are skipped, the scheme must be supported,
//!   and the last eligible URL wins.

use tracing::debug;

use crate::error::{ParserError, Result};
use crate::protocols::ProtocolSet;

/// Quality tiers in ascending order.
pub const QUALITY_TIERS: [&str; 4] = ["Niedrig", "Mittel", "Hoch", "Sehr hoch"];

const HLS_MARKER: &str = ".m3u8";
const RTMP_STREAM_MARKER: &str = "mp4:";

/// One candidate source of a video, as advertised upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSource {
    /// `progressive` or a streaming delivery such as `streaming`.
    pub delivery: String,
    pub protocol: String,
    pub quality: String,
    pub url: String,
}

/// Result of streaming-list selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSelection {
    pub url: String,
    /// Substream path starting at `mp4:` when the winning URL is RTMP.
    pub rtmp_stream_name: Option<String>,
}

/// Rank of a quality label, `None` for labels we do not know.
pub fn quality_rank(label: &str) -> Option<usize> {
    QUALITY_TIERS.iter().position(|tier| *tier == label)
}

/// Pick the best progressive HTTP source.
///
/// `title` only labels the error.
pub fn select_progressive(sources: &[VideoSource], title: &str) -> Result<String> {
    let mut best: Option<(usize, &VideoSource)> = None;

    for source in sources {
        if source.delivery != "progressive" || !source.protocol.starts_with("http") {
            continue;
        }
        let Some(rank) = quality_rank(&source.quality) else {
            debug!("Ignoring unknown quality {:?} for {}", source.quality, source.url);
            continue;
        };
        // Strictly greater: the first source of a tier wins ties.
        if best.is_none_or(|(best_rank, _)| rank > best_rank) {
            best = Some((rank, source));
        }
    }

    match best {
        Some((_, source)) if !source.url.is_empty() => {
            debug!("Best video URI is {}", source.url);
            Ok(source.url.clone())
        }
        _ => Err(ParserError::NoAcceptableSource {
            title: title.to_string(),
        }),
    }
}

/// Pick the best streaming URL from a list ordered by ascending quality.
pub fn select_streaming<S: AsRef<str>>(urls: &[S], protocols: &ProtocolSet) -> Result<StreamSelection> {
    let mut last_seen: Option<&str> = None;
    let mut best: Option<StreamSelection> = None;

    for url in urls {
        let url = url.as_ref();
        last_seen = Some(url);
        if url.contains(HLS_MARKER) {
            debug!("Ignoring HLS stream {}", url);
            continue;
        }
        let Some(scheme) = scheme_of(url) else {
            debug!("Ignoring stream without a scheme: {}", url);
            continue;
        };
        if !protocols.contains(&scheme) {
            continue;
        }
        let rtmp_stream_name = if scheme == "rtmp" {
            url.find(RTMP_STREAM_MARKER).map(|pos| url[pos..].to_string())
        } else {
            None
        };
        best = Some(StreamSelection {
            url: url.to_string(),
            rtmp_stream_name,
        });
    }

    if let Some(selection) = best {
        debug!("Best video URI is {}", selection.url);
        return Ok(selection);
    }

    Err(ParserError::NoSupportedVideo {
        url: last_seen.map(str::to_string),
        supported: protocols.snapshot(),
    })
}

fn scheme_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .map(|u| u.scheme().to_ascii_lowercase())
}
