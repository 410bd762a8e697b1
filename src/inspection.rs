use anyhow::{Context, Result};
use chrono::DateTime;
use gst::TagList;
use gst_pbutils::{prelude::*, DiscovererInfo, DiscovererResult};
use log::*;

use crate::comparison::SurfaceRole;

const DISCOVERY_TIMEOUT_SECS: u64 = 10;

/// Durations of the two sources may differ by this many seconds before the
/// pair is reported as mismatched.
pub const DURATION_MISMATCH_TOLERANCE_SECS: f64 = 0.5;

/// Properties of a media source relevant for a side by side comparison.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceInfo {
    pub uri: String,
    pub duration: Option<f64>,
    pub dimensions: Option<(u32, u32)>,
    pub seekable: bool,
    pub has_audio: bool,
}

impl From<&DiscovererInfo> for SourceInfo {
    fn from(info: &DiscovererInfo) -> Self {
        let dimensions = info
            .video_streams()
            .first()
            .map(|stream| (stream.width(), stream.height()));
        Self {
            uri: info.uri().to_string(),
            duration: info.duration().map(|d| d.mseconds() as f64 / 1000_f64),
            dimensions,
            seekable: info.is_seekable(),
            has_audio: !info.audio_streams().is_empty(),
        }
    }
}

/// Difference of both durations if it exceeds the tolerance.
pub fn duration_mismatch(background: &SourceInfo, foreground: &SourceInfo) -> Option<f64> {
    let difference = (background.duration? - foreground.duration?).abs();
    (difference > DURATION_MISMATCH_TOLERANCE_SECS).then_some(difference)
}

pub fn inspect_source(uri: &str) -> Result<DiscovererInfo> {
    let timeout: gst::ClockTime = gst::ClockTime::from_seconds(DISCOVERY_TIMEOUT_SECS);
    let discoverer = gst_pbutils::Discoverer::new(timeout)?;
    let info = discoverer
        .discover_uri(uri)
        .with_context(|| format!("Cannot inspect media source '{uri}'"))?;

    Ok(info)
}

/// Validates a discoverer result for playback.
pub fn check_source(info: &DiscovererInfo) -> Result<SourceInfo> {
    match info.result() {
        DiscovererResult::Ok => Ok(SourceInfo::from(info)),
        DiscovererResult::MissingPlugins => {
            let details: Vec<_> = info
                .missing_elements_installer_details()
                .iter()
                .map(|x| x.to_string())
                .collect();
            Err(anyhow::anyhow!("{}", details.join(", ")))
        }
        DiscovererResult::UriInvalid => Err(anyhow::anyhow!("Invalid media source uri {}", info.uri())),
        DiscovererResult::Timeout => Err(anyhow::anyhow!("Media source discovery timed out")),
        result => Err(anyhow::anyhow!("Media source discovery failed: {result:?}")),
    }
}

pub fn trace_source_info(role: SurfaceRole, info: &DiscovererInfo) {
    let mut tree = termtree::Tree::new(format!("{role} source: {}", info.uri()));
    match info.result() {
        DiscovererResult::Ok => {
            tree.push(termtree::Tree::new(format!("is seekable: {}", info.is_seekable())));
            if let Some(duration) = info.duration() {
                tree.push(termtree::Tree::new(format!("Duration: {:.0}", duration)));
            }
            for stream in info.video_streams() {
                let mut sub_tree = termtree::Tree::new(format!("Video stream #{}", stream.stream_number()));
                sub_tree.push(termtree::Tree::new(format!("size: {}x{}", stream.width(), stream.height())));
                sub_tree.push(termtree::Tree::new(format!("framerate: {}", stream.framerate())));
                if let Some(tags) = stream.tags() {
                    sub_tree.push(trace_tags(&tags));
                }
                tree.push(sub_tree);
            }
            for stream in info.audio_streams() {
                let mut sub_tree = termtree::Tree::new(format!("Audio stream #{}", stream.stream_number()));
                sub_tree.push(termtree::Tree::new(format!("channels: {}", stream.channels())));
                sub_tree.push(termtree::Tree::new(format!("sample rate: {}", stream.sample_rate())));
                if let Some(tags) = stream.tags() {
                    sub_tree.push(trace_tags(&tags));
                }
                tree.push(sub_tree);
            }
        }
        DiscovererResult::MissingPlugins => {
            for missing_info in info.missing_elements_installer_details() {
                tree.push(termtree::Tree::new(format!("{missing_info}")));
            }
        }
        result => {
            tree.push(termtree::Tree::new(format!("Discovery result: {result:?}")));
        }
    }
    for line in tree.to_string().lines() {
        trace!("{line}")
    }
}

fn trace_tag(name: &str, value: &gst::glib::value::SendValue, tree: &mut termtree::Tree<String>) {
    let Ok(value) = value.get::<&str>() else {
        return;
    };
    if name == gst::tags::ExtendedComment::TAG_NAME {
        if let Ok(ext_comment) = gst_tag::tag_parse_extended_comment(value, true) {
            tree.push(termtree::Tree::new(format!(
                "{}: {}",
                ext_comment
                    .key
                    .map(|key| key.to_string())
                    .unwrap_or_else(|| "comment".to_owned()),
                ext_comment.value
            )));
        }
    } else {
        tree.push(termtree::Tree::new(format!("{name}: {value}")));
    }
}

fn trace_tags(tags: &TagList) -> termtree::Tree<String> {
    let mut tree = termtree::Tree::new("Tags:".to_owned());

    for (name, values) in tags.iter_generic() {
        if name == gst::tags::DateTime::TAG_NAME {
            if let Some(date_time) = tags.get::<gst::tags::DateTime>() {
                if let Ok(iso_date_time) = date_time.get().to_iso8601_string() {
                    if let Ok(date_time) = iso_date_time.parse::<DateTime<chrono::Local>>() {
                        tree.push(termtree::Tree::new(format!("{}: {}", name, date_time.to_rfc2822())));
                    }
                }
            }
        } else {
            for value in values {
                trace_tag(name, value, &mut tree);
            }
        }
    }
    tree
}
