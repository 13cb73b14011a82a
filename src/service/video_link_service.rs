use crate::module::course::model::CourseModule;
use once_cell::sync::Lazy;
use regex::Regex;

static VIDEO_LINK_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^(https?://)?(www\.|m\.)?youtube\.com/watch\?(.*&)?v=[\w-]{6,}",
        r"^(https?://)?youtu\.be/[\w-]{6,}",
        r"^(https?://)?(www\.|player\.)?vimeo\.com/(video/)?\d+/?(\?.*)?$",
        r"(?i)^https?://\S+\.(mp4|webm|ogg|mov|avi)(\?\S*)?$",
        r"^(https?://)?(www\.)?dailymotion\.com/video/[A-Za-z0-9]+",
        r"^(https?://)?(www\.)?twitch\.tv/videos/\d+",
        r"^https?://[^/\s]+(/\S*)?/videos?/\S+",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Whitelist check for externally hosted video links.
pub fn is_valid(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() || url.chars().any(char::is_whitespace) {
        return false;
    }
    VIDEO_LINK_PATTERNS.iter().any(|re| re.is_match(url))
}

/// Exact match against every lesson's external link or uploaded video URL.
pub fn is_duplicate(modules: &[CourseModule], url: &str) -> bool {
    modules
        .iter()
        .flat_map(|m| m.lessons.iter())
        .any(|lesson| {
            lesson.video_link.as_deref() == Some(url)
                || lesson.video_upload.as_ref().map(|v| v.url.as_str()) == Some(url)
        })
}
