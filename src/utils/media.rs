//! Media URL and container helpers

use url::Url;

/// Check if a media URL points at an HLS playlist
pub fn is_hls_url(media_url: &str) -> bool {
    match Url::parse(media_url) {
        Ok(url) => {
            let path = url.path().to_ascii_lowercase();
            path.ends_with(".m3u8")
                || path.ends_with(".m3u")
                || url
                    .query_pairs()
                    .any(|(_, v)| v.to_ascii_lowercase().ends_with(".m3u8"))
        }
        Err(_) => media_url
            .split(['?', '#'])
            .next()
            .map_or(false, |p| p.to_ascii_lowercase().ends_with(".m3u8")),
    }
}

/// Check if a response content type announces an HLS playlist
pub fn is_hls_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    matches!(
        mime.as_str(),
        "application/vnd.apple.mpegurl" | "application/x-mpegurl" | "audio/mpegurl" | "audio/x-mpegurl"
    )
}

/// ffmpeg muxer name for an output extension.
///
/// Needed because partial files end in `.part`, which ffmpeg cannot map to
/// a container on its own.
pub fn ffmpeg_format(extension: &str) -> &'static str {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    match ext.as_str() {
        "mkv" => "matroska",
        "ts" => "mpegts",
        "mov" => "mov",
        "webm" => "webm",
        "m4a" => "ipod",
        // Default fallback
        _ => "mp4",
    }
}
