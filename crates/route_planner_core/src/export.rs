//! Deep links into external map applications.

use url::Url;

const GOOGLE_MAPS_DIR_URL: &str = "https://www.google.com/maps/dir/";
const APPLE_MAPS_URL: &str = "https://maps.apple.com/";
const APPLE_WAYPOINT_SEPARATOR: &str = " to:";

/// `https://www.google.com/maps/dir/<stop>/<stop>/.../`, one escaped path
/// segment per stop. `None` without stops.
pub fn google_maps_url<S: AsRef<str>>(stops: &[S]) -> Option<String> {
    if stops.is_empty() {
        return None;
    }

    let mut url = Url::parse(GOOGLE_MAPS_DIR_URL).ok()?;
    {
        let mut segments = url.path_segments_mut().ok()?;
        segments.pop_if_empty();
        segments.extend(stops);
        // trailing slash
        segments.push("");
    }
    Some(url.into())
}

/// `https://maps.apple.com/?saddr=<first>&daddr=<second> to:<third>...`.
/// `None` for fewer than two stops.
pub fn apple_maps_url<S: AsRef<str>>(stops: &[S]) -> Option<String> {
    let (first, rest) = stops.split_first()?;
    if rest.is_empty() {
        return None;
    }

    let daddr = rest
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<&str>>()
        .join(APPLE_WAYPOINT_SEPARATOR);

    let mut url = Url::parse(APPLE_MAPS_URL).ok()?;
    url.query_pairs_mut()
        .append_pair("saddr", first.as_ref())
        .append_pair("daddr", &daddr);
    Some(url.into())
}
