//! Origin query string construction.
//!
//! The origin servers parse a `;`-separated parameter list in a fixed order:
//! `token=<t>;format=<f>;datatype=<csv>;gnss=<csv>;lon=<f>;lat=<f>[;pacc=<n>][;filteronpos]`

use crate::assist::AssistanceProfile;
use crate::config::{PACC_DEFAULT_SENTINEL, PACC_UPPER_BOUND};
use crate::geometry::Point;

/// Builds the query string for one assistance request.
///
/// `format`, `datatype` and `gnss` are left out when empty. Coordinates are
/// written with six decimals. `pacc` is only sent when [`sends_pacc`] allows it.
pub fn build_query(token: &str, pacc: u32, point: Point, profile: &AssistanceProfile) -> String {
    let mut query = format!("token={token}");
    if !profile.format.is_empty() {
        query.push_str(&format!(";format={}", profile.format));
    }
    if !profile.datatype.is_empty() {
        query.push_str(&format!(";datatype={}", profile.datatype.join(",")));
    }
    if !profile.gnss.is_empty() {
        query.push_str(&format!(";gnss={}", profile.gnss.join(",")));
    }
    query.push_str(&format!(";lon={:.6};lat={:.6}", point.lon(), point.lat()));
    if sends_pacc(pacc) {
        query.push_str(&format!(";pacc={pacc}"));
    }
    if profile.filter_on_pos {
        query.push_str(";filteronpos");
    }
    query
}

/// Whether `pacc` is sent at all: the origin's own default (300000) and values
/// at or above 6000000 are omitted so the origin applies its default.
pub fn sends_pacc(pacc: u32) -> bool {
    pacc != PACC_DEFAULT_SENTINEL && pacc < PACC_UPPER_BOUND
}
