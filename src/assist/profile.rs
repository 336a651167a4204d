//! Device capability profile and assistance request types.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// What a device wants from the assistance origin.
///
/// Two profiles address the same cache entries only if they are structurally
/// equal, list order included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssistanceProfile {
    /// Requested data types (`eph`, `alm`, `aux`, `pos`)
    pub datatype: Vec<String>,
    /// Output format (`mga` for M8 onwards, `aid` for u7 and earlier)
    pub format: String,
    /// Requested constellations (`gps`, `qzss`, `glo`)
    pub gnss: Vec<String>,
    /// Only return ephemeris for satellites likely visible from the position
    pub filter_on_pos: bool,
}

impl AssistanceProfile {
    /// Canonical encoding used as the cache equality key.
    ///
    /// Field order is fixed by the struct, so equal profiles always produce
    /// identical keys.
    pub fn cache_key(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// An assistance lookup: approximate device position plus its profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistanceRequest {
    /// Approximate device position
    pub point: Point,
    /// What the device asks for
    pub profile: AssistanceProfile,
}
