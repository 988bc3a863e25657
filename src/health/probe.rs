//! Probe Battery Module
//!
//! Logical upstream capabilities, their synthetic test queries and the
//! structural checks applied to the answers.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

// == Capability ==
/// A logical upstream function that interchangeable backends can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Nearby station lookup
    Stations,
    /// Journey planning between two points
    Journeys,
}

/// One synthetic query: query-string parameters sent to the capability path.
pub type ProbeQuery = Vec<(&'static str, String)>;

/// (latitude, longitude) points around the main campus.
const STATION_POINTS: [(f64, f64); 3] = [
    (52.509037929829745, 13.332275324649462),
    (52.50915732081264, 13.326384039961827),
    (52.516949922594605, 13.324130741250828),
];

/// (from, to) pairs of campus locations.
const JOURNEY_PAIRS: [((f64, f64), (f64, f64)); 3] = [
    (
        (52.50718979876262, 13.331650735923587),
        (52.51381461746885, 13.335587343442882),
    ),
    (
        (52.506898519891145, 13.33243367181816),
        (52.51651497417413, 13.323818756533427),
    ),
    (
        (52.50707205897473, 13.331438922130621),
        (52.51125656907616, 13.305558238494228),
    ),
];

/// `info.type` values that count as a valid, non-error journey answer.
const NO_RESULT_SENTINELS: [&str; 2] = ["no_stations", "no_results"];

impl Capability {
    pub const ALL: [Capability; 2] = [Capability::Stations, Capability::Journeys];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Stations => "stations",
            Capability::Journeys => "journeys",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Capability::Stations => "/locations/nearby",
            Capability::Journeys => "/journeys",
        }
    }

    // == Battery ==
    /// The fixed set of known-good synthetic queries for this capability.
    pub fn battery(&self) -> Vec<ProbeQuery> {
        match self {
            Capability::Stations => STATION_POINTS
                .iter()
                .map(|(lat, lon)| {
                    vec![
                        ("latitude", lat.to_string()),
                        ("longitude", lon.to_string()),
                        ("results", "1".to_string()),
                    ]
                })
                .collect(),
            Capability::Journeys => JOURNEY_PAIRS
                .iter()
                .map(|((from_lat, from_lon), (to_lat, to_lon))| {
                    vec![
                        ("from.latitude", from_lat.to_string()),
                        ("from.longitude", from_lon.to_string()),
                        ("from.address", format!("{from_lat},{from_lon}")),
                        ("to.latitude", to_lat.to_string()),
                        ("to.longitude", to_lon.to_string()),
                        ("to.address", format!("{to_lat},{to_lon}")),
                        ("results", "1".to_string()),
                    ]
                })
                .collect(),
        }
    }

    // == Validation ==
    /// Whether an answer is structurally what a working backend returns.
    ///
    /// Stations: an array holding at least one item of type `stop`.
    /// Journeys: a first journey with at least one leg, or an explicit
    /// "no results" sentinel.
    pub fn is_valid_response(&self, body: &Value) -> bool {
        match self {
            Capability::Stations => body
                .as_array()
                .map(|items| items.iter().any(|item| item["type"] == "stop"))
                .unwrap_or(false),
            Capability::Journeys => {
                let has_leg = body["journeys"][0]["legs"]
                    .as_array()
                    .map(|legs| !legs.is_empty())
                    .unwrap_or(false);
                let is_sentinel = body["info"]["type"]
                    .as_str()
                    .map(|t| NO_RESULT_SENTINELS.contains(&t))
                    .unwrap_or(false);
                has_leg || is_sentinel
            }
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Probe Report ==
/// Score of one candidate endpoint over a capability's battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub passed: usize,
    pub total: usize,
}

impl ProbeReport {
    /// A candidate works when a strict majority of its queries passed.
    pub fn is_working(&self) -> bool {
        self.total > 0 && self.passed * 2 > self.total
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.passed, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batteries_have_at_least_two_queries() {
        for capability in Capability::ALL {
            assert!(capability.battery().len() >= 2);
        }
    }

    #[test]
    fn test_station_validation() {
        let ok = json!([{"type": "location"}, {"type": "stop", "id": "900023201"}]);
        let no_stop = json!([{"type": "location"}]);

        assert!(Capability::Stations.is_valid_response(&ok));
        assert!(!Capability::Stations.is_valid_response(&no_stop));
        assert!(!Capability::Stations.is_valid_response(&json!([])));
        assert!(!Capability::Stations.is_valid_response(&json!({"error": true})));
    }

    #[test]
    fn test_journey_validation() {
        let ok = json!({"journeys": [{"legs": [{"origin": {}}]}]});
        let empty_legs = json!({"journeys": [{"legs": []}]});
        let sentinel = json!({"info": {"type": "no_results"}});
        let other_info = json!({"info": {"type": "server_error"}});

        assert!(Capability::Journeys.is_valid_response(&ok));
        assert!(!Capability::Journeys.is_valid_response(&empty_legs));
        assert!(Capability::Journeys.is_valid_response(&sentinel));
        assert!(!Capability::Journeys.is_valid_response(&other_info));
        assert!(!Capability::Journeys.is_valid_response(&json!({"journeys": []})));
    }

    #[test]
    fn test_majority_rule() {
        assert!(ProbeReport { passed: 2, total: 3 }.is_working());
        assert!(ProbeReport { passed: 3, total: 3 }.is_working());
        assert!(!ProbeReport { passed: 1, total: 3 }.is_working());
        assert!(!ProbeReport { passed: 1, total: 2 }.is_working());
        assert!(!ProbeReport { passed: 0, total: 0 }.is_working());
    }

    #[test]
    fn test_journey_query_carries_addresses() {
        let query = &Capability::Journeys.battery()[0];
        let address = query
            .iter()
            .find(|(name, _)| *name == "from.address")
            .map(|(_, v)| v.as_str());
        assert_eq!(address, Some("52.50718979876262,13.331650735923587"));
    }
}
