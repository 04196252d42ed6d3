//! The default target: the two Firestore collections exercised by the app.
use volley::Scenario;

pub const PROJECT_ID: &str = "absherk-e89ba";

pub const FIRESTORE_API: &str =
    "https://firestore.googleapis.com/v1/projects/absherk-e89ba/databases/(default)/documents";

/// Listing swap requests; the friend-request screen's main read.
pub fn friend_request() -> Scenario {
    Scenario::get("friend_request", 0.625, "swap_requests")
}

/// Listing users; the outing screen's main read.
pub fn outing() -> Scenario {
    Scenario::get("outing", 0.375, "users")
}

pub fn default_scenarios() -> Vec<Scenario> {
    vec![friend_request(), outing()]
}
