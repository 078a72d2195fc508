use serde::Serialize;

/// Premium status as seen by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntitlementStatus {
    pub is_premium: bool,
    pub is_loading: bool,
}
