//! Domain constants

/// Number of days an invitation stays valid after creation.
pub const INVITATION_TTL_DAYS: i64 = 7;

/// Number of notifications returned by the feed on initial fetch.
pub const NOTIFICATION_FEED_LIMIT: usize = 10;

/// Maximum length of the chief-concern field in a matching query.
pub const MAX_CHIEF_CONCERN_LEN: usize = 1000;

/// Maximum length of the location field in a matching query.
pub const MAX_LOCATION_LEN: usize = 200;

/// Path of the invitation acceptance page, relative to the public site URL.
pub const ACCEPT_INVITATION_PATH: &str = "/accept-invitation";
