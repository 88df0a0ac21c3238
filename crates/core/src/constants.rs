/// Color assigned to a tag created without one.
pub const DEFAULT_TAG_COLOR: &str = "#3B82F6";

/// Sort key given to tasks created without an explicit one.
pub const DEFAULT_SORT_ORDER: i64 = 0;

/// Maximum number of profiles returned by a username search.
pub const PROFILE_SEARCH_LIMIT: i64 = 10;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 32;
