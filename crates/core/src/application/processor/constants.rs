// Assignment constants (no magic values)

/// Longest accepted volunteer display name (characters)
pub const MAX_VOLUNTEER_NAME_LEN: usize = 120;

/// Most volunteers one group may submit in a single batch
pub const MAX_BATCH_SIZE: usize = 500;
