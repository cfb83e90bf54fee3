/// Search configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum search depth in plies.
    pub depth: u32,
    /// Children expanded per node.
    pub branch_limit: usize,
    /// Node budget for one search.
    pub max_nodes: u64,
    /// Wall-clock budget in milliseconds.
    pub time_ms: u64,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        EngineConfig {
            depth: std::env::var("SABLE_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),
            branch_limit: std::env::var("SABLE_BRANCH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8),
            max_nodes: std::env::var("SABLE_MAX_NODES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100_000),
            time_ms: std::env::var("SABLE_TIME_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2_000),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            depth: 4,
            branch_limit: 8,
            max_nodes: 100_000,
            time_ms: 2_000,
        }
    }
}
