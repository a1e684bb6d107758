use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyStrategy {
    /// Rescans only the routes touched by the move log.
    #[default]
    Incremental,
    /// Rescans every route on every evaluation.
    FullScan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyParamsDebugOptions {
    /// Compares every incremental commit with a cache-free recomputation and
    /// panics on mismatch.
    pub verify_commits: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyParams {
    pub strategy: PenaltyStrategy,
    pub debug_options: PenaltyParamsDebugOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial_params() {
        let params: PenaltyParams = serde_json::from_str(r#"{ "strategy": "full_scan" }"#).unwrap();
        assert_eq!(params.strategy, PenaltyStrategy::FullScan);
        assert!(!params.debug_options.verify_commits);

        let params: PenaltyParams =
            serde_json::from_str(r#"{ "debug_options": { "verify_commits": true } }"#).unwrap();
        assert_eq!(params.strategy, PenaltyStrategy::Incremental);
        assert!(params.debug_options.verify_commits);
    }
}
