mod aggregator;
mod reachability;

pub use aggregator::{AggregationSummary, Aggregator, UnusedSet};
pub use reachability::{ReachabilityAnalyzer, ScriptUsage};
