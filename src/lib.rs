// Business transaction reporting for hotel availability and pricing

pub mod bom;
pub mod chain_stats;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod extract;
pub mod report;
pub mod sink;

// Re-export key types for convenience
pub use bom::{AvailPricingRequest, AvailPricingResponse, TransactionType};
pub use chain_stats::ChainStats;
pub use collaborators::{
    ChannelResolver, FixedTransactionId, OtfVariables, StaticOtfVariables, TransactionIdProvider,
};
pub use config::{ReportConfig, ReportOptions, Separators};
pub use error::{ConfigError, ReportError, SinkError};
pub use report::{ReportBuilder, ReportContext, ReportOutcome};
pub use sink::{ChannelSink, LogSink, MemorySink, SinkKind, TracingSink};
