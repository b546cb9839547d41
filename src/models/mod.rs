pub mod biometrics;
pub mod compliance;
pub mod history;

pub use biometrics::BiometricSnapshot;
pub use compliance::{ComplianceResult, ComplianceStatus, ComplianceSummary};
pub use history::{EntryMetadata, HistoryData, HistoryEntry, NewHistoryEntry, UserRecord, UserStats};
