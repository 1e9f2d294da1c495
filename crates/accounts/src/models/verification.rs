//! Phone verification record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitryna_core::Phone;

/// A one-time code issued for a phone at registration time.
///
/// Registration never removes older records for the same phone, so several
/// may coexist; the store hands back the latest by creation time and that is
/// the one checked. Code comparison is exact string equality - the code is
/// stored zero-padded and must be submitted the same way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneVerification {
    pub phone: Phone,
    /// Four digits, zero-padded.
    pub code: String,
    pub created_at: DateTime<Utc>,
}
