//! Document types the gateway verifies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of document a verification attempt is about.
///
/// Wire tags match what the vendors send (`doc_type` in callback payloads,
/// `type` in Bharat records); `ADHAR` is the vendor's spelling, not ours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocType {
    #[serde(rename = "ADHAR", alias = "aadhaar")]
    Aadhaar,
    #[serde(rename = "PAN", alias = "pan")]
    Pan,
    #[serde(rename = "bank_account")]
    BankAccount,
    #[serde(rename = "bank_ifsc")]
    BankIfsc,
    #[serde(rename = "video_profile")]
    VideoProfile,
    #[serde(rename = "other")]
    Other,
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocType::Aadhaar => "ADHAR",
            DocType::Pan => "PAN",
            DocType::BankAccount => "bank_account",
            DocType::BankIfsc => "bank_ifsc",
            DocType::VideoProfile => "video_profile",
            DocType::Other => "other",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aadhaar_uses_vendor_spelling() {
        let json = serde_json::to_string(&DocType::Aadhaar).unwrap();
        assert_eq!(json, "\"ADHAR\"");
        let back: DocType = serde_json::from_str("\"ADHAR\"").unwrap();
        assert_eq!(back, DocType::Aadhaar);
    }

    #[test]
    fn bank_kinds_round_trip() {
        for (doc, tag) in [
            (DocType::BankAccount, "\"bank_account\""),
            (DocType::BankIfsc, "\"bank_ifsc\""),
        ] {
            assert_eq!(serde_json::to_string(&doc).unwrap(), tag);
            assert_eq!(serde_json::from_str::<DocType>(tag).unwrap(), doc);
        }
    }
}
