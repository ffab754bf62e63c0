//! Decoding of raw ISO 8583 fields into display classifications.
//!
//! Every function here is total: malformed input degrades to an "unknown"
//! classification instead of failing.

use crate::models::{
    ClassTally, DecodedAmount, MessageClass, MessageDirection, MessageTaxonomy, ResponseStatus,
    TransactionRecord,
};

/// Classify an MTI. The first digit (protocol version) is ignored.
pub fn decode_taxonomy(mti: Option<&str>) -> MessageTaxonomy {
    let Some(mti) = mti.map(str::trim) else {
        return MessageTaxonomy::UNKNOWN;
    };

    let digits = mti.as_bytes();
    if digits.len() != 4 || !digits.iter().all(u8::is_ascii_digit) {
        return MessageTaxonomy::UNKNOWN;
    }

    let class = match digits[1] {
        b'0' | b'1' => MessageClass::Authorization,
        b'2' => MessageClass::Financial,
        b'3' => MessageClass::FileAction,
        b'4' => MessageClass::Reversal,
        b'5' => MessageClass::Reconciliation,
        b'6' => MessageClass::Administrative,
        b'7' => MessageClass::FeeCollection,
        b'8' => MessageClass::NetworkManagement,
        _ => MessageClass::Unknown,
    };

    let direction = match &digits[2..4] {
        b"00" => MessageDirection::Request,
        b"10" => MessageDirection::Response,
        b"20" => MessageDirection::Advice,
        b"30" => MessageDirection::AdviceResponse,
        _ => MessageDirection::Unknown,
    };

    MessageTaxonomy { class, direction }
}

/// Format a minor-unit digit string with two decimals and thousands separators.
///
/// Only raw digit strings are accepted; feeding back already decoded output
/// yields `Unavailable` because of the separators and the decimal point.
pub fn decode_amount(raw: Option<&str>) -> DecodedAmount {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return DecodedAmount::Unavailable;
    };
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return DecodedAmount::Unavailable;
    }

    let padded = format!("{:0>3}", raw);
    let (units, cents) = padded.split_at(padded.len() - 2);
    let units = units.trim_start_matches('0');
    let units = if units.is_empty() { "0" } else { units };

    DecodedAmount::Value(format!("{}.{}", group_thousands(units), cents))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// "00" approves; any other code declines; no code means still pending
pub fn classify_response(code: Option<&str>) -> ResponseStatus {
    match code.map(str::trim).filter(|c| !c.is_empty()) {
        None => ResponseStatus::Pending,
        Some("00") => ResponseStatus::Approved,
        Some(other) => ResponseStatus::Declined {
            code: other.to_string(),
        },
    }
}

/// Issuer description of the common response codes
pub fn describe_response_code(code: Option<&str>) -> Option<&'static str> {
    match code?.trim() {
        "00" => Some("Approved or completed successfully"),
        "01" => Some("Refer to card issuer"),
        "05" => Some("Do not honor"),
        "14" => Some("Invalid card number"),
        "51" => Some("Insufficient funds"),
        "54" => Some("Expired card"),
        "91" => Some("Issuer or switch inoperative"),
        "96" => Some("System malfunction"),
        _ => None,
    }
}

/// Count a sample of transactions by message class
pub fn tally_classes(records: &[TransactionRecord]) -> ClassTally {
    let mut tally = ClassTally::default();
    for record in records {
        tally.record(decode_taxonomy(record.mti.as_deref()).class);
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_mtis() {
        let auth = decode_taxonomy(Some("0100"));
        assert_eq!(auth.class, MessageClass::Authorization);
        assert_eq!(auth.direction, MessageDirection::Request);

        let fin = decode_taxonomy(Some("0210"));
        assert_eq!(fin.class, MessageClass::Financial);
        assert_eq!(fin.direction, MessageDirection::Response);

        let rev = decode_taxonomy(Some("0420"));
        assert_eq!(rev.class, MessageClass::Reversal);
        assert_eq!(rev.direction, MessageDirection::Advice);

        let net = decode_taxonomy(Some("0830"));
        assert_eq!(net.class, MessageClass::NetworkManagement);
        assert_eq!(net.direction, MessageDirection::AdviceResponse);
        assert_eq!(net.description(), "Network Management Advice Response");
    }

    #[test]
    fn test_version_digit_is_ignored() {
        assert_eq!(decode_taxonomy(Some("1200")), decode_taxonomy(Some("0200")));
        assert_eq!(decode_taxonomy(Some("2810")), decode_taxonomy(Some("0810")));
    }

    #[test]
    fn test_every_four_digit_mti_classifies() {
        for n in 0..10_000u32 {
            let mti = format!("{:04}", n);
            let taxonomy = decode_taxonomy(Some(mti.as_str()));
            let bytes = mti.as_bytes();

            if bytes[1] == b'9' {
                assert_eq!(taxonomy.class, MessageClass::Unknown, "mti {}", mti);
            } else {
                assert_ne!(taxonomy.class, MessageClass::Unknown, "mti {}", mti);
            }

            let known_function = matches!(&mti[2..], "00" | "10" | "20" | "30");
            assert_eq!(
                taxonomy.direction == MessageDirection::Unknown,
                !known_function,
                "mti {}",
                mti
            );
        }
    }

    #[test]
    fn test_malformed_mti_is_unknown() {
        for bad in [None, Some(""), Some("02"), Some("02000"), Some("02a0"), Some("abcd")] {
            assert_eq!(decode_taxonomy(bad), MessageTaxonomy::UNKNOWN);
        }
    }

    #[test]
    fn test_decode_amount() {
        assert_eq!(decode_amount(Some("100")), DecodedAmount::Value("1.00".into()));
        assert_eq!(decode_amount(Some("5")), DecodedAmount::Value("0.05".into()));
        assert_eq!(decode_amount(Some("0")), DecodedAmount::Value("0.00".into()));
        assert_eq!(decode_amount(Some("000000010000")), DecodedAmount::Value("100.00".into()));
        assert_eq!(decode_amount(Some("123456789")), DecodedAmount::Value("1,234,567.89".into()));
        assert_eq!(decode_amount(Some("100000")), DecodedAmount::Value("1,000.00".into()));
    }

    #[test]
    fn test_missing_amount_is_not_zero() {
        assert_eq!(decode_amount(None), DecodedAmount::Unavailable);
        assert_eq!(decode_amount(Some("")), DecodedAmount::Unavailable);
        assert_eq!(decode_amount(Some("-100")), DecodedAmount::Unavailable);
        assert_eq!(decode_amount(Some("1,000.00")), DecodedAmount::Unavailable);
        assert_eq!(DecodedAmount::Unavailable.to_string(), "N/A");
    }

    #[test]
    fn test_classify_response() {
        assert_eq!(classify_response(Some("00")), ResponseStatus::Approved);
        assert_eq!(
            classify_response(Some("05")),
            ResponseStatus::Declined { code: "05".into() }
        );
        assert_eq!(classify_response(None), ResponseStatus::Pending);
        assert_eq!(classify_response(Some("")), ResponseStatus::Pending);
    }

    #[test]
    fn test_tally_classes() {
        let records: Vec<TransactionRecord> = ["0100", "0200", "0210", "0420", "0800", "xx"]
            .iter()
            .map(|mti| TransactionRecord {
                mti: Some(mti.to_string()),
                ..Default::default()
            })
            .collect();

        let tally = tally_classes(&records);
        assert_eq!(tally.total(), 6);
        assert_eq!(tally.count(MessageClass::Financial), 2);
        assert_eq!(tally.count(MessageClass::Unknown), 1);
        assert!((tally.percent(MessageClass::Reversal) - 16.666).abs() < 0.01);
        assert_eq!(tally_classes(&[]).percent(MessageClass::Financial), 0.0);
    }

    #[test]
    fn test_response_descriptions() {
        assert_eq!(describe_response_code(Some("51")), Some("Insufficient funds"));
        assert_eq!(describe_response_code(Some("77")), None);
        assert_eq!(describe_response_code(None), None);
    }
}
