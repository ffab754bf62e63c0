//! ISO 8583 message type classification

use std::fmt;

/// Message class selected by the second MTI digit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageClass {
    Authorization,
    Financial,
    Reversal,
    NetworkManagement,
    FileAction,
    Reconciliation,
    Administrative,
    FeeCollection,
    Unknown,
}

impl MessageClass {
    /// Short tag shown in the type column of the transaction table
    pub fn tag(&self) -> &'static str {
        match self {
            MessageClass::Authorization => "AUTH",
            MessageClass::Financial => "FIN",
            MessageClass::Reversal => "REV",
            MessageClass::NetworkManagement => "NET",
            MessageClass::FileAction => "FILE",
            MessageClass::Reconciliation => "RECON",
            MessageClass::Administrative => "ADMIN",
            MessageClass::FeeCollection => "FEE",
            MessageClass::Unknown => "UNK",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MessageClass::Authorization => "Authorization",
            MessageClass::Financial => "Financial",
            MessageClass::Reversal => "Reversal",
            MessageClass::NetworkManagement => "Network Management",
            MessageClass::FileAction => "File Action",
            MessageClass::Reconciliation => "Reconciliation",
            MessageClass::Administrative => "Administrative",
            MessageClass::FeeCollection => "Fee Collection",
            MessageClass::Unknown => "Unknown",
        }
    }
}

/// Message function selected by the last two MTI digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageDirection {
    Request,
    Response,
    Advice,
    AdviceResponse,
    Unknown,
}

impl MessageDirection {
    pub fn label(&self) -> &'static str {
        match self {
            MessageDirection::Request => "Request",
            MessageDirection::Response => "Response",
            MessageDirection::Advice => "Advice",
            MessageDirection::AdviceResponse => "Advice Response",
            MessageDirection::Unknown => "Unknown",
        }
    }
}

/// Classification of an MTI, never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageTaxonomy {
    pub class: MessageClass,
    pub direction: MessageDirection,
}

impl MessageTaxonomy {
    pub const UNKNOWN: MessageTaxonomy = MessageTaxonomy {
        class: MessageClass::Unknown,
        direction: MessageDirection::Unknown,
    };

    /// Human readable form, e.g. "Financial Request"
    pub fn description(&self) -> String {
        format!("{} {}", self.class.label(), self.direction.label())
    }
}

impl fmt::Display for MessageTaxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Transaction counts per message class over a sample
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassTally {
    counts: std::collections::BTreeMap<MessageClass, u64>,
    total: u64,
}

impl ClassTally {
    pub fn record(&mut self, class: MessageClass) {
        *self.counts.entry(class).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn count(&self, class: MessageClass) -> u64 {
        self.counts.get(&class).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Share of the sample in percent, 0 for an empty sample
    pub fn percent(&self, class: MessageClass) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(class) as f64 * 100.0 / self.total as f64
    }
}
