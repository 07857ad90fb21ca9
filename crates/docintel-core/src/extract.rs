//! Regex-driven extraction of shipment fields from document text.

use std::sync::LazyLock;

use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Shipment fields recognised in logistics documents, in extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ShipmentId,
    Shipper,
    Consignee,
    Pickup,
    Delivery,
    Equipment,
    Mode,
    Rate,
    Currency,
    Weight,
    Carrier,
}

macro_rules! field_regex {
    ($name:ident, $pattern:literal) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(concat!("(?i)", $pattern)).expect("field pattern is valid")
        });
    };
}

field_regex!(SHIPMENT_ID_RE, r"Shipment[_ ]?ID[:\s]*(\w+)");
field_regex!(SHIPPER_RE, r"Shipper[:\s]*(.+)");
field_regex!(CONSIGNEE_RE, r"Consignee[:\s]*(.+)");
field_regex!(PICKUP_RE, r"Pickup[:\s]*(.+)");
field_regex!(DELIVERY_RE, r"Delivery[:\s]*(.+)");
field_regex!(EQUIPMENT_RE, r"Equipment[:\s]*(\w+)");
field_regex!(MODE_RE, r"Mode[:\s]*(\w+)");
field_regex!(RATE_RE, r"Rate[:\s]*([\d\.]+)");
field_regex!(CURRENCY_RE, r"Currency[:\s]*(\w+)");
field_regex!(WEIGHT_RE, r"Weight[:\s]*([\d\.]+)");
field_regex!(CARRIER_RE, r"Carrier[:\s]*(.+)");

impl Field {
    pub const ALL: [Self; 11] = [
        Self::ShipmentId,
        Self::Shipper,
        Self::Consignee,
        Self::Pickup,
        Self::Delivery,
        Self::Equipment,
        Self::Mode,
        Self::Rate,
        Self::Currency,
        Self::Weight,
        Self::Carrier,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::ShipmentId => "shipment_id",
            Self::Shipper => "shipper",
            Self::Consignee => "consignee",
            Self::Pickup => "pickup",
            Self::Delivery => "delivery",
            Self::Equipment => "equipment",
            Self::Mode => "mode",
            Self::Rate => "rate",
            Self::Currency => "currency",
            Self::Weight => "weight",
            Self::Carrier => "carrier",
        }
    }

    /// Human-readable form of the key, e.g. `shipment id`.
    #[must_use]
    pub fn label(self) -> String {
        self.key().replace('_', " ")
    }

    /// Case-insensitive lookup by key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    fn regex(self) -> &'static Regex {
        match self {
            Self::ShipmentId => &SHIPMENT_ID_RE,
            Self::Shipper => &SHIPPER_RE,
            Self::Consignee => &CONSIGNEE_RE,
            Self::Pickup => &PICKUP_RE,
            Self::Delivery => &DELIVERY_RE,
            Self::Equipment => &EQUIPMENT_RE,
            Self::Mode => &MODE_RE,
            Self::Rate => &RATE_RE,
            Self::Currency => &CURRENCY_RE,
            Self::Weight => &WEIGHT_RE,
            Self::Carrier => &CARRIER_RE,
        }
    }

    /// First capture of this field's pattern in `text`, trimmed.
    #[must_use]
    pub fn find_in(self, text: &str) -> Option<String> {
        self.regex()
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_owned())
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Every field with its extracted value, in [`Field::ALL`] order.
///
/// Serialises as a JSON object whose keys are always all present; missing
/// values become `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    values: Vec<(Field, Option<String>)>,
}

impl ExtractedFields {
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, Option<&str>)> {
        self.values.iter().map(|(f, v)| (*f, v.as_deref()))
    }

    #[must_use]
    pub fn found_count(&self) -> usize {
        self.values.iter().filter(|(_, v)| v.is_some()).count()
    }
}

impl Serialize for ExtractedFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.key(), &value)?;
        }
        map.end()
    }
}

/// Extract a single field by key. Unknown keys yield `None`.
#[must_use]
pub fn extract(field_name: &str, text: &str) -> Option<String> {
    Field::from_key(field_name)?.find_in(text)
}

#[must_use]
pub fn extract_all(text: &str) -> ExtractedFields {
    ExtractedFields {
        values: Field::ALL.into_iter().map(|f| (f, f.find_in(text))).collect(),
    }
}

/// Answer `question` from `text` by matching field keys named in the question.
///
/// A field whose key appears in the lowercased question and whose pattern
/// matches gives `"The <label> is <value>."`. Failing that, the first
/// sentence mentioning one of those keys is returned as-is.
#[must_use]
pub fn answer_from_text(question: &str, text: &str) -> Option<String> {
    let question = question.to_lowercase();
    let asked: Vec<Field> = Field::ALL
        .into_iter()
        .filter(|f| question.contains(f.key()))
        .collect();

    for field in &asked {
        if let Some(value) = field.find_in(text) {
            return Some(format!("The {} is {value}.", field.label()));
        }
    }

    for field in &asked {
        if let Some(sentence) = text
            .split(['.', '\n'])
            .find(|s| s.to_lowercase().contains(field.key()))
        {
            return Some(sentence.trim().to_owned());
        }
    }

    None
}
