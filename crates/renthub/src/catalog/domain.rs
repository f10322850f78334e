use serde::{Deserialize, Serialize};

/// Identifier wrapper for catalog properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub String);

/// Listing categories a saved search may constrain on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    House,
    Condo,
    Townhouse,
    Villa,
    Studio,
    Cabin,
}

impl PropertyType {
    pub const fn label(self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::House => "house",
            PropertyType::Condo => "condo",
            PropertyType::Townhouse => "townhouse",
            PropertyType::Villa => "villa",
            PropertyType::Studio => "studio",
            PropertyType::Cabin => "cabin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "apartment" => Some(Self::Apartment),
            "house" => Some(Self::House),
            "condo" => Some(Self::Condo),
            "townhouse" => Some(Self::Townhouse),
            "villa" => Some(Self::Villa),
            "studio" => Some(Self::Studio),
            "cabin" => Some(Self::Cabin),
            _ => None,
        }
    }
}

/// Lifecycle state of a listing. Only `Available` listings participate in
/// saved-search matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    Available,
    Pending,
    Unlisted,
}

impl PropertyStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PropertyStatus::Available => "available",
            PropertyStatus::Pending => "pending",
            PropertyStatus::Unlisted => "unlisted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "available" | "active" => Some(Self::Available),
            "pending" => Some(Self::Pending),
            "unlisted" | "inactive" => Some(Self::Unlisted),
            _ => None,
        }
    }
}

/// Denormalized view of a listing, carrying exactly the fields saved-search
/// criteria evaluate against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySnapshot {
    pub id: PropertyId,
    pub title: String,
    pub city: String,
    pub property_type: PropertyType,
    pub price_per_night: f64,
    pub bedrooms: u8,
    pub bathrooms: f32,
    pub max_guests: u8,
    pub amenities: Vec<String>,
    pub status: PropertyStatus,
}

impl PropertySnapshot {
    pub fn is_available(&self) -> bool {
        self.status == PropertyStatus::Available
    }
}

/// Canonical form for amenity comparisons: trimmed, whitespace collapsed,
/// lowercased.
pub fn normalize_amenity(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}
