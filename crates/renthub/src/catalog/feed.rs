use std::io::Read;

use serde::{Deserialize, Deserializer};

use super::domain::{normalize_amenity, PropertyId, PropertySnapshot, PropertyStatus, PropertyType};

#[derive(Debug, thiserror::Error)]
pub enum PropertyFeedError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("row {row}: unknown property type '{value}'")]
    UnknownPropertyType { row: usize, value: String },
    #[error("row {row}: unknown listing status '{value}'")]
    UnknownStatus { row: usize, value: String },
    #[error("row {row}: nightly rate must be a positive amount, got '{value}'")]
    InvalidRate { row: usize, value: String },
}

/// Parse a listing feed export into property snapshots.
///
/// The feed is the column layout produced by the listings export job:
/// `Property ID, Title, City, Type, Nightly Rate, Bedrooms, Bathrooms,
/// Sleeps, Amenities, Status`. Amenities are `|`-separated and normalized on
/// the way in so the matcher can compare them case-insensitively.
pub fn parse_feed<R: Read>(reader: R) -> Result<Vec<PropertySnapshot>, PropertyFeedError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut snapshots = Vec::new();

    for (index, record) in csv_reader.deserialize::<FeedRow>().enumerate() {
        let row = record?;
        // Header is line 1, first data row is line 2.
        snapshots.push(row.into_snapshot(index + 2)?);
    }

    Ok(snapshots)
}

#[derive(Debug, Deserialize)]
struct FeedRow {
    #[serde(rename = "Property ID")]
    property_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Type")]
    property_type: String,
    #[serde(rename = "Nightly Rate")]
    nightly_rate: String,
    #[serde(rename = "Bedrooms", default)]
    bedrooms: u8,
    #[serde(rename = "Bathrooms", default)]
    bathrooms: f32,
    #[serde(rename = "Sleeps", default)]
    sleeps: u8,
    #[serde(rename = "Amenities", default, deserialize_with = "empty_string_as_none")]
    amenities: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
}

impl FeedRow {
    fn into_snapshot(self, row: usize) -> Result<PropertySnapshot, PropertyFeedError> {
        let property_type = PropertyType::parse(&self.property_type).ok_or_else(|| {
            PropertyFeedError::UnknownPropertyType {
                row,
                value: self.property_type.clone(),
            }
        })?;

        let status = match self.status.as_deref() {
            None => PropertyStatus::Available,
            Some(raw) => PropertyStatus::parse(raw).ok_or_else(|| PropertyFeedError::UnknownStatus {
                row,
                value: raw.to_string(),
            })?,
        };

        let price_per_night = self
            .nightly_rate
            .trim_start_matches('$')
            .replace(',', "")
            .parse::<f64>()
            .ok()
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .ok_or_else(|| PropertyFeedError::InvalidRate {
                row,
                value: self.nightly_rate.clone(),
            })?;

        let amenities = self
            .amenities
            .as_deref()
            .map(|raw| {
                raw.split('|')
                    .map(normalize_amenity)
                    .filter(|amenity| !amenity.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(PropertySnapshot {
            id: PropertyId(self.property_id),
            title: self.title,
            city: self.city,
            property_type,
            price_per_night,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            max_guests: self.sleeps,
            amenities,
            status,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|raw| !raw.trim().is_empty()))
}
