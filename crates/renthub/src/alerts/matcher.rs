use crate::catalog::{normalize_amenity, PropertySnapshot};

use super::domain::SearchCriteria;

/// Pure predicate deciding whether a property satisfies a saved search.
///
/// Total over all criteria: an absent field is no constraint, price bounds
/// are inclusive, room/guest counts are minimums, and amenity and location
/// comparisons ignore case. Safe to call once per (property, search) pair in
/// any order, including concurrently.
pub fn matches(property: &PropertySnapshot, criteria: &SearchCriteria) -> bool {
    price_within(property, criteria)
        && meets_minimums(property, criteria)
        && type_allowed(property, criteria)
        && has_amenities(property, criteria)
        && location_matches(property, criteria)
}

fn price_within(property: &PropertySnapshot, criteria: &SearchCriteria) -> bool {
    if let Some(min) = criteria.min_price {
        if property.price_per_night < min {
            return false;
        }
    }
    if let Some(max) = criteria.max_price {
        if property.price_per_night > max {
            return false;
        }
    }
    true
}

fn meets_minimums(property: &PropertySnapshot, criteria: &SearchCriteria) -> bool {
    if let Some(bedrooms) = criteria.bedrooms {
        if property.bedrooms < bedrooms {
            return false;
        }
    }
    if let Some(bathrooms) = criteria.bathrooms {
        if property.bathrooms < bathrooms {
            return false;
        }
    }
    if let Some(guests) = criteria.guests {
        if property.max_guests < guests {
            return false;
        }
    }
    true
}

fn type_allowed(property: &PropertySnapshot, criteria: &SearchCriteria) -> bool {
    criteria.property_types.is_empty() || criteria.property_types.contains(&property.property_type)
}

fn has_amenities(property: &PropertySnapshot, criteria: &SearchCriteria) -> bool {
    if criteria.amenities.is_empty() {
        return true;
    }

    let available: Vec<String> = property
        .amenities
        .iter()
        .map(|amenity| normalize_amenity(amenity))
        .collect();

    criteria
        .amenities
        .iter()
        .map(|amenity| normalize_amenity(amenity))
        .all(|wanted| available.contains(&wanted))
}

fn location_matches(property: &PropertySnapshot, criteria: &SearchCriteria) -> bool {
    match &criteria.location {
        None => true,
        Some(location) => {
            let wanted = location.trim().to_lowercase();
            wanted.is_empty() || property.city.to_lowercase().contains(&wanted)
        }
    }
}
