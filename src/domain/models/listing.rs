use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{
    errors::ValidationError,
    models::image::StoredImage,
    value_objects::ListingId,
};

/// Editable columns of a car listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListingField {
    ListingTitle,
    Tagline,
    OriginalPrice,
    SellingPrice,
    Category,
    Make,
    Model,
    Condition,
    Year,
    DriveType,
    FuelType,
    Transmission,
    Color,
    Mileage,
    EngineSize,
    Cylinder,
    Door,
    Vin,
    OfferType,
    ListingDescription,
}

impl ListingField {
    pub const ALL: [ListingField; 20] = [
        ListingField::ListingTitle,
        ListingField::Tagline,
        ListingField::OriginalPrice,
        ListingField::SellingPrice,
        ListingField::Category,
        ListingField::Make,
        ListingField::Model,
        ListingField::Condition,
        ListingField::Year,
        ListingField::DriveType,
        ListingField::FuelType,
        ListingField::Transmission,
        ListingField::Color,
        ListingField::Mileage,
        ListingField::EngineSize,
        ListingField::Cylinder,
        ListingField::Door,
        ListingField::Vin,
        ListingField::OfferType,
        ListingField::ListingDescription,
    ];

    /// snake_case name, also the key used in validation errors
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingField::ListingTitle => "listing_title",
            ListingField::Tagline => "tagline",
            ListingField::OriginalPrice => "original_price",
            ListingField::SellingPrice => "selling_price",
            ListingField::Category => "category",
            ListingField::Make => "make",
            ListingField::Model => "model",
            ListingField::Condition => "condition",
            ListingField::Year => "year",
            ListingField::DriveType => "drive_type",
            ListingField::FuelType => "fuel_type",
            ListingField::Transmission => "transmission",
            ListingField::Color => "color",
            ListingField::Mileage => "mileage",
            ListingField::EngineSize => "engine_size",
            ListingField::Cylinder => "cylinder",
            ListingField::Door => "door",
            ListingField::Vin => "vin",
            ListingField::OfferType => "offer_type",
            ListingField::ListingDescription => "listing_description",
        }
    }

    /// camelCase name used by the database columns and the JSON API
    pub fn column(&self) -> &'static str {
        match self {
            ListingField::ListingTitle => "listingTitle",
            ListingField::Tagline => "tagline",
            ListingField::OriginalPrice => "originalPrice",
            ListingField::SellingPrice => "sellingPrice",
            ListingField::Category => "category",
            ListingField::Make => "make",
            ListingField::Model => "model",
            ListingField::Condition => "condition",
            ListingField::Year => "year",
            ListingField::DriveType => "driveType",
            ListingField::FuelType => "fuelType",
            ListingField::Transmission => "transmission",
            ListingField::Color => "color",
            ListingField::Mileage => "mileage",
            ListingField::EngineSize => "engineSize",
            ListingField::Cylinder => "cylinder",
            ListingField::Door => "door",
            ListingField::Vin => "vin",
            ListingField::OfferType => "offerType",
            ListingField::ListingDescription => "listingDescription",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(
            self,
            ListingField::Tagline
                | ListingField::OriginalPrice
                | ListingField::EngineSize
                | ListingField::Cylinder
                | ListingField::Vin
                | ListingField::OfferType
        )
    }

    pub fn is_price(&self) -> bool {
        matches!(self, ListingField::OriginalPrice | ListingField::SellingPrice)
    }
}

impl std::str::FromStr for ListingField {
    type Err = ValidationError;

    /// Accepts either the snake_case or the camelCase name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ListingField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s || field.column() == s)
            .ok_or_else(|| ValidationError::UnknownField(s.to_string()))
    }
}

impl std::fmt::Display for ListingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Values of the listing form; unset fields are absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFields {
    values: BTreeMap<ListingField, String>,
}

impl ListingFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field; an empty value clears it
    pub fn set(&mut self, field: ListingField, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&field);
        } else {
            self.values.insert(field, value);
        }
    }

    pub fn with(mut self, field: ListingField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: ListingField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ListingField, &str)> {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Keyed by camelCase column name
    pub fn to_json_map(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(field, value)| (field.column().to_string(), value.clone()))
            .collect()
    }
}

/// Feature checkboxes (`"sunroof": true`), stored as a JSON object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Features(BTreeMap<String, bool>);

impl Features {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, enabled: bool) {
        self.0.insert(name.into(), enabled);
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(name, enabled)| (name.as_str(), *enabled))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Who is acting on a listing, as handed over by the authentication layer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerIdentity(String);

impl OwnerIdentity {
    pub fn new(email: impl Into<String>) -> Result<Self, ValidationError> {
        let email = email.into().trim().to_string();
        if email.is_empty() || !email.contains('@') {
            return Err(ValidationError::InvalidField {
                field: "owner".to_string(),
                value: email,
                expected: "an email address".to_string(),
            });
        }
        Ok(Self(email))
    }

    pub fn email(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted listing row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub id: ListingId,
    pub fields: ListingFields,
    pub features: Features,
    pub created_by: String,
    pub posted_on: NaiveDate,
    pub updated_by: Option<String>,
    pub updated_on: Option<NaiveDate>,
}

/// Values for inserting a listing
#[derive(Debug, Clone)]
pub struct NewListing {
    pub fields: ListingFields,
    pub features: Features,
    pub created_by: String,
    pub posted_on: NaiveDate,
}

/// Values for updating an existing listing
#[derive(Debug, Clone)]
pub struct ListingUpdate {
    pub fields: ListingFields,
    pub features: Features,
    pub updated_by: String,
    pub updated_on: NaiveDate,
}

/// One row of `listing LEFT JOIN images`
#[derive(Debug, Clone)]
pub struct ListingImageRow {
    pub listing: Listing,
    pub image: Option<StoredImage>,
}

/// A listing together with all of its images
#[derive(Debug, Clone)]
pub struct ListingWithImages {
    pub listing: Listing,
    pub images: Vec<StoredImage>,
}

impl ListingWithImages {
    /// Fold joined rows into one entry per listing, keeping first-seen order
    pub fn group_rows(rows: Vec<ListingImageRow>) -> Vec<ListingWithImages> {
        let mut grouped: Vec<ListingWithImages> = Vec::new();
        let mut index: BTreeMap<ListingId, usize> = BTreeMap::new();

        for row in rows {
            let slot = match index.get(&row.listing.id) {
                Some(&slot) => slot,
                None => {
                    index.insert(row.listing.id, grouped.len());
                    grouped.push(ListingWithImages {
                        listing: row.listing,
                        images: Vec::new(),
                    });
                    grouped.len() - 1
                }
            };

            if let Some(image) = row.image {
                if !image.record.image_url.is_empty() {
                    grouped[slot].images.push(image);
                }
            }
        }

        grouped
    }
}
