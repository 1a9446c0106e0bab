use crate::domain::{
    errors::FieldErrors,
    models::listing::{ListingField, ListingFields},
};

/// Error key used when the draft has no images
pub const IMAGES_FIELD: &str = "images";

pub const MIN_YEAR: i32 = 1900;

const VIN_LENGTH: usize = 17;

impl ListingFields {
    /// Check every rule and collect one error per offending field.
    ///
    /// `image_count` is the number of images currently reported for the draft,
    /// pending ones included. Years up to `current_year + 1` are accepted.
    pub fn validate(&self, image_count: usize, current_year: i32) -> FieldErrors {
        let mut errors = FieldErrors::new();

        for field in ListingField::ALL {
            let value = self.get(field).map(str::trim).filter(|v| !v.is_empty());

            let Some(value) = value else {
                if field.is_required() {
                    errors.insert(field.as_str(), "This field is required");
                }
                continue;
            };

            if field.is_price() && !is_decimal(value) {
                errors.insert(field.as_str(), "Must be a number, e.g. 24999.99");
            }

            if field == ListingField::Year {
                let max = current_year + 1;
                match value.parse::<i32>() {
                    Ok(year) if (MIN_YEAR..=max).contains(&year) => {}
                    _ => errors.insert(
                        field.as_str(),
                        format!("Year must be a whole number between {} and {}", MIN_YEAR, max),
                    ),
                }
            }

            if field == ListingField::Vin && !is_vin(value) {
                errors.insert(
                    field.as_str(),
                    "VIN must be 17 characters; letters I, O and Q are not allowed",
                );
            }
        }

        if image_count == 0 {
            errors.insert(IMAGES_FIELD, "At least one image is required");
        }

        errors
    }
}

/// `digits` or `digits.digits`
fn is_decimal(value: &str) -> bool {
    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (value, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    all_digits(whole) && fraction.map_or(true, all_digits)
}

fn is_vin(value: &str) -> bool {
    value.len() == VIN_LENGTH
        && value.chars().all(|c| {
            let c = c.to_ascii_uppercase();
            (c.is_ascii_digit() || c.is_ascii_uppercase()) && !matches!(c, 'I' | 'O' | 'Q')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_fields() -> ListingFields {
        ListingFields::new()
            .with(ListingField::ListingTitle, "2021 Audi Q5 Premium")
            .with(ListingField::SellingPrice, "31999.00")
            .with(ListingField::Category, "SUV")
            .with(ListingField::Make, "Audi")
            .with(ListingField::Model, "Q5")
            .with(ListingField::Condition, "Used")
            .with(ListingField::Year, "2021")
            .with(ListingField::DriveType, "AWD")
            .with(ListingField::FuelType, "Gasoline")
            .with(ListingField::Transmission, "Automatic")
            .with(ListingField::Color, "Black")
            .with(ListingField::Mileage, "28000")
            .with(ListingField::Door, "4")
            .with(ListingField::ListingDescription, "One owner, clean history.")
    }

    #[test]
    fn test_complete_listing_is_valid() {
        let errors = complete_fields()
            .with(ListingField::Vin, "WA1BNAFY5M2012345")
            .validate(1, 2025);
        assert!(errors.is_empty(), "unexpected errors: {}", errors);
    }

    #[test]
    fn test_each_rule_reports_independently() {
        let mut fields = complete_fields()
            .with(ListingField::SellingPrice, "thirty grand")
            .with(ListingField::Year, "1800")
            .with(ListingField::Vin, "WA1BNAFY5M201234");
        fields.set(ListingField::Make, "");

        let errors = fields.validate(0, 2025);

        assert_eq!(errors.len(), 5);
        assert!(errors.contains("make"));
        assert!(errors.contains("selling_price"));
        assert!(errors.contains("year"));
        assert!(errors.contains("vin"));
        assert!(errors.contains(IMAGES_FIELD));
    }

    #[test]
    fn test_year_bounds() {
        assert!(complete_fields()
            .with(ListingField::Year, "2026")
            .validate(1, 2025)
            .is_empty());
        assert!(complete_fields()
            .with(ListingField::Year, "1900")
            .validate(1, 2025)
            .is_empty());
        assert!(complete_fields()
            .with(ListingField::Year, "2027")
            .validate(1, 2025)
            .contains("year"));
        assert!(complete_fields()
            .with(ListingField::Year, "2021.5")
            .validate(1, 2025)
            .contains("year"));
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let errors = complete_fields()
            .with(ListingField::Color, "   ")
            .validate(1, 2025);
        assert_eq!(errors.get("color"), Some("This field is required"));
    }

    #[test]
    fn test_decimal_pattern() {
        assert!(is_decimal("100"));
        assert!(is_decimal("100.5"));
        assert!(!is_decimal("100."));
        assert!(!is_decimal(".5"));
        assert!(!is_decimal("1,000"));
        assert!(!is_decimal("-3"));
    }

    #[test]
    fn test_vin_pattern() {
        assert!(is_vin("1HGCM82633A004352"));
        assert!(is_vin("1hgcm82633a004352"));
        assert!(!is_vin("1HGCM82633A00435"));
        assert!(!is_vin("1HGCM82633A00435I"));
        assert!(!is_vin("1HGCM82633A0043O2"));
        assert!(!is_vin("1HGCM82633A0043Q2"));
    }

    #[test]
    fn test_optional_price_checked_only_when_present() {
        assert!(complete_fields().validate(1, 2025).is_empty());
        assert!(complete_fields()
            .with(ListingField::OriginalPrice, "n/a")
            .validate(1, 2025)
            .contains("original_price"));
    }
}
