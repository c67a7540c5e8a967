//! Delivery address schema, validation, and profile prefill.
//!
//! The address is a closed shape: exactly seven recognized fields. Form
//! input is copied into [`DeliveryAddress`] field by field after validation,
//! so unknown keys cannot leak into committed step data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use redline_core::Email;

use crate::models::CustomerProfile;

/// A delivery address as committed to the checkout step.
///
/// All fields are plain strings; an empty string means "not provided".
/// Validation guarantees committed values have every field non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub street: String,
    pub zip: String,
    pub city: String,
    #[serde(rename = "countryCode")]
    pub country_code: String,
}

/// The recognized delivery address fields.
///
/// Replaces name-based accessor dispatch with one explicit enumeration:
/// every place that walks "all address fields" iterates [`AddressField::ALL`]
/// and reads through the typed accessors below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AddressField {
    Email,
    Firstname,
    Lastname,
    Street,
    Zip,
    City,
    CountryCode,
}

impl AddressField {
    /// All recognized fields, in form order.
    pub const ALL: [Self; 7] = [
        Self::Email,
        Self::Firstname,
        Self::Lastname,
        Self::Street,
        Self::Zip,
        Self::City,
        Self::CountryCode,
    ];

    /// The field's form/wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Firstname => "firstname",
            Self::Lastname => "lastname",
            Self::Street => "street",
            Self::Zip => "zip",
            Self::City => "city",
            Self::CountryCode => "countryCode",
        }
    }

    /// Read this field from an address.
    #[must_use]
    pub fn of<'a>(self, address: &'a DeliveryAddress) -> &'a str {
        match self {
            Self::Email => &address.email,
            Self::Firstname => &address.firstname,
            Self::Lastname => &address.lastname,
            Self::Street => &address.street,
            Self::Zip => &address.zip,
            Self::City => &address.city,
            Self::CountryCode => &address.country_code,
        }
    }

    /// Write this field on an address.
    pub fn set(self, address: &mut DeliveryAddress, value: String) {
        let slot = match self {
            Self::Email => &mut address.email,
            Self::Firstname => &mut address.firstname,
            Self::Lastname => &mut address.lastname,
            Self::Street => &mut address.street,
            Self::Zip => &mut address.zip,
            Self::City => &mut address.city,
            Self::CountryCode => &mut address.country_code,
        };
        *slot = value;
    }

    /// Read this field from a customer profile, if the profile carries it.
    #[must_use]
    pub fn of_profile(self, profile: &CustomerProfile) -> Option<&str> {
        let value = match self {
            Self::Email => profile.email.as_deref(),
            Self::Firstname => profile.firstname.as_deref(),
            Self::Lastname => profile.lastname.as_deref(),
            Self::Street => profile.street.as_deref(),
            Self::Zip => profile.zip.as_deref(),
            Self::City => profile.city.as_deref(),
            Self::CountryCode => profile.country_code.as_deref(),
        };
        value.filter(|v| !v.trim().is_empty())
    }
}

/// Field-keyed validation messages for a submitted address form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<AddressField, String>,
}

impl ValidationErrors {
    fn insert(&mut self, field: AddressField, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    /// True if no field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The message for one field, if it failed validation.
    #[must_use]
    pub fn message(&self, field: AddressField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Iterate `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (AddressField, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

/// Raw delivery address form input.
///
/// Every field defaults to empty so a missing form key surfaces as a
/// validation error instead of a deserialization reject.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, rename = "countryCode")]
    pub country_code: String,
}

impl AddressForm {
    fn field(&self, field: AddressField) -> &str {
        match field {
            AddressField::Email => &self.email,
            AddressField::Firstname => &self.firstname,
            AddressField::Lastname => &self.lastname,
            AddressField::Street => &self.street,
            AddressField::Zip => &self.zip,
            AddressField::City => &self.city,
            AddressField::CountryCode => &self.country_code,
        }
    }

    /// A shape-normalized draft of the form values, for re-rendering.
    #[must_use]
    pub fn as_draft(&self) -> DeliveryAddress {
        let mut draft = DeliveryAddress::default();
        for field in AddressField::ALL {
            field.set(&mut draft, self.field(field).trim().to_owned());
        }
        draft
    }
}

/// Validate submitted form input against the address schema.
///
/// Presence is required for every field; the email must parse and the
/// country code must be a two-letter ISO code. On success the returned
/// address is a field-by-field copy of the trimmed input.
///
/// # Errors
///
/// Returns the collected field-level messages when any check fails.
pub fn validate(form: &AddressForm) -> Result<DeliveryAddress, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let mut address = DeliveryAddress::default();

    for field in AddressField::ALL {
        let value = form.field(field).trim();
        if value.is_empty() {
            errors.insert(field, format!("{} is required", field.as_str()));
            continue;
        }
        field.set(&mut address, value.to_owned());
    }

    if !address.email.is_empty() {
        if let Err(e) = Email::parse(&address.email) {
            errors.insert(AddressField::Email, e.to_string());
        }
    }

    if !address.country_code.is_empty()
        && !(address.country_code.len() == 2
            && address.country_code.chars().all(|c| c.is_ascii_alphabetic()))
    {
        errors.insert(
            AddressField::CountryCode,
            "countryCode must be a two-letter country code",
        );
    }

    if errors.is_empty() {
        address.country_code = address.country_code.to_ascii_uppercase();
        Ok(address)
    } else {
        Err(errors)
    }
}

/// Merge customer profile defaults into a partially-filled address.
///
/// Pure and infallible: absent stored data is treated as an all-empty
/// draft, and a profile value is only used where the draft field is blank.
/// User input is never overwritten.
#[must_use]
pub fn prefill(
    stored: Option<&DeliveryAddress>,
    profile: Option<&CustomerProfile>,
) -> DeliveryAddress {
    let mut draft = stored.cloned().unwrap_or_default();

    if let Some(profile) = profile {
        for field in AddressField::ALL {
            if field.of(&draft).trim().is_empty() {
                if let Some(value) = field.of_profile(profile) {
                    field.set(&mut draft, value.to_owned());
                }
            }
        }
    }

    draft
}
