//! Person type classification.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a person type code is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown person type code: {0:?}")]
pub struct PersonTypeError(pub String);

/// The role a person plays in the business.
///
/// Stored as a two-letter code (`SC`, `IN`, `SP`, `EM`, `VC`, `GC`) and
/// serialized the same way, so the API speaks the codes the database holds.
///
/// ```
/// use people_core::PersonType;
///
/// assert_eq!(PersonType::parse("EM"), Ok(PersonType::Employee));
/// assert_eq!(PersonType::Employee.code(), "EM");
/// assert!(PersonType::parse("XX").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersonType {
    /// Contact person at a store.
    #[serde(rename = "SC")]
    StoreContact,
    /// Individual (retail) customer.
    #[serde(rename = "IN")]
    IndividualCustomer,
    /// Sales person.
    #[serde(rename = "SP")]
    SalesPerson,
    /// Employee (non-sales).
    #[serde(rename = "EM")]
    Employee,
    /// Contact person at a vendor.
    #[serde(rename = "VC")]
    VendorContact,
    /// General contact.
    #[serde(rename = "GC")]
    GeneralContact,
}

impl PersonType {
    /// Every person type, in display order.
    pub const ALL: [Self; 6] = [
        Self::StoreContact,
        Self::IndividualCustomer,
        Self::SalesPerson,
        Self::Employee,
        Self::VendorContact,
        Self::GeneralContact,
    ];

    /// Parse a two-letter person type code.
    ///
    /// Surrounding whitespace is ignored since the column is fixed-width.
    ///
    /// # Errors
    ///
    /// Returns `PersonTypeError` if the code is not one of the known values.
    pub fn parse(code: &str) -> Result<Self, PersonTypeError> {
        match code.trim() {
            "SC" => Ok(Self::StoreContact),
            "IN" => Ok(Self::IndividualCustomer),
            "SP" => Ok(Self::SalesPerson),
            "EM" => Ok(Self::Employee),
            "VC" => Ok(Self::VendorContact),
            "GC" => Ok(Self::GeneralContact),
            other => Err(PersonTypeError(other.to_owned())),
        }
    }

    /// The two-letter storage code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::StoreContact => "SC",
            Self::IndividualCustomer => "IN",
            Self::SalesPerson => "SP",
            Self::Employee => "EM",
            Self::VendorContact => "VC",
            Self::GeneralContact => "GC",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::StoreContact => "Store Contact",
            Self::IndividualCustomer => "Individual (retail) Customer",
            Self::SalesPerson => "Sales Person",
            Self::Employee => "Employee (Non-Sales)",
            Self::VendorContact => "Vendor Contact",
            Self::GeneralContact => "General Contact",
        }
    }
}

impl fmt::Display for PersonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for PersonType {
    type Err = PersonTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
