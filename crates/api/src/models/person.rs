//! Person domain models and the JSON shapes the API exchanges.
//!
//! Field names are camelCase on the wire to match the single-page app.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use people_core::{CreditCardId, PageError, PageRequest, PersonId, PersonType, PhoneNumberTypeId};

// =============================================================================
// Search
// =============================================================================

/// Body of `POST /api/people/search`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Prefix the first name must start with.
    pub first_name: Option<String>,
    /// Prefix the last name must start with.
    pub last_name: Option<String>,
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Rows per page.
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

const fn default_page() -> i64 {
    PageRequest::DEFAULT_PAGE
}

const fn default_page_size() -> i64 {
    PageRequest::DEFAULT_PAGE_SIZE
}

impl SearchRequest {
    /// Split the request into a name filter and a validated page.
    ///
    /// # Errors
    ///
    /// Returns `PageError` if the paging input is out of range.
    pub fn validate(self, max_page_size: u32) -> Result<(SearchFilter, PageRequest), PageError> {
        let page = PageRequest::new(self.page, self.page_size, max_page_size)?;
        let filter = SearchFilter {
            first_name: self.first_name,
            last_name: self.last_name,
        };
        Ok((filter, page))
    }
}

/// Name prefixes a search is restricted to. `None` matches everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    /// Required first-name prefix.
    pub first_name: Option<String>,
    /// Required last-name prefix.
    pub last_name: Option<String>,
}

/// One row of a search result page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    /// Person ID.
    pub id: PersonId,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// First email address on file, if any.
    pub email_address: Option<String>,
    /// First phone number on file, if any.
    pub phone_number: Option<String>,
}

/// Response of `POST /api/people/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// The requested page of people.
    pub people: Vec<PersonSummary>,
    /// Number of people matching the filter across all pages.
    pub total_count: i64,
    /// Number of pages at the requested page size.
    pub total_pages: i64,
}

// =============================================================================
// Detail
// =============================================================================

/// A person with every child collection loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDetail {
    /// Person ID.
    pub business_entity_id: PersonId,
    /// Role of the person.
    pub person_type: PersonType,
    /// First name.
    pub first_name: String,
    /// Middle name.
    pub middle_name: Option<String>,
    /// Last name.
    pub last_name: String,
    /// Name suffix (e.g. "Jr.").
    pub suffix: Option<String>,
    /// When the person row last changed.
    pub modified_date: DateTime<Utc>,
    /// Email addresses, oldest first.
    pub email_addresses: Vec<String>,
    /// Phone numbers with their type.
    pub phone_numbers: Vec<PersonPhone>,
    /// Credit cards linked to this person.
    pub credit_cards: Vec<LinkedCreditCard>,
}

/// A phone number as shown on a person's detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PersonPhone {
    /// The number as entered.
    pub phone_number: String,
    /// Phone type ID.
    pub phone_number_type_id: PhoneNumberTypeId,
    /// Phone type name (e.g. "Cell").
    pub name: String,
}

/// A credit card as linked to a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LinkedCreditCard {
    /// Card ID (shared across people).
    pub credit_card_id: CreditCardId,
    /// Card brand (e.g. "Vista").
    pub card_type: String,
    /// Card number.
    pub card_number: String,
    /// Expiry month, 1-12.
    pub exp_month: i16,
    /// Expiry year.
    pub exp_year: i16,
    /// When the link (not the card) last changed.
    pub modified_date: DateTime<Utc>,
}

// =============================================================================
// Writes
// =============================================================================

/// A phone number supplied by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumberInput {
    /// The number as entered. Identity within a person.
    pub phone_number: String,
    /// Phone type ID.
    pub phone_number_type_id: PhoneNumberTypeId,
}

/// A credit card supplied by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCardInput {
    /// Card ID. Identity of both the card and the link.
    pub credit_card_id: CreditCardId,
    /// Card brand.
    pub card_type: String,
    /// Card number.
    pub card_number: String,
    /// Expiry month, 1-12.
    pub exp_month: i16,
    /// Expiry year.
    pub exp_year: i16,
}

/// Body of `POST /api/people/{id}`.
///
/// Scalar fields left `null` keep their stored value, so a field cannot be
/// cleared through an update. A collection left `null` is untouched; a
/// present collection replaces the stored one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePersonInput {
    /// New role, or `null` to keep the stored one.
    #[serde(default)]
    pub person_type: Option<PersonType>,
    /// New first name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// New middle name.
    #[serde(default)]
    pub middle_name: Option<String>,
    /// New last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// New name suffix.
    #[serde(default)]
    pub suffix: Option<String>,
    /// Complete desired set of email addresses.
    #[serde(default)]
    pub email_addresses: Option<Vec<String>>,
    /// Complete desired set of phone numbers, matched on the number.
    #[serde(default)]
    pub phone_numbers: Option<Vec<PhoneNumberInput>>,
    /// Complete desired set of linked cards, matched on the card ID.
    #[serde(default)]
    pub credit_cards: Option<Vec<CreditCardInput>>,
}

/// Body of `PUT /api/people/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonInput {
    /// Role of the person.
    pub person_type: PersonType,
    /// First name.
    pub first_name: String,
    /// Middle name.
    #[serde(default)]
    pub middle_name: Option<String>,
    /// Last name.
    pub last_name: String,
    /// Name suffix (e.g. "Jr.").
    #[serde(default)]
    pub suffix: Option<String>,
    /// Email addresses, inserted in order.
    #[serde(default)]
    pub email_addresses: Option<Vec<String>>,
    /// Phone numbers, inserted in order.
    #[serde(default)]
    pub phone_numbers: Option<Vec<PhoneNumberInput>>,
    /// Cards to create and link; each ID must be new.
    #[serde(default)]
    pub credit_cards: Option<Vec<CreditCardInput>>,
}

/// How a write treats a credit card ID that may already exist.
///
/// Cards are global rows shared between people, so the choice decides whether
/// editing one person can rewrite a card other people see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardWritePolicy {
    /// Overwrite an existing card's fields, create it otherwise.
    ///
    /// Used by updates: every person linked to the card sees the new values.
    Upsert,
    /// Always insert; an existing ID is a conflict.
    ///
    /// Used by creates.
    InsertOnly,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_search_request_defaults() {
        let request: SearchRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, 10);
        assert!(request.first_name.is_none());
        assert!(request.last_name.is_none());
    }

    #[test]
    fn test_search_request_validate() {
        let request: SearchRequest =
            serde_json::from_value(json!({"firstName": "Jo", "page": 2, "pageSize": 5})).unwrap();

        let (filter, page) = request.validate(100).unwrap();

        assert_eq!(filter.first_name.as_deref(), Some("Jo"));
        assert!(filter.last_name.is_none());
        assert_eq!(page.offset(), 5);
        assert_eq!(page.limit(), 5);
    }

    #[test]
    fn test_search_request_rejects_zero_page() {
        let request: SearchRequest = serde_json::from_value(json!({"page": 0})).unwrap();
        assert_eq!(request.validate(100).unwrap_err(), PageError::PageTooSmall);
    }

    #[test]
    fn test_update_input_absent_collections() {
        let input: UpdatePersonInput =
            serde_json::from_value(json!({"firstName": "Ken", "emailAddresses": []})).unwrap();

        assert_eq!(input.first_name.as_deref(), Some("Ken"));
        assert!(input.last_name.is_none());
        assert_eq!(input.email_addresses, Some(vec![]));
        assert!(input.phone_numbers.is_none());
        assert!(input.credit_cards.is_none());
    }

    #[test]
    fn test_update_input_null_collection_is_absent() {
        let input: UpdatePersonInput =
            serde_json::from_value(json!({"phoneNumbers": null})).unwrap();
        assert!(input.phone_numbers.is_none());
    }

    #[test]
    fn test_update_input_parses_children() {
        let input: UpdatePersonInput = serde_json::from_value(json!({
            "personType": "EM",
            "phoneNumbers": [{"phoneNumber": "697-555-0142", "phoneNumberTypeId": 1}],
            "creditCards": [{
                "creditCardId": 11,
                "cardType": "Vista",
                "cardNumber": "11111000471254",
                "expMonth": 11,
                "expYear": 2027
            }]
        }))
        .unwrap();

        assert_eq!(input.person_type, Some(PersonType::Employee));
        let phones = input.phone_numbers.unwrap();
        assert_eq!(phones[0].phone_number_type_id, PhoneNumberTypeId::new(1));
        let cards = input.credit_cards.unwrap();
        assert_eq!(cards[0].credit_card_id, CreditCardId::new(11));
        assert_eq!(cards[0].exp_year, 2027);
    }

    #[test]
    fn test_create_input_requires_names() {
        let result: Result<CreatePersonInput, _> =
            serde_json::from_value(json!({"personType": "IN", "firstName": "Ken"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_input_rejects_unknown_type() {
        let result: Result<CreatePersonInput, _> = serde_json::from_value(
            json!({"personType": "XX", "firstName": "Ken", "lastName": "Sánchez"}),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = PersonSummary {
            id: PersonId::new(1),
            first_name: "Ken".to_string(),
            last_name: "Sánchez".to_string(),
            email_address: None,
            phone_number: Some("697-555-0142".to_string()),
        };

        let value = serde_json::to_value(&summary).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 1,
                "firstName": "Ken",
                "lastName": "Sánchez",
                "emailAddress": null,
                "phoneNumber": "697-555-0142"
            })
        );
    }
}
