//! Domain models for the people API.

pub mod person;

pub use person::{
    CardWritePolicy, CreatePersonInput, CreditCardInput, LinkedCreditCard, PersonDetail,
    PersonPhone, PersonSummary, PhoneNumberInput, SearchFilter, SearchRequest, SearchResult,
    UpdatePersonInput,
};
