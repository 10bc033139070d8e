//! People repository for database operations.
//!
//! Every method acquires its own connection or transaction from the pool and
//! gives it back when it returns, on success and on error alike. Writes run in
//! a single transaction; dropping an uncommitted `sqlx::Transaction` rolls it
//! back, so an early `?` return leaves no partial change behind.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use people_core::reconcile::reconcile;
use people_core::{CreditCardId, EmailAddressId, PageRequest, PersonId, PersonType};

use super::RepositoryError;
use crate::models::{
    CardWritePolicy, CreatePersonInput, CreditCardInput, LinkedCreditCard, PersonDetail,
    PersonPhone, PersonSummary, PhoneNumberInput, SearchFilter, UpdatePersonInput,
};

/// Name-prefix predicate shared by the count and page queries.
///
/// `$1` / `$2` are `LIKE` patterns built by [`like_prefix`], or `NULL`.
macro_rules! search_predicate {
    () => {
        r"
        WHERE ($1::text IS NULL OR p.first_name LIKE $1 ESCAPE '\')
          AND ($2::text IS NULL OR p.last_name LIKE $2 ESCAPE '\')
        "
    };
}

const COUNT_PEOPLE_SQL: &str = concat!(
    "SELECT COUNT(*) FROM person.person p",
    search_predicate!()
);

const SEARCH_PEOPLE_SQL: &str = concat!(
    r"
    SELECT
        p.business_entity_id AS id,
        p.first_name,
        p.last_name,
        (
            SELECT e.email_address
            FROM person.email_address e
            WHERE e.business_entity_id = p.business_entity_id
            ORDER BY e.email_address_id
            LIMIT 1
        ) AS email_address,
        (
            SELECT ph.phone_number
            FROM person.person_phone ph
            WHERE ph.business_entity_id = p.business_entity_id
            ORDER BY ph.phone_number
            LIMIT 1
        ) AS phone_number
    FROM person.person p
    ",
    search_predicate!(),
    r"
    ORDER BY p.last_name, p.first_name, p.business_entity_id
    LIMIT $3 OFFSET $4
    "
);

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for person queries.
#[derive(Debug, sqlx::FromRow)]
struct PersonRow {
    business_entity_id: PersonId,
    person_type: String,
    first_name: String,
    middle_name: Option<String>,
    last_name: String,
    suffix: Option<String>,
    modified_date: DateTime<Utc>,
}

/// A stored email address with its surrogate key.
#[derive(Debug, sqlx::FromRow)]
struct StoredEmail {
    email_address_id: EmailAddressId,
    email_address: String,
}

/// A stored phone number.
#[derive(Debug, sqlx::FromRow)]
struct StoredPhone {
    phone_number: String,
}

/// How many rows one collection gained and lost during an update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionChanges {
    /// Rows deleted.
    pub removed: usize,
    /// Rows inserted.
    pub inserted: usize,
}

/// What an update did to each collection it was given.
///
/// `None` means the payload left that collection out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Email address changes.
    pub email_addresses: Option<CollectionChanges>,
    /// Phone number changes.
    pub phone_numbers: Option<CollectionChanges>,
    /// Credit card link changes. Card rows themselves are never deleted.
    pub credit_cards: Option<CollectionChanges>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for people database operations.
pub struct PeopleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PeopleRepository<'a> {
    /// Create a new people repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Search people by name prefix.
    ///
    /// Returns the total number of matches and the requested page, ordered by
    /// last name then first name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        filter: &SearchFilter,
        page: PageRequest,
    ) -> Result<(i64, Vec<PersonSummary>), RepositoryError> {
        let first_name = filter.first_name.as_deref().map(like_prefix);
        let last_name = filter.last_name.as_deref().map(like_prefix);

        let mut conn = self.pool.acquire().await?;

        let total: i64 = sqlx::query_scalar(COUNT_PEOPLE_SQL)
            .bind(first_name.as_deref())
            .bind(last_name.as_deref())
            .fetch_one(&mut *conn)
            .await?;

        let people = sqlx::query_as::<_, PersonSummary>(SEARCH_PEOPLE_SQL)
            .bind(first_name.as_deref())
            .bind(last_name.as_deref())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *conn)
            .await?;

        Ok((total, people))
    }

    /// Get a person with all email addresses, phones and credit cards.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored person type is unknown.
    #[instrument(skip(self))]
    pub async fn get_detail(&self, id: PersonId) -> Result<Option<PersonDetail>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query_as::<_, PersonRow>(
            r"
            SELECT business_entity_id, person_type, first_name, middle_name,
                   last_name, suffix, modified_date
            FROM person.person
            WHERE business_entity_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let person_type = PersonType::parse(&row.person_type).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid person type in database: {e}"))
        })?;

        let email_addresses: Vec<String> = sqlx::query_scalar(
            r"
            SELECT email_address
            FROM person.email_address
            WHERE business_entity_id = $1
            ORDER BY email_address_id
            ",
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        let phone_numbers = sqlx::query_as::<_, PersonPhone>(
            r"
            SELECT ph.phone_number, ph.phone_number_type_id, t.name
            FROM person.person_phone ph
            JOIN person.phone_number_type t
              ON t.phone_number_type_id = ph.phone_number_type_id
            WHERE ph.business_entity_id = $1
            ORDER BY ph.phone_number, ph.phone_number_type_id
            ",
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        let credit_cards = sqlx::query_as::<_, LinkedCreditCard>(
            r"
            SELECT c.credit_card_id, c.card_type, c.card_number,
                   c.exp_month, c.exp_year, l.modified_date
            FROM sales.person_credit_card l
            JOIN sales.credit_card c ON c.credit_card_id = l.credit_card_id
            WHERE l.business_entity_id = $1
            ORDER BY c.credit_card_id
            ",
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(Some(PersonDetail {
            business_entity_id: row.business_entity_id,
            person_type,
            first_name: row.first_name,
            middle_name: row.middle_name,
            last_name: row.last_name,
            suffix: row.suffix,
            modified_date: row.modified_date,
            email_addresses,
            phone_numbers,
            credit_cards,
        }))
    }

    /// Apply an update payload to a person.
    ///
    /// Non-null scalar fields overwrite the stored value. Each collection
    /// present in the payload is reconciled against the stored one: rows whose
    /// key is missing from the payload are deleted, payload entries with a new
    /// key are inserted, and rows that match are left alone. Cards are written
    /// with [`CardWritePolicy::Upsert`], so an existing card's fields are
    /// overwritten for every person linked to it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the person doesn't exist.
    /// Returns `RepositoryError::Conflict` on a unique-key violation.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: PersonId,
        input: &UpdatePersonInput,
    ) -> Result<UpdateOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, PersonId>(
            r"
            SELECT business_entity_id
            FROM person.person
            WHERE business_entity_id = $1
            FOR UPDATE
            ",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        sqlx::query(
            r"
            UPDATE person.person
            SET
                person_type = COALESCE($2, person_type),
                first_name = COALESCE($3, first_name),
                middle_name = COALESCE($4, middle_name),
                last_name = COALESCE($5, last_name),
                suffix = COALESCE($6, suffix),
                modified_date = NOW()
            WHERE business_entity_id = $1
            ",
        )
        .bind(id)
        .bind(input.person_type.map(PersonType::code))
        .bind(input.first_name.as_deref())
        .bind(input.middle_name.as_deref())
        .bind(input.last_name.as_deref())
        .bind(input.suffix.as_deref())
        .execute(&mut *tx)
        .await?;

        let mut outcome = UpdateOutcome::default();

        if let Some(desired) = &input.email_addresses {
            outcome.email_addresses = Some(sync_email_addresses(&mut tx, id, desired).await?);
        }
        if let Some(desired) = &input.phone_numbers {
            outcome.phone_numbers = Some(sync_phone_numbers(&mut tx, id, desired).await?);
        }
        if let Some(desired) = &input.credit_cards {
            outcome.credit_cards = Some(sync_credit_cards(&mut tx, id, desired).await?);
        }

        tx.commit().await?;

        tracing::debug!(?outcome, "Person updated");
        Ok(outcome)
    }

    /// Create a person and every child row in the payload.
    ///
    /// Children are inserted as given, without de-duplication. Cards are
    /// written with [`CardWritePolicy::InsertOnly`]: reusing the ID of an
    /// existing card fails instead of linking to it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a card ID or phone already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: &CreatePersonInput) -> Result<PersonId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: PersonId = sqlx::query_scalar(
            r"
            INSERT INTO person.person (person_type, first_name, middle_name, last_name, suffix)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING business_entity_id
            ",
        )
        .bind(input.person_type.code())
        .bind(&input.first_name)
        .bind(input.middle_name.as_deref())
        .bind(&input.last_name)
        .bind(input.suffix.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        for email in input.email_addresses.iter().flatten() {
            insert_email_address(&mut tx, id, email).await?;
        }
        for phone in input.phone_numbers.iter().flatten() {
            insert_phone_number(&mut tx, id, phone).await?;
        }
        for card in input.credit_cards.iter().flatten() {
            write_credit_card(&mut tx, card, CardWritePolicy::InsertOnly).await?;
            insert_card_link(&mut tx, id, card.credit_card_id).await?;
        }

        tx.commit().await?;

        tracing::debug!(person_id = %id, "Person created");
        Ok(id)
    }

    /// Find the lowest-numbered person with exactly this first and last name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<PersonId>, RepositoryError> {
        let id = sqlx::query_scalar(
            r"
            SELECT business_entity_id
            FROM person.person
            WHERE first_name = $1 AND last_name = $2
            ORDER BY business_entity_id
            LIMIT 1
            ",
        )
        .bind(first_name)
        .bind(last_name)
        .fetch_optional(self.pool)
        .await?;

        Ok(id)
    }
}

// =============================================================================
// Collection Sync
// =============================================================================

async fn sync_email_addresses(
    conn: &mut PgConnection,
    id: PersonId,
    desired: &[String],
) -> Result<CollectionChanges, RepositoryError> {
    let current = sqlx::query_as::<_, StoredEmail>(
        r"
        SELECT email_address_id, email_address
        FROM person.email_address
        WHERE business_entity_id = $1
        ",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let plan = reconcile(
        &current,
        desired,
        |row| row.email_address.as_str(),
        String::as_str,
    );

    if !plan.remove.is_empty() {
        let ids: Vec<i32> = plan
            .remove
            .iter()
            .map(|row| row.email_address_id.as_i32())
            .collect();
        sqlx::query("DELETE FROM person.email_address WHERE email_address_id = ANY($1)")
            .bind(&ids)
            .execute(&mut *conn)
            .await?;
    }
    for email in &plan.insert {
        insert_email_address(conn, id, email).await?;
    }

    Ok(CollectionChanges {
        removed: plan.remove.len(),
        inserted: plan.insert.len(),
    })
}

async fn sync_phone_numbers(
    conn: &mut PgConnection,
    id: PersonId,
    desired: &[PhoneNumberInput],
) -> Result<CollectionChanges, RepositoryError> {
    let current = sqlx::query_as::<_, StoredPhone>(
        r"
        SELECT phone_number
        FROM person.person_phone
        WHERE business_entity_id = $1
        ",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    // Phones are matched on the number alone; the type is not part of the key.
    let plan = reconcile(
        &current,
        desired,
        |row| row.phone_number.as_str(),
        |phone| phone.phone_number.as_str(),
    );

    if !plan.remove.is_empty() {
        let numbers: Vec<&str> = plan
            .remove
            .iter()
            .map(|row| row.phone_number.as_str())
            .collect();
        sqlx::query(
            r"
            DELETE FROM person.person_phone
            WHERE business_entity_id = $1 AND phone_number = ANY($2)
            ",
        )
        .bind(id)
        .bind(&numbers)
        .execute(&mut *conn)
        .await?;
    }
    for phone in &plan.insert {
        insert_phone_number(conn, id, phone).await?;
    }

    Ok(CollectionChanges {
        removed: plan.remove.len(),
        inserted: plan.insert.len(),
    })
}

async fn sync_credit_cards(
    conn: &mut PgConnection,
    id: PersonId,
    desired: &[CreditCardInput],
) -> Result<CollectionChanges, RepositoryError> {
    let current: Vec<CreditCardId> = sqlx::query_scalar(
        r"
        SELECT credit_card_id
        FROM sales.person_credit_card
        WHERE business_entity_id = $1
        ",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let plan = reconcile(&current, desired, |card_id| *card_id, |card| card.credit_card_id);

    // Only the links go; the cards themselves may be linked to other people.
    if !plan.remove.is_empty() {
        let ids: Vec<i32> = plan.remove.iter().map(|card_id| card_id.as_i32()).collect();
        sqlx::query(
            r"
            DELETE FROM sales.person_credit_card
            WHERE business_entity_id = $1 AND credit_card_id = ANY($2)
            ",
        )
        .bind(id)
        .bind(&ids)
        .execute(&mut *conn)
        .await?;
    }

    // Every card in the payload is written, linked or not, so edits to a card
    // the person already holds are saved too.
    for card in desired {
        write_credit_card(conn, card, CardWritePolicy::Upsert).await?;
    }
    for card in &plan.insert {
        insert_card_link(conn, id, card.credit_card_id).await?;
    }

    Ok(CollectionChanges {
        removed: plan.remove.len(),
        inserted: plan.insert.len(),
    })
}

// =============================================================================
// Row Writers
// =============================================================================

async fn insert_email_address(
    conn: &mut PgConnection,
    id: PersonId,
    email: &str,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO person.email_address (business_entity_id, email_address)
        VALUES ($1, $2)
        ",
    )
    .bind(id)
    .bind(email)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn insert_phone_number(
    conn: &mut PgConnection,
    id: PersonId,
    phone: &PhoneNumberInput,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO person.person_phone (business_entity_id, phone_number, phone_number_type_id)
        VALUES ($1, $2, $3)
        ",
    )
    .bind(id)
    .bind(&phone.phone_number)
    .bind(phone.phone_number_type_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| RepositoryError::from_write(e, "phone number"))?;

    Ok(())
}

async fn write_credit_card(
    conn: &mut PgConnection,
    card: &CreditCardInput,
    policy: CardWritePolicy,
) -> Result<(), RepositoryError> {
    let sql = match policy {
        CardWritePolicy::Upsert => {
            r"
            INSERT INTO sales.credit_card (credit_card_id, card_type, card_number, exp_month, exp_year)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (credit_card_id) DO UPDATE
            SET card_type = EXCLUDED.card_type,
                card_number = EXCLUDED.card_number,
                exp_month = EXCLUDED.exp_month,
                exp_year = EXCLUDED.exp_year,
                modified_date = NOW()
            "
        }
        CardWritePolicy::InsertOnly => {
            r"
            INSERT INTO sales.credit_card (credit_card_id, card_type, card_number, exp_month, exp_year)
            VALUES ($1, $2, $3, $4, $5)
            "
        }
    };

    sqlx::query(sql)
        .bind(card.credit_card_id)
        .bind(&card.card_type)
        .bind(&card.card_number)
        .bind(card.exp_month)
        .bind(card.exp_year)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            RepositoryError::from_write(e, &format!("credit card {}", card.credit_card_id))
        })?;

    Ok(())
}

async fn insert_card_link(
    conn: &mut PgConnection,
    id: PersonId,
    credit_card_id: CreditCardId,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO sales.person_credit_card (business_entity_id, credit_card_id)
        VALUES ($1, $2)
        ",
    )
    .bind(id)
    .bind(credit_card_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| RepositoryError::from_write(e, "credit card link"))?;

    Ok(())
}

/// Turn a user-supplied prefix into a `LIKE` pattern.
///
/// `%`, `_` and the escape character itself match literally, so a search for
/// `"50%"` only finds names that start with those three characters.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
