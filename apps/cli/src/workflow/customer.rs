//! Customer registration and listing.

use chrono::NaiveDate;
use tracing::info;

use crate::error::AppError;
use pizza_core::validation::validate_new_customer;
use pizza_core::Customer;
use pizza_db::Database;

/// Validates raw input and registers a customer with a pizza count of zero.
///
/// `today` bounds the birth date; future dates are rejected.
pub async fn add_customer(
    db: &Database,
    name: &str,
    birth_date: &str,
    address: &str,
    phone: &str,
    today: NaiveDate,
) -> Result<Customer, AppError> {
    let new_customer = validate_new_customer(name, birth_date, address, phone, today)?;
    let customer = db.customers().insert(&new_customer).await?;

    info!(customer_id = customer.id, "Customer registered");
    Ok(customer)
}

/// All customers, ordered by id.
pub async fn list_customers(db: &Database) -> Result<Vec<Customer>, AppError> {
    Ok(db.customers().list().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::workflow::testing::database;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[tokio::test]
    async fn test_add_customer_trims_and_starts_at_zero() {
        let db = database().await;

        let customer = add_customer(
            &db,
            "  Sanne Jansen ",
            "1992-07-14",
            "Wycker Brugstraat 2, 6221 EA Maastricht",
            "06 1234 5678",
            today(),
        )
        .await
        .unwrap();

        assert_eq!(customer.name, "Sanne Jansen");
        assert_eq!(customer.birth_date, NaiveDate::from_ymd_opt(1992, 7, 14).unwrap());
        assert_eq!(customer.pizza_count, 0);
        assert_eq!(customer.postal_prefix().unwrap().as_str(), "6221");
    }

    #[tokio::test]
    async fn test_add_customer_rejects_bad_input() {
        let db = database().await;
        let address = "Markt 1, 6211 CK Maastricht";

        let err = add_customer(&db, "", "1992-07-14", address, "0612345678", today())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);

        let err = add_customer(&db, "Sanne", "14-07-1992", address, "0612345678", today())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);

        let err = add_customer(&db, "Sanne", "2027-01-01", address, "0612345678", today())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);

        assert!(list_customers(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_customers_by_id() {
        let db = database().await;
        for name in ["Zoe", "Anna"] {
            add_customer(&db, name, "1990-01-01", "Markt 1", "0612345678", today())
                .await
                .unwrap();
        }

        let names: Vec<String> = list_customers(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Zoe", "Anna"]);
    }
}
