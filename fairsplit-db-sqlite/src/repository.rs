use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fairsplit_core::{
    CalculationMode, JointTaxData, NewTaxHousehold, PartnerId, RepositoryError, TaxDataRepository,
    TaxHousehold, TaxPartner,
};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite};
use tracing::debug;

use crate::decimal::{decimal_to_f64, get_decimal};

const UPSERT_HOUSEHOLD: &str = "INSERT INTO tax_household (
        user_id, tax_year, calculation_mode,
        partner_a_name, partner_a_tax_id, partner_a_taxable_income, partner_a_tax_class,
        partner_a_income_related_expenses, partner_a_special_expenses,
        partner_a_extraordinary_expenses, partner_a_child_allowance,
        partner_a_assessed_income_tax, partner_a_assessed_surcharge,
        partner_a_paid_wage_tax, partner_a_paid_prepayment, partner_a_paid_surcharge,
        partner_b_name, partner_b_tax_id, partner_b_taxable_income, partner_b_tax_class,
        partner_b_income_related_expenses, partner_b_special_expenses,
        partner_b_extraordinary_expenses, partner_b_child_allowance,
        partner_b_assessed_income_tax, partner_b_assessed_surcharge,
        partner_b_paid_wage_tax, partner_b_paid_prepayment, partner_b_paid_surcharge,
        joint_taxable_income, joint_assessed_income_tax, joint_assessed_surcharge,
        created_at, updated_at
    ) VALUES (
        ?, ?, ?,
        ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
        ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
        ?, ?, ?,
        ?, ?
    )
    ON CONFLICT (user_id, tax_year) DO UPDATE SET
        calculation_mode = excluded.calculation_mode,
        partner_a_name = excluded.partner_a_name,
        partner_a_tax_id = excluded.partner_a_tax_id,
        partner_a_taxable_income = excluded.partner_a_taxable_income,
        partner_a_tax_class = excluded.partner_a_tax_class,
        partner_a_income_related_expenses = excluded.partner_a_income_related_expenses,
        partner_a_special_expenses = excluded.partner_a_special_expenses,
        partner_a_extraordinary_expenses = excluded.partner_a_extraordinary_expenses,
        partner_a_child_allowance = excluded.partner_a_child_allowance,
        partner_a_assessed_income_tax = excluded.partner_a_assessed_income_tax,
        partner_a_assessed_surcharge = excluded.partner_a_assessed_surcharge,
        partner_a_paid_wage_tax = excluded.partner_a_paid_wage_tax,
        partner_a_paid_prepayment = excluded.partner_a_paid_prepayment,
        partner_a_paid_surcharge = excluded.partner_a_paid_surcharge,
        partner_b_name = excluded.partner_b_name,
        partner_b_tax_id = excluded.partner_b_tax_id,
        partner_b_taxable_income = excluded.partner_b_taxable_income,
        partner_b_tax_class = excluded.partner_b_tax_class,
        partner_b_income_related_expenses = excluded.partner_b_income_related_expenses,
        partner_b_special_expenses = excluded.partner_b_special_expenses,
        partner_b_extraordinary_expenses = excluded.partner_b_extraordinary_expenses,
        partner_b_child_allowance = excluded.partner_b_child_allowance,
        partner_b_assessed_income_tax = excluded.partner_b_assessed_income_tax,
        partner_b_assessed_surcharge = excluded.partner_b_assessed_surcharge,
        partner_b_paid_wage_tax = excluded.partner_b_paid_wage_tax,
        partner_b_paid_prepayment = excluded.partner_b_paid_prepayment,
        partner_b_paid_surcharge = excluded.partner_b_paid_surcharge,
        joint_taxable_income = excluded.joint_taxable_income,
        joint_assessed_income_tax = excluded.joint_assessed_income_tax,
        joint_assessed_surcharge = excluded.joint_assessed_surcharge,
        updated_at = excluded.updated_at";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connect to `database_url`, creating the database file if it does not
    /// exist. Accepts sqlx URLs (`sqlite:fairsplit.db?mode=rwc`,
    /// `sqlite::memory:`) as well as bare paths and `:memory:`.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

fn bind_partner<'q>(
    query: SqliteQuery<'q>,
    partner: &TaxPartner,
) -> SqliteQuery<'q> {
    query
        .bind(partner.name.clone())
        .bind(partner.tax_id.clone())
        .bind(decimal_to_f64(partner.taxable_income))
        .bind(partner.tax_class)
        .bind(decimal_to_f64(partner.income_related_expenses))
        .bind(decimal_to_f64(partner.special_expenses))
        .bind(decimal_to_f64(partner.extraordinary_expenses))
        .bind(decimal_to_f64(partner.child_allowance))
        .bind(decimal_to_f64(partner.assessed_income_tax))
        .bind(decimal_to_f64(partner.assessed_surcharge))
        .bind(decimal_to_f64(partner.paid_wage_tax))
        .bind(decimal_to_f64(partner.paid_prepayment))
        .bind(decimal_to_f64(partner.paid_surcharge))
}

fn row_to_partner(
    row: &SqliteRow,
    id: PartnerId,
) -> Result<TaxPartner, RepositoryError> {
    let prefix = match id {
        PartnerId::A => "partner_a",
        PartnerId::B => "partner_b",
    };
    let col = |name: &str| format!("{prefix}_{name}");

    Ok(TaxPartner {
        id,
        name: row.try_get(col("name").as_str()).map_err(db_err)?,
        tax_id: row.try_get(col("tax_id").as_str()).map_err(db_err)?,
        taxable_income: get_decimal(row, &col("taxable_income"))?,
        tax_class: row.try_get(col("tax_class").as_str()).map_err(db_err)?,
        income_related_expenses: get_decimal(row, &col("income_related_expenses"))?,
        special_expenses: get_decimal(row, &col("special_expenses"))?,
        extraordinary_expenses: get_decimal(row, &col("extraordinary_expenses"))?,
        child_allowance: get_decimal(row, &col("child_allowance"))?,
        assessed_income_tax: get_decimal(row, &col("assessed_income_tax"))?,
        assessed_surcharge: get_decimal(row, &col("assessed_surcharge"))?,
        paid_wage_tax: get_decimal(row, &col("paid_wage_tax"))?,
        paid_prepayment: get_decimal(row, &col("paid_prepayment"))?,
        paid_surcharge: get_decimal(row, &col("paid_surcharge"))?,
    })
}

fn row_to_household(row: &SqliteRow) -> Result<TaxHousehold, RepositoryError> {
    let mode: String = row.try_get("calculation_mode").map_err(db_err)?;
    let calculation_mode = CalculationMode::parse(&mode)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid calculation mode: {}", mode)))?;

    Ok(TaxHousehold {
        id: row.try_get("id").map_err(db_err)?,
        user_id: row.try_get("user_id").map_err(db_err)?,
        tax_year: row.try_get("tax_year").map_err(db_err)?,
        partner_a: row_to_partner(row, PartnerId::A)?,
        partner_b: row_to_partner(row, PartnerId::B)?,
        joint_data: JointTaxData {
            joint_taxable_income: get_decimal(row, "joint_taxable_income")?,
            joint_assessed_income_tax: get_decimal(row, "joint_assessed_income_tax")?,
            joint_assessed_surcharge: get_decimal(row, "joint_assessed_surcharge")?,
            calculation_mode,
        },
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {}", e)))?,
    })
}

#[async_trait]
impl TaxDataRepository for SqliteRepository {
    async fn get_household(
        &self,
        user_id: &str,
        tax_year: i32,
    ) -> Result<TaxHousehold, RepositoryError> {
        let row = sqlx::query("SELECT * FROM tax_household WHERE user_id = ? AND tax_year = ?")
            .bind(user_id)
            .bind(tax_year)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_household(&row)
    }

    async fn save_household(
        &self,
        household: NewTaxHousehold,
    ) -> Result<TaxHousehold, RepositoryError> {
        let now = Utc::now();

        let query = sqlx::query(UPSERT_HOUSEHOLD)
            .bind(household.user_id.clone())
            .bind(household.tax_year)
            .bind(household.joint_data.calculation_mode.as_str());
        let query = bind_partner(query, &household.partner_a);
        let query = bind_partner(query, &household.partner_b);
        query
            .bind(decimal_to_f64(household.joint_data.joint_taxable_income))
            .bind(decimal_to_f64(household.joint_data.joint_assessed_income_tax))
            .bind(decimal_to_f64(household.joint_data.joint_assessed_surcharge))
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        debug!(user_id = %household.user_id, tax_year = household.tax_year, "household saved");
        self.get_household(&household.user_id, household.tax_year)
            .await
    }

    async fn delete_household(
        &self,
        user_id: &str,
        tax_year: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tax_household WHERE user_id = ? AND tax_year = ?")
            .bind(user_id)
            .bind(tax_year)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_tax_years(&self, user_id: &str) -> Result<Vec<i32>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT tax_year FROM tax_household WHERE user_id = ? ORDER BY tax_year DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter()
            .map(|row| row.try_get("tax_year").map_err(db_err))
            .collect()
    }

    async fn list_households(
        &self,
        tax_year: Option<i32>,
    ) -> Result<Vec<TaxHousehold>, RepositoryError> {
        let rows = match tax_year {
            Some(year) => {
                sqlx::query("SELECT * FROM tax_household WHERE tax_year = ? ORDER BY user_id")
                    .bind(year)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query("SELECT * FROM tax_household ORDER BY tax_year DESC, user_id")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(db_err)?;

        rows.iter().map(row_to_household).collect()
    }
}
