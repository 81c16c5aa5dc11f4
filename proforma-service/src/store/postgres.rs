//! Postgres store backend.

use std::time::Duration;

use async_trait::async_trait;
use proforma_core::error::AppError;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{
    Article, ArticleForm, Client, ClientForm, CompanySettings, Discount, LineItem, NewProforma,
    Proforma, SettingsForm,
};
use crate::services::metrics::DB_QUERY_DURATION;

use super::Store;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

/// Row shape of `proforma_items`; the discount columns fold into the
/// [`Discount`] variant on the way out.
#[derive(FromRow)]
struct LineItemRow {
    designation: String,
    quantity: Decimal,
    unit_price: Decimal,
    discount_type: String,
    discount_value: Decimal,
    amount: Decimal,
}

impl From<LineItemRow> for LineItem {
    fn from(row: LineItemRow) -> Self {
        LineItem {
            designation: row.designation,
            quantity: row.quantity,
            unit_price: row.unit_price,
            discount: Discount::from_parts(&row.discount_type, row.discount_value),
            amount: row.amount,
        }
    }
}

impl PgStore {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "proforma-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_clients"])
            .start_timer();

        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, name, phone, email, address, created_utc FROM clients ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list clients: {}", e)))?;

        timer.observe_duration();
        Ok(clients)
    }

    #[instrument(skip(self), fields(client_id = %id))]
    async fn get_client(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_client"])
            .start_timer();

        let client = sqlx::query_as::<_, Client>(
            "SELECT id, name, phone, email, address, created_utc FROM clients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get client: {}", e)))?;

        timer.observe_duration();
        Ok(client)
    }

    #[instrument(skip(self, form))]
    async fn insert_client(&self, form: &ClientForm) -> Result<Client, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_client"])
            .start_timer();

        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (id, name, phone, email, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, phone, email, address, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&form.name)
        .bind(&form.phone)
        .bind(&form.email)
        .bind(&form.address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to insert client: {}", e)))?;

        timer.observe_duration();
        info!(client_id = %client.id, "Client created");
        Ok(client)
    }

    #[instrument(skip(self, form), fields(client_id = %id))]
    async fn update_client(
        &self,
        id: Uuid,
        form: &ClientForm,
    ) -> Result<Option<Client>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_client"])
            .start_timer();

        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = $2, phone = $3, email = $4, address = $5
            WHERE id = $1
            RETURNING id, name, phone, email, address, created_utc
            "#,
        )
        .bind(id)
        .bind(&form.name)
        .bind(&form.phone)
        .bind(&form.email)
        .bind(&form.address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update client: {}", e)))?;

        timer.observe_duration();
        Ok(client)
    }

    #[instrument(skip(self), fields(client_id = %id))]
    async fn delete_client(&self, id: Uuid) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_client"])
            .start_timer();

        // Proformas referencing the client keep their name snapshot; the
        // foreign key is ON DELETE SET NULL.
        sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete client: {}", e))
            })?;

        timer.observe_duration();
        Ok(())
    }

    async fn count_clients(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to count clients: {}", e))
            })?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn list_articles(&self) -> Result<Vec<Article>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_articles"])
            .start_timer();

        let articles = sqlx::query_as::<_, Article>(
            "SELECT id, designation, unit_price, created_utc FROM articles ORDER BY designation",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list articles: {}", e)))?;

        timer.observe_duration();
        Ok(articles)
    }

    #[instrument(skip(self, form))]
    async fn insert_article(&self, form: &ArticleForm) -> Result<Article, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_article"])
            .start_timer();

        let article = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (id, designation, unit_price)
            VALUES ($1, $2, $3)
            RETURNING id, designation, unit_price, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&form.designation)
        .bind(form.unit_price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to insert article: {}", e))
        })?;

        timer.observe_duration();
        info!(article_id = %article.id, "Article created");
        Ok(article)
    }

    #[instrument(skip(self, form), fields(article_id = %id))]
    async fn update_article(
        &self,
        id: Uuid,
        form: &ArticleForm,
    ) -> Result<Option<Article>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_article"])
            .start_timer();

        let article = sqlx::query_as::<_, Article>(
            r#"
            UPDATE articles
            SET designation = $2, unit_price = $3
            WHERE id = $1
            RETURNING id, designation, unit_price, created_utc
            "#,
        )
        .bind(id)
        .bind(&form.designation)
        .bind(form.unit_price)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update article: {}", e))
        })?;

        timer.observe_duration();
        Ok(article)
    }

    #[instrument(skip(self), fields(article_id = %id))]
    async fn delete_article(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete article: {}", e))
            })?;
        Ok(())
    }

    async fn count_articles(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to count articles: {}", e))
            })?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn list_proformas(&self) -> Result<Vec<Proforma>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_proformas"])
            .start_timer();

        let proformas = sqlx::query_as::<_, Proforma>(
            r#"
            SELECT id, invoice_number, client_id, client_name, date,
                   subtotal, tax_rate, tax_amount, total, payment_terms, created_utc
            FROM proformas
            ORDER BY date DESC, created_utc DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list proformas: {}", e))
        })?;

        timer.observe_duration();
        Ok(proformas)
    }

    #[instrument(skip(self), fields(proforma_id = %id))]
    async fn get_proforma(&self, id: Uuid) -> Result<Option<Proforma>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_proforma"])
            .start_timer();

        let proforma = sqlx::query_as::<_, Proforma>(
            r#"
            SELECT id, invoice_number, client_id, client_name, date,
                   subtotal, tax_rate, tax_amount, total, payment_terms, created_utc
            FROM proformas
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get proforma: {}", e)))?;

        timer.observe_duration();
        Ok(proforma)
    }

    #[instrument(skip(self))]
    async fn latest_invoice_number(&self) -> Result<Option<String>, AppError> {
        let number = sqlx::query_scalar::<_, String>(
            "SELECT invoice_number FROM proformas ORDER BY created_utc DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to read latest invoice number: {}", e))
        })?;
        Ok(number)
    }

    #[instrument(skip(self, new), fields(invoice_number = %new.invoice_number))]
    async fn insert_proforma(&self, new: &NewProforma) -> Result<Proforma, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_proforma"])
            .start_timer();

        let proforma = sqlx::query_as::<_, Proforma>(
            r#"
            INSERT INTO proformas (id, invoice_number, client_id, client_name, date,
                                   subtotal, tax_rate, tax_amount, total, payment_terms)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, invoice_number, client_id, client_name, date,
                      subtotal, tax_rate, tax_amount, total, payment_terms, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.invoice_number)
        .bind(new.client_id)
        .bind(&new.client_name)
        .bind(new.date)
        .bind(new.subtotal)
        .bind(new.tax_rate)
        .bind(new.tax_amount)
        .bind(new.total)
        .bind(&new.payment_terms)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to insert proforma: {}", e))
        })?;

        timer.observe_duration();
        info!(proforma_id = %proforma.id, "Proforma created");
        Ok(proforma)
    }

    #[instrument(skip(self, new), fields(proforma_id = %id))]
    async fn update_proforma(
        &self,
        id: Uuid,
        new: &NewProforma,
    ) -> Result<Option<Proforma>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_proforma"])
            .start_timer();

        let proforma = sqlx::query_as::<_, Proforma>(
            r#"
            UPDATE proformas
            SET invoice_number = $2, client_id = $3, client_name = $4, date = $5,
                subtotal = $6, tax_rate = $7, tax_amount = $8, total = $9, payment_terms = $10
            WHERE id = $1
            RETURNING id, invoice_number, client_id, client_name, date,
                      subtotal, tax_rate, tax_amount, total, payment_terms, created_utc
            "#,
        )
        .bind(id)
        .bind(&new.invoice_number)
        .bind(new.client_id)
        .bind(&new.client_name)
        .bind(new.date)
        .bind(new.subtotal)
        .bind(new.tax_rate)
        .bind(new.tax_amount)
        .bind(new.total)
        .bind(&new.payment_terms)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update proforma: {}", e))
        })?;

        timer.observe_duration();
        Ok(proforma)
    }

    #[instrument(skip(self), fields(proforma_id = %id))]
    async fn delete_proforma(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM proformas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete proforma: {}", e))
            })?;
        Ok(())
    }

    async fn count_proformas(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM proformas")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to count proformas: {}", e))
            })?;
        Ok(count)
    }

    async fn sum_proforma_totals(&self) -> Result<Decimal, AppError> {
        let sum = sqlx::query_scalar::<_, Option<Decimal>>("SELECT SUM(total) FROM proformas")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to sum proforma totals: {}", e))
            })?;
        Ok(sum.unwrap_or(Decimal::ZERO))
    }

    #[instrument(skip(self), fields(proforma_id = %proforma_id))]
    async fn list_items(&self, proforma_id: Uuid) -> Result<Vec<LineItem>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_items"])
            .start_timer();

        let rows = sqlx::query_as::<_, LineItemRow>(
            r#"
            SELECT designation, quantity, unit_price, discount_type, discount_value, amount
            FROM proforma_items
            WHERE proforma_id = $1
            ORDER BY position
            "#,
        )
        .bind(proforma_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list items: {}", e)))?;

        timer.observe_duration();
        Ok(rows.into_iter().map(LineItem::from).collect())
    }

    #[instrument(skip(self, items), fields(proforma_id = %proforma_id, count = items.len()))]
    async fn insert_items(&self, proforma_id: Uuid, items: &[LineItem]) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_items"])
            .start_timer();

        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO proforma_items
                    (id, proforma_id, position, designation, quantity, unit_price,
                     discount_type, discount_value, amount)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(proforma_id)
            .bind(position as i32)
            .bind(&item.designation)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.discount.as_str())
            .bind(item.discount.value())
            .bind(item.amount)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to insert line item: {}", e))
            })?;
        }

        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self), fields(proforma_id = %proforma_id))]
    async fn delete_items(&self, proforma_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM proforma_items WHERE proforma_id = $1")
            .bind(proforma_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete line items: {}", e))
            })?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_settings(&self) -> Result<Option<CompanySettings>, AppError> {
        let settings = sqlx::query_as::<_, CompanySettings>(
            r#"
            SELECT id, name, activity, phones, cip, cip_expiry, ifu, email, rccm,
                   manager_name, qr_code_url
            FROM company_settings
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get settings: {}", e)))?;
        Ok(settings)
    }

    #[instrument(skip(self, form))]
    async fn upsert_settings(&self, form: &SettingsForm) -> Result<CompanySettings, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["upsert_settings"])
            .start_timer();

        let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM company_settings LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to read settings: {}", e))
            })?;

        let settings = if let Some(id) = existing {
            sqlx::query_as::<_, CompanySettings>(
                r#"
                UPDATE company_settings
                SET name = $2, activity = $3, phones = $4, cip = $5, cip_expiry = $6,
                    ifu = $7, email = $8, rccm = $9, manager_name = $10, qr_code_url = $11
                WHERE id = $1
                RETURNING id, name, activity, phones, cip, cip_expiry, ifu, email, rccm,
                          manager_name, qr_code_url
                "#,
            )
            .bind(id)
            .bind(&form.name)
            .bind(&form.activity)
            .bind(&form.phones)
            .bind(&form.cip)
            .bind(form.cip_expiry)
            .bind(&form.ifu)
            .bind(&form.email)
            .bind(&form.rccm)
            .bind(&form.manager_name)
            .bind(&form.qr_code_url)
            .fetch_one(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, CompanySettings>(
                r#"
                INSERT INTO company_settings
                    (id, name, activity, phones, cip, cip_expiry, ifu, email, rccm,
                     manager_name, qr_code_url)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                RETURNING id, name, activity, phones, cip, cip_expiry, ifu, email, rccm,
                          manager_name, qr_code_url
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&form.name)
            .bind(&form.activity)
            .bind(&form.phones)
            .bind(&form.cip)
            .bind(form.cip_expiry)
            .bind(&form.ifu)
            .bind(&form.email)
            .bind(&form.rccm)
            .bind(&form.manager_name)
            .bind(&form.qr_code_url)
            .fetch_one(&self.pool)
            .await
        }
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to save settings: {}", e)))?;

        timer.observe_duration();
        info!(settings_id = %settings.id, "Company settings saved");
        Ok(settings)
    }
}
