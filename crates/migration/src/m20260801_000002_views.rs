//! Reporting views for the list endpoints.
//!
//! The table lists filter and sort on computed columns (`debt`, `status`,
//! `item_count`), so the read side goes through SQL views that join the
//! base tables and expose those columns directly.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const CUSTOMER_STATS: &str = "\
CREATE VIEW customer_stats AS
SELECT
  c.id AS id,
  c.name AS name,
  c.phone AS phone,
  COALESCE((SELECT SUM(s.total_minor) FROM sales s WHERE s.customer_id = c.id), 0)
    AS total_spent,
  COALESCE((SELECT SUM(s.total_minor) FROM sales s WHERE s.customer_id = c.id), 0)
    - COALESCE((SELECT SUM(le.value_minor)
                FROM ledger_entries le
                JOIN sales s ON le.sale_id = s.id
                WHERE s.customer_id = c.id AND le.flow = 'inflow'), 0)
    AS debt,
  (SELECT MAX(s.purchased_at) FROM sales s WHERE s.customer_id = c.id)
    AS last_purchase_at,
  c.created_at AS created_at
FROM customers c";

const SALE_STATS: &str = "\
CREATE VIEW sale_stats AS
SELECT
  s.id AS id,
  s.customer_id AS customer_id,
  cu.name AS customer_name,
  s.total_minor AS total_minor,
  s.profit_minor AS profit_minor,
  (SELECT COUNT(*) FROM sale_items si WHERE si.sale_id = s.id) AS item_count,
  CASE
    WHEN COALESCE((SELECT SUM(le.value_minor)
                   FROM ledger_entries le
                   WHERE le.sale_id = s.id AND le.flow = 'inflow'), 0) = s.total_minor
    THEN 'paid'
    ELSE 'pending'
  END AS status,
  s.is_installment AS is_installment,
  s.purchased_at AS purchased_at,
  s.created_at AS created_at
FROM sales s
LEFT JOIN customers cu ON s.customer_id = cu.id";

const LEDGER_STATS: &str = "\
CREATE VIEW ledger_stats AS
SELECT
  le.id AS id,
  le.sale_id AS sale_id,
  le.flow AS flow,
  le.date AS date,
  le.description AS description,
  le.category AS category,
  le.value_minor AS value_minor,
  le.created_at AS created_at
FROM ledger_entries le";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute_unprepared(CUSTOMER_STATS).await?;
        conn.execute_unprepared(SALE_STATS).await?;
        conn.execute_unprepared(LEDGER_STATS).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute_unprepared("DROP VIEW IF EXISTS ledger_stats").await?;
        conn.execute_unprepared("DROP VIEW IF EXISTS sale_stats").await?;
        conn.execute_unprepared("DROP VIEW IF EXISTS customer_stats").await?;
        Ok(())
    }
}
