use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    AccountingMethod, Cards, Engine, Flow, InstallmentNew, LedgerEntryNew, ModelNew, Period,
    SaleItemNew, SaleNew, tz,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build();
    (engine, db)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn noon(day: NaiveDate) -> DateTime<Utc> {
    tz::day_start(day) + chrono::Duration::hours(12)
}

struct Catalog {
    vestido: Uuid,
    blusa: Uuid,
    calca: Uuid,
}

async fn seed_catalog(engine: &Engine) -> Catalog {
    let vestidos = engine
        .create_category(
            "Vestidos",
            vec![ModelNew {
                name: "Vestido Longo".to_string(),
                cost_price_minor: None,
                sale_price_minor: None,
            }],
        )
        .await
        .unwrap();
    let blusas = engine
        .create_category(
            "Blusas",
            vec![ModelNew {
                name: "Blusa Basica".to_string(),
                cost_price_minor: None,
                sale_price_minor: None,
            }],
        )
        .await
        .unwrap();
    let calcas = engine
        .create_category(
            "Calças",
            vec![ModelNew {
                name: "Calça Reta".to_string(),
                cost_price_minor: None,
                sale_price_minor: None,
            }],
        )
        .await
        .unwrap();

    Catalog {
        vestido: vestidos.models[0].id,
        blusa: blusas.models[0].id,
        calca: calcas.models[0].id,
    }
}

fn item(model_id: Uuid, sale_price_minor: i64, cost_price_minor: i64) -> SaleItemNew {
    SaleItemNew {
        model_id,
        size: "M".to_string(),
        color: "preto".to_string(),
        print: "liso".to_string(),
        cost_price_minor,
        sale_price_minor,
    }
}

fn manual(flow: Flow, day: NaiveDate, category: &str, value_minor: i64) -> LedgerEntryNew {
    LedgerEntryNew {
        flow,
        date: day,
        description: format!("{category} {day}"),
        category: category.to_string(),
        value_minor,
    }
}

/// Seeds the fixture used across the reporting tests.
///
/// Week under test: Sunday 2024-03-10 .. Saturday 2024-03-16.
/// - Cash sale on Tue 12: Vestido 100.00/60.00 + Blusa 50.00/25.00.
/// - Installment sale on Thu 14: Vestido 200.00/120.00 + Calça 70.00/40.00,
///   first installment of 50.00 paid the same day.
/// - Rent outflow 30.00 on Tue 12, other income 10.00 on Wed 13.
/// - An unrecognized-category outflow of 9.99 on Tue 12 (cash-only noise).
/// - An inflow of 20.00 dated Mar 1, before the window (balance carry-over).
async fn seed_reporting_fixture(engine: &Engine) {
    let catalog = seed_catalog(engine).await;

    let ana = engine
        .create_customer("Ana Souza", Some("11 99999-0001"), None)
        .await
        .unwrap();

    engine
        .create_sale(SaleNew {
            customer_id: Some(ana.id),
            purchased_at: date(2024, 3, 12),
            items: vec![
                item(catalog.vestido, 100_00, 60_00),
                item(catalog.blusa, 50_00, 25_00),
            ],
            installment: None,
        })
        .await
        .unwrap();

    engine
        .create_sale(SaleNew {
            customer_id: None,
            purchased_at: date(2024, 3, 14),
            items: vec![
                item(catalog.vestido, 200_00, 120_00),
                item(catalog.calca, 70_00, 40_00),
            ],
            installment: Some(InstallmentNew {
                value_minor: 50_00,
                paid_at: date(2024, 3, 14),
            }),
        })
        .await
        .unwrap();

    engine
        .create_ledger_entry(manual(
            Flow::Outflow,
            date(2024, 3, 12),
            "OPERATIONAL_EXPENSE",
            30_00,
        ))
        .await
        .unwrap();
    engine
        .create_ledger_entry(manual(Flow::Inflow, date(2024, 3, 13), "OTHER_INCOME", 10_00))
        .await
        .unwrap();
    engine
        .create_ledger_entry(manual(Flow::Outflow, date(2024, 3, 12), "misc", 9_99))
        .await
        .unwrap();
    engine
        .create_ledger_entry(manual(
            Flow::Inflow,
            date(2024, 3, 1),
            "SALES_REVENUE",
            20_00,
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn week_chart_on_cash_basis_tracks_money_movement() {
    let (engine, _db) = engine_with_db().await;
    seed_reporting_fixture(&engine).await;

    let chart = engine
        .chart_data(
            Period::Week,
            AccountingMethod::CashBasis,
            noon(date(2024, 3, 15)),
        )
        .await
        .unwrap();

    let labels: Vec<&str> = chart.iter().map(|point| point.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["Domingo", "Segunda", "Terça", "Quarta", "Quinta", "Sexta", "Sábado"]
    );

    // Tue 12: full cash sale inflow; rent + unrecognized outflow.
    assert_eq!(chart[2].col_1, 150_00);
    assert_eq!(chart[2].col_2, 39_99);
    // Wed 13: manual income only.
    assert_eq!(chart[3].col_1, 10_00);
    assert_eq!(chart[3].col_2, 0);
    // Thu 14: only the first installment moved, not the sale total.
    assert_eq!(chart[4].col_1, 50_00);
    assert_eq!(chart[4].col_2, 0);
    // Quiet days stay zero.
    assert_eq!(chart[0].col_1, 0);
    assert_eq!(chart[6].col_2, 0);
}

#[tokio::test]
async fn week_chart_on_accrual_basis_recognizes_sales_at_purchase() {
    let (engine, _db) = engine_with_db().await;
    seed_reporting_fixture(&engine).await;

    let chart = engine
        .chart_data(
            Period::Week,
            AccountingMethod::AccrualBasis,
            noon(date(2024, 3, 15)),
        )
        .await
        .unwrap();

    // Tue 12: sale total + no manual revenue; item costs + rent. The
    // unrecognized-category outflow is excluded.
    assert_eq!(chart[2].col_1, 150_00);
    assert_eq!(chart[2].col_2, 85_00 + 30_00);
    // Wed 13: manual revenue only.
    assert_eq!(chart[3].col_1, 10_00);
    assert_eq!(chart[3].col_2, 0);
    // Thu 14: the whole sale is recognized although only 50.00 was paid.
    assert_eq!(chart[4].col_1, 270_00);
    assert_eq!(chart[4].col_2, 160_00);
}

#[tokio::test]
async fn accrual_cards_summarize_the_window() {
    let (engine, _db) = engine_with_db().await;
    seed_reporting_fixture(&engine).await;

    let window = tz::DateRange::days(date(2024, 3, 10), date(2024, 3, 16));
    let cards = engine
        .card_metrics(window, AccountingMethod::AccrualBasis)
        .await
        .unwrap();

    let Cards::Accrual(cards) = cards else {
        panic!("expected accrual cards");
    };
    assert_eq!(cards.sale_count, 2);
    // 150.00 + 270.00 sale totals + 10.00 manual revenue.
    assert_eq!(cards.invoicing, 430_00);
    assert_eq!(cards.avg_ticket, 215_00);
    // invoicing - item costs (85.00 + 160.00).
    assert_eq!(cards.gross_profit, 185_00);
    // minus recognized expenses (rent only; `misc` is not recognized).
    assert_eq!(cards.net_profit, 155_00);
}

#[tokio::test]
async fn cash_cards_scope_to_window_except_the_running_balance() {
    let (engine, _db) = engine_with_db().await;
    seed_reporting_fixture(&engine).await;

    let window = tz::DateRange::days(date(2024, 3, 10), date(2024, 3, 16));
    let cards = engine
        .card_metrics(window, AccountingMethod::CashBasis)
        .await
        .unwrap();

    let Cards::Cash(cards) = cards else {
        panic!("expected cash cards");
    };
    // Sales-revenue entries inside the window: 150.00 + 50.00. The Mar 1
    // entry is outside and does not count as receipt.
    assert_eq!(cards.receipt, 200_00);
    assert_eq!(cards.inflow, 210_00);
    assert_eq!(cards.outflow, 39_99);
    assert_eq!(cards.period_result, 170_01);
    // The balance is cumulative: it sees the Mar 1 inflow too.
    assert_eq!(cards.balance, 230_00 - 39_99);
}

#[tokio::test]
async fn top_categories_rank_by_count_with_alphabetical_ties() {
    let (engine, _db) = engine_with_db().await;
    seed_reporting_fixture(&engine).await;

    let window = tz::DateRange::days(date(2024, 3, 10), date(2024, 3, 16));
    let top = engine.top_categories(window, 5).await.unwrap();

    let ranked: Vec<(&str, i64)> = top
        .iter()
        .map(|entry| (entry.category.as_str(), entry.count))
        .collect();
    // Vestidos sold twice; Blusas and Calças tie at one and order
    // alphabetically.
    assert_eq!(
        ranked,
        vec![("Vestidos", 2), ("Blusas", 1), ("Calças", 1)]
    );
}

#[tokio::test]
async fn today_report_has_cards_but_an_empty_chart() {
    let (engine, _db) = engine_with_db().await;
    seed_reporting_fixture(&engine).await;

    let report = engine
        .stats(
            Period::Today,
            AccountingMethod::CashBasis,
            date(2024, 3, 12),
            date(2024, 3, 12),
            noon(date(2024, 3, 12)),
        )
        .await
        .unwrap();

    assert!(report.metrics_chart.is_empty());
    let Cards::Cash(cards) = report.cards else {
        panic!("expected cash cards");
    };
    assert_eq!(cards.inflow, 150_00);
    assert_eq!(cards.outflow, 39_99);
}

#[tokio::test]
async fn year_chart_buckets_by_calendar_month() {
    let (engine, _db) = engine_with_db().await;
    seed_reporting_fixture(&engine).await;

    let chart = engine
        .chart_data(
            Period::Year,
            AccountingMethod::CashBasis,
            noon(date(2024, 7, 1)),
        )
        .await
        .unwrap();

    assert_eq!(chart.len(), 12);
    // Everything seeded lives in March.
    assert_eq!(chart[2].label, "Março");
    assert_eq!(chart[2].col_1, 230_00);
    assert_eq!(chart[2].col_2, 39_99);
    assert_eq!(chart[0].col_1, 0);
    assert_eq!(chart[11].col_1, 0);
}

#[tokio::test]
async fn installments_accumulate_against_their_sale() {
    let (engine, _db) = engine_with_db().await;
    let catalog = seed_catalog(&engine).await;

    let sale_id = engine
        .create_sale(SaleNew {
            customer_id: None,
            purchased_at: date(2024, 3, 14),
            items: vec![item(catalog.vestido, 200_00, 120_00)],
            installment: Some(InstallmentNew {
                value_minor: 50_00,
                paid_at: date(2024, 3, 14),
            }),
        })
        .await
        .unwrap();

    let overview = engine.sale_overview(sale_id).await.unwrap();
    assert_eq!(overview.status, "pending");
    assert_eq!(overview.total_received_minor, 50_00);
    // A quarter received, a quarter of the profit recognized.
    assert_eq!(overview.profit_received_minor, 20_00);

    // No ledger entry in the following week yet: its receipt is zero.
    let next_week = tz::DateRange::days(date(2024, 3, 17), date(2024, 3, 23));
    let Cards::Cash(before) = engine
        .card_metrics(next_week, AccountingMethod::CashBasis)
        .await
        .unwrap()
    else {
        panic!("expected cash cards");
    };
    assert_eq!(before.receipt, 0);

    engine
        .create_installment(
            sale_id,
            InstallmentNew {
                value_minor: 150_00,
                paid_at: date(2024, 3, 21),
            },
        )
        .await
        .unwrap();

    let overview = engine.sale_overview(sale_id).await.unwrap();
    assert_eq!(overview.status, "paid");
    assert_eq!(overview.total_received_minor, 200_00);

    let installments = engine.sale_installments(sale_id).await.unwrap();
    assert_eq!(installments.len(), 2);
    // Newest first.
    assert_eq!(installments[0].value_minor, 150_00);

    // The second installment lands in the cash receipt of its own week.
    let Cards::Cash(cards) = engine
        .card_metrics(next_week, AccountingMethod::CashBasis)
        .await
        .unwrap()
    else {
        panic!("expected cash cards");
    };
    assert_eq!(cards.receipt, 150_00);
}
