use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Engine, EngineError, FilterSpec, Flow, LedgerEntryNew, ListQuery, Logical, PageMode,
    SingleFilter, SortDir, SortSpec, tz,
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

fn entry(flow: Flow, day: NaiveDate, description: &str, category: &str, value_minor: i64) -> LedgerEntryNew {
    LedgerEntryNew {
        flow,
        date: day,
        description: description.to_string(),
        category: category.to_string(),
        value_minor,
    }
}

fn filter_query(logical: Logical, filters: &[(&str, &str, &str)]) -> ListQuery {
    ListQuery {
        filter: FilterSpec {
            logical,
            filters: filters
                .iter()
                .map(|(field, operator, value)| SingleFilter {
                    field: field.to_string(),
                    operator: operator.to_string(),
                    value: Some(value.to_string()),
                })
                .collect(),
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn date_equals_matches_the_whole_local_day() {
    let (engine, db) = engine_with_db().await;

    engine
        .create_ledger_entry(entry(
            Flow::Outflow,
            date(2024, 3, 11),
            "dia 11",
            "OPERATIONAL_EXPENSE",
            1000,
        ))
        .await
        .unwrap();
    let midnight = engine
        .create_ledger_entry(entry(
            Flow::Outflow,
            date(2024, 3, 12),
            "dia 12 manha",
            "OPERATIONAL_EXPENSE",
            1000,
        ))
        .await
        .unwrap();
    let late = engine
        .create_ledger_entry(entry(
            Flow::Outflow,
            date(2024, 3, 12),
            "dia 12 noite",
            "OPERATIONAL_EXPENSE",
            1000,
        ))
        .await
        .unwrap();
    engine
        .create_ledger_entry(entry(
            Flow::Outflow,
            date(2024, 3, 13),
            "dia 13",
            "OPERATIONAL_EXPENSE",
            1000,
        ))
        .await
        .unwrap();

    // Push one entry deep into the evening of the 12th, local time, so the
    // stored timestamp carries a time of day.
    let backend = db.get_database_backend();
    let evening = tz::day_end(date(2024, 3, 12)) - chrono::Duration::minutes(29);
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE ledger_entries SET date = ? WHERE id = ?",
        vec![evening.into(), late.id.to_string().into()],
    ))
    .await
    .unwrap();

    let page = engine
        .list_ledger_entries(&filter_query(
            Logical::And,
            &[("date", "equals", "2024-03-12")],
        ))
        .await
        .unwrap();

    let mut ids: Vec<String> = page.rows.iter().map(|row| row.id.clone()).collect();
    ids.sort();
    let mut expected = vec![midnight.id.to_string(), late.id.to_string()];
    expected.sort();
    assert_eq!(page.row_count, 2);
    assert_eq!(ids, expected);

    // `before` is strictly before start of day, `after` strictly after its end.
    let before = engine
        .list_ledger_entries(&filter_query(
            Logical::And,
            &[("date", "before", "2024-03-12")],
        ))
        .await
        .unwrap();
    assert_eq!(before.row_count, 1);
    assert_eq!(before.rows[0].description, "dia 11");

    let after = engine
        .list_ledger_entries(&filter_query(
            Logical::And,
            &[("date", "after", "2024-03-12")],
        ))
        .await
        .unwrap();
    assert_eq!(after.row_count, 1);
    assert_eq!(after.rows[0].description, "dia 13");
}

#[tokio::test]
async fn number_filters_compare_in_minor_units() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_ledger_entry(entry(
            Flow::Inflow,
            date(2024, 3, 12),
            "pequena",
            "OTHER_INCOME",
            10_50,
        ))
        .await
        .unwrap();
    engine
        .create_ledger_entry(entry(
            Flow::Inflow,
            date(2024, 3, 12),
            "grande",
            "OTHER_INCOME",
            200_00,
        ))
        .await
        .unwrap();

    let equals = engine
        .list_ledger_entries(&filter_query(
            Logical::And,
            &[("value", "equals", "10.50")],
        ))
        .await
        .unwrap();
    assert_eq!(equals.row_count, 1);
    assert_eq!(equals.rows[0].description, "pequena");

    let above = engine
        .list_ledger_entries(&filter_query(
            Logical::And,
            &[("value", "greater_than", "15")],
        ))
        .await
        .unwrap();
    assert_eq!(above.row_count, 1);
    assert_eq!(above.rows[0].description, "grande");
}

#[tokio::test]
async fn or_connective_joins_sibling_filters() {
    let (engine, _db) = engine_with_db().await;

    for description in ["aluguel", "energia", "agua"] {
        engine
            .create_ledger_entry(entry(
                Flow::Outflow,
                date(2024, 3, 12),
                description,
                "OPERATIONAL_EXPENSE",
                1000,
            ))
            .await
            .unwrap();
    }

    let both = engine
        .list_ledger_entries(&filter_query(
            Logical::Or,
            &[
                ("description", "equals", "aluguel"),
                ("description", "equals", "energia"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(both.row_count, 2);

    // The same two filters under AND cannot match a single row.
    let none = engine
        .list_ledger_entries(&filter_query(
            Logical::And,
            &[
                ("description", "equals", "aluguel"),
                ("description", "equals", "energia"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(none.row_count, 0);
}

#[tokio::test]
async fn text_operators_match_as_named() {
    let (engine, _db) = engine_with_db().await;

    for description in ["Compra de Ana", "Compra de Bruna", "Aluguel"] {
        engine
            .create_ledger_entry(entry(
                Flow::Inflow,
                date(2024, 3, 12),
                description,
                "SALES_REVENUE",
                1000,
            ))
            .await
            .unwrap();
    }

    let contains = engine
        .list_ledger_entries(&filter_query(
            Logical::And,
            &[("description", "contains", "de")],
        ))
        .await
        .unwrap();
    assert_eq!(contains.row_count, 2);

    let starts = engine
        .list_ledger_entries(&filter_query(
            Logical::And,
            &[("description", "starts_with", "Compra")],
        ))
        .await
        .unwrap();
    assert_eq!(starts.row_count, 2);

    let ends = engine
        .list_ledger_entries(&filter_query(
            Logical::And,
            &[("description", "ends_with", "Ana")],
        ))
        .await
        .unwrap();
    assert_eq!(ends.row_count, 1);

    let not_contains = engine
        .list_ledger_entries(&filter_query(
            Logical::And,
            &[("description", "not_contains", "Compra")],
        ))
        .await
        .unwrap();
    assert_eq!(not_contains.row_count, 1);
    assert_eq!(not_contains.rows[0].description, "Aluguel");
}

#[tokio::test]
async fn bad_filters_are_rejected_with_named_errors() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .list_ledger_entries(&filter_query(
            Logical::And,
            &[("bogus", "equals", "x")],
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidField("bogus".to_string()));

    let err = engine
        .list_ledger_entries(&filter_query(
            Logical::And,
            &[("description", "greater_than", "x")],
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidOperator(_)));

    let query = ListQuery {
        sort: SortSpec {
            sort_by: Some("password".to_string()),
            sort_dir: None,
        },
        ..Default::default()
    };
    let err = engine.list_ledger_entries(&query).await.unwrap_err();
    assert_eq!(err, EngineError::InvalidSortField("password".to_string()));
}

#[tokio::test]
async fn pagination_envelope_counts_pages_by_selected_limit() {
    let (engine, _db) = engine_with_db().await;

    for index in 0..12 {
        engine
            .create_ledger_entry(entry(
                Flow::Outflow,
                date(2024, 3, 12),
                &format!("entrada {index}"),
                "OPERATIONAL_EXPENSE",
                100 * (index + 1),
            ))
            .await
            .unwrap();
    }

    let first = engine
        .list_ledger_entries(&ListQuery::default())
        .await
        .unwrap();
    assert_eq!(first.row_count, 12);
    assert_eq!(first.page_count, 2);
    assert_eq!(first.rows.len(), 10);

    let second = engine
        .list_ledger_entries(&ListQuery {
            page: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(second.rows.len(), 2);

    let narrow = engine
        .list_ledger_entries(&ListQuery {
            mode: PageMode::Narrow,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(narrow.rows.len(), 5);
    assert_eq!(narrow.page_count, 3);
}

#[tokio::test]
async fn explicit_sort_orders_rows() {
    let (engine, _db) = engine_with_db().await;

    for (description, value) in [("b", 300), ("a", 100), ("c", 200)] {
        engine
            .create_ledger_entry(entry(
                Flow::Inflow,
                date(2024, 3, 12),
                description,
                "OTHER_INCOME",
                value,
            ))
            .await
            .unwrap();
    }

    let ascending = engine
        .list_ledger_entries(&ListQuery {
            sort: SortSpec {
                sort_by: Some("value".to_string()),
                sort_dir: None,
            },
            ..Default::default()
        })
        .await
        .unwrap();
    let values: Vec<i64> = ascending.rows.iter().map(|row| row.value_minor).collect();
    assert_eq!(values, vec![100, 200, 300]);

    let descending = engine
        .list_ledger_entries(&ListQuery {
            sort: SortSpec {
                sort_by: Some("value".to_string()),
                sort_dir: Some(SortDir::Desc),
            },
            ..Default::default()
        })
        .await
        .unwrap();
    let values: Vec<i64> = descending.rows.iter().map(|row| row.value_minor).collect();
    assert_eq!(values, vec![300, 200, 100]);
}

#[tokio::test]
async fn search_matches_description_prefix() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_ledger_entry(entry(
            Flow::Outflow,
            date(2024, 3, 12),
            "Aluguel de marco",
            "OPERATIONAL_EXPENSE",
            3000,
        ))
        .await
        .unwrap();
    engine
        .create_ledger_entry(entry(
            Flow::Inflow,
            date(2024, 3, 12),
            "Compra de Ana",
            "SALES_REVENUE",
            1000,
        ))
        .await
        .unwrap();

    let page = engine
        .list_ledger_entries(&ListQuery {
            search: Some("Alu".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.row_count, 1);
    assert_eq!(page.rows[0].description, "Aluguel de marco");

    // The search is a prefix match, not a substring match.
    let page = engine
        .list_ledger_entries(&ListQuery {
            search: Some("Ana".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.row_count, 0);
}

#[tokio::test]
async fn customer_list_filters_against_the_view() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_customer("Ana Souza", Some("11 99999-0001"), None)
        .await
        .unwrap();
    engine
        .create_customer("Bruna Lima", Some("11 99999-0002"), None)
        .await
        .unwrap();

    let page = engine
        .list_customers(&filter_query(
            Logical::And,
            &[("name", "starts_with", "Ana")],
        ))
        .await
        .unwrap();
    assert_eq!(page.row_count, 1);
    assert_eq!(page.rows[0].name, "Ana Souza");

    // Fresh customers have no sales: zero spend, zero debt.
    assert_eq!(page.rows[0].total_spent, 0);
    assert_eq!(page.rows[0].debt, 0);
    assert!(page.rows[0].last_purchase_at.is_none());

    let narrow = engine.autocomplete_customers("Lim").await.unwrap();
    assert_eq!(narrow.len(), 1);
    assert_eq!(narrow[0].name, "Bruna Lima");
}
