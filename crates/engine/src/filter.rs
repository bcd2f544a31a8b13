//! Type-aware filter compilation.
//!
//! A [`FilterSpec`] is a flat list of `(field, operator, value)` triples
//! joined by a single logical connective. Compilation resolves each field
//! against the resource's field table, dispatches on the field's type and
//! produces one [`Condition`] ready to apply to a select. There is no
//! nested grouping: one connective per query.

use chrono::NaiveDate;
use sea_orm::Condition;
use sea_orm::sea_query::{Alias, Expr, LikeExpr, SimpleExpr};

use crate::{EngineError, MoneyCents, ResultEngine, tz};

/// Semantic type of a filterable field, with a closed operator set each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Bool,
    Number,
    Date,
}

impl FieldKind {
    /// The operators valid for this field type.
    pub fn operators(self) -> &'static [&'static str] {
        match self {
            Self::Text => &[
                "equals",
                "not_equals",
                "contains",
                "not_contains",
                "starts_with",
                "ends_with",
            ],
            Self::Bool => &["equals", "not_equals"],
            Self::Number => &["equals", "not_equals", "greater_than", "less_than"],
            Self::Date => &["equals", "not_equals", "before", "after"],
        }
    }
}

/// One filterable field of a resource: its wire name, the column it maps
/// to on the backing view and its semantic type.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
}

/// The top-level connective joining all filters of a spec.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Logical {
    #[default]
    And,
    Or,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SingleFilter {
    pub field: String,
    pub operator: String,
    pub value: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub logical: Logical,
    pub filters: Vec<SingleFilter>,
}

/// Compiles a filter spec into a store predicate.
///
/// Fails with [`EngineError::InvalidField`] when a filter references a
/// field outside `fields`, and with [`EngineError::InvalidOperator`] when
/// the operator is not in the field type's operator set.
pub fn compile(spec: &FilterSpec, fields: &[Field]) -> ResultEngine<Condition> {
    let mut condition = match spec.logical {
        Logical::And => Condition::all(),
        Logical::Or => Condition::any(),
    };

    for filter in &spec.filters {
        let field = fields
            .iter()
            .find(|field| field.name == filter.field)
            .ok_or_else(|| EngineError::InvalidField(filter.field.clone()))?;
        condition = condition.add(compile_single(filter, field)?);
    }

    Ok(condition)
}

fn compile_single(filter: &SingleFilter, field: &Field) -> ResultEngine<SimpleExpr> {
    let column = || Expr::col(Alias::new(field.column));
    let operator = filter.operator.as_str();
    let invalid_operator = || {
        EngineError::InvalidOperator(format!(
            "operation \"{operator}\" is not valid for field \"{name}\"",
            name = filter.field,
        ))
    };
    let value = || {
        filter.value.as_deref().ok_or_else(|| {
            EngineError::InvalidValue(format!(
                "operation \"{operator}\" on field \"{name}\" requires a value",
                name = filter.field,
            ))
        })
    };

    if !field.kind.operators().contains(&operator) {
        return Err(invalid_operator());
    }

    let expr = match field.kind {
        FieldKind::Text => {
            let value = value()?;
            match operator {
                "equals" => column().eq(value),
                "not_equals" => column().ne(value),
                "contains" => column().like(like_pattern("%", value, "%")),
                "not_contains" => column().not_like(like_pattern("%", value, "%")),
                "starts_with" => column().like(like_pattern("", value, "%")),
                "ends_with" => column().like(like_pattern("%", value, "")),
                _ => return Err(invalid_operator()),
            }
        }
        FieldKind::Bool => {
            let value = parse_bool(&filter.field, value()?)?;
            match operator {
                "equals" => column().eq(value),
                "not_equals" => column().ne(value),
                _ => return Err(invalid_operator()),
            }
        }
        FieldKind::Number => {
            // Decimal input, compared in minor units like every stored amount.
            let cents = value()?.parse::<MoneyCents>()?.cents();
            match operator {
                "equals" => column().eq(cents),
                "not_equals" => column().ne(cents),
                "greater_than" => column().gt(cents),
                "less_than" => column().lt(cents),
                _ => return Err(invalid_operator()),
            }
        }
        FieldKind::Date => {
            let date = parse_date(value()?)?;
            let range = tz::DateRange::single_day(date);
            match operator {
                "equals" => column().between(range.start, range.end),
                "not_equals" => column().not_between(range.start, range.end),
                "before" => column().lt(range.start),
                "after" => column().gt(range.end),
                _ => return Err(invalid_operator()),
            }
        }
    };

    Ok(expr)
}

fn parse_bool(field: &str, value: &str) -> ResultEngine<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(EngineError::InvalidValue(format!(
            "field \"{field}\" expects \"true\" or \"false\", got \"{other}\""
        ))),
    }
}

fn parse_date(value: &str) -> ResultEngine<NaiveDate> {
    value
        .parse::<NaiveDate>()
        .map_err(|_| EngineError::InvalidDate(value.to_string()))
}

/// Builds a LIKE pattern around `value`, escaping the wildcard characters
/// so user input matches literally.
pub(crate) fn like_pattern(prefix: &str, value: &str, suffix: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    LikeExpr::new(format!("{prefix}{escaped}{suffix}")).escape('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[Field] = &[
        Field {
            name: "name",
            column: "name",
            kind: FieldKind::Text,
        },
        Field {
            name: "paid",
            column: "paid",
            kind: FieldKind::Bool,
        },
        Field {
            name: "total",
            column: "total_minor",
            kind: FieldKind::Number,
        },
        Field {
            name: "purchasedAt",
            column: "purchased_at",
            kind: FieldKind::Date,
        },
    ];

    fn single(field: &str, operator: &str, value: Option<&str>) -> FilterSpec {
        FilterSpec {
            logical: Logical::And,
            filters: vec![SingleFilter {
                field: field.to_string(),
                operator: operator.to_string(),
                value: value.map(str::to_string),
            }],
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = compile(&single("bogus", "equals", Some("x")), FIELDS).unwrap_err();
        assert_eq!(err, EngineError::InvalidField("bogus".to_string()));
    }

    #[test]
    fn operator_must_match_field_type() {
        // `contains` belongs to text, not number.
        let err = compile(&single("total", "contains", Some("10")), FIELDS).unwrap_err();
        assert!(matches!(err, EngineError::InvalidOperator(_)));

        // `greater_than` belongs to number, not text.
        let err = compile(&single("name", "greater_than", Some("x")), FIELDS).unwrap_err();
        assert!(matches!(err, EngineError::InvalidOperator(_)));

        // `before` belongs to date, not bool.
        let err = compile(&single("paid", "before", Some("true")), FIELDS).unwrap_err();
        assert!(matches!(err, EngineError::InvalidOperator(_)));

        // An unknown operator is reported as such even without a value.
        let err = compile(&single("name", "between", None), FIELDS).unwrap_err();
        assert!(matches!(err, EngineError::InvalidOperator(_)));
    }

    #[test]
    fn every_tabled_pair_compiles() {
        let cases = [
            ("name", "equals", "Ana"),
            ("name", "not_equals", "Ana"),
            ("name", "contains", "na"),
            ("name", "not_contains", "na"),
            ("name", "starts_with", "A"),
            ("name", "ends_with", "a"),
            ("paid", "equals", "true"),
            ("paid", "not_equals", "false"),
            ("total", "equals", "10.50"),
            ("total", "not_equals", "10.50"),
            ("total", "greater_than", "10"),
            ("total", "less_than", "10"),
            ("purchasedAt", "equals", "2024-03-10"),
            ("purchasedAt", "not_equals", "2024-03-10"),
            ("purchasedAt", "before", "2024-03-10"),
            ("purchasedAt", "after", "2024-03-10"),
        ];
        for (field, operator, value) in cases {
            assert!(
                compile(&single(field, operator, Some(value)), FIELDS).is_ok(),
                "{field}/{operator} should compile"
            );
        }
    }

    #[test]
    fn missing_value_is_rejected() {
        let err = compile(&single("name", "equals", None), FIELDS).unwrap_err();
        assert!(matches!(err, EngineError::InvalidValue(_)));
    }

    #[test]
    fn bad_typed_values_are_rejected() {
        let err = compile(&single("paid", "equals", Some("yes")), FIELDS).unwrap_err();
        assert!(matches!(err, EngineError::InvalidValue(_)));

        let err = compile(&single("total", "equals", Some("abc")), FIELDS).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));

        let err = compile(&single("purchasedAt", "equals", Some("10/03/2024")), FIELDS)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidDate(_)));
    }

    #[test]
    fn empty_spec_compiles_to_neutral_condition() {
        let spec = FilterSpec::default();
        assert!(compile(&spec, FIELDS).is_ok());
    }
}
