//! Sort compilation against a per-resource whitelist.

use sea_orm::Order;

use crate::{EngineError, ResultEngine};

/// One sortable field of a resource: wire name and backing column.
#[derive(Clone, Copy, Debug)]
pub struct SortField {
    pub name: &'static str,
    pub column: &'static str,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub sort_by: Option<String>,
    pub sort_dir: Option<SortDir>,
}

/// A validated ordering directive ready to apply to a select.
#[derive(Clone, Debug)]
pub struct OrderDirective {
    pub column: &'static str,
    pub direction: Order,
}

/// Compiles a sort spec.
///
/// Returns `None` when no explicit sort was requested (the caller supplies
/// its own default, typically newest-first by creation time). Fails with
/// [`EngineError::InvalidSortField`] when `sort_by` is outside the
/// whitelist.
pub fn compile(spec: &SortSpec, whitelist: &[SortField]) -> ResultEngine<Option<OrderDirective>> {
    let Some(sort_by) = spec.sort_by.as_deref() else {
        return Ok(None);
    };

    let field = whitelist
        .iter()
        .find(|field| field.name == sort_by)
        .ok_or_else(|| EngineError::InvalidSortField(sort_by.to_string()))?;

    let direction = match spec.sort_dir.unwrap_or_default() {
        SortDir::Asc => Order::Asc,
        SortDir::Desc => Order::Desc,
    };

    Ok(Some(OrderDirective {
        column: field.column,
        direction,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITELIST: &[SortField] = &[
        SortField {
            name: "name",
            column: "name",
        },
        SortField {
            name: "purchasedAt",
            column: "purchased_at",
        },
    ];

    #[test]
    fn absent_sort_by_means_no_explicit_order() {
        let directive = compile(&SortSpec::default(), WHITELIST).unwrap();
        assert!(directive.is_none());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let spec = SortSpec {
            sort_by: Some("password".to_string()),
            sort_dir: None,
        };
        let err = compile(&spec, WHITELIST).unwrap_err();
        assert_eq!(err, EngineError::InvalidSortField("password".to_string()));
    }

    #[test]
    fn direction_defaults_to_ascending() {
        let spec = SortSpec {
            sort_by: Some("purchasedAt".to_string()),
            sort_dir: None,
        };
        let directive = compile(&spec, WHITELIST).unwrap().unwrap();
        assert_eq!(directive.column, "purchased_at");
        assert_eq!(directive.direction, Order::Asc);

        let spec = SortSpec {
            sort_by: Some("name".to_string()),
            sort_dir: Some(SortDir::Desc),
        };
        let directive = compile(&spec, WHITELIST).unwrap().unwrap();
        assert_eq!(directive.direction, Order::Desc);
    }
}
