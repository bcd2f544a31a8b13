//! Page-number pagination.

/// Result-set width: `Normal` for table pages, `Narrow` for
/// autocomplete-style constrained lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageMode {
    #[default]
    Normal,
    Narrow,
}

/// A computed limit/offset pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

/// Converts a 1-based page number into limit/offset.
///
/// Missing or non-positive pages are treated as page 1.
#[must_use]
pub fn compute(page: Option<i64>, mode: PageMode) -> Page {
    let limit = match mode {
        PageMode::Normal => 10,
        PageMode::Narrow => 5,
    };
    let page = page.filter(|p| *p >= 1).unwrap_or(1) as u64;

    Page {
        limit,
        offset: (page - 1) * limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_mode_pages_by_ten() {
        assert_eq!(
            compute(Some(3), PageMode::Normal),
            Page {
                limit: 10,
                offset: 20
            }
        );
    }

    #[test]
    fn narrow_mode_pages_by_five() {
        assert_eq!(
            compute(Some(1), PageMode::Narrow),
            Page {
                limit: 5,
                offset: 0
            }
        );
        assert_eq!(
            compute(Some(2), PageMode::Narrow),
            Page {
                limit: 5,
                offset: 5
            }
        );
    }

    #[test]
    fn missing_or_non_positive_page_is_page_one() {
        assert_eq!(compute(None, PageMode::Normal).offset, 0);
        assert_eq!(compute(Some(0), PageMode::Normal).offset, 0);
        assert_eq!(compute(Some(-4), PageMode::Normal).offset, 0);
    }
}
