//! Tolerant reads of engine-reported navigation state.
//!
//! Engines report `current_page`/`page_count` either as top-level fields or
//! nested under a `target` indirection, and the values may be absent or NaN
//! mid-flight. All of that ambiguity is normalized here; the rest of the
//! controller only ever sees a [`PageInfo`].

/// Raw navigation state as one engine reports it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineReading {
    pub current_page: Option<f64>,
    pub page_count: Option<f64>,
    /// Secondary reporting shape used by some engines.
    pub target: Option<Box<EngineReading>>,
}

impl EngineReading {
    /// Reading with top-level fields.
    #[must_use]
    pub fn direct(current_page: Option<f64>, page_count: Option<f64>) -> Self {
        Self {
            current_page,
            page_count,
            target: None,
        }
    }

    /// Reading with everything behind the `target` indirection.
    #[must_use]
    pub fn nested(current_page: Option<f64>, page_count: Option<f64>) -> Self {
        Self {
            current_page: None,
            page_count: None,
            target: Some(Box::new(Self::direct(current_page, page_count))),
        }
    }
}

/// Normalized page numbers. `None` means the engine has not reported a
/// usable value yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// 1-based current page.
    pub page: Option<u32>,
    /// Total page count.
    pub total: Option<u32>,
}

/// Extract page numbers from a reading, preferring direct fields over the
/// nested `target` form. NaN, infinite, or out-of-range values are treated
/// as "not reported".
#[must_use]
pub fn read_page_info(reading: &EngineReading) -> PageInfo {
    let nested = reading.target.as_deref();

    let page = usable(reading.current_page)
        .or_else(|| nested.and_then(|t| usable(t.current_page)));
    let total = usable(reading.page_count)
        .or_else(|| nested.and_then(|t| usable(t.page_count)));

    PageInfo {
        page: page.and_then(to_page_number),
        total: total.and_then(to_page_number),
    }
}

fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn to_page_number(value: f64) -> Option<u32> {
    if (1.0..=f64::from(u32::MAX)).contains(&value) {
        Some(value as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_fields_win_over_nested() {
        let reading = EngineReading {
            current_page: Some(3.0),
            page_count: Some(12.0),
            target: Some(Box::new(EngineReading::direct(Some(7.0), Some(99.0)))),
        };

        let info = read_page_info(&reading);
        assert_eq!(info.page, Some(3));
        assert_eq!(info.total, Some(12));
    }

    #[test]
    fn falls_back_to_nested_per_field() {
        // page only present nested, count only present directly
        let reading = EngineReading {
            current_page: None,
            page_count: Some(10.0),
            target: Some(Box::new(EngineReading::direct(Some(4.0), None))),
        };

        let info = read_page_info(&reading);
        assert_eq!(info.page, Some(4));
        assert_eq!(info.total, Some(10));
    }

    #[test]
    fn nan_direct_value_falls_back_to_nested() {
        let reading = EngineReading {
            current_page: Some(f64::NAN),
            page_count: None,
            target: Some(Box::new(EngineReading::direct(Some(2.0), Some(8.0)))),
        };

        let info = read_page_info(&reading);
        assert_eq!(info.page, Some(2));
        assert_eq!(info.total, Some(8));
    }

    #[test]
    fn unusable_values_read_as_unknown() {
        for bad in [f64::NAN, f64::INFINITY, 0.0, -3.0] {
            let info = read_page_info(&EngineReading::direct(Some(bad), Some(bad)));
            assert_eq!(info, PageInfo::default(), "value {bad} should be ignored");
        }

        assert_eq!(
            read_page_info(&EngineReading::default()),
            PageInfo::default()
        );
    }

    #[test]
    fn fractional_pages_truncate() {
        let info = read_page_info(&EngineReading::direct(Some(2.9), Some(10.0)));
        assert_eq!(info.page, Some(2));
    }
}
