//! Path filtering by segment prefix.
//!
//! A filter such as `c/c2.txt` selects the file itself, every ancestor on the
//! way to it (`c`), and, when it names a directory, everything below it.
//! Comparison is done segment by segment with full equality; `c/c` never
//! matches `c/c2.txt`.

use std::path::MAIN_SEPARATOR;

/// Prepared inclusion filters.
///
/// An empty spec matches every path.
///
/// # Examples
///
/// ```
/// use filearc_core::FilterSpec;
///
/// let spec = FilterSpec::new(["c/c2.txt"]);
/// assert!(spec.matches("c"));
/// assert!(spec.matches("c/c2.txt"));
/// assert!(!spec.matches("c/c1.txt"));
/// assert!(!spec.matches("a.txt"));
///
/// assert!(FilterSpec::default().matches("anything/at/all"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    filters: Vec<Vec<String>>,
}

impl FilterSpec {
    /// Splits each filter string into path segments.
    ///
    /// Empty and `.` segments are dropped, so `c/`, `./c` and `c` are the
    /// same filter. Filters with no segments left are ignored.
    pub fn new<I, S>(filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let filters = filters
            .into_iter()
            .map(|filter| {
                split_segments(filter.as_ref())
                    .into_iter()
                    .map(str::to_owned)
                    .collect::<Vec<_>>()
            })
            .filter(|segments| !segments.is_empty())
            .collect();

        Self { filters }
    }

    /// Returns `true` if no filters are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns the number of prepared filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Decides whether a relative path is selected by any filter.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        if self.filters.is_empty() {
            return true;
        }

        let segments = split_segments(path);

        self.filters.iter().any(|filter| {
            segments
                .iter()
                .zip(filter.iter())
                .all(|(segment, expected)| *segment == expected.as_str())
        })
    }
}

/// Splits on `/` and on the platform separator, dropping empty and `.` parts.
fn split_segments(path: &str) -> Vec<&str> {
    path.split(|c| c == '/' || c == MAIN_SEPARATOR)
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect()
}
