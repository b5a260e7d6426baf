//! Page queries: sort, predicates, limit and offset.

use std::cmp::Ordering;
use std::fmt;

use longhaul_filter::Predicate;
use longhaul_foundation::{Error, Result, Value};
use longhaul_model::Record;

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl SortDirection {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// A column and direction to order by.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortOrder {
    /// Column name.
    pub column: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortOrder {
    /// Ascending order on `column`.
    #[must_use]
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Descending order on `column`.
    #[must_use]
    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Compares two column values. Nulls sort last in either direction.
    #[must_use]
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match self.direction {
                SortDirection::Ascending => a.cmp(b),
                SortDirection::Descending => b.cmp(a),
            },
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        write!(f, "{} {dir}", self.column)
    }
}

/// "Up to `limit` records, sorted, filtered, skipping the first `offset` matches."
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageQuery {
    /// Ordering; records fall back to identifier order.
    pub sort: Option<SortOrder>,
    /// Conditions every returned record meets.
    pub predicates: Vec<Predicate>,
    /// Maximum records returned.
    pub limit: usize,
    /// Matches skipped before the first returned record.
    pub offset: usize,
}

impl PageQuery {
    /// An unsorted, unfiltered page.
    #[must_use]
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            sort: None,
            predicates: Vec::new(),
            limit,
            offset,
        }
    }

    /// Sets the ordering.
    #[must_use]
    pub fn sorted_by(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets an optional ordering.
    #[must_use]
    pub fn with_sort(mut self, sort: Option<SortOrder>) -> Self {
        self.sort = sort;
        self
    }

    /// Adds conditions.
    #[must_use]
    pub fn with_predicates(mut self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        self.predicates.extend(predicates);
        self
    }

    /// Checks that every named column exists on `E`.
    ///
    /// # Errors
    ///
    /// Returns [`longhaul_foundation::ErrorKind::UnknownColumn`] for the first unknown column.
    pub fn check_columns<E: Record>(&self) -> Result<()> {
        self.check_columns_with::<E>(&[])
    }

    /// Checks that every named column exists on `E` or is one of `derived`.
    ///
    /// # Errors
    ///
    /// Returns [`longhaul_foundation::ErrorKind::UnknownColumn`] for the first unknown column.
    pub fn check_columns_with<E: Record>(&self, derived: &[&str]) -> Result<()> {
        for column in self.columns() {
            if !E::has_column(column) && !derived.contains(&column) {
                return Err(Error::unknown_column(E::KIND, column));
            }
        }
        Ok(())
    }

    /// Returns true if the sort or any predicate names `column`.
    #[must_use]
    pub fn touches(&self, column: &str) -> bool {
        self.columns().any(|c| c == column)
    }

    fn columns(&self) -> impl Iterator<Item = &str> {
        let sort = self.sort.iter().map(|s| s.column.as_str());
        sort.chain(self.predicates.iter().map(Predicate::column))
    }

    /// Returns true if `record` meets every predicate.
    #[must_use]
    pub fn accepts<E: Record>(&self, record: &E) -> bool {
        self.predicates
            .iter()
            .all(|p| p.matches(&record.value(p.column())))
    }

    /// Runs the query over a full record set.
    ///
    /// Ties in the sort column fall back to identifier order, so paging
    /// through a stable collection visits each record exactly once.
    ///
    /// # Errors
    ///
    /// Fails if a column is unknown.
    pub fn apply<'a, E: Record>(&self, records: impl IntoIterator<Item = &'a E>) -> Result<Vec<E>> {
        self.apply_with(records, &[], |record, column| record.value(column))
    }

    /// Runs the query, reading every column value through `value`.
    ///
    /// `derived` names the columns `value` computes beyond those `E`
    /// stores itself.
    ///
    /// # Errors
    ///
    /// Fails if a column is neither stored nor derived.
    pub fn apply_with<'a, E: Record>(
        &self,
        records: impl IntoIterator<Item = &'a E>,
        derived: &[&str],
        value: impl Fn(&E, &str) -> Value,
    ) -> Result<Vec<E>> {
        self.check_columns_with::<E>(derived)?;
        let mut matched: Vec<&E> = records
            .into_iter()
            .filter(|r| self.predicates.iter().all(|p| p.matches(&value(r, p.column()))))
            .collect();
        if let Some(sort) = &self.sort {
            matched.sort_by(|a, b| {
                sort.compare(&value(a, &sort.column), &value(b, &sort.column))
                    .then_with(|| a.id().cmp(&b.id()))
            });
        }
        Ok(matched
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .cloned()
            .collect())
    }
}
