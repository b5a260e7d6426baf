//! Multi-select filters over a live option universe.

use std::fmt;
use std::rc::Rc;

use im::OrdSet;
use longhaul_foundation::Value;

use crate::predicate::Predicate;
use crate::text::TextPredicate;

/// A presentation-side consumer of a filter's options.
///
/// The adapter is called synchronously with the new universe and the
/// surviving selection, after the filter state has been committed. When the
/// filter lives in a [`crate::FilterRegistry`] the adapter runs once the
/// registry has released its filters, so it may read the registry.
pub trait OptionsAdapter {
    /// The option universe changed.
    fn options_changed(&self, options: &OrdSet<Value>, selected: &OrdSet<Value>);
}

/// A committed universe replacement whose adapter has not been told yet.
///
/// Returned by [`MultiSelectFilter::replace_options`] so the owner can
/// release any borrow on the filter before the adapter runs.
#[must_use = "the bound adapter is only informed by `notify`"]
pub struct OptionsUpdate {
    changed: bool,
    adapter: Option<Rc<dyn OptionsAdapter>>,
    options: OrdSet<Value>,
    selected: OrdSet<Value>,
}

impl OptionsUpdate {
    /// Returns true if the universe changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Informs the bound adapter, if any, and returns whether the universe changed.
    pub fn notify(self) -> bool {
        if let Some(adapter) = &self.adapter {
            adapter.options_changed(&self.options, &self.selected);
        }
        self.changed
    }
}

impl fmt::Debug for OptionsUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsUpdate")
            .field("changed", &self.changed)
            .field("adapter", &self.adapter.is_some())
            .field("options", &self.options.len())
            .finish_non_exhaustive()
    }
}

/// A set of selected options drawn from a universe of observed values.
///
/// The selection is always a subset of the universe. An empty selection
/// constrains nothing.
#[derive(Clone)]
pub struct MultiSelectFilter {
    name: String,
    universe: OrdSet<Value>,
    selected: OrdSet<Value>,
    adapter: Option<Rc<dyn OptionsAdapter>>,
}

impl MultiSelectFilter {
    /// Creates a filter with nothing selected.
    #[must_use]
    pub fn new(name: impl Into<String>, universe: impl IntoIterator<Item = Value>) -> Self {
        Self {
            name: name.into(),
            universe: universe.into_iter().collect(),
            selected: OrdSet::new(),
            adapter: None,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces the universe, dropping selections no longer in it.
    ///
    /// The bound adapter, if any, is informed before this returns. Returns
    /// true if the universe changed.
    pub fn set_options(&mut self, universe: impl IntoIterator<Item = Value>) -> bool {
        self.replace_options(universe).notify()
    }

    /// Replaces the universe like [`MultiSelectFilter::set_options`] but
    /// leaves informing the adapter to the caller.
    pub fn replace_options(&mut self, universe: impl IntoIterator<Item = Value>) -> OptionsUpdate {
        let universe: OrdSet<Value> = universe.into_iter().collect();
        let changed = universe != self.universe;
        self.selected = self.selected.clone().intersection(universe.clone());
        self.universe = universe;
        OptionsUpdate {
            changed,
            adapter: self.adapter.clone(),
            options: self.universe.clone(),
            selected: self.selected.clone(),
        }
    }

    /// Selects an option. Options outside the universe are ignored.
    ///
    /// Returns true if the selection changed.
    pub fn select(&mut self, option: &Value) -> bool {
        if !self.universe.contains(option) || self.selected.contains(option) {
            return false;
        }
        self.selected.insert(option.clone());
        true
    }

    /// Deselects an option. Returns true if it was selected.
    pub fn deselect(&mut self, option: &Value) -> bool {
        self.selected.remove(option).is_some()
    }

    /// Replaces the selection, ignoring options outside the universe.
    ///
    /// Returns true if the selection changed.
    pub fn set_selected(&mut self, options: impl IntoIterator<Item = Value>) -> bool {
        let selected: OrdSet<Value> = options
            .into_iter()
            .filter(|o| self.universe.contains(o))
            .collect();
        let changed = selected != self.selected;
        self.selected = selected;
        changed
    }

    /// Deselects everything. Returns true if anything was selected.
    pub fn clear_selection(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected = OrdSet::new();
        changed
    }

    /// A copy of the current selection.
    #[must_use]
    pub fn selected(&self) -> OrdSet<Value> {
        self.selected.clone()
    }

    /// Returns true if the option is selected.
    #[must_use]
    pub fn is_selected(&self, option: &Value) -> bool {
        self.selected.contains(option)
    }

    /// A copy of the universe.
    #[must_use]
    pub fn options(&self) -> OrdSet<Value> {
        self.universe.clone()
    }

    /// Options whose display form matches `text`, in order.
    #[must_use]
    pub fn search(&self, text: &TextPredicate) -> Vec<Value> {
        self.universe
            .iter()
            .filter(|o| text.matches_value(o))
            .cloned()
            .collect()
    }

    /// Binds the presentation adapter, replacing any previous one.
    pub fn bind_adapter(&mut self, adapter: Rc<dyn OptionsAdapter>) {
        self.adapter = Some(adapter);
    }

    /// Unbinds the presentation adapter.
    pub fn unbind_adapter(&mut self) -> Option<Rc<dyn OptionsAdapter>> {
        self.adapter.take()
    }

    /// Returns the predicate for `column`, or `None` when nothing is selected.
    #[must_use]
    pub fn predicate(&self, column: &str) -> Option<Predicate> {
        (!self.selected.is_empty()).then(|| Predicate::OneOf {
            column: column.to_owned(),
            values: self.selected.clone(),
        })
    }
}

impl fmt::Debug for MultiSelectFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiSelectFilter")
            .field("name", &self.name)
            .field("universe", &self.universe.len())
            .field("selected", &self.selected)
            .field("adapter", &self.adapter.is_some())
            .finish()
    }
}
