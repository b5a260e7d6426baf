//! Catalog configuration.

use longhaul_filter::{DEFAULT_ROUTE_COUNT_DOMAIN, RangeDomain};
use longhaul_foundation::{Error, Result};

use crate::logging::LogConfig;

/// Settings for a [`crate::Catalog`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CatalogConfig {
    /// Rows per page for views opened without an explicit size.
    pub default_page_size: usize,
    /// Largest page a view may request.
    pub max_page_size: usize,
    /// Domain of the route price filter.
    pub price: RangeDomain,
    /// Domain of the route duration filter, in minutes.
    pub duration: RangeDomain,
    /// Domain of the airport route-count filter.
    pub route_count: RangeDomain,
    /// Logging options used by [`crate::init_tracing`].
    pub log: LogConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 1000,
            price: RangeDomain::new(0.0, 5000.0, 10.0),
            duration: RangeDomain::new(0.0, 50000.0, 100.0),
            route_count: DEFAULT_ROUTE_COUNT_DOMAIN,
            log: LogConfig::default(),
        }
    }
}

impl CatalogConfig {
    /// Small pages and quiet logging, for tests.
    #[must_use]
    pub fn testing() -> Self {
        Self {
            default_page_size: 5,
            max_page_size: 50,
            log: LogConfig::default().with_filter("warn"),
            ..Self::default()
        }
    }

    /// Sets the default page size.
    #[must_use]
    pub fn with_default_page_size(mut self, rows: usize) -> Self {
        self.default_page_size = rows;
        self
    }

    /// Sets the largest page size.
    #[must_use]
    pub fn with_max_page_size(mut self, rows: usize) -> Self {
        self.max_page_size = rows;
        self
    }

    /// Sets the price filter domain.
    #[must_use]
    pub fn with_price(mut self, domain: RangeDomain) -> Self {
        self.price = domain;
        self
    }

    /// Sets the duration filter domain.
    #[must_use]
    pub fn with_duration(mut self, domain: RangeDomain) -> Self {
        self.duration = domain;
        self
    }

    /// Sets the route-count filter domain.
    #[must_use]
    pub fn with_route_count(mut self, domain: RangeDomain) -> Self {
        self.route_count = domain;
        self
    }

    /// Sets the logging options.
    #[must_use]
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Checks page sizes and filter domains.
    ///
    /// # Errors
    ///
    /// Returns an invalid configuration error naming the first bad setting.
    pub fn validate(&self) -> Result<()> {
        if self.default_page_size == 0 {
            return Err(Error::invalid_config("default page size must be at least one"));
        }
        if self.default_page_size > self.max_page_size {
            return Err(Error::invalid_config(format!(
                "default page size {} exceeds maximum {}",
                self.default_page_size, self.max_page_size
            )));
        }
        for (name, domain) in [
            ("price", &self.price),
            ("duration", &self.duration),
            ("route count", &self.route_count),
        ] {
            domain
                .validate()
                .map_err(|err| Error::invalid_config(format!("{name} domain: {err}")))?;
        }
        Ok(())
    }
}
