//! Loader trait for persisting data to a destination

use crate::error::Result;

/// Loader trait for loading data to a destination
///
/// Implementors must be all-or-nothing: when `load` returns an error,
/// nothing from this call is visible in the destination.
///
/// # Example
/// ```no_run
/// use tabular_etl::etl::Loader;
/// use tabular_etl::error::Result;
///
/// struct CountingLoader;
///
/// impl Loader for CountingLoader {
///     type Item = Vec<String>;
///
///     fn load(&self, items: Self::Item) -> Result<usize> {
///         Ok(items.len())
///     }
/// }
/// ```
pub trait Loader {
    /// The type of data to load
    type Item;

    /// Load data to the destination
    ///
    /// Returns the number of records persisted
    ///
    /// # Errors
    /// Returns an error if any record could not be persisted
    fn load(&self, items: Self::Item) -> Result<usize>;
}
