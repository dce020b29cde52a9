//! Transformer trait for data transformation

use crate::error::Result;

/// Transformer trait for cleaning and enriching extracted data
///
/// Implementors typically:
/// - drop incomplete rows
/// - apply row filters
/// - add derived values
///
/// # Example
/// ```
/// use tabular_etl::etl::Transformer;
/// use tabular_etl::error::Result;
///
/// struct Positive;
///
/// impl Transformer for Positive {
///     type Input = Vec<i32>;
///     type Output = Vec<i32>;
///
///     fn transform(&self, input: Self::Input) -> Result<Self::Output> {
///         Ok(input.into_iter().filter(|v| *v > 0).collect())
///     }
/// }
///
/// assert_eq!(Positive.transform(vec![-1, 2, 0, 3]).unwrap(), vec![2, 3]);
/// ```
pub trait Transformer {
    /// Input type
    type Input;

    /// Output type after transformation
    type Output;

    /// Transform the input
    ///
    /// # Errors
    /// Returns an error if the input does not have the expected shape
    fn transform(&self, input: Self::Input) -> Result<Self::Output>;
}
