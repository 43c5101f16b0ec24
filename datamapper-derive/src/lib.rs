//! Derive macro for the datamapper runtime
//!
//! Re-exported from the `datamapper` crate; depend on that instead.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod from_row;

/// Derive `datamapper::FromRow` for a struct with named fields.
///
/// Each field is read from the column of the same name.
///
/// # Attributes
///
/// - `#[datamapper(column = "Field")]` - read from a differently named column
/// - `#[datamapper(skip)]` - leave the field at its `Default`
///
/// ```ignore
/// use datamapper::FromRow;
///
/// #[derive(FromRow)]
/// pub struct Describe {
///     #[datamapper(column = "Field")]
///     pub field: String,
///     #[datamapper(column = "Type")]
///     pub column_type: String,
/// }
/// ```
#[proc_macro_derive(FromRow, attributes(datamapper))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
