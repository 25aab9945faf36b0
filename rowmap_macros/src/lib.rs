mod mapped;

pub(crate) mod utils;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Describes a destination type to rowmap, replacing runtime reflection over its members.
///
/// On a struct with named fields it implements `rowmap::shape::Member` and
/// `rowmap::shape::Mapped`: every field is a writable member, assembled from the record fields
/// under its path. On a unit-only enum it implements `Member` and `rowmap::record::FromValue`,
/// reading variants from integer discriminants or variant names.
///
/// # Example
///
/// ```no_rust
/// use rowmap::Mapped;
///
/// #[derive(Debug, Default, Mapped)]
/// #[mapped(rename_all = "PascalCase")]
/// pub struct Order {
///     pub id: i64,
///     pub placed: chrono::NaiveDateTime,
///     pub customer: Option<Customer>,
///     #[mapped(skip)]
///     pub dirty: bool,
/// }
/// ```
#[proc_macro_derive(Mapped, attributes(mapped))]
pub fn rowmap_mapped(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let result = mapped::handle(ast);
    match result {
        Ok(codegen) => codegen.into(),
        Err(e) => e.to_compile_error().into(),
    }
}
