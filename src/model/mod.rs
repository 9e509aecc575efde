//! Types that represent the core data model, such as `LedgerTable` and `Amount`.
mod amount;
mod category;
mod date;
mod ledger;
mod mapping;

pub use amount::{Amount, AmountError, AmountFormat};
pub use category::{LedgerKind, Vocabulary};
pub use date::{month_key, parse_date};
pub use ledger::{LedgerRow, LedgerTable, RowId};
pub use mapping::{Header, Mapping, MappingError};
