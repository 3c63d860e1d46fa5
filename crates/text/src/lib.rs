//! Text analysis for the DDT response flow simulator
//!
//! Pure functions only: semantic kind inference from field labels, per-kind
//! validation of raw replies, and the heuristic decomposers that split one
//! utterance into date, name or address parts. Nothing here touches
//! conversation state.

pub mod address;
pub mod date;
pub mod kind;
pub mod name;
pub mod validate;

pub use address::{parse_address, AddressParts};
pub use date::{parse_date_parts, parse_day, parse_month, parse_year, DateParts};
pub use kind::Kind;
pub use name::{split_name, NameParts};
pub use validate::validate;
