pub mod query;
pub mod quote;

pub use query::{
    rank_for_display, QueryKey, SearchMode, SearchRequest, EMPTY_INPUT_HINT, NO_RESULTS_MESSAGE,
};
pub use quote::{Coords, Quote, QuoteId};
