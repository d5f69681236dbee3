pub mod debounce;

pub use debounce::{SearchDebouncer, SearchPolicy, SearchState, SearchSurface};
