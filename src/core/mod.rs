// Mechanical core: selectors, paging, batching and errors
pub mod selector {
    pub use crate::selector::*;
}

pub mod paging {
    pub use crate::paging::*;
}

pub mod batch {
    pub use crate::batch::*;
}

pub mod errors {
    pub use crate::errors::*;
}
