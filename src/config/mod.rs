mod r#impl;
mod structs;

pub use r#impl::ALLOWED_PAGE_SIZES;
pub use structs::*;
