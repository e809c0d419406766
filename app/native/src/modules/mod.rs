//! Feature modules.
//!
//! - [`ffm`] - Focus follows mouse

pub mod ffm;
