//! `abp_filter_engine` parses Adblock Plus filter lists and answers two questions about them:
//! whether a network request is blocked or excepted, and which element hiding selectors apply to
//! a page.
//!
//! [`engine::Engine`] is the main entry point. The building blocks it combines, the
//! [`registry::FilterRegistry`], [`matcher::Matcher`], [`blocker::Blocker`] and
//! [`elemhide_index::ElemHideIndex`], are public as well for hosts that want to wire them up
//! differently.

pub mod blocker;
pub mod elemhide_index;
pub mod engine;
pub mod filters;
pub mod lists;
pub mod matcher;
pub mod registry;
pub mod request;
#[doc(hidden)]
pub mod utils;

#[doc(inline)]
pub use engine::Engine;
#[doc(inline)]
pub use filters::Filter;
#[doc(inline)]
pub use lists::ParseOptions;
#[doc(inline)]
pub use registry::FilterId;
#[doc(inline)]
pub use request::Request;
