pub mod backend;
pub mod cache;
pub mod css_check;
pub mod dom_sheet;
pub mod serialize;
