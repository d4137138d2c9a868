pub mod cpp;
pub mod nil;
pub mod rust;
