//! Small, parser-internal utilities that don't belong on any one public type.

pub mod input;
