//! Domain model of the course registration backend: identifiers, value types
//! and the rules that every storage or transport layer has to respect.

pub mod domain;
