//! Readers for scene descriptions.

pub mod scene_xml;

pub use scene_xml::{ParseError, ParseResult, parse_str};
