pub mod models;
pub mod error;
pub mod config;
pub mod statistics;
pub mod parse_result;
pub mod parsers;
pub mod time_parser;
pub mod kubernetes_parser;
pub mod cli;
pub mod commands;


pub use models::*;
pub use error::ParseError;
pub use config::ParserConfig;
pub use statistics::ParsingStatistics;
pub use parse_result::ParsedLine;
pub use parsers::{LineGrammar, KlogHeader, KlogParser, KvParser};
pub use time_parser::TimeParser;
pub use kubernetes_parser::KubernetesParser;
