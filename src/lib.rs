pub mod ast;
pub mod builder;
pub mod executor;
pub mod grammar;
pub mod matcher;
pub mod model;
pub mod parser;
pub mod report;
pub mod rule;
pub mod source;
pub mod token;

use wasm_bindgen::prelude::*;

use executor::ExecuteError;
use model::Document;
use parser::{ParseError, Parser};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Execute(#[from] ExecuteError),
}

/// Parse erdm source into a document.
///
/// Input that only partly parses still yields a document, with `has_error`
/// set and a diagnostic per unparsed region.
pub fn parse(source: &str) -> Result<Document, Error> {
    let parsed = Parser::new(source).parse()?;
    Ok(parsed.execute()?)
}

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Parse erdm source and return the document as JSON
#[wasm_bindgen(js_name = "erdmToJson")]
pub fn erdm_to_json(source: &str) -> Result<String, String> {
    let document = parse(source).map_err(|e| e.to_string())?;
    serde_json::to_string(&document).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_output() {
        let json = erdm_to_json("#Title: Shop\nusers\n  +id [int]\n").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["title"], "Shop");
        assert_eq!(value["tables"][0]["internal_name"], "users");
        assert_eq!(value["tables"][0]["columns"][0]["is_primary_key"], true);
        assert_eq!(value["tables"][0]["primary_key_columns"][0], 0);
        assert_eq!(value["has_error"], false);
    }

    #[test]
    fn test_json_error() {
        let err = erdm_to_json("").unwrap_err();
        assert!(err.starts_with("parse error near "));
    }
}
