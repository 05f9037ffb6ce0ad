//! Parser for the zoom-percentage box.
//!
//! Reads the leading float after optional whitespace and ignores whatever
//! follows it, so `"150"`, `" 87.5 % "`, `"2e2"` and `"12abc"` all parse.

use thiserror::Error;
use winnow::ascii::{float, multispace0};
use winnow::combinator::preceded;
use winnow::token::rest;
use winnow::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoomInputError {
    #[error("zoom percentage is empty")]
    Empty,
    #[error("`{0}` is not a zoom percentage")]
    NotANumber(String),
}

/// Parse the text of the zoom box into a percentage.
pub fn parse_zoom_percent(text: &str) -> Result<f64, ZoomInputError> {
    if text.trim().is_empty() {
        return Err(ZoomInputError::Empty);
    }
    let mut input = text;
    percent_literal
        .parse_next(&mut input)
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ZoomInputError::NotANumber(text.to_string()))
}

fn percent_literal(input: &mut &str) -> ModalResult<f64> {
    (preceded(multispace0, float), rest)
        .map(|(value, _suffix)| value)
        .parse_next(input)
}
