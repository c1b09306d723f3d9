use crate::commands::command::Command;
use ufmt_macros::uDebug;
use winnow::{
    ascii::{dec_uint, space0},
    combinator::{alt, eof, preceded, terminated},
    Parser, Result,
};

/// Parses a single command line.
///
/// # Parameters
///
/// - `input`: The line, without its `\n`. A trailing `\r` is allowed.
pub fn parse(input: &str) -> core::result::Result<Command, Error> {
    let mut input_ref: &str = input.trim_end_matches('\r');
    parse_command
        .parse_next(&mut input_ref)
        .map_err(|_| Error::ParseError)
}

/// Possible errors that might occur during parsing.
#[derive(uDebug)]
pub enum Error {
    /// Parsing failed.
    ParseError,
}

/// Parse a command, followed by nothing but spaces.
fn parse_command(input: &mut &str) -> Result<Command> {
    terminated(
        alt((
            preceded('C', dec_uint).map(Command::Cycles),
            preceded('N', dec_uint).map(Command::Nanoseconds),
            preceded('U', dec_uint).map(Command::Microseconds),
            'F'.value(Command::Fixed),
            'S'.value(Command::Status),
        )),
        (space0, eof),
    )
    .parse_next(input)
}
