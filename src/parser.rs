//! Timecode grammar shared by the format codecs.

use crate::time::Time;

use nom::bytes::complete::{tag, take_while_m_n};
use nom::character::complete::{digit1, one_of, space0};
use nom::combinator::{map_res, opt};
use nom::error::VerboseError;
use nom::sequence::preceded;
use nom::IResult;

type ParseResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

fn optional_bom(input: &str) -> ParseResult<Option<&str>> {
    opt(tag("\u{FEFF}"))(input)
}

/// Drops a leading byte order mark, if any.
pub fn strip_bom(line: &str) -> &str {
    match optional_bom(line) {
        Ok((rest, _)) => rest,
        Err(_) => line,
    }
}

/// Parses a whole line as an SRT sequence number.
pub fn sequence_number(line: &str) -> Option<usize> {
    match seq_num(line.trim()) {
        Ok(("", n)) => Some(n),
        _ => None,
    }
}

/// Parses a whole string as a clock value: `[H:]MM:SS` followed by `,` or
/// `.` and up to three fraction digits.
pub fn clock_time(input: &str) -> Option<Time> {
    match timestamp(input.trim()) {
        Ok(("", time)) => Some(time),
        _ => None,
    }
}

/// Parses `start --> end` and returns whatever follows the end time, trimmed.
pub fn cue_timing(line: &str) -> Option<(Time, Time, &str)> {
    match show_hide(line.trim()) {
        Ok((rest, (start, end))) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
            Some((start, end, rest.trim()))
        }
        _ => None,
    }
}

fn show_hide(input: &str) -> ParseResult<(Time, Time)> {
    let (input, show_at) = timestamp(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = tag("-->")(input)?;
    let (input, _) = space0(input)?;
    let (input, hide_at) = timestamp(input)?;

    Ok((input, (show_at, hide_at)))
}

fn timestamp(input: &str) -> ParseResult<Time> {
    const MILLIS_MIN: usize = 0;
    const MILLIS_MAX: usize = 3;
    let take_millis = || {
        map_res(
            take_while_m_n(MILLIS_MIN, MILLIS_MAX, |c: char| c.is_ascii_digit()),
            move |s: &str| {
                // A fraction like `,2` is read as `,200`, and ASS centiseconds
                // `.05` as 50 milliseconds.
                format!("{:0<3}", s).parse::<i64>()
            },
        )
    };

    const MS_MIN: usize = 0;
    const MS_MAX: usize = 2;
    let take_ms = || {
        map_res(
            take_while_m_n(MS_MIN, MS_MAX, |c: char| c.is_ascii_digit()),
            // Left-pad so that `1:13:45` reads as `01:13:45`.
            |s: &str| format!("{:0>2}", s).parse::<i64>(),
        )
    };

    let (input, first): (_, i64) = map_res(digit1, |s: &str| s.parse())(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, second) = take_ms()(input)?;
    let (input, third) = opt(preceded(tag(":"), take_ms()))(input)?;
    let (input, _) = one_of(",.")(input)?;
    let (input, millis) = take_millis()(input)?;

    let (hours, minutes, seconds) = match third {
        Some(seconds) => (first, second, seconds),
        None => (0, first, second),
    };
    Ok((input, Time::from_hms(hours, minutes, seconds, millis)))
}

fn seq_num(input: &str) -> ParseResult<usize> {
    map_res(digit1, |s: &str| s.parse())(input)
}
