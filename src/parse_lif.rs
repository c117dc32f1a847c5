use thiserror::Error;
use tracing::debug;
use tracing::warn;

use crate::Coord;
use crate::parse_util;
use crate::parse_util::ConvertError;
use crate::parse_util::ParseResult;

/// The two Life file dialects we understand.
///
/// See: https://conwaylife.com/wiki/Life_1.05 and https://conwaylife.com/wiki/Life_1.06
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifFormat {
    /// Rows of glyphs, `*` is alive
    Life105,

    /// One `x y` coordinate pair per line
    Life106,
}

/// A decoded pattern.
///
/// Cells are `(x, y)` pairs relative to the pattern origin, with `x` growing to the right and `y`
/// growing downwards. Any `#P` offsets are already folded into the coordinates. Cells keep the
/// order they appear in the file, and a cell listed twice appears twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub format: LifFormat,
    pub cells: Vec<(Coord, Coord)>,

    /// Sum of every `#P` line, if there was one
    pub offset: Option<(Coord, Coord)>,

    /// `#D` lines
    pub description: Vec<String>,
}

#[derive(Debug, Error)]
pub enum LifError {
    #[error("Invalid format: expected a \"#Life 1.05\" or \"#Life 1.06\" header, found \"{header}\"")]
    InvalidFormat { header: String },

    #[error("Parse error on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ConvertError,
    },

    #[error("Parse error on line {line}: expected two coordinates")]
    MissingCoordinate { line: usize },

    #[error("Coordinates on line {line} are out of range")]
    Overflow { line: usize },
}

impl LifError {
    /// 1-based line number the error was found on, if it belongs to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            LifError::InvalidFormat { .. } => None,
            LifError::Parse { line, .. }
            | LifError::MissingCoordinate { line }
            | LifError::Overflow { line } => Some(*line),
        }
    }
}

/// Parse the text of a Life 1.05 or 1.06 file. The dialect is picked from the first non-empty
/// line.
pub fn read_lif(text: &str) -> Result<Shape, LifError> {
    // 1-based line numbers
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));

    let header = lines
        .by_ref()
        .map(|(_, l)| l)
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default();

    let Ok(format) = read_header(header.as_bytes()) else {
        return Err(LifError::InvalidFormat {
            header: header.trim().to_string(),
        });
    };

    debug!(?format, "Reading Life pattern");

    match format {
        LifFormat::Life105 => read_105(lines),
        LifFormat::Life106 => read_106(lines),
    }
}

/// Match `#Life 1.05` or `#Life 1.06`. Whitespace may precede `#` and `Life`, and anything may
/// follow the version.
fn read_header(bytes: &[u8]) -> ParseResult<LifFormat> {
    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect(b'#', bytes)?;
    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect_slice(b"Life", bytes)?;
    let bytes = parse_util::take_ws1(bytes)?;

    match parse_util::expect_slice(b"1.05", bytes) {
        Ok(_) => Ok(LifFormat::Life105),
        Err(_) => parse_util::expect_slice(b"1.06", bytes).map(|_| LifFormat::Life106),
    }
}

enum HeaderLine {
    Offset { x: Coord, y: Coord },
    Description(String),
    NormalRule,
    Rule,
    Other,
}

/// Parse a line starting with `#`. `bytes` is what follows the `#`.
fn read_line_header(bytes: &[u8], line: usize) -> Result<HeaderLine, LifError> {
    let (tag, bytes) = parse_util::take_1(bytes);

    match tag {
        Some(b'P') => {
            let ((x, y), _) = read_coordinates(bytes, line)?
                .ok_or(LifError::MissingCoordinate { line })?;

            Ok(HeaderLine::Offset { x, y })
        }
        Some(b'D') => Ok(HeaderLine::Description(read_description(bytes))),
        Some(b'N') => Ok(HeaderLine::NormalRule),
        Some(b'R') => Ok(HeaderLine::Rule),
        _ => Ok(HeaderLine::Other),
    }
}

/// Text of a `#D` line, `bytes` is what follows the `D`.
fn read_description(bytes: &[u8]) -> String {
    String::from_utf8_lossy(parse_util::take_ws(bytes))
        .trim_end()
        .to_string()
}

fn read_105<'a, I>(lines: I) -> Result<Shape, LifError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut shape = Shape {
        format: LifFormat::Life105,
        cells: Vec::new(),
        offset: None,
        description: Vec::new(),
    };

    // running origin, moved by every `#P` line
    let (mut ox, mut oy): (Coord, Coord) = (0, 0);

    // rows are counted across blocks, `#P` lines don't reset them
    let mut y: Coord = 0;

    let mut normal_rule = false;

    for (line, l) in lines {
        if let Ok(rest) = parse_util::expect(b'#', l.as_bytes()) {
            match read_line_header(rest, line)? {
                HeaderLine::Offset { x: dx, y: dy } => {
                    let (Some(nx), Some(ny)) = (ox.checked_add(dx), oy.checked_add(dy)) else {
                        return Err(LifError::Overflow { line });
                    };

                    (ox, oy) = (nx, ny);
                    shape.offset = Some((ox, oy));
                }
                HeaderLine::Description(text) => shape.description.push(text),
                HeaderLine::NormalRule if normal_rule => {
                    warn!(line, "Repeated #N header");
                }
                HeaderLine::NormalRule => normal_rule = true,
                HeaderLine::Rule => {
                    warn!(line, "Custom rules are not supported, using B3/S23");
                }
                HeaderLine::Other => {}
            }

            continue;
        }

        for (x, c) in l.chars().enumerate() {
            if c != '*' {
                continue;
            }

            let cell = Coord::try_from(x)
                .ok()
                .and_then(|x| Some((ox.checked_add(x)?, oy.checked_add(y)?)))
                .ok_or(LifError::Overflow { line })?;

            shape.cells.push(cell);
        }

        y += 1;
    }

    Ok(shape)
}

fn read_106<'a, I>(lines: I) -> Result<Shape, LifError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut shape = Shape {
        format: LifFormat::Life106,
        cells: Vec::new(),
        offset: None,
        description: Vec::new(),
    };

    for (line, l) in lines {
        let bytes = parse_util::take_ws(l.as_bytes());

        // only `#D` means something here, every other `#` line is a comment
        if let Ok(rest) = parse_util::expect(b'#', bytes) {
            if let (Some(b'D'), text) = parse_util::take_1(rest) {
                shape.description.push(read_description(text));
            }

            continue;
        }

        // blank lines and lone tokens are skipped
        let Some((cell, _)) = read_coordinates(bytes, line)? else {
            continue;
        };

        shape.cells.push(cell);
    }

    Ok(shape)
}

/// Read two whitespace separated integers. `Ok(None)` if there are fewer than two tokens.
fn read_coordinates(
    bytes: &[u8],
    line: usize,
) -> Result<Option<((Coord, Coord), &[u8])>, LifError> {
    let (Some(x), bytes) = parse_util::take_token(bytes) else {
        return Ok(None);
    };
    let (Some(y), bytes) = parse_util::take_token(bytes) else {
        return Ok(None);
    };

    let convert = |token: &[u8]| {
        parse_util::convert::<Coord>(token).map_err(|source| LifError::Parse { line, source })
    };

    Ok(Some(((convert(x)?, convert(y)?), bytes)))
}
