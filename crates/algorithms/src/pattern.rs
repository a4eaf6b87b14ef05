//! Repeating tiles for hatch fills.
//!
//! A [`Pattern`] owns a prototype store drawn in a unit cell and tiles it over a
//! rectangle. Each tile is an independent copy of the prototype scaled to the cell
//! dimensions and moved to its grid position.
//!
//! Prototypes are described with [`PatternCommand`]s, either produced by a closure
//! (see [`Pattern::create_from_pattern`]) or parsed from a short command string (see
//! [`Pattern::from_commands`]).
//!
//! # Command syntax
//!
//! Commands are a letter followed by numbers, separated by whitespace or commas.
//! Lower case commands are relative to the current position, upper case commands
//! are absolute. Repeating a command without its letter is allowed, as in SVG paths.
//!
//! | Command | Arguments         | Geometry                              |
//! |---------|-------------------|---------------------------------------|
//! | `m`     | x y               | moves without drawing                 |
//! | `h`     | x                 | horizontal line                       |
//! | `v`     | y                 | vertical line                         |
//! | `l`     | x y               | line                                  |
//! | `a`     | cx cy x y         | arc through (cx, cy)                  |
//! | `q`     | cx cy x y         | quadratic bézier curve                |
//! | `c`     | c1x c1y c2x c2y x y | cubic bézier curve                  |
//!
//! ```
//! use geomstr_algorithms::pattern::Pattern;
//!
//! // Two diagonal strokes per cell.
//! let pattern: Pattern = Pattern::from_commands("M 0 0 L 1 1 m -1 -0.5 l 0.5 0.5", 0)
//!     .unwrap()
//!     .with_cell_dims(10.0, 10.0);
//!
//! assert_eq!(pattern.generate(0.0, 0.0, 30.0, 30.0).count(), 9);
//! ```

use crate::math::{point, vector, Box2D, Point, Transform, Vector};
use crate::path::Geomstr;

use thiserror::Error;

/// Errors produced by [`parse_pattern_commands`].
#[non_exhaustive]
#[derive(Error, Clone, Debug, PartialEq)]
pub enum PatternError {
    #[error("Line {line} Column {column}: Expected number, got {src:?}.")]
    Number { src: String, line: i32, column: i32 },
    #[error("Line {line} Column {column}: Invalid command {command:?}.")]
    Command {
        command: char,
        line: i32,
        column: i32,
    },
}

/// A drawing command of a pattern prototype.
///
/// Offsets are relative to the current position, in cell units (the cell is the
/// `0..1` square).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum PatternCommand {
    Move(Vector),
    Horizontal(f64),
    Vertical(f64),
    Line(Vector),
    Arc { ctrl: Vector, to: Vector },
    Quadratic { ctrl: Vector, to: Vector },
    Cubic { ctrl1: Vector, ctrl2: Vector, to: Vector },
}

/// A prototype store tiled over a grid of cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern<P = usize> {
    geometry: Geomstr<P>,
    cell_width: f64,
    cell_height: f64,
    padding: f64,
    extend_past_edge: bool,
}

impl<P: Copy> Pattern<P> {
    pub const DEFAULT_CELL_SIZE: f64 = 1.0;

    /// Creates a pattern from a prototype drawn in the unit cell.
    pub fn new(geometry: Geomstr<P>) -> Self {
        Pattern {
            geometry,
            cell_width: Self::DEFAULT_CELL_SIZE,
            cell_height: Self::DEFAULT_CELL_SIZE,
            padding: 0.0,
            extend_past_edge: false,
        }
    }

    /// Builds the prototype from the commands produced by `pattern(a, b)`.
    pub fn create_from_pattern<F, I>(pattern: F, a: f64, b: f64, settings: P) -> Self
    where
        F: FnOnce(f64, f64) -> I,
        I: IntoIterator<Item = PatternCommand>,
    {
        let mut geometry = Geomstr::new();
        let mut current = point(0.0, 0.0);
        for command in pattern(a, b) {
            current = match command {
                PatternCommand::Move(offset) => current + offset,
                PatternCommand::Horizontal(dx) => {
                    let to = current + vector(dx, 0.0);
                    geometry.line(current, to, settings);
                    to
                }
                PatternCommand::Vertical(dy) => {
                    let to = current + vector(0.0, dy);
                    geometry.line(current, to, settings);
                    to
                }
                PatternCommand::Line(offset) => {
                    let to = current + offset;
                    geometry.line(current, to, settings);
                    to
                }
                PatternCommand::Arc { ctrl, to } => {
                    let to = current + to;
                    geometry.arc(current, current + ctrl, to, settings);
                    to
                }
                PatternCommand::Quadratic { ctrl, to } => {
                    let to = current + to;
                    geometry.quad(current, current + ctrl, to, settings);
                    to
                }
                PatternCommand::Cubic { ctrl1, ctrl2, to } => {
                    let to = current + to;
                    geometry.cubic(current, current + ctrl1, current + ctrl2, to, settings);
                    to
                }
            };
        }
        geometry.trim();

        Pattern::new(geometry)
    }

    /// Builds the prototype from a command string.
    pub fn from_commands(src: &str, settings: P) -> Result<Self, PatternError> {
        let commands = parse_pattern_commands(src)?;
        Ok(Self::create_from_pattern(|_, _| commands, 0.0, 0.0, settings))
    }

    pub fn geometry(&self) -> &Geomstr<P> {
        &self.geometry
    }

    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    pub fn cell_height(&self) -> f64 {
        self.cell_height
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    pub fn extend_past_edge(&self) -> bool {
        self.extend_past_edge
    }

    pub fn set_cell_dims(&mut self, width: f64, height: f64) {
        self.cell_width = width;
        self.cell_height = height;
    }

    /// Space between two consecutive cells.
    pub fn set_padding(&mut self, padding: f64) {
        self.padding = padding;
    }

    /// Whether to emit the partial cells overlapping the edges of the generated area.
    pub fn set_extend_past_edge(&mut self, extend: bool) {
        self.extend_past_edge = extend;
    }

    pub fn with_cell_dims(mut self, width: f64, height: f64) -> Self {
        self.set_cell_dims(width, height);
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.set_padding(padding);
        self
    }

    pub fn with_extend_past_edge(mut self, extend: bool) -> Self {
        self.set_extend_past_edge(extend);
        self
    }

    /// Tiles covering the rectangle from `(x0, y0)` to `(x1, y1)`.
    ///
    /// Without `extend_past_edge`, only the cells lying entirely inside the rectangle
    /// are produced, otherwise every cell overlapping it is.
    pub fn generate(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Tiles<'_, P> {
        let pitch_x = self.cell_width + self.padding;
        let pitch_y = self.cell_height + self.padding;
        let valid = self.cell_width > 0.0
            && self.cell_height > 0.0
            && pitch_x > 0.0
            && pitch_y > 0.0;

        let (cols, rows) = if valid {
            (
                self.cell_range(x0, x1, pitch_x),
                self.cell_range(y0, y1, pitch_y),
            )
        } else {
            ((0, 0), (0, 0))
        };

        log::debug!(
            "pattern tiles: columns {}..{}, rows {}..{}",
            cols.0,
            cols.1,
            rows.0,
            rows.1
        );

        let empty = cols.0 >= cols.1 || rows.0 >= rows.1;
        Tiles {
            pattern: self,
            pitch: vector(pitch_x, pitch_y),
            first_col: cols.0,
            end_col: cols.1,
            end_row: rows.1,
            col: cols.0,
            row: if empty { rows.1 } else { rows.0 },
        }
    }

    /// Range of cell indices along one axis.
    fn cell_range(&self, min: f64, max: f64, pitch: f64) -> (i64, i64) {
        if self.extend_past_edge {
            ((min / pitch).floor() as i64, (max / pitch).ceil() as i64)
        } else {
            let mut start = (min / pitch).floor();
            if start * pitch < min {
                start += 1.0;
            }
            (start as i64, (max / pitch).floor() as i64)
        }
    }

    /// Area covered by the cell at the given position.
    pub fn cell_bounds(&self, col: i64, row: i64) -> Box2D {
        let min = point(
            col as f64 * (self.cell_width + self.padding),
            row as f64 * (self.cell_height + self.padding),
        );
        Box2D {
            min,
            max: min + vector(self.cell_width, self.cell_height),
        }
    }
}

/// Iterator over the tiles of a pattern, see [`Pattern::generate`].
pub struct Tiles<'l, P> {
    pattern: &'l Pattern<P>,
    pitch: Vector,
    first_col: i64,
    end_col: i64,
    end_row: i64,
    col: i64,
    row: i64,
}

impl<'l, P: Copy> Iterator for Tiles<'l, P> {
    type Item = Geomstr<P>;

    fn next(&mut self) -> Option<Geomstr<P>> {
        if self.row >= self.end_row {
            return None;
        }

        let transform = Transform::scale(self.pattern.cell_width, self.pattern.cell_height)
            .then_translate(vector(
                self.col as f64 * self.pitch.x,
                self.row as f64 * self.pitch.y,
            ));
        let mut tile = self.pattern.geometry.clone();
        tile.transform(&transform);

        self.col += 1;
        if self.col >= self.end_col {
            self.col = self.first_col;
            self.row += 1;
        }

        Some(tile)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.row >= self.end_row {
            return (0, Some(0));
        }
        // Indices may span the whole i64 range for unbounded areas.
        let cols = self.end_col as i128 - self.first_col as i128;
        let rows = self.end_row as i128 - self.row as i128;
        let done = self.col as i128 - self.first_col as i128;
        let remaining = rows
            .checked_mul(cols)
            .map(|total| total - done)
            .and_then(|n| usize::try_from(n).ok());
        match remaining {
            Some(n) => (n, Some(n)),
            None => (usize::MAX, None),
        }
    }
}

// A buffered iterator of characters keeping track of line and column.
struct Source<Iter> {
    src: Iter,
    current: char,
    line: i32,
    col: i32,
    finished: bool,
}

impl<Iter: Iterator<Item = char>> Source<Iter> {
    fn new(mut src: Iter) -> Self {
        let (current, finished) = match src.next() {
            Some(c) => (c, false),
            None => (' ', true),
        };

        Source {
            line: if current == '\n' { 1 } else { 0 },
            current,
            finished,
            src,
            col: 0,
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.finished && (self.current.is_whitespace() || self.current == ',') {
            self.advance_one();
        }
    }

    fn advance_one(&mut self) {
        if self.finished {
            return;
        }
        match self.src.next() {
            Some('\n') => {
                self.current = '\n';
                self.line += 1;
                self.col = -1;
            }
            Some(c) => {
                self.current = c;
                self.col += 1;
            }
            None => {
                self.current = '~';
                self.finished = true;
            }
        }
    }

    fn parse_number(&mut self, buffer: &mut String) -> Result<f64, PatternError> {
        buffer.clear();
        self.skip_whitespace();

        let line = self.line;
        let column = self.col;

        if self.current == '-' || self.current == '+' {
            buffer.push(self.current);
            self.advance_one();
        }
        while self.current.is_ascii_digit() {
            buffer.push(self.current);
            self.advance_one();
        }
        if self.current == '.' {
            buffer.push('.');
            self.advance_one();
            while self.current.is_ascii_digit() {
                buffer.push(self.current);
                self.advance_one();
            }
        }
        if self.current == 'e' || self.current == 'E' {
            buffer.push(self.current);
            self.advance_one();
            if self.current == '-' || self.current == '+' {
                buffer.push(self.current);
                self.advance_one();
            }
            while self.current.is_ascii_digit() {
                buffer.push(self.current);
                self.advance_one();
            }
        }

        buffer.parse::<f64>().map_err(|_| PatternError::Number {
            src: std::mem::take(buffer),
            line,
            column,
        })
    }

    fn parse_point(&mut self, buffer: &mut String) -> Result<Point, PatternError> {
        let x = self.parse_number(buffer)?;
        let y = self.parse_number(buffer)?;
        Ok(point(x, y))
    }
}

/// Parses a pattern command string into relative commands.
pub fn parse_pattern_commands(src: &str) -> Result<Vec<PatternCommand>, PatternError> {
    let mut src = Source::new(src.chars());
    let mut buffer = String::new();
    let mut commands = Vec::new();
    let mut current = point(0.0, 0.0);
    let mut implicit_cmd = None;

    src.skip_whitespace();

    while !src.finished {
        let line = src.line;
        let column = src.col;
        let cmd = if src.current.is_ascii_alphabetic() {
            let cmd = src.current;
            src.advance_one();
            cmd
        } else {
            match implicit_cmd {
                Some(cmd) => cmd,
                None => {
                    return Err(PatternError::Command {
                        command: src.current,
                        line,
                        column,
                    })
                }
            }
        };

        let is_relative = cmd.is_ascii_lowercase();
        // Turns a parsed position into an offset from the current position.
        let offset = |p: Point| if is_relative { p.to_vector() } else { p - current };

        let command = match cmd {
            'm' | 'M' => PatternCommand::Move(offset(src.parse_point(&mut buffer)?)),
            'l' | 'L' => PatternCommand::Line(offset(src.parse_point(&mut buffer)?)),
            'h' | 'H' => {
                let x = src.parse_number(&mut buffer)?;
                PatternCommand::Horizontal(if is_relative { x } else { x - current.x })
            }
            'v' | 'V' => {
                let y = src.parse_number(&mut buffer)?;
                PatternCommand::Vertical(if is_relative { y } else { y - current.y })
            }
            'a' | 'A' => PatternCommand::Arc {
                ctrl: offset(src.parse_point(&mut buffer)?),
                to: offset(src.parse_point(&mut buffer)?),
            },
            'q' | 'Q' => PatternCommand::Quadratic {
                ctrl: offset(src.parse_point(&mut buffer)?),
                to: offset(src.parse_point(&mut buffer)?),
            },
            'c' | 'C' => PatternCommand::Cubic {
                ctrl1: offset(src.parse_point(&mut buffer)?),
                ctrl2: offset(src.parse_point(&mut buffer)?),
                to: offset(src.parse_point(&mut buffer)?),
            },
            _ => {
                return Err(PatternError::Command {
                    command: cmd,
                    line,
                    column,
                })
            }
        };

        current += match command {
            PatternCommand::Move(to) | PatternCommand::Line(to) => to,
            PatternCommand::Horizontal(dx) => vector(dx, 0.0),
            PatternCommand::Vertical(dy) => vector(0.0, dy),
            PatternCommand::Arc { to, .. }
            | PatternCommand::Quadratic { to, .. }
            | PatternCommand::Cubic { to, .. } => to,
        };
        commands.push(command);

        // As in SVG, coordinates following a move are lines.
        implicit_cmd = Some(match cmd {
            'm' => 'l',
            'M' => 'L',
            other => other,
        });

        src.skip_whitespace();
    }

    Ok(commands)
}

#[cfg(test)]
use crate::path::Segment;

#[cfg(test)]
fn diagonal() -> Pattern {
    Pattern::create_from_pattern(
        |a, b| {
            vec![
                PatternCommand::Move(vector(0.0, a)),
                PatternCommand::Line(vector(1.0, b)),
            ]
        },
        0.0,
        1.0,
        0,
    )
}

#[test]
fn create_from_closure() {
    let pattern = diagonal();
    assert_eq!(pattern.geometry().len(), 1);
    assert_eq!(
        pattern.geometry().segment(0),
        Some(&Segment::Line {
            from: point(0.0, 0.0),
            to: point(1.0, 1.0),
            settings: 0,
        })
    );
}

#[test]
fn tiles_inside_the_area() {
    let pattern = diagonal().with_cell_dims(10.0, 10.0);

    let tiles: Vec<Geomstr> = pattern.generate(0.0, 0.0, 30.0, 20.0).collect();
    assert_eq!(tiles.len(), 6);
    assert_eq!(
        tiles[1].segment(0),
        Some(&Segment::Line {
            from: point(10.0, 0.0),
            to: point(20.0, 10.0),
            settings: 0,
        })
    );
    assert_eq!(tiles[3].segment(0).and_then(Segment::start), Some(point(0.0, 10.0)));

    // Cells crossing the edges are left out.
    assert_eq!(pattern.generate(5.0, 0.0, 30.0, 20.0).count(), 4);
    assert_eq!(pattern.generate(5.0, 5.0, 25.0, 15.0).count(), 0);

    // The prototype is untouched.
    assert_eq!(pattern.geometry(), diagonal().geometry());
}

#[test]
fn tiles_past_the_edge() {
    let pattern = diagonal()
        .with_cell_dims(10.0, 10.0)
        .with_extend_past_edge(true);

    let tiles = pattern.generate(5.0, 5.0, 25.0, 15.0);
    assert_eq!(tiles.size_hint(), (6, Some(6)));
    let first: Vec<Point> = tiles
        .map(|tile| tile.segment(0).and_then(Segment::start).unwrap())
        .collect();
    assert_eq!(
        first,
        vec![
            point(0.0, 0.0),
            point(10.0, 0.0),
            point(20.0, 0.0),
            point(0.0, 10.0),
            point(10.0, 10.0),
            point(20.0, 10.0),
        ]
    );
}

#[test]
fn padding_and_degenerate_cells() {
    let mut pattern = diagonal().with_cell_dims(10.0, 5.0).with_padding(2.0);
    let tiles: Vec<Geomstr> = pattern.generate(0.0, 0.0, 40.0, 14.0).collect();
    // Columns 0, 12, 24 and rows 0, 7.
    assert_eq!(tiles.len(), 6);
    assert_eq!(tiles[4].segment(0).and_then(Segment::end), Some(point(22.0, 12.0)));
    assert_eq!(pattern.cell_bounds(1, 1).min, point(12.0, 7.0));

    pattern.set_cell_dims(0.0, 5.0);
    assert_eq!(pattern.generate(0.0, 0.0, 40.0, 14.0).count(), 0);

    pattern.set_cell_dims(10.0, 5.0);
    pattern.set_padding(0.0);
    assert_eq!(pattern.generate(30.0, 0.0, 0.0, 10.0).count(), 0);
}

#[test]
fn unbounded_area() {
    let pattern = diagonal().with_cell_dims(10.0, 10.0);

    let tiles = pattern.generate(f64::NEG_INFINITY, 0.0, f64::INFINITY, 10.0);
    assert_eq!(tiles.size_hint().0, usize::MAX);
    let first: Vec<Geomstr> = tiles.take(2).collect();
    assert_eq!(first.len(), 2);
    let x0 = first[0].segment(0).and_then(Segment::start).unwrap().x;
    let x1 = first[1].segment(0).and_then(Segment::start).unwrap().x;
    assert!(x0.is_finite());
    assert!(x0 <= x1);

    let extended = pattern.clone().with_extend_past_edge(true);
    let rows: Vec<Geomstr> = extended
        .generate(0.0, f64::NEG_INFINITY, 10.0, f64::INFINITY)
        .take(3)
        .collect();
    assert_eq!(rows.len(), 3);
}

#[test]
fn parse_commands() {
    let commands = parse_pattern_commands("M 0.5,0 V 1 m -0.5 -0.5 h 1\nL 0 0 0.25 0.25").unwrap();
    assert_eq!(
        commands,
        vec![
            PatternCommand::Move(vector(0.5, 0.0)),
            PatternCommand::Vertical(1.0),
            PatternCommand::Move(vector(-0.5, -0.5)),
            PatternCommand::Horizontal(1.0),
            PatternCommand::Line(vector(-1.0, -0.5)),
            PatternCommand::Line(vector(0.25, 0.25)),
        ]
    );

    let commands = parse_pattern_commands("q 0.5 1 1 0 A 1.5 0.5 1 1e0 c 0 1 1 1 1 0").unwrap();
    assert_eq!(
        commands,
        vec![
            PatternCommand::Quadratic {
                ctrl: vector(0.5, 1.0),
                to: vector(1.0, 0.0),
            },
            PatternCommand::Arc {
                ctrl: vector(0.5, 0.5),
                to: vector(0.0, 1.0),
            },
            PatternCommand::Cubic {
                ctrl1: vector(0.0, 1.0),
                ctrl2: vector(1.0, 1.0),
                to: vector(1.0, 0.0),
            },
        ]
    );

    let pattern: Pattern = Pattern::from_commands("q 0.5 1 1 0 A 1.5 0.5 1 1e0", 3).unwrap();
    assert_eq!(pattern.geometry().len(), 2);
    assert_eq!(
        pattern.geometry().segment(1),
        Some(&Segment::Arc {
            from: point(1.0, 0.0),
            ctrl: point(1.5, 0.5),
            to: point(1.0, 1.0),
            settings: 3,
        })
    );
}

#[test]
fn parse_errors() {
    assert_eq!(
        parse_pattern_commands("M 0 0\n  x 1"),
        Err(PatternError::Command {
            command: 'x',
            line: 1,
            column: 2,
        })
    );
    assert_eq!(
        parse_pattern_commands("l 1 z"),
        Err(PatternError::Number {
            src: String::new(),
            line: 0,
            column: 4,
        })
    );
    assert!(matches!(
        parse_pattern_commands("1 2"),
        Err(PatternError::Command { command: '1', .. })
    ));
}
