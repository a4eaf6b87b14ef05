use crate::geom::{Arc, CubicBezierSegment, LineSegment, Primitive, QuadraticBezierSegment};
use crate::math::{Point, Transform};

/// Identifier of a node of the toolpath graph.
pub type VertexId = usize;

/// A record of the segment store.
///
/// Geometric records carry an opaque `settings` handle identifying the power, speed
/// or pen profile to use when the segment is emitted. It is resolved downstream and
/// never interpreted by the store.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Segment<P = usize> {
    Point {
        at: Point,
        settings: P,
    },
    Line {
        from: Point,
        to: Point,
        settings: P,
    },
    Quadratic {
        from: Point,
        ctrl: Point,
        to: Point,
        settings: P,
    },
    Cubic {
        from: Point,
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
        settings: P,
    },
    Arc {
        from: Point,
        ctrl: Point,
        to: Point,
        settings: P,
    },
    /// A graph node. Runs going through vertices with the same id meet there.
    Vertex { id: VertexId },
    /// A hard break: no connection is implied between the records around it.
    End,
}

/// The type of a [`Segment`] without its payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum SegmentKind {
    Point,
    Line,
    Quadratic,
    Cubic,
    Arc,
    Vertex,
    End,
}

impl SegmentKind {
    /// Slot flag: the start position is meaningful.
    pub const START: u8 = 1;
    /// Slot flag: the first control position is meaningful.
    pub const CONTROL_A: u8 = 2;
    /// Slot flag: the second control position is meaningful.
    pub const CONTROL_B: u8 = 4;
    /// Slot flag: the end position is meaningful.
    pub const END: u8 = 8;

    /// Which of the four position slots hold coordinates for this kind of record.
    ///
    /// Quadratic curves and arcs have a single control point which occupies both
    /// control slots.
    pub fn slots(self) -> u8 {
        match self {
            SegmentKind::Point | SegmentKind::Line => Self::START | Self::END,
            SegmentKind::Quadratic | SegmentKind::Cubic | SegmentKind::Arc => {
                Self::START | Self::CONTROL_A | Self::CONTROL_B | Self::END
            }
            SegmentKind::Vertex | SegmentKind::End => 0,
        }
    }

    #[inline]
    pub fn uses_control_points(self) -> bool {
        self.slots() & (Self::CONTROL_A | Self::CONTROL_B) != 0
    }

    #[inline]
    pub fn is_marker(self) -> bool {
        self.slots() == 0
    }
}

/// How two records of the store are connected.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Connection {
    /// An implicit move from the end of the first record to the start of the second.
    Travel { from: Point, to: Point },
    /// An end marker separates the records.
    Break,
    /// The records meet at a graph vertex.
    Vertex(VertexId),
}

impl Connection {
    /// How two consecutive records are connected.
    pub fn between<P: Copy>(a: &Segment<P>, b: &Segment<P>) -> Connection {
        match (a, b) {
            (Segment::End, _) | (_, Segment::End) => Connection::Break,
            (Segment::Vertex { id }, _) | (_, Segment::Vertex { id }) => Connection::Vertex(*id),
            _ => match (a.end(), b.start()) {
                (Some(from), Some(to)) => Connection::Travel { from, to },
                _ => Connection::Break,
            },
        }
    }

    /// Length of the implied move. Breaks and vertices cost nothing.
    pub fn distance(&self) -> f64 {
        match self {
            Connection::Travel { from, to } => (*to - *from).length(),
            Connection::Break | Connection::Vertex(_) => 0.0,
        }
    }
}

impl<P: Copy> Segment<P> {
    pub fn kind(&self) -> SegmentKind {
        match self {
            Segment::Point { .. } => SegmentKind::Point,
            Segment::Line { .. } => SegmentKind::Line,
            Segment::Quadratic { .. } => SegmentKind::Quadratic,
            Segment::Cubic { .. } => SegmentKind::Cubic,
            Segment::Arc { .. } => SegmentKind::Arc,
            Segment::Vertex { .. } => SegmentKind::Vertex,
            Segment::End => SegmentKind::End,
        }
    }

    /// The settings handle of a geometric record.
    pub fn settings(&self) -> Option<P> {
        match *self {
            Segment::Point { settings, .. }
            | Segment::Line { settings, .. }
            | Segment::Quadratic { settings, .. }
            | Segment::Cubic { settings, .. }
            | Segment::Arc { settings, .. } => Some(settings),
            Segment::Vertex { .. } | Segment::End => None,
        }
    }

    /// Start position, `None` for markers.
    pub fn start(&self) -> Option<Point> {
        match *self {
            Segment::Point { at, .. } => Some(at),
            Segment::Line { from, .. }
            | Segment::Quadratic { from, .. }
            | Segment::Cubic { from, .. }
            | Segment::Arc { from, .. } => Some(from),
            Segment::Vertex { .. } | Segment::End => None,
        }
    }

    /// End position, `None` for markers.
    pub fn end(&self) -> Option<Point> {
        match *self {
            Segment::Point { at, .. } => Some(at),
            Segment::Line { to, .. }
            | Segment::Quadratic { to, .. }
            | Segment::Cubic { to, .. }
            | Segment::Arc { to, .. } => Some(to),
            Segment::Vertex { .. } | Segment::End => None,
        }
    }

    /// The geometry of this record, `None` for markers.
    pub fn to_primitive(&self) -> Option<Primitive> {
        Some(match *self {
            Segment::Point { at, .. } => Primitive::Point(at),
            Segment::Line { from, to, .. } => Primitive::Line(LineSegment { from, to }),
            Segment::Quadratic { from, ctrl, to, .. } => {
                Primitive::Quadratic(QuadraticBezierSegment { from, ctrl, to })
            }
            Segment::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
                ..
            } => Primitive::Cubic(CubicBezierSegment {
                from,
                ctrl1,
                ctrl2,
                to,
            }),
            Segment::Arc { from, ctrl, to, .. } => Primitive::Arc(Arc { from, ctrl, to }),
            Segment::Vertex { .. } | Segment::End => return None,
        })
    }

    /// Builds a geometric record.
    pub fn from_primitive(primitive: Primitive, settings: P) -> Self {
        match primitive {
            Primitive::Point(at) => Segment::Point { at, settings },
            Primitive::Line(s) => Segment::Line {
                from: s.from,
                to: s.to,
                settings,
            },
            Primitive::Quadratic(s) => Segment::Quadratic {
                from: s.from,
                ctrl: s.ctrl,
                to: s.to,
                settings,
            },
            Primitive::Cubic(s) => Segment::Cubic {
                from: s.from,
                ctrl1: s.ctrl1,
                ctrl2: s.ctrl2,
                to: s.to,
                settings,
            },
            Primitive::Arc(s) => Segment::Arc {
                from: s.from,
                ctrl: s.ctrl,
                to: s.to,
                settings,
            },
        }
    }

    /// Applies a function to every position of the record.
    pub fn map_points<F>(&self, mut f: F) -> Self
    where
        F: FnMut(Point) -> Point,
    {
        match *self {
            Segment::Point { at, settings } => Segment::Point {
                at: f(at),
                settings,
            },
            Segment::Line { from, to, settings } => Segment::Line {
                from: f(from),
                to: f(to),
                settings,
            },
            Segment::Quadratic {
                from,
                ctrl,
                to,
                settings,
            } => Segment::Quadratic {
                from: f(from),
                ctrl: f(ctrl),
                to: f(to),
                settings,
            },
            Segment::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
                settings,
            } => Segment::Cubic {
                from: f(from),
                ctrl1: f(ctrl1),
                ctrl2: f(ctrl2),
                to: f(to),
                settings,
            },
            Segment::Arc {
                from,
                ctrl,
                to,
                settings,
            } => Segment::Arc {
                from: f(from),
                ctrl: f(ctrl),
                to: f(to),
                settings,
            },
            Segment::Vertex { id } => Segment::Vertex { id },
            Segment::End => Segment::End,
        }
    }

    #[inline]
    pub fn transformed(&self, transform: &Transform) -> Self {
        self.map_points(|p| transform.transform_point(p))
    }

    /// The same record traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        match *self {
            Segment::Line { from, to, settings } => Segment::Line {
                from: to,
                to: from,
                settings,
            },
            Segment::Quadratic {
                from,
                ctrl,
                to,
                settings,
            } => Segment::Quadratic {
                from: to,
                ctrl,
                to: from,
                settings,
            },
            Segment::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
                settings,
            } => Segment::Cubic {
                from: to,
                ctrl1: ctrl2,
                ctrl2: ctrl1,
                to: from,
                settings,
            },
            Segment::Arc {
                from,
                ctrl,
                to,
                settings,
            } => Segment::Arc {
                from: to,
                ctrl,
                to: from,
                settings,
            },
            other => other,
        }
    }
}

#[test]
fn slot_flags() {
    assert!(SegmentKind::Cubic.uses_control_points());
    assert!(SegmentKind::Arc.uses_control_points());
    assert!(!SegmentKind::Line.uses_control_points());
    assert!(!SegmentKind::Point.uses_control_points());
    assert!(SegmentKind::Vertex.is_marker());
    assert!(SegmentKind::End.is_marker());
    assert_eq!(
        SegmentKind::Line.slots(),
        SegmentKind::START | SegmentKind::END
    );
}

#[test]
fn primitive_conversion() {
    use crate::math::point;

    let records: [Segment; 4] = [
        Segment::Point {
            at: point(1.0, 2.0),
            settings: 3,
        },
        Segment::Quadratic {
            from: point(0.0, 0.0),
            ctrl: point(1.0, 1.0),
            to: point(2.0, 0.0),
            settings: 1,
        },
        Segment::Cubic {
            from: point(0.0, 0.0),
            ctrl1: point(1.0, 1.0),
            ctrl2: point(2.0, 1.0),
            to: point(3.0, 0.0),
            settings: 2,
        },
        Segment::Arc {
            from: point(0.0, 0.0),
            ctrl: point(1.0, 1.0),
            to: point(2.0, 0.0),
            settings: 4,
        },
    ];

    for record in &records {
        let primitive = record.to_primitive().unwrap();
        let settings = record.settings().unwrap();
        assert_eq!(Segment::from_primitive(primitive, settings), *record);
    }

    let vertex: Segment = Segment::Vertex { id: 7 };
    assert!(vertex.to_primitive().is_none());
    assert!(vertex.settings().is_none());
    assert_eq!(vertex.reversed(), vertex);
}

#[test]
fn reversed_swaps_end_points() {
    use crate::math::point;

    let cubic: Segment<u8> = Segment::Cubic {
        from: point(0.0, 0.0),
        ctrl1: point(1.0, 1.0),
        ctrl2: point(2.0, 1.0),
        to: point(3.0, 0.0),
        settings: 9,
    };
    let reversed = cubic.reversed();
    assert_eq!(reversed.start(), cubic.end());
    assert_eq!(reversed.end(), cubic.start());
    assert_eq!(reversed.settings(), Some(9));
    assert_eq!(reversed.reversed(), cubic);
}

#[test]
fn connections() {
    use crate::math::point;

    let a: Segment = Segment::Line {
        from: point(0.0, 0.0),
        to: point(3.0, 0.0),
        settings: 0,
    };
    let b: Segment = Segment::Line {
        from: point(3.0, 4.0),
        to: point(9.0, 4.0),
        settings: 0,
    };

    let travel = Connection::between(&a, &b);
    assert_eq!(
        travel,
        Connection::Travel {
            from: point(3.0, 0.0),
            to: point(3.0, 4.0)
        }
    );
    assert_eq!(travel.distance(), 4.0);

    assert_eq!(Connection::between(&a, &Segment::End), Connection::Break);
    assert_eq!(Connection::between(&Segment::End, &b).distance(), 0.0);
    let vertex: Segment = Segment::Vertex { id: 2 };
    assert_eq!(Connection::between(&vertex, &b), Connection::Vertex(2));
    assert_eq!(Connection::between(&a, &vertex).distance(), 0.0);
}
