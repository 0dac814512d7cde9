//! Search tracing and trace persistence.
//!
//! A [`Trace`] collects [`SearchEvent`]s while a scan or a search runs, so
//! an external viewer can replay how intervals were split and vertices
//! were settled. [`TraceEncoder`] and [`TraceDecoder`] move events through
//! a byte stream.
//!
//! ## Wire format
//!
//! Each event is written as:
//! ```text
//! [payload_len: u32 LE]
//! [tag: u8]
//! tag 0, IntervalPushed: [row: i32] [left: i64 i64] [right: i64 i64]
//! tag 1, Successor:      [from: i32 i32] [to: i32 i32]
//! tag 2, Visited:        [vertex: i32 i32] [distance: f64]
//! tag 3, Relaxed:        [from: i32 i32] [to: i32 i32] [distance: f64]
//! ```
//! Fractions are written as numerator then denominator, all values little
//! endian. `payload_len` counts the tag byte.

use std::io::{self, Read, Write};

use anyangle_core::{Fraction, Point};

const TAG_INTERVAL: u8 = 0;
const TAG_SUCCESSOR: u8 = 1;
const TAG_VISITED: u8 = 2;
const TAG_RELAXED: u8 = 3;

/// Largest `payload_len` any event carries: the interval event plus its tag.
const MAX_EVENT_LEN: usize = 1 + 4 + 32;

/// One observable step of a scan or search.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchEvent {
    /// The scanner queued the interval `[left, right]` on `row`.
    IntervalPushed {
        row: i32,
        left: Fraction,
        right: Fraction,
    },
    /// The scanner found `to` visible from `from`.
    Successor { from: Point, to: Point },
    /// The search finalized `vertex`.
    Visited { vertex: Point, distance: f64 },
    /// The search lowered the distance of `to` by jumping from `from`.
    Relaxed { from: Point, to: Point, distance: f64 },
}

impl SearchEvent {
    fn tag(&self) -> u8 {
        match self {
            Self::IntervalPushed { .. } => TAG_INTERVAL,
            Self::Successor { .. } => TAG_SUCCESSOR,
            Self::Visited { .. } => TAG_VISITED,
            Self::Relaxed { .. } => TAG_RELAXED,
        }
    }

    fn payload_len(tag: u8) -> Option<usize> {
        match tag {
            TAG_INTERVAL => Some(4 + 32),
            TAG_SUCCESSOR => Some(16),
            TAG_VISITED => Some(8 + 8),
            TAG_RELAXED => Some(16 + 8),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Trace
// ---------------------------------------------------------------------------

/// An event recorder, disabled unless switched on.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    enabled: bool,
    events: Vec<SearchEvent>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that is already enabled.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Append an event if recording.
    #[inline]
    pub fn record(&mut self, event: SearchEvent) {
        if self.enabled {
            self.events.push(event);
        }
    }

    pub fn events(&self) -> &[SearchEvent] {
        &self.events
    }

    /// Remove and return the recorded events.
    pub fn take(&mut self) -> Vec<SearchEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Write every recorded event to `writer`.
    pub fn write_to<W: Write>(&self, writer: W) -> io::Result<()> {
        let mut enc = TraceEncoder::new(writer);
        for ev in &self.events {
            enc.encode(ev)?;
        }
        enc.flush()
    }
}

// ---------------------------------------------------------------------------
// TraceEncoder
// ---------------------------------------------------------------------------

/// Encodes [`SearchEvent`]s to a byte-oriented writer.
pub struct TraceEncoder<W: Write> {
    writer: W,
}

impl<W: Write> TraceEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write a single event.
    pub fn encode(&mut self, event: &SearchEvent) -> io::Result<()> {
        let tag = event.tag();
        let len = SearchEvent::payload_len(tag).unwrap_or(0) as u32 + 1;
        let mut buf = Vec::with_capacity(4 + len as usize);
        buf.extend_from_slice(&len.to_le_bytes());
        buf.push(tag);
        match *event {
            SearchEvent::IntervalPushed { row, left, right } => {
                buf.extend_from_slice(&row.to_le_bytes());
                for f in [left, right] {
                    buf.extend_from_slice(&f.numer().to_le_bytes());
                    buf.extend_from_slice(&f.denom().to_le_bytes());
                }
            }
            SearchEvent::Successor { from, to } => {
                put_point(&mut buf, from);
                put_point(&mut buf, to);
            }
            SearchEvent::Visited { vertex, distance } => {
                put_point(&mut buf, vertex);
                buf.extend_from_slice(&distance.to_le_bytes());
            }
            SearchEvent::Relaxed { from, to, distance } => {
                put_point(&mut buf, from);
                put_point(&mut buf, to);
                buf.extend_from_slice(&distance.to_le_bytes());
            }
        }
        self.writer.write_all(&buf)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn put_point(buf: &mut Vec<u8>, p: Point) {
    buf.extend_from_slice(&p.x.to_le_bytes());
    buf.extend_from_slice(&p.y.to_le_bytes());
}

// ---------------------------------------------------------------------------
// TraceDecoder
// ---------------------------------------------------------------------------

/// Decodes [`SearchEvent`]s from a byte-oriented reader.
pub struct TraceDecoder<R: Read> {
    reader: R,
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

/// Reads fixed-size little-endian fields off a payload.
struct Cursor<'a> {
    data: &'a [u8],
    off: usize,
}

impl Cursor<'_> {
    fn bytes<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let end = self.off + N;
        let chunk = self
            .data
            .get(self.off..end)
            .ok_or_else(|| invalid("event truncated"))?;
        self.off = end;
        let mut out = [0u8; N];
        out.copy_from_slice(chunk);
        Ok(out)
    }

    fn i32(&mut self) -> io::Result<i32> {
        self.bytes().map(i32::from_le_bytes)
    }

    fn i64(&mut self) -> io::Result<i64> {
        self.bytes().map(i64::from_le_bytes)
    }

    fn f64(&mut self) -> io::Result<f64> {
        self.bytes().map(f64::from_le_bytes)
    }

    fn point(&mut self) -> io::Result<Point> {
        Ok(Point::new(self.i32()?, self.i32()?))
    }

    fn fraction(&mut self) -> io::Result<Fraction> {
        let numer = self.i64()?;
        let denom = self.i64()?;
        Fraction::try_new(numer, denom).map_err(|e| invalid(e.to_string()))
    }
}

impl<R: Read> TraceDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read the next event, or `None` at EOF.
    pub fn decode(&mut self) -> io::Result<Option<SearchEvent>> {
        let mut len_buf = [0u8; 4];
        match self.reader.read_exact(&mut len_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e),
        }
        let len = u32::from_le_bytes(len_buf) as usize;
        if len == 0 {
            return Err(invalid("empty event"));
        }
        if len > MAX_EVENT_LEN {
            return Err(invalid(format!("event of {len} bytes exceeds {MAX_EVENT_LEN}")));
        }
        let mut data = vec![0u8; len];
        self.reader.read_exact(&mut data)?;

        let tag = data[0];
        let expected = SearchEvent::payload_len(tag)
            .ok_or_else(|| invalid(format!("unknown event tag {tag}")))?;
        if len != expected + 1 {
            return Err(invalid(format!(
                "event size mismatch: expected {} bytes, got {}",
                expected + 1,
                len
            )));
        }

        let mut c = Cursor {
            data: &data,
            off: 1,
        };
        let event = match tag {
            TAG_INTERVAL => SearchEvent::IntervalPushed {
                row: c.i32()?,
                left: c.fraction()?,
                right: c.fraction()?,
            },
            TAG_SUCCESSOR => SearchEvent::Successor {
                from: c.point()?,
                to: c.point()?,
            },
            TAG_VISITED => SearchEvent::Visited {
                vertex: c.point()?,
                distance: c.f64()?,
            },
            _ => SearchEvent::Relaxed {
                from: c.point()?,
                to: c.point()?,
                distance: c.f64()?,
            },
        };
        Ok(Some(event))
    }

    /// Read every remaining event.
    pub fn decode_all(&mut self) -> io::Result<Vec<SearchEvent>> {
        let mut events = Vec::new();
        while let Some(ev) = self.decode()? {
            events.push(ev);
        }
        Ok(events)
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<SearchEvent> {
        vec![
            SearchEvent::IntervalPushed {
                row: 3,
                left: Fraction::new(-5, 3),
                right: Fraction::whole(4),
            },
            SearchEvent::Successor {
                from: Point::new(0, 0),
                to: Point::new(2, 1),
            },
            SearchEvent::Visited {
                vertex: Point::new(2, 1),
                distance: 2.25,
            },
            SearchEvent::Relaxed {
                from: Point::new(2, 1),
                to: Point::new(-1, 7),
                distance: f64::INFINITY,
            },
        ]
    }

    #[test]
    fn disabled_trace_records_nothing() {
        let mut t = Trace::new();
        t.record(sample()[0]);
        assert!(t.is_empty());
        t.set_enabled(true);
        t.record(sample()[0]);
        assert_eq!(t.len(), 1);
        assert_eq!(t.take(), vec![sample()[0]]);
        assert!(t.is_empty());
    }

    #[test]
    fn round_trip_events() {
        let mut t = Trace::enabled();
        for ev in sample() {
            t.record(ev);
        }
        let mut buf = Vec::new();
        t.write_to(&mut buf).unwrap();

        let mut dec = TraceDecoder::new(buf.as_slice());
        assert_eq!(dec.decode_all().unwrap(), sample());
        assert!(dec.decode().unwrap().is_none());
    }

    #[test]
    fn empty_stream_is_eof() {
        let mut dec = TraceDecoder::new(&[][..]);
        assert!(dec.decode().unwrap().is_none());
    }

    #[test]
    fn unknown_tag_is_invalid_data() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.push(9);
        let err = TraceDecoder::new(buf.as_slice()).decode().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn size_mismatch_is_invalid_data() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&3u32.to_le_bytes());
        buf.extend_from_slice(&[TAG_VISITED, 0, 0]);
        let err = TraceDecoder::new(buf.as_slice()).decode().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn zero_denominator_is_invalid_data() {
        let mut buf = Vec::new();
        TraceEncoder::new(&mut buf)
            .encode(&SearchEvent::IntervalPushed {
                row: 0,
                left: Fraction::ZERO,
                right: Fraction::ZERO,
            })
            .unwrap();
        // Overwrite the denominator of `left` (after len, tag, row, numer).
        buf[4 + 1 + 4 + 8..4 + 1 + 4 + 16].copy_from_slice(&0i64.to_le_bytes());
        let err = TraceDecoder::new(buf.as_slice()).decode().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn oversized_length_is_rejected_before_reading() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&u32::MAX.to_le_bytes());
        buf.push(TAG_INTERVAL);
        let err = TraceDecoder::new(buf.as_slice()).decode().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let mut buf = Vec::new();
        buf.extend_from_slice(&(MAX_EVENT_LEN as u32 + 1).to_le_bytes());
        buf.resize(4 + MAX_EVENT_LEN + 1, 0);
        let err = TraceDecoder::new(buf.as_slice()).decode().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn largest_event_fits_the_length_limit() {
        for tag in 0..=TAG_RELAXED {
            let len = SearchEvent::payload_len(tag).unwrap() + 1;
            assert!(len <= MAX_EVENT_LEN);
        }
        let mut buf = Vec::new();
        TraceEncoder::new(&mut buf).encode(&sample()[0]).unwrap();
        assert_eq!(buf.len(), 4 + MAX_EVENT_LEN);
    }

    #[test]
    fn truncated_payload_is_error() {
        let mut buf = Vec::new();
        TraceEncoder::new(&mut buf).encode(&sample()[1]).unwrap();
        buf.truncate(buf.len() - 2);
        assert!(TraceDecoder::new(buf.as_slice()).decode().is_err());
    }
}
