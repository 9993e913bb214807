//! Byte-at-a-time splitter for array elements
//!
//! Finds the boundaries of top-level objects in a JSON array without parsing
//! them. The state machine tracks whether it is inside a quoted string
//! (honouring backslash escapes) and the nesting depth of `{`/`[`, so braces
//! and brackets inside string values never move a boundary.
//!
//! Only bytes of an element in progress are buffered. Bytes between elements
//! (separators, whitespace, stray closers) are dropped.

use tracing::trace;

use crate::{BoardError, Result};

/// Event produced by [`ObjectSplitter::push`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Boundary {
    /// Bytes of one complete top-level object, braces included
    Object(Vec<u8>),
    /// An object larger than the buffer limit; its bytes were discarded
    Oversized { bytes: usize },
    /// The enclosing array closed
    ArrayClose,
}

/// Incremental object boundary finder.
#[derive(Debug)]
pub struct ObjectSplitter {
    max_object_bytes: usize,
    buffer: Vec<u8>,
    depth: usize,
    /// Nesting of non-object elements (`[[1,2],{...}]`) seen between objects
    skip_depth: usize,
    in_string: bool,
    escaped: bool,
    oversized: bool,
    object_bytes: usize,
}

impl ObjectSplitter {
    pub fn new(max_object_bytes: usize) -> Self {
        Self {
            max_object_bytes,
            buffer: Vec::new(),
            depth: 0,
            skip_depth: 0,
            in_string: false,
            escaped: false,
            oversized: false,
            object_bytes: 0,
        }
    }

    /// True when no element is in progress.
    pub fn is_between_elements(&self) -> bool {
        self.depth == 0 && self.skip_depth == 0 && !self.in_string
    }

    /// Feed one byte.
    pub fn push(&mut self, byte: u8) -> Result<Option<Boundary>> {
        if self.depth > 0 {
            return self.push_in_object(byte);
        }

        if self.in_string {
            self.advance_string(byte);
            return Ok(None);
        }

        match byte {
            b'"' => self.in_string = true,
            b'{' if self.skip_depth == 0 => {
                self.depth = 1;
                self.object_bytes = 0;
                self.oversized = false;
                self.accumulate(byte)?;
            }
            b'{' | b'[' => self.skip_depth += 1,
            b'}' | b']' if self.skip_depth > 0 => self.skip_depth -= 1,
            b']' => return Ok(Some(Boundary::ArrayClose)),
            _ => {}
        }
        Ok(None)
    }

    fn push_in_object(&mut self, byte: u8) -> Result<Option<Boundary>> {
        self.accumulate(byte)?;

        if self.in_string {
            self.advance_string(byte);
            return Ok(None);
        }

        match byte {
            b'"' => self.in_string = true,
            b'{' | b'[' => self.depth += 1,
            b'}' | b']' => {
                self.depth -= 1;
                if self.depth == 0 {
                    return Ok(Some(self.finish_object()));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn advance_string(&mut self, byte: u8) {
        if self.escaped {
            self.escaped = false;
        } else if byte == b'\\' {
            self.escaped = true;
        } else if byte == b'"' {
            self.in_string = false;
        }
    }

    fn accumulate(&mut self, byte: u8) -> Result<()> {
        self.object_bytes += 1;
        if self.oversized {
            return Ok(());
        }
        if self.buffer.len() >= self.max_object_bytes {
            trace!(limit = self.max_object_bytes, "Element exceeds buffer limit, discarding");
            self.oversized = true;
            self.buffer = Vec::new();
            return Ok(());
        }
        self.buffer
            .try_reserve(1)
            .map_err(|e| BoardError::out_of_memory("array element", e))?;
        self.buffer.push(byte);
        Ok(())
    }

    fn finish_object(&mut self) -> Boundary {
        if self.oversized {
            self.oversized = false;
            Boundary::Oversized { bytes: self.object_bytes }
        } else {
            Boundary::Object(std::mem::take(&mut self.buffer))
        }
    }

    /// Release the partial element buffer, e.g. before a retry.
    pub fn reclaim(&mut self) {
        self.buffer = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed everything after the array's opening bracket, as the scanner does.
    fn split(input: &[u8], limit: usize) -> Vec<Boundary> {
        let mut splitter = ObjectSplitter::new(limit);
        let body = input.strip_prefix(b"[").unwrap_or(input);
        body.iter().filter_map(|&b| splitter.push(b).unwrap()).collect()
    }

    fn object(text: &str) -> Boundary {
        Boundary::Object(text.as_bytes().to_vec())
    }

    #[test]
    fn splits_flat_objects() {
        let events = split(br#"[{"a":1}, {"b":2}]"#, 1024);
        assert_eq!(events, vec![object(r#"{"a":1}"#), object(r#"{"b":2}"#), Boundary::ArrayClose]);
    }

    #[test]
    fn nested_objects_and_arrays_stay_inside_one_element() {
        let input = r#"[{"d":{"x":[1,{"y":2}]},"z":[]},{"e":0}]"#;
        let events = split(input.as_bytes(), 1024);
        assert_eq!(
            events,
            vec![
                object(r#"{"d":{"x":[1,{"y":2}]},"z":[]}"#),
                object(r#"{"e":0}"#),
                Boundary::ArrayClose
            ]
        );
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let input = r#"[{"name":"}{][","q":"say \"}\" \\"},{"k":"]"}]"#;
        let events = split(input.as_bytes(), 1024);
        assert_eq!(
            events,
            vec![
                object(r#"{"name":"}{][","q":"say \"}\" \\"}"#),
                object(r#"{"k":"]"}"#),
                Boundary::ArrayClose
            ]
        );
    }

    #[test]
    fn non_object_elements_do_not_close_the_array() {
        let input = r#"[[1,2],"]",3,{"a":1}]"#;
        let events = split(input.as_bytes(), 1024);
        assert_eq!(events, vec![object(r#"{"a":1}"#), Boundary::ArrayClose]);
    }

    #[test]
    fn oversized_elements_are_reported_not_buffered() {
        let input = r#"[{"long":"abcdefghijklmnop"},{"a":1}]"#;
        let events = split(input.as_bytes(), 8);
        assert_eq!(
            events,
            vec![Boundary::Oversized { bytes: 27 }, object(r#"{"a":1}"#), Boundary::ArrayClose]
        );
    }

    #[test]
    fn stray_closers_between_elements_are_dropped() {
        let events = split(br#"1}, {"a":1}"#, 64);
        assert_eq!(events, vec![object(r#"{"a":1}"#)]);
    }

    #[test]
    fn truncated_object_produces_nothing() {
        let mut splitter = ObjectSplitter::new(64);
        let events: Vec<_> =
            br#"{"a":1},{"b":"#.iter().filter_map(|&b| splitter.push(b).unwrap()).collect();
        assert_eq!(events, vec![object(r#"{"a":1}"#)]);
        assert!(!splitter.is_between_elements());
    }
}
