//! Incremental splitter for concatenated JSON objects.
//!
//! The completion service writes JSON objects back to back, optionally
//! separated by whitespace, with no array wrapper and no line framing:
//! ```text
//! {"response":{"kwargs":{"content":"Hel"}}}{"response":{"kwargs":{"content":"lo"}}}
//! ```
//! Network reads split this text at arbitrary points. [`JsonObjectSplitter`]
//! tracks brace depth and string/escape state so that braces inside string
//! values never end an object, and carries an incomplete trailing object
//! over to the next fragment.

/// A piece of decoded text classified by the splitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A brace-balanced top-level object (not yet validated as JSON).
    Object(String),
    /// Non-whitespace text found outside any object.
    Stray(String),
}

/// Scanner position relative to the object being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ScanState {
    #[default]
    Outside,
    InObject,
    InString,
    Escape,
}

/// Default bound on text buffered for one unfinished object.
pub const DEFAULT_MAX_PENDING: usize = 1 << 20;

/// Brace-depth and string-aware tokenizer yielding complete JSON object substrings.
///
/// A buffered object that can no longer be valid JSON is abandoned as
/// [`Segment::Stray`] and scanning restarts at the next `{`. This happens when
/// a `{` shows up where no value may start (after a `}` or a string that is
/// not a key's value), when the buffer outgrows its bound, or when the stream
/// ends. Objects that follow a truncated one are therefore still yielded.
#[derive(Debug)]
pub struct JsonObjectSplitter {
    state: ScanState,
    depth: usize,
    /// Last significant character of `current` outside strings.
    last: char,
    current: String,
    stray: String,
    max_pending: usize,
}

impl Default for JsonObjectSplitter {
    fn default() -> Self {
        Self {
            state: ScanState::Outside,
            depth: 0,
            last: '{',
            current: String::new(),
            stray: String::new(),
            max_pending: DEFAULT_MAX_PENDING,
        }
    }
}

impl JsonObjectSplitter {
    /// Create a splitter positioned outside any object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the bytes buffered for one unfinished object.
    #[must_use]
    pub fn max_pending(mut self, bytes: usize) -> Self {
        self.max_pending = bytes.max(1);
        self
    }

    /// Feed the next piece of decoded text and collect the segments it completes.
    ///
    /// Stray text is reported once per fragment. An object that is still
    /// open at the end of `text` stays buffered.
    pub fn push(&mut self, text: &str) -> Vec<Segment> {
        let mut segments = Vec::new();

        for c in text.chars() {
            match self.state {
                ScanState::Outside => {
                    if c == '{' {
                        self.flush_stray(&mut segments);
                        self.open(c);
                    } else if !c.is_whitespace() || !self.stray.is_empty() {
                        self.stray.push(c);
                    }
                }
                ScanState::InObject => match c {
                    '{' if !matches!(self.last, ':' | ',' | '[') => {
                        self.abandon(&mut segments);
                        self.open(c);
                    }
                    _ => {
                        self.current.push(c);
                        match c {
                            '"' => self.state = ScanState::InString,
                            '{' => self.depth += 1,
                            '}' => {
                                self.depth -= 1;
                                if self.depth == 0 {
                                    self.state = ScanState::Outside;
                                    segments.push(Segment::Object(std::mem::take(&mut self.current)));
                                }
                            }
                            _ => {}
                        }
                        if !c.is_whitespace() {
                            self.last = c;
                        }
                    }
                },
                ScanState::InString => {
                    self.current.push(c);
                    match c {
                        '\\' => self.state = ScanState::Escape,
                        '"' => self.state = ScanState::InObject,
                        _ => {}
                    }
                }
                ScanState::Escape => {
                    self.current.push(c);
                    self.state = ScanState::InString;
                }
            }

            if self.current.len() > self.max_pending {
                segments.extend(self.recover());
            }
        }

        self.flush_stray(&mut segments);
        segments
    }

    /// Drain whatever is buffered once the stream ends.
    ///
    /// An unterminated object can never become valid. Its text is reported as
    /// one stray segment, and any complete objects nested after its opening
    /// brace are yielded.
    pub fn finish(&mut self) -> Vec<Segment> {
        let mut segments = Vec::new();
        while self.has_partial() {
            for segment in self.recover() {
                match segment {
                    Segment::Stray(next) => match segments.last_mut() {
                        Some(Segment::Stray(prev)) => prev.push_str(&next),
                        _ => segments.push(Segment::Stray(next)),
                    },
                    object => segments.push(object),
                }
            }
        }
        self.flush_stray(&mut segments);
        segments
    }

    /// Whether part of an object is buffered waiting for more text.
    pub fn has_partial(&self) -> bool {
        !self.current.is_empty()
    }

    fn open(&mut self, c: char) {
        self.current.push(c);
        self.depth = 1;
        self.last = c;
        self.state = ScanState::InObject;
    }

    fn reset(&mut self) -> String {
        self.state = ScanState::Outside;
        self.depth = 0;
        self.last = '{';
        std::mem::take(&mut self.current)
    }

    /// Give up on the buffered object.
    fn abandon(&mut self, segments: &mut Vec<Segment>) {
        let dead = self.reset();
        let dead = dead.trim();
        if !dead.is_empty() {
            segments.push(Segment::Stray(dead.to_string()));
        }
    }

    /// Give up on the buffered object's opening brace and rescan the rest.
    fn recover(&mut self) -> Vec<Segment> {
        let pending = self.reset();
        let mut segments = Vec::new();
        match pending.get(1..).and_then(|tail| tail.find('{')) {
            Some(at) => {
                let (dead, rest) = pending.split_at(at + 1);
                segments.push(Segment::Stray(dead.trim().to_string()));
                segments.extend(self.push(rest));
            }
            None => segments.push(Segment::Stray(pending.trim().to_string())),
        }
        segments
    }

    fn flush_stray(&mut self, segments: &mut Vec<Segment>) {
        let stray = std::mem::take(&mut self.stray);
        let stray = stray.trim_end();
        if !stray.is_empty() {
            segments.push(Segment::Stray(stray.to_string()));
        }
    }
}

/// Split a complete piece of text in one go.
///
/// Any unterminated trailing object is reported as [`Segment::Stray`].
pub fn split_json_objects(text: &str) -> Vec<Segment> {
    let mut splitter = JsonObjectSplitter::new();
    let mut segments = splitter.push(text);
    segments.extend(splitter.finish());
    segments
}
