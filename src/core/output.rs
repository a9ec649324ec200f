//! Console output: entries, the sink they are rendered to, and the history
//! used to clear them.

use std::any::Any;
use std::collections::VecDeque;

use bevy::color::{HexColorError, Srgba};
use bevy::prelude::*;

/// Semantic color of an output entry.
///
/// Named tags are resolved to concrete colors by the front-end through
/// [`ConsoleColors`](crate::config::ConsoleColors).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ColorTag {
    /// Regular text.
    #[default]
    Normal,
    /// Informational highlight (banners, help listings).
    Info,
    /// Warning text.
    Warning,
    /// Error text.
    Error,
    /// An explicit color.
    Custom(Srgba),
}

impl ColorTag {
    /// Parse a hex color such as `"FF8080"` or `"#FF8080FF"`.
    pub fn hex(hex: impl AsRef<str>) -> Result<Self, HexColorError> {
        Srgba::hex(hex).map(ColorTag::Custom)
    }
}

/// One line of console output.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputEntry {
    text: Box<str>,
    color: ColorTag,
}

impl OutputEntry {
    /// Create an entry, stripping carriage returns and line feeds.
    ///
    /// Returns `None` if nothing but whitespace remains.
    pub fn new(text: &str, color: ColorTag) -> Option<Self> {
        let text: String = text.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
        if text.trim().is_empty() {
            return None;
        }
        Some(Self {
            text: text.into_boxed_str(),
            color,
        })
    }

    /// The entry text. Never contains `\r` or `\n`.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The entry color.
    #[inline]
    pub fn color(&self) -> ColorTag {
        self.color
    }
}

/// Opaque handle to an entry owned by an [`OutputSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryHandle(pub u64);

/// The rendering surface console output is written to.
pub trait OutputSink: Send + Sync + 'static {
    /// Take ownership of an entry and return a handle to it.
    fn create_entry(&mut self, entry: OutputEntry) -> EntryHandle;

    /// Destroy a previously created entry. Unknown handles are ignored.
    fn destroy_entry(&mut self, handle: EntryHandle);

    /// Request that the view scrolls to the newest entry.
    fn scroll_to_latest(&mut self);

    /// Get as Any for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Get as Any for mutable downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// In-memory sink. This is the default sink and the one the egui overlay draws.
#[derive(Debug, Default)]
pub struct BufferSink {
    entries: VecDeque<(EntryHandle, OutputEntry)>,
    next_handle: u64,
    scroll_requested: bool,
}

impl BufferSink {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in creation order.
    pub fn entries(&self) -> impl Iterator<Item = &OutputEntry> {
        self.entries.iter().map(|(_, entry)| entry)
    }

    /// Get the number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` once per scroll request.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }
}

impl OutputSink for BufferSink {
    fn create_entry(&mut self, entry: OutputEntry) -> EntryHandle {
        let handle = EntryHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push_back((handle, entry));
        handle
    }

    fn destroy_entry(&mut self, handle: EntryHandle) {
        // Clearing destroys oldest first.
        if self.entries.front().is_some_and(|(h, _)| *h == handle) {
            self.entries.pop_front();
            return;
        }
        // Handles are issued in increasing order.
        if let Ok(index) = self.entries.binary_search_by_key(&handle, |(h, _)| *h) {
            self.entries.remove(index);
        }
    }

    fn scroll_to_latest(&mut self) {
        self.scroll_requested = true;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Ordered record of everything written to the console since the last clear.
///
/// Owns the [`OutputSink`]; entries can only be removed all at once.
#[derive(Resource)]
pub struct OutputHistory {
    handles: Vec<EntryHandle>,
    sink: Box<dyn OutputSink>,
}

impl Default for OutputHistory {
    fn default() -> Self {
        Self::new(BufferSink::default())
    }
}

impl OutputHistory {
    /// Create a history writing to `sink`.
    pub fn new(sink: impl OutputSink) -> Self {
        Self {
            handles: Vec::new(),
            sink: Box::new(sink),
        }
    }

    /// Write a line to the console.
    ///
    /// Line breaks are removed; whitespace-only text is dropped and returns `None`.
    pub fn append(&mut self, text: impl AsRef<str>, color: ColorTag) -> Option<EntryHandle> {
        let entry = OutputEntry::new(text.as_ref(), color)?;
        let handle = self.sink.create_entry(entry);
        self.handles.push(handle);
        self.sink.scroll_to_latest();
        Some(handle)
    }

    /// Write a line in the normal color.
    pub fn print(&mut self, text: impl AsRef<str>) -> Option<EntryHandle> {
        self.append(text, ColorTag::Normal)
    }

    /// Write a line in the warning color.
    pub fn warn(&mut self, text: impl AsRef<str>) -> Option<EntryHandle> {
        self.append(text, ColorTag::Warning)
    }

    /// Write a line in the error color.
    pub fn error(&mut self, text: impl AsRef<str>) -> Option<EntryHandle> {
        self.append(text, ColorTag::Error)
    }

    /// Destroy every entry and empty the history.
    pub fn clear_all(&mut self) {
        for handle in self.handles.drain(..) {
            self.sink.destroy_entry(handle);
        }
    }

    /// Handles in insertion order.
    pub fn handles(&self) -> &[EntryHandle] {
        &self.handles
    }

    /// Get the number of recorded entries.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Check if the history is empty.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Borrow the sink as a concrete type.
    pub fn sink_as<T: OutputSink>(&self) -> Option<&T> {
        self.sink.as_any().downcast_ref()
    }

    /// Mutably borrow the sink as a concrete type.
    pub fn sink_as_mut<T: OutputSink>(&mut self) -> Option<&mut T> {
        self.sink.as_any_mut().downcast_mut()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Sink that records every call it receives.
    #[derive(Default, Clone)]
    struct RecordingSink {
        calls: Arc<Mutex<Vec<String>>>,
        next: u64,
    }

    impl RecordingSink {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl OutputSink for RecordingSink {
        fn create_entry(&mut self, entry: OutputEntry) -> EntryHandle {
            self.next += 1;
            self.calls.lock().unwrap().push(format!("create {} {}", self.next, entry.text()));
            EntryHandle(self.next)
        }

        fn destroy_entry(&mut self, handle: EntryHandle) {
            self.calls.lock().unwrap().push(format!("destroy {}", handle.0));
        }

        fn scroll_to_latest(&mut self) {
            self.calls.lock().unwrap().push("scroll".into());
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_append_strips_line_breaks() {
        let mut history = OutputHistory::default();
        history.append("line1\r\nline2", ColorTag::Warning);

        let sink = history.sink_as::<BufferSink>().unwrap();
        let entries: Vec<_> = sink.entries().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text(), "line1line2");
        assert_eq!(entries[0].color(), ColorTag::Warning);
    }

    #[test]
    fn test_append_ignores_blank_text() {
        let mut history = OutputHistory::default();

        assert!(history.append("", ColorTag::Normal).is_none());
        assert!(history.append("  \t ", ColorTag::Normal).is_none());
        assert!(history.append("\r\n\n", ColorTag::Normal).is_none());
        assert!(history.is_empty());
    }

    #[test]
    fn test_append_scrolls_after_create() {
        let sink = RecordingSink::default();
        let mut history = OutputHistory::new(sink.clone());

        history.print("hello");
        history.error("oops");

        assert_eq!(
            sink.calls(),
            vec!["create 1 hello", "scroll", "create 2 oops", "scroll"]
        );
    }

    #[test]
    fn test_clear_all_destroys_every_handle() {
        let sink = RecordingSink::default();
        let mut history = OutputHistory::new(sink.clone());

        for i in 0..4 {
            history.print(format!("entry {i}"));
        }
        assert_eq!(history.len(), 4);

        history.clear_all();
        assert_eq!(history.len(), 0);

        let destroyed: Vec<_> = sink
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("destroy"))
            .collect();
        assert_eq!(destroyed, vec!["destroy 1", "destroy 2", "destroy 3", "destroy 4"]);
    }

    #[test]
    fn test_buffer_sink_clear_and_scroll_request() {
        let mut history = OutputHistory::default();
        history.print("a");
        history.print("b");

        {
            let sink = history.sink_as_mut::<BufferSink>().unwrap();
            assert!(sink.take_scroll_request());
            assert!(!sink.take_scroll_request());
        }

        history.clear_all();
        assert!(history.sink_as::<BufferSink>().unwrap().is_empty());

        // Handles keep increasing after a clear.
        let handle = history.print("c").unwrap();
        assert_eq!(handle, EntryHandle(2));
    }

    #[test]
    fn test_clear_large_buffer() {
        let mut history = OutputHistory::default();
        for i in 0..200_000 {
            history.print(format!("line {i}"));
        }
        assert_eq!(history.sink_as::<BufferSink>().unwrap().len(), 200_000);

        history.clear_all();
        assert!(history.is_empty());
        assert!(history.sink_as::<BufferSink>().unwrap().is_empty());
    }

    #[test]
    fn test_buffer_sink_destroy_out_of_order() {
        let mut sink = BufferSink::new();
        let a = sink.create_entry(OutputEntry::new("a", ColorTag::Normal).unwrap());
        let b = sink.create_entry(OutputEntry::new("b", ColorTag::Normal).unwrap());
        let c = sink.create_entry(OutputEntry::new("c", ColorTag::Normal).unwrap());

        sink.destroy_entry(b);
        sink.destroy_entry(EntryHandle(99));
        assert_eq!(sink.entries().map(OutputEntry::text).collect::<Vec<_>>(), vec!["a", "c"]);

        sink.destroy_entry(a);
        sink.destroy_entry(c);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_color_tag_hex() {
        assert_eq!(
            ColorTag::hex("FF0000").unwrap(),
            ColorTag::Custom(Srgba::rgb(1.0, 0.0, 0.0))
        );
        assert!(ColorTag::hex("not a color").is_err());
    }
}
