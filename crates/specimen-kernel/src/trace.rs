//! Resolution tracing
//!
//! [`TracingBuilder`] reports every observed request on entry and every
//! result on exit, with the nesting depth of the request, to a
//! [`TraceSink`]. It never changes what the inner builder returns.
//!
//! Sinks provided here:
//! - [`LoggingTraceSink`]: forwards to `tracing` at TRACE level
//! - [`TraceWriter`]: renders indented lines to any [`io::Write`]
//! - [`RecordingTraceSink`]: keeps events in memory

use crate::builder::{BuilderNode, BuilderRef, CompositeSpecimenBuilder, SpecimenBuilder};
use crate::call_stack::ThreadScoped;
use crate::context::SpecimenContext;
use crate::error::SpecimenError;
use crate::request::Request;
use crate::specification::{SpecificationRef, TrueRequestSpecification};
use crate::specimen::Specimen;
use parking_lot::Mutex;
use std::fmt::{self, Display};
use std::io::{self, Write};
use std::sync::Arc;

/// Receiver of trace events
pub trait TraceSink: Send + Sync + fmt::Debug {
    /// A request entered the traced builder at `depth` (1 for the outermost)
    fn on_request(&self, request: &Request, depth: usize);

    /// The traced builder answered `request`, which was entered at `depth`
    fn on_created(&self, request: &Request, specimen: &Specimen, depth: usize);
}

/// Shared sink handle
pub type SinkRef = Arc<dyn TraceSink>;

/// Observability decorator
#[derive(Debug)]
pub struct TracingBuilder {
    builder: BuilderRef,
    sink: SinkRef,
    filter: SpecificationRef,
    depth: ThreadScoped<usize>,
}

impl TracingBuilder {
    /// Trace every request
    #[inline]
    #[must_use]
    pub fn new(builder: BuilderRef, sink: SinkRef) -> Self {
        Self {
            builder,
            sink,
            filter: Arc::new(TrueRequestSpecification),
            depth: ThreadScoped::new(),
        }
    }

    /// Only trace requests the filter accepts
    #[inline]
    #[must_use]
    pub fn with_filter(mut self, filter: SpecificationRef) -> Self {
        self.filter = filter;
        self
    }

    /// Inner builder
    #[inline]
    #[must_use]
    pub fn builder(&self) -> &BuilderRef {
        &self.builder
    }

    /// Event receiver
    #[inline]
    #[must_use]
    pub fn sink(&self) -> &SinkRef {
        &self.sink
    }
}

impl SpecimenBuilder for TracingBuilder {
    fn create(
        &self,
        request: &Request,
        context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        if !self.filter.is_satisfied_by(request) {
            return self.builder.create(request, context);
        }

        let depth = DepthGuard::enter(&self.depth);
        self.sink.on_request(request, depth.level);

        let result = self.builder.create(request, context);

        let level = depth.level;
        drop(depth);
        if let Ok(specimen) = &result {
            self.sink.on_created(request, specimen, level);
        }
        result
    }

    fn as_node(&self) -> Option<&dyn BuilderNode> {
        Some(self)
    }
}

impl BuilderNode for TracingBuilder {
    fn children(&self) -> Vec<BuilderRef> {
        vec![self.builder.clone()]
    }

    fn compose(&self, children: Vec<BuilderRef>) -> BuilderRef {
        Arc::new(
            Self::new(CompositeSpecimenBuilder::compose_if_multiple(children), self.sink.clone())
                .with_filter(self.filter.clone()),
        )
    }
}

/// Nesting level of one traced request
///
/// Steps the calling thread's depth back on drop and releases the thread's
/// slot once it reaches zero.
struct DepthGuard<'a> {
    depth: &'a ThreadScoped<usize>,
    level: usize,
}

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a ThreadScoped<usize>) -> Self {
        let level = depth.with(|d| {
            *d += 1;
            *d
        });
        Self { depth, level }
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        let outermost = self.depth.with(|d| {
            *d = d.saturating_sub(1);
            *d == 0
        });
        if outermost {
            self.depth.clear();
        }
    }
}

/// Forwards trace events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingTraceSink;

impl TraceSink for LoggingTraceSink {
    fn on_request(&self, request: &Request, depth: usize) {
        tracing::trace!(depth, %request, "specimen requested");
    }

    fn on_created(&self, request: &Request, specimen: &Specimen, depth: usize) {
        tracing::trace!(depth, %request, %specimen, "specimen created");
    }
}

/// Line formatter: rendered item and zero-based indent level
pub type TraceFormatter = Arc<dyn Fn(&dyn Display, usize) -> String + Send + Sync>;

fn indent_two_spaces(item: &dyn Display, level: usize) -> String {
    format!("{}{item}", " ".repeat(level * 2))
}

/// Writes one line per request and per created specimen
///
/// Both lines of a request share its indent level: zero for the outermost
/// request. Default formatters indent two spaces per level.
pub struct TraceWriter<W> {
    out: Mutex<W>,
    request_formatter: TraceFormatter,
    created_formatter: TraceFormatter,
}

impl<W: io::Write + Send> TraceWriter<W> {
    /// Create writer with the default formatters
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            request_formatter: Arc::new(indent_two_spaces),
            created_formatter: Arc::new(indent_two_spaces),
        }
    }

    /// Replace the request line formatter
    #[must_use]
    pub fn with_request_formatter<F>(mut self, f: F) -> Self
    where
        F: Fn(&dyn Display, usize) -> String + Send + Sync + 'static,
    {
        self.request_formatter = Arc::new(f);
        self
    }

    /// Replace the created-specimen line formatter
    #[must_use]
    pub fn with_created_formatter<F>(mut self, f: F) -> Self
    where
        F: Fn(&dyn Display, usize) -> String + Send + Sync + 'static,
    {
        self.created_formatter = Arc::new(f);
        self
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn write_line(&self, line: &str) {
        if let Err(err) = writeln!(self.out.lock(), "{line}") {
            tracing::warn!(error = %err, "failed to write trace line");
        }
    }
}

impl<W> fmt::Debug for TraceWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceWriter").finish_non_exhaustive()
    }
}

impl<W: io::Write + Send> TraceSink for TraceWriter<W> {
    fn on_request(&self, request: &Request, depth: usize) {
        self.write_line(&(self.request_formatter)(request, depth.saturating_sub(1)));
    }

    fn on_created(&self, _request: &Request, specimen: &Specimen, depth: usize) {
        self.write_line(&(self.created_formatter)(specimen, depth.saturating_sub(1)));
    }
}

/// Recorded trace event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// Request entered
    Requested {
        /// The request
        request: Request,
        /// Nesting depth
        depth: usize,
    },

    /// Request answered
    Created {
        /// The request
        request: Request,
        /// The result
        specimen: Specimen,
        /// Nesting depth
        depth: usize,
    },
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingTraceSink {
    events: Mutex<Vec<TraceEvent>>,
}

impl RecordingTraceSink {
    /// Create empty recorder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events so far, in emission order
    #[must_use]
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().clone()
    }
}

impl TraceSink for RecordingTraceSink {
    fn on_request(&self, request: &Request, depth: usize) {
        self.events.lock().push(TraceEvent::Requested {
            request: request.clone(),
            depth,
        });
    }

    fn on_created(&self, request: &Request, specimen: &Specimen, depth: usize) {
        self.events.lock().push(TraceEvent::Created {
            request: request.clone(),
            specimen: specimen.clone(),
            depth,
        });
    }
}
