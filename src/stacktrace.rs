use sentry::protocol::{Frame, Stacktrace};

/// Crates whose frames sit between the logging call and the point where
/// the stack is captured: this crate and the capture machinery.
pub const OWN_MODULES: &[&str] = &[
    env!("CARGO_CRATE_NAME"),
    "sentry",
    "sentry_core",
    "sentry_backtrace",
    "backtrace",
];

/// Crates making up the structured-logging library.
pub const LOGGER_MODULES: &[&str] = &["tracing", "tracing_core", "tracing_subscriber"];

/// Standard library crates. `tracing` reaches the writer through
/// thread-locals and `io::Write`, so these frames are interleaved with the
/// logging library's own.
pub const RUNTIME_MODULES: &[&str] = &["std", "core", "alloc"];

/// Removes adapter and logging-library frames from a captured stack so
/// that the innermost remaining frame is the code that emitted the log
/// record.
///
/// Frames are expected outermost first, which is how Sentry orders them.
/// Trimming is a heuristic: the stack is the one of the current write, not
/// of the place where the logged error was created.
#[derive(Debug, Clone, Copy)]
pub struct StackTrimmer {
    own_modules: &'static [&'static str],
    logger_modules: &'static [&'static str],
    runtime_modules: &'static [&'static str],
}

impl Default for StackTrimmer {
    fn default() -> Self {
        StackTrimmer::new(OWN_MODULES, LOGGER_MODULES, RUNTIME_MODULES)
    }
}

impl StackTrimmer {
    pub const fn new(
        own_modules: &'static [&'static str],
        logger_modules: &'static [&'static str],
        runtime_modules: &'static [&'static str],
    ) -> Self {
        StackTrimmer {
            own_modules,
            logger_modules,
            runtime_modules,
        }
    }

    fn is_own(&self, frame: &Frame) -> bool {
        frame_module(frame).is_some_and(|module| self.own_modules.contains(&module))
    }

    fn is_logger(&self, frame: &Frame) -> bool {
        frame_module(frame).is_some_and(|module| self.logger_modules.contains(&module))
    }

    fn is_runtime(&self, frame: &Frame) -> bool {
        frame_module(frame).is_some_and(|module| self.runtime_modules.contains(&module))
    }

    /// Index of the last frame to keep.
    pub fn threshold(&self, frames: &[Frame]) -> usize {
        trim_threshold(
            frames,
            |f| self.is_own(f),
            |f| self.is_logger(f),
            |f| self.is_runtime(f),
        )
    }

    pub fn trim(&self, mut stacktrace: Stacktrace) -> Stacktrace {
        let threshold = self.threshold(&stacktrace.frames);
        stacktrace.frames.truncate(threshold + 1);
        stacktrace
    }
}

/// Computes the trimming threshold over `frames` (outermost first).
///
/// Walks back from the innermost frame past every frame matching `is_own`,
/// never below index 0. Then looks for a logging-library frame at or before
/// that point; when one is found, the threshold moves to the first earlier
/// frame that is neither part of the library nor matching `is_runtime`. If
/// those frames run all the way down to index 0 the threshold stays where
/// the first pass left it.
pub fn trim_threshold<T>(
    frames: &[T],
    is_own: impl Fn(&T) -> bool,
    is_logger: impl Fn(&T) -> bool,
    is_runtime: impl Fn(&T) -> bool,
) -> usize {
    let Some(mut threshold) = frames.len().checked_sub(1) else {
        return 0;
    };

    while threshold > 0 && is_own(&frames[threshold]) {
        threshold -= 1;
    }

    if let Some(logger_frame) = (1..=threshold).rev().find(|&i| is_logger(&frames[i])) {
        if let Some(caller) = (0..logger_frame)
            .rev()
            .find(|&j| !is_logger(&frames[j]) && !is_runtime(&frames[j]))
        {
            threshold = caller;
        }
    }

    threshold
}

/// Crate a frame originates from: the crate segment of `module` when the
/// symbolizer filled it, otherwise the one of the demangled function path.
pub fn frame_module(frame: &Frame) -> Option<&str> {
    frame
        .module
        .as_deref()
        .or(frame.function.as_deref())
        .map(crate_of)
        .filter(|krate| !krate.is_empty())
}

/// `<&mut tracing_subscriber::fmt::Layer<S> as tracing_subscriber::layer::Layer<S>>::on_event`
/// belongs to `tracing_subscriber`.
fn crate_of(path: &str) -> &str {
    let mut path = path.trim_start();
    loop {
        let stripped = path
            .strip_prefix('<')
            .or_else(|| path.strip_prefix('&'))
            .or_else(|| path.strip_prefix("mut "))
            .or_else(|| path.strip_prefix("dyn "))
            .or_else(|| path.strip_prefix("impl "));
        match stripped {
            Some(rest) => path = rest.trim_start(),
            None => break,
        }
    }
    let end = path
        .find(|c: char| c == ':' || c == '<' || c == ' ' || c == '>')
        .unwrap_or(path.len());
    &path[..end]
}

/// Captures the stack of the current thread and trims it.
pub fn capture_stacktrace() -> Option<Stacktrace> {
    let stacktrace = sentry::integrations::backtrace::current_stacktrace()?;
    let trimmed = StackTrimmer::default().trim(stacktrace);
    if trimmed.frames.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
