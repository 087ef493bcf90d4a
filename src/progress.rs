use std::io::{stderr, IsTerminal};
use std::time::Instant;
use tracing::{info, info_span, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

const PBAR_TEMPLATE: &str = "{span_child_prefix} {msg} {percent}% {wide_bar} [{human_pos}/{human_len}]";

fn setup_span_bar(span: &Span, total: u64, message: &'static str) {
    span.pb_set_message(message);
    span.pb_set_style(
        &indicatif::ProgressStyle::default_bar()
            .template(PBAR_TEMPLATE)
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar()),
    );
    span.pb_set_length(total);
}

/// Iterator adapter returned by [`progress_iter`].
pub struct ProgressIter<I> {
    inner: I,
    span: Span,
    message: &'static str,
    is_term: bool,
    start: Instant,
    finished: bool,
}

impl<I: Iterator> Iterator for ProgressIter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next() {
            Some(v) => {
                if self.is_term {
                    // The bar is shown from the first enter until the span is dropped.
                    let _entered = self.span.enter();
                    self.span.pb_inc(1);
                }
                Some(v)
            }
            None => {
                if !self.finished && !self.is_term {
                    info!("{} completed in {:#.1?}", self.message, self.start.elapsed());
                }
                self.finished = true;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Wraps a lazy iterator of `total` items in a progress bar attached to a tracing span.
///
/// When stderr is not a terminal no bar is drawn, and a single line with the
/// elapsed time is logged once the iterator is exhausted.
pub fn progress_iter<I: Iterator>(message: &'static str, total: u64, iterator: I) -> ProgressIter<I> {
    let span = info_span!("task", items = total);
    setup_span_bar(&span, total, message);
    ProgressIter {
        inner: iterator,
        span,
        message,
        is_term: stderr().is_terminal(),
        start: Instant::now(),
        finished: false,
    }
}
