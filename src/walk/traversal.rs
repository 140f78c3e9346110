use super::{Entries, list};
use crate::error::Result;
use crate::storage::{AccessContext, Storage};
use crate::utils::paths::{is_reserved_entry, join_entry};
use std::iter::FusedIterator;
use tracing::{Level, debug, span, trace};

/// Depth-first, pre-order iterator over every path below a root.
///
/// Each suspended container is one frame on an explicit stack, holding its
/// open listing. Dropping the walker, or hitting an error, releases every
/// listing still on the stack.
///
/// Work after an emitted path (classifying it, opening it as a container)
/// is deferred to the following `next()` call, so a consumer that stops
/// after `k` paths never triggers listing calls beyond what those `k`
/// needed.
pub struct Walk<'a, S: Storage + ?Sized> {
    storage: &'a S,
    context: Option<AccessContext>,
    stack: Vec<Frame<'a>>,
    /// Last emitted path, not yet classified.
    pending: Option<(String, usize)>,
    max_depth: Option<usize>,
    finished: bool,
}

/// One suspended container.
struct Frame<'a> {
    entries: Entries<'a>,
    /// Depth of the entries this frame yields (root children are 1).
    depth: usize,
}

/// Walk the subtree rooted at `root`.
///
/// The root itself is opened immediately and is not part of the output.
///
/// # Errors
///
/// Returns [`crate::Error::NotFound`] or [`crate::Error::Access`] if the root
/// cannot be opened.
pub fn walk<'a, S: Storage + ?Sized>(
    storage: &'a S,
    root: &str,
    context: Option<&AccessContext>,
) -> Result<Walk<'a, S>> {
    Walk::new(storage, root, context)
}

impl<'a, S: Storage + ?Sized> Walk<'a, S> {
    /// Open `root` and prepare the traversal.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be opened.
    pub fn new(storage: &'a S, root: &str, context: Option<&AccessContext>) -> Result<Self> {
        let span = span!(Level::DEBUG, "walk", root);
        let _guard = span.enter();

        let entries = list(storage, root, context)?;
        debug!("opened traversal root");

        Ok(Self {
            storage,
            context: context.cloned(),
            stack: vec![Frame { entries, depth: 1 }],
            pending: None,
            max_depth: None,
            finished: false,
        })
    }

    /// Do not descend into containers deeper than `depth`.
    ///
    /// Containers at `depth` are still emitted, just not opened; `1` yields
    /// only the root's direct entries.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Number of containers currently open on the stack.
    #[must_use]
    pub fn open_frames(&self) -> usize {
        self.stack.len()
    }

    /// Push a frame for the previously emitted path if it is a container.
    fn descend_pending(&mut self) -> Result<()> {
        let Some((path, depth)) = self.pending.take() else {
            return Ok(());
        };
        if self.max_depth.is_some_and(|max| depth >= max) {
            return Ok(());
        }
        if !self.storage.is_container(&path, self.context.as_ref()) {
            return Ok(());
        }
        trace!(container = %path, depth, "descending");
        let entries = list(self.storage, &path, self.context.as_ref())?;
        self.stack.push(Frame {
            entries,
            depth: depth + 1,
        });
        Ok(())
    }

    /// Stop the walk, releasing every open listing.
    fn abort(&mut self) {
        self.finished = true;
        self.pending = None;
        // Innermost first
        while self.stack.pop().is_some() {}
    }
}

impl<S: Storage + ?Sized> Iterator for Walk<'_, S> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if let Err(e) = self.descend_pending() {
            self.abort();
            return Some(Err(e));
        }

        loop {
            let Some(frame) = self.stack.last_mut() else {
                self.finished = true;
                return None;
            };
            let depth = frame.depth;

            match frame.entries.next() {
                None => {
                    self.stack.pop();
                }
                Some(Err(e)) => {
                    self.abort();
                    return Some(Err(e));
                }
                Some(Ok(name)) if is_reserved_entry(&name) => {}
                Some(Ok(name)) => {
                    let full = join_entry(frame.entries.container(), &name);
                    self.pending = Some((full.clone(), depth));
                    return Some(Ok(full));
                }
            }
        }
    }
}

impl<S: Storage + ?Sized> FusedIterator for Walk<'_, S> {}

impl<S: Storage + ?Sized> Drop for Walk<'_, S> {
    fn drop(&mut self) {
        while self.stack.pop().is_some() {}
    }
}
