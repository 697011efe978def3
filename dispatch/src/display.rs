// curvegraph/dispatch/src/display.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Shared native display connections.
//!
//! Windows on the same display share one native connection. The pool hands out owning
//! `DisplayHandle`s, and `DisplayPool::release()` is where ownership ends: when the last owner
//! of a display opened with `destroy_when_unused` is released, the connection is closed.
//! Displays opened without it stay open until `shutdown()`.
//!
//! Each display has its own screen registry, filled lazily from the native factory.

use fxhash::FxHashMap;
use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Weak};

/// Opens and closes native display connections.
pub trait NativeDisplayFactory {
    type Connection;

    fn open(&mut self, name: &str) -> Result<Self::Connection, NativeDisplayError>;

    /// The size in pixels of screen `index`, or `None` if the display has no such screen.
    fn screen_size(&mut self, connection: &Self::Connection, index: usize) -> Option<(u32, u32)>;

    fn close(&mut self, connection: Self::Connection);
}

/// An error reported by the native windowing system.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeDisplayError {
    pub code: u32,
    pub message: String,
}

impl Display for NativeDisplayError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "{} (error 0x{:x})", self.message, self.code)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DisplayError {
    OpenFailed { name: String, error: NativeDisplayError },
    /// The handle refers to a display connection that has since been closed.
    UnknownDisplay { name: String },
    NoSuchScreen { display: String, index: usize },
}

impl Display for DisplayError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            DisplayError::OpenFailed { ref name, ref error } => {
                write!(formatter, "failed to open display {:?}: {}", name, error)
            }
            DisplayError::UnknownDisplay { ref name } => {
                write!(formatter, "display {:?} is not open in this pool", name)
            }
            DisplayError::NoSuchScreen { ref display, index } => {
                write!(formatter, "display {:?} has no screen {}", display, index)
            }
        }
    }
}

impl Error for DisplayError {}

#[derive(Debug)]
struct DisplayShared {
    id: u64,
    name: String,
}

/// An owning reference to an open display.
#[derive(Clone, Debug)]
pub struct DisplayHandle {
    shared: Arc<DisplayShared>,
}

impl DisplayHandle {
    #[inline]
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Identifies the connection. A display reopened after being closed gets a new ID.
    #[inline]
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    #[inline]
    pub fn downgrade(&self) -> WeakDisplay {
        WeakDisplay { shared: Arc::downgrade(&self.shared) }
    }
}

/// A non-owning reference that doesn't keep a display open.
#[derive(Clone, Debug)]
pub struct WeakDisplay {
    shared: Weak<DisplayShared>,
}

impl WeakDisplay {
    #[inline]
    pub fn upgrade(&self) -> Option<DisplayHandle> {
        self.shared.upgrade().map(|shared| DisplayHandle { shared })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Screen {
    pub index: usize,
    pub width: u32,
    pub height: u32,
}

struct DisplayEntry<C> {
    id: u64,
    connection: C,
    destroy_when_unused: bool,
    owners: Weak<DisplayShared>,
    screens: FxHashMap<usize, Screen>,
}

pub struct DisplayPool<F> where F: NativeDisplayFactory {
    factory: F,
    entries: FxHashMap<String, DisplayEntry<F::Connection>>,
    next_id: u64,
}

impl<F> DisplayPool<F> where F: NativeDisplayFactory {
    pub fn new(factory: F) -> DisplayPool<F> {
        DisplayPool { factory, entries: FxHashMap::default(), next_id: 0 }
    }

    #[inline]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    #[inline]
    pub fn open_count(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_open(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns an owning handle to display `name`, connecting to it if necessary.
    ///
    /// `destroy_when_unused` only takes effect when the connection is first made.
    pub fn open(&mut self, name: &str, destroy_when_unused: bool)
                -> Result<DisplayHandle, DisplayError> {
        if let Some(entry) = self.entries.get_mut(name) {
            if let Some(shared) = entry.owners.upgrade() {
                return Ok(DisplayHandle { shared });
            }
            // A retained display whose owners have all been released.
            let shared = Arc::new(DisplayShared { id: entry.id, name: name.to_owned() });
            entry.owners = Arc::downgrade(&shared);
            return Ok(DisplayHandle { shared });
        }

        let connection = self.factory.open(name).map_err(|error| {
            warn!("failed to open display {:?}: {}", name, error);
            DisplayError::OpenFailed { name: name.to_owned(), error }
        })?;
        let id = self.next_id;
        self.next_id += 1;
        let shared = Arc::new(DisplayShared { id, name: name.to_owned() });
        self.entries.insert(name.to_owned(), DisplayEntry {
            id,
            connection,
            destroy_when_unused,
            owners: Arc::downgrade(&shared),
            screens: FxHashMap::default(),
        });
        info!("opened display {:?}", name);
        Ok(DisplayHandle { shared })
    }

    /// Gives up one owning handle. Returns true if this closed the native connection.
    pub fn release(&mut self, handle: DisplayHandle) -> Result<bool, DisplayError> {
        let name = handle.shared.name.clone();
        match self.entries.get(&name) {
            Some(entry) if entry.id == handle.shared.id => {}
            _ => return Err(DisplayError::UnknownDisplay { name }),
        }

        let last_owner = Arc::strong_count(&handle.shared) == 1;
        drop(handle);
        if !last_owner {
            return Ok(false);
        }
        let destroy = self.entries.get(&name).map_or(false, |entry| entry.destroy_when_unused);
        if !destroy {
            debug!("display {:?} has no owners but is retained", name);
            return Ok(false);
        }
        if let Some(entry) = self.entries.remove(&name) {
            self.factory.close(entry.connection);
            info!("closed unused display {:?}", name);
        }
        Ok(true)
    }

    /// Returns screen `index` of `display`.
    pub fn screen(&mut self, display: &DisplayHandle, index: usize)
                  -> Result<Screen, DisplayError> {
        let factory = &mut self.factory;
        let entry = match self.entries.get_mut(display.name()) {
            Some(entry) if entry.id == display.id() => entry,
            _ => return Err(DisplayError::UnknownDisplay { name: display.name().to_owned() }),
        };
        if let Some(screen) = entry.screens.get(&index) {
            return Ok(*screen);
        }
        match factory.screen_size(&entry.connection, index) {
            Some((width, height)) => {
                let screen = Screen { index, width, height };
                entry.screens.insert(index, screen);
                Ok(screen)
            }
            None => {
                Err(DisplayError::NoSuchScreen { display: display.name().to_owned(), index })
            }
        }
    }

    /// The number of screens `display` has looked up so far.
    pub fn cached_screen_count(&self, display: &DisplayHandle) -> usize {
        self.entries.get(display.name()).map_or(0, |entry| entry.screens.len())
    }

    /// Closes displays opened with `destroy_when_unused` whose handles were all dropped without
    /// being released. Returns how many were closed.
    pub fn sweep(&mut self) -> usize {
        let abandoned: Vec<String> = self.entries.iter().filter(|&(_, entry)| {
            entry.destroy_when_unused && entry.owners.upgrade().is_none()
        }).map(|(name, _)| name.clone()).collect();
        for name in &abandoned {
            if let Some(entry) = self.entries.remove(name) {
                warn!("display {:?} was abandoned without being released; closing it", name);
                self.factory.close(entry.connection);
            }
        }
        abandoned.len()
    }

    /// Closes every open display, owned or not.
    pub fn shutdown(&mut self) {
        for (name, entry) in self.entries.drain() {
            if entry.owners.upgrade().is_some() {
                warn!("closing display {:?} while it still has owners", name);
            }
            self.factory.close(entry.connection);
        }
        debug!("display pool shut down");
    }
}

impl<F> Drop for DisplayPool<F> where F: NativeDisplayFactory {
    fn drop(&mut self) {
        if !self.entries.is_empty() {
            self.shutdown();
        }
    }
}

impl<F> Debug for DisplayPool<F> where F: NativeDisplayFactory {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();
        formatter.debug_struct("DisplayPool").field("open", &names).finish()
    }
}

#[cfg(test)]
mod test {
    use super::{DisplayError, DisplayPool, NativeDisplayError, NativeDisplayFactory, Screen};

    #[derive(Default)]
    struct FakeFactory {
        opened: Vec<String>,
        closed: Vec<String>,
        screen_lookups: usize,
    }

    impl NativeDisplayFactory for FakeFactory {
        type Connection = String;

        fn open(&mut self, name: &str) -> Result<String, NativeDisplayError> {
            if name.starts_with("bad") {
                return Err(NativeDisplayError { code: 0xbad, message: "no such host".to_owned() });
            }
            self.opened.push(name.to_owned());
            Ok(name.to_owned())
        }

        fn screen_size(&mut self, _: &String, index: usize) -> Option<(u32, u32)> {
            self.screen_lookups += 1;
            if index < 2 {
                Some((1920 >> index, 1080 >> index))
            } else {
                None
            }
        }

        fn close(&mut self, connection: String) {
            self.closed.push(connection);
        }
    }

    #[test]
    fn test_one_connection_per_name() {
        let mut pool = DisplayPool::new(FakeFactory::default());
        let first = pool.open(":0", true).unwrap();
        let second = pool.open(":0", true).unwrap();
        let other = pool.open(":1", true).unwrap();
        assert_eq!(first.id(), second.id());
        assert_ne!(first.id(), other.id());
        assert_eq!(pool.factory().opened, vec![":0".to_owned(), ":1".to_owned()]);
        assert_eq!(pool.open_count(), 2);
    }

    #[test]
    fn test_last_release_closes_unused_display() {
        let mut pool = DisplayPool::new(FakeFactory::default());
        let first = pool.open(":0", true).unwrap();
        let second = pool.open(":0", true).unwrap();
        let weak = first.downgrade();

        assert_eq!(pool.release(first), Ok(false));
        assert!(pool.is_open(":0"));
        assert!(weak.upgrade().is_some());

        assert_eq!(pool.release(second), Ok(true));
        assert!(!pool.is_open(":0"));
        assert!(weak.upgrade().is_none());
        assert_eq!(pool.factory().closed, vec![":0".to_owned()]);
    }

    #[test]
    fn test_retained_display_survives_until_shutdown() {
        let mut pool = DisplayPool::new(FakeFactory::default());
        let handle = pool.open(":0", false).unwrap();
        let id = handle.id();
        assert_eq!(pool.release(handle), Ok(false));
        assert!(pool.is_open(":0"));

        let again = pool.open(":0", false).unwrap();
        assert_eq!(again.id(), id);
        assert_eq!(pool.factory().opened.len(), 1);

        pool.shutdown();
        assert_eq!(pool.open_count(), 0);
        assert_eq!(pool.factory().closed, vec![":0".to_owned()]);
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let mut pool = DisplayPool::new(FakeFactory::default());
        let stale = pool.open(":0", true).unwrap();
        pool.shutdown();
        assert!(!pool.is_open(":0"));

        let fresh = pool.open(":0", true).unwrap();
        assert_ne!(fresh.id(), stale.id());
        match pool.release(stale) {
            Err(DisplayError::UnknownDisplay { name }) => assert_eq!(name, ":0"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(pool.release(fresh), Ok(true));
    }

    #[test]
    fn test_open_failure_carries_native_detail() {
        let mut pool = DisplayPool::new(FakeFactory::default());
        let error = pool.open("bad:9", true).unwrap_err();
        assert_eq!(error.to_string(),
                   "failed to open display \"bad:9\": no such host (error 0xbad)");
        assert_eq!(pool.open_count(), 0);
    }

    #[test]
    fn test_screens_are_cached_per_display() {
        let mut pool = DisplayPool::new(FakeFactory::default());
        let zero = pool.open(":0", true).unwrap();
        let one = pool.open(":1", true).unwrap();

        assert_eq!(pool.screen(&zero, 1), Ok(Screen { index: 1, width: 960, height: 540 }));
        assert_eq!(pool.screen(&zero, 1).unwrap().width, 960);
        assert_eq!(pool.factory().screen_lookups, 1);
        assert_eq!(pool.cached_screen_count(&zero), 1);
        assert_eq!(pool.cached_screen_count(&one), 0);

        assert_eq!(pool.screen(&one, 2),
                   Err(DisplayError::NoSuchScreen { display: ":1".to_owned(), index: 2 }));
        assert_eq!(pool.cached_screen_count(&one), 0);
    }

    #[test]
    fn test_sweep_closes_abandoned_displays() {
        let mut pool = DisplayPool::new(FakeFactory::default());
        drop(pool.open(":0", true).unwrap());
        let kept = pool.open(":1", true).unwrap();
        assert_eq!(pool.sweep(), 1);
        assert!(!pool.is_open(":0"));
        assert!(pool.is_open(":1"));
        assert_eq!(pool.release(kept), Ok(true));
    }
}
