// curvegraph/gpu/src/context.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Creating a GL context and making it current on a drawing surface.
//!
//! The native window system is reached through `ContextProvider`, `Surface` and
//! `CurrentContext`; this module only sequences the calls.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::sync::{Mutex, MutexGuard};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GLVersion {
    pub major: u8,
    pub minor: u8,
}

impl GLVersion {
    #[inline]
    pub const fn new(major: u8, minor: u8) -> GLVersion {
        GLVersion { major, minor }
    }
}

impl Display for GLVersion {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "{}.{}", self.major, self.minor)
    }
}

/// Core versions to try, highest first.
pub const CORE_VERSIONS: [GLVersion; 9] = [
    GLVersion::new(4, 6),
    GLVersion::new(4, 5),
    GLVersion::new(4, 4),
    GLVersion::new(4, 3),
    GLVersion::new(4, 2),
    GLVersion::new(4, 1),
    GLVersion::new(4, 0),
    GLVersion::new(3, 3),
    GLVersion::new(3, 2),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContextProfile {
    Core,
    ForwardCompatible,
    /// Whatever the driver hands out when no version is asked for.
    Compatibility,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContextRequest {
    pub version: GLVersion,
    pub profile: ContextProfile,
}

impl ContextRequest {
    #[inline]
    pub fn core(version: GLVersion) -> ContextRequest {
        ContextRequest { version, profile: ContextProfile::Core }
    }

    #[inline]
    pub fn forward_compatible() -> ContextRequest {
        ContextRequest { version: GLVersion::new(3, 1), profile: ContextProfile::ForwardCompatible }
    }

    #[inline]
    pub fn legacy() -> ContextRequest {
        ContextRequest { version: GLVersion::new(2, 0), profile: ContextProfile::Compatibility }
    }
}

/// The requests `negotiate_context` makes, in order.
pub fn negotiation_ladder() -> Vec<ContextRequest> {
    let mut requests: Vec<_> = CORE_VERSIONS.iter().cloned().map(ContextRequest::core).collect();
    requests.push(ContextRequest::forward_compatible());
    requests.push(ContextRequest::legacy());
    requests
}

/// An error code reported by the window system.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeError {
    pub code: u32,
    pub message: String,
}

impl Display for NativeError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "native error {:#x}: {}", self.code, self.message)
    }
}

impl Error for NativeError {}

#[derive(Clone, Debug, PartialEq)]
pub enum ContextError {
    /// Every request of the ladder failed.
    NoSuitableContext {
        last_error: Option<NativeError>,
    },
    MakeCurrentFailed(NativeError),
}

impl Display for ContextError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            ContextError::NoSuitableContext { last_error: Some(ref error) } => {
                write!(formatter, "no suitable GL context could be created; last error: {}", error)
            }
            ContextError::NoSuitableContext { last_error: None } => {
                write!(formatter, "no suitable GL context could be created")
            }
            ContextError::MakeCurrentFailed(ref error) => {
                write!(formatter, "could not make the context current: {}", error)
            }
        }
    }
}

impl Error for ContextError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            ContextError::NoSuitableContext { last_error: Some(ref error) } |
            ContextError::MakeCurrentFailed(ref error) => Some(error),
            ContextError::NoSuitableContext { last_error: None } => None,
        }
    }
}

pub trait ContextProvider {
    type Context;

    fn create_context(&mut self, request: &ContextRequest) -> Result<Self::Context, NativeError>;
}

/// Creates the best context the provider can make.
///
/// Core profiles from 4.6 down to 3.2 come first, then a 3.1 forward-compatible context, then
/// a legacy one.
pub fn negotiate_context<P>(provider: &mut P)
                            -> Result<(P::Context, ContextRequest), ContextError>
                            where P: ContextProvider {
    let mut last_error = None;
    for request in negotiation_ladder() {
        match provider.create_context(&request) {
            Ok(context) => {
                info!("created a {:?} GL {} context", request.profile, request.version);
                return Ok((context, request));
            }
            Err(error) => {
                debug!("GL {} {:?} context unavailable: {}",
                       request.version,
                       request.profile,
                       error);
                last_error = Some(error);
            }
        }
    }
    error!("context negotiation exhausted every request");
    Err(ContextError::NoSuitableContext { last_error })
}

/// The outcome of locking a drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockStatus {
    /// The surface can't be drawn to yet, e.g. a window that isn't realized.
    NotReady,
    /// Locked, but the native surface was recreated since the last lock.
    Changed,
    Ready,
}

/// A native drawing surface that must be locked around GL calls.
pub trait Surface {
    fn lock(&self) -> LockStatus;
    fn unlock(&self);
}

/// A context that can be bound to the calling thread.
pub trait CurrentContext {
    fn make_current(&self) -> Result<(), NativeError>;
    fn release(&self);
}

/// Serializes calls into a window toolkit that isn't thread safe.
///
/// One lock is shared by everything drawing through the same toolkit connection.
#[derive(Debug, Default)]
pub struct ToolkitLock {
    mutex: Mutex<()>,
}

impl ToolkitLock {
    #[inline]
    pub fn new() -> ToolkitLock {
        ToolkitLock::default()
    }

    pub fn lock(&self) -> MutexGuard<()> {
        match self.mutex.lock() {
            Ok(guard) => guard,
            // The lock guards no data, so a panic while holding it leaves nothing inconsistent.
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MakeCurrentResult<R> {
    /// The closure ran with the context current.
    Ran(R),
    /// The surface wasn't ready, so nothing ran.
    NotCurrent,
}

impl<R> MakeCurrentResult<R> {
    #[inline]
    pub fn ran(self) -> Option<R> {
        match self {
            MakeCurrentResult::Ran(value) => Some(value),
            MakeCurrentResult::NotCurrent => None,
        }
    }
}

/// Locks the toolkit and the surface, makes `context` current, and runs `f`.
///
/// `f` is told whether the surface changed since it was last locked. The context is released
/// and the surface unlocked on every path, including a panic in `f`.
pub fn make_current_and_run<S, C, F, R>(surface: &S,
                                        context: &C,
                                        toolkit_lock: &ToolkitLock,
                                        f: F)
                                        -> Result<MakeCurrentResult<R>, ContextError>
                                        where S: Surface,
                                              C: CurrentContext,
                                              F: FnOnce(bool) -> R {
    let _toolkit_guard = toolkit_lock.lock();

    let status = surface.lock();
    if status == LockStatus::NotReady {
        debug!("surface not ready; skipping");
        return Ok(MakeCurrentResult::NotCurrent);
    }
    let _surface_guard = SurfaceGuard(surface);

    context.make_current().map_err(ContextError::MakeCurrentFailed)?;
    let _context_guard = ContextGuard(context);

    Ok(MakeCurrentResult::Ran(f(status == LockStatus::Changed)))
}

struct SurfaceGuard<'a, S>(&'a S) where S: Surface;

impl<'a, S> Drop for SurfaceGuard<'a, S> where S: Surface {
    fn drop(&mut self) {
        self.0.unlock();
    }
}

struct ContextGuard<'a, C>(&'a C) where C: CurrentContext;

impl<'a, C> Drop for ContextGuard<'a, C> where C: CurrentContext {
    fn drop(&mut self) {
        self.0.release();
    }
}

#[cfg(test)]
mod test {
    use std::cell::{Cell, RefCell};
    use std::panic::{self, AssertUnwindSafe};
    use super::{negotiate_context, make_current_and_run, ContextError, ContextProfile};
    use super::{ContextProvider, ContextRequest, CurrentContext, GLVersion, LockStatus};
    use super::{MakeCurrentResult, NativeError, Surface, ToolkitLock};

    struct Provider {
        max_core: Option<GLVersion>,
        forward_compatible: bool,
        legacy: bool,
        attempts: Vec<ContextRequest>,
    }

    impl ContextProvider for Provider {
        type Context = ContextRequest;

        fn create_context(&mut self, request: &ContextRequest)
                          -> Result<ContextRequest, NativeError> {
            self.attempts.push(*request);
            let supported = match request.profile {
                ContextProfile::Core => self.max_core.map_or(false, |max| request.version <= max),
                ContextProfile::ForwardCompatible => self.forward_compatible,
                ContextProfile::Compatibility => self.legacy,
            };
            if supported {
                Ok(*request)
            } else {
                Err(NativeError { code: 0x3009, message: "bad match".to_owned() })
            }
        }
    }

    fn make_provider(max_core: Option<GLVersion>, forward_compatible: bool, legacy: bool)
                     -> Provider {
        drop(env_logger::try_init());
        Provider { max_core, forward_compatible, legacy, attempts: vec![] }
    }

    #[test]
    fn test_highest_core_version_wins() {
        let mut provider = make_provider(Some(GLVersion::new(4, 1)), true, true);
        let (_, request) = negotiate_context(&mut provider).unwrap();
        assert_eq!(request, ContextRequest::core(GLVersion::new(4, 1)));
        assert_eq!(provider.attempts.len(), 6);
    }

    #[test]
    fn test_falls_back_in_order() {
        let mut provider = make_provider(None, true, true);
        let (_, request) = negotiate_context(&mut provider).unwrap();
        assert_eq!(request, ContextRequest::forward_compatible());

        let mut provider = make_provider(None, false, true);
        let (_, request) = negotiate_context(&mut provider).unwrap();
        assert_eq!(request, ContextRequest::legacy());
        assert_eq!(provider.attempts.len(), 11);
    }

    #[test]
    fn test_exhaustion_carries_last_error() {
        let mut provider = make_provider(None, false, false);
        match negotiate_context(&mut provider) {
            Err(ContextError::NoSuitableContext { last_error: Some(error) }) => {
                assert_eq!(error.code, 0x3009);
                assert!(error.to_string().contains("0x3009"));
            }
            _ => panic!("negotiation should have failed"),
        }
    }

    #[derive(Default)]
    struct Recorder {
        status: Cell<Option<LockStatus>>,
        fail_make_current: bool,
        events: RefCell<Vec<&'static str>>,
    }

    impl Surface for Recorder {
        fn lock(&self) -> LockStatus {
            self.events.borrow_mut().push("lock");
            self.status.get().unwrap_or(LockStatus::Ready)
        }

        fn unlock(&self) {
            self.events.borrow_mut().push("unlock");
        }
    }

    impl CurrentContext for Recorder {
        fn make_current(&self) -> Result<(), NativeError> {
            self.events.borrow_mut().push("make_current");
            if self.fail_make_current {
                return Err(NativeError { code: 0x3002, message: "bad access".to_owned() });
            }
            Ok(())
        }

        fn release(&self) {
            self.events.borrow_mut().push("release");
        }
    }

    #[test]
    fn test_not_ready_surface_is_not_an_error() {
        let recorder = Recorder {
            status: Cell::new(Some(LockStatus::NotReady)),
            ..Recorder::default()
        };
        let lock = ToolkitLock::new();
        let result = make_current_and_run(&recorder, &recorder, &lock, |_| 1).unwrap();
        assert_eq!(result, MakeCurrentResult::NotCurrent);
        assert_eq!(*recorder.events.borrow(), vec!["lock"]);
    }

    #[test]
    fn test_release_and_unlock_in_reverse_order() {
        let recorder = Recorder {
            status: Cell::new(Some(LockStatus::Changed)),
            ..Recorder::default()
        };
        let lock = ToolkitLock::new();
        let result = make_current_and_run(&recorder, &recorder, &lock, |changed| changed).unwrap();
        assert_eq!(result.ran(), Some(true));
        assert_eq!(*recorder.events.borrow(), vec!["lock", "make_current", "release", "unlock"]);
    }

    #[test]
    fn test_failed_make_current_unlocks_surface() {
        let recorder = Recorder { fail_make_current: true, ..Recorder::default() };
        let lock = ToolkitLock::new();
        let result = make_current_and_run(&recorder, &recorder, &lock, |_| ());
        assert!(match result {
            Err(ContextError::MakeCurrentFailed(_)) => true,
            _ => false,
        });
        assert_eq!(*recorder.events.borrow(), vec!["lock", "make_current", "unlock"]);
    }

    #[test]
    fn test_panic_still_releases() {
        let recorder = Recorder::default();
        let lock = ToolkitLock::new();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            make_current_and_run(&recorder, &recorder, &lock, |_| -> () { panic!("boom") })
        }));
        assert!(result.is_err());
        assert_eq!(*recorder.events.borrow(), vec!["lock", "make_current", "release", "unlock"]);
        // The toolkit lock is usable again.
        drop(lock.lock());
    }
}
