// curvegraph/dispatch/src/lib.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The windowing side of curvegraph: an event dispatch thread that owns all window state, and a
//! pool that shares native display connections between windows.

#[macro_use]
extern crate log;

pub mod display;
pub mod edt;
