// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The canvas interaction and composition engine.
//!
//! Pointer events arrive here already mapped to logical coordinates; the
//! tool state machine turns them into scene mutations, and the
//! compositor re-renders the backing store after every one.

pub mod compositor;
pub mod decode;
pub mod fonts;
pub mod hit;
pub mod session;
pub mod tools;
