// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace watch loop and the change stream it consumes.

pub mod controller;
pub mod stream;

pub use controller::{NamespaceWatch, StopHandle};
pub use stream::{ChangeStream, StreamHandle, WatchMessage};
