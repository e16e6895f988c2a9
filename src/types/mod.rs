// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Domain types shared by the trigger, watch and apply paths.

pub mod observation;

pub use observation::{Phase, ResourceObservation};
