// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Interactive editing: the shape-drawing state machine, the annotation
//! store and the controller that routes input events between them.

pub mod controller;
pub mod shape_editor;
pub mod store;
