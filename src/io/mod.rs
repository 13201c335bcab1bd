// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for images, session documents and external services.

pub mod collaborators;
pub mod media;
pub mod serialization;
