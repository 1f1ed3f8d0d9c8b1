// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for sessions on disk.
//!
//! The store module reads/writes the session folder format (session file plus
//! tutorial visited marker) used by the TUI.

pub mod session_folder;

pub use session_folder::{SessionFolder, StoreError, WriteDurability};
