// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod args;
pub mod commands;

pub use args::{Cli, normalize_args};
pub use commands::query_command;
