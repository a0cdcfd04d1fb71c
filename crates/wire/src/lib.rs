// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Helper process protocol.
//!
//! Wire format: one compact UTF-8 JSON object per line, in each direction.
//! No length prefix and no multiplexing; requests carry an `id` that the
//! helper echoes so late responses can be told apart from current ones.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod codec;
mod command;
mod response;
mod target;

pub use codec::{decode_line, encode_line, read_line, write_line, ProtocolError, MAX_LINE_BYTES};
pub use command::{Command, CommandKind, JmxConnection, PROTOCOL_VERSION};
pub use response::{Response, Status};
pub use target::Target;
