// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build request handlers: clone dispatch and status queries.

use crate::dispatch::CloneOutcome;
use crate::protocol::Response;

use super::ListenCtx;

pub(super) fn handle_clone(ctx: &ListenCtx, url: &str) -> Response {
    match ctx.dispatcher.request_clone(url) {
        CloneOutcome::Started { url, rev, build_id, workers } => Response::CloneStarted {
            url,
            rev,
            build_id: build_id.to_string(),
            workers,
        },
        CloneOutcome::NoWorkers => Response::NoWorkers,
        CloneOutcome::NotFound => Response::NotFound { url: url.to_string() },
    }
}

pub(super) fn handle_status(ctx: &ListenCtx, url: &str) -> Response {
    match ctx.dispatcher.request_status(url) {
        Some(status) => Response::BuildStatus {
            url: status.url,
            rev: status.rev,
            artifacts: status.artifacts,
            pending: status.pending,
        },
        None => Response::NotFound { url: url.to_string() },
    }
}
