// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalog request handlers.

use forge_core::ProjectDescriptor;
use tracing::info;

use crate::protocol::{ProjectEntry, Response};

use super::ListenCtx;

pub(super) fn handle_project_add(
    ctx: &ListenCtx,
    url: String,
    rev: String,
    options: String,
    files: Vec<String>,
) -> Response {
    let descriptor = ProjectDescriptor { url, rev, options, files };
    let added = {
        let mut catalog = ctx.catalog.lock();
        catalog.add(descriptor.clone())
    };

    match added {
        Ok(()) => {
            info!(url = %descriptor.url, rev = %descriptor.rev, files = descriptor.files.len(),
                "project added");
            Response::Ok
        }
        Err(e) => Response::Error { message: e.to_string() },
    }
}

pub(super) fn handle_project_remove(ctx: &ListenCtx, url: &str) -> Response {
    let removed = ctx.catalog.lock().remove(url);
    if removed == 0 {
        return Response::NotFound { url: url.to_string() };
    }
    info!(%url, removed, "project removed");
    Response::Ok
}

pub(super) fn handle_project_list(ctx: &ListenCtx) -> Response {
    let catalog = ctx.catalog.lock();
    let projects = catalog
        .projects()
        .iter()
        .map(|p| ProjectEntry {
            url: p.url.clone(),
            rev: p.rev.clone(),
            options: p.options.clone(),
            files: p.files.len(),
        })
        .collect();
    Response::Projects { projects }
}
