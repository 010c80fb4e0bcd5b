// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notify the project contacts that processing finished.

use crate::context::TaskContext;
use crate::error::TaskError;
use crate::task::{Task, TaskOutput};
use seqproc_core::MailMessage;
use tracing::warn;

pub struct Email;

impl Task for Email {
    fn run(&self, ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskError> {
        let to: Vec<String> = ctx
            .contacts
            .iter()
            .map(|(name, addr)| format!("{name} <{addr}>"))
            .collect();
        let url = ctx
            .outputs
            .get("upload")
            .and_then(|out| out.get("url"))
            .cloned()
            .unwrap_or_default();
        let subject = format!("Sequencing run processing complete for {}", ctx.work_dir);
        let body = format!(
            "Hello,\n\n\
             Sequencing run processing is complete for {}\n\
             and a zip file with results can be downloaded from this url:\n\
             \n{url}\n",
            ctx.work_dir
        );
        let html = format!(
            "Hello,\n<br><br>\n\n\
             Sequencing run processing is complete for {}\n\
             and a zip file with results can be downloaded from this url:\n\
             <br><br>\n\n<a href='{url}'>{url}</a>\n",
            ctx.work_dir
        );
        let message = MailMessage::new(to.clone(), subject.clone(), body).body_html(html);

        if let Err(err) = ctx.mailer.send(&message) {
            if ctx.setting_bool("mandatory", false) {
                return Err(err.into());
            }
            warn!(work_dir = ctx.work_dir, "notification mail failed: {err}");
        }

        let mut output = TaskOutput::new();
        output.insert("to".into(), to.join(", "));
        output.insert("subject".into(), subject);
        Ok(output)
    }
}
