//! Calendar lookup tool — upcoming events for the user.
//!
//! In production this would query the user's calendar provider. The local
//! implementation returns a deterministic schedule. The input is accepted
//! but not interpreted — "what's on my calendar?" needs no parameters.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use memoclaw_core::error::ToolError;
use memoclaw_core::tool::Tool;

pub struct CalendarLookupTool;

#[async_trait]
impl Tool for CalendarLookupTool {
    fn name(&self) -> &str {
        "calendar_lookup"
    }

    fn usage(&self) -> &str {
        "Check upcoming events on the user's calendar. The input is ignored; pass the question as-is."
    }

    async fn invoke(&self, _input: &str) -> Result<String, ToolError> {
        let now = Utc::now();
        let events = [
            (Duration::hours(3), "Team stand-up (30 min)"),
            (Duration::days(1), "Dentist appointment"),
            (Duration::days(2), "Project review with Priya"),
        ];

        let mut out = String::from("Upcoming calendar events:\n");
        for (offset, title) in events {
            let when = (now + offset).format("%a %b %e, %H:%M UTC");
            out.push_str(&format!("- {when}: {title}\n"));
        }
        Ok(out)
    }
}
