//! Chat webhook announcer.
//!
//! Posts `_Title_ by Artist` to an incoming-webhook URL, with optional
//! channel/username/emoji decoration and optional one-shot announcements at
//! startup and shutdown. Live-only: replaying history into a chat channel is
//! exactly the kind of surprise `archive_safe` exists to prevent.

use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info};
use trackcast_core::{
    EventTime, RunContext, Settings, Target, TargetError, TargetResult, Track,
};

const SECTION: &str = "WebhookTarget";

pub struct WebhookTarget {
    client: Client,
    url: String,
    channel: Option<String>,
    username: Option<String>,
    emoji: Option<String>,
    close_message: Option<String>,
}

impl WebhookTarget {
    pub fn from_settings(settings: &Settings, _ctx: &RunContext) -> TargetResult<Box<dyn Target>> {
        let url = settings
            .get_str(SECTION, "webhookUrl")
            .ok_or_else(|| TargetError::missing(settings, SECTION, "webhookUrl"))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| TargetError::other(err.to_string()))?;

        let target = Self {
            client,
            url,
            channel: settings.get_str(SECTION, "channel"),
            username: settings.get_str(SECTION, "announcePrefix"),
            emoji: settings.get_str(SECTION, "emojiName"),
            close_message: settings.get_str(SECTION, "closeMessage"),
        };

        // The opening announcement is best-effort; a dead webhook at startup
        // should not unload the target for the rest of the show.
        if let Some(message) = settings.get_str(SECTION, "initMessage") {
            if let Err(err) = target.post(&message) {
                error!(error = %err, "failed to post opening announcement");
            }
        }

        info!("webhook announcer ready");
        Ok(Box::new(target))
    }

    fn payload(&self, text: &str) -> Value {
        let mut payload = json!({ "text": text });
        if let Some(channel) = &self.channel {
            payload["channel"] = json!(channel);
        }
        if let Some(username) = &self.username {
            payload["username"] = json!(username);
        }
        if let Some(emoji) = &self.emoji {
            payload["icon_emoji"] = json!(format!(":{emoji}:"));
        }
        payload
    }

    fn post(&self, text: &str) -> TargetResult<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&self.payload(text))
            .send()
            .map_err(|err| TargetError::other(format!("webhook request failed: {err}")))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TargetError::other(format!("webhook returned {status}")))
        }
    }
}

impl Target for WebhookTarget {
    fn name(&self) -> &str {
        "Webhook Track Updater"
    }

    fn log_track(&mut self, track: &Track, _start_time: EventTime) -> TargetResult<()> {
        if track.ignore {
            return Ok(());
        }
        self.post(&format!("_{}_ by {}", track.title, track.artist))
    }

    fn close(&mut self) -> TargetResult<()> {
        if let Some(message) = &self.close_message {
            self.post(message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_from(toml: &str) -> WebhookTarget {
        let settings = Settings::from_toml(toml).unwrap();
        WebhookTarget {
            client: Client::new(),
            url: settings.get_str(SECTION, "webhookUrl").unwrap(),
            channel: settings.get_str(SECTION, "channel"),
            username: settings.get_str(SECTION, "announcePrefix"),
            emoji: settings.get_str(SECTION, "emojiName"),
            close_message: settings.get_str(SECTION, "closeMessage"),
        }
    }

    #[test]
    fn missing_url_is_reported() {
        let ctx = RunContext::resolve(
            &Settings::empty(),
            &trackcast_core::RunOverrides::default(),
            chrono::NaiveDate::from_ymd_opt(2023, 6, 10).unwrap(),
        );
        let err = WebhookTarget::from_settings(&Settings::empty(), &ctx).err().unwrap();
        assert!(matches!(err, TargetError::MissingSection { .. }));
    }

    #[test]
    fn payload_carries_only_configured_decorations() {
        let bare = target_from("[WebhookTarget]\nwebhookUrl = \"https://example.test/hook\"");
        let payload = bare.payload("_Song_ by Artist");
        assert_eq!(payload["text"], "_Song_ by Artist");
        assert!(payload.get("channel").is_none());
        assert!(payload.get("icon_emoji").is_none());

        let decorated = target_from(
            r##"
            [WebhookTarget]
            webhookUrl = "https://example.test/hook"
            channel = "#onair"
            announcePrefix = "the booth"
            emojiName = "radio"
            "##,
        );
        let payload = decorated.payload("hello");
        assert_eq!(payload["channel"], "#onair");
        assert_eq!(payload["username"], "the booth");
        assert_eq!(payload["icon_emoji"], ":radio:");
    }
}
