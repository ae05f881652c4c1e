// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Profile change notifications.
//!
//! Components that show profile data subscribe to a [`ProfileEvents`] bus and
//! re-fetch when an event for their user arrives. Publishing never blocks and
//! never fails; with no subscribers the event is dropped.

use portal_auth_core::UserId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Default bus capacity. Slow receivers past this lag and skip events.
const DEFAULT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProfileEvent {
	Created { user_id: UserId, email: String },
	Updated { user_id: UserId, name: String },
}

impl ProfileEvent {
	pub fn event_type(&self) -> &'static str {
		match self {
			ProfileEvent::Created { .. } => "created",
			ProfileEvent::Updated { .. } => "updated",
		}
	}

	pub fn user_id(&self) -> &UserId {
		match self {
			ProfileEvent::Created { user_id, .. } | ProfileEvent::Updated { user_id, .. } => user_id,
		}
	}
}

/// Process-wide publish/subscribe bus for [`ProfileEvent`]s. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ProfileEvents {
	sender: broadcast::Sender<ProfileEvent>,
}

impl Default for ProfileEvents {
	fn default() -> Self {
		Self::new(DEFAULT_CHANNEL_CAPACITY)
	}
}

impl ProfileEvents {
	pub fn new(capacity: usize) -> Self {
		let (sender, _receiver) = broadcast::channel(capacity.max(1));
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<ProfileEvent> {
		let receiver = self.sender.subscribe();
		debug!(
			receiver_count = self.sender.receiver_count(),
			"profile events subscriber added"
		);
		receiver
	}

	/// Returns the number of subscribers that received the event.
	pub fn publish(&self, event: ProfileEvent) -> usize {
		let event_type = event.event_type();
		let user_id = event.user_id().clone();
		match self.sender.send(event) {
			Ok(count) => {
				debug!(user_id = %user_id, event_type, receiver_count = count, "profile event published");
				count
			}
			Err(_) => {
				debug!(user_id = %user_id, event_type, "no profile event subscribers");
				0
			}
		}
	}

	pub fn receiver_count(&self) -> usize {
		self.sender.receiver_count()
	}
}
