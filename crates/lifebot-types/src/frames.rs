//! JSON frames exchanged with gateway `WebSocket` clients.
//!
//! The gateway stands in for a chat platform: clients post messages and
//! add or remove reactions, and the server answers with created/edited
//! messages, reactions and direct replies.

use serde::{Deserialize, Serialize};

use crate::ids::{ActorId, ChannelId, TargetId};

/// A frame sent by a client to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// A chat message; commands start with `#`.
    Message {
        /// Raw message text.
        content: String,
    },
    /// A reaction added to a message.
    ReactionAdd {
        /// The message reacted to.
        target: TargetId,
        /// The reaction emoji.
        emoji: String,
    },
    /// A reaction removed from a message.
    ReactionRemove {
        /// The message the reaction was removed from.
        target: TargetId,
        /// The reaction emoji.
        emoji: String,
    },
}

/// A frame pushed by the gateway to its clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Sent once after connecting.
    Hello {
        /// The channel assigned to this connection.
        channel: ChannelId,
        /// The actor id signals from this connection carry.
        actor: ActorId,
    },
    /// A new message was posted.
    MessageCreated {
        /// Identifier of the new message.
        target: TargetId,
        /// Channel the message was posted in.
        channel: ChannelId,
        /// Message text.
        content: String,
    },
    /// An existing message was edited in place.
    MessageEdited {
        /// The edited message.
        target: TargetId,
        /// New message text.
        content: String,
    },
    /// A reaction was added to a message.
    ReactionAdded {
        /// The message reacted to.
        target: TargetId,
        /// Who reacted.
        actor: ActorId,
        /// The reaction emoji.
        emoji: String,
    },
    /// A reply addressed to a single channel.
    Reply {
        /// Recipient channel.
        channel: ChannelId,
        /// Reply text.
        content: String,
    },
}

impl ServerFrame {
    /// Whether this frame should be delivered to a connection on `channel`.
    ///
    /// Replies go only to their own channel; everything else is public.
    pub fn visible_to(&self, channel: ChannelId) -> bool {
        match self {
            Self::Reply { channel: to, .. } | Self::Hello { channel: to, .. } => *to == channel,
            Self::MessageCreated { .. } | Self::MessageEdited { .. } | Self::ReactionAdded { .. } => {
                true
            }
        }
    }
}
