use std::fmt;
use std::str::FromStr;

use mockchat_types::{Header, Typer, parse_id};

use crate::capability::Capability;
use crate::error::ChannelError;
use crate::messenger::{Command, Messenger};

/// What the "best trap" action rewrites a message to.
pub const BEST_TRAP: &str = "Astolfo.";

/// The fixed per-message action menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageAction {
    Delete,
    Noop,
    BestTrap,
    TriggerTyping,
}

impl MessageAction {
    pub const ALL: [MessageAction; 4] = [
        MessageAction::Delete,
        MessageAction::Noop,
        MessageAction::BestTrap,
        MessageAction::TriggerTyping,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MessageAction::Delete => "Delete",
            MessageAction::Noop => "No-op",
            MessageAction::BestTrap => "Who's the best trap?",
            MessageAction::TriggerTyping => "Trigger Typing",
        }
    }
}

impl fmt::Display for MessageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MessageAction {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageAction::ALL
            .into_iter()
            .find(|a| a.label() == s)
            .ok_or_else(|| ChannelError::UnknownAction(s.to_string()))
    }
}

impl Messenger {
    /// Actions offered for a message. The menu is the same for every message.
    pub fn actions(&self, _id: &str) -> Vec<MessageAction> {
        if self.capabilities().has(Capability::Act) {
            MessageAction::ALL.to_vec()
        } else {
            Vec::new()
        }
    }

    /// Run an action by its menu label.
    pub async fn do_action(&self, action: &str, id: &str) -> Result<(), ChannelError> {
        let action = action.parse::<MessageAction>()?;
        self.perform(action, id).await
    }

    pub async fn perform(&self, action: MessageAction, id: &str) -> Result<(), ChannelError> {
        self.require(Capability::Act)?;

        match action {
            MessageAction::Noop => Ok(()),
            MessageAction::BestTrap => self.edit_message(id, BEST_TRAP).await,
            MessageAction::Delete | MessageAction::TriggerTyping => {
                let id = parse_id(id).map_err(|_| ChannelError::invalid_id(id))?;
                let active = self.active()?;

                self.network()
                    .simulate()
                    .await
                    .map_err(ChannelError::network("failed to perform action"))?;

                let cmd = match action {
                    MessageAction::Delete => Command::Delete(Header::now(id)),
                    _ => {
                        let author = active
                            .lock_store()
                            .get(id)
                            .map(|m| m.author.clone())
                            .ok_or(ChannelError::NotFound(id))?;
                        Command::Typing(Typer::new(author))
                    }
                };

                active.push(cmd).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for action in MessageAction::ALL {
            assert_eq!(action.label().parse::<MessageAction>().unwrap(), action);
        }
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = "Explode".parse::<MessageAction>().unwrap_err();
        assert!(matches!(err, ChannelError::UnknownAction(ref a) if a == "Explode"));
    }
}
