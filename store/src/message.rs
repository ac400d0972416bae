//! Message and messaging-group storage trait.

use crate::StoreError;
use plaza_types::{MessageEntry, MessageKey, MessagingGroupEntry, MessagingGroupKey};

pub trait MessageStore {
    fn fetch_message(&self, key: &MessageKey) -> Result<Option<MessageEntry>, StoreError>;

    fn fetch_messaging_group(
        &self,
        key: &MessagingGroupKey,
    ) -> Result<Option<MessagingGroupEntry>, StoreError>;
}
