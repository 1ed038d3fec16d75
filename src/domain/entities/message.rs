/// A node of a mailbox message's MIME tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagePart {
    pub mime_type: String,
    /// Present when the part body is stored out of line as an attachment.
    pub attachment_id: Option<String>,
    pub parts: Vec<MessagePart>,
}

impl MessagePart {
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            ..Default::default()
        }
    }

    pub fn with_attachment(mut self, attachment_id: impl Into<String>) -> Self {
        self.attachment_id = Some(attachment_id.into());
        self
    }

    pub fn with_parts(mut self, parts: Vec<MessagePart>) -> Self {
        self.parts = parts;
        self
    }

    pub fn is_container(&self) -> bool {
        self.mime_type.starts_with("multipart/")
    }
}
