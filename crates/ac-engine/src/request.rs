/// Input to `Engine::execute`.
#[derive(Debug, Clone)]
pub struct Request {
    pub input: String,
    /// Absent means: create a new session for this call.
    pub session_id: Option<String>,
}

impl Request {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            session_id: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}
