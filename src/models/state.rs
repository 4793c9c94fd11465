use super::generation::GeneratedImages;

/// Lifecycle of a single generation request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success(GeneratedImages),
    Failure(String),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn images(&self) -> Option<&GeneratedImages> {
        match self {
            RequestState::Success(images) => Some(images),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Failure(message) => Some(message),
            _ => None,
        }
    }
}
