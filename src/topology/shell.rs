use super::face::FaceId;

slotmap::new_key_type! {
    /// Unique identifier for a shell in the topology store.
    pub struct ShellId;
}

/// A connected set of faces. A closed shell bounds a volume.
#[derive(Debug, Clone)]
pub struct ShellData {
    pub faces: Vec<FaceId>,
    pub is_closed: bool,
}

impl ShellData {
    /// Creates a closed shell from its faces.
    #[must_use]
    pub fn closed(faces: Vec<FaceId>) -> Self {
        Self {
            faces,
            is_closed: true,
        }
    }
}
