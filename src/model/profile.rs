use serde::{Deserialize, Serialize};

/// A traveler. Trips refer to profiles by id only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub id: String,
    pub name: String,
    /// Avatar as a base64 data URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// Partial update for a profile. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub photo: Option<String>,
}

impl ProfilePatch {
    pub fn apply(&self, profile: &mut Profile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(photo) = &self.photo {
            profile.photo = Some(photo.clone());
        }
    }
}

/// The body of the reserved profiles document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileList {
    pub profiles: Vec<Profile>,
}
