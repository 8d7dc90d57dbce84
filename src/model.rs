/// Inputs for one flyer render, produced by the hosting UI layer.
///
/// Immutable per render call; the template image lives in the injected
/// [`crate::TemplateCache`] rather than here, so "template ready" is simply
/// whether that cache has been installed.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct RenderInput {
    /// User-typed name, possibly empty.
    pub name: String,
    /// Raw encoded photo bytes (JPEG/PNG/...), if the user picked one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<u8>>,
}

impl RenderInput {
    pub fn has_photo(&self) -> bool {
        self.photo.as_ref().is_some_and(|b| !b.is_empty())
    }
}
