/// A page element whose activation makes the page request a media resource.
///
/// `id` is the synthetic identifier the extractor stamped onto the element,
/// `label` the accessible name of its enclosing link (empty when absent).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriggerControl {
    pub id: String,
    pub label: String,
}

impl TriggerControl {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}
