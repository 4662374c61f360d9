use serde::{Deserialize, Serialize};

/// Name of a registered prompt template, typed by the context it renders.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct Template<V> {
    pub template: String,
    #[serde(skip)]
    _marker: std::marker::PhantomData<V>,
}

impl<V> Template<V> {
    pub fn new(template: impl ToString) -> Self {
        Self {
            template: template.to_string(),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.template
    }
}
