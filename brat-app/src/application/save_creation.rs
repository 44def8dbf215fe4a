use crate::domain::{preset_or_default, Creation, Viewer};
use crate::infrastructure::security::InputSanitizer;
use crate::infrastructure::store::{Mutation, Store};
use brat_errors::AppError;

pub struct SaveCreation {
    store: Store,
}

impl SaveCreation {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn execute(&self, viewer: &Viewer, text: &str, preset: &str) -> Result<Creation, AppError> {
        let author = viewer.id().ok_or(AppError::AuthRequired)?;

        let creation = Creation::new(
            InputSanitizer::sanitize_text(text)?,
            preset_or_default(Some(preset)).value.to_string(),
            author.to_string(),
        );
        self.store
            .transact(vec![Mutation::InsertCreation(creation.clone())])
            .await?;

        tracing::info!("Saved creation {} by {}", creation.id, author);
        Ok(creation)
    }
}
