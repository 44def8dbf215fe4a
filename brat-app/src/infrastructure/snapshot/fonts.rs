use brat_errors::AppError;
use fontdb::{Database, Family, Query, Stretch, Style, Weight, ID};
use std::path::Path;

/// Preferred families, in order, before falling back to any sans-serif face.
pub const FONT_FAMILIES: [&str; 2] = ["Arial Narrow", "Arial"];

/// The single bold face used for every snapshot.
pub struct FontBook {
    db: Database,
    face: Option<ID>,
}

impl FontBook {
    pub fn system() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        Self::resolve(db)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let mut db = Database::new();
        db.load_font_file(path).map_err(|e| {
            AppError::RasterizationFailure(format!("cannot load font {}: {}", path.display(), e))
        })?;
        let book = Self::resolve(db);
        if !book.has_face() {
            return Err(AppError::RasterizationFailure(format!(
                "{} contains no usable font face",
                path.display()
            )));
        }
        Ok(book)
    }

    pub fn empty() -> Self {
        Self {
            db: Database::new(),
            face: None,
        }
    }

    fn resolve(db: Database) -> Self {
        let families = [
            Family::Name(FONT_FAMILIES[0]),
            Family::Name(FONT_FAMILIES[1]),
            Family::SansSerif,
        ];
        let query = Query {
            families: &families,
            weight: Weight::BOLD,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let face = db
            .query(&query)
            .or_else(|| db.faces().next().map(|info| info.id));

        match face.and_then(|id| db.face(id)) {
            Some(info) => tracing::info!(
                "Snapshot font: {}",
                info.families
                    .first()
                    .map(|(name, _)| name.as_str())
                    .unwrap_or("<unnamed>")
            ),
            None => tracing::warn!("No font face available, snapshots can only render blank text"),
        }

        Self { db, face }
    }

    pub fn has_face(&self) -> bool {
        self.face.is_some()
    }

    /// Runs `f` against the parsed face. `None` when there is no usable face.
    pub fn with_face<T>(&self, f: impl FnOnce(&ttf_parser::Face<'_>) -> T) -> Option<T> {
        let id = self.face?;
        self.db
            .with_face_data(id, |data, index| {
                ttf_parser::Face::parse(data, index).ok().map(|face| f(&face))
            })
            .flatten()
    }
}
