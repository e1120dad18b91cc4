//! Diesel schema for taxon persistence.

diesel::table! {
    /// Curated taxa.
    taxa (id) {
        /// Taxon identifier.
        id -> Uuid,
        /// Scientific name.
        #[max_length = 255]
        name -> Varchar,
        /// Free-form description.
        description -> Text,
        /// Curator who created the taxon.
        author_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
