//! Diesel schema for Open Tree of Life entries.

diesel::table! {
    /// Accepted Open Tree of Life resolutions, one per taxon.
    open_tree_of_life (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Enriched taxon.
        taxon_id -> Uuid,
        /// Open Tree Taxonomy identifier.
        ott_id -> Int8,
        /// Domain name.
        #[max_length = 80]
        domain -> Nullable<Varchar>,
        /// Kingdom name.
        #[max_length = 80]
        kingdom -> Nullable<Varchar>,
        /// Phylum name.
        #[max_length = 80]
        phylum -> Nullable<Varchar>,
        /// Class name.
        #[sql_name = "class"]
        #[max_length = 80]
        class_name -> Nullable<Varchar>,
        /// Order name.
        #[sql_name = "order"]
        #[max_length = 80]
        order_name -> Nullable<Varchar>,
        /// Family name.
        #[max_length = 80]
        family -> Nullable<Varchar>,
        /// Tribe name.
        #[max_length = 80]
        tribe -> Nullable<Varchar>,
        /// Genus name.
        #[max_length = 80]
        genus -> Nullable<Varchar>,
        /// Species name.
        #[max_length = 80]
        species -> Nullable<Varchar>,
        /// Taxonomy version.
        #[max_length = 20]
        version -> Varchar,
        /// Name the taxon resolved to.
        #[max_length = 255]
        resolved_taxon_name -> Varchar,
        /// Whether the resolved name is a synonym.
        is_synonym -> Bool,
        /// Whether the match was fuzzy.
        is_approximated_match -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

use crate::taxon::adapters::postgres::schema::taxa;

diesel::joinable!(open_tree_of_life -> taxa (taxon_id));
diesel::allow_tables_to_appear_in_same_query!(open_tree_of_life, taxa);
