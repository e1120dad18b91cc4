//! Diesel schema for enricher persistence.

diesel::table! {
    /// Registered enrichers.
    enrichers (id) {
        /// Enricher identifier, also the owner id of its tasks.
        id -> Uuid,
        /// Unique enricher name.
        #[max_length = 80]
        name -> Varchar,
        /// Source repository of the implementation.
        repository -> Text,
        /// Last liveness timestamp.
        last_ping_at -> Nullable<Timestamptz>,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tasks an enricher created or reused for a subject.
    enricher_subject_tasks (id) {
        /// Link identifier.
        id -> Uuid,
        /// Owning enricher.
        enricher_id -> Uuid,
        /// Subject kind (`taxon`, `data_payload`).
        #[max_length = 16]
        subject_kind -> Varchar,
        /// Subject identifier.
        subject_id -> Uuid,
        /// Linked task.
        task_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(enricher_subject_tasks -> enrichers (enricher_id));
diesel::allow_tables_to_appear_in_same_query!(enrichers, enricher_subject_tasks);
