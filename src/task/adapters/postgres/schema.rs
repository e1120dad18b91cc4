//! Diesel schema for task persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Owning user or bot.
        owner_id -> Uuid,
        /// Task type reference.
        task_type_id -> Uuid,
        /// Lifecycle state.
        #[max_length = 16]
        state -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Kinds of unit of work.
    task_types (id) {
        /// Task type identifier.
        id -> Uuid,
        /// Unique task type name.
        #[max_length = 80]
        name -> Varchar,
        /// Free-form description.
        description -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Parent/child edges between tasks.
    derived_tasks (id) {
        /// Edge identifier.
        id -> Uuid,
        /// Parent task.
        parent_task_id -> Uuid,
        /// Derived task.
        derived_task_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Documents produced by tasks.
    documents (id) {
        /// Document identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Free-form description.
        description -> Text,
        /// Path relative to the document root.
        path -> Text,
        /// Owning user or bot.
        owner_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Links between tasks and produced documents.
    task_related_documents (id) {
        /// Link identifier.
        id -> Uuid,
        /// Producing task.
        task_id -> Uuid,
        /// Produced document.
        document_id -> Uuid,
    }
}
