//! Diesel schema for payload persistence.

diesel::table! {
    /// Uploaded data payloads.
    data_payloads (id) {
        /// Payload identifier.
        id -> Uuid,
        /// Uploading user.
        owner_id -> Uuid,
        /// Processing task created with the upload.
        task_id -> Uuid,
        /// Location of the uploaded file.
        path -> Text,
        /// Upload timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Pipeline completion records, one per payload.
    dirty_pipeline_entries (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Processed payload.
        payload_id -> Uuid,
        /// Completion timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(dirty_pipeline_entries -> data_payloads (payload_id));
diesel::allow_tables_to_appear_in_same_query!(data_payloads, dirty_pipeline_entries);
